//! View predicate matching
//!
//! Decides whether an entity belongs in a view. Three independent checks,
//! all of which must hold: partition, column filters, free-text search.

use serde_json::Value;

use crate::EntityRow;
use crate::FieldKind;
use crate::Partition;
use crate::QueryParams;
use crate::ResourceAdapter;

/// True iff `entity` satisfies every predicate of `query`.
pub fn matches(
    adapter: &dyn ResourceAdapter,
    query: &QueryParams,
    entity: &EntityRow,
) -> bool {
    partition_matches(adapter, query.partition_kind(), entity)
        && filters_match(adapter, query, entity)
        && search_matches(adapter, query.search_term(), entity)
}

pub(crate) fn partition_matches(
    adapter: &dyn ResourceAdapter,
    partition: Partition,
    entity: &EntityRow,
) -> bool {
    match partition {
        Partition::All => true,
        p => p.includes(adapter.status_of(entity)),
    }
}

/// Every `(column, value)` constraint must equal the entity's coerced value.
/// A column missing from the entity never matches.
pub(crate) fn filters_match(
    adapter: &dyn ResourceAdapter,
    query: &QueryParams,
    entity: &EntityRow,
) -> bool {
    query.filters().iter().all(|(column, expected)| {
        let kind = adapter.filter_kind(column).unwrap_or(FieldKind::Text);
        entity
            .field(column)
            .and_then(|value| kind.coerce(value))
            .is_some_and(|actual| actual == kind.canonical_filter(expected))
    })
}

/// Case-insensitive substring search over the adapter's searchable fields.
/// No search term always matches.
pub(crate) fn search_matches(
    adapter: &dyn ResourceAdapter,
    search: Option<&str>,
    entity: &EntityRow,
) -> bool {
    let needle = match search.map(str::trim) {
        Some(term) if !term.is_empty() => term.to_lowercase(),
        _ => return true,
    };

    adapter.searchable_fields().iter().any(|field| match entity.field(field) {
        Some(Value::String(text)) => text.to_lowercase().contains(&needle),
        Some(Value::Number(n)) => n.to_string().contains(&needle),
        _ => false,
    })
}
