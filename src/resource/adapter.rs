use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::Debug;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::constants::DEFAULT_DELETED_AT_FIELD;
use crate::constants::DEFAULT_ID_FIELD;
use crate::EntityRow;
use crate::EntityStatus;

/// Declared type of a filterable column
///
/// Filter values always arrive as strings; the entity's value is coerced to
/// its string form according to the declared kind before comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Boolean,
    Number,
}

impl FieldKind {
    /// String form of `value` under this kind, `None` when the value cannot
    /// take part in an equality filter.
    pub fn coerce(
        &self,
        value: &Value,
    ) -> Option<String> {
        match (self, value) {
            (FieldKind::Text, Value::String(s)) => Some(s.clone()),
            (FieldKind::Text, Value::Number(n)) => Some(n.to_string()),
            (FieldKind::Text, Value::Bool(b)) => Some(b.to_string()),

            (FieldKind::Boolean, Value::Bool(b)) => Some(b.to_string()),
            (FieldKind::Boolean, Value::String(s)) if s == "true" || s == "false" => Some(s.clone()),

            (FieldKind::Number, Value::Number(n)) => match (n.as_i64(), n.as_u64()) {
                (Some(i), _) => Some(i.to_string()),
                (None, Some(u)) => Some(u.to_string()),
                _ => n.as_f64().map(canonical_number),
            },
            (FieldKind::Number, Value::String(s)) => parse_number(s).map(canonical_number),

            _ => None,
        }
    }

    /// Canonical form of a filter value under this kind, so `"02"` and
    /// `"2.0"` compare equal to an entity holding `2`. Values that are not
    /// valid for the kind are kept as given and can never match.
    pub fn canonical_filter<'a>(
        &self,
        expected: &'a str,
    ) -> Cow<'a, str> {
        match self {
            FieldKind::Number => match parse_number(expected) {
                Some(n) => Cow::Owned(canonical_number(n)),
                None => Cow::Borrowed(expected),
            },
            FieldKind::Text | FieldKind::Boolean => Cow::Borrowed(expected),
        }
    }
}

fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Integral values print without a fractional part: `2.0` becomes `"2"`.
fn canonical_number(n: f64) -> String {
    // Integral and exactly representable
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    /// Deleted iff the field holds a non-null value (e.g. `deletedAt`)
    #[default]
    Timestamp,
    /// Deleted iff the field is boolean `true` (e.g. `isDeleted`)
    Flag,
}

/// How an entity's own fields say whether it is soft-deleted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRule {
    kind: StatusKind,
    field: String,
}

impl StatusRule {
    pub fn timestamp(field: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Timestamp,
            field: field.into(),
        }
    }

    pub fn flag(field: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Flag,
            field: field.into(),
        }
    }

    pub fn new(
        kind: StatusKind,
        field: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            field: field.into(),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn kind(&self) -> StatusKind {
        self.kind
    }

    /// Status carried by a raw JSON object
    pub fn status_of_fields(
        &self,
        fields: &Map<String, Value>,
    ) -> EntityStatus {
        let deleted = match (self.kind, fields.get(&self.field)) {
            (StatusKind::Timestamp, Some(value)) => !value.is_null(),
            (StatusKind::Flag, Some(Value::Bool(flag))) => *flag,
            _ => false,
        };
        if deleted {
            EntityStatus::Deleted
        } else {
            EntityStatus::Active
        }
    }

    pub fn status_of(
        &self,
        entity: &EntityRow,
    ) -> EntityStatus {
        self.status_of_fields(entity.fields())
    }
}

impl Default for StatusRule {
    fn default() -> Self {
        Self::timestamp(DEFAULT_DELETED_AT_FIELD)
    }
}

/// Per-resource knowledge the generic engine is parameterized by
///
/// The normalizer uses it to find the entity and its id inside a payload;
/// the matcher uses it to find searchable text, filter columns and the
/// status-determining field.
pub trait ResourceAdapter: Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Payload key wrapping the entity, if any
    fn envelope(&self) -> Option<&str>;

    fn id_field(&self) -> &str;

    fn searchable_fields(&self) -> &[String];

    /// Kind of a declared filter column, `None` for undeclared columns
    fn filter_kind(
        &self,
        column: &str,
    ) -> Option<FieldKind>;

    fn status_rule(&self) -> &StatusRule;

    fn status_of(
        &self,
        entity: &EntityRow,
    ) -> EntityStatus {
        self.status_rule().status_of(entity)
    }

    /// Locates the entity object inside a payload object. A payload that
    /// lacks the envelope key is taken to be the entity itself.
    fn extract_entity<'a>(
        &self,
        payload: &'a Map<String, Value>,
    ) -> Option<&'a Map<String, Value>> {
        match self.envelope().and_then(|key| payload.get(key)) {
            Some(Value::Object(entity)) => Some(entity),
            Some(_) => None,
            None => Some(payload),
        }
    }
}

/// Declarative adapter used for every built-in and configured resource
#[derive(Debug, Clone)]
pub struct ResourceSpec {
    name: String,
    envelope: Option<String>,
    id_field: String,
    searchable_fields: Vec<String>,
    filters: BTreeMap<String, FieldKind>,
    status: StatusRule,
}

impl ResourceSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            envelope: None,
            id_field: DEFAULT_ID_FIELD.to_string(),
            searchable_fields: Vec::new(),
            filters: BTreeMap::new(),
            status: StatusRule::default(),
        }
    }

    pub fn with_envelope(
        mut self,
        key: impl Into<String>,
    ) -> Self {
        self.envelope = Some(key.into());
        self
    }

    pub fn with_id_field(
        mut self,
        field: impl Into<String>,
    ) -> Self {
        self.id_field = field.into();
        self
    }

    pub fn with_searchable<I, S>(
        mut self,
        fields: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.searchable_fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn with_filter(
        mut self,
        column: impl Into<String>,
        kind: FieldKind,
    ) -> Self {
        self.filters.insert(column.into(), kind);
        self
    }

    pub fn with_status(
        mut self,
        rule: StatusRule,
    ) -> Self {
        self.status = rule;
        self
    }

    pub fn filter_columns(&self) -> impl Iterator<Item = (&str, FieldKind)> {
        self.filters.iter().map(|(column, kind)| (column.as_str(), *kind))
    }
}

impl ResourceAdapter for ResourceSpec {
    fn name(&self) -> &str {
        &self.name
    }

    fn envelope(&self) -> Option<&str> {
        self.envelope.as_deref()
    }

    fn id_field(&self) -> &str {
        &self.id_field
    }

    fn searchable_fields(&self) -> &[String] {
        &self.searchable_fields
    }

    fn filter_kind(
        &self,
        column: &str,
    ) -> Option<FieldKind> {
        self.filters.get(column).copied()
    }

    fn status_rule(&self) -> &StatusRule {
        &self.status
    }
}
