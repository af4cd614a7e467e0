use serde::ser::SerializeStruct;
use serde::Serialize;
use serde::Serializer;
use serde_json::Value;

use super::EntityId;
use super::EntityRow;

/// Last known result of one view
///
/// `rows.len() <= limit` and rows are unique by id. `total_pages` is always
/// derived from `total` and `limit`.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSnapshot {
    rows: Vec<EntityRow>,
    page: u32,
    limit: u32,
    total: u64,
}

impl ViewSnapshot {
    pub(crate) fn new(
        rows: Vec<EntityRow>,
        page: u32,
        limit: u32,
        total: u64,
    ) -> Self {
        Self {
            rows,
            page,
            limit,
            total,
        }
    }

    pub fn rows(&self) -> &[EntityRow] {
        &self.rows
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn total_pages(&self) -> u64 {
        if self.total == 0 {
            0
        } else {
            self.total.div_ceil(u64::from(self.limit))
        }
    }

    pub fn position(
        &self,
        id: &EntityId,
    ) -> Option<usize> {
        self.rows.iter().position(|row| row.id() == id)
    }

    pub fn contains(
        &self,
        id: &EntityId,
    ) -> bool {
        self.position(id).is_some()
    }

    pub fn row_ids(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.id().as_str()).collect()
    }

    pub(crate) fn replace_at(
        &mut self,
        index: usize,
        row: EntityRow,
    ) {
        self.rows[index] = row;
    }

    /// Prepends `row`, evicting the tail when the page overflows.
    pub(crate) fn push_front(
        &mut self,
        row: EntityRow,
    ) -> Option<EntityRow> {
        self.rows.insert(0, row);
        self.total = self.total.saturating_add(1);
        if self.rows.len() > self.limit as usize {
            self.rows.pop()
        } else {
            None
        }
    }

    /// Removes the row at `index`. Returns `false` when `total` was already
    /// zero and the decrement had to be floored.
    pub(crate) fn remove_at(
        &mut self,
        index: usize,
    ) -> bool {
        self.rows.remove(index);
        match self.total.checked_sub(1) {
            Some(total) => {
                self.total = total;
                true
            }
            None => false,
        }
    }
}

impl Serialize for ViewSnapshot {
    fn serialize<S>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("ViewSnapshot", 5)?;
        state.serialize_field("rows", &self.rows)?;
        state.serialize_field("page", &self.page)?;
        state.serialize_field("limit", &self.limit)?;
        state.serialize_field("total", &self.total)?;
        state.serialize_field("totalPages", &self.total_pages())?;
        state.end()
    }
}

/// Result of the initial paginated fetch a view is seeded from
///
/// Rows are expected newest-first, as returned by the list API.
#[derive(Debug, Clone, Default)]
pub struct ViewSeed {
    pub rows: Vec<Value>,
    pub total: u64,
}

impl ViewSeed {
    pub fn new(
        rows: Vec<Value>,
        total: u64,
    ) -> Self {
        Self { rows, total }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}
