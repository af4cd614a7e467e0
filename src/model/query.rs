use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Status of a single entity: live or soft-deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityStatus {
    Active,
    Deleted,
}

impl EntityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityStatus::Active => "active",
            EntityStatus::Deleted => "deleted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(EntityStatus::Active),
            "deleted" => Some(EntityStatus::Deleted),
            _ => None,
        }
    }
}

/// Status axis a view is restricted to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Partition {
    #[default]
    Active,
    Deleted,
    All,
}

impl Partition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Partition::Active => "active",
            Partition::Deleted => "deleted",
            Partition::All => "all",
        }
    }

    pub fn includes(
        &self,
        status: EntityStatus,
    ) -> bool {
        match self {
            Partition::Active => status == EntityStatus::Active,
            Partition::Deleted => status == EntityStatus::Deleted,
            Partition::All => true,
        }
    }
}

impl From<EntityStatus> for Partition {
    fn from(status: EntityStatus) -> Self {
        match status {
            EntityStatus::Active => Partition::Active,
            EntityStatus::Deleted => Partition::Deleted,
        }
    }
}

/// Immutable descriptor of one cached view
///
/// Always held in normalized form: search is trimmed (blank becomes
/// `None`), filters with blank values are dropped and the rest are keyed by
/// column in sorted order. Two descriptors are equal iff their normalized
/// forms are, which is what makes them usable as a cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryParams {
    resource: String,
    partition: Partition,
    page: u32,
    limit: u32,
    search: Option<String>,
    filters: BTreeMap<String, String>,
}

impl QueryParams {
    /// First page of active rows, 20 per page, no search or filters.
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            partition: Partition::Active,
            page: 1,
            limit: 20,
            search: None,
            filters: BTreeMap::new(),
        }
    }

    pub fn partition(
        mut self,
        partition: Partition,
    ) -> Self {
        self.partition = partition;
        self
    }

    pub fn page(
        mut self,
        page: u32,
    ) -> Self {
        self.page = page;
        self
    }

    pub fn limit(
        mut self,
        limit: u32,
    ) -> Self {
        self.limit = limit;
        self
    }

    pub fn search(
        mut self,
        search: impl AsRef<str>,
    ) -> Self {
        let trimmed = search.as_ref().trim();
        self.search = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }

    /// Adds an equality constraint. A blank value removes the column's
    /// constraint; a repeated column keeps the last value.
    pub fn filter(
        mut self,
        column: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        let column = column.into();
        let value = value.into();
        if value.trim().is_empty() {
            self.filters.remove(&column);
        } else {
            self.filters.insert(column, value);
        }
        self
    }

    pub fn resource_name(&self) -> &str {
        &self.resource
    }

    pub fn partition_kind(&self) -> Partition {
        self.partition
    }

    pub fn page_number(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.limit
    }

    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn filters(&self) -> &BTreeMap<String, String> {
        &self.filters
    }

    pub fn key(&self) -> ViewKey {
        ViewKey(self.clone())
    }
}

/// Cache key of a registered view: the normalized query descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewKey(QueryParams);

impl ViewKey {
    pub fn params(&self) -> &QueryParams {
        &self.0
    }

    pub fn resource(&self) -> &str {
        &self.0.resource
    }
}

impl From<QueryParams> for ViewKey {
    fn from(params: QueryParams) -> Self {
        ViewKey(params)
    }
}

impl fmt::Display for ViewKey {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let q = &self.0;
        write!(
            f,
            "{}?partition={}&page={}&limit={}",
            q.resource,
            q.partition.as_str(),
            q.page,
            q.limit
        )?;
        if let Some(search) = &q.search {
            write!(f, "&search={search}")?;
        }
        for (column, value) in &q.filters {
            write!(f, "&{column}={value}")?;
        }
        Ok(())
    }
}
