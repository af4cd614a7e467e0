use std::collections::HashSet;

use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_DELETED_AT_FIELD;
use crate::constants::DEFAULT_ID_FIELD;
use crate::constants::EVENT_NAME_SEPARATOR;
use crate::Error;
use crate::FieldKind;
use crate::ResourceSpec;
use crate::Result;
use crate::StatusKind;
use crate::StatusRule;

/// A filterable column of a configured resource
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct FilterColumnConfig {
    pub column: String,
    #[serde(default)]
    pub kind: FieldKind,
}

/// Resource declared in configuration instead of code
///
/// ```toml
/// [[resources]]
/// name = "audit_logs"
/// envelope = "log"
/// searchable_fields = ["message", "actorName"]
/// filters = [{ column = "level", kind = "text" }]
/// status_field = "archivedAt"
/// ```
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ResourceConfig {
    pub name: String,

    #[serde(default)]
    pub envelope: Option<String>,

    #[serde(default = "default_id_field")]
    pub id_field: String,

    #[serde(default)]
    pub searchable_fields: Vec<String>,

    #[serde(default)]
    pub filters: Vec<FilterColumnConfig>,

    #[serde(default = "default_status_field")]
    pub status_field: String,

    #[serde(default)]
    pub status_kind: StatusKind,
}

impl ResourceConfig {
    pub fn validate(&self) -> Result<()> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(Error::InvalidConfig("resource name cannot be empty".into()));
        }
        if name.contains(EVENT_NAME_SEPARATOR) {
            return Err(Error::InvalidConfig(format!(
                "resource name {name:?} cannot contain {EVENT_NAME_SEPARATOR:?}"
            )));
        }
        if self.id_field.trim().is_empty() {
            return Err(Error::InvalidConfig(format!("resource {name}: id_field cannot be empty")));
        }
        if self.status_field.trim().is_empty() {
            return Err(Error::InvalidConfig(format!(
                "resource {name}: status_field cannot be empty"
            )));
        }

        let mut columns = HashSet::new();
        for filter in &self.filters {
            if !columns.insert(filter.column.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "resource {name}: duplicate filter column {}",
                    filter.column
                )));
            }
        }
        Ok(())
    }

    pub fn to_spec(&self) -> ResourceSpec {
        let mut spec = ResourceSpec::new(self.name.trim())
            .with_id_field(&self.id_field)
            .with_searchable(self.searchable_fields.iter().cloned())
            .with_status(StatusRule::new(self.status_kind, &self.status_field));
        if let Some(envelope) = &self.envelope {
            spec = spec.with_envelope(envelope);
        }
        for filter in &self.filters {
            spec = spec.with_filter(&filter.column, filter.kind);
        }
        spec
    }
}

fn default_id_field() -> String {
    DEFAULT_ID_FIELD.to_string()
}
fn default_status_field() -> String {
    DEFAULT_DELETED_AT_FIELD.to_string()
}
