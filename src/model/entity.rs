use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde::Serializer;
use serde_json::Map;
use serde_json::Value;

/// Stable identity of an entity within one resource
///
/// Push payloads carry ids either as JSON strings or integers; both
/// normalize to the same textual id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reads an id out of a JSON value. Blank strings, floats, booleans,
    /// null and containers carry no usable id.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(Self(s.clone())),
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(Self(n.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A resource record as displayed in a table row
///
/// Fields are kept verbatim from the server payload; only the id is lifted
/// out so identity checks never re-parse the row.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRow {
    id: EntityId,
    fields: Map<String, Value>,
}

impl EntityRow {
    pub fn new(
        id: EntityId,
        fields: Map<String, Value>,
    ) -> Self {
        Self { id, fields }
    }

    /// Builds a row from a JSON object, taking its id from `id_field`.
    pub fn from_object(
        fields: Map<String, Value>,
        id_field: &str,
    ) -> Option<Self> {
        let id = fields.get(id_field).and_then(EntityId::from_value)?;
        Some(Self { id, fields })
    }

    pub fn from_value(
        value: Value,
        id_field: &str,
    ) -> Option<Self> {
        match value {
            Value::Object(fields) => Self::from_object(fields, id_field),
            _ => None,
        }
    }

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    pub fn field(
        &self,
        name: &str,
    ) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl Serialize for EntityRow {
    fn serialize<S>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.fields.serialize(serializer)
    }
}
