//! Response DTOs for the import endpoint.
//!
//! # Design
//! The engine answers with `{"attributes": {...}}` and makes no promise about
//! which keys are present. `ImportedApp` keeps the attributes as a
//! `serde_json::Map` and pins down how each JSON variant is rendered as text,
//! so a missing field degrades to `NIL_SENTINEL` instead of an error. A
//! `null` body or `null` attributes decode the same as an empty map.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Text produced for an attribute that is absent or JSON `null`.
pub const NIL_SENTINEL: &str = "<nil>";

/// Decoded body of a successful import.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ImportedApp {
    #[serde(default, deserialize_with = "deserialize_nullable_map")]
    pub attributes: Map<String, Value>,
}

fn deserialize_nullable_map<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ImportedApp {
    /// Decode a response body; a top-level `null` yields an app with no attributes.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        Ok(serde_json::from_slice::<Option<Self>>(body)?.unwrap_or_default())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Render the attribute stored at `key` as text. Never fails.
    ///
    /// - strings are returned without quotes
    /// - numbers and booleans use their JSON text (`42`, `1.5`, `true`)
    /// - `null` and absent keys yield [`NIL_SENTINEL`]
    /// - arrays and objects are rendered as compact JSON
    pub fn get_as_string(&self, key: &str) -> String {
        match self.attributes.get(key) {
            None | Some(Value::Null) => NIL_SENTINEL.to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Bool(b)) => b.to_string(),
            Some(Value::Number(n)) => n.to_string(),
            Some(nested @ (Value::Array(_) | Value::Object(_))) => nested.to_string(),
        }
    }

    pub fn info(&self) -> ImportedAppInfo {
        ImportedAppInfo {
            id: self.get_as_string("id"),
            name: self.get_as_string("name"),
        }
    }
}

/// The two identifiers callers need after an import.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImportedAppInfo {
    pub id: String,
    pub name: String,
}
