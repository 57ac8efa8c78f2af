use crate::error::CoreError;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The JSON key that carries a document's identifier on the wire.
pub const ID_FIELD: &str = "id";

/// The identifier of a stored document.
///
/// Assigned by the store on insertion and immutable afterwards. Serialized as
/// a plain UUID string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// A fresh random id. Zero-valued records carry no id at all.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for DocumentId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for DocumentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// An entity that can be stored as a document in a single collection.
///
/// Implementors serialize to a JSON object whose `id` key holds the
/// [`DocumentId`] (omitted while unassigned). Everything else in the object is
/// the document body.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The route segment the entity is served under, e.g. `customer`.
    const RESOURCE: &'static str;

    fn id(&self) -> Option<DocumentId>;

    fn set_id(&mut self, id: DocumentId);

    /// Splits the record into the body that gets persisted. The id is stored
    /// alongside the body, never inside it.
    fn to_body(&self) -> Result<JsonValue, CoreError> {
        match serde_json::to_value(self)? {
            JsonValue::Object(mut map) => {
                map.remove(ID_FIELD);
                Ok(JsonValue::Object(map))
            }
            other => Err(CoreError::NotAnObject(other.to_string())),
        }
    }

    /// Rebuilds a record from a stored id and body.
    fn from_parts(id: DocumentId, body: JsonValue) -> Result<Self, CoreError> {
        let mut map = match body {
            JsonValue::Object(map) => map,
            JsonValue::Null => Map::new(),
            other => return Err(CoreError::NotAnObject(other.to_string())),
        };
        map.insert(ID_FIELD.to_string(), JsonValue::String(id.to_string()));
        Ok(serde_json::from_value(JsonValue::Object(map))?)
    }
}
