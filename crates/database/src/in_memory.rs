use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::store::{Connector, DocumentStore, Session, StoredDocument};

type Collections = HashMap<String, BTreeMap<Uuid, JsonValue>>;

/// In-memory document store.
///
/// Intended for tests/dev. Clones share the same documents, and every session
/// it hands out points at them too.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<Collections>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn find_all(&self, collection: &str) -> Result<Vec<StoredDocument>, DbError> {
        let collections = self.collections.read().map_err(|_| DbError::Poisoned)?;
        let documents = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, body)| StoredDocument {
                        id: *id,
                        body: body.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(documents)
    }

    async fn insert(
        &self,
        collection: &str,
        id: Option<Uuid>,
        body: &JsonValue,
    ) -> Result<Uuid, DbError> {
        let mut collections = self.collections.write().map_err(|_| DbError::Poisoned)?;
        let docs = collections.entry(collection.to_string()).or_default();
        let id = id.unwrap_or_else(Uuid::new_v4);
        if docs.contains_key(&id) {
            return Err(DbError::DuplicateId(id));
        }
        docs.insert(id, body.clone());
        Ok(id)
    }

    async fn replace(&self, collection: &str, id: Uuid, body: &JsonValue) -> Result<u64, DbError> {
        let mut collections = self.collections.write().map_err(|_| DbError::Poisoned)?;
        match collections.get_mut(collection).and_then(|docs| docs.get_mut(&id)) {
            Some(existing) => {
                *existing = body.clone();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn remove(&self, collection: &str, id: Uuid) -> Result<u64, DbError> {
        let mut collections = self.collections.write().map_err(|_| DbError::Poisoned)?;
        let removed = collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(&id))
            .is_some();
        Ok(u64::from(removed))
    }

    async fn drop_collection(&self, collection: &str) -> Result<u64, DbError> {
        let mut collections = self.collections.write().map_err(|_| DbError::Poisoned)?;
        let removed = collections
            .remove(collection)
            .map(|docs| docs.len() as u64)
            .unwrap_or(0);
        Ok(removed)
    }
}

#[async_trait]
impl Connector for InMemoryDocumentStore {
    async fn open_session(&self) -> Result<Session, DbError> {
        Ok(Session::new(Arc::new(self.clone())))
    }
}
