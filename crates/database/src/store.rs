use crate::error::DbError;
use crate::repository::Collection;
use async_trait::async_trait;
use core_types::Document;
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// A document as the store keeps it: the id beside the JSON body.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct StoredDocument {
    pub id: Uuid,
    pub body: JsonValue,
}

/// Raw CRUD over named collections of JSON documents.
///
/// Implementations check out whatever connection they need for the duration
/// of a single call and release it before returning, on success or failure.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Every document in the collection, in no particular order.
    async fn find_all(&self, collection: &str) -> Result<Vec<StoredDocument>, DbError>;

    /// Writes a new document and returns its id. The store assigns one when
    /// `id` is `None`.
    async fn insert(
        &self,
        collection: &str,
        id: Option<Uuid>,
        body: &JsonValue,
    ) -> Result<Uuid, DbError>;

    /// Replaces the body of the document with `id`. Returns how many documents
    /// matched; zero is not an error.
    async fn replace(&self, collection: &str, id: Uuid, body: &JsonValue) -> Result<u64, DbError>;

    /// Removes the document with `id`. Returns how many were removed; zero is
    /// not an error.
    async fn remove(&self, collection: &str, id: Uuid) -> Result<u64, DbError>;

    /// Removes every document in the collection.
    async fn drop_collection(&self, collection: &str) -> Result<u64, DbError>;
}

/// Establishes sessions against a store.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    async fn open_session(&self) -> Result<Session, DbError>;
}

/// A live handle on a document store, established once per request.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn DocumentStore>,
}

impl Session {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// A typed view of one collection through this session.
    pub fn collection<T: Document>(&self, name: &str) -> Collection<T> {
        Collection::new(self.store.clone(), name)
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}
