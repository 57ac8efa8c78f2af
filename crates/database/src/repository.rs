use crate::error::DbError;
use crate::store::DocumentStore;
use core_types::Document;
use std::marker::PhantomData;
use std::sync::Arc;

/// The `Collection` provides a typed, entity-level interface to one named
/// collection. It maps records to and from stored documents and leaves every
/// driver error untouched.
pub struct Collection<T> {
    store: Arc<dyn DocumentStore>,
    name: String,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Document> Collection<T> {
    pub fn new(store: Arc<dyn DocumentStore>, name: impl Into<String>) -> Self {
        Self {
            store,
            name: name.into(),
            _entity: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fetches every record in the collection. No filter, no paging, no order.
    pub async fn list(&self) -> Result<Vec<T>, DbError> {
        let documents = self.store.find_all(&self.name).await?;
        let records = documents
            .into_iter()
            .map(|doc| T::from_parts(doc.id.into(), doc.body))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Inserts the record and writes the assigned id back into it.
    pub async fn insert(&self, record: &mut T) -> Result<(), DbError> {
        let body = record.to_body()?;
        let requested = record.id().map(|id| id.as_uuid());
        let assigned = self.store.insert(&self.name, requested, &body).await?;
        record.set_id(assigned.into());
        tracing::debug!(collection = %self.name, id = %assigned, "Document inserted.");
        Ok(())
    }

    /// Replaces the stored document carrying the record's id with the record.
    /// A record without an id, or with an id nobody has, matches nothing.
    pub async fn update(&self, record: &T) -> Result<u64, DbError> {
        let Some(id) = record.id() else {
            return Ok(0);
        };
        let body = record.to_body()?;
        self.store.replace(&self.name, id.as_uuid(), &body).await
    }

    /// Deletes the stored document carrying the record's id.
    pub async fn delete(&self, record: &T) -> Result<u64, DbError> {
        let Some(id) = record.id() else {
            return Ok(0);
        };
        self.store.remove(&self.name, id.as_uuid()).await
    }

    /// Removes everything from the collection.
    pub async fn drop_all(&self) -> Result<u64, DbError> {
        self.store.drop_collection(&self.name).await
    }

    /// Empties the collection and, with `seed`, inserts one zero-valued
    /// record. Returns how many documents were removed.
    pub async fn reset(&self, seed: bool) -> Result<u64, DbError>
    where
        T: Default,
    {
        let removed = self.drop_all().await?;
        if seed {
            let mut blank = T::default();
            self.insert(&mut blank).await?;
        }
        Ok(removed)
    }
}
