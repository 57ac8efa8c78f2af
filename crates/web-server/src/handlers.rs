use crate::{
    envelope::{Envelope, Operation},
    error::AppError,
    extract::Payload,
    middleware::DbSession,
};
use axum::{extract::State, Json};
use core_types::Document;
use std::marker::PhantomData;
use std::sync::Arc;

/// Per-entity handler state: which collection the entity lives in.
pub struct Resource<T> {
    collection: Arc<str>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Resource<T> {
    pub fn new(collection: impl Into<Arc<str>>) -> Self {
        Self {
            collection: collection.into(),
            _entity: PhantomData,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }
}

impl<T> Clone for Resource<T> {
    fn clone(&self) -> Self {
        Self {
            collection: self.collection.clone(),
            _entity: PhantomData,
        }
    }
}

/// # GET /{resource}
/// Fetches every record in the collection.
pub async fn list<T: Document>(
    State(resource): State<Resource<T>>,
    DbSession(session): DbSession,
) -> Result<Json<Envelope<Vec<T>>>, AppError> {
    let records = session
        .collection::<T>(resource.collection())
        .list()
        .await
        .map_err(AppError::database(Operation::List))?;
    Ok(Json(Envelope::success(Operation::List, records)))
}

/// # POST /{resource}
/// Inserts the body (JSON or form-encoded); the store assigns the id when the body has none.
pub async fn create<T: Document>(
    State(resource): State<Resource<T>>,
    DbSession(session): DbSession,
    Payload(mut record): Payload<T>,
) -> Result<Json<Envelope<T>>, AppError> {
    session
        .collection::<T>(resource.collection())
        .insert(&mut record)
        .await
        .map_err(AppError::database(Operation::Insert))?;
    Ok(Json(Envelope::success(Operation::Insert, record)))
}

/// # PUT /{resource}
/// Replaces the stored record carrying the body's id. An unknown id changes
/// nothing and still succeeds.
pub async fn update<T: Document>(
    State(resource): State<Resource<T>>,
    DbSession(session): DbSession,
    Payload(record): Payload<T>,
) -> Result<Json<Envelope<T>>, AppError> {
    let id = record.id().ok_or(AppError::MissingId)?;
    let matched = session
        .collection::<T>(resource.collection())
        .update(&record)
        .await
        .map_err(AppError::database(Operation::Update))?;
    tracing::debug!(collection = resource.collection(), %id, matched, "Update applied.");
    Ok(Json(Envelope::success(Operation::Update, record)))
}

/// # DELETE /{resource}
/// Deletes the stored record carrying the body's id. An unknown id changes
/// nothing and still succeeds.
pub async fn remove<T: Document>(
    State(resource): State<Resource<T>>,
    DbSession(session): DbSession,
    Payload(record): Payload<T>,
) -> Result<Json<Envelope<T>>, AppError> {
    let id = record.id().ok_or(AppError::MissingId)?;
    let removed = session
        .collection::<T>(resource.collection())
        .delete(&record)
        .await
        .map_err(AppError::database(Operation::Delete))?;
    tracing::debug!(collection = resource.collection(), %id, removed, "Delete applied.");
    Ok(Json(Envelope::success(Operation::Delete, record)))
}
