use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database operation failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Could not establish a database session: {0}")]
    Unreachable(String),

    #[error("Stored document could not be mapped: {0}")]
    Document(#[from] core_types::CoreError),

    #[error("A document with id {0} already exists in the collection.")]
    DuplicateId(uuid::Uuid),

    #[error("The document store lock was poisoned.")]
    Poisoned,
}
