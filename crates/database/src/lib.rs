//! # Gettyio Database Crate
//!
//! The Data Access Layer: CRUD over named collections of JSON documents.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** This crate encapsulates all storage-specific logic. Callers
//!   see typed collections of entities, never SQL.
//! - **Sessions:** A [`Connector`] establishes a [`Session`] per request. Every
//!   call made through a session checks a connection out of the pool and
//!   returns it when the call completes, whatever the outcome.
//! - **Pass-through errors:** Driver failures surface unchanged as [`DbError`].
//!   Nothing is retried or classified here.
//!
//! ## Public API
//!
//! - `PgConnector` / `PgDocumentStore`: the PostgreSQL (JSONB) implementation.
//! - `FallbackConnector`: a primary dial backed by a second one.
//! - `InMemoryDocumentStore`: the same contract held in process memory.
//! - `Collection`: the typed list/insert/update/delete interface.
//! - `connect` / `run_migrations`: eager connection and schema setup.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod fallback;
pub mod in_memory;
pub mod postgres;
pub mod repository;
pub mod store;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use fallback::FallbackConnector;
pub use in_memory::InMemoryDocumentStore;
pub use postgres::{PgConnector, PgDocumentStore};
pub use repository::Collection;
pub use store::{Connector, DocumentStore, Session, StoredDocument};
