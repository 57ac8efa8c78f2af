use std::sync::Arc;

use async_trait::async_trait;
use configuration::DatabaseSettings;
use serde_json::Value as JsonValue;
use sqlx::{Connection, PgPool};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::connection::{connect_options, direct_host_options, lazy_pool, run_migrations};
use crate::error::DbError;
use crate::fallback::FallbackConnector;
use crate::store::{Connector, DocumentStore, Session, StoredDocument};

/// Document store over the `documents` table.
///
/// Each call checks a connection out of the pool and returns it when the
/// call completes.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn find_all(&self, collection: &str) -> Result<Vec<StoredDocument>, DbError> {
        let mut conn = self.pool.acquire().await?;
        let documents = sqlx::query_as::<_, StoredDocument>(
            "SELECT id, body FROM documents WHERE collection = $1",
        )
        .bind(collection)
        .fetch_all(&mut *conn)
        .await?;
        Ok(documents)
    }

    async fn insert(
        &self,
        collection: &str,
        id: Option<Uuid>,
        body: &JsonValue,
    ) -> Result<Uuid, DbError> {
        let mut conn = self.pool.acquire().await?;
        let assigned = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO documents (collection, id, body)
            VALUES ($1, COALESCE($2, gen_random_uuid()), $3)
            RETURNING id
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(body)
        .fetch_one(&mut *conn)
        .await?;
        Ok(assigned)
    }

    async fn replace(&self, collection: &str, id: Uuid, body: &JsonValue) -> Result<u64, DbError> {
        let mut conn = self.pool.acquire().await?;
        let result = sqlx::query("UPDATE documents SET body = $3 WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .bind(body)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }

    async fn remove(&self, collection: &str, id: Uuid) -> Result<u64, DbError> {
        let mut conn = self.pool.acquire().await?;
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }

    async fn drop_collection(&self, collection: &str) -> Result<u64, DbError> {
        let mut conn = self.pool.acquire().await?;
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1")
            .bind(collection)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }
}

/// One way of reaching the server, with its own pool. Migrations run the
/// first time a session is established through it.
#[derive(Debug)]
struct Endpoint {
    label: &'static str,
    pool: PgPool,
    schema: OnceCell<()>,
}

impl Endpoint {
    fn new(label: &'static str, pool: PgPool) -> Self {
        Self {
            label,
            pool,
            schema: OnceCell::new(),
        }
    }

    async fn establish(&self) -> Result<PgPool, DbError> {
        {
            let mut conn = self.pool.acquire().await?;
            conn.ping().await?;
        }
        self.schema
            .get_or_try_init(|| async {
                tracing::info!(endpoint = self.label, "Applying database migrations.");
                run_migrations(&self.pool).await
            })
            .await?;
        Ok(self.pool.clone())
    }
}

#[async_trait]
impl Connector for Endpoint {
    async fn open_session(&self) -> Result<Session, DbError> {
        let pool = self.establish().await?;
        Ok(Session::new(Arc::new(PgDocumentStore::new(pool))))
    }
}

/// Opens Postgres sessions: the full connection info first, then the
/// direct-host dial.
#[derive(Debug)]
pub struct PgConnector {
    endpoints: FallbackConnector<Endpoint, Endpoint>,
}

impl PgConnector {
    /// Builds both endpoints without dialing. Must be called inside a Tokio
    /// runtime.
    pub fn new(settings: &DatabaseSettings) -> Self {
        Self {
            endpoints: FallbackConnector::new(
                Endpoint::new("primary", lazy_pool(settings, connect_options(settings))),
                Endpoint::new(
                    "direct-host",
                    lazy_pool(settings, direct_host_options(settings)),
                ),
            ),
        }
    }
}

#[async_trait]
impl Connector for PgConnector {
    async fn open_session(&self) -> Result<Session, DbError> {
        self.endpoints.open_session().await
    }
}
