use crate::error::DbError;
use configuration::DatabaseSettings;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

/// The full connection info: host, port, database and credentials.
pub fn connect_options(settings: &DatabaseSettings) -> PgConnectOptions {
    let options = PgConnectOptions::new()
        .host(&settings.host)
        .port(settings.port)
        .database(&settings.name)
        .username(&settings.username);

    match &settings.password {
        Some(password) => options.password(password),
        None => options,
    }
}

/// The simpler direct-host dial. Everything but host and port is left to the
/// driver's defaults (`PG*` environment variables, then built-ins).
pub fn direct_host_options(settings: &DatabaseSettings) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&settings.host)
        .port(settings.port)
}

/// Builds a pool that dials on first use. The dial timeout bounds every
/// connection checkout.
pub fn lazy_pool(settings: &DatabaseSettings, options: PgConnectOptions) -> PgPool {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.dial_timeout())
        .connect_lazy_with(options)
}

/// Establishes a connection pool to the PostgreSQL database, falling back to
/// the direct-host dial if the full connection info is rejected.
pub async fn connect(settings: &DatabaseSettings) -> Result<PgPool, DbError> {
    let pool_options = || {
        PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.dial_timeout())
    };

    match pool_options().connect_with(connect_options(settings)).await {
        Ok(pool) => Ok(pool),
        Err(primary) => {
            tracing::warn!(error = %primary, host = %settings.host, "Database dial failed, retrying with direct host.");
            pool_options()
                .connect_with(direct_host_options(settings))
                .await
                .map_err(|fallback| {
                    DbError::Unreachable(format!("primary: {primary}; direct host: {fallback}"))
                })
        }
    }
}

/// Applies the embedded migrations, creating the `documents` table if needed.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    // Use a relative path from the crate root
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
