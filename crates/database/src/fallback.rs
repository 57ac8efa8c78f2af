use async_trait::async_trait;

use crate::error::DbError;
use crate::store::{Connector, Session};

/// Tries `primary` first and dials `fallback` only when that fails. When
/// neither establishes a session the caller gets [`DbError::Unreachable`]
/// naming both failures.
#[derive(Debug)]
pub struct FallbackConnector<P, F> {
    primary: P,
    fallback: F,
}

impl<P, F> FallbackConnector<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl<P: Connector, F: Connector> Connector for FallbackConnector<P, F> {
    async fn open_session(&self) -> Result<Session, DbError> {
        match self.primary.open_session().await {
            Ok(session) => Ok(session),
            Err(primary) => {
                tracing::warn!(error = %primary, "Primary database session failed, trying fallback.");
                self.fallback.open_session().await.map_err(|fallback| {
                    DbError::Unreachable(format!("primary: {primary}; fallback: {fallback}"))
                })
            }
        }
    }
}
