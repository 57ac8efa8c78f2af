use crate::error::AppError;
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use database::{Connector, Session};
use std::sync::Arc;

/// Establishes a database session for the request and publishes it in the
/// request extensions. When no session can be established the handler never
/// runs and the client gets a 503.
pub async fn attach_session(
    State(connector): State<Arc<dyn Connector>>,
    mut request: Request,
    next: Next,
) -> Response {
    match connector.open_session().await {
        Ok(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Err(err) => AppError::Unavailable(err).into_response(),
    }
}

/// The session [`attach_session`] established for this request.
#[derive(Debug, Clone)]
pub struct DbSession(pub Session);

#[async_trait]
impl<S> FromRequestParts<S> for DbSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(DbSession)
            .ok_or(AppError::SessionMissing)
    }
}
