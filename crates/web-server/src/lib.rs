use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use configuration::{CollectionSettings, Settings};
use core_types::{Cliente, Customer, Document};
use database::Connector;
use std::any::Any;
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

pub mod envelope;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;

use envelope::Envelope;
use handlers::Resource;

/// Request bodies larger than this are refused before binding.
const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// The four CRUD routes for one entity, mounted at `/{T::RESOURCE}`.
pub fn resource_routes<T: Document>(collection: &str) -> Router {
    Router::new()
        .route(
            &format!("/{}", T::RESOURCE),
            get(handlers::list::<T>)
                .post(handlers::create::<T>)
                .put(handlers::update::<T>)
                .delete(handlers::remove::<T>),
        )
        .with_state(Resource::<T>::new(collection))
}

/// Builds the application router. Entity routes run behind the session
/// middleware; `/health` does not touch the database.
pub fn build_router(connector: Arc<dyn Connector>, collections: &CollectionSettings) -> Router {
    let entities = Router::new()
        .merge(resource_routes::<Customer>(&collections.customer))
        .merge(resource_routes::<Cliente>(&collections.cliente))
        .route_layer(from_fn_with_state(connector, middleware::attach_session));

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .merge(entities)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(CatchPanicLayer::custom(handle_panic))
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
}

/// The main function to configure and run the web server.
pub async fn run_server(settings: &Settings, connector: Arc<dyn Connector>) -> anyhow::Result<()> {
    let app = build_router(connector, &settings.collections);

    let listener = tokio::net::TcpListener::bind(settings.server.addr).await?;
    tracing::info!("Web server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Web server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for the shutdown signal.");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received.");
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    tracing::error!(panic = %detail, "Handler panicked.");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(Envelope::failure("internal server error")),
    )
        .into_response()
}
