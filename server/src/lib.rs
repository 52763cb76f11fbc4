//! HTTP surface of the charges dashboard.

pub mod error;
mod routes;

use std::{io, sync::Arc};

use axum::{
    Router,
    routing::{get, post},
};
use log::{info, warn};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tuner::Workbench;

pub use error::ApiError;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub workbench: Arc<Workbench>,
}

/// Builds the application router.
///
/// # Arguments
/// * `workbench` - The prepared workbench, already holding its cache.
pub fn router(workbench: Arc<Workbench>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/predict",
            post(routes::predict).fallback(routes::method_not_allowed),
        )
        .route(
            "/predictAll",
            get(routes::predict_all).fallback(routes::method_not_allowed),
        )
        .route(
            "/parameter-ranges",
            get(routes::parameter_ranges).fallback(routes::method_not_allowed),
        )
        .route(
            "/model-performance",
            get(routes::model_performance).fallback(routes::method_not_allowed),
        )
        .route(
            "/health",
            get(routes::health).fallback(routes::method_not_allowed),
        )
        .layer(cors)
        .with_state(AppState { workbench })
}

/// Serves `workbench` on `listener` until Ctrl-C is received.
///
/// # Errors
/// Returns an `io::Error` if the server fails while accepting connections.
pub async fn serve(listener: TcpListener, workbench: Arc<Workbench>) -> io::Result<()> {
    let addr = listener.local_addr()?;
    info!("listening on http://{addr}");

    axum::serve(listener, router(workbench))
        .with_graceful_shutdown(shutdown())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received ctrl-c, shutting down"),
        Err(e) => {
            warn!("can't listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    }
}
