//! HTTP layer: five `/tracks/` routes over a shared `TrackStore`.

pub mod error;
pub mod handlers;

use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;

use crate::store::TrackStore;

/// Shared state handed to every handler via `State`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TrackStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn TrackStore>) -> Self {
        Self { store }
    }
}

/// Routes use the trailing-slash form only.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/tracks/",
            get(handlers::list_tracks).post(handlers::create_track),
        )
        .route(
            "/tracks/{id}/",
            get(handlers::get_track)
                .put(handlers::update_track)
                .delete(handlers::delete_track),
        )
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(req).await;

    log::info!(
        "{} {} -> {} ({:.1?})",
        method,
        path,
        response.status().as_u16(),
        started.elapsed()
    );
    response
}

/// Serve until Ctrl-C.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        log::info!("Listening on http://{addr}");
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => log::info!("Shutdown requested, draining connections"),
        Err(e) => {
            log::warn!("Cannot listen for Ctrl-C ({e}); running until killed");
            std::future::pending::<()>().await;
        }
    }
}
