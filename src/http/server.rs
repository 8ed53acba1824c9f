//! HTTP Server
//!
//! Router, shared state and the serve loop.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use parking_lot::Mutex;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::error::Result;
use crate::tree::Tree;

use super::handlers;

/// State shared by every request
///
/// The whole tree sits behind one mutex: it is the exclusive-access boundary
/// the single-owner tree requires. `None` once the tree has been closed.
pub struct AppState {
    tree: Mutex<Option<Tree>>,
}

impl AppState {
    pub fn new(tree: Tree) -> Self {
        Self {
            tree: Mutex::new(Some(tree)),
        }
    }

    /// Open a tree from `config` and wrap it
    pub fn open(config: Config) -> Result<Self> {
        Tree::open(config).map(Self::new)
    }

    /// Run `op` with exclusive access to the tree; `None` if already closed
    pub fn with_tree<T, F>(&self, op: F) -> Option<Result<T>>
    where
        F: FnOnce(&mut Tree) -> Result<T>,
    {
        let mut guard = self.tree.lock();
        guard.as_mut().map(op)
    }

    /// Close the tree; later requests get 503
    pub fn close(&self) -> Result<()> {
        match self.tree.lock().take() {
            Some(tree) => tree.close(),
            None => Ok(()),
        }
    }
}

/// Build the router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/command/:key",
            post(handlers::put_value).fallback(handlers::method_not_allowed),
        )
        .route(
            "/query/:key",
            get(handlers::get_value).fallback(handlers::method_not_allowed),
        )
        .route(
            "/command/",
            post(handlers::missing_param).fallback(handlers::method_not_allowed),
        )
        .route(
            "/query/",
            get(handlers::missing_param).fallback(handlers::method_not_allowed),
        )
        .fallback(handlers::unknown_route)
        .layer(middleware::from_fn(trace))
        .with_state(state)
}

/// Serve until Ctrl+C, then close the tree
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> Result<()> {
    serve_with_shutdown(listener, state, ctrl_c()).await
}

/// Serve until `shutdown` resolves, then close the tree
pub async fn serve_with_shutdown<S>(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: S,
) -> Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let app = create_router(Arc::clone(&state));

    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Listening on {}", addr);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Server stopped, closing tree");
    state.close()
}

/// Access log: one line per request
async fn trace(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(req).await;

    tracing::info!(
        %method,
        %path,
        status = response.status().as_u16(),
        duration = ?started.elapsed(),
        "request"
    );
    response
}

async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C, initiating shutdown..."),
        Err(e) => tracing::error!("Failed to listen for Ctrl+C: {}", e),
    }
}
