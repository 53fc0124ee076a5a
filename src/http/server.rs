//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router that sends every method and path to the pipeline
//! - Wire up the tower-http trace layer
//! - Serve plain HTTP or HTTPS on an already bound listener
//! - Stop accepting and drain in-flight requests on shutdown

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::Response,
    routing::any,
    Router,
};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, oneshot};
use tower_http::trace::TraceLayer;

use crate::net::tls::{load_tls_config, TlsError};
use crate::pipeline::{builder::BuildError, Pipeline, PipelineBuilder};
use crate::state::SharedState;

/// How long in-flight requests may drain after shutdown.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Error type for the HTTP server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Pipeline(#[from] BuildError),
    #[error(transparent)]
    Tls(#[from] TlsError),
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP server for the logging endpoint and the proxy.
pub struct HttpServer {
    router: Router,
    state: Arc<SharedState>,
}

impl HttpServer {
    /// Create a new HTTP server for the given shared state.
    pub fn new(state: Arc<SharedState>) -> Result<Self, ServerError> {
        let pipeline = PipelineBuilder::new(&state).build()?;
        let router = Self::build_router(pipeline);
        Ok(Self { router, state })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(pipeline: Pipeline) -> Router {
        Router::new()
            .route("/{*path}", any(pipeline_handler))
            .route("/", any(pipeline_handler))
            .with_state(pipeline)
            .layer(TraceLayer::new_for_http())
    }

    /// The router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// the shutdown channel fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        match &self.state.config.listener.tls {
            None => {
                tracing::info!(address = %addr, "HTTP server starting");
                let (draining_tx, draining_rx) = oneshot::channel::<()>();
                let serve = axum::serve(listener, app)
                    .with_graceful_shutdown(async move {
                        let _ = shutdown.recv().await;
                        let _ = draining_tx.send(());
                    })
                    .into_future();

                tokio::select! {
                    result = serve => result?,
                    _ = async {
                        match draining_rx.await {
                            Ok(()) => tokio::time::sleep(SHUTDOWN_GRACE).await,
                            Err(_) => std::future::pending().await,
                        }
                    } => {
                        tracing::warn!(grace = ?SHUTDOWN_GRACE, "Grace period elapsed, dropping open connections");
                    }
                }
            }
            Some(tls) => {
                let rustls = load_tls_config(tls).await?;
                let handle = axum_server::Handle::new();

                let signal = handle.clone();
                tokio::spawn(async move {
                    let _ = shutdown.recv().await;
                    signal.graceful_shutdown(Some(SHUTDOWN_GRACE));
                });

                tracing::info!(address = %addr, "HTTPS server starting");
                axum_server::from_tcp_rustls(listener.into_std()?, rustls)
                    .handle(handle)
                    .serve(app)
                    .await?;
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Entry point for every request: hand it to the stage pipeline.
async fn pipeline_handler(
    State(pipeline): State<Pipeline>,
    ConnectInfo(remote_addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    pipeline.serve(request, remote_addr).await
}
