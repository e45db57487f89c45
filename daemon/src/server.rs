//! HTTP/WebSocket front end

use crate::collector::MetricsProvider;
use crate::config::{Config, StreamMode};
use crate::directory;
use crate::error::ServiceError;
use crate::executor;
use crate::protocol::ProcessRecord;
use crate::streamer::{self, FrameSink, Publisher, Sampler};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Json, Router};
use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[derive(Clone)]
enum StreamSource {
    PerClient { interval: Duration },
    Shared(Publisher),
}

/// Handles shared by every request. Nothing in here is mutated after
/// construction.
#[derive(Clone)]
pub struct AppState {
    provider: Arc<dyn MetricsProvider>,
    sampler: Sampler,
    stream: StreamSource,
    process_limit: usize,
}

impl AppState {
    /// Must be called inside a Tokio runtime when `config.stream.mode` is
    /// `shared`, since that spawns the publisher task.
    pub fn new(provider: Arc<dyn MetricsProvider>, config: &Config) -> Self {
        let sampler = Sampler::new(Arc::clone(&provider), config.stream.sample_window());
        let stream = match config.stream.mode {
            StreamMode::PerClient => StreamSource::PerClient {
                interval: config.stream.interval(),
            },
            StreamMode::Shared => StreamSource::Shared(Publisher::spawn(
                sampler.clone(),
                config.stream.interval(),
                config.stream.channel_capacity,
            )),
        };
        Self {
            provider,
            sampler,
            stream,
            process_limit: config.processes.limit,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/processes", get(list_processes))
        .route("/kill", any(kill_process))
        .layer(middleware::from_fn(cors));

    Router::new()
        .route("/ws", get(stream_stats))
        .merge(api)
        .with_state(state)
}

async fn cors(request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        next.run(request).await
    };
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, DELETE, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}

async fn stream_stats(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_failed_upgrade(|e| warn!("WS upgrade error: {}", e))
        .on_upgrade(move |socket| async move {
            match state.stream {
                StreamSource::PerClient { interval } => {
                    streamer::run_session(socket, state.sampler, interval).await
                }
                StreamSource::Shared(publisher) => {
                    streamer::forward_session(socket, publisher.subscribe()).await
                }
            }
        })
}

#[async_trait::async_trait]
impl FrameSink for WebSocket {
    type Error = axum::Error;

    async fn send_frame(&mut self, frame: String) -> Result<(), Self::Error> {
        self.send(Message::Text(frame)).await
    }
}

async fn list_processes(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProcessRecord>>, ServiceError> {
    let provider = Arc::clone(&state.provider);
    let limit = state.process_limit;
    tokio::task::spawn_blocking(move || directory::list_processes(provider.as_ref(), limit))
        .await
        .map_err(|e| ServiceError::Enumeration(e.to_string()))?
        .map(Json)
}

async fn kill_process(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<String, ServiceError> {
    let raw = params.get("pid").map(String::as_str).unwrap_or_default();
    let pid = executor::parse_pid(raw)?;
    let provider = Arc::clone(&state.provider);
    tokio::task::spawn_blocking(move || executor::terminate_pid(provider.as_ref(), pid))
        .await
        .map_err(|e| {
            warn!(pid, "Kill task failed: {}", e);
            ServiceError::KillFailed(pid)
        })??;
    Ok(format!("Process {} terminated", pid))
}

/// Listening socket plus the routes served on it.
pub struct HttpServer {
    listener: TcpListener,
    router: Router,
}

impl HttpServer {
    pub async fn bind(addr: SocketAddr, state: AppState) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!("HTTP server listening on {}", listener.local_addr()?);
        Ok(Self {
            listener,
            router: router(state),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves until `shutdown` resolves. Open streams are not awaited; their
    /// sockets close when the runtime drops the session tasks.
    pub async fn serve<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
    }
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
