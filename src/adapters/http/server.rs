//! HTTP API for connecting a session and asking it questions.
//!
//! - `POST /connect` builds a new session and swaps it in on success.
//! - `POST /query` forwards a question to the live session.
//! - `GET /health` liveness check.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderValue, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::domain::errors::DomainError;
use crate::domain::models::Config;
use crate::services::{AgentFactory, SessionSlot};

/// Configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    /// Address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Origins allowed to make credentialed cross-origin requests.
    pub cors_origins: Vec<String>,
    /// Provider used when a connect request names none.
    pub default_provider: String,
    /// Log agent steps at info level.
    pub verbose: bool,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for HttpServerConfig {
    fn from(config: &Config) -> Self {
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
            cors_origins: config.server.cors_origins.clone(),
            default_provider: config.llm.default_provider.clone(),
            verbose: false,
        }
    }
}

/// Body of `POST /connect`.
#[derive(Debug, Deserialize)]
pub struct ConnectRequest {
    /// Database URI; required.
    #[serde(default)]
    pub db_uri: Option<String>,
    /// Provider tag; the configured default when absent.
    #[serde(default)]
    pub llm_provider: Option<String>,
}

/// Reply to a successful connect.
#[derive(Debug, Serialize, Deserialize)]
pub struct ConnectResponse {
    /// Always `connected`.
    pub status: String,
}

/// Body of `POST /query`.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    /// Question for the live session; required.
    #[serde(default)]
    pub question: Option<String>,
}

/// Reply to a successful query.
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    /// The agent's final answer.
    pub answer: String,
}

/// Error body, `{"detail": "..."}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub detail: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error(status: StatusCode, detail: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            detail: detail.into(),
        }),
    )
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        error(status, err.to_string())
    }
}

struct AppState {
    factory: AgentFactory,
    slot: SessionSlot,
    default_provider: String,
    verbose: bool,
}

/// The sqlchat HTTP API and the session it serves.
pub struct SqlChatHttpServer {
    config: HttpServerConfig,
    state: Arc<AppState>,
}

impl SqlChatHttpServer {
    /// Create a server with an empty session slot.
    pub fn new(factory: AgentFactory, config: HttpServerConfig) -> Self {
        let state = Arc::new(AppState {
            factory,
            slot: SessionSlot::new(),
            default_provider: config.default_provider.clone(),
            verbose: config.verbose,
        });
        Self { config, state }
    }

    fn cors_layer(&self) -> CorsLayer {
        let origins: Vec<HeaderValue> = self
            .config
            .cors_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true)
    }

    /// Build the router.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/connect", post(connect))
            .route("/query", post(query))
            .route("/health", get(health_check))
            .with_state(Arc::clone(&self.state))
            .layer(self.cors_layer())
            .layer(TraceLayer::new_for_http())
    }

    fn addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.config.host, self.config.port).parse()
    }

    /// Start the server with a shutdown signal.
    pub async fn serve_with_shutdown<F>(
        self,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr = self.addr()?;
        let router = self.router();

        info!("sqlchat HTTP server listening on {}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}

// Handler functions

async fn health_check() -> &'static str {
    "OK"
}

async fn connect(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ConnectRequest>, JsonRejection>,
) -> Result<Json<ConnectResponse>, ApiError> {
    let Json(request) = body.map_err(|e| error(StatusCode::BAD_REQUEST, e.body_text()))?;

    let db_uri = request
        .db_uri
        .filter(|uri| !uri.trim().is_empty())
        .ok_or_else(|| error(StatusCode::BAD_REQUEST, "db_uri is required"))?;
    let provider = request
        .llm_provider
        .unwrap_or_else(|| state.default_provider.clone());

    let agent = state
        .factory
        .create_session(&db_uri, &provider, state.verbose)
        .await
        .map_err(|e| {
            warn!(error = %e, "connect failed");
            error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    let session = agent.id();
    let agent_dialect = agent.dialect();
    let agent_tables = agent.table_names().len();
    if let Some(previous) = state.slot.replace(agent).await {
        info!(session = %session, replaced = %previous.id(), "session replaced");
    } else {
        info!(
            session = %session,
            dialect = %agent_dialect,
            tables = agent_tables,
            "session connected"
        );
    }

    Ok(Json(ConnectResponse {
        status: "connected".to_string(),
    }))
}

async fn query(
    State(state): State<Arc<AppState>>,
    body: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let agent = state.slot.current().await?;

    let Json(request) = body.map_err(|e| error(StatusCode::BAD_REQUEST, e.body_text()))?;
    let question = request
        .question
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| error(StatusCode::BAD_REQUEST, "question is required"))?;

    match agent.ask(&question).await {
        Ok(answer) => Ok(Json(QueryResponse { answer })),
        Err(e) => {
            warn!(session = %agent.id(), error = %e, "query failed");
            Err(error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}
