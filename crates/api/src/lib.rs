// crates/api/src/lib.rs

use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use intentor_core::{ClassificationResult, IntentorError, IntentorResult};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub mod handlers;
pub mod page;

pub use handlers::{ApiHandlers, ClassifierStatus, Rejection};

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_cors_enabled")]
    pub cors_enabled: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_port() -> u16 {
    8501
}

const fn default_cors_enabled() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: default_cors_enabled(),
        }
    }
}

/// API server
pub struct ApiServer {
    config: ApiConfig,
    handlers: Arc<ApiHandlers>,
}

impl ApiServer {
    pub fn new(config: ApiConfig, handlers: ApiHandlers) -> Self {
        Self {
            config,
            handlers: Arc::new(handlers),
        }
    }

    /// Serves until Ctrl+C.
    pub async fn serve(self) -> IntentorResult<()> {
        self.serve_with_shutdown(shutdown_signal()).await
    }

    pub async fn serve_with_shutdown<F>(self, signal: F) -> IntentorResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| IntentorError::Server(format!("Failed to bind {}: {}", addr, e)))?;

        info!("API server listening on http://{}", addr);
        if !self.handlers.is_configured() {
            error!("No API credential configured; classification requests will be refused");
        }

        axum::serve(listener, self.router())
            .with_graceful_shutdown(signal)
            .await
            .map_err(|e| IntentorError::Server(e.to_string()))?;

        info!("API server stopped");
        Ok(())
    }

    pub fn router(&self) -> Router {
        let mut app = Router::new()
            .route("/", get(index_handler))
            .route("/classify", post(classify_handler))
            .route("/health", get(health_check))
            .route("/ready", get(readiness_check))
            .route("/metrics", get(metrics_handler))
            .with_state(self.handlers.clone())
            .layer(TraceLayer::new_for_http());

        if self.config.cors_enabled {
            app = app.layer(CorsLayer::permissive());
        }

        app
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}

#[derive(Debug, Default, Deserialize)]
struct PageQuery {
    q: Option<String>,
}

// Front page
async fn index_handler(
    State(handlers): State<Arc<ApiHandlers>>,
    Query(params): Query<PageQuery>,
) -> Response {
    match handlers.render_page(params.q.as_deref()).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Page rendering failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub query: String,
}

// Classification endpoint
async fn classify_handler(
    State(handlers): State<Arc<ApiHandlers>>,
    payload: Result<Json<ClassifyRequest>, JsonRejection>,
) -> Response {
    // Unreadable bodies get the same error record as every other failure.
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let status = rejection.status();
            let body = ClassificationResult::failure(rejection.body_text());
            return (status, Json(body)).into_response();
        }
    };

    match handlers.classify(&request.query).await {
        Ok(result) => Json(result).into_response(),
        Err(rejection) => rejection.into_response(),
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        let status = match self {
            Rejection::EmptyQuery => StatusCode::BAD_REQUEST,
            Rejection::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        (status, Json(ClassificationResult::failure(self.to_string()))).into_response()
    }
}

// Health check endpoint
async fn health_check(State(handlers): State<Arc<ApiHandlers>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now(),
        "details": handlers.health(),
    }))
}

// Readiness check endpoint
async fn readiness_check(State(handlers): State<Arc<ApiHandlers>>) -> impl IntoResponse {
    let status = if handlers.is_configured() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(serde_json::json!({
            "ready": handlers.is_configured(),
            "reason": handlers.config_error(),
            "timestamp": chrono::Utc::now(),
        })),
    )
}

// Metrics endpoint
async fn metrics_handler(State(handlers): State<Arc<ApiHandlers>>) -> Response {
    match handlers.get_metrics() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}
