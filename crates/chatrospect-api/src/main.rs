use std::io::{self, Write};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::{Args, Parser};
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use chatrospect_core::normalize::normalize;
use chatrospect_core::{
    AnalysisConfig, AnalysisReport, ChatMessage, Config, InputFormat, NoAnnotations, analyze_with,
};

fn main() {
    if let Err(err) = try_main() {
        let _ = writeln!(io::stderr(), "{err:?}");
        std::process::exit(1);
    }
}

#[tokio::main]
async fn try_main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config_path = cli
        .common
        .config
        .unwrap_or_else(Config::default_config_path);
    let config = Config::load_from_path(&config_path)?;
    let port = cli.common.port.unwrap_or(config.api.port);

    let state = AppState {
        config: Arc::new(config),
    };

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("Starting API server on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}

#[derive(Debug, Parser)]
#[command(author, version, about = "HTTP API server for chatrospect")]
struct Cli {
    #[command(flatten)]
    common: CommonOpts,
}

#[derive(Debug, Clone, Args)]
struct CommonOpts {
    /// Override the config file path
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Port to listen on (defaults to `api.port` from the config)
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
}

fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let max_body = state.config.api.max_body_bytes;

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/config", get(get_config))
        .route("/analyze", post(analyze))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct RootResponse {
    name: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn get_config(State(state): State<AppState>) -> Json<AnalysisConfig> {
    Json(state.config.analysis.clone())
}

/// Error body: `{"error": "..."}`.
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<chatrospect_core::Error> for ApiError {
    fn from(err: chatrospect_core::Error) -> Self {
        match err {
            chatrospect_core::Error::InvalidInput(message) => Self::bad_request(message),
            other => {
                error!("Analysis failed: {other}");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "Internal server error".to_string(),
                }
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest {
    chat_log: Option<String>,
    messages: Option<Vec<ChatMessage>>,
    top_words: Option<usize>,
    top_emojis: Option<usize>,
    ghosting_threshold_hours: Option<u32>,
}

impl AnalyzeRequest {
    fn analysis_config(&self, base: &AnalysisConfig) -> AnalysisConfig {
        let mut config = base.clone();
        if let Some(n) = self.top_words {
            config.top_words = n;
        }
        if let Some(n) = self.top_emojis {
            config.top_emojis = n;
        }
        if let Some(hours) = self.ghosting_threshold_hours {
            config.ghosting_threshold_hours = hours;
        }
        config
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ParsedData {
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeResponse {
    parsed_data: ParsedData,
    analysis: AnalysisReport,
}

async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let Json(request) = payload?;
    let analysis = request.analysis_config(&state.config.analysis);
    analysis
        .validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let (messages, transcript) = match (request.chat_log, request.messages) {
        (Some(log), _) if !log.trim().is_empty() => {
            let messages = normalize(&log, InputFormat::Auto, &analysis.normalizer)?;
            (messages, log)
        }
        (_, Some(messages)) => (messages, String::new()),
        _ => return Err(ApiError::bad_request("Missing chatLog in request body")),
    };

    debug!("Analyzing {} messages", messages.len());
    let report = analyze_with(&messages, &analysis, &transcript, &NoAnnotations)?;

    Ok(Json(AnalyzeResponse {
        parsed_data: ParsedData { messages },
        analysis: report,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use tower::ServiceExt;

    fn test_app(config: Config) -> Router {
        app(AppState {
            config: Arc::new(config),
        })
    }

    async fn post_json(router: Router, body: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/analyze")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request");
        let response = router.oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn health_is_ok() {
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .expect("request");
        let response = test_app(Config::default())
            .oneshot(request)
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn config_exposes_analysis_settings() {
        let request = Request::builder()
            .uri("/config")
            .body(Body::empty())
            .expect("request");
        let response = test_app(Config::default())
            .oneshot(request)
            .await
            .expect("response");
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let value: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(value["top_words"], 7);
        assert_eq!(value["ghosting_threshold_hours"], 72);
    }

    #[tokio::test]
    async fn analyzes_chat_log() {
        let body = serde_json::json!({
            "chatLog": "[2024-01-01, 00:00:00] Alice: hi there\n[2024-01-01, 00:01:00] Bob: hi there! 😊"
        })
        .to_string();
        let (status, value) = post_json(test_app(Config::default()), &body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["parsedData"]["messages"].as_array().map(Vec::len), Some(2));
        let metrics = &value["analysis"]["metrics"];
        assert_eq!(metrics["totalMessages"]["primary"], 1);
        assert_eq!(metrics["averageResponseTime"]["secondary"], 60.0);
        assert_eq!(metrics["frequentEmojis"]["secondary"][0], "😊");
        assert!(value["analysis"].get("annotations").is_none());
    }

    #[tokio::test]
    async fn analyzes_message_list_with_overrides() {
        let body = serde_json::json!({
            "messages": [
                {"timestamp": "2024-03-01T00:00:00Z", "sender": "Alice", "text": "ping"},
                {"timestamp": "2024-03-02T00:00:00Z", "sender": "Bob", "text": "pong"}
            ],
            "ghostingThresholdHours": 12
        })
        .to_string();
        let (status, value) = post_json(test_app(Config::default()), &body).await;

        assert_eq!(status, StatusCode::OK);
        let events = value["analysis"]["metrics"]["ghostingEvents"]
            .as_array()
            .map(Vec::len);
        assert_eq!(events, Some(1));
    }

    #[tokio::test]
    async fn missing_chat_log_is_bad_request() {
        for body in [r"{}", r#"{"chatLog": ""}"#] {
            let (status, value) = post_json(test_app(Config::default()), body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(value["error"], "Missing chatLog in request body");
        }
    }

    #[tokio::test]
    async fn malformed_json_is_rejected() {
        let (status, value) = post_json(test_app(Config::default()), "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(value["error"].is_string());
    }

    #[tokio::test]
    async fn invalid_overrides_are_rejected() {
        let body = r#"{"chatLog": "[2024-01-01, 00:00:00] A: hi", "topWords": 0}"#;
        let (status, value) = post_json(test_app(Config::default()), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(value["error"].as_str().is_some_and(|e| e.contains("top_words")));
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let mut config = Config::default();
        config.api.max_body_bytes = 64;
        let body = serde_json::json!({ "chatLog": "x".repeat(200) }).to_string();
        let request = Request::builder()
            .method("POST")
            .uri("/analyze")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::CONTENT_LENGTH, body.len())
            .body(Body::from(body))
            .expect("request");
        let response = test_app(config).oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
