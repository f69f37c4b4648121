//! HTTP routes and handlers

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use pwstrength_classifiers::Prediction;
use pwstrength_core::{CorsConfig, Error, ServerConfig};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::state::AppState;

pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/predict", post(predict_strength))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .fallback(fallback)
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(cors_layer(&config.cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build the CORS layer; any origin unless an explicit list is configured
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    if config.allow_any_origin {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    info!("CORS restricted to {} origins", origins.len());

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn metrics(State(state): State<AppState>) -> String {
    state.metrics_handle.render()
}

/// Prediction request body
#[derive(Debug, Deserialize)]
struct PredictRequest {
    #[serde(default)]
    password: Option<Value>,
}

/// Prediction response body
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub password: String,
    pub strength: String,
    /// Percentage with two decimals, e.g. `"97.00%"`
    pub confidence: String,
    pub details: PredictionDetails,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionDetails {
    pub length: usize,
    pub diversity_score: u8,
    pub has_special: bool,
    pub entropy_heuristic: usize,
}

impl PredictResponse {
    fn new(password: String, prediction: &Prediction) -> Self {
        Self {
            password,
            strength: prediction.class.label().to_string(),
            confidence: prediction.confidence_percent(),
            details: PredictionDetails {
                length: prediction.features.length,
                diversity_score: prediction.features.diversity_score,
                has_special: prediction.features.has_special,
                entropy_heuristic: prediction.features.entropy_heuristic,
            },
        }
    }
}

/// Classify a password
///
/// The body is parsed as JSON whatever the Content-Type says.
async fn predict_strength(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PredictResponse>, AppError> {
    metrics::counter!("pwstrength_requests_total").increment(1);

    let request: PredictRequest =
        serde_json::from_slice(&body).map_err(|e| AppError::InvalidJson(e.to_string()))?;
    let password = match request.password {
        Some(Value::String(password)) if !password.is_empty() => password,
        _ => return Err(AppError::MissingPassword),
    };

    let prediction = state
        .classifier
        .classify(&password)
        .map_err(AppError::Prediction)?;

    metrics::counter!("pwstrength_predictions_total", "strength" => prediction.class.label())
        .increment(1);
    metrics::histogram!("pwstrength_prediction_latency_us").record(prediction.latency_us as f64);
    debug!(
        "Prediction: {} ({}) in {}us",
        prediction.class,
        prediction.confidence_percent(),
        prediction.latency_us
    );

    Ok(Json(PredictResponse::new(password, &prediction)))
}

async fn fallback() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
}

/// Error handling
#[derive(Debug)]
enum AppError {
    InvalidJson(String),
    MissingPassword,
    Prediction(Error),
}

impl AppError {
    fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidJson(_) => "invalid_json",
            AppError::MissingPassword => "missing_password",
            AppError::Prediction(err) => err.kind(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        metrics::counter!("pwstrength_errors_total", "kind" => self.kind()).increment(1);

        let (status, message) = match self {
            AppError::InvalidJson(msg) => {
                (StatusCode::BAD_REQUEST, format!("Invalid JSON body: {}", msg))
            }
            AppError::MissingPassword => {
                (StatusCode::BAD_REQUEST, "No password provided.".to_string())
            }
            AppError::Prediction(err) => {
                error!("Prediction failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("An error occurred during prediction: {}", err),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
