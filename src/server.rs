//! HTTP surface of the classifier.
//!
//! The [`ModelHost`] is injected through [`AppState`]; handlers never reach
//! for global state.

use crate::{
    classification::Classification,
    error::{PredictError, PreprocessError},
    messages::{
        ErrorResponse, HEALTHY, HOME_MESSAGE, HealthResponse, HomeResponse, PredictionResponse,
    },
    model::ModelHost,
    preprocess::preprocess,
};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, FromRequest, Multipart, Request, State, multipart::MultipartError},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::time::Instant;

/// Name of the multipart field carrying the image.
pub const UPLOAD_FIELD: &str = "file";

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct AppState {
    pub host: ModelHost,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(host: ModelHost) -> Self {
        Self {
            host,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}

/// Errors surfaced to HTTP clients as `{"detail": ...}` bodies.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Model not loaded")]
    ModelUnavailable,

    #[error("Invalid upload: {detail}")]
    Upload { status: StatusCode, detail: String },

    #[error("No file uploaded")]
    MissingFile,

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Prediction failed: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Upload { status, .. } => *status,
            ApiError::MissingFile | ApiError::InvalidImage(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PredictError> for ApiError {
    fn from(err: PredictError) -> Self {
        match err {
            PredictError::ModelUnavailable => ApiError::ModelUnavailable,
            PredictError::Preprocess(PreprocessError::Decode(e)) => {
                ApiError::InvalidImage(e.to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::Upload {
            status: err.status(),
            detail: err.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("{self}");
        } else {
            log::warn!("{self}");
        }

        (
            status,
            Json(ErrorResponse {
                detail: self.to_string(),
            }),
        )
            .into_response()
    }
}

pub fn router(state: AppState) -> Router {
    let max_upload_bytes = state.max_upload_bytes;
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/predict", post(predict))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

async fn home() -> Json<HomeResponse> {
    Json(HomeResponse {
        message: HOME_MESSAGE.to_string(),
    })
}

// Reports healthy even when no model is loaded.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: HEALTHY.to_string(),
    })
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            detail: "Not Found".to_string(),
        }),
    )
}

async fn predict(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<PredictionResponse>, ApiError> {
    // checked before the body is touched so that any upload gets a 503
    if !state.host.is_ready() {
        return Err(ApiError::ModelUnavailable);
    }

    let start_time = Instant::now();

    let mut multipart = Multipart::from_request(request, &state)
        .await
        .map_err(|rejection| ApiError::Upload {
            status: rejection.status(),
            detail: rejection.body_text(),
        })?;
    let bytes = read_upload(&mut multipart).await?;

    log::debug!("Received upload of {} bytes", bytes.len());

    let host = state.host.clone();
    let score = tokio::task::spawn_blocking(move || -> Result<f32, PredictError> {
        let tensor = preprocess(&bytes)?;
        host.predict(&tensor)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;

    let classification = Classification::from_score(score);
    let latency = start_time.elapsed().as_secs_f64();

    log::info!(
        "Prediction: {}, Confidence: {:.2}, Latency: {:.4}s",
        classification.label,
        classification.confidence,
        latency
    );

    Ok(Json(PredictionResponse::new(classification, latency)))
}

/// Returns the bytes of the `file` field, or of the first field that carries a
/// filename when no field has that name.
async fn read_upload(multipart: &mut Multipart) -> Result<Bytes, ApiError> {
    let mut fallback = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(UPLOAD_FIELD) {
            return Ok(field.bytes().await?);
        }
        if fallback.is_none() && field.file_name().is_some() {
            fallback = Some(field.bytes().await?);
        }
    }

    fallback.ok_or(ApiError::MissingFile)
}
