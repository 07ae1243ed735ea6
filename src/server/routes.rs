//! # HTTP Routes
//!
//! Thin axum layer over [`ImageService`]: parses multipart uploads, hands the
//! CPU-bound work to the blocking thread pool and maps errors to status codes.
//!
//! ## Endpoints
//!
//! ```text
//! POST /api/text-overlay                     image, text
//! POST /api/watermark                        image, watermark_image (optional)
//! POST /api/steganography                    image, text
//! GET  /api/results/:operation_id            keys and URLs of both images
//! GET  /api/steganography-results/:operation_id   hidden text
//! GET  /cached-image/:key                    image bytes, sniffed Content-Type
//! GET  /api/health
//! ```

use axum::{
    extract::{multipart::Multipart, DefaultBodyLimit, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use log::{error, info, warn};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use super::server::ImageService;
use crate::error::ImagingError;
use crate::store::{OperationId, Role};

/// Longest accepted overlay or hidden text, in characters.
pub const MAX_TEXT_LEN: usize = 100;

#[derive(Debug, Serialize)]
pub struct OperationResponse {
    pub success: bool,
    pub operation_id: String,
    pub source_key: String,
    pub result_key: String,
    pub source_url: String,
    pub result_url: String,
}

impl OperationResponse {
    pub fn new(operation_id: &OperationId) -> Self {
        let source_key = operation_id.key(Role::Source);
        let result_key = operation_id.key(Role::Result);

        Self {
            success: true,
            operation_id: operation_id.to_string(),
            source_url: format!("/cached-image/{}", source_key),
            result_url: format!("/cached-image/{}", result_key),
            source_key,
            result_key,
        }
    }
}

#[derive(Debug, Serialize)]
struct RevealResponse {
    operation_id: String,
    text: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Status code for each error kind.
pub fn status_for(err: &ImagingError) -> StatusCode {
    match err {
        ImagingError::DecodeImage(_) | ImagingError::Capacity { .. } => StatusCode::BAD_REQUEST,
        ImagingError::Decode(_) => StatusCode::NOT_FOUND,
        ImagingError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        ImagingError::EncodeImage(_) | ImagingError::Render(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn imaging_error(err: ImagingError) -> ApiError {
    let status = status_for(&err);
    if status.is_server_error() {
        error!("❌ Request failed: {}", err);
    } else {
        warn!("⚠️ Request rejected: {}", err);
    }
    error_response(status, err.to_string())
}

/// Build the application router.
pub fn router(service: Arc<ImageService>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/api/text-overlay", post(text_overlay_handler))
        .route("/api/watermark", post(watermark_handler))
        .route("/api/steganography", post(steganography_handler))
        .route("/api/results/:operation_id", get(result_handler))
        .route(
            "/api/steganography-results/:operation_id",
            get(reveal_handler),
        )
        .route("/cached-image/:key", get(cached_image_handler))
        .route("/api/health", get(health_check))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .with_state(service)
}

/// Fields collected from a multipart upload.
#[derive(Debug, Default)]
struct UploadForm {
    image: Option<Vec<u8>>,
    filename: String,
    watermark_image: Option<Vec<u8>>,
    text: Option<String>,
}

async fn read_upload(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm {
        filename: String::from("uploaded_image"),
        ..Default::default()
    };

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error_response(
            StatusCode::BAD_REQUEST,
            format!("Failed to read multipart data: {}", e),
        )
    })? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "image" | "watermark_image" => {
                if name == "image" {
                    form.filename = field.file_name().unwrap_or("image").to_string();
                }
                let data = field.bytes().await.map_err(|e| {
                    error_response(
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read {}: {}", name, e),
                    )
                })?;
                if data.is_empty() {
                    continue;
                }
                if name == "image" {
                    form.image = Some(data.to_vec());
                } else {
                    form.watermark_image = Some(data.to_vec());
                }
            }
            "text" => {
                let text = field.text().await.map_err(|e| {
                    error_response(
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read text: {}", e),
                    )
                })?;
                form.text = validate_text(text)?;
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Trim the text; blank means "use the default", over-long is rejected.
fn validate_text(text: String) -> Result<Option<String>, ApiError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    if text.chars().count() > MAX_TEXT_LEN {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            format!("Text must be at most {} characters", MAX_TEXT_LEN),
        ));
    }
    Ok(Some(text.to_string()))
}

fn require_image(image: Option<Vec<u8>>) -> Result<Vec<u8>, ApiError> {
    image.ok_or_else(|| error_response(StatusCode::BAD_REQUEST, "No image provided"))
}

fn parse_operation_id(raw: &str) -> Result<OperationId, ApiError> {
    raw.parse()
        .map_err(|e: crate::store::InvalidOperationId| {
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        })
}

/// Run CPU-bound service work on the blocking thread pool.
async fn run_blocking<T, F>(service: &Arc<ImageService>, work: F) -> Result<T, ApiError>
where
    F: FnOnce(&ImageService) -> crate::error::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let service = Arc::clone(service);

    tokio::task::spawn_blocking(move || work(&service))
        .await
        .map_err(|e| {
            error!("❌ Processing task panicked: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Processing task failed")
        })?
        .map_err(imaging_error)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "watermark-studio",
    }))
}

async fn text_overlay_handler(
    State(service): State<Arc<ImageService>>,
    multipart: Multipart,
) -> Result<Json<OperationResponse>, ApiError> {
    let form = read_upload(multipart).await?;
    let image = require_image(form.image)?;
    let text = form.text;

    info!(
        "📤 Text overlay request: {} ({} bytes)",
        form.filename,
        image.len()
    );

    let operation_id =
        run_blocking(&service, move |s| s.text_overlay(&image, text.as_deref())).await?;
    Ok(Json(OperationResponse::new(&operation_id)))
}

async fn watermark_handler(
    State(service): State<Arc<ImageService>>,
    multipart: Multipart,
) -> Result<Json<OperationResponse>, ApiError> {
    let form = read_upload(multipart).await?;
    let image = require_image(form.image)?;
    let mark = form.watermark_image;

    info!(
        "📤 Watermark request: {} ({} bytes, {} watermark)",
        form.filename,
        image.len(),
        if mark.is_some() { "uploaded" } else { "default" }
    );

    let operation_id =
        run_blocking(&service, move |s| s.watermark(&image, mark.as_deref())).await?;
    Ok(Json(OperationResponse::new(&operation_id)))
}

async fn steganography_handler(
    State(service): State<Arc<ImageService>>,
    multipart: Multipart,
) -> Result<Json<OperationResponse>, ApiError> {
    let form = read_upload(multipart).await?;
    let image = require_image(form.image)?;
    let text = form.text;

    info!(
        "📤 Steganography request: {} ({} bytes)",
        form.filename,
        image.len()
    );

    let operation_id =
        run_blocking(&service, move |s| s.steganography(&image, text.as_deref())).await?;
    Ok(Json(OperationResponse::new(&operation_id)))
}

async fn result_handler(
    Path(operation_id): Path<String>,
) -> Result<Json<OperationResponse>, ApiError> {
    let operation_id = parse_operation_id(&operation_id)?;
    Ok(Json(OperationResponse::new(&operation_id)))
}

async fn reveal_handler(
    State(service): State<Arc<ImageService>>,
    Path(operation_id): Path<String>,
) -> Result<Json<RevealResponse>, ApiError> {
    let operation_id = parse_operation_id(&operation_id)?;

    let text = run_blocking(&service, move |s| s.reveal(&operation_id)).await?;
    Ok(Json(RevealResponse {
        operation_id: operation_id.to_string(),
        text,
    }))
}

async fn cached_image_handler(
    State(service): State<Arc<ImageService>>,
    Path(key): Path<String>,
) -> impl IntoResponse {
    let (bytes, content_type) = service.cached_image(&key);
    ([(header::CONTENT_TYPE, content_type)], bytes)
}
