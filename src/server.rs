//! HTTP surface: Markdown in through a form field, DOCX out as an attachment.

use crate::generator::Generator;
use crate::parser::LineParser;
use crate::storage::ObjectStore;
use crate::{GenerateError, StorageError, utils};

use axum::{
    Form, Json, Router,
    body::Body,
    extract::{Path, Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

pub const OBJECT_KEY_HEADER: &str = "x-object-key";

/// Where converted documents are stored, if anywhere.
pub struct StoreTarget<S> {
    pub store: S,
    pub bucket: String,
    pub key_prefix: String,
}

pub struct AppState<G, S> {
    pub parser: LineParser,
    pub generator: G,
    pub store: Option<StoreTarget<S>>,
    pub attachment_name: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Deserialize)]
pub struct DownloadForm {
    markdown_text: Option<String>,
}

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    prefix: String,
}

#[derive(Debug)]
pub enum ApiError {
    MissingInput(&'static str),
    StorageDisabled,
    Storage(StorageError),
    Generate(GenerateError),
    Internal(anyhow::Error),
}

impl Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::MissingInput(field) => write!(f, "Missing required field: {}", field),
            ApiError::StorageDisabled => write!(f, "Storage is not configured"),
            ApiError::Storage(e) => write!(f, "{}", e),
            ApiError::Generate(e) => write!(f, "{}", e),
            ApiError::Internal(e) => write!(f, "{}", e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::MissingInput(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::StorageDisabled => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            ApiError::Storage(StorageError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            ApiError::Storage(_) => {
                log::error!("Storage failure: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "Storage failure".to_owned())
            }
            ApiError::Generate(_) | ApiError::Internal(_) => {
                log::error!("Conversion failure: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_owned())
            }
        };
        (status, message).into_response()
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Convert Markdown to DOCX, storing the result when storage is configured
async fn download<G, S>(
    State(state): State<Arc<AppState<G, S>>>,
    Form(form): Form<DownloadForm>,
) -> Result<Response, ApiError>
where
    G: Generator + Send + Sync + 'static,
    S: ObjectStore + 'static,
{
    let markdown_text = match form.markdown_text {
        Some(text) if !text.is_empty() => text,
        _ => return Err(ApiError::MissingInput("markdown_text")),
    };
    log::info!("POST /download - \"{}\"", utils::preview(&markdown_text, 20));

    let document = state.parser.parse(&markdown_text);
    let docx = {
        let state = state.clone();
        tokio::task::spawn_blocking(move || state.generator.generate(&document))
            .await
            .map_err(|e| ApiError::Internal(e.into()))?
            .map_err(ApiError::Generate)?
    };

    let mut object_key = None;
    if let Some(target) = &state.store {
        let key = utils::object_key(&target.key_prefix, chrono::Utc::now());
        target
            .store
            .put(&target.bucket, &key, docx.clone())
            .await
            .map_err(ApiError::Storage)?;
        object_key = Some(key);
    }

    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        state.attachment_name
    ))
    .map_err(|e| ApiError::Internal(e.into()))?;

    let mut response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, DOCX_CONTENT_TYPE)
        .header(header::CONTENT_DISPOSITION, disposition)
        .header(header::CONTENT_LENGTH, docx.len());
    if let Some(key) = object_key {
        response = response.header(OBJECT_KEY_HEADER, key);
    }
    response
        .body(Body::from(docx))
        .map_err(|e| ApiError::Internal(e.into()))
}

async fn list_objects<G, S>(
    State(state): State<Arc<AppState<G, S>>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<String>>, ApiError>
where
    G: Generator + Send + Sync + 'static,
    S: ObjectStore + 'static,
{
    log::info!("GET /objects?prefix={}", query.prefix);
    let target = state.store.as_ref().ok_or(ApiError::StorageDisabled)?;
    let keys = target
        .store
        .list(&target.bucket, &query.prefix)
        .await
        .map_err(ApiError::Storage)?;
    Ok(Json(keys))
}

async fn get_object<G, S>(
    State(state): State<Arc<AppState<G, S>>>,
    Path(key): Path<String>,
) -> Result<Response, ApiError>
where
    G: Generator + Send + Sync + 'static,
    S: ObjectStore + 'static,
{
    log::info!("GET /objects/{}", key);
    let target = state.store.as_ref().ok_or(ApiError::StorageDisabled)?;
    let bytes = target
        .store
        .get(&target.bucket, &key)
        .await
        .map_err(ApiError::Storage)?;

    let content_type = if key.ends_with(".docx") {
        DOCX_CONTENT_TYPE
    } else {
        "application/octet-stream"
    };
    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}

pub fn create_router<G, S>(state: AppState<G, S>) -> Router
where
    G: Generator + Send + Sync + 'static,
    S: ObjectStore + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/download", post(download::<G, S>))
        .route("/objects", get(list_objects::<G, S>))
        .route("/objects/*key", get(get_object::<G, S>))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

pub async fn run<G, S>(addr: &str, state: AppState<G, S>) -> anyhow::Result<()>
where
    G: Generator + Send + Sync + 'static,
    S: ObjectStore + 'static,
{
    let app = create_router(state);

    log::info!("Starting md2docx server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
