//! Route table and handlers.

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE, SET_COOKIE};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use cloudfiles::core::ValidationError;
use cloudfiles::{File, MetadataPatch};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::extract::{AuthorizedOwner, CurrentSession};
use crate::gallery;
use crate::state::AppState;

/// Build the router with every route and the tracing and body-limit layers.
pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/admin/auth", get(admin_auth))
        .route("/admin/check", get(admin_check))
        .route("/admin/logout", post(admin_logout))
        .route("/files", post(add_files).get(list_files).delete(delete_file))
        .route("/files/download", get(download))
        .route("/files/gallery", get(gallery_page))
        .route("/files/hash", get(hash))
        .route("/files/info", get(info))
        .route("/files/data", put(replace_data))
        .route("/files/metadata", patch(update_metadata))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(max_body_bytes)),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct AuthQuery {
    #[serde(default)]
    admin: String,
}

#[derive(Debug, Deserialize)]
struct FilenameQuery {
    #[serde(default)]
    filename: String,
}

/// Decode a JSON body regardless of its declared content type.
fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body)
        .map_err(|e| ValidationError::InvalidPayload(e.to_string()).into())
}

// ─────────────────────────────────────────────────────────────────────────────
// Service Routes
// ─────────────────────────────────────────────────────────────────────────────

async fn root() -> &'static str {
    "Welcome to CloudFiles API"
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "OK" }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Admin Routes
// ─────────────────────────────────────────────────────────────────────────────

async fn admin_auth(
    State(state): State<AppState>,
    CurrentSession(mut session): CurrentSession,
    Query(query): Query<AuthQuery>,
) -> Result<Response, ApiError> {
    let cookie = state.gate.authenticate(&mut session, &query.admin)?;
    Ok(([(SET_COOKIE, cookie.to_string())], "Session established").into_response())
}

async fn admin_check(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<&'static str, ApiError> {
    if !state.gate.check_authorized(&session) {
        return Err(ApiError::unauthorized());
    }
    Ok("Admin authorized")
}

async fn admin_logout(State(state): State<AppState>) -> Response {
    ([(SET_COOKIE, state.gate.clear().to_string())], "Session cleared").into_response()
}

// ─────────────────────────────────────────────────────────────────────────────
// File Routes
// ─────────────────────────────────────────────────────────────────────────────

async fn add_files(
    State(state): State<AppState>,
    AuthorizedOwner(owner): AuthorizedOwner,
    body: Bytes,
) -> Result<&'static str, ApiError> {
    let batch: Vec<File> = parse_json(&body)?;
    state.files.add_files(&owner, batch).await?;
    Ok("Files added successfully")
}

async fn delete_file(
    State(state): State<AppState>,
    AuthorizedOwner(owner): AuthorizedOwner,
    Query(query): Query<FilenameQuery>,
) -> Result<&'static str, ApiError> {
    state.files.delete_file(&owner, &query.filename).await?;
    Ok("File deleted")
}

async fn list_files(
    State(state): State<AppState>,
    AuthorizedOwner(owner): AuthorizedOwner,
) -> Result<Json<Vec<File>>, ApiError> {
    Ok(Json(state.files.list_files(&owner).await?))
}

async fn download(
    State(state): State<AppState>,
    AuthorizedOwner(owner): AuthorizedOwner,
    Query(query): Query<FilenameQuery>,
) -> Result<Response, ApiError> {
    let file = state.files.download(&owner, &query.filename).await?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        file.metadata.full_name().replace('"', "")
    );
    let disposition = HeaderValue::from_bytes(disposition.as_bytes())
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, HeaderValue::from_static("application/octet-stream")),
            (CONTENT_DISPOSITION, disposition),
            (CONTENT_LENGTH, HeaderValue::from(file.data.len())),
        ],
        file.data,
    )
        .into_response())
}

async fn gallery_page(
    State(state): State<AppState>,
    AuthorizedOwner(owner): AuthorizedOwner,
) -> Result<Html<String>, ApiError> {
    let images = state.files.gallery(&owner).await?;
    Ok(Html(gallery::render(&images)))
}

async fn hash(
    State(state): State<AppState>,
    AuthorizedOwner(owner): AuthorizedOwner,
    Query(query): Query<FilenameQuery>,
) -> Result<Response, ApiError> {
    let checksum = state.files.checksum(&owner, &query.filename).await?;
    Ok(Json(checksum).into_response())
}

async fn info(
    State(state): State<AppState>,
    AuthorizedOwner(owner): AuthorizedOwner,
    Query(query): Query<FilenameQuery>,
) -> Result<Response, ApiError> {
    let info = state.files.file_info(&owner, &query.filename).await?;
    Ok(Json(info).into_response())
}

async fn replace_data(
    State(state): State<AppState>,
    AuthorizedOwner(owner): AuthorizedOwner,
    body: Bytes,
) -> Result<&'static str, ApiError> {
    let file: File = parse_json(&body)?;
    state.files.replace_data(&owner, file).await?;
    Ok("File saved successfully")
}

async fn update_metadata(
    State(state): State<AppState>,
    AuthorizedOwner(owner): AuthorizedOwner,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let patch: MetadataPatch = parse_json(&body)?;
    state.files.update_metadata(&owner, &patch).await?;
    Ok(Json(json!({ "message": "Metadata updated successfully" })))
}
