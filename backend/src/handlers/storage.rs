//! HTTP handlers for blob storage endpoints
//!
//! Thin wrappers over the storage client: images arrive base64-encoded,
//! are pushed to the hosted blob store as-is, and the public URL comes back.

use axum::{extract::State, Json};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::external::StorageClient;
use crate::middleware::{require_admin, CurrentUser};
use crate::AppState;

/// Input for uploading an image
#[derive(Debug, Deserialize)]
pub struct UploadImageInput {
    pub bucket: String,
    pub file_name: String,
    pub content_type: String,
    pub data_base64: String,
}

/// Input for deleting a stored object
#[derive(Debug, Deserialize)]
pub struct DeleteObjectInput {
    pub bucket: String,
    pub file_name: String,
}

/// Response carrying the public URL of an uploaded object
#[derive(Debug, Serialize)]
pub struct UploadImageResponse {
    pub url: String,
}

fn storage_client(state: &AppState) -> StorageClient {
    StorageClient::new(
        state.config.storage.base_url.clone(),
        state.config.storage.service_key.clone(),
    )
}

/// Upload an image to an allowed bucket (admin only)
pub async fn upload_image(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<UploadImageInput>,
) -> AppResult<Json<UploadImageResponse>> {
    require_admin(&current_user.0)?;

    let bytes = BASE64
        .decode(&input.data_base64)
        .map_err(|e| AppError::ValidationError(format!("invalid base64 payload: {}", e)))?;

    let client = storage_client(&state);
    let url = client
        .upload(&input.bucket, &input.file_name, &input.content_type, bytes)
        .await?;

    Ok(Json(UploadImageResponse { url }))
}

/// Delete a stored object from an allowed bucket (admin only)
pub async fn delete_object(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<DeleteObjectInput>,
) -> AppResult<Json<()>> {
    require_admin(&current_user.0)?;

    let client = storage_client(&state);
    client.delete(&input.bucket, &input.file_name).await?;

    Ok(Json(()))
}
