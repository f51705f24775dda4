use std::sync::Arc;

use aide::OperationOutput;
use axum::{
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use gallery_storage::Image;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{gallery::GalleryService, types::AppError};

/// Status message returned by mutating endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Message {
    /// What happened
    pub text: String,
    /// Which resource it happened to
    pub details: String,
}

/// Outcome of looking up one image
#[derive(Debug)]
pub enum ReadImageResponse {
    /// `200 OK` with the image
    Found(Image),
    /// `204 No Content` with an empty body
    NoContent,
}

impl IntoResponse for ReadImageResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Found(image) => Json(image).into_response(),
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

impl OperationOutput for ReadImageResponse {
    type Inner = Image;
}

/// Acknowledgement of a delete
///
/// Sent with `204 No Content`; HTTP intermediaries are free to drop the body.
#[derive(Debug)]
pub struct DeleteImageResponse(pub Message);

impl IntoResponse for DeleteImageResponse {
    fn into_response(self) -> Response {
        (StatusCode::NO_CONTENT, Json(self.0)).into_response()
    }
}

impl OperationOutput for DeleteImageResponse {
    type Inner = Message;
}

/// List all images
///
/// Returns every processed image with public links to its original and thumbnail. The order is
/// whatever the store's listing returns.
///
/// # Errors
///
/// Returns `500 INTERNAL_SERVER_ERROR` if the store cannot be listed
#[instrument(skip(gallery))]
pub async fn list_images(
    Extension(gallery): Extension<Arc<GalleryService>>,
) -> Result<Json<Vec<Image>>, AppError> {
    let images = gallery.list().await?;

    Ok(Json(images))
}

/// Get one image by name
///
/// # Returns
///
/// Returns `200 OK` with the image, or `204 NO_CONTENT` with an empty body if no image has
/// that name
///
/// # Errors
///
/// Returns `500 INTERNAL_SERVER_ERROR` if the store cannot be listed
#[instrument(skip(gallery))]
pub async fn read_image(
    Path(id): Path<String>,
    Extension(gallery): Extension<Arc<GalleryService>>,
) -> Result<ReadImageResponse, AppError> {
    let response = match gallery.read(&id).await? {
        Some(image) => ReadImageResponse::Found(image),
        None => ReadImageResponse::NoContent,
    };

    Ok(response)
}

/// Delete an image
///
/// Removes the original, the thumbnail and anything else stored for the image. Deleting an
/// image that does not exist succeeds.
///
/// # Returns
///
/// Returns `204 NO_CONTENT` with a status message
///
/// # Errors
///
/// Returns `500 INTERNAL_SERVER_ERROR` if listing or deleting fails
#[instrument(skip(gallery))]
pub async fn delete_image(
    Path(id): Path<String>,
    Extension(gallery): Extension<Arc<GalleryService>>,
) -> Result<DeleteImageResponse, AppError> {
    gallery.delete(&id).await?;

    Ok(DeleteImageResponse(Message {
        text: "image deleted".to_string(),
        details: format!("image id: {id}"),
    }))
}
