use std::sync::Arc;

use axum::{Extension, Json};
use schemars::JsonSchema;
use serde::Serialize;
use tracing::instrument;

use crate::{
    event::UploadEvent,
    processor::{ProcessOutcome, UploadProcessor},
    types::AppError,
};

/// Result of handling one object-finalize event
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    /// `processed` or `skipped`
    pub status: String,
    /// Why the event was skipped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Where the thumbnail was published
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_path: Option<String>,
    /// Where the original was published
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_path: Option<String>,
    /// Whether the upload object could not be removed after the copy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_retained: Option<bool>,
}

impl From<ProcessOutcome> for EventResponse {
    fn from(outcome: ProcessOutcome) -> Self {
        match outcome {
            ProcessOutcome::Skipped(reason) => Self {
                status: "skipped".to_string(),
                reason: Some(reason.to_string()),
                thumbnail_path: None,
                original_path: None,
                upload_retained: None,
            },
            ProcessOutcome::Completed(upload) => Self {
                status: "processed".to_string(),
                reason: None,
                thumbnail_path: Some(upload.paths.thumbnail_path),
                original_path: Some(upload.paths.original_path),
                upload_retained: Some(upload.upload_retained),
            },
        }
    }
}

/// Handles an object-finalize notification
///
/// Objects outside `uploads/` are acknowledged without side effects. Any pipeline failure is
/// answered with a 500 so the event gets redelivered.
#[instrument(skip(processor, event), fields(object = %event.name))]
pub async fn object_finalized(
    Extension(processor): Extension<Arc<UploadProcessor>>,
    Json(event): Json<UploadEvent>,
) -> Result<Json<EventResponse>, AppError> {
    let outcome = processor.process(&event).await?;

    Ok(Json(EventResponse::from(outcome)))
}
