use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Object-finalize notification from the store
///
/// Mirrors the storage object payload delivered by the bucket notification. Fields other than
/// the ones below are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadEvent {
    /// Bucket the object was written to
    pub bucket: String,
    /// Object name, e.g. `uploads/cat.png`
    #[serde(alias = "objectName")]
    pub name: String,
    /// API link to the object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
}

impl UploadEvent {
    /// Creates an event without a self link
    #[must_use]
    pub fn new(bucket: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            name: name.into(),
            self_link: None,
        }
    }
}
