//! Projection of stored objects into gallery images
//!
//! An image is never stored as a record of its own. It is the view of one `original.<ext>` object
//! and its sibling `thumbnail.<ext>` inside the same `processed/<name>/` directory.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{StoredObject, PROCESSED_PREFIX};

/// Public URL prefix used to build image links
pub const DEFAULT_PUBLIC_URL_BASE: &str = "https://storage.googleapis.com";

const ORIGINAL_MARKER: &str = "original.";
const THUMBNAIL_MARKER: &str = "thumbnail.";

/// A logical gallery entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Image {
    /// Directory name below `processed/`, used as the image id
    pub name: String,
    /// Public URL of the original
    #[serde(rename = "original")]
    pub original_url: String,
    /// Public URL of the thumbnail
    #[serde(rename = "thumbnail")]
    pub thumbnail_url: String,
}

impl Image {
    /// Builds the image for an `original.*` object
    ///
    /// Returns `None` for any other object. The sibling thumbnail is not looked up: its URL is
    /// derived from the naming convention and may point at nothing.
    #[must_use]
    pub fn from_original(object: &StoredObject, public_url_base: &str) -> Option<Self> {
        let (dir, file) = object
            .name
            .rsplit_once('/')
            .unwrap_or(("", object.name.as_str()));

        if !file.contains(ORIGINAL_MARKER) {
            return None;
        }

        let name = dir.strip_prefix(PROCESSED_PREFIX).unwrap_or(dir).to_string();
        let thumbnail_file = file.replacen(ORIGINAL_MARKER, THUMBNAIL_MARKER, 1);

        Some(Self {
            name,
            original_url: public_url(public_url_base, &object.bucket, dir, file),
            thumbnail_url: public_url(public_url_base, &object.bucket, dir, &thumbnail_file),
        })
    }
}

/// Pairs a listing snapshot into images, keeping the listing's order
#[must_use]
pub fn project_images(objects: &[StoredObject], public_url_base: &str) -> Vec<Image> {
    objects
        .iter()
        .filter_map(|object| Image::from_original(object, public_url_base))
        .collect()
}

fn public_url(base: &str, bucket: &str, dir: &str, file: &str) -> String {
    let base = base.trim_end_matches('/');
    if dir.is_empty() {
        format!("{base}/{bucket}/{file}")
    } else {
        format!("{base}/{bucket}/{dir}/{file}")
    }
}
