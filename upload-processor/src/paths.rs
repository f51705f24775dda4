//! Destination paths for processed uploads
//!
//! An upload `uploads/<stem>.<ext>` is published as `processed/<stem>/original.<ext>` with its
//! thumbnail at `processed/<stem>/thumbnail.<ext>`. When that directory is taken, the directory
//! gets a numeric suffix: `processed/<stem>_1/`, `processed/<stem>_2/`, …

use gallery_storage::{ObjectStore, PROCESSED_PREFIX};
use schemars::JsonSchema;
use serde::Serialize;
use tracing::debug;

use crate::processor::ProcessError;

const THUMBNAIL_FILE_STEM: &str = "thumbnail";
const ORIGINAL_FILE_STEM: &str = "original";

/// Thumbnail and original destinations for one upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PathPair {
    /// Where the thumbnail is written
    pub thumbnail_path: String,
    /// Where the original is moved
    pub original_path: String,
}

impl PathPair {
    /// The collision-naive destinations for `name`
    #[must_use]
    pub fn canonical(name: &str) -> Self {
        Self::with_suffix(name, 0)
    }

    /// Destinations for `name` with collision suffix `suffix` (`0` means none)
    #[must_use]
    pub fn with_suffix(name: &str, suffix: u32) -> Self {
        let (stem, extension) = split_file_name(name);

        let directory = if suffix == 0 {
            format!("{PROCESSED_PREFIX}{stem}")
        } else {
            format!("{PROCESSED_PREFIX}{stem}_{suffix}")
        };

        Self {
            thumbnail_path: format!("{directory}/{THUMBNAIL_FILE_STEM}{extension}"),
            original_path: format!("{directory}/{ORIGINAL_FILE_STEM}{extension}"),
        }
    }
}

/// Splits the last path segment at its last dot into stem and `.ext`
///
/// A leading dot starts the extension, so `.png` has an empty stem.
fn split_file_name(name: &str) -> (&str, &str) {
    let file = name.rsplit_once('/').map_or(name, |(_, file)| file);

    match file.rfind('.') {
        Some(dot) => file.split_at(dot),
        None => (file, ""),
    }
}

/// Whether `name` has a non-empty stem to publish under
///
/// Folder placeholders such as `uploads/` and bare extensions such as `uploads/.png` do not.
#[must_use]
pub fn has_file_name(name: &str) -> bool {
    !split_file_name(name).0.is_empty()
}

/// `processed/<stem>/thumbnail.<ext>` for an uploaded object name
#[must_use]
pub fn canonical_thumbnail_path(name: &str) -> String {
    PathPair::canonical(name).thumbnail_path
}

/// `processed/<stem>/original.<ext>` for an uploaded object name
#[must_use]
pub fn canonical_original_path(name: &str) -> String {
    PathPair::canonical(name).original_path
}

/// Finds the first destination whose thumbnail slot is free
///
/// Only the thumbnail path is checked; the original path with the same suffix is assumed free.
/// Existing data was laid out under that rule, so checking both slots could pick different
/// directories than earlier runs did.
///
/// # Errors
///
/// Returns `ProcessError::ExistenceCheckFailed` if the store cannot answer an existence check
pub async fn resolve_collision_free_paths(
    store: &dyn ObjectStore,
    name: &str,
) -> Result<PathPair, ProcessError> {
    let mut suffix = 0;

    loop {
        let candidate = PathPair::with_suffix(name, suffix);

        let occupied = store
            .exists(&candidate.thumbnail_path)
            .await
            .map_err(|source| ProcessError::ExistenceCheckFailed {
                path: candidate.thumbnail_path.clone(),
                source,
            })?;

        if !occupied {
            return Ok(candidate);
        }

        debug!("{} already exists, trying next suffix", candidate.thumbnail_path);
        suffix += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gallery_storage::memory::{MemoryObjectStore, StoreOperation};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_thumbnail_path() {
        let cases = [
            ("uploads/ColtReto.png", "processed/ColtReto/thumbnail.png"),
            ("uploads/holiday.photo.jpeg", "processed/holiday.photo/thumbnail.jpeg"),
            ("uploads/nested/dir/pic.gif", "processed/pic/thumbnail.gif"),
            ("uploads/README", "processed/README/thumbnail"),
        ];

        for (input, want) in cases {
            assert_eq!(canonical_thumbnail_path(input), want, "input: {input}");
        }
    }

    #[test]
    fn test_original_path() {
        let cases = [
            ("uploads/ColtReto.png", "processed/ColtReto/original.png"),
            ("uploads/png.png", "processed/png/original.png"),
        ];

        for (input, want) in cases {
            assert_eq!(canonical_original_path(input), want, "input: {input}");
        }
    }

    #[test]
    fn test_split_file_name() {
        assert_eq!(split_file_name("uploads/cat.png"), ("cat", ".png"));
        assert_eq!(split_file_name("uploads/holiday.photo.jpeg"), ("holiday.photo", ".jpeg"));
        assert_eq!(split_file_name("uploads/README"), ("README", ""));
        assert_eq!(split_file_name("uploads/.png"), ("", ".png"));
        assert_eq!(split_file_name("uploads/"), ("", ""));
    }

    #[test]
    fn test_has_file_name() {
        assert!(has_file_name("uploads/cat.png"));
        assert!(has_file_name("uploads/README"));
        assert!(!has_file_name("uploads/"));
        assert!(!has_file_name("uploads/nested/"));
        assert!(!has_file_name("uploads/.png"));
    }

    #[test]
    fn test_canonical_paths_are_stable() {
        let name = "uploads/ColtReto.png";

        assert_eq!(PathPair::canonical(name), PathPair::canonical(name));
        assert_eq!(canonical_thumbnail_path(name), canonical_thumbnail_path(name));
    }

    #[test]
    fn test_suffix_applies_to_directory_only() {
        assert_eq!(
            PathPair::with_suffix("uploads/Foo.png", 2),
            PathPair {
                thumbnail_path: "processed/Foo_2/thumbnail.png".to_string(),
                original_path: "processed/Foo_2/original.png".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_free_canonical_directory_is_used() {
        let store = MemoryObjectStore::new("gallery");

        let paths = resolve_collision_free_paths(&store, "uploads/Foo.png")
            .await
            .unwrap();

        assert_eq!(paths, PathPair::canonical("uploads/Foo.png"));
    }

    #[tokio::test]
    async fn test_occupied_directory_gets_next_suffix() {
        let store = MemoryObjectStore::new("gallery");
        store.insert("processed/Foo/thumbnail.png", "t");
        store.insert("processed/Foo_1/thumbnail.png", "t");

        let paths = resolve_collision_free_paths(&store, "uploads/Foo.png")
            .await
            .unwrap();

        assert_eq!(paths.thumbnail_path, "processed/Foo_2/thumbnail.png");
        assert_eq!(paths.original_path, "processed/Foo_2/original.png");
    }

    #[tokio::test]
    async fn test_only_thumbnail_slot_is_checked() {
        let store = MemoryObjectStore::new("gallery");
        store.insert("processed/Foo/original.png", "o");

        let paths = resolve_collision_free_paths(&store, "uploads/Foo.png")
            .await
            .unwrap();

        assert_eq!(paths, PathPair::canonical("uploads/Foo.png"));
        assert_eq!(
            store.operations(),
            vec![(
                StoreOperation::Exists,
                "processed/Foo/thumbnail.png".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_existence_check_failure_aborts() {
        let store = MemoryObjectStore::new("gallery");
        store.insert("processed/Foo/thumbnail.png", "t");
        store.fail(StoreOperation::Exists, "processed/Foo_1/");

        let err = resolve_collision_free_paths(&store, "uploads/Foo.png")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ProcessError::ExistenceCheckFailed { ref path, .. } if path == "processed/Foo_1/thumbnail.png"
        ));
    }
}
