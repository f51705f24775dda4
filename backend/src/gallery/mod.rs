//! Gallery operations over the `processed/` namespace
//!
//! Images are projected from a listing snapshot on every call; nothing is cached between
//! requests.

mod error;

use std::sync::Arc;

use gallery_storage::{project_images, Image, ObjectStore, PROCESSED_PREFIX};
use tracing::{debug, info, instrument};

pub use error::{GalleryError, GalleryResult};

/// Lists, reads and deletes gallery images
pub struct GalleryService {
    store: Arc<dyn ObjectStore>,
    public_url_base: String,
}

impl GalleryService {
    /// Creates a gallery over `store`, linking images below `public_url_base`
    #[must_use]
    pub fn new(store: Arc<dyn ObjectStore>, public_url_base: impl Into<String>) -> Self {
        Self {
            store,
            public_url_base: public_url_base.into(),
        }
    }

    /// Every processed image, in listing order
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::ListFailed` if the listing fails
    #[instrument(skip(self))]
    pub async fn list(&self) -> GalleryResult<Vec<Image>> {
        let objects = self
            .store
            .list(PROCESSED_PREFIX)
            .await
            .map_err(|source| GalleryError::ListFailed { source })?;

        let images = project_images(&objects, &self.public_url_base);
        debug!("Listed {} images from {} objects", images.len(), objects.len());

        Ok(images)
    }

    /// The image named `id`, or `None` if there is none
    ///
    /// The listing uses `processed/<id>` as a plain prefix, which also matches suffixed
    /// siblings such as `<id>_1`; only the image whose name is exactly `id` is returned.
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::ReadFailed` if the listing fails
    #[instrument(skip(self))]
    pub async fn read(&self, id: &str) -> GalleryResult<Option<Image>> {
        let objects = self
            .store
            .list(&format!("{PROCESSED_PREFIX}{id}"))
            .await
            .map_err(|source| GalleryError::ReadFailed {
                id: id.to_string(),
                source,
            })?;

        Ok(project_images(&objects, &self.public_url_base)
            .into_iter()
            .find(|image| image.name == id))
    }

    /// Deletes every object of the image named `id`, returning how many were removed
    ///
    /// Deleting an id that has no objects is a no-op. Objects are deleted one by one and the
    /// first failure stops the run, so a failed delete can leave part of the image behind.
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::QueryFailed` if the listing fails, or
    /// `GalleryError::DeleteFailed` for the first object that cannot be deleted
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> GalleryResult<usize> {
        let objects = self
            .store
            .list(&format!("{PROCESSED_PREFIX}{id}/"))
            .await
            .map_err(|source| GalleryError::QueryFailed { source })?;

        for object in &objects {
            self.store
                .delete(&object.name)
                .await
                .map_err(|source| GalleryError::DeleteFailed {
                    key: object.name.clone(),
                    source,
                })?;
        }

        info!("Deleted {} objects of image {id}", objects.len());

        Ok(objects.len())
    }
}
