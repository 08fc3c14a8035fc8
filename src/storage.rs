//! Blob storage for recipe images.

use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

/// Directory under the media root that holds recipe images.
const RECIPE_IMAGE_DIR: &str = "recipes";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to write image: {0}")]
    Io(#[from] io::Error),
    #[error("unsupported image extension: {0}")]
    Extension(String),
}

/// Stores image bytes and hands back the public URL they are served from.
pub trait ImageStore: Send + Sync {
    fn save_image(&self, bytes: &[u8], extension: &str) -> Result<String, StorageError>;
    /// Removes a previously saved image. URLs not owned by the store are ignored.
    fn delete_image(&self, url: &str) -> Result<(), StorageError>;
}

/// Filesystem store that lays files out as `<root>/recipes/<uuid>.<ext>`.
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    root: PathBuf,
    base_url: String,
}

impl LocalImageStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            root: root.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Maps a public URL back to a file inside the store, if it is one of ours.
    fn path_for_url(&self, url: &str) -> Option<PathBuf> {
        let relative = url.strip_prefix(&self.base_url)?.strip_prefix('/')?;
        let file_name = relative
            .strip_prefix(RECIPE_IMAGE_DIR)?
            .strip_prefix('/')?;

        if file_name.is_empty() || file_name.contains('/') || file_name.contains("..") {
            return None;
        }

        Some(self.root.join(RECIPE_IMAGE_DIR).join(file_name))
    }
}

impl ImageStore for LocalImageStore {
    fn save_image(&self, bytes: &[u8], extension: &str) -> Result<String, StorageError> {
        if extension.is_empty() || !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(StorageError::Extension(extension.to_string()));
        }

        let directory = self.root.join(RECIPE_IMAGE_DIR);
        fs::create_dir_all(&directory)?;

        let file_name = format!("{}.{}", Uuid::new_v4(), extension.to_ascii_lowercase());
        fs::write(directory.join(&file_name), bytes)?;

        Ok(format!("{}/{}/{}", self.base_url, RECIPE_IMAGE_DIR, file_name))
    }

    fn delete_image(&self, url: &str) -> Result<(), StorageError> {
        let Some(path) = self.path_for_url(url) else {
            return Ok(());
        };

        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
