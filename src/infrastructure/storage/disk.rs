use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use rand::Rng;
use tokio::fs;
use tracing::warn;

/// Local-disk store for device uploads. Files are written under one root
/// directory and served back verbatim through the static `/uploads` route.
#[derive(Debug, Clone)]
pub struct DiskStorage {
    root: PathBuf,
}

impl DiskStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DiskStorage { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the upload directory if it is not there yet.
    pub async fn init(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root).await
    }

    /// Generates a stored filename that will not collide across concurrent
    /// uploads: millisecond timestamp plus a random nine-digit suffix,
    /// keeping the original extension.
    pub fn unique_name(&self, original: Option<&str>) -> String {
        let ext = original
            .and_then(|name| Path::new(name).extension())
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))
            .unwrap_or_default();

        let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
        format!("img-{}-{:09}{}", Utc::now().timestamp_millis(), suffix, ext)
    }

    pub fn path_for(&self, stored_name: &str) -> PathBuf {
        self.root.join(stored_name)
    }

    /// Opens a fresh file for a new upload.
    pub async fn create(&self, stored_name: &str) -> io::Result<fs::File> {
        fs::File::create(self.path_for(stored_name)).await
    }

    /// Removes a stored file. Already-gone is success: this backs the
    /// compensating-delete paths, which must never fail on a second run.
    pub async fn remove(&self, stored_name: &str) -> io::Result<()> {
        match fs::remove_file(self.path_for(stored_name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                warn!(file = %stored_name, error = %e, "Failed to remove stored upload");
                Err(e)
            }
        }
    }

    pub async fn exists(&self, stored_name: &str) -> bool {
        fs::try_exists(self.path_for(stored_name)).await.unwrap_or(false)
    }
}
