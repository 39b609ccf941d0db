//! Flat-directory image storage
//!
//! Each store owns one directory. Writes land in a temporary sibling first
//! and are renamed into place, so readers see either the old file or the new
//! one.

use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use super::naming::is_safe_name;

/// Image data read back from a store
#[derive(Debug, Clone)]
pub struct ImageData {
    pub data: Vec<u8>,
    pub mime_type: String,
    pub hash: String,
}

/// Directory-backed image store
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    /// Open a store, creating its directory if absent
    pub async fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    /// Directory backing this store
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Compute SHA-256 hash of data
    fn compute_hash(data: &[u8]) -> String {
        hex::encode(Sha256::digest(data))
    }

    /// Store bytes under `name`, replacing any previous file
    pub async fn store(&self, name: &str, data: &[u8]) -> io::Result<PathBuf> {
        if !is_safe_name(name) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unsafe file name: {name}"),
            ));
        }

        let path = self.path(name);
        let tmp = self.dir.join(format!(".{}.tmp", Uuid::new_v4().simple()));

        if let Err(e) = Self::write_then_rename(&tmp, &path, data).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e);
        }

        debug!("Stored {} ({} bytes)", path.display(), data.len());
        Ok(path)
    }

    async fn write_then_rename(tmp: &Path, path: &Path, data: &[u8]) -> io::Result<()> {
        fs::write(tmp, data).await?;
        fs::rename(tmp, path).await
    }

    /// Read a stored file; unknown or unsafe names yield `None`
    pub async fn get(&self, name: &str) -> io::Result<Option<ImageData>> {
        if !is_safe_name(name) {
            return Ok(None);
        }

        let data = match fs::read(self.path(name)).await {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        Ok(Some(ImageData {
            hash: Self::compute_hash(&data),
            mime_type: mime_for_name(name).to_string(),
            data,
        }))
    }

    /// Check if a file exists
    pub async fn exists(&self, name: &str) -> bool {
        is_safe_name(name) && fs::try_exists(self.path(name)).await.unwrap_or(false)
    }
}

/// Content type from a file extension
pub fn mime_for_name(name: &str) -> &'static str {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(image::ImageFormat::from_extension)
        .map(|format| format.to_mime_type())
        .unwrap_or("application/octet-stream")
}

/// Content type from leading magic bytes
pub fn sniff_mime(data: &[u8]) -> Option<&'static str> {
    image::guess_format(data)
        .ok()
        .map(|format| format.to_mime_type())
}
