use std::{
    io,
    path::{Path, PathBuf},
};

use axum::async_trait;
use bytes::Bytes;

/// Storage for client-submitted files.
#[async_trait]
pub trait UploadStore: Send + Sync {
    /// Write `body` into the store and return the name it was stored under.
    /// Callers with nothing to store must not call this; the no-file path
    /// performs no I/O at all.
    async fn save(&self, filename: &str, body: Bytes) -> io::Result<String>;
}

/// Writes uploads into a local directory, keyed by the client-supplied
/// filename. A second upload with the same name overwrites the first.
pub struct LocalUploads {
    root: PathBuf,
}

impl LocalUploads {
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }
}

#[async_trait]
impl UploadStore for LocalUploads {
    async fn save(&self, filename: &str, body: Bytes) -> io::Result<String> {
        // Client names are untrusted; keep only the final path component.
        let name = Path::new(filename)
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "upload has no usable filename")
            })?;
        let dest = self.root.join(name);
        tokio::fs::write(&dest, body).await?;
        Ok(name.to_string())
    }
}
