use std::path::{Path, PathBuf};
use tracing::warn;
use uuid::Uuid;

/// A transient on-disk copy of an uploaded file. The file is removed when
/// the guard drops, so every exit path of a request releases it.
pub struct TempUpload {
    path: PathBuf,
}

impl TempUpload {
    /// Write the upload under `dir` with a uuid-based name, keeping the
    /// original extension.
    pub async fn write(dir: &Path, original_name: &str, data: &[u8]) -> std::io::Result<Self> {
        tokio::fs::create_dir_all(dir).await?;
        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("bin");
        let path = dir.join(format!("{}.{ext}", Uuid::new_v4()));
        tokio::fs::write(&path, data).await?;
        Ok(TempUpload { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "failed to remove uploaded file");
            }
        }
    }
}
