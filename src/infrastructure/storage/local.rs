use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Local filesystem layout for one deployment.
///
/// Stored inputs and outputs live in the public upload directory; intermediate
/// audio lives in the scratch directory and never outlives a request.
#[derive(Clone, Debug)]
pub struct LocalStorage {
    upload_dir: PathBuf,
    scratch_dir: PathBuf,
    public_prefix: String,
}

impl LocalStorage {
    pub fn new(
        upload_dir: impl Into<PathBuf>,
        scratch_dir: impl Into<PathBuf>,
        public_prefix: impl Into<String>,
    ) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            scratch_dir: scratch_dir.into(),
            public_prefix: public_prefix.into(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Creates both working directories. Safe to call when they already exist.
    pub async fn ensure_dirs(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.upload_dir).await?;
        fs::create_dir_all(&self.scratch_dir).await?;
        debug!(
            upload_dir = %self.upload_dir.display(),
            scratch_dir = %self.scratch_dir.display(),
            "Storage directories ready"
        );
        Ok(())
    }

    /// Allocates a fresh request token and derives every artifact name from it.
    pub fn allocate(&self, original_file_name: &str) -> ArtifactNames {
        ArtifactNames::new(Uuid::new_v4(), original_file_name)
    }

    pub fn stored_path(&self, names: &ArtifactNames) -> PathBuf {
        self.upload_dir.join(names.stored_file_name())
    }

    pub fn output_path(&self, names: &ArtifactNames) -> PathBuf {
        self.upload_dir.join(names.output_file_name())
    }

    pub fn extracted_audio_path(&self, names: &ArtifactNames) -> PathBuf {
        self.scratch_dir.join(format!("{}_source.wav", names.token))
    }

    pub fn synthesized_audio_path(&self, names: &ArtifactNames) -> PathBuf {
        self.scratch_dir.join(format!("{}_dubbed.wav", names.token))
    }

    /// URL path under which a file in the upload directory is served.
    pub fn public_url(&self, file_name: &str) -> String {
        if self.public_prefix == "/" {
            format!("/{}", file_name)
        } else {
            format!("{}/{}", self.public_prefix, file_name)
        }
    }

    /// Writes a whole payload in one go. Used for synthesized audio.
    pub async fn write(&self, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        fs::write(path, bytes).await?;
        info!(path = %path.display(), bytes = bytes.len(), "Wrote artifact");
        Ok(())
    }
}

/// Names of every artifact one request produces, all keyed by `token`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactNames {
    pub token: Uuid,
    pub extension: String,
}

impl ArtifactNames {
    pub fn new(token: Uuid, original_file_name: &str) -> Self {
        Self {
            token,
            extension: sanitize_extension(original_file_name),
        }
    }

    pub fn stored_file_name(&self) -> String {
        format!("{}{}", self.token, self.extension)
    }

    pub fn output_file_name(&self) -> String {
        format!("translated_{}", self.stored_file_name())
    }
}

/// Returns the extension of `file_name` including the dot, or an empty string.
///
/// Only ASCII alphanumerics survive, so a client-supplied name can never add
/// path separators to the stored file name.
pub fn sanitize_extension(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or("");
    match base.rfind('.') {
        Some(idx) if idx > 0 => {
            let ext: String = base[idx + 1..]
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .take(16)
                .collect();
            if ext.is_empty() {
                String::new()
            } else {
                format!(".{}", ext.to_ascii_lowercase())
            }
        }
        _ => String::new(),
    }
}

/// A file owned by the current request. Removed on drop unless kept.
#[derive(Debug)]
pub struct Artifact {
    path: PathBuf,
    keep: bool,
}

impl Artifact {
    pub fn new(path: PathBuf) -> Self {
        Self { path, keep: false }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hands the file over to the caller; it will no longer be removed.
    pub fn keep(mut self) -> PathBuf {
        self.keep = true;
        std::mem::take(&mut self.path)
    }
}

impl Drop for Artifact {
    fn drop(&mut self) {
        if self.keep {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed artifact"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), "Failed to remove artifact: {}", e),
        }
    }
}
