use std::path::{Path, PathBuf};

use axum::{
    body::Bytes,
    extract::multipart::{Field, MultipartError},
    http::StatusCode,
};
use futures_util::StreamExt;
use tokio::{fs::File, io::AsyncWriteExt};
use tracing::{error, info};

use crate::common::error::DubError;

/// Writes an upload to disk chunk by chunk instead of buffering it in memory.
pub struct FileUploader {
    path: PathBuf,
    file: File,
    written: u64,
}

impl FileUploader {
    pub async fn new(path: &Path) -> Result<Self, DubError> {
        let file = File::create(path).await?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
            written: 0,
        })
    }

    pub async fn write_chunk(&mut self, chunk: Bytes) -> Result<(), DubError> {
        self.file.write_all(&chunk).await?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    pub async fn finish(mut self) -> Result<u64, DubError> {
        self.file.flush().await?;
        self.file.sync_all().await?;
        info!(path = %self.path.display(), bytes = self.written, "Upload stored");
        Ok(self.written)
    }

    /// Removes whatever was written so far.
    pub async fn abort(self) {
        drop(self.file);
        if let Err(e) = tokio::fs::remove_file(&self.path).await {
            error!(path = %self.path.display(), "Failed to remove partial upload: {}", e);
        }
    }
}

pub fn multipart_error(e: MultipartError) -> DubError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        DubError::PayloadTooLarge
    } else {
        DubError::InvalidRequest(e.body_text())
    }
}

pub async fn stream_to_file(mut field: Field<'_>, path: &Path) -> Result<u64, DubError> {
    let mut uploader = FileUploader::new(path).await?;

    while let Some(chunk) = field.next().await {
        let chunk = match chunk {
            Ok(c) => c,
            Err(e) => {
                error!("Stream error: {}", e);
                uploader.abort().await;
                return Err(multipart_error(e));
            }
        };

        if let Err(e) = uploader.write_chunk(chunk).await {
            error!("Upload error: {}", e);
            uploader.abort().await;
            return Err(e);
        }
    }

    uploader.finish().await
}
