use std::path::Path;

use async_trait::async_trait;

use crate::common::error::DubError;

pub mod ffmpeg;

pub use ffmpeg::FfmpegTool;

/// Container and stream operations the pipeline needs from an external media tool.
///
/// Every call waits for the tool to exit before returning; the output file is
/// only meaningful after `Ok(())`.
#[async_trait]
pub trait MediaTool: Send + Sync {
    /// Drops video and writes mono 16 kHz signed 16-bit little-endian PCM.
    async fn extract_audio(&self, video: &Path, audio: &Path) -> Result<(), DubError>;

    /// Copies the video stream of `video` and re-encodes `audio` to AAC into `output`.
    async fn remux(&self, video: &Path, audio: &Path, output: &Path) -> Result<(), DubError>;

    /// Stream-copies every stream of `video` into `output`.
    async fn copy_streams(&self, video: &Path, output: &Path) -> Result<(), DubError>;
}
