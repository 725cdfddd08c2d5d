use std::path::PathBuf;
use std::time::Duration;

use crate::config::env::{self, EnvKey};
use thiserror::Error;

pub const DEFAULT_SPEECH_API_URL: &str = "https://speech.googleapis.com";
pub const DEFAULT_TRANSLATE_API_URL: &str = "https://translation.googleapis.com";
pub const DEFAULT_TTS_API_URL: &str = "https://texttospeech.googleapis.com";

#[derive(Debug, Error)]
#[error("missing required environment variable {0}")]
pub struct ConfigError(pub &'static str);

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_port: u16,
    pub upload_dir: PathBuf,
    pub public_path_prefix: String,
    pub scratch_dir: PathBuf,
    pub ffmpeg_path: String,
    pub google_api_key: String,
    pub speech_api_url: String,
    pub translate_api_url: String,
    pub tts_api_url: String,
    pub max_upload_bytes: usize,
    pub max_concurrent_jobs: usize,
    pub upstream_timeout: Duration,
    pub media_timeout: Duration,
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        let google_api_key = required(EnvKey::GoogleApiKey, env::get(EnvKey::GoogleApiKey).ok())?;

        Ok(Self {
            server_port: env::get_parsed(EnvKey::ServerPort, 3000),
            upload_dir: env::get_or(EnvKey::UploadDir, "public/uploads").into(),
            public_path_prefix: normalize_prefix(&env::get_or(EnvKey::PublicPathPrefix, "/uploads")),
            scratch_dir: env::get_or(EnvKey::ScratchDir, "tmp/dub").into(),
            ffmpeg_path: env::get_or(EnvKey::FfmpegPath, "ffmpeg"),
            google_api_key,
            speech_api_url: env::get_or(EnvKey::SpeechApiUrl, DEFAULT_SPEECH_API_URL),
            translate_api_url: env::get_or(EnvKey::TranslateApiUrl, DEFAULT_TRANSLATE_API_URL),
            tts_api_url: env::get_or(EnvKey::TtsApiUrl, DEFAULT_TTS_API_URL),
            max_upload_bytes: env::get_parsed(EnvKey::MaxUploadBytes, 500 * 1024 * 1024),
            max_concurrent_jobs: env::get_parsed(EnvKey::MaxConcurrentJobs, 4usize).max(1),
            upstream_timeout: Duration::from_secs(env::get_parsed(EnvKey::UpstreamTimeoutSecs, 120)),
            media_timeout: Duration::from_secs(env::get_parsed(EnvKey::MediaTimeoutSecs, 600)),
        })
    }
}

fn required(key: EnvKey, value: Option<String>) -> Result<String, ConfigError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError(key.as_str()))
}

/// Ensures a single leading slash and no trailing slash, e.g. `uploads/` -> `/uploads`.
pub fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    format!("/{}", trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_normalized() {
        assert_eq!(normalize_prefix("uploads"), "/uploads");
        assert_eq!(normalize_prefix("/uploads/"), "/uploads");
        assert_eq!(normalize_prefix(" /media/out "), "/media/out");
    }

    #[test]
    fn missing_api_key_names_the_variable() {
        let err = required(EnvKey::GoogleApiKey, None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing required environment variable GOOGLE_API_KEY"
        );
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        assert!(required(EnvKey::GoogleApiKey, Some("   ".into())).is_err());
        assert_eq!(
            required(EnvKey::GoogleApiKey, Some("abc".into())).unwrap(),
            "abc"
        );
    }
}
