use std::env;
use std::str::FromStr;

pub enum EnvKey {
    ServerPort,
    UploadDir,
    PublicPathPrefix,
    ScratchDir,
    FfmpegPath,
    GoogleApiKey,
    SpeechApiUrl,
    TranslateApiUrl,
    TtsApiUrl,
    MaxUploadBytes,
    MaxConcurrentJobs,
    UpstreamTimeoutSecs,
    MediaTimeoutSecs,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::ServerPort => "APP_PORT",
            EnvKey::UploadDir => "UPLOAD_DIR",
            EnvKey::PublicPathPrefix => "PUBLIC_PATH_PREFIX",
            EnvKey::ScratchDir => "SCRATCH_DIR",
            EnvKey::FfmpegPath => "FFMPEG_PATH",
            EnvKey::GoogleApiKey => "GOOGLE_API_KEY",
            EnvKey::SpeechApiUrl => "SPEECH_API_URL",
            EnvKey::TranslateApiUrl => "TRANSLATE_API_URL",
            EnvKey::TtsApiUrl => "TTS_API_URL",
            EnvKey::MaxUploadBytes => "MAX_UPLOAD_BYTES",
            EnvKey::MaxConcurrentJobs => "MAX_CONCURRENT_JOBS",
            EnvKey::UpstreamTimeoutSecs => "UPSTREAM_TIMEOUT_SECS",
            EnvKey::MediaTimeoutSecs => "MEDIA_TIMEOUT_SECS",
        }
    }
}

pub fn get(key: EnvKey) -> Result<String, env::VarError> {
    env::var(key.as_str())
}

pub fn get_or(key: EnvKey, default: &str) -> String {
    env::var(key.as_str()).unwrap_or_else(|_| default.to_string())
}

pub fn get_parsed<T: FromStr>(key: EnvKey, default: T) -> T {
    parse_or(get(key).ok().as_deref(), default)
}

/// Unset or unparsable values fall back to `default`.
fn parse_or<T: FromStr>(raw: Option<&str>, default: T) -> T {
    raw.and_then(|val| val.trim().parse::<T>().ok())
        .unwrap_or(default)
}
