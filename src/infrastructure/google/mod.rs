//! Google Cloud speech, translation and text-to-speech clients.
//!
//! Each client talks to one REST endpoint authenticated with an API key in the
//! query string. Base URLs are configurable so tests can point them at a local
//! mock server.

use std::path::Path;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::common::error::DubError;

pub mod speech;
pub mod translate;
pub mod tts;

pub use speech::CloudSpeechClient;
pub use translate::CloudTranslateClient;
pub use tts::CloudTtsClient;

/// Recognition language of the uploaded videos (Mandarin, simplified script).
pub const SOURCE_SPEECH_LANGUAGE: &str = "cmn-Hans-CN";
/// Source language passed to the translation service.
pub const SOURCE_TEXT_LANGUAGE: &str = "zh-CN";
/// Audio encoding for both recognition input and synthesis output.
pub const LINEAR16: &str = "LINEAR16";
pub const RECOGNITION_SAMPLE_RATE_HZ: u32 = 16_000;

#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Returns the best transcript, or an empty string when nothing was recognized.
    async fn transcribe(&self, audio: &Path) -> Result<String, DubError>;
}

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, DubError>;
}

#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Returns LINEAR16 audio bytes. Never returns an empty buffer.
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>, DubError>;
}

pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// POSTs `body` as JSON and decodes a JSON reply, mapping every failure to the
/// upstream/timeout variants of `DubError`.
pub(crate) async fn post_json<B, R>(
    client: &reqwest::Client,
    service: &'static str,
    url: &str,
    api_key: &str,
    body: &B,
) -> Result<R, DubError>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    tracing::debug!(service, url, "Sending request");

    let response = client
        .post(url)
        .query(&[("key", api_key)])
        .json(body)
        .send()
        .await
        .map_err(|e| transport_error(service, e))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        return Err(DubError::upstream(service, format!("status {}: {}", status, body)));
    }

    response
        .json::<R>()
        .await
        .map_err(|e| DubError::upstream(service, format!("parse response: {}", e)))
}

fn transport_error(service: &'static str, e: reqwest::Error) -> DubError {
    if e.is_timeout() {
        DubError::Timeout { stage: service }
    } else {
        DubError::upstream(service, format!("request: {}", e))
    }
}
