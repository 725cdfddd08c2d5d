use std::path::Path;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{
    LINEAR16, RECOGNITION_SAMPLE_RATE_HZ, SOURCE_SPEECH_LANGUAGE, Transcriber, endpoint, post_json,
};
use crate::common::error::DubError;

const SERVICE: &str = "speech recognition";

pub struct CloudSpeechClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl CloudSpeechClient {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            url: endpoint(base_url, "v1/speech:recognize"),
            api_key: api_key.to_string(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognizeRequest<'a> {
    config: RecognitionConfig<'a>,
    audio: RecognitionAudio,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionConfig<'a> {
    encoding: &'a str,
    sample_rate_hertz: u32,
    language_code: &'a str,
}

#[derive(Serialize)]
struct RecognitionAudio {
    content: String,
}

#[derive(Deserialize, Debug, Default)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Deserialize, Debug)]
struct RecognitionResult {
    #[serde(default)]
    alternatives: Vec<RecognitionAlternative>,
}

#[derive(Deserialize, Debug)]
struct RecognitionAlternative {
    #[serde(default)]
    transcript: String,
}

impl RecognizeResponse {
    /// First alternative of the first result. Silence yields no results at all.
    fn into_transcript(self) -> Option<String> {
        self.results
            .into_iter()
            .next()
            .and_then(|r| r.alternatives.into_iter().next())
            .map(|a| a.transcript)
    }
}

#[async_trait]
impl Transcriber for CloudSpeechClient {
    async fn transcribe(&self, audio: &Path) -> Result<String, DubError> {
        let bytes = tokio::fs::read(audio).await?;

        let request = RecognizeRequest {
            config: RecognitionConfig {
                encoding: LINEAR16,
                sample_rate_hertz: RECOGNITION_SAMPLE_RATE_HZ,
                language_code: SOURCE_SPEECH_LANGUAGE,
            },
            audio: RecognitionAudio {
                content: STANDARD.encode(&bytes),
            },
        };

        let response: RecognizeResponse =
            post_json(&self.client, SERVICE, &self.url, &self.api_key, &request).await?;

        match response.into_transcript() {
            Some(transcript) => {
                info!(chars = transcript.len(), "Transcription completed");
                Ok(transcript)
            }
            None => {
                warn!("Recognition returned no results; continuing with an empty transcript");
                Ok(String::new())
            }
        }
    }
}
