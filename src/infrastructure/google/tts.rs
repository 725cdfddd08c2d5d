use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{LINEAR16, Synthesizer, endpoint, post_json};
use crate::common::error::DubError;

const SERVICE: &str = "speech synthesis";

pub struct CloudTtsClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl CloudTtsClient {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            url: endpoint(base_url, "v1/text:synthesize"),
            api_key: api_key.to_string(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelection<'a>,
    audio_config: AudioConfig<'a>,
}

#[derive(Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    language_code: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig<'a> {
    audio_encoding: &'a str,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: Option<String>,
}

#[async_trait]
impl Synthesizer for CloudTtsClient {
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>, DubError> {
        let request = SynthesizeRequest {
            input: SynthesisInput { text },
            voice: VoiceSelection {
                language_code: language,
            },
            audio_config: AudioConfig {
                audio_encoding: LINEAR16,
            },
        };

        let response: SynthesizeResponse =
            post_json(&self.client, SERVICE, &self.url, &self.api_key, &request).await?;

        let encoded = response
            .audio_content
            .filter(|c| !c.is_empty())
            .ok_or(DubError::NoSynthesizedAudio)?;

        let audio = STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| DubError::upstream(SERVICE, format!("invalid audio content: {}", e)))?;
        if audio.is_empty() {
            return Err(DubError::NoSynthesizedAudio);
        }

        info!(language, bytes = audio.len(), "Speech synthesis completed");
        Ok(audio)
    }
}
