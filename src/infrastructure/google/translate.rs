use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{SOURCE_TEXT_LANGUAGE, Translator, endpoint, post_json};
use crate::common::error::DubError;

const SERVICE: &str = "translation";

pub struct CloudTranslateClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl CloudTranslateClient {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            url: endpoint(base_url, "language/translate/v2"),
            api_key: api_key.to_string(),
        }
    }
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
}

#[derive(Deserialize, Debug)]
struct TranslateResponse {
    data: TranslationList,
}

#[derive(Deserialize, Debug)]
struct TranslationList {
    #[serde(default)]
    translations: Vec<Translation>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

#[async_trait]
impl Translator for CloudTranslateClient {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, DubError> {
        if text.is_empty() {
            debug!("Empty text; skipping translation request");
            return Ok(String::new());
        }

        let request = TranslateRequest {
            q: text,
            source: SOURCE_TEXT_LANGUAGE,
            target: target_language,
            format: "text",
        };

        let response: TranslateResponse =
            post_json(&self.client, SERVICE, &self.url, &self.api_key, &request).await?;

        let translated = response
            .data
            .translations
            .into_iter()
            .next()
            .map(|t| t.translated_text)
            .ok_or_else(|| DubError::upstream(SERVICE, "response contained no translations"))?;

        info!(target_language, chars = translated.len(), "Translation completed");
        Ok(translated)
    }
}
