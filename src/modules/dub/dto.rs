use serde::Serialize;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::model::DubOutcome;

pub const STATUS_COMPLETED: &str = "completed";

/// Multipart body accepted by both upload routes. Documentation only; the
/// handlers read the stream field by field.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct DubForm {
    #[schema(value_type = String, format = Binary)]
    pub video: Vec<u8>,
    #[schema(rename = "targetLanguage", example = "es")]
    pub target_language: String,
}

#[derive(Debug, Validate)]
pub struct TargetLanguage {
    #[validate(
        length(max = 35, message = "Target language code is too long"),
        custom(function = "validate_language_code")
    )]
    pub code: String,
}

fn validate_language_code(code: &str) -> Result<(), ValidationError> {
    let well_formed = code
        .split('-')
        .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric()));
    if well_formed {
        Ok(())
    } else {
        Err(ValidationError::new("language_code")
            .with_message("Target language must look like `es` or `pt-BR`".into()))
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DubResponse {
    pub original_file_name: String,
    pub stored_file_name: String,
    pub target_language: String,
    pub status: String,
    pub file_path: String,
    pub translated_file_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcription: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translated_text: Option<String>,
}

impl From<DubOutcome> for DubResponse {
    fn from(o: DubOutcome) -> Self {
        Self {
            original_file_name: o.original_file_name,
            stored_file_name: o.stored_file_name,
            target_language: o.target_language,
            status: STATUS_COMPLETED.to_string(),
            file_path: o.file_path,
            translated_file_path: o.translated_file_path,
            transcription: o.transcription,
            translated_text: o.translated_text,
        }
    }
}
