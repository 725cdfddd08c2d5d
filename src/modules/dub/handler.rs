use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{error, info};
use validator::Validate;

use super::dto::{DubForm, DubResponse, TargetLanguage};
use super::model::{DubSubmission, StoredVideo};
use crate::common::error::DubError;
use crate::common::response::{ApiResponse, ApiSuccess, ErrorBody};
use crate::common::upload::{multipart_error, stream_to_file};
use crate::infrastructure::storage::{Artifact, LocalStorage};
use crate::state::AppState;

const COMPLETED_MESSAGE: &str = "Video processing completed";

/// Translate and dub an uploaded video
#[utoipa::path(
    post,
    path = "/api/translate",
    request_body(content = DubForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Video dubbed", body = ApiResponse<DubResponse>),
        (status = 400, description = "Missing video or target language", body = ErrorBody),
        (status = 413, description = "Upload too large", body = ErrorBody),
        (status = 500, description = "Error processing video", body = ErrorBody)
    ),
    tag = "Dub"
)]
pub async fn translate_video(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, DubError> {
    let _permit = state.pipeline.admit().await;

    let submission = read_submission(state.pipeline.storage(), multipart).await?;
    info!(
        token = %submission.video.token(),
        target_language = %submission.target_language,
        "Dub request accepted"
    );

    let outcome = state
        .pipeline
        .dub(submission.video, &submission.target_language)
        .await?;

    Ok(ApiSuccess(
        ApiResponse::success(DubResponse::from(outcome), COMPLETED_MESSAGE),
        StatusCode::OK,
    ))
}

/// Store an uploaded video and stream-copy it without dubbing
#[utoipa::path(
    post,
    path = "/api/upload",
    request_body(content = DubForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Video stored", body = ApiResponse<DubResponse>),
        (status = 400, description = "Missing video or target language", body = ErrorBody),
        (status = 413, description = "Upload too large", body = ErrorBody),
        (status = 500, description = "Error processing video", body = ErrorBody)
    ),
    tag = "Dub"
)]
pub async fn upload_video(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, DubError> {
    let _permit = state.pipeline.admit().await;

    let submission = read_submission(state.pipeline.storage(), multipart).await?;
    info!(token = %submission.video.token(), "Passthrough request accepted");

    let outcome = state
        .pipeline
        .passthrough(submission.video, &submission.target_language)
        .await?;

    Ok(ApiSuccess(
        ApiResponse::success(DubResponse::from(outcome), COMPLETED_MESSAGE),
        StatusCode::OK,
    ))
}

/// Reads the multipart body, streaming `video` straight to its stored path.
///
/// The video check runs before the language check when both are missing. A
/// rejected request drops its stored video, which removes the file.
pub async fn read_submission(
    storage: &LocalStorage,
    mut multipart: Multipart,
) -> Result<DubSubmission, DubError> {
    let mut video: Option<StoredVideo> = None;
    let mut target_language: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "video" if video.is_none() => {
                let original_file_name = field.file_name().unwrap_or("").to_string();
                storage
                    .ensure_dirs()
                    .await
                    .inspect_err(|e| error!("Failed to prepare upload directories: {}", e))?;

                let names = storage.allocate(&original_file_name);
                let artifact = Artifact::new(storage.stored_path(&names));
                let written = stream_to_file(field, artifact.path()).await?;

                // Browsers send an empty part when no file was picked.
                if written > 0 {
                    video = Some(StoredVideo {
                        names,
                        original_file_name,
                        artifact,
                    });
                }
            }
            "targetLanguage" => {
                let text = field.text().await.map_err(multipart_error)?;
                target_language = Some(text.trim().to_string());
            }
            _ => {}
        }
    }

    let video = video.ok_or(DubError::MissingVideo)?;
    let target_language = target_language
        .filter(|l| !l.is_empty())
        .ok_or(DubError::MissingLanguage)?;

    let language = TargetLanguage {
        code: target_language,
    };
    language
        .validate()
        .map_err(|e| DubError::InvalidRequest(e.to_string()))?;

    Ok(DubSubmission {
        video,
        target_language: language.code,
    })
}
