use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{info, warn};

use super::model::{DubOutcome, JobProgress, PipelineStage, StoredVideo};
use crate::common::error::DubError;
use crate::infrastructure::google::{Synthesizer, Transcriber, Translator};
use crate::infrastructure::media::MediaTool;
use crate::infrastructure::storage::{Artifact, LocalStorage};

/// Runs uploaded videos through extraction, recognition, translation,
/// synthesis and remux, one stage after another.
pub struct DubPipeline {
    storage: LocalStorage,
    media: Arc<dyn MediaTool>,
    transcriber: Arc<dyn Transcriber>,
    translator: Arc<dyn Translator>,
    synthesizer: Arc<dyn Synthesizer>,
    permits: Arc<Semaphore>,
}

struct DubbedArtifacts {
    transcript: String,
    translated: String,
    output: Artifact,
}

impl DubPipeline {
    pub fn new(
        storage: LocalStorage,
        media: Arc<dyn MediaTool>,
        transcriber: Arc<dyn Transcriber>,
        translator: Arc<dyn Translator>,
        synthesizer: Arc<dyn Synthesizer>,
        max_concurrent_jobs: usize,
    ) -> Self {
        Self {
            storage,
            media,
            transcriber,
            translator,
            synthesizer,
            permits: Arc::new(Semaphore::new(max_concurrent_jobs.max(1))),
        }
    }

    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    /// Waits for a free pipeline slot. The slot is held until the permit drops.
    pub async fn admit(&self) -> Option<OwnedSemaphorePermit> {
        // The semaphore is never closed, so this only yields None in theory.
        self.permits.clone().acquire_owned().await.ok()
    }

    pub fn available_slots(&self) -> usize {
        self.permits.available_permits()
    }

    /// Full dub: the stored video keeps its picture and gets a translated voice track.
    pub async fn dub(&self, video: StoredVideo, target_language: &str) -> Result<DubOutcome, DubError> {
        let mut progress = JobProgress::new(video.token(), PipelineStage::Stored);

        let dubbed = match self.run_stages(&mut progress, &video, target_language).await {
            Ok(dubbed) => dubbed,
            Err(e) => {
                progress.fail(&e);
                return Err(e);
            }
        };

        progress.advance(PipelineStage::Done);
        dubbed.output.keep();
        Ok(self.outcome(
            video,
            target_language,
            Some(dubbed.transcript),
            Some(dubbed.translated),
        ))
    }

    /// Reduced variant: the stored video is stream-copied to the output path.
    pub async fn passthrough(
        &self,
        video: StoredVideo,
        target_language: &str,
    ) -> Result<DubOutcome, DubError> {
        let mut progress = JobProgress::new(video.token(), PipelineStage::Stored);

        let output = Artifact::new(self.storage.output_path(&video.names));
        if let Err(e) = self.media.copy_streams(video.path(), output.path()).await {
            progress.fail_in(PipelineStage::Remuxed, &e);
            return Err(e);
        }
        progress.advance(PipelineStage::Remuxed);
        progress.advance(PipelineStage::Done);

        output.keep();
        Ok(self.outcome(video, target_language, None, None))
    }

    async fn run_stages(
        &self,
        progress: &mut JobProgress,
        video: &StoredVideo,
        target_language: &str,
    ) -> Result<DubbedArtifacts, DubError> {
        let names = &video.names;

        let extracted = Artifact::new(self.storage.extracted_audio_path(names));
        self.media.extract_audio(video.path(), extracted.path()).await?;
        progress.advance(PipelineStage::AudioExtracted);

        let transcript = self.transcriber.transcribe(extracted.path()).await?;
        drop(extracted);
        if transcript.is_empty() {
            warn!(token = %names.token, "No speech recognized; translating an empty transcript");
        }
        progress.advance(PipelineStage::Transcribed);

        let translated = self.translator.translate(&transcript, target_language).await?;
        progress.advance(PipelineStage::Translated);

        if translated.trim().is_empty() {
            return Err(DubError::NoSynthesizedAudio);
        }
        let audio = self.synthesizer.synthesize(&translated, target_language).await?;
        let synthesized = Artifact::new(self.storage.synthesized_audio_path(names));
        self.storage.write(synthesized.path(), &audio).await?;
        progress.advance(PipelineStage::Synthesized);

        let output = Artifact::new(self.storage.output_path(names));
        self.media
            .remux(video.path(), synthesized.path(), output.path())
            .await?;
        progress.advance(PipelineStage::Remuxed);

        Ok(DubbedArtifacts {
            transcript,
            translated,
            output,
        })
    }

    fn outcome(
        &self,
        video: StoredVideo,
        target_language: &str,
        transcription: Option<String>,
        translated_text: Option<String>,
    ) -> DubOutcome {
        let stored_file_name = video.names.stored_file_name();
        let output_file_name = video.names.output_file_name();
        video.artifact.keep();

        info!(stored = %stored_file_name, output = %output_file_name, "Video processing completed");

        DubOutcome {
            original_file_name: video.original_file_name,
            file_path: self.storage.public_url(&stored_file_name),
            translated_file_path: self.storage.public_url(&output_file_name),
            stored_file_name,
            target_language: target_language.to_string(),
            transcription,
            translated_text,
        }
    }
}
