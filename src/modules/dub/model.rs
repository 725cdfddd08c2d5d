use std::fmt;
use std::path::Path;

use tracing::{error, info};
use uuid::Uuid;

use crate::common::error::DubError;
use crate::infrastructure::storage::{Artifact, ArtifactNames};

/// Forward-only lifecycle of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineStage {
    Received,
    Stored,
    AudioExtracted,
    Transcribed,
    Translated,
    Synthesized,
    Remuxed,
    Done,
    Failed,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Received => "received",
            PipelineStage::Stored => "stored",
            PipelineStage::AudioExtracted => "audio_extracted",
            PipelineStage::Transcribed => "transcribed",
            PipelineStage::Translated => "translated",
            PipelineStage::Synthesized => "synthesized",
            PipelineStage::Remuxed => "remuxed",
            PipelineStage::Done => "done",
            PipelineStage::Failed => "failed",
        }
    }

    /// The stage a job sitting in `self` is working towards.
    pub fn next(&self) -> PipelineStage {
        match self {
            PipelineStage::Received => PipelineStage::Stored,
            PipelineStage::Stored => PipelineStage::AudioExtracted,
            PipelineStage::AudioExtracted => PipelineStage::Transcribed,
            PipelineStage::Transcribed => PipelineStage::Translated,
            PipelineStage::Translated => PipelineStage::Synthesized,
            PipelineStage::Synthesized => PipelineStage::Remuxed,
            PipelineStage::Remuxed => PipelineStage::Done,
            PipelineStage::Done | PipelineStage::Failed => *self,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Done | PipelineStage::Failed)
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks where a request is. Stages are never re-entered.
#[derive(Debug)]
pub struct JobProgress {
    token: Uuid,
    stage: PipelineStage,
}

impl JobProgress {
    pub fn new(token: Uuid, stage: PipelineStage) -> Self {
        Self { token, stage }
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    pub fn advance(&mut self, next: PipelineStage) {
        debug_assert!(
            !self.stage.is_terminal() && next > self.stage && next != PipelineStage::Failed,
            "illegal transition {} -> {}",
            self.stage,
            next
        );
        self.stage = next;
        info!(token = %self.token, stage = %next, "Pipeline stage reached");
    }

    /// Moves to `Failed` and returns the stage that was being attempted.
    pub fn fail(&mut self, err: &DubError) -> PipelineStage {
        self.fail_in(self.stage.next(), err)
    }

    /// Like [`fail`](Self::fail) for runs that skip stages.
    pub fn fail_in(&mut self, stage: PipelineStage, err: &DubError) -> PipelineStage {
        self.stage = PipelineStage::Failed;
        error!(token = %self.token, %stage, "Pipeline failed: {}", err);
        stage
    }
}

/// The uploaded video on disk. Removed when dropped unless the pipeline completes.
#[derive(Debug)]
pub struct StoredVideo {
    pub names: ArtifactNames,
    pub original_file_name: String,
    pub artifact: Artifact,
}

impl StoredVideo {
    pub fn path(&self) -> &Path {
        self.artifact.path()
    }

    pub fn token(&self) -> Uuid {
        self.names.token
    }
}

/// A validated request: a stored video and the language to dub it into.
#[derive(Debug)]
pub struct DubSubmission {
    pub video: StoredVideo,
    pub target_language: String,
}

/// What a finished request leaves behind for the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DubOutcome {
    pub original_file_name: String,
    pub stored_file_name: String,
    pub target_language: String,
    pub file_path: String,
    pub translated_file_path: String,
    /// `None` for the passthrough variant, which never transcribes.
    pub transcription: Option<String>,
    pub translated_text: Option<String>,
}
