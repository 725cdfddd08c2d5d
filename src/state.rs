use std::sync::Arc;

use crate::config::settings::AppConfig;
use crate::infrastructure::google::{CloudSpeechClient, CloudTranslateClient, CloudTtsClient};
use crate::infrastructure::media::FfmpegTool;
use crate::infrastructure::storage::LocalStorage;
use crate::modules::dub::DubPipeline;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub pipeline: Arc<DubPipeline>,
}

impl AppState {
    pub fn new(config: AppConfig, pipeline: DubPipeline) -> Self {
        Self {
            config,
            pipeline: Arc::new(pipeline),
        }
    }

    /// Wires the production collaborators: ffmpeg and the Google Cloud APIs.
    pub fn from_config(config: AppConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()?;

        let storage = LocalStorage::new(
            config.upload_dir.clone(),
            config.scratch_dir.clone(),
            config.public_path_prefix.clone(),
        );
        let media = FfmpegTool::new(config.ffmpeg_path.clone(), config.media_timeout);
        let speech = CloudSpeechClient::new(http.clone(), &config.speech_api_url, &config.google_api_key);
        let translate =
            CloudTranslateClient::new(http.clone(), &config.translate_api_url, &config.google_api_key);
        let tts = CloudTtsClient::new(http, &config.tts_api_url, &config.google_api_key);

        let pipeline = DubPipeline::new(
            storage,
            Arc::new(media),
            Arc::new(speech),
            Arc::new(translate),
            Arc::new(tts),
            config.max_concurrent_jobs,
        );

        Ok(Self::new(config, pipeline))
    }
}
