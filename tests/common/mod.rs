#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::Request;

use dubber::config::AppConfig;
use dubber::infrastructure::google::{Synthesizer, Transcriber, Translator};
use dubber::infrastructure::media::MediaTool;
use dubber::infrastructure::storage::LocalStorage;
use dubber::modules::dub::DubPipeline;
use dubber::{AppState, DubError, create_app};

pub const BOUNDARY: &str = "dubber-test-boundary";

#[derive(Default)]
pub struct Calls(Mutex<Vec<&'static str>>);

impl Calls {
    pub fn push(&self, name: &'static str) {
        self.0.lock().unwrap().push(name);
    }

    pub fn list(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().clone()
    }
}

/// Stands in for ffmpeg by writing small placeholder files.
pub struct FakeMedia {
    pub calls: Arc<Calls>,
    pub fail_extract: bool,
}

#[async_trait]
impl MediaTool for FakeMedia {
    async fn extract_audio(&self, _video: &Path, audio: &Path) -> Result<(), DubError> {
        self.calls.push("extract");
        if self.fail_extract {
            return Err(DubError::MediaTool("Invalid data found when processing input".into()));
        }
        tokio::fs::write(audio, b"RIFF-source").await?;
        Ok(())
    }

    async fn remux(&self, video: &Path, _audio: &Path, output: &Path) -> Result<(), DubError> {
        self.calls.push("remux");
        tokio::fs::copy(video, output).await?;
        Ok(())
    }

    async fn copy_streams(&self, video: &Path, output: &Path) -> Result<(), DubError> {
        self.calls.push("copy");
        tokio::fs::copy(video, output).await?;
        Ok(())
    }
}

pub struct FakeCloud {
    pub calls: Arc<Calls>,
    pub transcript: String,
}

#[async_trait]
impl Transcriber for FakeCloud {
    async fn transcribe(&self, _audio: &Path) -> Result<String, DubError> {
        self.calls.push("transcribe");
        Ok(self.transcript.clone())
    }
}

#[async_trait]
impl Translator for FakeCloud {
    async fn translate(&self, text: &str, _target: &str) -> Result<String, DubError> {
        self.calls.push("translate");
        Ok(match text {
            "" => String::new(),
            "你好世界" => "hola mundo".to_string(),
            other => other.to_string(),
        })
    }
}

#[async_trait]
impl Synthesizer for FakeCloud {
    async fn synthesize(&self, _text: &str, _language: &str) -> Result<Vec<u8>, DubError> {
        self.calls.push("synthesize");
        Ok(b"RIFF-dubbed".to_vec())
    }
}

pub struct TestApp {
    pub dir: tempfile::TempDir,
    pub router: Router,
    pub calls: Arc<Calls>,
}

impl TestApp {
    pub fn upload_dir(&self) -> PathBuf {
        self.dir.path().join("uploads")
    }

    pub fn scratch_dir(&self) -> PathBuf {
        self.dir.path().join("scratch")
    }

    pub fn files_in(dir: &Path) -> Vec<PathBuf> {
        match std::fs::read_dir(dir) {
            Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
            Err(_) => Vec::new(),
        }
    }
}

pub struct TestAppBuilder {
    transcript: String,
    fail_extract: bool,
    max_upload_bytes: usize,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            transcript: "你好世界".to_string(),
            fail_extract: false,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }

    pub fn transcript(mut self, transcript: &str) -> Self {
        self.transcript = transcript.to_string();
        self
    }

    pub fn failing_extraction(mut self) -> Self {
        self.fail_extract = true;
        self
    }

    pub fn max_upload_bytes(mut self, limit: usize) -> Self {
        self.max_upload_bytes = limit;
        self
    }

    pub fn build(self) -> TestApp {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path(), self.max_upload_bytes);
        let calls = Arc::new(Calls::default());

        let storage = LocalStorage::new(
            config.upload_dir.clone(),
            config.scratch_dir.clone(),
            config.public_path_prefix.clone(),
        );
        let cloud = Arc::new(FakeCloud {
            calls: calls.clone(),
            transcript: self.transcript,
        });
        let media = Arc::new(FakeMedia {
            calls: calls.clone(),
            fail_extract: self.fail_extract,
        });
        let pipeline = DubPipeline::new(storage, media, cloud.clone(), cloud.clone(), cloud, 2);

        let router = create_app(AppState::new(config, pipeline));
        TestApp { dir, router, calls }
    }
}

pub fn test_config(root: &Path, max_upload_bytes: usize) -> AppConfig {
    AppConfig {
        server_port: 0,
        upload_dir: root.join("uploads"),
        public_path_prefix: "/uploads".to_string(),
        scratch_dir: root.join("scratch"),
        ffmpeg_path: "ffmpeg".to_string(),
        google_api_key: "test-key".to_string(),
        speech_api_url: "http://127.0.0.1:9".to_string(),
        translate_api_url: "http://127.0.0.1:9".to_string(),
        tts_api_url: "http://127.0.0.1:9".to_string(),
        max_upload_bytes,
        max_concurrent_jobs: 2,
        upstream_timeout: Duration::from_secs(5),
        media_timeout: Duration::from_secs(5),
    }
}

pub enum Part<'a> {
    File {
        name: &'a str,
        file_name: &'a str,
        bytes: &'a [u8],
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::File {
                name,
                file_name,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: video/mp4\r\n\r\n",
                        name, file_name
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

pub async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
