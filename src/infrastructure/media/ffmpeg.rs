use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::MediaTool;
use crate::common::error::DubError;

/// Sample rate the recognition service is configured for.
pub const EXTRACT_SAMPLE_RATE: &str = "16000";
const STDERR_TAIL_LINES: usize = 8;

pub struct FfmpegTool {
    binary: String,
    timeout: Duration,
}

impl FfmpegTool {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    /// Runs `-version` once. Startup only logs the result; requests fail later if it is missing.
    pub async fn check_availability(&self) -> bool {
        match Command::new(&self.binary)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
        {
            Ok(status) if status.success() => {
                info!(binary = %self.binary, "FFmpeg is available");
                true
            }
            Ok(status) => {
                warn!(binary = %self.binary, %status, "FFmpeg version check failed");
                false
            }
            Err(e) => {
                warn!(binary = %self.binary, "FFmpeg not found: {}", e);
                false
            }
        }
    }

    async fn run(&self, stage: &'static str, args: Vec<OsString>) -> Result<(), DubError> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(stage, "Executing ffmpeg command: {:?}", cmd);

        let child = cmd
            .spawn()
            .map_err(|e| DubError::MediaTool(format!("failed to execute {}: {}", self.binary, e)))?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| DubError::Timeout { stage })?
            .map_err(|e| DubError::MediaTool(format!("failed to wait for {}: {}", self.binary, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DubError::MediaTool(format!(
                "{} exited with {}: {}",
                stage,
                output.status,
                stderr_tail(&stderr, STDERR_TAIL_LINES)
            )));
        }

        info!(stage, "FFmpeg completed");
        Ok(())
    }
}

#[async_trait]
impl MediaTool for FfmpegTool {
    async fn extract_audio(&self, video: &Path, audio: &Path) -> Result<(), DubError> {
        info!("Extracting audio from {} to {}", video.display(), audio.display());
        self.run("audio extraction", extract_audio_args(video, audio)).await
    }

    async fn remux(&self, video: &Path, audio: &Path, output: &Path) -> Result<(), DubError> {
        info!(
            "Muxing {} with {} -> {}",
            video.display(),
            audio.display(),
            output.display()
        );
        self.run("remux", remux_args(video, audio, output)).await
    }

    async fn copy_streams(&self, video: &Path, output: &Path) -> Result<(), DubError> {
        info!("Copying streams {} -> {}", video.display(), output.display());
        self.run("stream copy", copy_args(video, output)).await
    }
}

pub fn extract_audio_args(video: &Path, audio: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-y".into(), "-i".into(), video.into()];
    args.extend(
        [
            "-vn",
            "-acodec",
            "pcm_s16le",
            "-ar",
            EXTRACT_SAMPLE_RATE,
            "-ac",
            "1",
        ]
        .map(OsString::from),
    );
    args.push(audio.into());
    args
}

pub fn remux_args(video: &Path, audio: &Path, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-y".into(),
        "-i".into(),
        video.into(),
        "-i".into(),
        audio.into(),
    ];
    args.extend(
        ["-c:v", "copy", "-c:a", "aac", "-map", "0:v:0", "-map", "1:a:0"].map(OsString::from),
    );
    args.push(output.into());
    args
}

pub fn copy_args(video: &Path, output: &Path) -> Vec<OsString> {
    vec![
        "-y".into(),
        "-i".into(),
        video.into(),
        "-c".into(),
        "copy".into(),
        output.into(),
    ]
}

fn stderr_tail(stderr: &str, lines: usize) -> String {
    let collected: Vec<&str> = stderr
        .lines()
        .filter(|l| !l.trim().is_empty())
        .collect();
    let start = collected.len().saturating_sub(lines);
    collected[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn extraction_produces_mono_16khz_pcm16() {
        let args = extract_audio_args(&PathBuf::from("in.mp4"), &PathBuf::from("out.wav"));
        assert_eq!(
            strings(&args),
            [
                "-y", "-i", "in.mp4", "-vn", "-acodec", "pcm_s16le", "-ar", "16000", "-ac", "1",
                "out.wav"
            ]
        );
    }

    #[test]
    fn remux_copies_video_and_maps_new_audio() {
        let args = remux_args(
            &PathBuf::from("in.mp4"),
            &PathBuf::from("dub.wav"),
            &PathBuf::from("translated_in.mp4"),
        );
        assert_eq!(
            strings(&args),
            [
                "-y", "-i", "in.mp4", "-i", "dub.wav", "-c:v", "copy", "-c:a", "aac", "-map",
                "0:v:0", "-map", "1:a:0", "translated_in.mp4"
            ]
        );
    }

    #[test]
    fn copy_is_a_plain_stream_copy() {
        let args = copy_args(&PathBuf::from("a.mkv"), &PathBuf::from("b.mkv"));
        assert_eq!(strings(&args), ["-y", "-i", "a.mkv", "-c", "copy", "b.mkv"]);
    }

    #[test]
    fn stderr_tail_keeps_last_non_empty_lines() {
        let stderr = "one\n\ntwo\nthree\n";
        assert_eq!(stderr_tail(stderr, 2), "two\nthree");
        assert_eq!(stderr_tail("", 3), "");
    }

    #[tokio::test]
    async fn missing_binary_is_a_media_tool_error() {
        let tool = FfmpegTool::new("definitely-not-ffmpeg-on-this-host", Duration::from_secs(5));
        let result = tool
            .copy_streams(&PathBuf::from("a.mp4"), &PathBuf::from("b.mp4"))
            .await;
        assert!(matches!(result, Err(DubError::MediaTool(_))));
        assert!(!tool.check_availability().await);
    }

    #[cfg(unix)]
    fn fake_ffmpeg(dir: &tempfile::TempDir, script: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.path().join("ffmpeg");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", script)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_carries_the_stderr_tail() {
        let dir = tempfile::tempdir().unwrap();
        let binary = fake_ffmpeg(
            &dir,
            "echo line1 >&2\necho 'Invalid data found when processing input' >&2\nexit 1",
        );
        let tool = FfmpegTool::new(binary, Duration::from_secs(5));

        let result = tool
            .remux(Path::new("in.mp4"), Path::new("dub.wav"), Path::new("out.mp4"))
            .await;

        match result {
            Err(DubError::MediaTool(message)) => {
                assert!(message.starts_with("remux exited with"), "{}", message);
                assert!(
                    message.ends_with("line1\nInvalid data found when processing input"),
                    "{}",
                    message
                );
            }
            other => panic!("expected media tool error, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn hung_run_is_killed_at_the_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let binary = fake_ffmpeg(&dir, "sleep 5");
        let tool = FfmpegTool::new(binary, Duration::from_millis(300));

        let started = std::time::Instant::now();
        let result = tool
            .extract_audio(Path::new("in.mp4"), Path::new("out.wav"))
            .await;

        assert!(matches!(
            result,
            Err(DubError::Timeout {
                stage: "audio extraction"
            })
        ));
        assert!(started.elapsed() < Duration::from_secs(4));
    }
}
