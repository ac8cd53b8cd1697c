//! Audio/video transcodes, delegated to the `ffmpeg` binary.
//!
//! ffmpeg picks the demuxer from the input and the muxer from the output
//! extension. Video targets pin codecs explicitly; audio targets rely on
//! each container's default encoder. Every run is bounded by a timeout,
//! and a failed or timed-out run removes whatever partial output ffmpeg
//! left behind.

use crate::config::ConversionConfig;
use crate::error::MorphError;
use crate::formats::Target;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

/// Extra codec arguments per video target. Audio targets get none.
fn codec_args(target: Target) -> &'static [&'static str] {
    match target {
        Target::Webm => &[
            "-c:v", "libvpx", "-b:v", "1M", "-deadline", "realtime", "-cpu-used", "5",
            "-c:a", "libvorbis",
        ],
        Target::Avi => &["-c:v", "mpeg4", "-q:v", "5", "-c:a", "mp3"],
        Target::Mp4 => &["-c:v", "libx264", "-c:a", "aac"],
        _ => &[],
    }
}

/// Transcode `input` to `target`, writing to `output`.
pub async fn convert_media(
    input: &Path,
    target: Target,
    config: &ConversionConfig,
    output: &Path,
) -> Result<(), MorphError> {
    let mut command = Command::new(&config.ffmpeg_path);
    command
        .arg("-y")
        .arg("-i")
        .arg(input)
        .args(codec_args(target))
        .arg(output)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    debug!(
        "Running {} -y -i {} {:?} {}",
        config.ffmpeg_path,
        input.display(),
        codec_args(target),
        output.display()
    );

    let child = command.spawn().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            MorphError::ToolNotFound {
                tool: config.ffmpeg_path.clone(),
            }
        } else {
            MorphError::Internal(format!("failed to spawn {}: {e}", config.ffmpeg_path))
        }
    })?;

    let timeout = std::time::Duration::from_secs(config.tool_timeout_secs);
    let result = tokio::time::timeout(timeout, child.wait_with_output()).await;

    let outcome = match result {
        Err(_) => {
            // kill_on_drop reaps the child once the future is dropped.
            remove_partial(output);
            return Err(MorphError::ToolTimedOut {
                tool: config.ffmpeg_path.clone(),
                secs: config.tool_timeout_secs,
            });
        }
        Ok(Err(e)) => {
            remove_partial(output);
            return Err(MorphError::Internal(format!(
                "failed to wait for {}: {e}",
                config.ffmpeg_path
            )));
        }
        Ok(Ok(outcome)) => outcome,
    };

    if !outcome.status.success() {
        remove_partial(output);
        return Err(MorphError::ToolFailed {
            tool: config.ffmpeg_path.clone(),
            status: outcome.status.to_string(),
            stderr_tail: stderr_tail(&outcome.stderr),
        });
    }

    Ok(())
}

/// Last few lines of stderr; ffmpeg prints the actual failure at the end
/// of a long banner.
fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(5);
    lines[start..].join("\n")
}

fn remove_partial(output: &Path) {
    if output.exists() {
        if let Err(e) = std::fs::remove_file(output) {
            warn!("Failed to remove partial output {}: {}", output.display(), e);
        }
    }
}
