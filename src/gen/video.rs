//! Deterministic placeholder video rendering.
//!
//! Renders a fixed number of identical frames via the placeholder frame
//! composition and pipes them as raw RGB24 into an `ffmpeg` subprocess that
//! encodes an H.264 mp4 with no audio track. The stillness is intentional:
//! the placeholder communicates "generation unavailable", not motion.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::artifact::{ensure_output_dir, unique_artifact_path};
use super::placeholder::{compose_frame, FrameStyle, RenderError, CANVAS_HEIGHT, CANVAS_WIDTH};

/// Fixed frame rate for placeholder videos.
pub const FRAME_RATE: u32 = 24;

/// Encoder binary resolved from `PATH`.
const FFMPEG_BIN: &str = "ffmpeg";

/// Render a placeholder video for `text` and write it as a uniquely named
/// mp4 inside `output_dir`.
///
/// Total frame count is `seconds` x 24; all frames are identical.
///
/// # Errors
///
/// Unlike the rest of the pipeline, failures here are not absorbed: a
/// missing encoder binary (`RenderError::EncoderNotFound`), a non-zero
/// encoder exit (`RenderError::EncoderFailed`), or a filesystem failure
/// (`RenderError::Io`) propagates to the caller, since there is no further
/// fallback beneath the placeholder tier.
pub async fn render_placeholder_video(
    text: &str,
    seconds: u32,
    output_dir: &Path,
) -> Result<PathBuf, RenderError> {
    let frame = compose_frame(text, FrameStyle::Video);
    ensure_output_dir(output_dir)?;
    let path = unique_artifact_path(output_dir, "mp4");
    let frames = frame_count(seconds);

    log::info!(
        "Encoding placeholder video: {} frames at {} fps -> {:?}",
        frames,
        FRAME_RATE,
        path
    );

    let mut child = Command::new(FFMPEG_BIN)
        .args(encoder_args(&path))
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RenderError::EncoderNotFound(e)
            } else {
                RenderError::Io(e)
            }
        })?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| RenderError::Io(std::io::Error::other("ffmpeg stdin unavailable")))?;

    for _ in 0..frames {
        stdin.write_all(frame.as_raw()).await?;
    }
    stdin.flush().await?;
    drop(stdin);

    let output = child.wait_with_output().await?;
    if !output.status.success() {
        return Err(RenderError::EncoderFailed {
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    log::info!("Placeholder video written to {:?}", path);
    Ok(path)
}

/// Total frames for a requested duration. A zero duration still produces
/// one second of video so the container is always playable.
fn frame_count(seconds: u32) -> u32 {
    seconds.max(1) * FRAME_RATE
}

/// Build the ffmpeg argument list: raw RGB24 frames on stdin, H.264 yuv420p
/// mp4 on disk, no audio.
fn encoder_args(output: &Path) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-v".to_string(),
        "error".to_string(),
        "-f".to_string(),
        "rawvideo".to_string(),
        "-pixel_format".to_string(),
        "rgb24".to_string(),
        "-video_size".to_string(),
        format!("{}x{}", CANVAS_WIDTH, CANVAS_HEIGHT),
        "-framerate".to_string(),
        FRAME_RATE.to_string(),
        "-i".to_string(),
        "-".to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-an".to_string(),
        output.to_string_lossy().into_owned(),
    ]
}
