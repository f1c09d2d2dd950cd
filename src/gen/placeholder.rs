//! Deterministic placeholder image rendering.
//!
//! When live generation is unavailable or fails, the pipeline synthesizes a
//! fixed-size still image carrying the prompt (and, on fallback, the failure
//! reason) as diagnostic text. Rendering always succeeds short of a
//! filesystem failure.

use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};

use super::artifact::{ensure_output_dir, unique_artifact_path};
use super::font::Font;

/// Canvas width in pixels.
pub const CANVAS_WIDTH: u32 = 1024;

/// Canvas height in pixels.
pub const CANVAS_HEIGHT: u32 = 576;

/// Product label drawn on every placeholder frame.
pub const PRODUCT_LABEL: &str = "MyAiMediaMgr";

/// Dark background color.
const BACKGROUND_COLOR: Rgb<u8> = Rgb([15, 17, 34]);

/// Purple label color.
const LABEL_COLOR: Rgb<u8> = Rgb([168, 85, 247]);

/// Near-white body text color.
const BODY_COLOR: Rgb<u8> = Rgb([230, 230, 230]);

/// Top-left corner of the product label.
const LABEL_ORIGIN: (i32, i32) = (30, 30);

/// Top-left corner of the body text block.
const BODY_ORIGIN: (i32, i32) = (30, 90);

/// Extra vertical spacing between wrapped lines, in pixels.
const LINE_SPACING: f32 = 8.0;

/// Horizontal margin used to bound the wrapped text width.
const MARGIN: u32 = 30;

/// Errors from the placeholder tier.
///
/// There is no further fallback beneath the placeholders, so these are
/// catastrophic environment failures and propagate to the caller.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("video encoder (ffmpeg) not found: {0}")]
    EncoderNotFound(std::io::Error),

    #[error("video encoder exited with code {exit_code:?}: {stderr}")]
    EncoderFailed {
        exit_code: Option<i32>,
        stderr: String,
    },
}

/// Frame composition parameters for the two placeholder kinds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum FrameStyle {
    /// Still image: 32 px font, body truncated to 400 characters.
    Image,
    /// Video frame: 36 px font, body truncated to 120 characters.
    Video,
}

impl FrameStyle {
    fn font_size(self) -> f32 {
        match self {
            FrameStyle::Image => 32.0,
            FrameStyle::Video => 36.0,
        }
    }

    fn body_limit(self) -> usize {
        match self {
            FrameStyle::Image => 400,
            FrameStyle::Video => 120,
        }
    }
}

/// Render a placeholder image for `text` and write it as a uniquely named
/// PNG inside `output_dir`.
///
/// The directory is created if absent. Returns the path of the written file.
pub fn render_placeholder_image(text: &str, output_dir: &Path) -> Result<PathBuf, RenderError> {
    let frame = compose_frame(text, FrameStyle::Image);
    ensure_output_dir(output_dir)?;
    let path = unique_artifact_path(output_dir, "png");
    frame.save(&path)?;
    log::info!("Placeholder image written to {:?}", path);
    Ok(path)
}

/// Compose one placeholder frame in memory.
///
/// Deterministic for identical input text; shared by the still-image path
/// and the video sequencer.
pub(crate) fn compose_frame(text: &str, style: FrameStyle) -> RgbImage {
    let mut canvas = RgbImage::from_pixel(CANVAS_WIDTH, CANVAS_HEIGHT, BACKGROUND_COLOR);
    let font = Font::load();
    let size = style.font_size();

    font.draw_text(
        &mut canvas,
        LABEL_ORIGIN.0,
        LABEL_ORIGIN.1,
        size,
        LABEL_COLOR,
        PRODUCT_LABEL,
    );

    let body = truncate_chars(text, style.body_limit());
    let max_width = (CANVAS_WIDTH - 2 * MARGIN) as f32;
    let line_step = font.line_height(size) + LINE_SPACING;

    let mut y = BODY_ORIGIN.1 as f32;
    for line in wrap_lines(&font, body, size, max_width) {
        if y >= CANVAS_HEIGHT as f32 {
            break;
        }
        font.draw_text(&mut canvas, BODY_ORIGIN.0, y as i32, size, BODY_COLOR, &line);
        y += line_step;
    }

    canvas
}

/// Truncate `text` to at most `max` characters without splitting a char.
pub(crate) fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Word-wrap `text` to fit within `max_width` pixels.
///
/// Existing newlines are respected; words longer than a full line are
/// hard-broken at character boundaries.
fn wrap_lines(font: &Font, text: &str, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };

            if font.text_width(&candidate, size) <= max_width {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }

            if font.text_width(word, size) <= max_width {
                current = word.to_string();
            } else {
                current = break_word(font, word, size, max_width, &mut lines);
            }
        }
        // An empty paragraph still occupies a line.
        lines.push(current);
    }

    lines
}

/// Hard-break an overlong word, pushing full lines and returning the
/// remainder.
fn break_word(
    font: &Font,
    word: &str,
    size: f32,
    max_width: f32,
    lines: &mut Vec<String>,
) -> String {
    let mut current = String::new();
    for c in word.chars() {
        current.push(c);
        if font.text_width(&current, size) > max_width && current.chars().count() > 1 {
            current.pop();
            lines.push(std::mem::take(&mut current));
            current.push(c);
        }
    }
    current
}
