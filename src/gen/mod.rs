//! Media generation fallback pipeline.
//!
//! Every request either reaches a live AI provider or degrades to a
//! deterministic placeholder artifact carrying diagnostic text. Expected
//! failures (missing credentials, network errors, malformed responses) are
//! absorbed here; only catastrophic environment failures escape.

mod artifact;
mod font;
mod orchestrator;
mod placeholder;
mod provider;
mod video;

pub use artifact::{ensure_output_dir, unique_artifact_path};
pub use font::Font;
pub use orchestrator::{
    Orchestrator, DEFAULT_VIDEO_SECONDS, EMPTY_RESPONSE_MARKER, FALLBACK_TEXT_PREFIX,
    MOCK_TEXT_PREFIX, PROMPT_REQUIRED_MESSAGE,
};
pub use placeholder::{
    render_placeholder_image, RenderError, CANVAS_HEIGHT, CANVAS_WIDTH, PRODUCT_LABEL,
};
pub use provider::{
    GeminiClient, Provider, ProviderError, TextReply, API_BASE_URL, IMAGE_MODEL, TEXT_MODEL,
};
pub use video::{render_placeholder_video, FRAME_RATE};
