//! Generation orchestrator: the mock/live decision layer.
//!
//! Chooses the placeholder or live path per call and absorbs every expected
//! provider failure by falling back to placeholder output with the failure
//! reason embedded. Callers only ever see catastrophic environment errors,
//! and only on the artifact-producing paths.
//!
//! Per-call state machine: `Start -> {MockOrNoCreds: Placeholder} |
//! {HasCreds: CallProvider -> {Success: ReturnLive} | {Failure: Placeholder}}`.
//! Single attempt, no retries, no cancellation.

use std::path::PathBuf;

use crate::config::GenerationConfig;

use super::placeholder::{render_placeholder_image, truncate_chars, RenderError};
use super::provider::{GeminiClient, Provider, ProviderError, TextReply};
use super::video::render_placeholder_video;

/// Fixed response for an empty prompt. A normal result, not an error.
pub const PROMPT_REQUIRED_MESSAGE: &str = "Please provide a prompt.";

/// Prefix tagging mock-mode text output.
pub const MOCK_TEXT_PREFIX: &str = "[MOCK TEXT]";

/// Prefix tagging text produced after a provider failure.
pub const FALLBACK_TEXT_PREFIX: &str = "[FALLBACK TEXT]";

/// Marker returned when the provider succeeded with no content.
pub const EMPTY_RESPONSE_MARKER: &str = "[EMPTY]";

/// Default placeholder video duration in seconds.
pub const DEFAULT_VIDEO_SECONDS: u32 = 6;

/// Maximum prompt characters echoed back into mock/fallback output.
const PROMPT_ECHO_LIMIT: usize = 200;

/// The generation decision layer.
///
/// Holds the provider adapter; configuration is passed explicitly into each
/// call so the environment can be re-read per request and tests never have
/// to mutate process state.
pub struct Orchestrator<P = GeminiClient> {
    provider: P,
}

impl Orchestrator<GeminiClient> {
    /// Create an orchestrator backed by the production provider client.
    pub fn new() -> Result<Self, ProviderError> {
        Ok(Self {
            provider: GeminiClient::new()?,
        })
    }
}

impl<P: Provider> Orchestrator<P> {
    /// Create an orchestrator with an explicit provider adapter.
    pub fn with_provider(provider: P) -> Self {
        Self { provider }
    }

    /// Generate text for a prompt. Never fails and never touches the
    /// filesystem: every failure mode degrades to a marked string.
    pub async fn generate_text(&self, config: &GenerationConfig, prompt: &str) -> String {
        if prompt.is_empty() {
            return PROMPT_REQUIRED_MESSAGE.to_string();
        }

        let Some(api_key) = config.live_api_key() else {
            return mock_text(prompt);
        };

        match self.provider.generate_text(api_key, prompt).await {
            Ok(TextReply::Content(text)) => text,
            Ok(TextReply::Empty) => EMPTY_RESPONSE_MARKER.to_string(),
            Err(e) => {
                log::warn!("Text generation failed, falling back: {}", e);
                fallback_text(prompt, &e)
            }
        }
    }

    /// Generate an image for a prompt, returning the path of the produced
    /// artifact.
    ///
    /// Provider failures fall back to a placeholder carrying the prompt and
    /// the failure reason; only a filesystem failure escapes.
    pub async fn generate_image(
        &self,
        config: &GenerationConfig,
        prompt: &str,
    ) -> Result<PathBuf, RenderError> {
        let Some(api_key) = config.live_api_key() else {
            return render_placeholder_image(prompt, config.output_dir());
        };

        match self
            .provider
            .generate_image(api_key, prompt, config.output_dir())
            .await
        {
            Ok(path) => Ok(path),
            Err(e) => {
                log::warn!("Image generation failed, falling back: {}", e);
                render_placeholder_image(&fallback_image_text(prompt, &e), config.output_dir())
            }
        }
    }

    /// Generate a video for a prompt.
    ///
    /// Always the placeholder sequencer: no live video provider exists in
    /// this design, a deliberate scope limitation rather than a failure
    /// path. Encoder and filesystem failures propagate.
    pub async fn generate_video(
        &self,
        config: &GenerationConfig,
        prompt: &str,
        seconds: u32,
    ) -> Result<PathBuf, RenderError> {
        render_placeholder_video(prompt, seconds, config.output_dir()).await
    }
}

/// Mock-tagged echo of the prompt's first 200 characters.
fn mock_text(prompt: &str) -> String {
    format!("{} {}", MOCK_TEXT_PREFIX, truncate_chars(prompt, PROMPT_ECHO_LIMIT))
}

/// Fallback-tagged string embedding the prompt and the failure reason.
fn fallback_text(prompt: &str, error: &ProviderError) -> String {
    format!(
        "{} {} (err: {})",
        FALLBACK_TEXT_PREFIX,
        truncate_chars(prompt, PROMPT_ECHO_LIMIT),
        error
    )
}

/// Diagnostic text rendered into a fallback placeholder image.
fn fallback_image_text(prompt: &str, error: &ProviderError) -> String {
    format!(
        "{} (fallback: {})",
        truncate_chars(prompt, PROMPT_ECHO_LIMIT),
        error
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::gen::{CANVAS_HEIGHT, CANVAS_WIDTH};

    /// Test provider that counts calls and returns a scripted outcome.
    struct StubProvider {
        text_calls: AtomicUsize,
        image_calls: AtomicUsize,
        text_reply: Option<TextReply>,
        fail_with: Option<fn() -> ProviderError>,
    }

    impl StubProvider {
        fn succeeding(reply: TextReply) -> Self {
            Self {
                text_calls: AtomicUsize::new(0),
                image_calls: AtomicUsize::new(0),
                text_reply: Some(reply),
                fail_with: None,
            }
        }

        fn failing(factory: fn() -> ProviderError) -> Self {
            Self {
                text_calls: AtomicUsize::new(0),
                image_calls: AtomicUsize::new(0),
                text_reply: None,
                fail_with: Some(factory),
            }
        }
    }

    #[async_trait]
    impl Provider for StubProvider {
        async fn generate_text(
            &self,
            _api_key: &str,
            _prompt: &str,
        ) -> Result<TextReply, ProviderError> {
            self.text_calls.fetch_add(1, Ordering::SeqCst);
            match self.fail_with {
                Some(factory) => Err(factory()),
                None => Ok(self.text_reply.clone().unwrap()),
            }
        }

        async fn generate_image(
            &self,
            _api_key: &str,
            _prompt: &str,
            output_dir: &Path,
        ) -> Result<PathBuf, ProviderError> {
            self.image_calls.fetch_add(1, Ordering::SeqCst);
            match self.fail_with {
                Some(factory) => Err(factory()),
                None => Ok(output_dir.join("live-image.png")),
            }
        }
    }

    fn timeout_error() -> ProviderError {
        ProviderError::Status {
            status: 504,
            body: "upstream timeout".to_string(),
        }
    }

    #[tokio::test]
    async fn test_generate_text_empty_prompt_returns_fixed_message() {
        let orchestrator = Orchestrator::with_provider(StubProvider::succeeding(
            TextReply::Content("unused".to_string()),
        ));
        let config = GenerationConfig::with_api_key("key", "/tmp/out");

        let result = orchestrator.generate_text(&config, "").await;
        assert_eq!(result, PROMPT_REQUIRED_MESSAGE);
        // Empty prompt short-circuits before any provider decision.
        assert_eq!(orchestrator.provider.text_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_generate_text_mock_mode_echoes_prompt() {
        let orchestrator = Orchestrator::with_provider(StubProvider::succeeding(
            TextReply::Content("unused".to_string()),
        ));
        let config = GenerationConfig::mock("/tmp/out");

        let result = orchestrator.generate_text(&config, "write a caption").await;
        assert_eq!(result, "[MOCK TEXT] write a caption");
        assert_eq!(orchestrator.provider.text_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_generate_text_mock_echo_truncates_to_200_chars() {
        let orchestrator = Orchestrator::with_provider(StubProvider::succeeding(
            TextReply::Content("unused".to_string()),
        ));
        let config = GenerationConfig::mock("/tmp/out");
        let prompt = "p".repeat(500);

        let result = orchestrator.generate_text(&config, &prompt).await;
        assert_eq!(result.len(), MOCK_TEXT_PREFIX.len() + 1 + 200);
    }

    #[tokio::test]
    async fn test_generate_text_without_credentials_never_contacts_provider() {
        let orchestrator = Orchestrator::with_provider(StubProvider::succeeding(
            TextReply::Content("unused".to_string()),
        ));
        let config = GenerationConfig {
            mock_enabled: false,
            api_key: None,
            output_dir: PathBuf::from("/tmp/out"),
        };

        let result = orchestrator.generate_text(&config, "prompt").await;
        assert!(result.starts_with(MOCK_TEXT_PREFIX));
        assert_eq!(orchestrator.provider.text_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_generate_text_live_success_returns_provider_text() {
        let orchestrator = Orchestrator::with_provider(StubProvider::succeeding(
            TextReply::Content("generated copy".to_string()),
        ));
        let config = GenerationConfig::with_api_key("key", "/tmp/out");

        let result = orchestrator.generate_text(&config, "prompt").await;
        assert_eq!(result, "generated copy");
        assert_eq!(orchestrator.provider.text_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_generate_text_empty_reply_returns_marker() {
        let orchestrator =
            Orchestrator::with_provider(StubProvider::succeeding(TextReply::Empty));
        let config = GenerationConfig::with_api_key("key", "/tmp/out");

        let result = orchestrator.generate_text(&config, "prompt").await;
        assert_eq!(result, EMPTY_RESPONSE_MARKER);
    }

    #[tokio::test]
    async fn test_generate_text_failure_embeds_prompt_and_reason() {
        let orchestrator = Orchestrator::with_provider(StubProvider::failing(timeout_error));
        let config = GenerationConfig::with_api_key("key", "/tmp/out");

        let result = orchestrator.generate_text(&config, "my prompt").await;
        assert!(result.starts_with(FALLBACK_TEXT_PREFIX));
        assert!(result.contains("my prompt"));
        assert!(result.contains("upstream timeout"));
    }

    #[tokio::test]
    async fn test_generate_image_mock_mode_renders_placeholder() {
        let temp = tempfile::tempdir().unwrap();
        let orchestrator = Orchestrator::with_provider(StubProvider::succeeding(
            TextReply::Content("unused".to_string()),
        ));
        let config = GenerationConfig::mock(temp.path());

        let path = orchestrator
            .generate_image(&config, "a mock image")
            .await
            .unwrap();

        assert!(path.exists());
        assert_eq!(orchestrator.provider.image_calls.load(Ordering::SeqCst), 0);

        let decoded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(decoded.width(), CANVAS_WIDTH);
        assert_eq!(decoded.height(), CANVAS_HEIGHT);
    }

    #[tokio::test]
    async fn test_generate_image_live_success_returns_provider_path() {
        let temp = tempfile::tempdir().unwrap();
        let orchestrator = Orchestrator::with_provider(StubProvider::succeeding(
            TextReply::Content("unused".to_string()),
        ));
        let config = GenerationConfig::with_api_key("key", temp.path());

        let path = orchestrator
            .generate_image(&config, "a live image")
            .await
            .unwrap();

        assert_eq!(path, temp.path().join("live-image.png"));
        assert_eq!(orchestrator.provider.image_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_generate_image_failure_falls_back_to_placeholder() {
        let temp = tempfile::tempdir().unwrap();
        let orchestrator = Orchestrator::with_provider(StubProvider::failing(timeout_error));
        let config = GenerationConfig::with_api_key("key", temp.path());

        let path = orchestrator
            .generate_image(&config, "a failing image")
            .await
            .unwrap();

        assert!(path.exists());
        assert_eq!(orchestrator.provider.image_calls.load(Ordering::SeqCst), 1);

        let decoded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(decoded.width(), CANVAS_WIDTH);
        assert_eq!(decoded.height(), CANVAS_HEIGHT);
    }

    #[tokio::test]
    async fn test_generate_image_distinct_files_per_call() {
        let temp = tempfile::tempdir().unwrap();
        let orchestrator = Orchestrator::with_provider(StubProvider::failing(timeout_error));
        let config = GenerationConfig::with_api_key("key", temp.path());

        let first = orchestrator.generate_image(&config, "p").await.unwrap();
        let second = orchestrator.generate_image(&config, "p").await.unwrap();
        assert_ne!(first, second);
        assert!(first.exists() && second.exists());
    }

    #[test]
    fn test_mock_text_format() {
        assert_eq!(mock_text("hello"), "[MOCK TEXT] hello");
    }

    #[test]
    fn test_fallback_text_format() {
        let err = timeout_error();
        let text = fallback_text("hello", &err);
        assert!(text.starts_with("[FALLBACK TEXT] hello (err: "));
        assert!(text.contains("504"));
    }

    #[test]
    fn test_fallback_image_text_truncates_long_prompts() {
        let err = timeout_error();
        let prompt = "q".repeat(500);
        let text = fallback_image_text(&prompt, &err);

        // First 200 characters of the prompt survive, and the reason is
        // still visible after them.
        assert!(text.starts_with(&"q".repeat(200)));
        assert!(!text.starts_with(&"q".repeat(201)));
        assert!(text.contains("(fallback: "));
        assert!(text.contains("upstream timeout"));
    }

    #[test]
    fn test_default_video_seconds() {
        assert_eq!(DEFAULT_VIDEO_SECONDS, 6);
    }
}
