//! Generation configuration handling for mediagen.
//!
//! Configuration is read from environment variables at the moment of each
//! call and is never cached, so flipping `USE_MOCK_GENERATION` or rotating
//! `GEMINI_API_KEY` mid-session takes effect on the next request.

use std::path::{Path, PathBuf};

/// The environment variable that forces placeholder-only behavior.
pub const MOCK_ENV: &str = "USE_MOCK_GENERATION";

/// The environment variable name for the provider API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// The environment variable overriding the artifact output directory.
pub const OUTPUT_DIR_ENV: &str = "GENERATED_DIR";

/// Default artifact output directory when `GENERATED_DIR` is not set.
pub const DEFAULT_OUTPUT_DIR: &str = "generated";

/// Per-call configuration for the generation pipeline.
///
/// Constructed once per request, either from the environment via
/// [`GenerationConfig::from_env`] or explicitly by the caller (tests pass a
/// scratch directory and skip process-level environment mutation entirely).
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// When true, every call takes the placeholder path and the provider is
    /// never contacted.
    pub mock_enabled: bool,
    /// Provider API key. Absent or empty means live generation is
    /// unavailable.
    pub api_key: Option<String>,
    /// Directory that receives generated artifacts. Created on first use.
    pub output_dir: PathBuf,
}

impl GenerationConfig {
    /// Read configuration from the process environment.
    ///
    /// Mock mode is enabled when `USE_MOCK_GENERATION` equals `true`
    /// (case-insensitive). An empty `GEMINI_API_KEY` counts as absent.
    pub fn from_env() -> Self {
        let mock_enabled = std::env::var(MOCK_ENV)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.is_empty());

        let output_dir = std::env::var(OUTPUT_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUTPUT_DIR));

        Self {
            mock_enabled,
            api_key,
            output_dir,
        }
    }

    /// Build a mock-mode configuration writing into `output_dir`.
    pub fn mock(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            mock_enabled: true,
            api_key: None,
            output_dir: output_dir.into(),
        }
    }

    /// Build a live configuration with an explicit API key.
    pub fn with_api_key(api_key: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            mock_enabled: false,
            api_key: Some(api_key.into()),
            output_dir: output_dir.into(),
        }
    }

    /// The API key to use for a live provider call, if one should happen.
    ///
    /// Returns `None` when mock mode is enabled or no key is configured;
    /// both cases route the request straight to the placeholder tier.
    pub fn live_api_key(&self) -> Option<&str> {
        if self.mock_enabled {
            return None;
        }
        self.api_key.as_deref().filter(|k| !k.is_empty())
    }

    /// The artifact output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}
