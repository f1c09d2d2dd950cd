//! Artifact naming and output directory handling.
//!
//! Every generated file gets a collision-resistant random name so concurrent
//! callers can share one output directory without coordination, and a
//! written artifact is never rewritten by a later call.

use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Create the artifact output directory if it does not exist.
///
/// Idempotent; an already existing directory is not an error.
pub fn ensure_output_dir(dir: &Path) -> io::Result<()> {
    std::fs::create_dir_all(dir)
}

/// Build a unique artifact path `<random-hex>.<ext>` inside `dir`.
///
/// The name is a v4 UUID rendered as 32 hex characters, so the collision
/// probability between concurrent callers is negligible by construction.
pub fn unique_artifact_path(dir: &Path, ext: &str) -> PathBuf {
    let ext = ext.trim_start_matches('.');
    dir.join(format!("{}.{}", Uuid::new_v4().simple(), ext))
}
