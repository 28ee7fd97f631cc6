//! Encoding sinks.
//!
//! Sinks consume rendered frames in timeline order and are fed by `StageSession::render_range`.

/// `ffmpeg`-based sink (MP4 output via system `ffmpeg`).
pub mod ffmpeg;
/// PNG image-sequence sink.
pub mod png;
/// Generic frame sink trait and the in-memory sink.
pub mod sink;

use crate::foundation::error::{StackError, StackResult};
use std::path::Path;

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> StackResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))
            .map_err(StackError::Other)?;
    }
    Ok(())
}
