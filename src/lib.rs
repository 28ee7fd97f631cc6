//! Stacked-cards is a deterministic renderer for a horizontally paged card stack.
//!
//! Cards to the right of the current page are pinned to the leading edge, shrunk, tilted and
//! nudged so that they peek out from behind the front card. The public API is session-oriented:
//!
//! - Load and validate a [`StageConfig`]
//! - Create a [`StageSession`]
//! - Render single frames, probe per-card geometry, or stream a range into a [`FrameSink`]
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod animation;
/// Encoding sinks.
pub mod encode;
/// Frame evaluation: scroll paging, layout and toggle transitions.
pub mod eval;
pub mod geometry;
/// Rendering backend(s).
pub mod render;
/// Boundary scene model and JSON configuration.
pub mod scene;
/// Session-oriented rendering API.
pub mod session;

pub use crate::animation::ease::Ease;
pub use crate::foundation::core::{
    Affine, Canvas, Fps, FrameIndex, FrameRange, Point, Rect, Rgba8Premul, RoundedRect, Vec2,
};
pub use crate::foundation::error::{StackError, StackResult};

pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::png::{PngSequenceSink, write_png};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::geometry::{
    CardCorrections, CardFrame, ContainerWidth, StackFactors, compute_corrections,
};
pub use crate::render::backend::{BackendKind, FrameRGBA, RenderBackend, create_backend};
pub use crate::scene::color::ColorDef;
pub use crate::eval::evaluator::{EvaluatedStage, Evaluator, TextLabel};
pub use crate::scene::config::{LayoutDef, ScrollDef, StageConfig, ToggleEvent};
pub use crate::scene::font::FontBytes;
pub use crate::scene::model::{Item, ItemId, Toggles};
pub use crate::session::stage_session::{
    CardProbe, RenderStats, StageProbe, StageSession, StageSessionOpts,
};
