//! Stack geometry.
//!
//! Maps a card's horizontal frame inside the scroll container to the corrections that produce the
//! stacked look: cards to the right of the current page are pinned to the leading edge, shrunk
//! towards their trailing edge, tilted and nudged right so that they peek out from behind the
//! current card.
//!
//! Every function here is pure. Coordinates are in container space: `min_x`/`max_x` are the
//! leading/trailing edges of the card's frame relative to the scroll viewport.

use crate::foundation::core::{Affine, Point, Rect, Vec2};
use crate::foundation::error::{StackError, StackResult};
use crate::foundation::math::lerp;
use crate::scene::model::Toggles;

/// Upper bound applied to [`progress`].
pub const DEFAULT_PROGRESS_LIMIT: f64 = 2.0;
/// Scale lost per unit of progress.
pub const DEFAULT_SCALE_FACTOR: f64 = 0.1;
/// Degrees of rotation per unit of progress when rotation is enabled.
pub const DEFAULT_ROTATION_DEGREES: f64 = 5.0;
/// Excess horizontal offset per unit of progress when rotation is disabled.
pub const DEFAULT_OFFSET: f64 = 10.0;
/// Excess horizontal offset per unit of progress when rotation is enabled.
pub const ROTATING_OFFSET: f64 = 8.0;

/// Horizontal extent of a card's frame relative to the scroll container.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CardFrame {
    /// Leading edge.
    pub min_x: f64,
    /// Trailing edge.
    pub max_x: f64,
}

impl CardFrame {
    pub fn new(min_x: f64, max_x: f64) -> Self {
        Self { min_x, max_x }
    }

    /// Horizontal extent of `rect`, which must already be in container coordinates.
    pub fn from_rect(rect: Rect) -> Self {
        Self {
            min_x: rect.x0,
            max_x: rect.x1,
        }
    }

    pub fn width(self) -> f64 {
        self.max_x - self.min_x
    }
}

/// Width of the scroll container. Always finite and strictly positive.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, serde::Serialize)]
pub struct ContainerWidth(f64);

impl ContainerWidth {
    /// Validate a container width.
    ///
    /// A zero or unknown width would turn [`progress`] into `inf`/`NaN`, so it is rejected here
    /// instead of producing a degenerate transform.
    pub fn new(width: f64) -> StackResult<Self> {
        if !width.is_finite() || width <= 0.0 {
            return Err(StackError::geometry(format!(
                "container width must be finite and > 0, got {width}"
            )));
        }
        Ok(Self(width))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

/// Normalized scroll progress: `0` when the card fills the viewport, `+1` per page it sits to the
/// right of it, negative once it starts leaving on the leading side. Capped at `limit`.
pub fn progress(frame: CardFrame, width: ContainerWidth, limit: f64) -> f64 {
    let progress = (frame.max_x / width.get()) - 1.0;
    progress.min(limit)
}

/// Offset that pins a card to the leading edge until it starts scrolling out.
pub fn leading_offset(min_x: f64) -> f64 {
    if min_x < 0.0 { 0.0 } else { -min_x }
}

pub fn scale(progress: f64, factor: f64) -> f64 {
    1.0 - (progress * factor)
}

pub fn rotation_degrees(progress: f64, factor: f64) -> f64 {
    progress * factor
}

/// Extra nudge layered on top of [`leading_offset`]; this is what fans the stack out.
pub fn excess_offset(progress: f64, factor: f64) -> f64 {
    progress * factor
}

/// Per-unit-of-progress factors driving [`compute_corrections`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StackFactors {
    pub scale: f64,
    pub rotation_degrees: f64,
    pub offset: f64,
    pub progress_limit: f64,
}

impl Default for StackFactors {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE_FACTOR,
            rotation_degrees: DEFAULT_ROTATION_DEGREES,
            offset: DEFAULT_OFFSET,
            progress_limit: DEFAULT_PROGRESS_LIMIT,
        }
    }
}

impl StackFactors {
    /// Factors selected by the UI toggles.
    ///
    /// The excess offset is coupled to the rotation toggle: 8 with rotation, 10 without.
    pub fn for_toggles(toggles: Toggles) -> Self {
        if toggles.rotation_enabled {
            Self {
                rotation_degrees: DEFAULT_ROTATION_DEGREES,
                offset: ROTATING_OFFSET,
                ..Self::default()
            }
        } else {
            Self {
                rotation_degrees: 0.0,
                offset: DEFAULT_OFFSET,
                ..Self::default()
            }
        }
    }

    /// Blend two factor sets; endpoints are returned exactly outside `(0, 1)`.
    pub fn lerp(a: Self, b: Self, t: f64) -> Self {
        if t <= 0.0 {
            return a;
        }
        if t >= 1.0 {
            return b;
        }
        Self {
            scale: lerp(a.scale, b.scale, t),
            rotation_degrees: lerp(a.rotation_degrees, b.rotation_degrees, t),
            offset: lerp(a.offset, b.offset, t),
            progress_limit: lerp(a.progress_limit, b.progress_limit, t),
        }
    }
}

/// Presentation corrections for one card.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct CardCorrections {
    /// Capped progress the corrections were derived from.
    pub progress: f64,
    pub leading_offset: f64,
    pub excess_offset: f64,
    pub scale: f64,
    pub rotation_degrees: f64,
}

impl CardCorrections {
    /// No-op corrections (a card exactly filling the viewport).
    pub const IDENTITY: Self = Self {
        progress: 0.0,
        leading_offset: 0.0,
        excess_offset: 0.0,
        scale: 1.0,
        rotation_degrees: 0.0,
    };

    /// Compose the corrections into a transform for content laid out in `frame_rect`.
    ///
    /// Order: scale anchored at the trailing edge, rotation about the frame center, then the
    /// leading-edge and excess translations.
    pub fn transform(&self, frame_rect: Rect) -> Affine {
        let trailing = Point::new(frame_rect.x1, frame_rect.center().y);
        let center = frame_rect.center();

        let scale = about(trailing, Affine::scale(self.scale));
        let rotate = about(center, Affine::rotate(self.rotation_degrees.to_radians()));
        let leading = Affine::translate(Vec2::new(self.leading_offset, 0.0));
        let excess = Affine::translate(Vec2::new(self.excess_offset, 0.0));

        excess * leading * rotate * scale
    }
}

fn about(anchor: Point, a: Affine) -> Affine {
    let v = anchor.to_vec2();
    Affine::translate(v) * a * Affine::translate(-v)
}

/// Derive all corrections for one card frame.
pub fn compute_corrections(
    frame: CardFrame,
    width: ContainerWidth,
    factors: &StackFactors,
) -> CardCorrections {
    let p = progress(frame, width, factors.progress_limit);
    CardCorrections {
        progress: p,
        leading_offset: leading_offset(frame.min_x),
        excess_offset: excess_offset(p, factors.offset),
        scale: scale(p, factors.scale),
        rotation_degrees: rotation_degrees(p, factors.rotation_degrees),
    }
}

#[cfg(test)]
#[path = "../tests/unit/geometry.rs"]
mod tests;
