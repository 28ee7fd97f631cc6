use crate::foundation::error::{StackError, StackResult};
use crate::foundation::math::mul_div255_u16;

pub use kurbo::{Affine, Point, Rect, RoundedRect, Vec2};

/// 0-based frame of the demo timeline.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

impl FrameIndex {
    /// Timestamp of this frame at `fps`.
    pub fn seconds(self, fps: Fps) -> f64 {
        self.0 as f64 * f64::from(fps.den) / f64::from(fps.num)
    }
}

/// Frames `[start, end)` of a render.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    pub start: FrameIndex,
    /// Exclusive.
    pub end: FrameIndex,
}

impl FrameRange {
    pub fn new(start: FrameIndex, end: FrameIndex) -> StackResult<Self> {
        if start.0 > end.0 {
            return Err(StackError::validation(format!(
                "frame range {}..{} is inverted",
                start.0, end.0
            )));
        }
        Ok(Self { start, end })
    }

    /// The first `end` frames of a `duration`-frame timeline (all of it when `end` is `None`).
    pub fn leading(duration: u64, end: Option<u64>) -> Self {
        Self {
            start: FrameIndex(0),
            end: FrameIndex(end.map_or(duration, |e| e.min(duration))),
        }
    }

    pub fn len_frames(self) -> u64 {
        self.end.0.saturating_sub(self.start.0)
    }

    pub fn is_empty(self) -> bool {
        self.start.0 >= self.end.0
    }
}

/// Timeline rate as `num/den` frames per second.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32,
}

impl Fps {
    pub fn new(num: u32, den: u32) -> StackResult<Self> {
        if num == 0 || den == 0 {
            return Err(StackError::validation(format!(
                "fps {num}/{den} must have non-zero parts"
            )));
        }
        Ok(Self { num, den })
    }
}

/// Output size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    /// Bytes of one tightly packed RGBA8 frame.
    pub fn rgba_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }

    /// Both sides even, as yuv420p video needs.
    pub fn is_even(self) -> bool {
        self.width.is_multiple_of(2) && self.height.is_multiple_of(2)
    }

    /// Raster size for `vello_cpu`, which addresses pixels with `u16`.
    pub fn raster_size(self) -> StackResult<(u16, u16)> {
        match (u16::try_from(self.width), u16::try_from(self.height)) {
            (Ok(w), Ok(h)) => Ok((w, h)),
            _ => Err(StackError::validation(format!(
                "canvas {}x{} exceeds the raster limit of {}",
                self.width,
                self.height,
                u16::MAX
            ))),
        }
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8Premul {
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        let premul = |c: u8| mul_div255_u16(u16::from(c), u16::from(a)) as u8;
        Self {
            r: premul(r),
            g: premul(g),
            b: premul(b),
            a,
        }
    }

    /// Channel-wise blend towards `other`; `t` is clamped to `[0, 1]`.
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| {
            let (a, b) = (f32::from(a), f32::from(b));
            (a + (b - a) * t).round() as u8
        };
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }

    pub(crate) fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
