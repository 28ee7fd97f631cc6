use crate::animation::ease::Ease;
use crate::foundation::math::lerp;
use crate::geometry::ContainerWidth;
use crate::scene::config::ScrollDef;

/// Release velocity (px/s) above which a drag flings to the neighboring page.
pub const FLING_VELOCITY: f64 = 300.0;

/// Paged horizontal scrolling that sweeps to the last page and back.
///
/// Each leg rests on its start page for `hold_frames`, then eases to the neighbor over
/// `frames_per_page`. The offset is a pure function of the frame index.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PagingScroll {
    page_width: f64,
    pages: u64,
    frames_per_page: u64,
    hold_frames: u64,
    ease: Ease,
}

impl PagingScroll {
    pub fn new(page_width: ContainerWidth, pages: usize, def: &ScrollDef) -> Self {
        Self {
            page_width: page_width.get(),
            pages: pages as u64,
            frames_per_page: def.frames_per_page.max(1),
            hold_frames: def.hold_frames,
            ease: def.ease,
        }
    }

    pub fn max_offset(&self) -> f64 {
        self.pages.saturating_sub(1) as f64 * self.page_width
    }

    /// Frames for one full there-and-back sweep (`0` when there is nothing to scroll).
    pub fn cycle_frames(&self) -> u64 {
        if self.pages < 2 {
            return 0;
        }
        2 * (self.pages - 1) * (self.hold_frames + self.frames_per_page)
    }

    pub fn offset_at(&self, frame: u64) -> f64 {
        if self.pages < 2 {
            return 0.0;
        }
        let leg_len = self.hold_frames + self.frames_per_page;
        let last = self.pages - 1;
        let leg = (frame / leg_len) % (2 * last);
        let local = frame % leg_len;

        let (from, to) = if leg < last {
            (leg, leg + 1)
        } else {
            let back = leg - last;
            (last - back, last - back - 1)
        };

        let t = if local < self.hold_frames {
            0.0
        } else {
            (local - self.hold_frames) as f64 / self.frames_per_page as f64
        };
        lerp(from as f64, to as f64, self.ease.apply(t)) * self.page_width
    }
}

/// Page a free scroll offset settles on once released with `velocity` (px/s).
pub fn snap_to_page(offset: f64, velocity: f64, page_width: ContainerWidth, pages: usize) -> usize {
    if pages == 0 {
        return 0;
    }
    let pos = offset / page_width.get();
    let target = if velocity >= FLING_VELOCITY {
        pos.floor() + 1.0
    } else if velocity <= -FLING_VELOCITY {
        pos.ceil() - 1.0
    } else {
        pos.round()
    };
    let last = (pages - 1) as f64;
    target.clamp(0.0, last) as usize
}

#[cfg(test)]
#[path = "../../tests/unit/eval/scroll.rs"]
mod tests;
