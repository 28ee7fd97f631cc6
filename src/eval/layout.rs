use crate::foundation::core::{Canvas, Point, Rect, RoundedRect};
use crate::geometry::{CardFrame, ContainerWidth};
use crate::scene::config::LayoutDef;

/// Width of a switch track.
const SWITCH_TRACK_WIDTH: f64 = 51.0;
/// Gap between a switch knob and its track.
const SWITCH_KNOB_INSET: f64 = 2.0;
/// Gap between the scroll indicator and the bottom/sides of the scroll area.
const INDICATOR_INSET: f64 = 6.0;

/// Geometry of one switch row in the toggle panel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwitchGeom {
    pub row: Rect,
    pub track: RoundedRect,
    pub knob_center: Point,
    pub knob_radius: f64,
    pub on: bool,
}

/// Pixel layout of the single screen: a paged scroll area on top, the toggle panel below.
///
/// The scroll container spans the full canvas width, so container x and canvas x coincide.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StageLayout {
    canvas: Canvas,
    layout: LayoutDef,
    width: ContainerWidth,
    pages: usize,
}

impl StageLayout {
    pub fn new(canvas: Canvas, layout: LayoutDef, width: ContainerWidth, pages: usize) -> Self {
        Self {
            canvas,
            layout,
            width,
            pages,
        }
    }

    pub fn container_width(&self) -> ContainerWidth {
        self.width
    }

    pub fn pages(&self) -> usize {
        self.pages
    }

    /// The scroll viewport in canvas coordinates.
    pub fn stage_rect(&self) -> Rect {
        Rect::new(
            0.0,
            self.layout.stage_top,
            f64::from(self.canvas.width),
            self.layout.stage_top + self.layout.stage_height,
        )
    }

    pub fn content_width(&self) -> f64 {
        self.pages as f64 * self.width.get()
    }

    pub fn max_scroll(&self) -> f64 {
        (self.content_width() - self.width.get()).max(0.0)
    }

    /// Frame of page `index` relative to the scroll container.
    pub fn page_frame(&self, index: usize, scroll_x: f64) -> CardFrame {
        let w = self.width.get();
        let min_x = index as f64 * w - scroll_x;
        CardFrame::new(min_x, min_x + w)
    }

    /// Page frame as a canvas rectangle, before any stack corrections.
    pub fn page_rect(&self, frame: CardFrame) -> Rect {
        let stage = self.stage_rect();
        Rect::new(frame.min_x, stage.y0, frame.max_x, stage.y1)
    }

    /// The rounded card drawn inside a page.
    pub fn card_shape(&self, page_rect: Rect) -> RoundedRect {
        let l = &self.layout;
        Rect::new(
            page_rect.x0 + l.card_padding_x,
            page_rect.y0 + l.card_padding_y,
            page_rect.x1 - l.card_padding_x,
            page_rect.y1 - l.card_padding_y,
        )
        .to_rounded_rect(l.card_corner_radius)
    }

    /// Pages worth drawing at `scroll_x`, in index order.
    ///
    /// Pages fully scrolled out on the leading side are skipped. Past the progress cap every page
    /// shares one transform, so only the first capped page is kept; it covers the rest.
    pub fn visible_pages(&self, scroll_x: f64, progress_limit: f64) -> Vec<usize> {
        let w = self.width.get();
        let mut out = Vec::new();
        for index in 0..self.pages {
            let frame = self.page_frame(index, scroll_x);
            if frame.max_x <= 0.0 {
                continue;
            }
            out.push(index);
            if frame.max_x / w - 1.0 > progress_limit {
                break;
            }
        }
        out
    }

    /// Scroll indicator capsule, proportional to the visible share of the content.
    pub fn indicator(&self, scroll_x: f64) -> RoundedRect {
        let stage = self.stage_rect();
        let track = stage.width() - 2.0 * INDICATOR_INSET;
        let content = self.content_width().max(self.width.get());
        let length = (track * self.width.get() / content).max(self.layout.indicator_thickness);
        let travel = track - length;
        let t = if self.max_scroll() > 0.0 {
            (scroll_x / self.max_scroll()).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let x0 = stage.x0 + INDICATOR_INSET + travel * t;
        let y1 = stage.y1 - INDICATOR_INSET;
        let thickness = self.layout.indicator_thickness;
        Rect::new(x0, y1 - thickness, x0 + length, y1).to_rounded_rect(thickness / 2.0)
    }

    /// Background of the toggle panel.
    pub fn panel(&self) -> RoundedRect {
        let l = &self.layout;
        let x0 = l.panel_margin;
        let x1 = f64::from(self.canvas.width) - l.panel_margin;
        let y0 = self.stage_rect().y1 + l.panel_margin;
        let height = 2.0 * l.panel_padding + 2.0 * l.row_height + l.row_spacing;
        Rect::new(x0, y0, x1.max(x0), y0 + height).to_rounded_rect(l.panel_corner_radius)
    }

    /// Switch geometry for panel row `row` (0 = rotation, 1 = indicators).
    pub fn switch(&self, row: usize, on: bool) -> SwitchGeom {
        let l = &self.layout;
        let panel = self.panel().rect();
        let y0 = panel.y0 + l.panel_padding + row as f64 * (l.row_height + l.row_spacing);
        let row_rect = Rect::new(
            panel.x0 + l.panel_padding,
            y0,
            panel.x1 - l.panel_padding,
            y0 + l.row_height,
        );
        let track = Rect::new(
            row_rect.x1 - SWITCH_TRACK_WIDTH,
            row_rect.y0,
            row_rect.x1,
            row_rect.y1,
        );
        let knob_radius = (l.row_height / 2.0 - SWITCH_KNOB_INSET).max(0.0);
        let knob_x = if on {
            track.x1 - SWITCH_KNOB_INSET - knob_radius
        } else {
            track.x0 + SWITCH_KNOB_INSET + knob_radius
        };
        SwitchGeom {
            row: row_rect,
            track: track.to_rounded_rect(l.row_height / 2.0),
            knob_center: Point::new(knob_x, track.center().y),
            knob_radius,
            on,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/eval/layout.rs"]
mod tests;
