use crate::eval::layout::{StageLayout, SwitchGeom};
use crate::eval::scroll::{PagingScroll, snap_to_page};
use crate::eval::toggles::{ToggleState, toggle_state_at};
use crate::foundation::core::{Affine, Rect, Rgba8Premul, RoundedRect};
use crate::foundation::error::StackResult;
use crate::geometry::{CardCorrections, CardFrame, compute_corrections};
use crate::scene::config::StageConfig;
use crate::scene::font::FontBytes;
use crate::scene::model::{ItemId, z_index};

const TEXT_RGBA: [u8; 4] = [0, 0, 0, 255];

/// One card, resolved for drawing.
#[derive(Clone, Debug, PartialEq)]
pub struct EvaluatedCard {
    pub item: ItemId,
    pub z_index: u32,
    /// Page frame in container space, as fed to the geometry calculator.
    pub frame: CardFrame,
    /// Untransformed page rectangle in canvas space.
    pub page_rect: Rect,
    /// Untransformed card shape in canvas space.
    pub shape: RoundedRect,
    pub corrections: CardCorrections,
    /// Canvas transform to apply to `shape`.
    pub transform: Affine,
    /// Gradient top color.
    pub top: Rgba8Premul,
    /// Gradient bottom color.
    pub bottom: Rgba8Premul,
}

/// A single line of text, vertically centered on `center_y`.
#[derive(Clone, Debug, PartialEq)]
pub struct TextLabel {
    pub text: String,
    /// Left edge in canvas pixels.
    pub x: f64,
    pub center_y: f64,
    pub size: f64,
    /// Straight-alpha RGBA8.
    pub color: [u8; 4],
}

/// Everything the renderer needs for one frame. Cards are ordered bottom to top.
#[derive(Clone, Debug, PartialEq)]
pub struct EvaluatedStage {
    pub scroll_x: f64,
    /// Straight-alpha RGBA8.
    pub background: [u8; 4],
    pub cards: Vec<EvaluatedCard>,
    pub indicator: Option<RoundedRect>,
    /// Indicator highlight in `[0, 1]` after the indicator switch turns on.
    pub indicator_flash: f64,
    pub panel: RoundedRect,
    pub switches: [SwitchGeom; 2],
    /// Navigation title and switch labels.
    pub texts: Vec<TextLabel>,
    /// Font for `texts`; `None` when no font could be loaded and text is skipped.
    pub font: Option<FontBytes>,
}

/// Front-loaded, validated stage; evaluates frames as pure functions of the frame index.
#[derive(Clone, Debug)]
pub struct Evaluator {
    cfg: StageConfig,
    layout: StageLayout,
    scroll: PagingScroll,
    font: Option<FontBytes>,
}

impl Evaluator {
    /// Validate `cfg` and load its font.
    ///
    /// A configured font that cannot be read is an error. Without one, the first installed
    /// fallback font is used, and text is skipped when none is found.
    pub fn new(cfg: StageConfig) -> StackResult<Self> {
        let font = match &cfg.font {
            Some(path) => Some(FontBytes::load(path)?),
            None => match FontBytes::fallback() {
                Some((path, font)) => {
                    tracing::debug!(font = %path.display(), "using fallback font");
                    Some(font)
                }
                None => {
                    tracing::warn!("no font configured or installed; title and labels are skipped");
                    None
                }
            },
        };
        Self::with_font(cfg, font)
    }

    /// Same as [`Evaluator::new`] but with an already loaded font (or none).
    pub fn with_font(cfg: StageConfig, font: Option<FontBytes>) -> StackResult<Self> {
        cfg.validate()?;
        let width = cfg.container_width()?;
        let layout = StageLayout::new(cfg.canvas, cfg.layout, width, cfg.items.len());
        let scroll = PagingScroll::new(width, cfg.items.len(), &cfg.scroll);
        Ok(Self {
            cfg,
            layout,
            scroll,
            font,
        })
    }

    pub fn config(&self) -> &StageConfig {
        &self.cfg
    }

    pub fn layout(&self) -> &StageLayout {
        &self.layout
    }

    pub fn scroll(&self) -> &PagingScroll {
        &self.scroll
    }

    pub fn toggle_state(&self, frame: u64) -> ToggleState {
        toggle_state_at(&self.cfg, frame)
    }

    /// Evaluate a frame of the timeline.
    pub fn eval_frame(&self, frame: u64) -> EvaluatedStage {
        self.eval_at(self.scroll.offset_at(frame), self.toggle_state(frame))
    }

    /// Evaluate the stage at an arbitrary scroll offset.
    pub fn eval_at(&self, scroll_x: f64, state: ToggleState) -> EvaluatedStage {
        let width = self.layout.container_width();
        let items = &self.cfg.items;
        let lighten = self.cfg.layout.gradient_lighten;

        let mut cards: Vec<EvaluatedCard> = self
            .layout
            .visible_pages(scroll_x, state.factors.progress_limit)
            .into_iter()
            .filter_map(|index| {
                let item = items.get(index)?;
                let z = z_index(items, item.id)?;
                let frame = self.layout.page_frame(index, scroll_x);
                let page_rect = self.layout.page_rect(frame);
                let corrections = compute_corrections(frame, width, &state.factors);
                Some(EvaluatedCard {
                    item: item.id,
                    z_index: z,
                    frame,
                    page_rect,
                    shape: self.layout.card_shape(page_rect),
                    corrections,
                    transform: corrections.transform(page_rect),
                    top: item.color.lighten(lighten).to_rgba8_premul(),
                    bottom: item.color.to_rgba8_premul(),
                })
            })
            .collect();
        cards.sort_by_key(|c| c.z_index);
        let switches = [
            self.layout.switch(0, state.toggles.rotation_enabled),
            self.layout.switch(1, state.toggles.show_indicators),
        ];

        EvaluatedStage {
            scroll_x,
            background: self.cfg.background.to_rgba8(),
            cards,
            indicator: state
                .toggles
                .show_indicators
                .then(|| self.layout.indicator(scroll_x)),
            indicator_flash: state.indicator_flash,
            panel: self.layout.panel(),
            switches,
            texts: self.texts(&switches, state),
            font: self.font.clone(),
        }
    }

    fn texts(&self, switches: &[SwitchGeom; 2], state: ToggleState) -> Vec<TextLabel> {
        let l = &self.cfg.layout;
        let mut out = Vec::with_capacity(3);
        if !self.cfg.title.is_empty() {
            out.push(TextLabel {
                text: self.cfg.title.clone(),
                x: l.title_inset_x,
                center_y: (l.stage_top - l.title_size * 0.75).max(l.title_size / 2.0),
                size: l.title_size,
                color: TEXT_RGBA,
            });
        }
        for ((label, _), switch) in state.toggles.rows().into_iter().zip(switches) {
            out.push(TextLabel {
                text: label.to_owned(),
                x: switch.row.x0,
                center_y: switch.row.center().y,
                size: l.label_size,
                color: TEXT_RGBA,
            });
        }
        out
    }

    /// Page the paging behavior settles on for a released drag.
    pub fn snapped_page(&self, scroll_x: f64, velocity: f64) -> usize {
        snap_to_page(
            scroll_x,
            velocity,
            self.layout.container_width(),
            self.layout.pages(),
        )
    }
}
