use crate::animation::ease::Ease;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{StackError, StackResult};
use crate::geometry::{ContainerWidth, StackFactors};
use crate::scene::color::ColorDef;
use crate::scene::model::{Item, Toggles, default_items};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Screen layout constants, in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutDef {
    /// Top of the scroll area (space left for the navigation title).
    pub stage_top: f64,
    /// Height of the scroll area.
    pub stage_height: f64,
    /// Horizontal inset of a card inside its page.
    pub card_padding_x: f64,
    /// Vertical inset of the card row inside the scroll area.
    pub card_padding_y: f64,
    pub card_corner_radius: f64,
    /// Brightness added at the top of the card gradient.
    pub gradient_lighten: f64,
    /// Outer margin around the toggle panel.
    pub panel_margin: f64,
    /// Inner padding of the toggle panel.
    pub panel_padding: f64,
    pub panel_corner_radius: f64,
    pub row_height: f64,
    pub row_spacing: f64,
    pub indicator_thickness: f64,
    /// Leading inset of the navigation title.
    pub title_inset_x: f64,
    pub title_size: f64,
    /// Font size of the switch labels.
    pub label_size: f64,
}

impl Default for LayoutDef {
    fn default() -> Self {
        Self {
            stage_top: 96.0,
            stage_height: 410.0,
            card_padding_x: 65.0,
            card_padding_y: 15.0,
            card_corner_radius: 15.0,
            gradient_lighten: 0.25,
            panel_margin: 15.0,
            panel_padding: 15.0,
            panel_corner_radius: 10.0,
            row_height: 31.0,
            row_spacing: 10.0,
            indicator_thickness: 4.0,
            title_inset_x: 16.0,
            title_size: 34.0,
            label_size: 17.0,
        }
    }
}

/// Paging sweep parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollDef {
    /// Frames spent moving from one page to the next.
    pub frames_per_page: u64,
    /// Frames spent resting on a page before moving on.
    pub hold_frames: u64,
    pub ease: Ease,
}

impl Default for ScrollDef {
    fn default() -> Self {
        Self {
            frames_per_page: 18,
            hold_frames: 24,
            ease: Ease::Snappy,
        }
    }
}

/// A user interaction flipping the switches at a given frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToggleEvent {
    pub frame: u64,
    pub toggles: Toggles,
}

/// Everything needed to render the demo; the JSON-facing configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    pub canvas: Canvas,
    pub fps: Fps,
    /// Navigation title drawn above the cards.
    pub title: String,
    /// Font file for the title and switch labels. System fonts are used when unset.
    pub font: Option<PathBuf>,
    /// Timeline length in frames.
    pub duration: u64,
    pub background: ColorDef,
    pub items: Vec<Item>,
    /// Switch state at frame 0.
    pub toggles: Toggles,
    /// Replaces the toggle-derived factors. Rotation is still forced to 0 while the rotation
    /// switch is off.
    pub factors: Option<StackFactors>,
    pub layout: LayoutDef,
    pub scroll: ScrollDef,
    /// Switch changes, sorted by frame.
    pub toggle_events: Vec<ToggleEvent>,
    /// Frames over which factor changes from a rotation toggle are blended.
    pub toggle_transition_frames: u64,
    /// Frames the scroll indicator stays highlighted after its switch changes.
    pub indicator_flash_frames: u64,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas {
                width: 390,
                height: 844,
            },
            fps: Fps { num: 30, den: 1 },
            title: "Stack".to_owned(),
            font: None,
            duration: 300,
            background: ColorDef::rgba(0.949, 0.949, 0.969, 1.0),
            items: default_items(),
            toggles: Toggles::default(),
            factors: None,
            layout: LayoutDef::default(),
            scroll: ScrollDef::default(),
            toggle_events: Vec::new(),
            toggle_transition_frames: 9,
            indicator_flash_frames: 30,
        }
    }
}

impl StageConfig {
    /// Parse a configuration from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> StackResult<Self> {
        serde_json::from_reader(r).map_err(|e| StackError::serde(format!("parse stage JSON: {e}")))
    }

    /// Parse a configuration from a JSON string.
    pub fn from_json_str(s: &str) -> StackResult<Self> {
        serde_json::from_str(s).map_err(|e| StackError::serde(format!("parse stage JSON: {e}")))
    }

    /// Parse a configuration from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> StackResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            StackError::validation(format!("open stage JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Scroll container width; pages are exactly one container wide.
    pub fn container_width(&self) -> StackResult<ContainerWidth> {
        ContainerWidth::new(f64::from(self.canvas.width))
    }

    /// Factors in effect for a switch state, before any transition blending.
    pub fn factors_for(&self, toggles: Toggles) -> StackFactors {
        match self.factors {
            None => StackFactors::for_toggles(toggles),
            Some(f) if toggles.rotation_enabled => f,
            Some(f) => StackFactors {
                rotation_degrees: 0.0,
                ..f
            },
        }
    }

    pub fn validate(&self) -> StackResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(StackError::validation("canvas width/height must be > 0"));
        }
        self.canvas.raster_size()?;
        Fps::new(self.fps.num, self.fps.den)?;
        if self.duration == 0 {
            return Err(StackError::validation("duration must be > 0 frames"));
        }
        self.container_width()?;

        if self.items.is_empty() {
            return Err(StackError::validation("at least one item is required"));
        }
        let mut seen = BTreeSet::new();
        for item in &self.items {
            if !seen.insert(item.id) {
                return Err(StackError::validation(format!(
                    "duplicate item id {}",
                    item.id.0
                )));
            }
        }

        let l = &self.layout;
        let lengths = [
            ("stage_top", l.stage_top),
            ("stage_height", l.stage_height),
            ("card_padding_x", l.card_padding_x),
            ("card_padding_y", l.card_padding_y),
            ("card_corner_radius", l.card_corner_radius),
            ("gradient_lighten", l.gradient_lighten),
            ("panel_margin", l.panel_margin),
            ("panel_padding", l.panel_padding),
            ("panel_corner_radius", l.panel_corner_radius),
            ("row_height", l.row_height),
            ("row_spacing", l.row_spacing),
            ("indicator_thickness", l.indicator_thickness),
            ("title_inset_x", l.title_inset_x),
            ("title_size", l.title_size),
            ("label_size", l.label_size),
        ];
        for (name, v) in lengths {
            if !v.is_finite() || v < 0.0 {
                return Err(StackError::validation(format!(
                    "layout.{name} must be finite and >= 0"
                )));
            }
        }
        if 2.0 * l.card_padding_x >= f64::from(self.canvas.width) {
            return Err(StackError::validation(
                "layout.card_padding_x leaves no room for the card",
            ));
        }
        if 2.0 * l.card_padding_y >= l.stage_height {
            return Err(StackError::validation(
                "layout.card_padding_y leaves no room for the card",
            ));
        }

        if let Some(f) = self.factors {
            let all = [f.scale, f.rotation_degrees, f.offset, f.progress_limit];
            if all.iter().any(|v| !v.is_finite()) {
                return Err(StackError::validation("factors must be finite"));
            }
        }

        if self.scroll.frames_per_page == 0 {
            return Err(StackError::validation("scroll.frames_per_page must be > 0"));
        }
        if self
            .toggle_events
            .windows(2)
            .any(|w| w[0].frame > w[1].frame)
        {
            return Err(StackError::validation(
                "toggle_events must be sorted by frame",
            ));
        }
        Ok(())
    }

    /// Extra checks for MP4 output: yuv420p needs an even canvas.
    pub fn validate_for_video(&self) -> StackResult<()> {
        self.validate()?;
        if !self.canvas.is_even() {
            return Err(StackError::validation(format!(
                "canvas {}x{} must have even sides for MP4 output",
                self.canvas.width, self.canvas.height
            )));
        }
        Ok(())
    }
}
