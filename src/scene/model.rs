use crate::scene::color::ColorDef;
use serde::{Deserialize, Serialize};

/// Stable identifier of a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u32);

/// One card of the stack.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub color: ColorDef,
}

/// The two user-facing switches of the demo.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Toggles {
    pub rotation_enabled: bool,
    pub show_indicators: bool,
}

impl Default for Toggles {
    fn default() -> Self {
        Self {
            rotation_enabled: true,
            show_indicators: false,
        }
    }
}

impl Toggles {
    pub const ROTATION_LABEL: &'static str = "Rotation Enabled";
    pub const INDICATORS_LABEL: &'static str = "Show scroll Indicators";

    /// `(label, is_on)` rows in panel order.
    pub fn rows(self) -> [(&'static str, bool); 2] {
        [
            (Self::ROTATION_LABEL, self.rotation_enabled),
            (Self::INDICATORS_LABEL, self.show_indicators),
        ]
    }
}

const DEFAULT_PALETTE: [&str; 6] = ["red", "blue", "green", "yellow", "pink", "purple"];

/// The fixed card list shown by the demo.
pub fn default_items() -> Vec<Item> {
    DEFAULT_PALETTE
        .iter()
        .zip(0u32..)
        .filter_map(|(name, id)| {
            ColorDef::parse(name).ok().map(|color| Item {
                id: ItemId(id),
                color,
            })
        })
        .collect()
}

/// Stacking order of `id`: the first card is on top (`count - index`).
///
/// Returns `None` when `id` is not part of `items`.
pub fn z_index(items: &[Item], id: ItemId) -> Option<u32> {
    let index = items.iter().position(|item| item.id == id)?;
    u32::try_from(items.len() - index).ok()
}
