//! Per-frame evaluation: scroll offset, switch state, card frames and their corrections.

pub mod evaluator;
pub mod layout;
pub mod scroll;
pub mod toggles;
