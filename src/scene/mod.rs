//! Static stage description: cards, switches, layout constants and their JSON form.

pub mod color;
pub mod config;
pub mod font;
pub mod model;
