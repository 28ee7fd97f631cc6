//! Rasterization of evaluated stages.

/// Backend trait, frame buffer type and backend factory.
pub mod backend;
/// CPU backend powered by `vello_cpu`.
pub mod cpu;
/// Label shaping with parley.
mod text;
