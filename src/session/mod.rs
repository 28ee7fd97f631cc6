//! Session-oriented rendering: front-load a stage once, then render frames, ranges and probes.

pub mod stage_session;
