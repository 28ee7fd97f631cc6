use crate::animation::ease::Ease;
use crate::geometry::StackFactors;
use crate::scene::config::StageConfig;
use crate::scene::model::Toggles;

/// Switch state and the (possibly mid-transition) factors in effect at one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToggleState {
    pub toggles: Toggles,
    pub factors: StackFactors,
    /// Indicator highlight in `[0, 1]`: 1 on the frame the indicator switch turns on, fading
    /// to 0 over `indicator_flash_frames`.
    pub indicator_flash: f64,
}

/// Resolve the switches at `frame` by replaying `cfg.toggle_events`.
///
/// Indicator visibility flips immediately. Factor changes blend with [`Ease::Snappy`] over
/// `toggle_transition_frames`, starting from whatever was on screen when the switch moved.
/// Turning the indicators on starts a flash window.
pub fn toggle_state_at(cfg: &StageConfig, frame: u64) -> ToggleState {
    let mut toggles = cfg.toggles;
    let mut from = cfg.factors_for(toggles);
    let mut to = from;
    let mut start = 0u64;
    let mut flash_start = None;

    for ev in cfg.toggle_events.iter().take_while(|ev| ev.frame <= frame) {
        let target = cfg.factors_for(ev.toggles);
        if target != to {
            from = blend(from, to, start, ev.frame, cfg.toggle_transition_frames);
            to = target;
            start = ev.frame;
        }
        if ev.toggles.show_indicators && !toggles.show_indicators {
            flash_start = Some(ev.frame);
        }
        toggles = ev.toggles;
    }

    let indicator_flash = match flash_start {
        Some(at) if toggles.show_indicators => {
            flash_level(frame.saturating_sub(at), cfg.indicator_flash_frames)
        }
        _ => 0.0,
    };

    ToggleState {
        toggles,
        factors: blend(from, to, start, frame, cfg.toggle_transition_frames),
        indicator_flash,
    }
}

fn flash_level(elapsed: u64, frames: u64) -> f64 {
    if elapsed >= frames {
        return 0.0;
    }
    1.0 - elapsed as f64 / frames as f64
}

fn blend(from: StackFactors, to: StackFactors, start: u64, now: u64, frames: u64) -> StackFactors {
    if frames == 0 {
        return to;
    }
    let t = now.saturating_sub(start) as f64 / frames as f64;
    StackFactors::lerp(from, to, Ease::Snappy.apply(t))
}
