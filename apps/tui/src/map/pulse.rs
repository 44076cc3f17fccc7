//! Expanding ring drawn around the city centre. Purely cosmetic.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationMode {
    Running,
    Paused,
}

pub const PULSE_MIN_RADIUS_M: f64 = 500.0;
pub const PULSE_MAX_RADIUS_M: f64 = 3000.0;
/// 100 m every 200 ms.
const PULSE_SPEED_M_PER_SEC: f64 = 500.0;
const PULSE_MAX_FRAME_DELTA: f64 = 0.25;

/// Grows the ring by the time elapsed since `last_tick`, wrapping back to the
/// minimum radius once it passes the maximum. Returns the new radius and tick.
pub fn advance_pulse_radius(
    radius: f64,
    last_tick: Option<f64>,
    now_seconds: f64,
    mode: AnimationMode,
) -> (f64, Option<f64>) {
    let delta = last_tick
        .map(|last| (now_seconds - last).max(0.0).min(PULSE_MAX_FRAME_DELTA))
        .unwrap_or(0.0);

    let span = PULSE_MAX_RADIUS_M - PULSE_MIN_RADIUS_M;
    let offset = (radius - PULSE_MIN_RADIUS_M).clamp(0.0, span);
    let next_offset = match mode {
        AnimationMode::Running => (offset + delta * PULSE_SPEED_M_PER_SEC).rem_euclid(span),
        AnimationMode::Paused => offset,
    };

    (PULSE_MIN_RADIUS_M + next_offset, Some(now_seconds))
}
