//! General time utility functions
//!
//! The robot's clocks are free running `u32` tick counters (milliseconds or
//! microseconds) which wrap around. All interval arithmetic on them must go
//! through [`ticks_diff`] and [`ticks_add`].

/// Number of nanoseconds in a second
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Number of microseconds in a second
pub const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// Convert a duration into a number of seconds, or `None` if overflow
pub fn duration_to_seconds(duration: chrono::Duration) -> Option<f64> {
    duration
        .num_nanoseconds()
        .map(|ns| ns as f64 / NANOS_PER_SECOND as f64)
}

/// Signed number of ticks from `before` to `now`.
///
/// Correct across a wraparound of the counter as long as the true interval is
/// less than half the counter range.
pub fn ticks_diff(now: u32, before: u32) -> i32 {
    now.wrapping_sub(before) as i32
}

/// Offset a tick value by a signed number of ticks, wrapping around.
pub fn ticks_add(ticks: u32, delta: i32) -> u32 {
    ticks.wrapping_add(delta as u32)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
