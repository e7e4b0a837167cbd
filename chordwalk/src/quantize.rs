// Time quantization onto a uniform tick grid.
//
// Rounding is round-half-to-even on `t / tick` (`f64::round_ties_even`), so a
// time exactly halfway between two grid points lands on the even index.
// Quantized times travel through the rest of the crate as integer grid
// indices; seconds are only recovered when notes are written back out.
// Indices are capped at 2^53, the largest range in which every index is an
// exact `f64`, which keeps grid sums far from `u64` overflow.

use crate::error::{Error, Result};

/// Largest grid index a time may quantize to.
pub const MAX_GRID_INDEX: u64 = 1 << 53;

/// Reject ticks that cannot define a grid.
pub fn check_tick(tick: f64) -> Result<()> {
    if !tick.is_finite() || tick <= 0.0 {
        return Err(Error::invalid(format!("tick {tick} must be a positive number")));
    }
    Ok(())
}

/// Round `t` to the nearest multiple of `tick`.
pub fn round_to_tick(t: f64, tick: f64) -> Result<f64> {
    check_tick(tick)?;
    Ok(grid_seconds(to_grid(t, tick)?, tick))
}

/// Grid index nearest to `t`. Callers validate `tick > 0`; negative times
/// clamp to index 0. Fails when the index would exceed [`MAX_GRID_INDEX`].
pub(crate) fn to_grid(t: f64, tick: f64) -> Result<u64> {
    let index = (t / tick).round_ties_even();
    if index.is_nan() || index > MAX_GRID_INDEX as f64 {
        return Err(Error::invalid(format!(
            "time {t} does not fit a grid of {tick} s ticks"
        )));
    }
    Ok(index.max(0.0) as u64)
}

/// Seconds at grid index `index`.
pub(crate) fn grid_seconds(index: u64, tick: f64) -> f64 {
    index as f64 * tick
}
