//! Golden section search for the minimum of a unimodal function on a bracket.
//!
//! Non-finite objective values are treated as worse than any finite value, so
//! a search steered into a region where the objective cannot be evaluated
//! shrinks away from it.

use anyhow::{bail, Result};

/// Interior points sit at a fraction 1 - 1/φ of the width in from each end.
const GOLDEN_SECTION: f64 = 0.381_966_011_250_105;

const MAX_SHRINKS: usize = 200;

fn sanitize(value: f64) -> f64 {
    if value.is_nan() {
        f64::INFINITY
    } else {
        value
    }
}

/// Shrinks `bracket` until its width falls below `tolerance` and returns its midpoint.
///
/// The search keeps four points `x1 < x2 < x3 < x4`. When `f(x2) < f(x3)` the
/// right end moves in to `x3`; otherwise the left end moves in to `x2`, so
/// ties move the search to the right. Each shrink reuses one interior value.
pub fn golden_section<F>(mut objective: F, bracket: [f64; 2], tolerance: f64) -> Result<f64>
where
    F: FnMut(f64) -> Result<f64>,
{
    if !bracket.iter().all(|x| x.is_finite()) {
        bail!("Golden section bracket must be finite, got {bracket:?}");
    }
    if !(tolerance > 0.0 && tolerance.is_finite()) {
        bail!("Golden section tolerance must be positive, got {tolerance}");
    }

    let (mut x1, mut x4) = (bracket[0].min(bracket[1]), bracket[0].max(bracket[1]));
    let mut x2 = x1 + GOLDEN_SECTION * (x4 - x1);
    let mut x3 = x4 - GOLDEN_SECTION * (x4 - x1);
    let mut f2 = sanitize(objective(x2)?);
    let mut f3 = sanitize(objective(x3)?);

    for _ in 0..MAX_SHRINKS {
        if x4 - x1 < tolerance {
            return Ok(0.5 * (x1 + x4));
        }
        if f2 < f3 {
            x4 = x3;
            x3 = x2;
            f3 = f2;
            x2 = x1 + GOLDEN_SECTION * (x4 - x1);
            f2 = sanitize(objective(x2)?);
        } else {
            x1 = x2;
            x2 = x3;
            f2 = f3;
            x3 = x4 - GOLDEN_SECTION * (x4 - x1);
            f3 = sanitize(objective(x3)?);
        }
    }

    log::warn!(
        "Golden section stopped after {MAX_SHRINKS} shrinks with width {:e}",
        x4 - x1
    );
    Ok(0.5 * (x1 + x4))
}
