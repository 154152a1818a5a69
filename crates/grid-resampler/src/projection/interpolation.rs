//! Linear interpolation on regular (rectilinear) grids.

use crate::types::{Axis, GridField};

/// The pair of axis nodes enclosing a query coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    pub lo: usize,
    pub hi: usize,
    /// Fractional position between `lo` (0.0) and `hi` (1.0).
    pub weight: f64,
}

/// Outcome of sampling a grid at one point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    Value(f64),
    /// A corner contributing to the result is missing.
    Missing,
    /// The point lies outside the axes; no extrapolation is attempted.
    OutOfBounds,
}

impl Sample {
    pub fn value(self) -> Option<f64> {
        match self {
            Sample::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// Locate `x` on a strictly increasing axis.
///
/// Returns `None` when `x` falls outside `[first, last]`. A single-node axis
/// only brackets its own coordinate.
pub fn bracket(axis: &[f64], x: f64) -> Option<Bracket> {
    let n = axis.len();
    if n == 0 || !x.is_finite() || x < axis[0] || x > axis[n - 1] {
        return None;
    }
    if n == 1 {
        return Some(Bracket {
            lo: 0,
            hi: 0,
            weight: 0.0,
        });
    }
    let upper = axis.partition_point(|&v| v <= x);
    let lo = upper.saturating_sub(1).min(n - 2);
    let hi = lo + 1;
    let weight = (x - axis[lo]) / (axis[hi] - axis[lo]);
    Some(Bracket { lo, hi, weight })
}

/// Trilinear interpolation of `field` over `(time, lat, lon)` axes.
///
/// Corners with zero weight are skipped, so a query that lands exactly on a
/// node only reads that node. Any contributing missing corner makes the
/// result [`Sample::Missing`].
pub fn trilinear_interpolate(
    field: &GridField,
    time: &Axis,
    lat: &Axis,
    lon: &Axis,
    t: f64,
    y: f64,
    x: f64,
) -> Sample {
    let (Some(bt), Some(by), Some(bx)) = (
        bracket(time.values(), t),
        bracket(lat.values(), y),
        bracket(lon.values(), x),
    ) else {
        return Sample::OutOfBounds;
    };

    let mut sum = 0.0;
    for (ti, wt) in [(bt.lo, 1.0 - bt.weight), (bt.hi, bt.weight)] {
        if wt == 0.0 {
            continue;
        }
        for (yi, wy) in [(by.lo, 1.0 - by.weight), (by.hi, by.weight)] {
            if wy == 0.0 {
                continue;
            }
            for (xi, wx) in [(bx.lo, 1.0 - bx.weight), (bx.hi, bx.weight)] {
                if wx == 0.0 {
                    continue;
                }
                match field.get(ti, yi, xi) {
                    Some(v) => sum += wt * wy * wx * v,
                    None => return Sample::Missing,
                }
            }
        }
    }
    Sample::Value(sum)
}
