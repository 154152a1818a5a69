//! Target axis planning.
//!
//! Latitude and longitude axes step from the extent start towards its end,
//! excluding the end itself. The time axis follows the same rule at the
//! requested interval. A degenerate extent (start == end) plans to the single
//! start value and an empty extent (end < start) plans to an empty axis.

use tracing::debug;

use crate::error::{ResamplerError, Result};
use crate::types::{Axis, Extent, SourceExtent, TargetGrid};

/// Derives target axes from a source extent, a spatial resolution and a time interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateGridPlanner {
    resolution_deg: f64,
    interval_seconds: f64,
}

impl CoordinateGridPlanner {
    /// Create a planner, rejecting non-positive or non-finite steps.
    pub fn new(resolution_deg: f64, interval_seconds: f64) -> Result<Self> {
        if !(resolution_deg.is_finite() && resolution_deg > 0.0) {
            return Err(ResamplerError::InvalidResolution(resolution_deg));
        }
        if !(interval_seconds.is_finite() && interval_seconds > 0.0) {
            return Err(ResamplerError::InvalidInterval(interval_seconds));
        }
        Ok(Self {
            resolution_deg,
            interval_seconds,
        })
    }

    pub fn resolution_deg(&self) -> f64 {
        self.resolution_deg
    }

    pub fn interval_seconds(&self) -> f64 {
        self.interval_seconds
    }

    /// Plan the full target grid for a source extent.
    pub fn plan(&self, extent: &SourceExtent) -> TargetGrid {
        let grid = TargetGrid::new(
            stepped_axis(extent.time, self.interval_seconds),
            stepped_axis(extent.lat, self.resolution_deg),
            stepped_axis(extent.lon, self.resolution_deg),
        );
        let (nt, ny, nx) = grid.shape();
        debug!(
            times = nt,
            lats = ny,
            lons = nx,
            resolution = self.resolution_deg,
            interval = self.interval_seconds,
            "Planned target grid"
        );
        grid
    }
}

/// Plan a target grid in one call.
pub fn plan(
    lat: Extent,
    lon: Extent,
    time: Extent,
    resolution_deg: f64,
    interval_seconds: f64,
) -> Result<TargetGrid> {
    let planner = CoordinateGridPlanner::new(resolution_deg, interval_seconds)?;
    Ok(planner.plan(&SourceExtent { lat, lon, time }))
}

/// Arithmetic sequence over `[extent.start, extent.end)`.
///
/// `step` must be positive and finite.
pub fn stepped_axis(extent: Extent, step: f64) -> Axis {
    if extent.is_empty() || !extent.start.is_finite() || !extent.end.is_finite() {
        return Axis::empty();
    }
    if extent.is_degenerate() {
        return Axis::single(extent.start);
    }
    Axis::from_sorted(arange(extent.start, extent.end, step))
}

/// `start, start + step, ...` for every value strictly below `end`.
///
/// Values are computed as `start + i * step` so rounding does not accumulate.
fn arange(start: f64, end: f64, step: f64) -> Vec<f64> {
    let count = ((end - start) / step).ceil().max(0.0) as usize;
    let mut values: Vec<f64> = (0..count).map(|i| start + i as f64 * step).collect();
    // Guard against ulp-level overshoot of the exclusive end.
    while values.last().is_some_and(|&v| v >= end) {
        values.pop();
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arange_excludes_end() {
        assert_eq!(arange(0.0, 2.0, 1.0), vec![0.0, 1.0]);
        assert_eq!(arange(0.0, 2.5, 1.0), vec![0.0, 1.0, 2.0]);
        assert_eq!(arange(0.0, 0.3, 0.1).len(), 3);
    }

    #[test]
    fn test_degenerate_extent_is_single_value() {
        let axis = stepped_axis(Extent::new(12.5, 12.5), 0.15);
        assert_eq!(axis.values(), &[12.5]);
    }

    #[test]
    fn test_empty_extent_is_empty_axis() {
        let axis = stepped_axis(Extent::new(5.0, 4.0), 0.15);
        assert!(axis.is_empty());
    }

    #[test]
    fn test_plan_axes_strictly_increasing() {
        let cases = [(0.15, 900.0), (0.083, 3600.0), (1.0, 1.0), (0.7, 10800.0)];
        for &(resolution, interval) in &cases {
            let grid = plan(
                Extent::new(-10.0, 10.0),
                Extent::new(170.0, 185.0),
                Extent::new(1_700_000_000.0, 1_700_086_400.0),
                resolution,
                interval,
            )
            .unwrap();
            for axis in [grid.lat(), grid.lon(), grid.time()] {
                assert!(!axis.is_empty());
                assert!(axis.values().windows(2).all(|w| w[0] < w[1]));
            }
        }
    }

    #[test]
    fn test_plan_time_axis_from_interval() {
        let grid = plan(
            Extent::new(0.0, 1.0),
            Extent::new(0.0, 1.0),
            Extent::new(0.0, 10800.0),
            0.5,
            3600.0,
        )
        .unwrap();
        assert_eq!(grid.time().values(), &[0.0, 3600.0, 7200.0]);
        assert_eq!(grid.lat().values(), &[0.0, 0.5]);
    }

    #[test]
    fn test_equal_times_yield_single_time() {
        let grid = plan(
            Extent::new(0.0, 1.0),
            Extent::new(0.0, 1.0),
            Extent::new(1_700_000_000.0, 1_700_000_000.0),
            0.5,
            3600.0,
        )
        .unwrap();
        assert_eq!(grid.time().values(), &[1_700_000_000.0]);
    }

    #[test]
    fn test_invalid_steps_rejected() {
        assert_eq!(
            CoordinateGridPlanner::new(0.0, 60.0),
            Err(ResamplerError::InvalidResolution(0.0))
        );
        assert_eq!(
            CoordinateGridPlanner::new(0.1, -60.0),
            Err(ResamplerError::InvalidInterval(-60.0))
        );
        assert!(CoordinateGridPlanner::new(f64::NAN, 60.0).is_err());
    }
}
