//! Densification along the time axis.
//!
//! After the spatial pass a field already sits on the target lat/lon grid but
//! still at the provider's own time steps. A trilinear interpolant over
//! `(source time, target lat, target lon)` is evaluated at every target
//! `(time, lat, lon)` node. Queries outside the source time range are never
//! extrapolated: they become missing and are counted.

use tracing::debug;

use crate::projection::interpolation::{trilinear_interpolate, Sample};
use crate::types::{Axis, GridField, TargetGrid};

/// Output of the temporal pass.
#[derive(Debug, Clone)]
pub struct TemporalPass {
    /// `[target time][target lat][target lon]`
    pub field: GridField,
    /// Query points rejected for lying outside the source time range.
    pub extrapolated: usize,
}

/// Interpolate a spatially resampled field at the target grid's timestamps.
///
/// `resampled` must be shaped `[source_time.len()][grid lat][grid lon]`.
pub fn interpolate_time(
    source_time: &Axis,
    resampled: &GridField,
    grid: &TargetGrid,
) -> TemporalPass {
    let (nt, ny, nx) = grid.shape();
    debug_assert_eq!(resampled.shape(), (source_time.len(), ny, nx));

    let mut data = Vec::with_capacity(nt * ny * nx);
    let mut extrapolated = 0;

    for &t in grid.time().values() {
        for &y in grid.lat().values() {
            for &x in grid.lon().values() {
                let sample =
                    trilinear_interpolate(resampled, source_time, grid.lat(), grid.lon(), t, y, x);
                if sample == Sample::OutOfBounds {
                    extrapolated += 1;
                }
                data.push(sample.value());
            }
        }
    }

    if extrapolated > 0 {
        debug!(
            extrapolated,
            source_start = source_time.first(),
            source_end = source_time.last(),
            "Rejected temporal extrapolation"
        );
    }

    TemporalPass {
        field: GridField::from_vec((nt, ny, nx), data),
        extrapolated,
    }
}
