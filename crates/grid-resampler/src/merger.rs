//! Shared target grid across providers.
//!
//! The first source processed in a request fixes the target grid; every later
//! source is resampled onto that same grid, whatever its native extent or
//! resolution. Output for a request is therefore reproducible as long as the
//! source order is.

use tracing::{debug, info};

use crate::error::{ResamplerError, Result};
use crate::planner::CoordinateGridPlanner;
use crate::types::{SourceExtent, TargetGrid};

/// Functional form: plan when no grid exists yet, otherwise return the existing one.
pub fn merge(
    existing: Option<&TargetGrid>,
    extent: &SourceExtent,
    resolution_deg: f64,
    interval_seconds: f64,
) -> Result<TargetGrid> {
    match existing {
        Some(grid) => Ok(grid.clone()),
        None => Ok(CoordinateGridPlanner::new(resolution_deg, interval_seconds)?.plan(extent)),
    }
}

/// Request-scoped holder of the target grid.
///
/// Empty until the first source needs a grid; never replaced afterwards.
#[derive(Debug, Default)]
pub struct GridSlot {
    grid: Option<TargetGrid>,
}

impl GridSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<&TargetGrid> {
        self.grid.as_ref()
    }

    pub fn is_established(&self) -> bool {
        self.grid.is_some()
    }

    /// Return the request's grid, planning it from `extent` if this is the first source.
    pub fn merge(&mut self, extent: &SourceExtent, planner: &CoordinateGridPlanner) -> &TargetGrid {
        if self.grid.is_some() {
            debug!("Reusing established target grid");
        }
        self.grid.get_or_insert_with(|| {
            let grid = planner.plan(extent);
            let (nt, ny, nx) = grid.shape();
            info!(times = nt, lats = ny, lons = nx, "Established target grid");
            grid
        })
    }

    /// Install an explicitly built grid.
    ///
    /// Installing the identical grid again is a no-op; any other grid once
    /// one exists is [`ResamplerError::GridMismatch`].
    pub fn establish(&mut self, grid: TargetGrid) -> Result<&TargetGrid> {
        match &self.grid {
            Some(existing) if *existing != grid => Err(ResamplerError::GridMismatch),
            Some(_) => Ok(self.grid.get_or_insert(grid)),
            None => Ok(self.grid.insert(grid)),
        }
    }

    /// Hand the grid to the caller, ending the request scope.
    pub fn into_inner(self) -> Option<TargetGrid> {
        self.grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Extent;

    fn extent(lat: (f64, f64), lon: (f64, f64)) -> SourceExtent {
        SourceExtent {
            lat: Extent::new(lat.0, lat.1),
            lon: Extent::new(lon.0, lon.1),
            time: Extent::new(0.0, 7200.0),
        }
    }

    #[test]
    fn test_first_source_wins() {
        let planner = CoordinateGridPlanner::new(0.5, 3600.0).unwrap();
        let mut slot = GridSlot::new();
        let first = slot.merge(&extent((0.0, 2.0), (0.0, 2.0)), &planner).clone();
        let other_planner = CoordinateGridPlanner::new(0.083, 600.0).unwrap();
        let second = slot.merge(&extent((-5.0, 5.0), (10.0, 20.0)), &other_planner).clone();
        assert_eq!(first, second);
        assert_eq!(first.lat().values(), &[0.0, 0.5, 1.0, 1.5]);
    }

    #[test]
    fn test_functional_merge() {
        let e = extent((0.0, 1.0), (0.0, 1.0));
        let planned = merge(None, &e, 0.5, 3600.0).unwrap();
        let reused = merge(Some(&planned), &extent((50.0, 60.0), (0.0, 1.0)), 0.1, 60.0).unwrap();
        assert_eq!(planned, reused);
        assert!(merge(None, &e, -1.0, 3600.0).is_err());
    }

    #[test]
    fn test_redefining_grid_is_mismatch() {
        let planner = CoordinateGridPlanner::new(0.5, 3600.0).unwrap();
        let mut slot = GridSlot::new();
        let grid = slot.merge(&extent((0.0, 2.0), (0.0, 2.0)), &planner).clone();

        assert!(slot.establish(grid.clone()).is_ok());
        let different = planner.plan(&extent((0.0, 3.0), (0.0, 2.0)));
        assert_eq!(slot.establish(different), Err(ResamplerError::GridMismatch));
        assert_eq!(slot.get(), Some(&grid));
    }
}
