//! Per-slice spatial resampling with a thin-plate radial basis interpolant.
//!
//! Each time slice of a raw field is fitted independently over its present
//! samples, embedded on the unit sphere, and evaluated at every target grid
//! node. The fit is exact (zero smoothing) and has no polynomial term:
//!
//! ```text
//! f(p) = Σ w_k φ(|p - p_k|),   φ(r) = r² ln r,   φ(0) = 0
//! ```
//!
//! Solving the dense kernel system is O(N³) in the number of present source
//! samples of the slice, which is bounded by the provider's native grid rather
//! than the (finer) target grid.

use nalgebra::{DMatrix, DVector, Vector3};
use tracing::debug;

use crate::error::FitError;
use crate::projection::spherical::{chord_distance, embed_grid, to_cartesian};
use crate::types::{Axis, GridField, RawField, TargetGrid};

/// Thin-plate spline kernel.
pub fn thin_plate(r: f64) -> f64 {
    if r <= 0.0 {
        0.0
    } else {
        r * r * r.ln()
    }
}

/// An exact radial basis interpolant over embedded points.
#[derive(Debug, Clone)]
pub struct ThinPlateRbf {
    nodes: Vec<Vector3<f64>>,
    weights: DVector<f64>,
}

impl ThinPlateRbf {
    /// Fit the interpolant through `values` at `nodes`.
    ///
    /// `tolerance` bounds the smallest LU pivot relative to the largest; below
    /// it the point configuration is treated as degenerate.
    pub fn fit(
        nodes: Vec<Vector3<f64>>,
        values: &[f64],
        tolerance: f64,
    ) -> Result<Self, FitError> {
        let n = nodes.len();
        debug_assert_eq!(n, values.len());
        if n == 0 {
            return Err(FitError::Singular { points: 0 });
        }

        let kernel = DMatrix::from_fn(n, n, |i, j| {
            thin_plate(chord_distance(&nodes[i], &nodes[j]))
        });
        let lu = kernel.lu();

        let pivots = lu.u().diagonal().map(f64::abs);
        let largest = pivots.max();
        let smallest = pivots.min();
        if !(largest > 0.0) || smallest <= tolerance * largest {
            return Err(FitError::Singular { points: n });
        }

        let rhs = DVector::from_column_slice(values);
        let weights = lu.solve(&rhs).ok_or(FitError::Singular { points: n })?;
        if weights.iter().any(|w| !w.is_finite()) {
            return Err(FitError::NonFinite { points: n });
        }

        Ok(Self { nodes, weights })
    }

    /// Evaluate at an embedded point.
    pub fn evaluate(&self, point: &Vector3<f64>) -> f64 {
        self.nodes
            .iter()
            .zip(self.weights.iter())
            .map(|(node, w)| w * thin_plate(chord_distance(point, node)))
            .sum()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Result of resampling one time slice.
#[derive(Debug, Clone, PartialEq)]
pub enum SliceOutcome {
    /// The interpolant was fitted; values cover every target node.
    Fitted(Vec<f64>),
    /// No present source samples; the whole slice is missing.
    AllMissing,
}

/// Per-slice status recorded by [`SpatialInterpolator::interpolate_field`].
#[derive(Debug, Clone, PartialEq)]
pub enum SliceStatus {
    Fitted { valid_points: usize },
    AllMissing,
    Failed(FitError),
}

/// A raw field resampled onto the target lat/lon grid at its own time steps.
#[derive(Debug, Clone)]
pub struct SpatialPass {
    /// `[source time][target lat][target lon]`
    pub field: GridField,
    pub slices: Vec<SliceStatus>,
}

impl SpatialPass {
    /// The first failed slice, if any.
    pub fn first_failure(&self) -> Option<(usize, &FitError)> {
        self.slices.iter().enumerate().find_map(|(t, s)| match s {
            SliceStatus::Failed(err) => Some((t, err)),
            _ => None,
        })
    }

    pub fn count(&self, predicate: impl Fn(&SliceStatus) -> bool) -> usize {
        self.slices.iter().filter(|s| predicate(s)).count()
    }
}

/// Fits and evaluates thin-plate interpolants onto a fixed target grid.
#[derive(Debug, Clone)]
pub struct SpatialInterpolator {
    targets: Vec<Vector3<f64>>,
    target_shape: (usize, usize),
    tolerance: f64,
}

impl SpatialInterpolator {
    /// Pre-embed the target grid's lat/lon nodes.
    pub fn new(grid: &TargetGrid, tolerance: f64) -> Self {
        Self {
            targets: embed_grid(grid.lat(), grid.lon()),
            target_shape: (grid.lat().len(), grid.lon().len()),
            tolerance,
        }
    }

    /// (lat, lon) size of the target plane.
    pub fn target_shape(&self) -> (usize, usize) {
        self.target_shape
    }

    /// Resample one `[lat][lon]` slice of source values.
    pub fn interpolate_slice(
        &self,
        source_lat: &Axis,
        source_lon: &Axis,
        values: &[Option<f64>],
    ) -> Result<SliceOutcome, FitError> {
        let nx = source_lon.len();
        let expected = source_lat.len() * nx;
        if values.len() != expected {
            return Err(FitError::SliceLength {
                expected,
                actual: values.len(),
            });
        }

        let mut nodes = Vec::new();
        let mut present = Vec::new();
        for (k, value) in values.iter().enumerate() {
            if let Some(v) = value {
                let (i, j) = (k / nx, k % nx);
                nodes.push(to_cartesian(source_lat.values()[i], source_lon.values()[j]));
                present.push(*v);
            }
        }

        if present.is_empty() {
            return Ok(SliceOutcome::AllMissing);
        }

        let rbf = ThinPlateRbf::fit(nodes, &present, self.tolerance)?;
        Ok(SliceOutcome::Fitted(
            self.targets.iter().map(|p| rbf.evaluate(p)).collect(),
        ))
    }

    /// Resample every time slice of a raw field.
    ///
    /// Slices that fail to fit are left missing and reported as
    /// [`SliceStatus::Failed`]; deciding what that means for the variable is
    /// up to the caller.
    pub fn interpolate_field(&self, raw: &RawField) -> SpatialPass {
        let (nt, _, _) = raw.shape();
        let (ny, nx) = self.target_shape;
        let mut field = GridField::missing((nt, ny, nx));
        let mut slices = Vec::with_capacity(nt);

        for t in 0..nt {
            match self.interpolate_slice(raw.lat(), raw.lon(), raw.slice(t)) {
                Ok(SliceOutcome::Fitted(values)) => {
                    let values: Vec<Option<f64>> = values.into_iter().map(Some).collect();
                    field.set_slice(t, &values);
                    let valid_points = raw.slice(t).iter().filter(|v| v.is_some()).count();
                    slices.push(SliceStatus::Fitted { valid_points });
                }
                Ok(SliceOutcome::AllMissing) => {
                    debug!(field = raw.name(), time_index = t, "All-missing slice");
                    slices.push(SliceStatus::AllMissing);
                }
                Err(err) => {
                    debug!(field = raw.name(), time_index = t, error = %err, "Slice fit failed");
                    slices.push(SliceStatus::Failed(err));
                }
            }
        }

        SpatialPass { field, slices }
    }
}
