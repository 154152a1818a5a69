//! Grid Resampling for Multi-Provider Marine Weather Data
//!
//! This crate takes sparse, irregular, gappy lat/lon/time grids from several
//! providers and resamples them onto one dense regular grid. It enables:
//!
//! - **Gap-aware spatial interpolation**: thin-plate RBF over valid points only,
//!   with source distances measured on the sphere
//! - **Trilinear time interpolation**: never extrapolates outside the source range
//! - **Land/missing propagation**: holes in the source stay holes in the output
//! - **Circular quantities**: angles and vector pairs survive the 359°/1° seam
//!
//! # Architecture
//!
//! ```text
//! ResampleRequest + [ProviderDataset]
//!      │
//!      ▼
//! ResamplerService::resample
//!      │
//!      ├─► assemble_sources (provider catalog → SourceVariable jobs)
//!      │
//!      ├─► GridSlot::merge (first source plans the TargetGrid, later ones reuse it)
//!      │
//!      ├─► per job:
//!      │     ├─► SpatialInterpolator   (per time slice, unit-sphere RBF)
//!      │     ├─► interpolate_time      (trilinear on the target grid)
//!      │     ├─► MissingnessPropagator (threshold the resampled indicator)
//!      │     └─► circular reconstruction (angles, direction, magnitude)
//!      │
//!      └─► ResampledGrid { time, lat, lon, <output>: [[[...]]] }
//! ```
//!
//! # Example
//!
//! ```ignore
//! use grid_resampler::{
//!     Provider, ProviderDataset, ResampleRequest, ResamplerConfig, ResamplerService,
//! };
//!
//! let service = ResamplerService::new(ResamplerConfig::from_env())?;
//! let dataset = ProviderDataset::new(Provider::WaveWatch).with_field(swh);
//! let request = ResampleRequest::new(3600.0).with_variables(["wave_height"]);
//! let output = service.resample(&request, &[dataset])?;
//!
//! for value in output.get("wave_height").unwrap().data() {
//!     // None means land or no data
//! }
//! ```

pub mod circular;
pub mod config;
pub mod error;
pub mod merger;
pub mod missingness;
pub mod planner;
pub mod projection;
pub mod service;
pub mod spatial;
pub mod temporal;
pub mod types;
pub mod variables;

// Re-export commonly used types at crate root
pub use circular::{decompose, reconstruct, vector_direction, vector_magnitude};
pub use config::{ResamplerConfig, SliceFailurePolicy};
pub use error::{FitError, ResamplerError, Result};
pub use merger::GridSlot;
pub use missingness::{MissingMask, MissingnessPropagator};
pub use planner::CoordinateGridPlanner;
pub use projection::{embed_grid, to_cartesian, trilinear_interpolate, Sample};
pub use service::{
    OmittedVariable, RequestScope, ResampleRequest, ResampledGrid, ResamplerService,
    VariableReport,
};
pub use spatial::{SliceOutcome, SpatialInterpolator, ThinPlateRbf};
pub use temporal::interpolate_time;
pub use types::{Axis, Extent, GridField, RawField, SourceExtent, TargetGrid};
pub use variables::{assemble_sources, Provider, ProviderDataset, SourceVariable};
