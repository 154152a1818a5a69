//! Coordinate embedding and grid interpolation kernels.
//!
//! Scattered spatial fits work in 3-D Cartesian space on the unit sphere so
//! distances stay correct across the antimeridian and near the poles. The
//! regular-grid kernels here only ever see axes in their native units.

pub mod interpolation;
pub mod spherical;

pub use interpolation::{bracket, trilinear_interpolate, Bracket, Sample};
pub use spherical::{embed_grid, to_cartesian};
