//! Shared test utilities for the grid-resampler workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Approximate float assertions
//! - Synthetic sparse grid generators
//! - Reference instants for request windows
//! - Tracing setup for tests
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{assert_approx_eq, fixtures, regular_axis};
//! ```

use std::io::Write;
use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;

/// Install a test-friendly tracing subscriber.
///
/// Honors `RUST_LOG`, defaults to `warn`. Safe to call from every test; only
/// the first call installs anything.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Write `contents` to a fresh temporary file with the given suffix.
///
/// Returns the guard (the file is removed when it drops) and its path.
pub fn write_temp_file(suffix: &str, contents: &str) -> (tempfile::NamedTempFile, PathBuf) {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    let path = file.path().to_path_buf();
    (file, path)
}

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f64, 1.0_f64, 0.001_f64);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if !(diff <= epsilon) {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  \
                 diff: `{:?}` > epsilon `{:?}`",
                left,
                right,
                diff,
                epsilon
            );
        }
    }};
}

/// Approximate equality for an optional cell value; `None` must match `None`.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_cell_approx_eq;
///
/// assert_cell_approx_eq!(Some(5.0000001), Some(5.0), 1e-6);
/// assert_cell_approx_eq!(None::<f64>, None, 1e-6);
/// ```
#[macro_export]
macro_rules! assert_cell_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        match ($left, $right) {
            (Some(l), Some(r)) => $crate::assert_approx_eq!(l, r, $epsilon),
            (None, None) => {}
            (l, r) => panic!(
                "assertion failed: cell presence differs\n  left: `{:?}`,\n right: `{:?}`",
                l, r
            ),
        }
    }};
}

/// Approximate equality of two angles in degrees, modulo 360.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_angle_approx_eq;
///
/// assert_angle_approx_eq!(359.9999, 0.0, 0.001);
/// ```
#[macro_export]
macro_rules! assert_angle_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let raw: f64 = (($left as f64) - ($right as f64)).rem_euclid(360.0);
        let diff = raw.min(360.0 - raw);
        $crate::assert_approx_eq!(diff, 0.0, $epsilon);
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_approx_eq_passes() {
        assert_approx_eq!(1.0001, 1.0, 0.001);
        assert_approx_eq!(0.0, 0.0, 0.0001);
        assert_approx_eq!(-5.5, -5.500001, 0.0001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_rejects_nan() {
        assert_approx_eq!(f64::NAN, 1.0, 0.001);
    }

    #[test]
    fn test_assert_cell_approx_eq() {
        assert_cell_approx_eq!(Some(5.0000001), Some(5.0), 1e-6);
        assert_cell_approx_eq!(None::<f64>, None::<f64>, 1e-6);
    }

    #[test]
    #[should_panic(expected = "presence differs")]
    fn test_assert_cell_approx_eq_presence() {
        assert_cell_approx_eq!(Some(1.0), None::<f64>, 1e-6);
    }

    #[test]
    fn test_assert_angle_approx_eq_wraps() {
        assert_angle_approx_eq!(359.9999, 0.0, 0.001);
        assert_angle_approx_eq!(0.0001, 360.0, 0.001);
    }

    #[test]
    fn test_write_temp_file() {
        let (_guard, path) = write_temp_file(".yaml", "land_threshold: 0.4\n");
        assert!(path.to_string_lossy().ends_with(".yaml"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "land_threshold: 0.4\n");
    }

    #[test]
    fn test_init_tracing_twice() {
        init_test_tracing();
        init_test_tracing();
    }
}
