//! Test data generators for synthetic provider grids.
//!
//! Every grid generator returns a `Vec<f64>` in `[time][lat][lon]` row-major
//! order, matching how raw fields are laid out. Missing cells are `f64::NAN`.

/// Evenly spaced axis: `start, start + step, ...`, `count` values.
///
/// # Example
///
/// ```
/// use test_utils::regular_axis;
///
/// assert_eq!(regular_axis(0.0, 0.5, 3), vec![0.0, 0.5, 1.0]);
/// ```
pub fn regular_axis(start: f64, step: f64, count: usize) -> Vec<f64> {
    (0..count).map(|i| start + i as f64 * step).collect()
}

/// Hourly epoch-second timestamps starting at `start`.
pub fn hourly_times(start: f64, count: usize) -> Vec<f64> {
    regular_axis(start, 3600.0, count)
}

/// A grid of one constant value.
///
/// # Example
///
/// ```
/// use test_utils::create_uniform_grid;
///
/// let grid = create_uniform_grid(2, 3, 4, 5.0);
/// assert_eq!(grid.len(), 24);
/// assert!(grid.iter().all(|&v| v == 5.0));
/// ```
pub fn create_uniform_grid(times: usize, lats: usize, lons: usize, value: f64) -> Vec<f64> {
    vec![value; times * lats * lons]
}

/// A constant grid with the listed `(t, i, j)` cells set to NaN.
///
/// Out-of-range cells are ignored.
pub fn create_grid_with_holes(
    times: usize,
    lats: usize,
    lons: usize,
    value: f64,
    holes: &[(usize, usize, usize)],
) -> Vec<f64> {
    let mut data = create_uniform_grid(times, lats, lons, value);
    for &(t, i, j) in holes {
        if t < times && i < lats && j < lons {
            data[(t * lats + i) * lons + j] = f64::NAN;
        }
    }
    data
}

/// A linear field `f(t, lat, lon) = a*t + b*lat + c*lon` sampled on the axes.
///
/// Trilinear interpolation reproduces this exactly, which makes it useful for
/// checking the temporal pass in isolation.
pub fn create_linear_grid(
    time: &[f64],
    lat: &[f64],
    lon: &[f64],
    coefficients: (f64, f64, f64),
) -> Vec<f64> {
    let (a, b, c) = coefficients;
    let mut data = Vec::with_capacity(time.len() * lat.len() * lon.len());
    for &t in time {
        for &y in lat {
            for &x in lon {
                data.push(a * t + b * y + c * x);
            }
        }
    }
    data
}

/// A land mask pattern: every cell with `lon >= coast_lon` is NaN, the rest `value`.
///
/// Simulates a coastline running north-south through the grid.
pub fn create_coastline_grid(
    times: usize,
    lat: &[f64],
    lon: &[f64],
    coast_lon: f64,
    value: f64,
) -> Vec<f64> {
    let mut data = Vec::with_capacity(times * lat.len() * lon.len());
    for _ in 0..times {
        for _ in lat {
            for &x in lon {
                data.push(if x >= coast_lon { f64::NAN } else { value });
            }
        }
    }
    data
}

/// Direction grid alternating by longitude between `a` and `b` degrees.
///
/// With `a = 359.0` and `b = 1.0` every pair of neighbours straddles north.
pub fn create_alternating_direction_grid(
    times: usize,
    lats: usize,
    lons: usize,
    a: f64,
    b: f64,
) -> Vec<f64> {
    let mut data = Vec::with_capacity(times * lats * lons);
    for _ in 0..times {
        for _ in 0..lats {
            for j in 0..lons {
                data.push(if j % 2 == 0 { a } else { b });
            }
        }
    }
    data
}

/// Eastward/northward components of a uniform vector with the given
/// magnitude, pointing toward `bearing_deg` clockwise from north.
pub fn create_vector_pair(
    times: usize,
    lats: usize,
    lons: usize,
    magnitude: f64,
    bearing_deg: f64,
) -> (Vec<f64>, Vec<f64>) {
    let rad = bearing_deg.to_radians();
    let n = times * lats * lons;
    (vec![magnitude * rad.sin(); n], vec![magnitude * rad.cos(); n])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_axis() {
        assert_eq!(regular_axis(10.0, 2.0, 3), vec![10.0, 12.0, 14.0]);
        assert!(regular_axis(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn test_hourly_times() {
        assert_eq!(hourly_times(0.0, 3), vec![0.0, 3600.0, 7200.0]);
    }

    #[test]
    fn test_grid_with_holes() {
        let grid = create_grid_with_holes(2, 3, 3, 5.0, &[(0, 1, 1), (9, 0, 0)]);
        assert_eq!(grid.len(), 18);
        assert!(grid[4].is_nan());
        assert_eq!(grid.iter().filter(|v| v.is_nan()).count(), 1);
    }

    #[test]
    fn test_linear_grid_layout() {
        let grid = create_linear_grid(&[0.0, 1.0], &[0.0, 10.0], &[0.0, 100.0], (1.0, 1.0, 1.0));
        assert_eq!(grid, vec![0.0, 100.0, 10.0, 110.0, 1.0, 101.0, 11.0, 111.0]);
    }

    #[test]
    fn test_coastline_grid() {
        let grid = create_coastline_grid(1, &[0.0, 1.0], &[0.0, 1.0, 2.0], 2.0, 3.0);
        assert_eq!(grid[0], 3.0);
        assert!(grid[2].is_nan());
        assert!(grid[5].is_nan());
        assert_eq!(grid.iter().filter(|v| v.is_nan()).count(), 2);
    }

    #[test]
    fn test_alternating_direction_grid() {
        let grid = create_alternating_direction_grid(1, 1, 4, 359.0, 1.0);
        assert_eq!(grid, vec![359.0, 1.0, 359.0, 1.0]);
    }

    #[test]
    fn test_vector_pair_components() {
        let (east, north) = create_vector_pair(1, 2, 2, 2.0, 90.0);
        assert_eq!(east.len(), 4);
        assert!((east[0] - 2.0).abs() < 1e-12);
        assert!(north[0].abs() < 1e-12);
    }
}
