//! Spherical embedding of geographic coordinates.
//!
//! `x = cos(lat) cos(lon)`, `y = cos(lat) sin(lon)`, `z = sin(lat)` on the
//! unit sphere. Only the forward mapping exists: source and target points are
//! always embedded from their own coordinates.

use nalgebra::Vector3;

use crate::types::Axis;

/// Embed a (latitude, longitude) pair given in degrees.
pub fn to_cartesian(lat_deg: f64, lon_deg: f64) -> Vector3<f64> {
    let lat = lat_deg.to_radians();
    let lon = lon_deg.to_radians();
    Vector3::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin())
}

/// Embed every node of a lat/lon grid, latitude-major (row per latitude).
pub fn embed_grid(lat: &Axis, lon: &Axis) -> Vec<Vector3<f64>> {
    let mut points = Vec::with_capacity(lat.len() * lon.len());
    for &la in lat.values() {
        for &lo in lon.values() {
            points.push(to_cartesian(la, lo));
        }
    }
    points
}

/// Straight-line distance through the sphere between two embedded points.
pub fn chord_distance(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    (a - b).norm()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_lie_on_unit_sphere() {
        for &(lat, lon) in &[(0.0, 0.0), (45.0, 90.0), (-89.9, -179.9), (90.0, 0.0)] {
            let p = to_cartesian(lat, lon);
            assert!((p.norm() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_axis_directions() {
        let p = to_cartesian(0.0, 90.0);
        assert!(p.x.abs() < 1e-12 && (p.y - 1.0).abs() < 1e-12);
        let north = to_cartesian(90.0, 123.0);
        assert!((north.z - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_antimeridian_is_continuous() {
        let east = to_cartesian(10.0, 179.9);
        let west = to_cartesian(10.0, -179.9);
        let d = chord_distance(&east, &west);
        // 0.2 degrees of longitude at 10N, well under a degree of arc.
        assert!(d < 1.0_f64.to_radians());
        let same = to_cartesian(10.0, 180.0);
        assert!(chord_distance(&same, &to_cartesian(10.0, -180.0)) < 1e-12);
    }

    #[test]
    fn test_poles_collapse_longitude() {
        let a = to_cartesian(90.0, 0.0);
        let b = to_cartesian(90.0, 120.0);
        assert!(chord_distance(&a, &b) < 1e-12);
    }

    #[test]
    fn test_embed_grid_order() {
        let lat = Axis::new(vec![0.0, 10.0]).unwrap();
        let lon = Axis::new(vec![0.0, 90.0, 180.0]).unwrap();
        let points = embed_grid(&lat, &lon);
        assert_eq!(points.len(), 6);
        assert!(chord_distance(&points[1], &to_cartesian(0.0, 90.0)) < 1e-12);
        assert!(chord_distance(&points[3], &to_cartesian(10.0, 0.0)) < 1e-12);
    }
}
