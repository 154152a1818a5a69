//! Direction-valued quantities.
//!
//! Angles cannot be interpolated directly: 359° and 1° would blend to 180°.
//! Angular fields are split into cosine/sine components before resampling and
//! recombined afterwards. Orthogonal vector pairs (eastward/northward) are
//! resampled component-wise and only their derived direction and magnitude
//! reach the output.

use crate::types::{GridField, RawField};

/// Wrap degrees into `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Split an angle in degrees into `(cos, sin)` components.
pub fn decompose(angle_deg: f64) -> (f64, f64) {
    let rad = angle_deg.to_radians();
    (rad.cos(), rad.sin())
}

/// Recover an angle in degrees, `[0, 360)`, from interpolated components.
pub fn reconstruct(cos_component: f64, sin_component: f64) -> f64 {
    normalize_degrees(sin_component.atan2(cos_component).to_degrees() + 360.0)
}

/// Direction of an eastward/northward vector pair, degrees in `[0, 360)`.
///
/// `atan2(east, north) + 180°`, i.e. the direction the vector comes from,
/// clockwise from north.
pub fn vector_direction(east: f64, north: f64) -> f64 {
    normalize_degrees(east.atan2(north).to_degrees() + 180.0)
}

/// Magnitude of an eastward/northward vector pair.
pub fn vector_magnitude(east: f64, north: f64) -> f64 {
    east.hypot(north)
}

/// Split a raw angular field into cosine and sine component fields.
///
/// Missing samples stay missing in both components.
pub fn decompose_field(angles: &RawField) -> (RawField, RawField) {
    let cos = angles.map_values(format!("{}_cos", angles.name()), |a| decompose(a).0);
    let sin = angles.map_values(format!("{}_sin", angles.name()), |a| decompose(a).1);
    (cos, sin)
}

/// Recombine resampled cosine/sine components into an angle field.
pub fn reconstruct_field(cos: &GridField, sin: &GridField) -> GridField {
    cos.zip_with(sin, reconstruct)
}

/// Direction field of a resampled vector pair.
pub fn direction_field(east: &GridField, north: &GridField) -> GridField {
    east.zip_with(north, vector_direction)
}

/// Magnitude field of a resampled vector pair.
pub fn magnitude_field(east: &GridField, north: &GridField) -> GridField {
    east.zip_with(north, vector_magnitude)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Axis;

    #[test]
    fn test_roundtrip_angles() {
        for angle in [0.0, 45.0, 90.0, 180.0, 270.0, 359.5] {
            let (c, s) = decompose(angle);
            assert!((reconstruct(c, s) - angle).abs() < 1e-9, "angle {}", angle);
        }
    }

    #[test]
    fn test_wraparound_midpoint_is_north() {
        let (c1, s1) = decompose(359.0);
        let (c2, s2) = decompose(1.0);
        let mid = reconstruct((c1 + c2) / 2.0, (s1 + s2) / 2.0);
        assert!(mid < 1e-9 || mid > 360.0 - 1e-9, "midpoint was {}", mid);
    }

    #[test]
    fn test_reconstruct_negative_quadrant() {
        let (c, s) = decompose(-90.0);
        assert!((reconstruct(c, s) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_vector_direction_convention() {
        // Pure northward flow reads as coming from the south.
        assert_eq!(vector_direction(0.0, 1.0), 180.0);
        // Pure eastward flow reads as coming from the west.
        assert!((vector_direction(1.0, 0.0) - 270.0).abs() < 1e-12);
        assert!((vector_direction(0.0, -1.0) - 0.0).abs() < 1e-12);
        assert!((vector_direction(-1.0, 0.0) - 90.0).abs() < 1e-12);
    }

    #[test]
    fn test_vector_magnitude() {
        assert_eq!(vector_magnitude(3.0, 4.0), 5.0);
        assert_eq!(vector_magnitude(0.0, 1.0), 1.0);
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(-1e-20), 0.0);
        assert_eq!(normalize_degrees(540.0), 180.0);
    }

    #[test]
    fn test_decompose_field_keeps_missing() {
        let raw = RawField::new(
            "dirpw",
            Axis::single(0.0),
            Axis::single(0.0),
            Axis::new(vec![0.0, 1.0]).unwrap(),
            vec![90.0, f64::NAN],
        )
        .unwrap();
        let (cos, sin) = decompose_field(&raw);
        assert_eq!(cos.name(), "dirpw_cos");
        assert!(cos.data()[0].unwrap().abs() < 1e-12);
        assert!((sin.data()[0].unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(cos.data()[1], None);
        assert_eq!(sin.data()[1], None);
    }
}
