//! Common test fixtures for grid-resampler tests.
//!
//! Reference instants for building request windows.

/// Epoch seconds for common reference instants.
pub mod instants {
    /// 2024-01-01T00:00:00Z
    pub const JAN_1_2024: f64 = 1_704_067_200.0;

    /// One hour in seconds.
    pub const HOUR: f64 = 3600.0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instants_are_hour_aligned() {
        assert_eq!(instants::JAN_1_2024 % instants::HOUR, 0.0);
    }
}
