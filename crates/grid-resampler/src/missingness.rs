//! Gap detection for resampled fields.
//!
//! The radial basis fit happily invents plausible numbers over land and data
//! gaps. To find them, a parallel indicator (1.0 where the source sample was
//! missing, 0.0 where present) is pushed through the same spatial and temporal
//! path as the data. Target cells whose interpolated indicator reaches the
//! threshold are blanked in the data field.

use tracing::debug;

use crate::types::GridField;

/// Boolean mask over a target field; `true` marks a cell to blank.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingMask {
    shape: (usize, usize, usize),
    missing: Vec<bool>,
}

impl MissingMask {
    pub fn shape(&self) -> (usize, usize, usize) {
        self.shape
    }

    pub fn is_missing(&self, index: usize) -> bool {
        self.missing.get(index).copied().unwrap_or(true)
    }

    pub fn missing_count(&self) -> usize {
        self.missing.iter().filter(|&&m| m).count()
    }

    /// Blank masked cells in `field`. Returns how many present values were
    /// discarded.
    pub fn apply(&self, field: &mut GridField) -> usize {
        debug_assert_eq!(field.shape(), self.shape);
        let mut discarded = 0;
        for (value, &missing) in field.data_mut().iter_mut().zip(&self.missing) {
            if missing && value.is_some() {
                *value = None;
                discarded += 1;
            }
        }
        discarded
    }
}

/// Turns an interpolated missing-indicator field into a [`MissingMask`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MissingnessPropagator {
    threshold: f64,
}

impl MissingnessPropagator {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Threshold an interpolated indicator.
    ///
    /// Cells at or above the threshold are missing, as are cells where the
    /// indicator itself could not be interpolated.
    pub fn mask(&self, indicator: &GridField) -> MissingMask {
        let missing: Vec<bool> = indicator
            .data()
            .iter()
            .map(|v| match v {
                Some(fraction) => *fraction >= self.threshold,
                None => true,
            })
            .collect();
        let mask = MissingMask {
            shape: indicator.shape(),
            missing,
        };
        debug!(
            threshold = self.threshold,
            masked = mask.missing_count(),
            cells = indicator.len(),
            "Built missingness mask"
        );
        mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_inclusive() {
        let indicator =
            GridField::from_vec((1, 1, 4), vec![Some(0.0), Some(0.49), Some(0.5), Some(0.9)]);
        let mask = MissingnessPropagator::new(0.5).mask(&indicator);
        assert!(!mask.is_missing(0));
        assert!(!mask.is_missing(1));
        assert!(mask.is_missing(2));
        assert!(mask.is_missing(3));
    }

    #[test]
    fn test_uninterpolated_indicator_masks() {
        let indicator = GridField::from_vec((1, 1, 2), vec![None, Some(0.1)]);
        let mask = MissingnessPropagator::new(0.5).mask(&indicator);
        assert!(mask.is_missing(0));
        assert!(!mask.is_missing(1));
    }

    #[test]
    fn test_apply_overwrites_values() {
        let mut values =
            GridField::from_vec((1, 2, 2), vec![Some(5.0), Some(5.0), None, Some(5.0)]);
        let indicator =
            GridField::from_vec((1, 2, 2), vec![Some(0.0), Some(0.7), Some(0.8), Some(0.2)]);
        let discarded = MissingnessPropagator::new(0.5).mask(&indicator).apply(&mut values);
        assert_eq!(discarded, 1);
        assert_eq!(values.data(), &[Some(5.0), None, None, Some(5.0)]);
    }
}
