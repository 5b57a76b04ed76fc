use thiserror::Error;

/// Errors that could occur while validating bucket boundaries.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BoundariesError {
    /// The boundary list was empty.
    #[error("bucket boundaries must not be empty")]
    Empty,

    /// A boundary was NaN or infinite.
    #[error("bucket boundaries must be finite")]
    NotFinite,

    /// The boundaries were not in strictly ascending order.
    #[error("bucket boundaries must be strictly ascending")]
    NotAscending,
}

/// Ascending threshold values defining the bin edges of a histogram.
///
/// Boundaries are validated at construction and immutable afterwards, so a
/// histogram built from them never has to re-check them.
#[derive(Clone, Debug, PartialEq)]
pub struct BucketBoundaries {
    bounds: Vec<f64>,
}

impl BucketBoundaries {
    /// Creates a `BucketBoundaries` from the given bounds.
    ///
    /// ## Errors
    ///
    /// If `bounds` is empty, contains a non-finite value, or is not strictly
    /// ascending, an error variant is returned describing the problem.
    pub fn new(bounds: &[f64]) -> Result<BucketBoundaries, BoundariesError> {
        if bounds.is_empty() {
            return Err(BoundariesError::Empty);
        }

        if bounds.iter().any(|b| !b.is_finite()) {
            return Err(BoundariesError::NotFinite);
        }

        if bounds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(BoundariesError::NotAscending);
        }

        Ok(BucketBoundaries { bounds: Vec::from(bounds) })
    }

    /// The boundary values, in ascending order.
    pub fn as_slice(&self) -> &[f64] {
        &self.bounds
    }
}

#[cfg(test)]
mod tests {
    use super::{BoundariesError, BucketBoundaries};

    #[test]
    fn test_valid_boundaries() {
        let bounds =
            BucketBoundaries::new(&[0.0, 100.0, 200.0, 400.0, 1000.0, 2000.0, 4000.0]).unwrap();
        assert_eq!(bounds.as_slice().len(), 7);
        assert_eq!(bounds.as_slice()[0], 0.0);
        assert_eq!(bounds.as_slice()[6], 4000.0);
    }

    #[test]
    fn test_invalid_boundaries() {
        assert_eq!(BucketBoundaries::new(&[]), Err(BoundariesError::Empty));
        assert_eq!(BucketBoundaries::new(&[0.0, f64::NAN]), Err(BoundariesError::NotFinite));
        assert_eq!(
            BucketBoundaries::new(&[0.0, f64::INFINITY]),
            Err(BoundariesError::NotFinite)
        );
        assert_eq!(BucketBoundaries::new(&[0.0, 100.0, 100.0]), Err(BoundariesError::NotAscending));
        assert_eq!(BucketBoundaries::new(&[100.0, 0.0]), Err(BoundariesError::NotAscending));
    }
}
