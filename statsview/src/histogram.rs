use crate::BucketBoundaries;

/// A bucketed histogram.
///
/// This histogram tracks the number of samples that fall at or below each of
/// its pre-defined bucket bounds, rather than exposing any sort of quantiles.
/// Bucket counts are cumulative: a sample is counted in every bucket whose
/// bound it does not exceed. Samples above the highest bound are visible only
/// through the total count and sum.
#[derive(Clone, Debug)]
pub struct Histogram {
    count: u64,
    sum: f64,
    bounds: BucketBoundaries,
    buckets: Vec<u64>,
}

impl Histogram {
    /// Creates a new `Histogram` over the given bounds.
    pub(crate) fn new(bounds: BucketBoundaries) -> Histogram {
        let buckets = vec![0u64; bounds.as_slice().len()];

        Histogram { count: 0, sum: 0.0, bounds, buckets }
    }

    /// Gets the sample count.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Gets the sum of all samples.
    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Gets the buckets.
    ///
    /// Buckets are tuples, where the first element is the bucket bound itself,
    /// and the second element is the count of samples at or below that bound.
    pub fn buckets(&self) -> Vec<(f64, u64)> {
        self.bounds.as_slice().iter().copied().zip(self.buckets.iter().copied()).collect()
    }

    /// Records a single sample.
    pub(crate) fn record(&mut self, sample: f64) {
        self.sum += sample;
        self.count += 1;

        for (idx, bound) in self.bounds.as_slice().iter().enumerate() {
            if sample <= *bound {
                self.buckets[idx] += 1;
            }
        }
    }
}
