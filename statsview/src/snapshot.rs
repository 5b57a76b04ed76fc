use crate::{view::Aggregation, Histogram, View};

/// Aggregated state produced by a view's [`Aggregation`].
#[derive(Clone, Debug)]
pub enum AggregationData {
    /// The number of recorded values.
    Count(u64),
    /// The sum of recorded values.
    Sum(f64),
    /// The most recently recorded value, if any value has been recorded.
    LastValue(Option<f64>),
    /// A bucketed distribution of recorded values.
    Distribution(Histogram),
}

impl AggregationData {
    /// Creates the empty state for the given aggregation.
    pub(crate) fn new(aggregation: &Aggregation) -> AggregationData {
        match aggregation {
            Aggregation::Count => AggregationData::Count(0),
            Aggregation::Sum => AggregationData::Sum(0.0),
            Aggregation::LastValue => AggregationData::LastValue(None),
            Aggregation::Distribution(bounds) => {
                AggregationData::Distribution(Histogram::new(bounds.clone()))
            }
        }
    }

    /// Folds a single recorded value into this state.
    pub(crate) fn record(&mut self, value: f64) {
        match self {
            AggregationData::Count(count) => *count += 1,
            AggregationData::Sum(sum) => *sum += value,
            AggregationData::LastValue(last) => *last = Some(value),
            AggregationData::Distribution(histogram) => histogram.record(value),
        }
    }
}

/// The aggregated state of a single view at a point in time.
#[derive(Clone, Debug)]
pub struct ViewData {
    view: View,
    data: AggregationData,
}

impl ViewData {
    pub(crate) fn new(view: View, data: AggregationData) -> ViewData {
        ViewData { view, data }
    }

    /// The view this data belongs to.
    pub fn view(&self) -> &View {
        &self.view
    }

    /// The aggregated data.
    pub fn data(&self) -> &AggregationData {
        &self.data
    }
}

/// A point-in-time copy of every registered view's aggregated state.
///
/// Views are ordered by name, so repeated snapshots of the same context
/// render identically.
#[derive(Clone, Debug)]
pub struct Snapshot {
    views: Vec<ViewData>,
}

impl Snapshot {
    pub(crate) fn new(views: Vec<ViewData>) -> Snapshot {
        Snapshot { views }
    }

    /// The per-view data, ordered by view name.
    pub fn views(&self) -> &[ViewData] {
        &self.views
    }
}
