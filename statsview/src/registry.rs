use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};

use parking_lot::RwLock;
use thiserror::Error;

use crate::snapshot::{AggregationData, Snapshot, ViewData};
use crate::{Measure, View};

/// Errors that could occur while registering a view.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RegisterError {
    /// A view with the same name is already registered.
    #[error("a view named `{0}` is already registered")]
    DuplicateView(String),

    /// Registration was attempted after recording had already started.
    ///
    /// Values recorded before a view is registered are not retroactively
    /// aggregated, so late registration would silently lose data. It is
    /// rejected instead.
    #[error("view `{0}` registered after recording started")]
    AfterRecording(String),
}

struct ViewState {
    view: View,
    data: RwLock<AggregationData>,
}

struct Inner {
    views: RwLock<HashMap<String, Arc<ViewState>>>,
    by_measure: RwLock<HashMap<String, Vec<Arc<ViewState>>>>,
    recording_started: AtomicBool,
    discarded_samples: AtomicU64,
}

impl Inner {
    fn snapshot(&self) -> Snapshot {
        let views = self.views.read();
        let mut data: Vec<ViewData> =
            views.values().map(|s| ViewData::new(s.view.clone(), s.data.read().clone())).collect();
        data.sort_by(|a, b| a.view().name().cmp(b.view().name()));

        Snapshot::new(data)
    }
}

/// A stats context: the view registry and its aggregation state.
///
/// `Stats` replaces the usual process-global registry with an explicit value
/// that is cloned into everything needing it. Cloning is cheap and every
/// clone refers to the same underlying state.
///
/// Recording may happen concurrently with snapshotting; the context is fully
/// thread safe and recording never blocks on an in-flight snapshot for longer
/// than the copy of a single view's state.
#[derive(Clone)]
pub struct Stats {
    inner: Arc<Inner>,
}

impl Stats {
    /// Creates a new, empty `Stats` context.
    pub fn new() -> Stats {
        Stats {
            inner: Arc::new(Inner {
                views: RwLock::new(HashMap::new()),
                by_measure: RwLock::new(HashMap::new()),
                recording_started: AtomicBool::new(false),
                discarded_samples: AtomicU64::new(0),
            }),
        }
    }

    /// Registers a view, making its measure's recorded values visible to
    /// snapshots from this point on.
    ///
    /// ## Errors
    ///
    /// Returns an error if a view with the same name is already registered,
    /// or if any value has already been recorded through this context.
    pub fn register_view(&self, view: View) -> Result<(), RegisterError> {
        if self.inner.recording_started.load(Ordering::Acquire) {
            return Err(RegisterError::AfterRecording(view.name().to_string()));
        }

        let mut views = self.inner.views.write();
        if views.contains_key(view.name()) {
            return Err(RegisterError::DuplicateView(view.name().to_string()));
        }

        let data = RwLock::new(AggregationData::new(view.aggregation()));
        let state = Arc::new(ViewState { view, data });

        views.insert(state.view.name().to_string(), Arc::clone(&state));
        self.inner
            .by_measure
            .write()
            .entry(state.view.measure().name().to_string())
            .or_default()
            .push(state);

        Ok(())
    }

    /// Gets a [`StatsRecorder`] attached to this context.
    pub fn recorder(&self) -> StatsRecorder {
        StatsRecorder { inner: Arc::clone(&self.inner) }
    }

    /// Takes a point-in-time snapshot of every registered view.
    ///
    /// Aggregations are cumulative; taking a snapshot does not reset them.
    pub fn snapshot(&self) -> Snapshot {
        self.inner.snapshot()
    }

    /// The number of recorded values discarded because no registered view
    /// covered their measure.
    pub fn discarded_samples(&self) -> u64 {
        self.inner.discarded_samples.load(Ordering::Relaxed)
    }
}

impl Default for Stats {
    fn default() -> Self {
        Stats::new()
    }
}

/// A cheap handle for recording values against a [`Stats`] context.
#[derive(Clone)]
pub struct StatsRecorder {
    inner: Arc<Inner>,
}

impl StatsRecorder {
    /// Records a single value against `measure`.
    ///
    /// Recording is fire-and-forget: it updates in-memory aggregation state
    /// and cannot fail. A value recorded against a measure with no registered
    /// view is discarded, and the discard is counted on the context.
    pub fn record(&self, measure: &Measure, value: f64) {
        self.inner.recording_started.store(true, Ordering::Release);

        let by_measure = self.inner.by_measure.read();
        match by_measure.get(measure.name()) {
            Some(states) => {
                for state in states {
                    state.data.write().record(value);
                }
            }
            None => {
                self.inner.discarded_samples.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Starts an empty batch of measurements.
    pub fn measure_map(&self) -> MeasureMap<'_> {
        MeasureMap { recorder: self, entries: Vec::new() }
    }
}

/// A batch of (measure, value) pairs, recorded in a single call.
pub struct MeasureMap<'a> {
    recorder: &'a StatsRecorder,
    entries: Vec<(Measure, f64)>,
}

impl<'a> MeasureMap<'a> {
    /// Adds a value for the given measure to the batch.
    #[must_use]
    pub fn put(mut self, measure: &Measure, value: f64) -> Self {
        self.entries.push((measure.clone(), value));
        self
    }

    /// Records every value in the batch.
    pub fn record(self) {
        for (measure, value) in &self.entries {
            self.recorder.record(measure, *value);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::{RegisterError, Stats};
    use crate::{Aggregation, AggregationData, BucketBoundaries, Measure, Unit, View};

    fn latency() -> Measure {
        Measure::new("task_latency", "The task latency in milliseconds", Unit::Milliseconds)
    }

    fn latency_view() -> View {
        let bounds = BucketBoundaries::new(&[0.0, 100.0, 200.0, 400.0]).unwrap();
        View::new(
            "task_latency_distribution",
            "The distribution of the task latencies.",
            latency(),
            Aggregation::Distribution(bounds),
        )
    }

    #[test]
    fn test_register_and_record() {
        let stats = Stats::new();
        stats.register_view(latency_view()).unwrap();

        let recorder = stats.recorder();
        recorder.record(&latency(), 50.0);
        recorder.record(&latency(), 150.0);
        recorder.record(&latency(), 4500.0);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.views().len(), 1);

        let data = snapshot.views()[0].data();
        match data {
            AggregationData::Distribution(histogram) => {
                assert_eq!(histogram.count(), 3);
                assert_eq!(histogram.sum(), 4700.0);
                // 50 lands at or below 100/200/400; 150 at or below 200/400.
                assert_eq!(histogram.buckets(), vec![(0.0, 0), (100.0, 1), (200.0, 2), (400.0, 2)]);
            }
            other => panic!("expected distribution data, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_view_rejected() {
        let stats = Stats::new();
        stats.register_view(latency_view()).unwrap();

        let result = stats.register_view(latency_view());
        assert_eq!(
            result,
            Err(RegisterError::DuplicateView("task_latency_distribution".to_string()))
        );
    }

    #[test]
    fn test_registration_after_recording_rejected() {
        let stats = Stats::new();
        stats.recorder().record(&latency(), 1.0);

        let result = stats.register_view(latency_view());
        assert_eq!(
            result,
            Err(RegisterError::AfterRecording("task_latency_distribution".to_string()))
        );
    }

    #[test]
    fn test_unregistered_measure_discarded() {
        let stats = Stats::new();
        stats.register_view(latency_view()).unwrap();

        let other = Measure::new("queue_depth", "The queue depth.", Unit::Count);
        stats.recorder().record(&other, 7.0);

        assert_eq!(stats.discarded_samples(), 1);
        match stats.snapshot().views()[0].data() {
            AggregationData::Distribution(histogram) => assert_eq!(histogram.count(), 0),
            other => panic!("expected distribution data, got {:?}", other),
        }
    }

    #[test]
    fn test_multiple_views_over_one_measure() {
        let stats = Stats::new();
        stats.register_view(latency_view()).unwrap();
        stats
            .register_view(View::new(
                "task_latency_count",
                "The number of recorded task latencies.",
                latency(),
                Aggregation::Count,
            ))
            .unwrap();

        let recorder = stats.recorder();
        recorder.measure_map().put(&latency(), 10.0).put(&latency(), 20.0).record();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.views().len(), 2);

        // Snapshots are ordered by view name.
        assert_eq!(snapshot.views()[0].view().name(), "task_latency_count");
        assert_eq!(snapshot.views()[1].view().name(), "task_latency_distribution");

        match snapshot.views()[0].data() {
            AggregationData::Count(count) => assert_eq!(*count, 2),
            other => panic!("expected count data, got {:?}", other),
        }
        match snapshot.views()[1].data() {
            AggregationData::Distribution(histogram) => assert_eq!(histogram.count(), 2),
            other => panic!("expected distribution data, got {:?}", other),
        }
    }

    #[test]
    fn test_scalar_aggregations() {
        let stats = Stats::new();
        let depth = Measure::new("queue_depth", "The queue depth.", Unit::Count);
        stats
            .register_view(View::new(
                "queue_depth_sum",
                "The sum of observed queue depths.",
                depth.clone(),
                Aggregation::Sum,
            ))
            .unwrap();
        stats
            .register_view(View::new(
                "queue_depth_last",
                "The last observed queue depth.",
                depth.clone(),
                Aggregation::LastValue,
            ))
            .unwrap();

        let recorder = stats.recorder();
        recorder.record(&depth, 3.0);
        recorder.record(&depth, 5.0);

        let snapshot = stats.snapshot();
        match snapshot.views()[0].data() {
            AggregationData::LastValue(last) => assert_eq!(*last, Some(5.0)),
            other => panic!("expected last-value data, got {:?}", other),
        }
        match snapshot.views()[1].data() {
            AggregationData::Sum(sum) => assert_eq!(*sum, 8.0),
            other => panic!("expected sum data, got {:?}", other),
        }
    }

    #[test]
    fn test_concurrent_recording() {
        let stats = Stats::new();
        stats.register_view(latency_view()).unwrap();

        thread::scope(|s| {
            for _ in 0..4 {
                let recorder = stats.recorder();
                s.spawn(move || {
                    for i in 0..250 {
                        recorder.record(&latency(), i as f64);
                    }
                });
            }
        });

        match stats.snapshot().views()[0].data() {
            AggregationData::Distribution(histogram) => assert_eq!(histogram.count(), 1000),
            other => panic!("expected distribution data, got {:?}", other),
        }
    }
}
