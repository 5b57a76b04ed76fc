//! Collection of measurements into registered aggregation views.
//!
//! `statsview` exposes two main concepts: defining what gets measured, and
//! reading back what was measured.
//!
//! A [`Measure`] names a quantity that can be recorded, such as the latency of
//! a task in milliseconds. On its own, recording against a measure does
//! nothing: recorded values only become visible once a [`View`] binds the
//! measure to an [`Aggregation`], such as a distribution over fixed bucket
//! boundaries, and that view is registered with a [`Stats`] context.
//!
//! [`Stats`] is an explicit context object rather than process-global state:
//! callers create one, register their views against it, and hand clones of it
//! (or of a [`StatsRecorder`] obtained from it) to whatever records or
//! exports. This makes initialization order a visible dependency --
//! registering a view after recording has started is an error, not silent
//! data loss.
//!
//! Recording is fire-and-forget and non-blocking: a recorded value updates
//! in-memory aggregation state only. Exporters read that state through
//! [`Stats::snapshot`], which returns a point-in-time copy of every
//! registered view.
//!
//! ```
//! use statsview::{Aggregation, BucketBoundaries, Measure, Stats, Unit, View};
//!
//! let stats = Stats::new();
//! let latency = Measure::new("task_latency", "The task latency.", Unit::Milliseconds);
//!
//! let bounds = BucketBoundaries::new(&[0.0, 100.0, 200.0, 400.0])?;
//! stats.register_view(View::new(
//!     "task_latency_distribution",
//!     "The distribution of the task latencies.",
//!     latency.clone(),
//!     Aggregation::Distribution(bounds),
//! ))?;
//!
//! let recorder = stats.recorder();
//! recorder.record(&latency, 118.0);
//!
//! let snapshot = stats.snapshot();
//! assert_eq!(snapshot.views().len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
#![deny(missing_docs)]

mod bounds;
pub use self::bounds::{BoundariesError, BucketBoundaries};

mod histogram;
pub use self::histogram::Histogram;

mod measure;
pub use self::measure::{Measure, Unit};

mod registry;
pub use self::registry::{MeasureMap, RegisterError, Stats, StatsRecorder};

mod snapshot;
pub use self::snapshot::{AggregationData, Snapshot, ViewData};

mod view;
pub use self::view::{Aggregation, View};

/// An allocation-optimized string.
///
/// Accepted anywhere a measure, view, or description is named, so that static
/// string literals avoid an allocation.
pub type SharedString = std::borrow::Cow<'static, str>;
