//! Pushes aggregated view data to a remote monitoring endpoint.
//!
//! The exporter runs as a background task that, on a fixed interval, takes a
//! snapshot of a [`Stats`][statsview::Stats] context, renders it to the text
//! exposition format, and sends it to the configured endpoint in an HTTP
//! `PUT`. Periodic push failures are logged and do not stop the task.
//!
//! Because a periodic task gives no signal that a particular batch of
//! recorded data has actually left the process, the exporter also hands back
//! a [`PushHandle`]: [`PushHandle::flush`] triggers an immediate push and
//! waits for its result, bounded by a timeout. Callers that must not lose
//! data at shutdown await a flush instead of sleeping past the next interval.
//!
//! Credentials are explicit: if the endpoint requires authentication, the
//! username and password are passed to the builder rather than discovered
//! from the environment.
#![deny(missing_docs)]

mod builder;
pub use self::builder::PushExporterBuilder;

mod common;
pub use self::common::{BuildError, FlushError, PushError};

mod push;
pub use self::push::{ExporterFuture, PushHandle};

mod render;
pub use self::render::render;
