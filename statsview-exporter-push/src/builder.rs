use std::convert::TryFrom;
use std::thread;
use std::time::Duration;

use hyper::Uri;
use statsview::Stats;

use crate::common::BuildError;
use crate::push::{basic_auth, new_push_task, ExporterFuture, PushHandle};

/// Builder for creating and installing a push exporter.
pub struct PushExporterBuilder {
    endpoint: Option<Uri>,
    interval: Duration,
    username: Option<String>,
    password: Option<String>,
}

impl PushExporterBuilder {
    /// Creates a new [`PushExporterBuilder`].
    ///
    /// Defaults to a 60 second export interval, with no endpoint and no
    /// credentials configured.
    pub fn new() -> Self {
        Self {
            endpoint: None,
            interval: Duration::from_secs(60),
            username: None,
            password: None,
        }
    }

    /// Sets the endpoint that aggregated view data is pushed to.
    ///
    /// An endpoint must be configured before building.
    ///
    /// ## Errors
    ///
    /// If the given endpoint cannot be parsed into a valid URI, an error
    /// variant will be returned describing the error.
    pub fn endpoint<T>(mut self, endpoint: T) -> Result<Self, BuildError>
    where
        T: AsRef<str>,
    {
        self.endpoint = Some(
            Uri::try_from(endpoint.as_ref())
                .map_err(|e| BuildError::InvalidEndpoint(e.to_string()))?,
        );

        Ok(self)
    }

    /// Sets the interval between periodic pushes.
    ///
    /// Defaults to 60 seconds.
    ///
    /// ## Errors
    ///
    /// If the interval is zero, an error variant will be returned.
    pub fn interval(mut self, interval: Duration) -> Result<Self, BuildError> {
        if interval.is_zero() {
            return Err(BuildError::ZeroInterval);
        }

        self.interval = interval;
        Ok(self)
    }

    /// Sets the basic-auth credentials sent with every push.
    ///
    /// Credentials are always passed explicitly; the exporter never reads
    /// them from the environment. The resulting authorization header is
    /// marked sensitive.
    #[must_use]
    pub fn credentials<U>(mut self, username: U, password: Option<String>) -> Self
    where
        U: Into<String>,
    {
        self.username = Some(username.into());
        self.password = password;
        self
    }

    /// Builds the exporter task and its flush handle over the given context.
    ///
    /// Most callers should prefer [`install`][PushExporterBuilder::install],
    /// which also spawns the task. This method provides the flexibility to
    /// schedule the returned future some other way.
    ///
    /// ## Errors
    ///
    /// If no endpoint was configured, an error variant will be returned.
    pub fn build(self, stats: Stats) -> Result<(PushHandle, ExporterFuture), BuildError> {
        let endpoint = self.endpoint.ok_or(BuildError::MissingEndpoint)?;
        let auth = self.username.as_ref().map(|name| basic_auth(name, self.password.as_deref()));

        Ok(new_push_task(endpoint, self.interval, auth, stats))
    }

    /// Builds the exporter and spawns it, returning the flush handle.
    ///
    /// When called from within a Tokio runtime, the exporter future is
    /// spawned directly into the runtime. Otherwise, a new single-threaded
    /// Tokio runtime is created on a background thread, and the exporter is
    /// spawned there.
    ///
    /// ## Errors
    ///
    /// If there is an error while building the exporter, or creating the
    /// background runtime, an error variant will be returned describing the
    /// error.
    pub fn install(self, stats: Stats) -> Result<PushHandle, BuildError> {
        use tokio::runtime;

        if let Ok(handle) = runtime::Handle::try_current() {
            let (push, exporter) = self.build(stats)?;
            handle.spawn(exporter);

            Ok(push)
        } else {
            let runtime = runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| BuildError::FailedToCreateRuntime(e.to_string()))?;

            let (push, exporter) = self.build(stats)?;
            thread::Builder::new()
                .name("statsview-exporter-push".to_string())
                .spawn(move || runtime.block_on(exporter))
                .map_err(|e| BuildError::FailedToCreateRuntime(e.to_string()))?;

            Ok(push)
        }
    }
}

impl Default for PushExporterBuilder {
    fn default() -> Self {
        PushExporterBuilder::new()
    }
}
