use std::time::Duration;

use hyper::StatusCode;
use thiserror::Error;

/// Errors that could occur while building or installing the push exporter.
#[derive(Debug, Error)]
pub enum BuildError {
    /// No endpoint was configured.
    #[error("no push endpoint was configured")]
    MissingEndpoint,

    /// The given endpoint could not be parsed into a valid URI.
    #[error("invalid push endpoint: {0}")]
    InvalidEndpoint(String),

    /// The export interval was zero.
    #[error("export interval must be non-zero")]
    ZeroInterval,

    /// Creating the background runtime for the exporter did not succeed.
    #[error("failed to spawn runtime for exporter: {0}")]
    FailedToCreateRuntime(String),
}

/// Errors reported by a single push attempt.
#[derive(Debug, Error)]
pub enum PushError {
    /// Building the HTTP request failed.
    #[error("failed to build push request: {0}")]
    Request(String),

    /// Sending the request failed.
    #[error("error sending request to push endpoint: {0}")]
    Http(String),

    /// The endpoint answered with a non-success status.
    #[error("unexpected status {status} from push endpoint: {body}")]
    Status {
        /// The response status.
        status: StatusCode,
        /// The response body, as far as it could be read.
        body: String,
    },
}

/// Errors that could occur while awaiting an explicit flush.
#[derive(Debug, Error)]
pub enum FlushError {
    /// The exporter task is no longer running.
    #[error("exporter task has shut down")]
    Closed,

    /// The flush was not acknowledged within the timeout.
    #[error("flush not acknowledged within {0:?}")]
    Timeout(Duration),

    /// The push performed for this flush failed.
    #[error(transparent)]
    Push(#[from] PushError),
}

pub(crate) fn sanitize_metric_name(name: &str) -> String {
    // Replace anything that isn't [a-zA-Z0-9_:].
    let sanitize = |c: char| !(c.is_alphanumeric() || c == '_' || c == ':');
    name.to_string().replace(sanitize, "_")
}

#[cfg(test)]
mod tests {
    use super::sanitize_metric_name;

    #[test]
    fn test_sanitize_metric_name() {
        let test_cases = vec![
            ("____", "____"),
            ("foo bar", "foo_bar"),
            ("abcd:efgh", "abcd:efgh"),
            ("lars.andersen", "lars_andersen"),
        ];

        for (input, expected) in test_cases {
            let result = sanitize_metric_name(input);
            assert_eq!(expected, result);
        }
    }
}
