use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use http_body_util::{BodyExt, Collected, Full};
use hyper::body::Bytes;
use hyper::{header::HeaderValue, Method, Request, Uri};
use hyper_util::client::legacy::connect::Connect;
use hyper_util::{client::legacy::Client, rt::TokioExecutor};
use statsview::Stats;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

use crate::common::{FlushError, PushError};
use crate::render::render;

/// Convenience type for the future implementing the exporter task.
pub type ExporterFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

struct FlushRequest {
    ack: oneshot::Sender<Result<(), PushError>>,
}

/// A handle to a running push exporter.
///
/// Cloning is cheap; every clone talks to the same exporter task.
#[derive(Clone)]
pub struct PushHandle {
    sender: mpsc::Sender<FlushRequest>,
}

impl PushHandle {
    /// Pushes the current aggregation state immediately and waits for the
    /// result of that push, bounded by `timeout`.
    ///
    /// Data recorded before this call is on the endpoint once this returns
    /// `Ok`. The periodic export keeps running either way.
    ///
    /// ## Errors
    ///
    /// Returns an error if the push fails, if the exporter task has shut
    /// down, or if no acknowledgment arrives within `timeout`.
    pub async fn flush(&self, timeout: Duration) -> Result<(), FlushError> {
        let flush = async {
            let (ack, result) = oneshot::channel();
            self.sender.send(FlushRequest { ack }).await.map_err(|_| FlushError::Closed)?;
            result.await.map_err(|_| FlushError::Closed)?.map_err(FlushError::from)
        };

        match tokio::time::timeout(timeout, flush).await {
            Ok(result) => result,
            Err(_) => Err(FlushError::Timeout(timeout)),
        }
    }
}

// Creates the exporter future and the flush handle attached to it.
pub(crate) fn new_push_task(
    endpoint: Uri,
    interval: Duration,
    auth: Option<HeaderValue>,
    stats: Stats,
) -> (PushHandle, ExporterFuture) {
    let (sender, mut requests) = mpsc::channel(8);

    let task = Box::pin(async move {
        let https = hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()
            .expect("no native root CA certificates found")
            .https_or_http()
            .enable_http1()
            .build();
        let client: Client<_, Full<Bytes>> = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(Duration::from_secs(30))
            .build(https);

        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {
                    if let Err(e) = push(&client, &endpoint, &auth, &stats).await {
                        error!("periodic push failed: {}", e);
                    }
                }
                request = requests.recv() => {
                    match request {
                        Some(FlushRequest { ack }) => {
                            let result = push(&client, &endpoint, &auth, &stats).await;
                            if let Err(e) = &result {
                                error!("flush push failed: {}", e);
                            }

                            // The requester may have timed out and gone away.
                            let _ = ack.send(result);
                        }
                        // Every flush handle is gone; only the periodic push remains.
                        None => loop {
                            tokio::time::sleep(interval).await;
                            if let Err(e) = push(&client, &endpoint, &auth, &stats).await {
                                error!("periodic push failed: {}", e);
                            }
                        },
                    }
                }
            }
        }
    });

    (PushHandle { sender }, task)
}

async fn push<C>(
    client: &Client<C, Full<Bytes>>,
    endpoint: &Uri,
    auth: &Option<HeaderValue>,
    stats: &Stats,
) -> Result<(), PushError>
where
    C: Connect + Clone + Send + Sync + 'static,
{
    let mut builder = Request::builder().method(Method::PUT).uri(endpoint.clone());
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth.clone());
    }

    let output = render(&stats.snapshot());
    let req = builder.body(Full::from(output)).map_err(|e| PushError::Request(e.to_string()))?;

    let response = client.request(req).await.map_err(|e| PushError::Http(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        let body = response
            .into_body()
            .collect()
            .await
            .map(Collected::to_bytes)
            .map_err(|_| ())
            .and_then(|b| String::from_utf8(b[..].to_vec()).map_err(|_| ()))
            .unwrap_or_else(|()| String::from("<failed to read response body>"));
        return Err(PushError::Status { status, body });
    }

    debug!("pushed aggregated view data");
    Ok(())
}

pub(crate) fn basic_auth(username: &str, password: Option<&str>) -> HeaderValue {
    use base64::prelude::BASE64_STANDARD;
    use base64::write::EncoderWriter;
    use std::io::Write;

    let mut buf = b"Basic ".to_vec();
    {
        let mut encoder = EncoderWriter::new(&mut buf, &BASE64_STANDARD);
        write!(encoder, "{username}:").expect("should not fail to encode username");
        if let Some(password) = password {
            write!(encoder, "{password}").expect("should not fail to encode password");
        }
    }
    let mut header = HeaderValue::from_bytes(&buf).expect("base64 is always valid HeaderValue");
    header.set_sensitive(true);
    header
}
