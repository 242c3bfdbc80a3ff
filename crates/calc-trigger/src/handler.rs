//! HTTP trigger host.
//!
//! `HttpTrigger` runs a hyper HTTP/1.1 server and turns every inbound
//! request, whatever its path, into one invocation of the
//! [`RequestHandler`].

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::{Body, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::convert;
use crate::invocation::{RequestHandler, UNMARSHAL_FAILED_MESSAGE};

/// Body sent when the function rejects an invocation outright.
pub const FUNCTION_ERROR_BODY: &str = "Internal Server Error";

/// Default cap on a buffered request body.
pub const DEFAULT_MAX_BODY_BYTES: usize = calc_core::config::DEFAULT_MAX_BODY_BYTES;

/// Pause after an accept error that is not tied to a single connection,
/// e.g. running out of file descriptors.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// HTTP trigger server.
///
/// Binds to a TCP port and forwards each request to the handler.
/// A [`TriggerError`](crate::TriggerError) from the handler is reported
/// as `502 Bad Gateway`.
pub struct HttpTrigger {
    bind_addr: SocketAddr,
    handler: Arc<RequestHandler>,
    max_body_bytes: usize,
}

impl HttpTrigger {
    /// Create a new HTTP trigger bound to the given address.
    pub fn new(bind_addr: SocketAddr, handler: RequestHandler) -> Self {
        Self {
            bind_addr,
            handler: Arc::new(handler),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Reject request bodies larger than `limit` bytes with a 400.
    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    /// Bind the configured address and serve until shutdown.
    pub async fn serve(self, shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
        let listener = TcpListener::bind(self.bind_addr)
            .await
            .with_context(|| format!("failed to bind HTTP trigger on {}", self.bind_addr))?;
        self.serve_on(listener, shutdown).await
    }

    /// Serve on an already-bound listener until the shutdown signal flips.
    ///
    /// Spawns a tokio task per connection. Accept errors are logged and
    /// never stop the server.
    pub async fn serve_on(
        self,
        listener: TcpListener,
        mut shutdown: watch::Receiver<bool>,
    ) -> anyhow::Result<()> {
        let local_addr = listener.local_addr().context("listener has no local address")?;
        info!(
            addr = %local_addr,
            health_echo = self.handler.health_echo(),
            max_body_bytes = self.max_body_bytes,
            "HTTP trigger listening"
        );

        loop {
            tokio::select! {
                accept_result = listener.accept() => {
                    let (stream, peer_addr) = match accept_result {
                        Ok(accepted) => accepted,
                        Err(e) => {
                            if let Some(backoff) = accept_backoff(&e) {
                                error!(error = %e, "accept failed, backing off");
                                tokio::time::sleep(backoff).await;
                            } else {
                                debug!(error = %e, "connection dropped before accept");
                            }
                            continue;
                        }
                    };
                    let handler = self.handler.clone();
                    let limit = self.max_body_bytes;

                    tokio::spawn(async move {
                        let io = TokioIo::new(stream);
                        let svc = service_fn(move |req: Request<Incoming>| {
                            let handler = handler.clone();
                            let span = info_span!("invocation", method = %req.method(), %peer_addr);
                            async move {
                                Ok::<_, hyper::Error>(dispatch(&handler, limit, req).await)
                            }
                            .instrument(span)
                        });

                        if let Err(e) = http1::Builder::new()
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(%peer_addr, error = %e, "connection error");
                        }
                    });
                }
                _ = shutdown.changed() => {
                    info!("HTTP trigger shutting down");
                    break;
                }
            }
        }

        Ok(())
    }
}

/// How long to wait before accepting again, or `None` when the error only
/// concerns the connection being accepted.
fn accept_backoff(err: &io::Error) -> Option<Duration> {
    match err.kind() {
        io::ErrorKind::ConnectionAborted
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionRefused
        | io::ErrorKind::Interrupted => None,
        _ => Some(ACCEPT_BACKOFF),
    }
}

async fn dispatch<B>(
    handler: &RequestHandler,
    limit: usize,
    req: Request<B>,
) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let (parts, body) = req.into_parts();
    let body = match Limited::new(body, limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!(error = %e, limit, "failed to read request body");
            return convert::plain_response(StatusCode::BAD_REQUEST, UNMARSHAL_FAILED_MESSAGE);
        }
    };
    debug!(path = parts.uri.path(), "dispatching invocation");

    let invocation = convert::invocation_from_parts(&parts.method, &parts.headers, &body);
    match handler.handle(&invocation) {
        Ok(response) => {
            info!(status = response.status, "invocation complete");
            convert::into_hyper_response(response)
        }
        Err(e) => {
            warn!(error = %e, "function returned an error");
            convert::plain_response(StatusCode::BAD_GATEWAY, FUNCTION_ERROR_BODY)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_text(resp: Response<Full<Bytes>>) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn post(body: &'static str) -> Request<Full<Bytes>> {
        Request::builder()
            .method("POST")
            .uri("/")
            .body(Full::new(Bytes::from_static(body.as_bytes())))
            .unwrap()
    }

    #[test]
    fn http_trigger_creation() {
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let trigger = HttpTrigger::new(addr, RequestHandler::new());
        assert_eq!(trigger.bind_addr(), addr);
        assert_eq!(trigger.max_body_bytes(), DEFAULT_MAX_BODY_BYTES);
        assert_eq!(trigger.with_max_body_bytes(8).max_body_bytes(), 8);
    }

    #[test]
    fn accept_backoff_only_for_listener_errors() {
        for kind in [
            io::ErrorKind::ConnectionAborted,
            io::ErrorKind::ConnectionReset,
            io::ErrorKind::ConnectionRefused,
            io::ErrorKind::Interrupted,
        ] {
            assert_eq!(accept_backoff(&io::Error::from(kind)), None, "{kind:?}");
        }
        // EMFILE
        let too_many_files = io::Error::from_raw_os_error(24);
        assert_eq!(accept_backoff(&too_many_files), Some(ACCEPT_BACKOFF));
        assert_eq!(
            accept_backoff(&io::Error::other("out of memory")),
            Some(ACCEPT_BACKOFF)
        );
    }

    #[tokio::test]
    async fn dispatch_within_limit() {
        let req = post(r#"{"a":4,"b":5,"method":"ADD"}"#);
        let resp = dispatch(&RequestHandler::new(), 64, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_text(resp).await, r#"{"result":9}"#);
    }

    #[tokio::test]
    async fn dispatch_oversized_body_is_400() {
        let req = post(r#"{"a":4,"b":5,"method":"ADD"}"#);
        let resp = dispatch(&RequestHandler::new(), 8, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(resp).await, UNMARSHAL_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn dispatch_unsupported_method_is_502() {
        let req = Request::builder()
            .method("DELETE")
            .uri("/")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let resp = dispatch(&RequestHandler::new(), 64, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_text(resp).await, FUNCTION_ERROR_BODY);
    }

    #[tokio::test]
    async fn http_trigger_serves_and_shuts_down() {
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let trigger = HttpTrigger::new(addr, RequestHandler::new());

        let (tx, rx) = watch::channel(false);

        let server = tokio::spawn(async move { trigger.serve(rx).await });

        // Give it a moment to bind.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        tx.send(true).unwrap();

        let result = server.await.unwrap();
        assert!(result.is_ok());
    }
}
