//! Observer surface for request diagnostics.
//!
//! The request core reports what it is doing through [`ClientEvent`]
//! values handed to an [`EventHandler`]. Handlers only observe; nothing they
//! do changes the outcome of a request.
//!
//! | Handler | Use case |
//! |---------|----------|
//! | [`NoopHandler`] | Tests or silent clients |
//! | [`LoggingHandler`] | Structured logging via `tracing` |
//! | [`FnEventHandler`] | Quick closures |
//! | [`CompositeEventHandler`] | Fan out to several handlers in order |

use tracing::{debug, trace, warn};

use crate::error::ClientError;
use crate::http_client::{HttpError, HttpMethod, HttpRequest};
use crate::pagination::PageAccumulator;

/// Events emitted while requests are assembled, sent and classified.
#[derive(Debug)]
pub enum ClientEvent<'a> {
    /// Fully assembled request, right before it goes to the transport.
    RequestAboutToBeSent { request: &'a HttpRequest },
    /// Raw response received, whatever its classification.
    ResponseReceived { status: u16, body: &'a [u8] },
    /// Response body could not be parsed as JSON. Processing continues.
    MalformedBody {
        status: u16,
        url: &'a str,
        error: &'a serde_json::Error,
        rendered: &'a str,
    },
    /// The transport failed before a response was received.
    TransportError {
        error: &'a HttpError,
        request: &'a HttpRequest,
    },
    /// A page was accumulated by a paginated request.
    Progress {
        method: HttpMethod,
        url: &'a str,
        records: usize,
    },
    /// A page arrived without pagination metadata; the run is aborted.
    PaginationAborted {
        method: HttpMethod,
        url: &'a str,
        pages: &'a PageAccumulator,
    },
    /// A paginated request is waiting for throttle budget.
    Throttled { waiting: usize },
    /// Failure reported by the client façade.
    Error { error: &'a ClientError },
}

/// Receives [`ClientEvent`]s. Implementations must not panic.
pub trait EventHandler: Send + Sync {
    fn on_event(&self, event: &ClientEvent<'_>);
}

/// Ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHandler;

impl EventHandler for NoopHandler {
    fn on_event(&self, _event: &ClientEvent<'_>) {}
}

/// Logs events with `tracing`. Header values are never logged.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl EventHandler for LoggingHandler {
    fn on_event(&self, event: &ClientEvent<'_>) {
        match event {
            ClientEvent::RequestAboutToBeSent { request } => {
                debug!(method = %request.method, url = %request.url, "sending request");
            }
            ClientEvent::ResponseReceived { status, body } => {
                trace!(status, bytes = body.len(), "response received");
            }
            ClientEvent::MalformedBody {
                status,
                url,
                error,
                rendered,
            } => {
                let preview: String = rendered.chars().take(200).collect();
                warn!(status, url, %error, body = %preview, "response body is not valid JSON");
            }
            ClientEvent::TransportError { error, request } => {
                warn!(method = %request.method, url = %request.url, %error, "transport error");
            }
            ClientEvent::Progress {
                method,
                url,
                records,
            } => {
                debug!(%method, url, records, "page fetched");
            }
            ClientEvent::PaginationAborted { method, url, pages } => {
                warn!(
                    %method,
                    url,
                    pages = pages.len(),
                    records = pages.record_count(),
                    "no result to specify next page"
                );
            }
            ClientEvent::Throttled { waiting } => {
                debug!(waiting, "request throttled");
            }
            ClientEvent::Error { error } => {
                warn!(%error, "request failed");
            }
        }
    }
}

/// Adapts a closure into an [`EventHandler`].
pub struct FnEventHandler<F>(F)
where
    F: Fn(&ClientEvent<'_>) + Send + Sync;

impl<F> FnEventHandler<F>
where
    F: Fn(&ClientEvent<'_>) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> EventHandler for FnEventHandler<F>
where
    F: Fn(&ClientEvent<'_>) + Send + Sync,
{
    fn on_event(&self, event: &ClientEvent<'_>) {
        (self.0)(event);
    }
}

/// Forwards each event to every registered handler, in registration order.
#[derive(Default)]
pub struct CompositeEventHandler {
    handlers: Vec<Box<dyn EventHandler>>,
}

impl CompositeEventHandler {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn with(mut self, handler: impl EventHandler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    pub fn with_boxed(mut self, handler: Box<dyn EventHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl EventHandler for CompositeEventHandler {
    fn on_event(&self, event: &ClientEvent<'_>) {
        for handler in &self.handlers {
            handler.on_event(event);
        }
    }
}
