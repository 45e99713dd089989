//! Cursor-following pagination.
//!
//! [`paginate`] drives any [`PageSource`]: it issues the first request, then
//! keeps following the absolute `next_page` URL while
//! [`should_fetch_next`] holds. Pages are requested strictly one after
//! another so accumulation order matches cursor order.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use crate::error::RequestError;
use crate::events::{ClientEvent, EventHandler};
use crate::http_client::{HttpMethod, HttpResponse};
use crate::response::RequestOutcome;
use crate::throttling::Throttle;
use crate::url::PathSpec;

/// Upper bound on the number of records a paginated request collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordLimit {
    #[default]
    Unbounded,
    AtMost(usize),
}

impl RecordLimit {
    pub const fn allows_more(self, records: usize) -> bool {
        match self {
            Self::Unbounded => true,
            Self::AtMost(max) => records < max,
        }
    }
}

impl From<Option<usize>> for RecordLimit {
    fn from(value: Option<usize>) -> Self {
        value.map_or(Self::Unbounded, Self::AtMost)
    }
}

/// Loop condition: fetch another page while under the limit and a cursor exists.
pub fn should_fetch_next(records: usize, limit: RecordLimit, next_page: Option<&str>) -> bool {
    limit.allows_more(records) && next_page.is_some_and(|cursor| !cursor.is_empty())
}

/// Pages gathered by one paginated request, in request order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageAccumulator {
    statuses: Vec<u16>,
    bodies: Vec<Value>,
    responses: Vec<HttpResponse>,
    results: Vec<Option<Value>>,
    record_count: usize,
}

impl PageAccumulator {
    pub fn push(&mut self, outcome: RequestOutcome) {
        self.record_count += page_len(&outcome.body);
        self.statuses.push(outcome.status);
        self.bodies.push(outcome.body);
        self.responses.push(outcome.response);
        self.results.push(outcome.result);
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    pub const fn record_count(&self) -> usize {
        self.record_count
    }

    pub fn statuses(&self) -> &[u16] {
        &self.statuses
    }

    pub fn bodies(&self) -> &[Value] {
        &self.bodies
    }

    pub fn responses(&self) -> &[HttpResponse] {
        &self.responses
    }

    pub fn results(&self) -> &[Option<Value>] {
        &self.results
    }

    /// Flatten page bodies into one record list, truncated to `limit`.
    pub fn finish(self, limit: RecordLimit) -> PagedOutcome {
        let mut records = Vec::with_capacity(self.record_count);
        for body in self.bodies {
            match body {
                Value::Array(items) => records.extend(items),
                other => records.push(other),
            }
        }
        if let RecordLimit::AtMost(max) = limit {
            records.truncate(max);
        }

        PagedOutcome {
            statuses: self.statuses,
            records,
            responses: self.responses,
            results: self.results.into_iter().flatten().collect(),
        }
    }
}

/// Records counted for one page body: array length, otherwise one record.
fn page_len(body: &Value) -> usize {
    match body {
        Value::Array(items) => items.len(),
        Value::String(text) if text.is_empty() => 0,
        _ => 1,
    }
}

/// Result of a completed paginated request.
#[derive(Debug, Clone, PartialEq)]
pub struct PagedOutcome {
    pub statuses: Vec<u16>,
    pub records: Vec<Value>,
    pub responses: Vec<HttpResponse>,
    pub results: Vec<Value>,
}

/// Anything able to fetch one normalized page.
pub trait PageSource: Send + Sync {
    fn fetch<'a>(
        &'a self,
        method: HttpMethod,
        path: PathSpec,
    ) -> Pin<Box<dyn Future<Output = Result<RequestOutcome, RequestError>> + Send + 'a>>;
}

/// Decorator that waits for throttle budget before delegating each fetch.
pub struct Throttled<'t, S> {
    inner: S,
    throttle: &'t Throttle,
    handler: &'t dyn EventHandler,
}

impl<'t, S> Throttled<'t, S> {
    pub fn new(inner: S, throttle: &'t Throttle, handler: &'t dyn EventHandler) -> Self {
        Self {
            inner,
            throttle,
            handler,
        }
    }
}

impl<S: PageSource> PageSource for Throttled<'_, S> {
    fn fetch<'a>(
        &'a self,
        method: HttpMethod,
        path: PathSpec,
    ) -> Pin<Box<dyn Future<Output = Result<RequestOutcome, RequestError>> + Send + 'a>> {
        Box::pin(async move {
            self.throttle.ready(self.handler).await;
            self.inner.fetch(method, path).await
        })
    }
}

/// Fetch every page reachable from `path`, up to `limit` records.
///
/// Any failed page aborts the run and no partial records are returned. A
/// page with no parsed result is fatal because the next cursor cannot be
/// read; the pages gathered so far are reported through
/// [`ClientEvent::PaginationAborted`].
pub async fn paginate<S: PageSource + ?Sized>(
    source: &S,
    handler: &dyn EventHandler,
    method: HttpMethod,
    path: PathSpec,
    limit: RecordLimit,
) -> Result<PagedOutcome, RequestError> {
    let mut pages = PageAccumulator::default();

    let first = source.fetch(method, path).await?;
    let mut next_page = accept_page(&mut pages, handler, method, first)?;

    while should_fetch_next(pages.record_count(), limit, next_page.as_deref()) {
        let Some(cursor) = next_page.take() else {
            break;
        };
        let page = source
            .fetch(HttpMethod::Get, PathSpec::Literal(cursor))
            .await?;
        next_page = accept_page(&mut pages, handler, HttpMethod::Get, page)?;
    }

    Ok(pages.finish(limit))
}

fn accept_page(
    pages: &mut PageAccumulator,
    handler: &dyn EventHandler,
    method: HttpMethod,
    outcome: RequestOutcome,
) -> Result<Option<String>, RequestError> {
    let status = outcome.status;
    let url = outcome.url.clone();
    let next_page = outcome.next_page().map(str::to_owned);
    let has_result = outcome.result.is_some();

    pages.push(outcome);
    handler.on_event(&ClientEvent::Progress {
        method,
        url: &url,
        records: pages.record_count(),
    });

    if !has_result {
        handler.on_event(&ClientEvent::PaginationAborted {
            method,
            url: &url,
            pages: &*pages,
        });
        return Err(RequestError::MissingPageMetadata {
            status,
            pages: pages.len(),
            records: pages.record_count(),
        });
    }

    Ok(next_page)
}
