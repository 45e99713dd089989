//! Request core: single requests, uploads and paginated runs.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::{Arc, OnceLock};

use serde_json::Value;

use crate::auth;
use crate::config::ClientConfig;
use crate::error::RequestError;
use crate::events::{ClientEvent, EventHandler, NoopHandler};
use crate::http_client::{HttpClient, HttpMethod, HttpRequest, ReqwestHttpClient};
use crate::pagination::{paginate, PageSource, PagedOutcome, RecordLimit, Throttled};
use crate::response::{classify, EnvelopeKeys, RequestOutcome};
use crate::throttling::Throttle;
use crate::url::{assemble_url, PathSpec};

/// Operations every resource wrapper is built on.
///
/// [`EnvelopeKeys`] travel with each call so one core can serve every
/// resource type.
pub trait RequestCapable: Send + Sync {
    /// One request, one page.
    fn request<'a>(
        &'a self,
        envelope: EnvelopeKeys,
        method: HttpMethod,
        path: PathSpec,
        body: Option<Value>,
    ) -> Pin<Box<dyn Future<Output = Result<RequestOutcome, RequestError>> + Send + 'a>>;

    /// Follow `next_page` cursors until exhausted or `limit` records are held.
    fn request_pages<'a>(
        &'a self,
        envelope: EnvelopeKeys,
        method: HttpMethod,
        path: PathSpec,
        limit: RecordLimit,
    ) -> Pin<Box<dyn Future<Output = Result<PagedOutcome, RequestError>> + Send + 'a>>;

    /// POST a file as the raw request body.
    fn upload<'a>(
        &'a self,
        envelope: EnvelopeKeys,
        path: PathSpec,
        file: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<RequestOutcome, RequestError>> + Send + 'a>>;

    /// Every page, no record cap.
    fn request_all<'a>(
        &'a self,
        envelope: EnvelopeKeys,
        method: HttpMethod,
        path: PathSpec,
    ) -> Pin<Box<dyn Future<Output = Result<PagedOutcome, RequestError>> + Send + 'a>> {
        self.request_pages(envelope, method, path, RecordLimit::Unbounded)
    }

    /// Pages until at least `max_records` are held, truncated to exactly that.
    fn request_n<'a>(
        &'a self,
        envelope: EnvelopeKeys,
        method: HttpMethod,
        path: PathSpec,
        max_records: usize,
    ) -> Pin<Box<dyn Future<Output = Result<PagedOutcome, RequestError>> + Send + 'a>> {
        self.request_pages(envelope, method, path, RecordLimit::AtMost(max_records))
    }
}

/// The concrete request engine.
pub struct RequestCore {
    config: ClientConfig,
    http_client: Arc<dyn HttpClient>,
    handler: Arc<dyn EventHandler>,
    throttle: OnceLock<Option<Throttle>>,
}

impl RequestCore {
    pub fn new(
        config: ClientConfig,
        http_client: Arc<dyn HttpClient>,
        handler: Arc<dyn EventHandler>,
    ) -> Self {
        Self {
            config,
            http_client,
            handler,
            throttle: OnceLock::new(),
        }
    }

    /// Core backed by reqwest, with a silent event handler.
    pub fn from_config(config: ClientConfig) -> Result<Self, RequestError> {
        config.validate()?;
        let http_client = Arc::new(ReqwestHttpClient::from_config(&config)?);
        Ok(Self::new(config, http_client, Arc::new(NoopHandler)))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Throttle for paginated runs, built on first use when configured.
    pub fn throttle(&self) -> Option<&Throttle> {
        self.throttle
            .get_or_init(|| self.config.throttle().map(|config| Throttle::from_config(&config)))
            .as_ref()
    }

    /// Build, send and classify one JSON request.
    pub async fn execute(
        &self,
        envelope: EnvelopeKeys,
        method: HttpMethod,
        path: &PathSpec,
        body: Option<&Value>,
    ) -> Result<RequestOutcome, RequestError> {
        let url = assemble_url(self.config.remote_uri(), path)?;
        let body = body.map(serde_json::to_string).transpose()?;
        let request = auth::json_request(&self.config, method, url, body)?;

        self.send(envelope, request).await
    }

    /// Stream `file` as the body of a POST to `path`.
    pub async fn execute_upload(
        &self,
        envelope: EnvelopeKeys,
        path: &PathSpec,
        file: &Path,
    ) -> Result<RequestOutcome, RequestError> {
        tokio::fs::metadata(file)
            .await
            .map_err(|source| RequestError::Upload {
                path: file.to_path_buf(),
                source,
            })?;

        let url = assemble_url(self.config.remote_uri(), path)?;
        let request = auth::upload_request(&self.config, url)?.with_file_body(file);

        self.send(envelope, request).await
    }

    async fn send(
        &self,
        envelope: EnvelopeKeys,
        request: HttpRequest,
    ) -> Result<RequestOutcome, RequestError> {
        self.handler
            .on_event(&ClientEvent::RequestAboutToBeSent { request: &request });

        let url = request.url.clone();
        let response = match self.http_client.execute(request.clone()).await {
            Ok(response) => response,
            Err(error) => {
                self.handler.on_event(&ClientEvent::TransportError {
                    error: &error,
                    request: &request,
                });
                return Err(error.into());
            }
        };

        let result = classify(
            &response,
            &url,
            self.config.encoding(),
            self.handler.as_ref(),
        )?;
        let body = envelope.unwrap_body(result.as_ref());

        Ok(RequestOutcome {
            status: response.status,
            body,
            response,
            result,
            url,
        })
    }
}

/// Adapts the core to [`PageSource`] for one resource's envelope.
struct CorePages<'c> {
    core: &'c RequestCore,
    envelope: EnvelopeKeys,
}

impl PageSource for CorePages<'_> {
    fn fetch<'a>(
        &'a self,
        method: HttpMethod,
        path: PathSpec,
    ) -> Pin<Box<dyn Future<Output = Result<RequestOutcome, RequestError>> + Send + 'a>> {
        Box::pin(async move { self.core.execute(self.envelope, method, &path, None).await })
    }
}

impl RequestCapable for RequestCore {
    fn request<'a>(
        &'a self,
        envelope: EnvelopeKeys,
        method: HttpMethod,
        path: PathSpec,
        body: Option<Value>,
    ) -> Pin<Box<dyn Future<Output = Result<RequestOutcome, RequestError>> + Send + 'a>> {
        Box::pin(async move { self.execute(envelope, method, &path, body.as_ref()).await })
    }

    fn request_pages<'a>(
        &'a self,
        envelope: EnvelopeKeys,
        method: HttpMethod,
        path: PathSpec,
        limit: RecordLimit,
    ) -> Pin<Box<dyn Future<Output = Result<PagedOutcome, RequestError>> + Send + 'a>> {
        Box::pin(async move {
            let pages = CorePages {
                core: self,
                envelope,
            };
            let handler = self.handler.as_ref();

            match self.throttle() {
                Some(throttle) => {
                    let throttled = Throttled::new(pages, throttle, handler);
                    paginate(&throttled, handler, method, path, limit).await
                }
                None => paginate(&pages, handler, method, path, limit).await,
            }
        })
    }

    fn upload<'a>(
        &'a self,
        envelope: EnvelopeKeys,
        path: PathSpec,
        file: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<RequestOutcome, RequestError>> + Send + 'a>> {
        Box::pin(async move { self.execute_upload(envelope, &path, file).await })
    }
}
