//! Top-level client façade.
//!
//! [`Zendesk`] owns one [`RequestCore`] and hands out resource wrappers that
//! borrow it. Every failure leaving the façade is wrapped once into a
//! [`ClientError`] and also reported as [`ClientEvent::Error`], so a caller
//! that ignores the returned error still sees it in the logs.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{ClientError, ConfigError, RequestError};
use crate::events::{ClientEvent, CompositeEventHandler, EventHandler, LoggingHandler};
use crate::executor::{RequestCapable, RequestCore};
use crate::http_client::{HttpClient, HttpMethod, ReqwestHttpClient};
use crate::pagination::PagedOutcome;
use crate::resources::{Search, Views};
use crate::response::{EnvelopeKeys, RequestOutcome};
use crate::url::PathSpec;

pub struct Zendesk {
    core: Arc<dyn RequestCapable>,
    handler: Arc<dyn EventHandler>,
}

impl Zendesk {
    /// Client backed by reqwest that logs through `tracing`.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        Self::builder(config).build()
    }

    pub fn builder(config: ClientConfig) -> ZendeskBuilder {
        ZendeskBuilder {
            config,
            http_client: None,
            handler: None,
        }
    }

    /// Façade over an existing core, e.g. one shared between clients.
    pub fn from_core(core: Arc<dyn RequestCapable>, handler: Arc<dyn EventHandler>) -> Self {
        Self { core, handler }
    }

    /// Generic handle for a resource whose payload lives under `envelope`.
    pub fn resource(&self, envelope: EnvelopeKeys) -> Resource<'_> {
        Resource {
            client: self,
            envelope,
        }
    }

    pub fn views(&self) -> Views<'_> {
        Views::new(self)
    }

    pub fn search(&self) -> Search<'_> {
        Search::new(self)
    }

    fn fail(&self, error: RequestError) -> ClientError {
        let error = ClientError::from(error);
        self.handler.on_event(&ClientEvent::Error { error: &error });
        error
    }
}

pub struct ZendeskBuilder {
    config: ClientConfig,
    http_client: Option<Arc<dyn HttpClient>>,
    handler: Option<Box<dyn EventHandler>>,
}

impl ZendeskBuilder {
    /// Replace the reqwest transport.
    pub fn http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// Observe events in addition to the built-in `tracing` logging.
    pub fn event_handler(mut self, handler: impl EventHandler + 'static) -> Self {
        self.handler = Some(Box::new(handler));
        self
    }

    pub fn build(self) -> Result<Zendesk, ConfigError> {
        self.config.validate()?;

        let http_client = match self.http_client {
            Some(http_client) => http_client,
            None => Arc::new(ReqwestHttpClient::from_config(&self.config)?),
        };

        let mut handler = CompositeEventHandler::new().with(LoggingHandler);
        if let Some(extra) = self.handler {
            handler = handler.with_boxed(extra);
        }
        let handler: Arc<dyn EventHandler> = Arc::new(handler);

        let core = RequestCore::new(self.config, http_client, Arc::clone(&handler));
        Ok(Zendesk::from_core(Arc::new(core), handler))
    }
}

/// Borrowed handle pairing the client with one resource's envelope keys.
#[derive(Clone, Copy)]
pub struct Resource<'a> {
    client: &'a Zendesk,
    envelope: EnvelopeKeys,
}

impl Resource<'_> {
    pub const fn envelope(&self) -> EnvelopeKeys {
        self.envelope
    }

    pub async fn request(
        &self,
        method: HttpMethod,
        path: impl Into<PathSpec>,
        body: Option<Value>,
    ) -> Result<RequestOutcome, ClientError> {
        self.client
            .core
            .request(self.envelope, method, path.into(), body)
            .await
            .map_err(|error| self.client.fail(error))
    }

    pub async fn request_all(
        &self,
        method: HttpMethod,
        path: impl Into<PathSpec>,
    ) -> Result<PagedOutcome, ClientError> {
        self.client
            .core
            .request_all(self.envelope, method, path.into())
            .await
            .map_err(|error| self.client.fail(error))
    }

    pub async fn request_n(
        &self,
        method: HttpMethod,
        path: impl Into<PathSpec>,
        max_records: usize,
    ) -> Result<PagedOutcome, ClientError> {
        self.client
            .core
            .request_n(self.envelope, method, path.into(), max_records)
            .await
            .map_err(|error| self.client.fail(error))
    }

    pub async fn upload(
        &self,
        path: impl Into<PathSpec>,
        file: &Path,
    ) -> Result<RequestOutcome, ClientError> {
        self.client
            .core
            .upload(self.envelope, path.into(), file)
            .await
            .map_err(|error| self.client.fail(error))
    }
}
