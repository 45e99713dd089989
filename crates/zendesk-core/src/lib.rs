//! # Zendesk Core
//!
//! Shared REST request engine underneath the Zendesk resource wrappers.
//!
//! ## Overview
//!
//! Resource wrappers only pick an HTTP method, a path and an optional body.
//! This crate does the rest:
//!
//! - **URL assembly** from path segments and trailing query data
//! - **Authorization** via basic credentials, API tokens or OAuth bearer tokens
//! - **Response classification** into success, structured error or rate limit
//! - **Envelope unwrapping** with per-resource key lists
//! - **Cursor pagination** across `next_page` links with an optional record cap
//! - **Throttling** of paginated runs under a client-side quota
//! - **File upload** streaming
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`auth`] | Authorization and default headers |
//! | [`client`] | [`Zendesk`] façade and [`Resource`] handles |
//! | [`config`] | Resolved client configuration |
//! | [`error`] | Error types |
//! | [`events`] | Observer surface for diagnostics |
//! | [`executor`] | [`RequestCore`] and the [`RequestCapable`] contract |
//! | [`http_client`] | Transport abstraction and reqwest implementation |
//! | [`pagination`] | Cursor-following driver |
//! | [`resources`] | Thin resource wrappers |
//! | [`response`] | Classification and envelope unwrapping |
//! | [`throttling`] | Client-side rate limiting |
//! | [`url`] | Request URL assembly |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use zendesk_core::{ClientConfig, Zendesk};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::new("https://acme.zendesk.com/api/v2", "agent@acme.test")
//!     .with_token("api-token");
//! let client = Zendesk::new(config)?;
//!
//! let active = client.views().list_active().await?;
//! println!("{} active views", active.records.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use zendesk_core::{ClientError, RequestError};
//!
//! fn handle(error: &ClientError) {
//!     match error.inner() {
//!         RequestError::RateLimited { retry_after, .. } => {
//!             // wait `retry_after` seconds
//!             let _ = retry_after;
//!         }
//!         RequestError::Status { status, .. } => {
//!             let _ = status;
//!         }
//!         _ => {}
//!     }
//! }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod executor;
pub mod http_client;
pub mod pagination;
pub mod resources;
pub mod response;
pub mod throttling;
pub mod url;

pub use client::{Resource, Zendesk, ZendeskBuilder};

pub use config::{ClientConfig, ThrottleConfig};

pub use error::{ClientError, ConfigError, RequestError};

pub use events::{
    ClientEvent, CompositeEventHandler, EventHandler, FnEventHandler, LoggingHandler, NoopHandler,
};

pub use executor::{RequestCapable, RequestCore};

pub use http_client::{
    HttpAuth, HttpBody, HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse,
    ReqwestHttpClient,
};

pub use pagination::{
    paginate, should_fetch_next, PageAccumulator, PageSource, PagedOutcome, RecordLimit, Throttled,
};

pub use resources::{Search, Views};

pub use response::{EnvelopeKeys, RequestOutcome};

pub use throttling::Throttle;

pub use url::{assemble_url, PathPart, PathSpec};
