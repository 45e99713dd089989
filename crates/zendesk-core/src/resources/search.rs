use crate::client::{Resource, Zendesk};
use crate::error::ClientError;
use crate::http_client::HttpMethod;
use crate::pagination::PagedOutcome;
use crate::response::{EnvelopeKeys, RequestOutcome};
use crate::url::PathSpec;

pub const SEARCH_ENVELOPE: EnvelopeKeys = EnvelopeKeys::new(&["results"]);

/// Search API.
#[derive(Clone, Copy)]
pub struct Search<'a> {
    resource: Resource<'a>,
}

impl<'a> Search<'a> {
    pub fn new(client: &'a Zendesk) -> Self {
        Self {
            resource: client.resource(SEARCH_ENVELOPE),
        }
    }

    /// First page of results only.
    pub async fn query(&self, term: &str) -> Result<RequestOutcome, ClientError> {
        self.resource
            .request(HttpMethod::Get, query_path(&["search"], term), None)
            .await
    }

    pub async fn query_n(
        &self,
        term: &str,
        max_records: usize,
    ) -> Result<PagedOutcome, ClientError> {
        self.resource
            .request_n(HttpMethod::Get, query_path(&["search"], term), max_records)
            .await
    }

    pub async fn query_all(&self, term: &str) -> Result<PagedOutcome, ClientError> {
        self.resource
            .request_all(HttpMethod::Get, query_path(&["search"], term))
            .await
    }

    /// Help-center search that does not require an agent account.
    pub async fn query_anonymous(&self, term: &str) -> Result<RequestOutcome, ClientError> {
        self.resource
            .request(HttpMethod::Get, query_path(&["portal", "search"], term), None)
            .await
    }

    /// Every page of help-center results.
    pub async fn query_anonymous_all(&self, term: &str) -> Result<PagedOutcome, ClientError> {
        self.resource
            .request_all(HttpMethod::Get, query_path(&["portal", "search"], term))
            .await
    }
}

fn query_path(segments: &[&str], term: &str) -> PathSpec {
    PathSpec::segments(segments.iter().copied()).with_query([("query", term)])
}
