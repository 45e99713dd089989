use serde_json::{json, Value};

use crate::client::{Resource, Zendesk};
use crate::error::ClientError;
use crate::http_client::HttpMethod;
use crate::pagination::PagedOutcome;
use crate::response::{EnvelopeKeys, RequestOutcome};
use crate::url::{PathPart, PathSpec};

/// `views` and `view` payloads, plus `tickets` for `GET /views/{id}/tickets`.
pub const VIEWS_ENVELOPE: EnvelopeKeys = EnvelopeKeys::new(&["views", "view", "tickets"]);

/// Ticket views.
#[derive(Clone, Copy)]
pub struct Views<'a> {
    resource: Resource<'a>,
}

impl<'a> Views<'a> {
    pub fn new(client: &'a Zendesk) -> Self {
        Self {
            resource: client.resource(VIEWS_ENVELOPE),
        }
    }

    pub async fn list(&self) -> Result<PagedOutcome, ClientError> {
        self.resource
            .request_all(HttpMethod::Get, PathSpec::segments(["views"]))
            .await
    }

    pub async fn list_n(&self, max_records: usize) -> Result<PagedOutcome, ClientError> {
        self.resource
            .request_n(HttpMethod::Get, PathSpec::segments(["views"]), max_records)
            .await
    }

    pub async fn list_active(&self) -> Result<PagedOutcome, ClientError> {
        self.resource
            .request_all(HttpMethod::Get, PathSpec::segments(["views", "active"]))
            .await
    }

    /// Compacted list of shared and personal views for the current user.
    pub async fn list_compact(&self) -> Result<PagedOutcome, ClientError> {
        self.resource
            .request_all(HttpMethod::Get, PathSpec::segments(["views", "compact"]))
            .await
    }

    pub async fn show(&self, view_id: u64) -> Result<RequestOutcome, ClientError> {
        self.resource
            .request(HttpMethod::Get, view_path(view_id, &[]), None)
            .await
    }

    pub async fn create(&self, view: Value) -> Result<RequestOutcome, ClientError> {
        self.resource
            .request(HttpMethod::Post, PathSpec::segments(["views"]), Some(view))
            .await
    }

    pub async fn update(&self, view_id: u64, view: Value) -> Result<RequestOutcome, ClientError> {
        self.resource
            .request(HttpMethod::Put, view_path(view_id, &[]), Some(view))
            .await
    }

    /// Run a view; `params` becomes the query string (sort order, grouping).
    pub async fn execute(
        &self,
        view_id: u64,
        params: serde_json::Map<String, Value>,
    ) -> Result<PagedOutcome, ClientError> {
        let mut parts = view_parts(view_id, &["execute"]);
        parts.push(PathPart::Query(params));
        self.resource
            .request_all(HttpMethod::Get, PathSpec::Parts(parts))
            .await
    }

    pub async fn tickets(&self, view_id: u64) -> Result<PagedOutcome, ClientError> {
        self.resource
            .request_all(HttpMethod::Get, view_path(view_id, &["tickets"]))
            .await
    }

    pub async fn tickets_n(
        &self,
        view_id: u64,
        max_records: usize,
    ) -> Result<PagedOutcome, ClientError> {
        self.resource
            .request_n(HttpMethod::Get, view_path(view_id, &["tickets"]), max_records)
            .await
    }

    pub async fn preview(&self, params: Value) -> Result<RequestOutcome, ClientError> {
        self.resource
            .request(
                HttpMethod::Post,
                PathSpec::segments(["views", "preview"]),
                Some(params),
            )
            .await
    }

    pub async fn show_count(&self, view_id: u64) -> Result<RequestOutcome, ClientError> {
        self.resource
            .request(HttpMethod::Get, view_path(view_id, &["count"]), None)
            .await
    }

    pub async fn show_counts(&self, view_ids: &[u64]) -> Result<RequestOutcome, ClientError> {
        let path = PathSpec::segments(["views", "count_many"]).with_query([("ids", json!(view_ids))]);
        self.resource.request(HttpMethod::Get, path, None).await
    }

    pub async fn export(&self, view_id: u64) -> Result<RequestOutcome, ClientError> {
        self.resource
            .request(HttpMethod::Get, view_path(view_id, &["export"]), None)
            .await
    }
}

fn view_parts(view_id: u64, suffix: &[&str]) -> Vec<PathPart> {
    let mut parts = vec![PathPart::from("views"), PathPart::from(view_id)];
    parts.extend(suffix.iter().copied().map(PathPart::from));
    parts
}

fn view_path(view_id: u64, suffix: &[&str]) -> PathSpec {
    PathSpec::Parts(view_parts(view_id, suffix))
}
