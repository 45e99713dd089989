// Shared fixtures for the zendesk-core behaviour tests

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use zendesk_core::{
    ClientConfig, HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, Zendesk,
};

pub const REMOTE: &str = "https://acme.zendesk.com/api/v2";

/// In-memory transport that replays canned responses in order and records
/// every request it is handed.
pub struct ScriptedHttpClient {
    responses: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    pub fn new(responses: Vec<Result<HttpResponse, HttpError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn recorded_requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .clone()
    }

    pub fn recorded_urls(&self) -> Vec<String> {
        self.recorded_requests()
            .into_iter()
            .map(|request| request.url)
            .collect()
    }

    pub fn recorded_methods(&self) -> Vec<HttpMethod> {
        self.recorded_requests()
            .iter()
            .map(|request| request.method)
            .collect()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .push(request);
        let response = self
            .responses
            .lock()
            .expect("response script should not be poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(HttpError::new("script exhausted")));
        Box::pin(async move { response })
    }
}

/// Façade over a scripted transport with only the built-in logging handler.
pub fn client_with(config: ClientConfig, http: Arc<ScriptedHttpClient>) -> Zendesk {
    Zendesk::builder(config)
        .http_client(http)
        .build()
        .expect("client should build")
}
