//! Response classification and envelope unwrapping.

use serde_json::Value;

use crate::error::RequestError;
use crate::events::{ClientEvent, EventHandler};
use crate::http_client::HttpResponse;

/// Status codes treated as failures, with their human-readable reasons.
pub const FAIL_CODES: [(u16, &str); 10] = [
    (400, "Bad Request"),
    (401, "Not Authorized"),
    (403, "Forbidden"),
    (404, "Item not found"),
    (405, "Method not Allowed"),
    (409, "Conflict"),
    (422, "Unprocessable Entity"),
    (429, "Too Many Requests"),
    (500, "Internal Server Error"),
    (503, "Service Unavailable"),
];

pub const MAX_ENVELOPE_KEYS: usize = 3;

pub fn failure_reason(status: u16) -> Option<&'static str> {
    FAIL_CODES
        .iter()
        .find(|(code, _)| *code == status)
        .map(|(_, reason)| *reason)
}

/// Ordered JSON keys under which a resource nests its payload.
///
/// Only the first [`MAX_ENVELOPE_KEYS`] keys are consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnvelopeKeys {
    keys: &'static [&'static str],
}

impl EnvelopeKeys {
    pub const fn new(keys: &'static [&'static str]) -> Self {
        Self { keys }
    }

    pub const fn none() -> Self {
        Self { keys: &[] }
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.keys.iter().copied().take(MAX_ENVELOPE_KEYS)
    }

    /// Extract the payload: the first non-null envelope key wins, otherwise
    /// the whole parsed result. No parsed result yields an empty string.
    pub fn unwrap_body(&self, parsed: Option<&Value>) -> Value {
        let Some(parsed) = parsed else {
            return Value::String(String::new());
        };

        self.keys()
            .find_map(|key| parsed.get(key).filter(|value| !value.is_null()))
            .unwrap_or(parsed)
            .clone()
    }
}

/// Normalized result of one successful request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOutcome {
    pub status: u16,
    /// Payload extracted with the caller's [`EnvelopeKeys`].
    pub body: Value,
    pub response: HttpResponse,
    /// Full parsed JSON document, absent when the body was not JSON.
    pub result: Option<Value>,
    pub url: String,
}

impl RequestOutcome {
    /// `next_page` cursor of the parsed result, if any.
    pub fn next_page(&self) -> Option<&str> {
        self.result
            .as_ref()
            .and_then(|result| result.get("next_page"))
            .and_then(Value::as_str)
            .filter(|cursor| !cursor.is_empty())
    }
}

/// Classify a raw response into a parsed result or a structured error.
///
/// A body that is not valid JSON is reported through
/// [`ClientEvent::MalformedBody`] and otherwise treated as "no parsed
/// result"; it is not an error on its own.
pub fn classify(
    response: &HttpResponse,
    url: &str,
    encoding: Option<&str>,
    handler: &dyn EventHandler,
) -> Result<Option<Value>, RequestError> {
    if response.body.is_empty() {
        return Err(RequestError::EmptyResult);
    }

    let parsed = match serde_json::from_slice::<Value>(&response.body) {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        Err(error) => {
            let rendered = render_body(&response.body, encoding);
            handler.on_event(&ClientEvent::MalformedBody {
                status: response.status,
                url,
                error: &error,
                rendered: &rendered,
            });
            None
        }
    };

    handler.on_event(&ClientEvent::ResponseReceived {
        status: response.status,
        body: &response.body,
    });

    if let Some(retry_after) = response.header("retry-after").filter(|v| !v.is_empty()) {
        return Err(RequestError::RateLimited {
            retry_after: retry_after.to_owned(),
            result: response.body.clone(),
        });
    }

    if let Some(reason) = failure_reason(response.status) {
        return Err(RequestError::Status {
            status: response.status,
            reason,
            result: response.body.clone(),
        });
    }

    Ok(parsed)
}

/// Render raw bytes as text for diagnostics.
///
/// UTF-8 encodings decode lossily; anything else maps one byte to one char so
/// binary or Latin-1 bodies stay readable.
pub fn render_body(body: &[u8], encoding: Option<&str>) -> String {
    match encoding.map(str::to_ascii_lowercase).as_deref() {
        Some("utf8" | "utf-8") => String::from_utf8_lossy(body).into_owned(),
        _ => body.iter().map(|byte| char::from(*byte)).collect(),
    }
}
