//! Authorization and default request headers.

use crate::config::ClientConfig;
use crate::error::ConfigError;
use crate::http_client::{HttpAuth, HttpMethod, HttpRequest};

pub const JSON_CONTENT_TYPE: &str = "application/json";

pub fn user_agent() -> String {
    format!("zendesk-core/{} (rust)", env!("CARGO_PKG_VERSION"))
}

impl HttpAuth {
    /// Pick the credential scheme for a resolved configuration.
    ///
    /// `oauth` forces a bearer token. Otherwise a password wins over an API
    /// token when both are configured.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        if config.oauth() {
            let token = config.token().ok_or(ConfigError::OAuthWithoutToken)?;
            return Ok(Self::BearerToken(token.to_owned()));
        }

        let username = config.username().to_owned();
        if let Some(password) = config.password() {
            return Ok(Self::Basic {
                username,
                password: password.to_owned(),
            });
        }

        config
            .token()
            .map(|token| Self::ApiToken {
                username,
                token: token.to_owned(),
            })
            .ok_or(ConfigError::MissingCredentials)
    }
}

/// Request skeleton with JSON defaults and authorization applied.
///
/// Non-GET requests without a body get `{}` so the remote does not reject an
/// empty JSON payload.
pub fn json_request(
    config: &ClientConfig,
    method: HttpMethod,
    url: String,
    body: Option<String>,
) -> Result<HttpRequest, ConfigError> {
    let auth = HttpAuth::from_config(config)?;
    let request = HttpRequest::new(method, url)
        .with_header("content-type", JSON_CONTENT_TYPE)
        .with_header("accept", JSON_CONTENT_TYPE)
        .with_header("user-agent", user_agent())
        .with_auth(&auth)
        .with_timeout_ms(config.timeout_ms());

    let request = match body {
        Some(body) => request.with_json_body(body),
        None if method != HttpMethod::Get
            && request.header("content-type") == Some(JSON_CONTENT_TYPE) =>
        {
            request.with_json_body("{}")
        }
        None => request,
    };

    Ok(request)
}

/// Upload requests carry only the authorization header.
pub fn upload_request(config: &ClientConfig, url: String) -> Result<HttpRequest, ConfigError> {
    let auth = HttpAuth::from_config(config)?;
    Ok(HttpRequest::new(HttpMethod::Post, url)
        .with_auth(&auth)
        .with_timeout_ms(config.timeout_ms()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::HttpBody;

    fn config() -> ClientConfig {
        ClientConfig::new("https://acme.zendesk.com/api/v2", "agent@acme.test")
    }

    #[test]
    fn oauth_uses_bearer_even_with_password() {
        let auth = HttpAuth::from_config(&config().with_password("pw").with_token("tok").with_oauth(true))
            .expect("valid auth");

        assert_eq!(auth, HttpAuth::BearerToken(String::from("tok")));
    }

    #[test]
    fn password_takes_priority_over_token() {
        let auth = HttpAuth::from_config(&config().with_password("pw").with_token("tok"))
            .expect("valid auth");

        assert!(matches!(auth, HttpAuth::Basic { ref password, .. } if password == "pw"));
    }

    #[test]
    fn token_is_used_without_password() {
        let auth = HttpAuth::from_config(&config().with_token("tok")).expect("valid auth");

        assert!(matches!(auth, HttpAuth::ApiToken { ref token, .. } if token == "tok"));
    }

    #[test]
    fn missing_credentials_is_an_error() {
        assert_eq!(
            HttpAuth::from_config(&config()),
            Err(ConfigError::MissingCredentials)
        );
    }

    #[test]
    fn json_defaults_are_applied() {
        let request = json_request(
            &config().with_token("tok"),
            HttpMethod::Get,
            String::from("https://acme.zendesk.com/api/v2/views.json"),
            None,
        )
        .expect("valid request");

        assert_eq!(request.header("content-type"), Some(JSON_CONTENT_TYPE));
        assert_eq!(request.header("accept"), Some(JSON_CONTENT_TYPE));
        assert!(request
            .header("user-agent")
            .is_some_and(|agent| agent.starts_with("zendesk-core/")));
        assert!(request.header("authorization").is_some());
        assert_eq!(request.body, None);
        assert_eq!(request.timeout_ms, 240_000);
    }

    #[test]
    fn non_get_without_body_defaults_to_empty_object() {
        let request = json_request(
            &config().with_token("tok"),
            HttpMethod::Put,
            String::from("https://acme.zendesk.com/api/v2/views/1.json"),
            None,
        )
        .expect("valid request");

        assert_eq!(request.body, Some(HttpBody::Json(String::from("{}"))));
    }

    #[test]
    fn upload_request_has_no_json_defaults() {
        let request = upload_request(
            &config().with_password("pw"),
            String::from("https://acme.zendesk.com/api/v2/uploads.json"),
        )
        .expect("valid request");

        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.header("content-type"), None);
        assert!(request.header("authorization").is_some());
    }
}
