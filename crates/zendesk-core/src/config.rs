//! Resolved client configuration.
//!
//! [`ClientConfig`] is a plain value handed to the client at construction
//! time. It can be built programmatically or deserialized from a JSON config
//! file using its camelCase keys (`remoteUri`, `no-cookies`, and so on).

use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

const DEFAULT_TIMEOUT_MS: u64 = 240_000;

/// Client-side rate limit: at most `limit` requests per `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ThrottleConfig {
    pub limit: u32,
    /// Window length in milliseconds.
    #[serde(rename = "window")]
    pub window_ms: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            limit: 200,
            window_ms: 60_000,
        }
    }
}

impl ThrottleConfig {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window_ms: u64::try_from(window.as_millis()).unwrap_or(u64::MAX),
        }
    }

    pub const fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limit == 0 {
            return Err(ConfigError::ZeroThrottleLimit);
        }
        if self.window_ms == 0 {
            return Err(ConfigError::ZeroThrottleWindow);
        }
        Ok(())
    }
}

/// Read-only view of everything the request core needs.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    remote_uri: String,
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    oauth: bool,
    #[serde(default)]
    proxy: Option<String>,
    /// Per-request timeout in milliseconds.
    #[serde(default)]
    timeout: Option<u64>,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    throttle: Option<ThrottleConfig>,
    #[serde(default, rename = "no-cookies")]
    no_cookies: bool,
}

impl ClientConfig {
    pub fn new(remote_uri: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            remote_uri: remote_uri.into(),
            username: username.into(),
            password: None,
            token: None,
            oauth: false,
            proxy: None,
            timeout: None,
            encoding: None,
            throttle: None,
            no_cookies: false,
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|error| ConfigError::Parse(error.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_oauth(mut self, oauth: bool) -> Self {
        self.oauth = oauth;
        self
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }

    pub fn with_throttle(mut self, throttle: ThrottleConfig) -> Self {
        self.throttle = Some(throttle);
        self
    }

    pub fn with_no_cookies(mut self, no_cookies: bool) -> Self {
        self.no_cookies = no_cookies;
        self
    }

    pub fn remote_uri(&self) -> &str {
        &self.remote_uri
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> Option<&str> {
        non_empty(self.password.as_deref())
    }

    pub fn token(&self) -> Option<&str> {
        non_empty(self.token.as_deref())
    }

    pub const fn oauth(&self) -> bool {
        self.oauth
    }

    pub fn proxy(&self) -> Option<&str> {
        non_empty(self.proxy.as_deref())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms())
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout.filter(|ms| *ms > 0).unwrap_or(DEFAULT_TIMEOUT_MS)
    }

    pub fn encoding(&self) -> Option<&str> {
        non_empty(self.encoding.as_deref())
    }

    pub const fn throttle(&self) -> Option<ThrottleConfig> {
        self.throttle
    }

    pub const fn no_cookies(&self) -> bool {
        self.no_cookies
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.remote_uri.trim().is_empty() {
            return Err(ConfigError::MissingRemoteUri);
        }

        if self.oauth {
            if self.token().is_none() {
                return Err(ConfigError::OAuthWithoutToken);
            }
        } else {
            if self.username.trim().is_empty() {
                return Err(ConfigError::MissingUsername);
            }
            if self.password().is_none() && self.token().is_none() {
                return Err(ConfigError::MissingCredentials);
            }
        }

        if let Some(throttle) = &self.throttle {
            throttle.validate()?;
        }

        Ok(())
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let masked = |secret: &Option<String>| secret.as_ref().map(|_| "***");

        f.debug_struct("ClientConfig")
            .field("remote_uri", &self.remote_uri)
            .field("username", &self.username)
            .field("password", &masked(&self.password))
            .field("token", &masked(&self.token))
            .field("oauth", &self.oauth)
            .field("proxy", &self.proxy)
            .field("timeout", &self.timeout)
            .field("encoding", &self.encoding)
            .field("throttle", &self.throttle)
            .field("no_cookies", &self.no_cookies)
            .finish()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}
