use async_trait::async_trait;
use chrono::{DateTime, Utc};
use soxguard_core::AppResult;
use soxguard_domain::HttpMethod;

/// Bearer token returned by a token provider.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    token: String,
    expires_on: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Creates a token without expiry information.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            expires_on: None,
        }
    }

    /// Attaches the expiry reported by the issuer.
    #[must_use]
    pub fn with_expires_on(mut self, expires_on: DateTime<Utc>) -> Self {
        self.expires_on = Some(expires_on);
        self
    }

    /// Returns the raw bearer token.
    #[must_use]
    pub fn secret(&self) -> &str {
        self.token.as_str()
    }

    /// Returns the expiry reported by the issuer, if any.
    #[must_use]
    pub fn expires_on(&self) -> Option<DateTime<Utc>> {
        self.expires_on
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

/// Port for bearer token acquisition.
///
/// Called once per outbound request; implementations that want caching must
/// provide it themselves.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns a token valid for the requested scopes.
    ///
    /// Failures should be reported as `AppError::Unauthorized`.
    async fn get_token(&self, scopes: &[String]) -> AppResult<AccessToken>;
}

/// Fully prepared HTTP request with its own header set.
#[derive(Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Absolute URL.
    pub url: String,
    /// Headers sent with this request only.
    pub headers: Vec<(String, String)>,
    /// UTF-8 JSON body.
    pub body: Option<String>,
}

impl OutboundRequest {
    /// Returns the first header value matching `name`, ignoring ASCII case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

impl std::fmt::Debug for OutboundRequest {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let header_names: Vec<&str> = self.headers.iter().map(|(key, _)| key.as_str()).collect();
        formatter
            .debug_struct("OutboundRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &header_names)
            .field("body", &self.body)
            .finish()
    }
}

/// Response returned by the HTTP sender for any status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: String,
}

impl HttpResponse {
    /// Creates a response value.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns whether the status is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Port for raw HTTP exchange.
#[async_trait]
pub trait HttpSender: Send + Sync {
    /// Sends one request and returns the response whatever its status.
    ///
    /// Failures before a status is received are `AppError::Transport`.
    async fn send(&self, request: OutboundRequest) -> AppResult<HttpResponse>;
}
