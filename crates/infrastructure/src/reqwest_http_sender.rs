use async_trait::async_trait;
use soxguard_application::{HttpResponse, HttpSender, OutboundRequest};
use soxguard_core::{AppError, AppResult};
use soxguard_domain::HttpMethod;

/// `reqwest`-backed HTTP sender.
///
/// Headers come only from the request value; the shared client carries none.
#[derive(Clone)]
pub struct ReqwestHttpSender {
    http_client: reqwest::Client,
}

impl ReqwestHttpSender {
    /// Creates a sender over an existing client.
    #[must_use]
    pub fn new(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl HttpSender for ReqwestHttpSender {
    async fn send(&self, request: OutboundRequest) -> AppResult<HttpResponse> {
        let method = match request.method {
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Get => reqwest::Method::GET,
        };

        let mut builder = self.http_client.request(method, request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|error| {
            AppError::Transport(format!(
                "{} {} failed: {error}",
                request.method.as_str(),
                request.url
            ))
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|error| {
            AppError::Transport(format!(
                "{} {} returned {status} but the body could not be read: {error}",
                request.method.as_str(),
                request.url
            ))
        })?;

        Ok(HttpResponse::new(status, body))
    }
}
