use std::sync::Arc;

use soxguard_core::{AppError, AppResult, RemoteRequestFailure};
use soxguard_domain::{ControlPlaneEndpoint, GovernanceRequest, HttpMethod};
use tracing::debug;

use crate::control_plane_ports::{
    AccessToken, HttpResponse, HttpSender, OutboundRequest, TokenProvider,
};

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Authenticated REST transport for the resource-management control plane.
///
/// Every call fetches a fresh token and builds its own header set, so one
/// client can be shared between concurrent governance runs.
#[derive(Clone)]
pub struct ControlPlaneClient {
    endpoint: ControlPlaneEndpoint,
    token_provider: Arc<dyn TokenProvider>,
    http_sender: Arc<dyn HttpSender>,
}

impl ControlPlaneClient {
    /// Creates a control-plane client.
    #[must_use]
    pub fn new(
        endpoint: ControlPlaneEndpoint,
        token_provider: Arc<dyn TokenProvider>,
        http_sender: Arc<dyn HttpSender>,
    ) -> Self {
        Self {
            endpoint,
            token_provider,
            http_sender,
        }
    }

    /// Returns the endpoint requests are addressed to.
    #[must_use]
    pub fn endpoint(&self) -> &ControlPlaneEndpoint {
        &self.endpoint
    }

    /// Sends a PUT with a UTF-8 JSON body.
    pub async fn put(&self, url: &str, json_body: &str) -> AppResult<HttpResponse> {
        self.dispatch(HttpMethod::Put, url, Some(json_body)).await
    }

    /// Sends a GET.
    pub async fn get(&self, url: &str) -> AppResult<HttpResponse> {
        self.dispatch(HttpMethod::Get, url, None).await
    }

    /// Sends a prepared governance request.
    pub async fn send(&self, request: &GovernanceRequest) -> AppResult<HttpResponse> {
        self.dispatch(request.method(), request.url(), request.body())
            .await
    }

    /// Sends a prepared governance request and turns non-2xx responses into
    /// `AppError::RemoteRequest`.
    pub async fn send_expecting_success(
        &self,
        request: &GovernanceRequest,
    ) -> AppResult<HttpResponse> {
        let response = self.send(request).await?;
        if response.is_success() {
            return Ok(response);
        }

        Err(RemoteRequestFailure::new(
            request.method().as_str(),
            request.url(),
            response.status,
            response.body,
            request.body().map(str::to_owned),
        )
        .into())
    }

    async fn dispatch(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<&str>,
    ) -> AppResult<HttpResponse> {
        let token = self.acquire_token().await?;
        let request = OutboundRequest {
            method,
            url: url.to_owned(),
            headers: self.request_headers(&token, body.is_some()),
            body: body.map(str::to_owned),
        };

        let response = self.http_sender.send(request).await?;
        debug!(
            method = method.as_str(),
            url = url,
            status = response.status,
            "control plane call completed"
        );

        Ok(response)
    }

    async fn acquire_token(&self) -> AppResult<AccessToken> {
        let scopes = [self.endpoint.token_scope()];
        self.token_provider
            .get_token(&scopes)
            .await
            .map_err(|error| match error {
                AppError::Unauthorized(_) => error,
                other => AppError::Unauthorized(format!("token acquisition failed: {other}")),
            })
    }

    fn request_headers(&self, token: &AccessToken, has_body: bool) -> Vec<(String, String)> {
        let mut headers = vec![
            (
                "Authorization".to_owned(),
                format!("Bearer {}", token.secret()),
            ),
            ("Host".to_owned(), self.endpoint.host().to_owned()),
        ];

        if has_body {
            headers.push(("Content-Type".to_owned(), JSON_CONTENT_TYPE.to_owned()));
        }

        headers
    }
}
