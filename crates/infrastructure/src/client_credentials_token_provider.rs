use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::header;
use serde::Deserialize;
use soxguard_application::{AccessToken, TokenProvider};
use soxguard_core::{AppError, AppResult};
use tracing::warn;
use url::Url;
use url::form_urlencoded;

/// Microsoft Entra ID authority for the public cloud.
pub const AZURE_PUBLIC_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

#[derive(Debug, Deserialize)]
struct TokenEndpointResponse {
    access_token: String,
    expires_in: Option<i64>,
}

/// OAuth2 client-credentials token provider for a service principal.
///
/// Requests a new token on every call.
#[derive(Clone)]
pub struct ClientCredentialsTokenProvider {
    http_client: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl ClientCredentialsTokenProvider {
    /// Creates a provider for `{authority_host}/{tenant_id}/oauth2/v2.0/token`.
    pub fn new(
        http_client: reqwest::Client,
        authority_host: &str,
        tenant_id: &str,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> AppResult<Self> {
        let mut token_url = Url::parse(authority_host).map_err(|error| {
            AppError::Validation(format!(
                "invalid authority host '{authority_host}': {error}"
            ))
        })?;

        token_url
            .path_segments_mut()
            .map_err(|()| {
                AppError::Validation(format!(
                    "authority host '{authority_host}' cannot carry a path"
                ))
            })?
            .pop_if_empty()
            .extend([tenant_id, "oauth2", "v2.0", "token"]);

        Ok(Self {
            http_client,
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        })
    }

    /// Returns the token endpoint URL.
    #[must_use]
    pub fn token_url(&self) -> &str {
        self.token_url.as_str()
    }
}

#[async_trait]
impl TokenProvider for ClientCredentialsTokenProvider {
    async fn get_token(&self, scopes: &[String]) -> AppResult<AccessToken> {
        let form = form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", "client_credentials")
            .append_pair("client_id", self.client_id.as_str())
            .append_pair("client_secret", self.client_secret.as_str())
            .append_pair("scope", scopes.join(" ").as_str())
            .finish();

        let response = self
            .http_client
            .post(self.token_url.as_str())
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(form)
            .send()
            .await
            .map_err(|error| {
                AppError::Unauthorized(format!("failed to call token endpoint: {error}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_owned());
            warn!(
                client_id = %self.client_id,
                status = status.as_u16(),
                "token endpoint rejected client credentials"
            );
            return Err(AppError::Unauthorized(format!(
                "token endpoint returned status {}: {body}",
                status.as_u16()
            )));
        }

        let token = response
            .json::<TokenEndpointResponse>()
            .await
            .map_err(|error| {
                AppError::Unauthorized(format!("failed to parse token endpoint response: {error}"))
            })?;

        let access_token = AccessToken::new(token.access_token);
        let expires_on = token
            .expires_in
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime));

        Ok(match expires_on {
            Some(expires_on) => access_token.with_expires_on(expires_on),
            None => access_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use soxguard_application::TokenProvider;
    use soxguard_core::AppError;
    use url::form_urlencoded;

    use super::ClientCredentialsTokenProvider;
    use crate::test_http_server::TestHttpServer;

    #[test]
    fn token_url_is_built_per_tenant() {
        let provider = ClientCredentialsTokenProvider::new(
            reqwest::Client::new(),
            "https://login.microsoftonline.com/",
            "contoso-tenant",
            "client",
            "secret",
        )
        .unwrap_or_else(|_| unreachable!());

        assert_eq!(
            provider.token_url(),
            "https://login.microsoftonline.com/contoso-tenant/oauth2/v2.0/token"
        );
    }

    #[tokio::test]
    async fn posts_client_credentials_form_and_reads_token() {
        let server = TestHttpServer::start(vec![(
            200,
            r#"{"token_type":"Bearer","expires_in":3599,"access_token":"tok123"}"#.to_owned(),
        )])
        .await;
        let provider = ClientCredentialsTokenProvider::new(
            reqwest::Client::new(),
            server.url("/").as_str(),
            "tenant1",
            "client-id",
            "s3cret&value",
        )
        .unwrap_or_else(|_| unreachable!());

        let token = provider
            .get_token(&["https://management.azure.com/.default".to_owned()])
            .await
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(token.secret(), "tok123");
        assert!(token.expires_on().is_some());

        let captured = server.captured().await;
        assert_eq!(captured[0].method, "POST");
        assert_eq!(captured[0].target, "/tenant1/oauth2/v2.0/token");
        assert_eq!(
            captured[0].header("content-type"),
            Some("application/x-www-form-urlencoded")
        );

        let form: Vec<(String, String)> = form_urlencoded::parse(captured[0].body.as_bytes())
            .into_owned()
            .collect();
        assert!(form.contains(&("grant_type".to_owned(), "client_credentials".to_owned())));
        assert!(form.contains(&("client_secret".to_owned(), "s3cret&value".to_owned())));
        assert!(form.contains(&(
            "scope".to_owned(),
            "https://management.azure.com/.default".to_owned()
        )));
    }

    #[tokio::test]
    async fn rejected_credentials_are_unauthorized() {
        let server = TestHttpServer::start(vec![(
            401,
            r#"{"error":"invalid_client"}"#.to_owned(),
        )])
        .await;
        let provider = ClientCredentialsTokenProvider::new(
            reqwest::Client::new(),
            server.url("/").as_str(),
            "tenant1",
            "client-id",
            "wrong",
        )
        .unwrap_or_else(|_| unreachable!());

        let result = provider.get_token(&["scope/.default".to_owned()]).await;

        match result {
            Err(AppError::Unauthorized(message)) => assert!(message.contains("invalid_client")),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
