use async_trait::async_trait;
use soxguard_application::{AccessToken, TokenProvider};
use soxguard_core::{AppResult, NonEmptyString};

/// Token provider that hands out one pre-issued bearer token.
#[derive(Clone)]
pub struct StaticTokenProvider {
    token: NonEmptyString,
}

impl StaticTokenProvider {
    /// Creates a provider for a pre-issued token.
    pub fn new(token: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            token: NonEmptyString::new(token)?,
        })
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn get_token(&self, _scopes: &[String]) -> AppResult<AccessToken> {
        Ok(AccessToken::new(self.token.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use soxguard_application::TokenProvider;
    use soxguard_core::AppError;

    use super::StaticTokenProvider;

    #[tokio::test]
    async fn returns_configured_token_for_any_scope() {
        let provider = StaticTokenProvider::new("tok123").unwrap_or_else(|_| unreachable!());

        let token = provider
            .get_token(&["https://management.azure.com/.default".to_owned()])
            .await
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(token.secret(), "tok123");
        assert!(token.expires_on().is_none());
    }

    #[test]
    fn rejects_blank_tokens() {
        assert!(matches!(
            StaticTokenProvider::new("  "),
            Err(AppError::Validation(_))
        ));
    }
}
