use std::collections::VecDeque;

use async_trait::async_trait;
use soxguard_core::{AppError, AppResult};
use tokio::sync::Mutex;

use crate::{AccessToken, HttpResponse, HttpSender, OutboundRequest, TokenProvider};

/// Token provider returning scripted tokens in order, then repeating the last.
pub struct ScriptedTokenProvider {
    tokens: Mutex<VecDeque<String>>,
    last: Mutex<Option<String>>,
    failure: Mutex<Option<AppError>>,
    requested_scopes: Mutex<Vec<Vec<String>>>,
}

impl ScriptedTokenProvider {
    pub fn with_tokens(tokens: &[&str]) -> Self {
        Self {
            tokens: Mutex::new(tokens.iter().map(|token| (*token).to_owned()).collect()),
            last: Mutex::new(None),
            failure: Mutex::new(None),
            requested_scopes: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self::failing_with(AppError::Unauthorized(
            "credential rejected by identity provider".to_owned(),
        ))
    }

    pub fn failing_with(error: AppError) -> Self {
        Self {
            tokens: Mutex::new(VecDeque::new()),
            last: Mutex::new(None),
            failure: Mutex::new(Some(error)),
            requested_scopes: Mutex::new(Vec::new()),
        }
    }

    pub async fn requested_scopes(&self) -> Vec<Vec<String>> {
        self.requested_scopes.lock().await.clone()
    }
}

#[async_trait]
impl TokenProvider for ScriptedTokenProvider {
    async fn get_token(&self, scopes: &[String]) -> AppResult<AccessToken> {
        self.requested_scopes.lock().await.push(scopes.to_vec());

        if let Some(error) = self.failure.lock().await.take() {
            return Err(error);
        }

        let mut last = self.last.lock().await;
        if let Some(token) = self.tokens.lock().await.pop_front() {
            *last = Some(token);
        }

        last.clone()
            .map(AccessToken::new)
            .ok_or_else(|| AppError::Unauthorized("no scripted token left".to_owned()))
    }
}

/// HTTP sender that records requests and replays scripted responses.
///
/// Answers `200 {}` once the script is exhausted.
#[derive(Default)]
pub struct RecordingHttpSender {
    responses: Mutex<VecDeque<AppResult<HttpResponse>>>,
    requests: Mutex<Vec<OutboundRequest>>,
}

impl RecordingHttpSender {
    pub fn with_responses(responses: Vec<HttpResponse>) -> Self {
        Self::with_results(responses.into_iter().map(Ok).collect())
    }

    pub fn with_results(results: Vec<AppResult<HttpResponse>>) -> Self {
        Self {
            responses: Mutex::new(results.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub async fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl HttpSender for RecordingHttpSender {
    async fn send(&self, request: OutboundRequest) -> AppResult<HttpResponse> {
        self.requests.lock().await.push(request);
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(HttpResponse::new(200, "{}")))
    }
}
