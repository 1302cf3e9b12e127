use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::IntoResponse;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// Request as received by [`TestHttpServer`].
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: Method,
    pub target: String,
    pub headers: HeaderMap,
    pub body: String,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .and_then(|value| value.to_str().ok())
    }
}

#[derive(Default)]
struct ServerState {
    responses: VecDeque<(StatusCode, String)>,
    captured: Vec<CapturedRequest>,
}

type SharedState = Arc<Mutex<ServerState>>;

/// Axum server that records every request and replays scripted responses.
///
/// Answers `200 {}` once the script is exhausted.
pub struct TestHttpServer {
    address: SocketAddr,
    state: SharedState,
}

impl TestHttpServer {
    pub async fn start(responses: Vec<(u16, String)>) -> Self {
        let responses = responses
            .into_iter()
            .map(|(status, body)| {
                let status = StatusCode::from_u16(status).unwrap_or_else(|_| unreachable!());
                (status, body)
            })
            .collect();
        let state: SharedState = Arc::new(Mutex::new(ServerState {
            responses,
            captured: Vec::new(),
        }));

        let app = Router::new()
            .fallback(record_and_reply)
            .with_state(state.clone());
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap_or_else(|_| unreachable!());
        let address = listener.local_addr().unwrap_or_else(|_| unreachable!());

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { address, state }
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{path_and_query}", self.address)
    }

    pub async fn captured(&self) -> Vec<CapturedRequest> {
        self.state.lock().await.captured.clone()
    }
}

async fn record_and_reply(
    State(state): State<SharedState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let target = uri
        .path_and_query()
        .map_or_else(|| uri.path().to_owned(), |path_and_query| path_and_query.to_string());

    let mut state = state.lock().await;
    state.captured.push(CapturedRequest {
        method,
        target,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    let (status, body) = state
        .responses
        .pop_front()
        .unwrap_or_else(|| (StatusCode::OK, "{}".to_owned()));

    (status, [(header::CONTENT_TYPE, "application/json")], body)
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    use super::TestHttpServer;

    #[tokio::test]
    async fn decodes_chunked_request_bodies() {
        let server = TestHttpServer::start(vec![(201, "{}".to_owned())]).await;
        let mut stream = TcpStream::connect(server.address())
            .await
            .unwrap_or_else(|_| unreachable!());

        stream
            .write_all(
                b"PUT /locks/AutoSoxLock HTTP/1.1\r\nHost: localhost\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n5\r\nhello\r\n6\r\n world\r\n0\r\n\r\n",
            )
            .await
            .unwrap_or_else(|_| unreachable!());
        let mut reply = String::new();
        stream
            .read_to_string(&mut reply)
            .await
            .unwrap_or_else(|_| unreachable!());

        assert!(reply.starts_with("HTTP/1.1 201"));
        let captured = server.captured().await;
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].method, "PUT");
        assert_eq!(captured[0].target, "/locks/AutoSoxLock");
        assert_eq!(captured[0].body, "hello world");
    }
}
