use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

async fn liveness() -> &'static str {
    "OK"
}

/// Liveness endpoint: any GET on any path answers `200 OK`.
pub fn build_router() -> Router {
    Router::new()
        .fallback_service(get(liveness))
        .layer(TraceLayer::new_for_http())
}

pub async fn spawn_http_server(
    port: u16,
    cancel: CancellationToken,
) -> Result<tokio::task::JoinHandle<()>, anyhow::Error> {
    let router = build_router();
    let listener = TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!(port = port, "HTTP server listening");

    let handle = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move { cancel.cancelled().await })
            .await
            .ok();
    });

    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_root_returns_ok() {
        let resp = build_router().oneshot(request("GET", "/")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = to_bytes(resp.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"OK");
    }

    #[tokio::test]
    async fn test_any_path_returns_ok() {
        for uri in ["/health", "/healthz", "/some/deep/path?probe=1"] {
            let resp = build_router().oneshot(request("GET", uri)).await.unwrap();
            assert_eq!(resp.status(), StatusCode::OK, "GET {}", uri);
        }
    }

    #[tokio::test]
    async fn test_post_is_not_allowed() {
        let resp = build_router().oneshot(request("POST", "/")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_spawn_http_server_starts_and_stops() {
        let cancel = CancellationToken::new();
        let handle = spawn_http_server(0, cancel.clone()).await;
        assert!(handle.is_ok(), "server should start on port 0");

        cancel.cancel();
        let join = handle.unwrap();
        tokio::time::timeout(std::time::Duration::from_secs(2), join)
            .await
            .expect("server should shut down within 2s")
            .expect("server task should not panic");
    }
}
