//! HTTP surface: router assembly and service-level endpoints

pub mod response;

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use sqlx::SqlitePool;
use std::future::{Future, IntoFuture};
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;

use crate::config::Config;
use crate::db;
use crate::error::AppResult;
use crate::features;
use crate::middleware;
use response::ApiResponse;

/// Build the full application router with all routes and middleware.
///
/// `/health` answers both at the root and under `/api/v1`.
pub fn create_router(pool: SqlitePool, config: &Config) -> Router {
    let feature_state = features::FeatureState {
        db: pool.clone(),
        ingest: config.ingest.clone(),
    };

    let health_routes = Router::new()
        .route("/health", get(health))
        .with_state(pool);

    let api_v1 = features::router(feature_state).merge(health_routes.clone());

    Router::new()
        .route("/", get(root))
        .merge(health_routes)
        .nest("/api/v1", api_v1)
        // Apply layers from innermost to outermost
        .layer(CompressionLayer::new())
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
}

/// Serve `app` until `signal` resolves, then give in-flight requests up to
/// `grace` to finish. Requests still running after that are dropped.
pub async fn serve<F>(
    listener: TcpListener,
    app: Router,
    signal: F,
    grace: Duration,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (fired_tx, fired_rx) = tokio::sync::oneshot::channel::<()>();

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            signal.await;
            let _ = fired_tx.send(());
        })
        .into_future();

    let deadline = async move {
        if fired_rx.await.is_err() {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = server => result,
        _ = deadline => {
            tracing::warn!(?grace, "Shutdown grace period elapsed, dropping in-flight requests");
            Ok(())
        },
    }
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "docbatch",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Store connectivity check
async fn health(State(pool): State<SqlitePool>) -> AppResult<impl IntoResponse> {
    db::health_check(&pool).await?;

    Ok(ApiResponse::success(json!({
        "status": "healthy",
        "database": "connected",
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    async fn slow_app() -> (TcpListener, Router) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let app = Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                "done"
            }),
        );
        (listener, app)
    }

    #[tokio::test]
    async fn test_serve_returns_once_signalled_when_idle() {
        let (listener, app) = slow_app().await;
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            serve(listener, app, async {}, Duration::from_secs(30)),
        )
        .await;

        assert!(matches!(result, Ok(Ok(()))));
    }

    #[tokio::test]
    async fn test_serve_drops_requests_still_running_after_grace() {
        let (listener, app) = slow_app().await;
        let addr = listener.local_addr().unwrap();

        let (signal_tx, signal_rx) = tokio::sync::oneshot::channel::<()>();
        let server = tokio::spawn(serve(
            listener,
            app,
            async move {
                let _ = signal_rx.await;
            },
            Duration::from_millis(200),
        ));

        let mut client = tokio::net::TcpStream::connect(addr).await.unwrap();
        client
            .write_all(b"GET /slow HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        signal_tx.send(()).unwrap();

        let finished = tokio::time::timeout(Duration::from_secs(10), server).await;
        assert!(matches!(finished, Ok(Ok(Ok(())))));
        drop(client);
    }
}
