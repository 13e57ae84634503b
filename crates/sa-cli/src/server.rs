//! Local HTTP host for the three save endpoints.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::any;
use axum::{Json, Router};
use sa_store::Uploader;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::platform::{self, NetlifyEvent};

pub const VERCEL_PATH: &str = "/api/saveToDrive";
pub const NETLIFY_PATH: &str = "/.netlify/functions/saveToDrive";
pub const CLOUDFLARE_PATH: &str = "/saveToDrive";

pub fn router<U: Uploader + 'static>(uploader: Arc<U>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(VERCEL_PATH, any(vercel::<U>))
        .route(NETLIFY_PATH, any(netlify::<U>))
        .route(CLOUDFLARE_PATH, any(cloudflare::<U>))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(uploader)
}

async fn vercel<U: Uploader>(
    State(uploader): State<Arc<U>>,
    method: Method,
    body: String,
) -> impl IntoResponse {
    let (status, reply) = platform::vercel_handler(uploader.as_ref(), &method, &body).await;
    (status, Json(reply))
}

async fn netlify<U: Uploader>(
    State(uploader): State<Arc<U>>,
    method: Method,
    body: String,
) -> impl IntoResponse {
    let event = NetlifyEvent {
        http_method: method.to_string(),
        body: (!body.is_empty()).then_some(body),
    };
    let reply = platform::netlify_handler(uploader.as_ref(), event).await;
    let status = StatusCode::from_u16(reply.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, reply.body)
}

async fn cloudflare<U: Uploader>(
    State(uploader): State<Arc<U>>,
    body: String,
) -> impl IntoResponse {
    let (status, reply) = platform::cloudflare_on_request(uploader.as_ref(), &body).await;
    (status, Json(reply))
}

/// Bind and serve until Ctrl-C or SIGTERM.
pub async fn serve<U: Uploader + 'static>(addr: SocketAddr, uploader: Arc<U>) -> anyhow::Result<()> {
    // Signal handlers are installed before the address is announced
    let shutdown = shutdown_signal()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    tracing::info!("listening on {local}");
    println!("listening on http://{local}");

    axum::serve(listener, router(uploader))
        .with_graceful_shutdown(shutdown)
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

fn shutdown_signal() -> std::io::Result<impl Future<Output = ()>> {
    #[cfg(unix)]
    let mut sigterm =
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    Ok(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("failed to listen for Ctrl-C: {e}");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async move {
            sigterm.recv().await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => tracing::info!("received Ctrl-C, shutting down"),
            _ = terminate => tracing::info!("received SIGTERM, shutting down"),
        }
    })
}
