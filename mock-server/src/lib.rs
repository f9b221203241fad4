use std::time::Duration;

use axum::{
    extract::Path,
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Redirect},
    routing::{any, get},
    Router,
};
use tokio::net::TcpListener;

/// Body served by `GET /`.
pub const INDEX_BODY: &str = "<body>";

pub fn app() -> Router {
    Router::new()
        .route("/", get(index))
        .route("/status/{code}", any(status))
        .route("/redirect", get(redirect))
        .route("/redirect/{hops}", get(redirect_chain))
        .route("/agent", get(user_agent))
        .route("/method", any(echo_method))
        .route("/slow/{millis}", get(slow))
        .route("/large/{bytes}", get(large))
        .route("/referer", get(referer))
        .route("/redirect-to-referer", get(redirect_to_referer))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        log::info!("mock server listening on {addr}");
    }
    axum::serve(listener, app()).await
}

async fn index() -> impl IntoResponse {
    (
        [
            ("content-type", "text/html"),
            ("x-comb", "ok"),
            ("cache-control", "no-cache"),
        ],
        INDEX_BODY,
    )
}

async fn status(Path(code): Path<u16>) -> Result<(StatusCode, String), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    log::debug!("serving status {status}");
    Ok((status, format!("status {code}")))
}

async fn redirect() -> Redirect {
    Redirect::to("/")
}

async fn redirect_to_referer() -> Redirect {
    Redirect::to("/referer")
}

async fn redirect_chain(Path(hops): Path<u32>) -> Redirect {
    match hops {
        0 => Redirect::to("/"),
        n => Redirect::to(&format!("/redirect/{}", n - 1)),
    }
}

async fn user_agent(headers: HeaderMap) -> String {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn referer(headers: HeaderMap) -> String {
    headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn large(Path(bytes): Path<usize>) -> String {
    "x".repeat(bytes)
}

async fn echo_method(method: Method) -> String {
    method.to_string()
}

async fn slow(Path(millis): Path<u64>) -> &'static str {
    tokio::time::sleep(Duration::from_millis(millis)).await;
    "done"
}
