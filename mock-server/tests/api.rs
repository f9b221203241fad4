use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, INDEX_BODY};
use tower::ServiceExt;

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

// --- index ---

#[tokio::test]
async fn index_serves_fixed_headers() {
    let resp = app().oneshot(request("GET", "/")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[http::header::CONTENT_TYPE], "text/html");
    assert_eq!(resp.headers()["x-comb"], "ok");
    assert_eq!(body_bytes(resp).await, INDEX_BODY.as_bytes());
}

// --- status ---

#[tokio::test]
async fn status_returns_requested_code() {
    for code in [200u16, 304, 404, 500] {
        let resp = app()
            .oneshot(request("GET", &format!("/status/{code}")))
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), code);
    }
}

#[tokio::test]
async fn status_rejects_out_of_range_code() {
    let resp = app().oneshot(request("GET", "/status/42")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- redirects ---

#[tokio::test]
async fn redirect_points_at_index() {
    let resp = app().oneshot(request("GET", "/redirect")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[http::header::LOCATION], "/");
}

#[tokio::test]
async fn redirect_chain_counts_down() {
    let resp = app().oneshot(request("GET", "/redirect/3")).await.unwrap();
    assert_eq!(resp.headers()[http::header::LOCATION], "/redirect/2");

    let resp = app().oneshot(request("GET", "/redirect/0")).await.unwrap();
    assert_eq!(resp.headers()[http::header::LOCATION], "/");
}

// --- echo ---

#[tokio::test]
async fn agent_echoes_user_agent() {
    let req = Request::builder()
        .uri("/agent")
        .header(http::header::USER_AGENT, "comb-test/1.0")
        .body(String::new())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(body_bytes(resp).await, "comb-test/1.0".as_bytes());
}

#[tokio::test]
async fn agent_without_header_is_empty() {
    let resp = app().oneshot(request("GET", "/agent")).await.unwrap();
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn method_echoes_verb() {
    for verb in ["GET", "POST", "PUT", "DELETE", "PATCH", "OPTIONS"] {
        let resp = app().oneshot(request(verb, "/method")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_bytes(resp).await, verb.as_bytes());
    }
}

#[tokio::test]
async fn slow_eventually_answers() {
    let resp = app().oneshot(request("GET", "/slow/10")).await.unwrap();
    assert_eq!(body_bytes(resp).await, "done".as_bytes());
}

#[tokio::test]
async fn large_serves_requested_size() {
    let resp = app().oneshot(request("GET", "/large/1024")).await.unwrap();
    let body = body_bytes(resp).await;
    assert_eq!(body.len(), 1024);
    assert!(body.iter().all(|b| *b == b'x'));
}

#[tokio::test]
async fn redirect_to_referer_points_at_echo() {
    let resp = app().oneshot(request("GET", "/redirect-to-referer")).await.unwrap();
    assert_eq!(resp.headers()[http::header::LOCATION], "/referer");
}

#[tokio::test]
async fn referer_echoes_header() {
    let req = Request::builder()
        .uri("/referer")
        .header(http::header::REFERER, "http://localhost/from")
        .body(String::new())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(body_bytes(resp).await, "http://localhost/from".as_bytes());
}

#[tokio::test]
async fn unknown_route_is_404() {
    let resp = app().oneshot(request("GET", "/nope")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
