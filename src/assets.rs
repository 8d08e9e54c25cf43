const SW_CONTENT: &str = include_str!("../static/sw.js");

/// Served at both `/sw.js` and `/firebase-messaging-sw.js`, the path the
/// Firebase web SDK registers by default.
pub(crate) async fn service_worker() -> axum::response::Response {
    axum::response::Response::builder()
        .status(200)
        .header("content-type", "application/javascript")
        .header("cache-control", "no-cache")
        .header("service-worker-allowed", "/")
        .body(SW_CONTENT.into())
        .unwrap_or_default()
}
