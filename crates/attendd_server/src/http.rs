//! HTTP surface: routes, monitoring endpoints and middleware.

use crate::server::AttendServer;
use attendd_protocol::{cloudtime, Record, Reply};
use attendd_store::Collection;
use axum::{
    body::Bytes,
    extract::{ConnectInfo, DefaultBodyLimit, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::any::Any;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

/// Builds the axum router serving the command endpoint and the
/// monitoring routes.
pub fn build_router(server: Arc<AttendServer>) -> Router {
    let body_limit = server.config().body_limit;

    Router::new()
        .route("/api", post(handle_command))
        .route("/pub/api", post(handle_command))
        .route("/health", get(health_check))
        .route("/devices", get(list_devices))
        .route("/logs", get(list_logs))
        .route("/users", get(list_users))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(server)
}

async fn handle_command(
    State(server): State<Arc<AttendServer>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let socket_ip = connect_info.map(|ConnectInfo(addr)| addr.ip());
    let peer = peer_ip(&headers, socket_ip);
    let reply = server.router().route_bytes(&body, peer).await;
    reply_response(reply)
}

async fn health_check(State(server): State<Arc<AttendServer>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "uptime": server.uptime().as_secs_f64(),
        "timestamp": cloudtime(),
    }))
}

async fn list_devices(State(server): State<Arc<AttendServer>>) -> Json<Vec<Record>> {
    Json(server.store().load(Collection::Devices).await)
}

async fn list_logs(State(server): State<Arc<AttendServer>>) -> Json<Vec<Record>> {
    let mut logs = server.store().load(Collection::Logs).await;
    let start = logs.len().saturating_sub(server.config().logs_tail);
    Json(logs.split_off(start))
}

async fn list_users(State(server): State<Arc<AttendServer>>) -> Json<Vec<Record>> {
    Json(server.store().load(Collection::Users).await)
}

async fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Not found", "timestamp": cloudtime() })),
    )
}

fn reply_response(reply: Reply) -> Response {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(reply.body)).into_response()
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };
    error!(panic = %detail, "request handler panicked");
    reply_response(Reply::internal_error())
}

/// First `x-forwarded-for` hop, else the socket peer.
fn peer_ip(headers: &HeaderMap, socket_ip: Option<IpAddr>) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse().ok())
        .or(socket_ip)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forwarded_for_wins_over_socket() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.1.1.1, 172.16.0.1"));
        let socket = Some("127.0.0.1".parse().unwrap());

        assert_eq!(peer_ip(&headers, socket), Some("10.1.1.1".parse().unwrap()));
    }

    #[test]
    fn bad_forwarded_for_falls_back() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("unknown"));
        let socket = Some("127.0.0.1".parse().unwrap());

        assert_eq!(peer_ip(&headers, socket), socket);
        assert_eq!(peer_ip(&HeaderMap::new(), None), None);
    }

    #[test]
    fn panic_maps_to_generic_500() {
        let response = panic_response(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
