//! Caller IP extraction
//!
//! Resolution order: first entry of `X-Forwarded-For`, then `X-Real-IP`,
//! then the TCP peer address recorded by `into_make_service_with_connect_info`
//! (or `MockConnectInfo` in tests).

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
pub const X_REAL_IP: &str = "x-real-ip";

/// Best-effort client IP. Empty when no source is available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let peer = ConnectInfo::<SocketAddr>::from_request_parts(parts, state)
            .await
            .ok()
            .map(|ConnectInfo(addr)| addr);
        Ok(ClientIp(client_ip_from_parts(&parts.headers, peer)))
    }
}

pub fn client_ip_from_parts(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    if let Some(first) = header(X_FORWARDED_FOR)
        .and_then(|list| list.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return first.to_string();
    }

    if let Some(real_ip) = header(X_REAL_IP) {
        return real_ip.to_string();
    }

    peer.map(|addr| addr.ip().to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn peer() -> Option<SocketAddr> {
        Some(SocketAddr::from(([10, 0, 0, 7], 40123)))
    }

    #[test]
    fn forwarded_for_wins_and_uses_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("203.0.113.9, 10.1.1.1"));
        headers.insert(X_REAL_IP, HeaderValue::from_static("198.51.100.2"));

        assert_eq!(client_ip_from_parts(&headers, peer()), "203.0.113.9");
    }

    #[test]
    fn real_ip_used_without_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert(X_REAL_IP, HeaderValue::from_static("198.51.100.2"));

        assert_eq!(client_ip_from_parts(&headers, peer()), "198.51.100.2");
    }

    #[test]
    fn blank_headers_fall_through_to_peer() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static(" "));

        assert_eq!(client_ip_from_parts(&headers, peer()), "10.0.0.7");
    }

    #[test]
    fn nothing_known_yields_empty() {
        assert_eq!(client_ip_from_parts(&HeaderMap::new(), None), "");
    }

    #[tokio::test]
    async fn extractor_uses_mocked_peer_address() {
        use axum::body::Body;
        use axum::extract::connect_info::MockConnectInfo;
        use axum::http::Request;
        use axum::routing::get;
        use axum::Router;
        use tower::ServiceExt;

        async fn echo(ClientIp(ip): ClientIp) -> String {
            ip
        }

        let app = Router::new()
            .route("/", get(echo))
            .layer(MockConnectInfo(SocketAddr::from(([192, 0, 2, 44], 9000))));

        let resp = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();

        assert_eq!(&bytes[..], b"192.0.2.44");
    }
}
