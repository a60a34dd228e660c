//! Admission Middleware
//!
//! Runs the admission check before any handler. The client identity is the
//! peer IP address.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};

use super::handlers::AppState;
use crate::error::{Error, Result};

/// Identity used when the peer address is not available.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Rejects the request with 429 when the client's bucket is empty.
pub async fn admission_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response> {
    let identity = client_identity(&request);

    if !state.limiter.allow(&identity) {
        return Err(Error::RateLimited);
    }

    Ok(next.run(request).await)
}

/// Peer IP from the connection info, or [`UNKNOWN_CLIENT`].
fn client_identity(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http};

    #[test]
    fn test_client_identity_from_connect_info() {
        let mut request = http::Request::builder().uri("/").body(Body::empty()).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 168, 1, 7], 51234))));

        assert_eq!(client_identity(&request), "192.168.1.7");
    }

    #[test]
    fn test_client_identity_ignores_port() {
        let mut a = http::Request::builder().uri("/").body(Body::empty()).unwrap();
        a.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([10, 0, 0, 1], 1000))));
        let mut b = http::Request::builder().uri("/").body(Body::empty()).unwrap();
        b.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([10, 0, 0, 1], 2000))));

        assert_eq!(client_identity(&a), client_identity(&b));
    }

    #[test]
    fn test_client_identity_fallback() {
        let request = http::Request::builder().uri("/").body(Body::empty()).unwrap();
        assert_eq!(client_identity(&request), UNKNOWN_CLIENT);
    }
}
