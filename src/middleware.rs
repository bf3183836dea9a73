use crate::error::AppError;
use crate::AppState;
use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, Request, Response, StatusCode},
    middleware::Next,
};
use std::net::SocketAddr;
use std::sync::Arc;

/// Security headers middleware
/// Adds essential security headers to all responses
pub async fn security_headers(
    request: Request<Body>,
    next: Next,
) -> Result<Response<Body>, StatusCode> {
    let mut response = next.run(request).await;

    let headers = response.headers_mut();

    // Prevent clickjacking
    headers.insert(
        header::HeaderName::from_static("x-frame-options"),
        header::HeaderValue::from_static("DENY"),
    );

    // Prevent MIME sniffing
    headers.insert(
        header::HeaderName::from_static("x-content-type-options"),
        header::HeaderValue::from_static("nosniff"),
    );

    // Profile photos are rendered from blob: references on the client
    headers.insert(
        header::HeaderName::from_static("content-security-policy"),
        header::HeaderValue::from_static(
            "default-src 'self'; \
             script-src 'self'; \
             style-src 'self' 'unsafe-inline'; \
             img-src 'self' data: blob:; \
             font-src 'self' data:; \
             connect-src 'self'; \
             frame-ancestors 'none';",
        ),
    );

    headers.insert(
        header::HeaderName::from_static("referrer-policy"),
        header::HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    headers.insert(
        header::HeaderName::from_static("permissions-policy"),
        header::HeaderValue::from_static("geolocation=(), microphone=(), camera=()"),
    );

    Ok(response)
}

/// Rejects cross-origin requests from origins outside `CORS_ORIGINS`.
/// Requests without an Origin header, and every request when no list is
/// configured, pass through.
pub async fn origin_guard(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response<Body>, AppError> {
    let allowed = &state.config.cors_origins;

    if !allowed.is_empty() {
        if let Some(origin) = request.headers().get(header::ORIGIN) {
            let origin_str = origin.to_str().unwrap_or("");
            if !allowed.iter().any(|a| a == origin_str) {
                tracing::warn!("CORS: Blocked request from origin: {}", origin_str);
                return Err(AppError::CorsRejected(origin_str.to_string()));
            }
        }
    }

    Ok(next.run(request).await)
}

/// Per-identity submission limit. Runs before the body is read, so a
/// limited caller never reaches validation or the mail transport.
pub async fn rate_limit(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response<Body>, AppError> {
    let identity = client_identity(&request, state.config.trust_proxy);

    if let Err(exceeded) = state.limiter.check(&identity) {
        tracing::warn!("Rate limit exceeded for {}", identity);
        // Round up so clients never retry a moment too early
        let secs = exceeded.retry_after.as_secs()
            + u64::from(exceeded.retry_after.subsec_nanos() > 0);
        return Err(AppError::RateLimited {
            retry_after_secs: secs.max(1),
        });
    }

    Ok(next.run(request).await)
}

/// Caller identity used for rate limiting: first `X-Forwarded-For` hop when
/// the proxy is trusted, otherwise the peer IP.
pub fn client_identity(request: &Request<Body>, trust_proxy: bool) -> String {
    if trust_proxy {
        let forwarded = request
            .headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
