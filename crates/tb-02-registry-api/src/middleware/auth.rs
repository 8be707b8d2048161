//! API key authentication for event ingestion.
//!
//! Accepts `Authorization: Bearer <key>` or `X-API-Key: <key>`. With no key
//! configured every request passes; the router only mounts the guarded route
//! in that state when unauthenticated ingestion was explicitly allowed.

use crate::domain::ApiError;
use axum::{
    body::Body,
    http::{header, HeaderValue, Request},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tower::{Layer, Service};
use tracing::warn;

/// Authentication layer
#[derive(Clone)]
pub struct AuthLayer {
    api_key: Arc<Option<String>>,
}

impl AuthLayer {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: Arc::new(api_key),
        }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            api_key: Arc::clone(&self.api_key),
        }
    }
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService<S> {
    inner: S,
    api_key: Arc<Option<String>>,
}

impl<S> Service<Request<Body>> for AuthService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        if !check_api_key(&req, self.api_key.as_deref()) {
            warn!(
                path = %req.uri().path(),
                "Event ingestion denied - missing or invalid API key"
            );
            return Box::pin(async { Ok(unauthorized_response()) });
        }

        Box::pin(async move { inner.call(req).await })
    }
}

/// Check API key from request
fn check_api_key<B>(req: &Request<B>, expected_key: Option<&str>) -> bool {
    let Some(expected_key) = expected_key else {
        return true;
    };

    if let Some(auth) = req.headers().get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return constant_time_compare(token.trim(), expected_key);
            }
        }
    }

    if let Some(api_key) = req.headers().get("x-api-key") {
        if let Ok(key_str) = api_key.to_str() {
            return constant_time_compare(key_str.trim(), expected_key);
        }
    }

    false
}

/// Constant-time string comparison.
///
/// Runs in time independent of how many leading bytes match. Lengths are
/// compared in constant time too, after padding both sides with different
/// fill bytes.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    use subtle::ConstantTimeEq;

    let max_len = std::cmp::max(a.len(), b.len());

    let mut a_padded = vec![0u8; max_len];
    let mut b_padded = vec![0xFFu8; max_len];

    a_padded[..a.len()].copy_from_slice(a.as_bytes());
    b_padded[..b.len()].copy_from_slice(b.as_bytes());

    let lengths_equal = a.len().ct_eq(&b.len());
    let contents_equal = a_padded.ct_eq(&b_padded);

    (lengths_equal & contents_equal).into()
}

fn unauthorized_response() -> Response {
    let mut response = ApiError::unauthorized().into_response();
    response
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    response
}
