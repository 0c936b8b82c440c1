//! Per-operation authorization guards, run as route middleware before the handler.

use crate::error::AppError;
use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Decides whether a request may reach an operation. Return `AppError::Unauthorized`
/// or `AppError::Forbidden` to reject it.
#[async_trait]
pub trait Guard: Send + Sync + 'static {
    async fn check(&self, parts: &Parts) -> Result<(), AppError>;
}

#[async_trait]
impl<F> Guard for F
where
    F: Fn(&Parts) -> Result<(), AppError> + Send + Sync + 'static,
{
    async fn check(&self, parts: &Parts) -> Result<(), AppError> {
        self(parts)
    }
}

/// Requires `Authorization: Bearer <token>` with a fixed token.
#[derive(Clone, Debug)]
pub struct BearerToken {
    token: String,
}

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        BearerToken { token: token.into() }
    }
}

#[async_trait]
impl Guard for BearerToken {
    async fn check(&self, parts: &Parts) -> Result<(), AppError> {
        let presented = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(str::trim);
        match presented {
            Some(t) if t == self.token => Ok(()),
            Some(_) => Err(AppError::Unauthorized("invalid token".into())),
            None => Err(AppError::Unauthorized("missing bearer token".into())),
        }
    }
}

/// Guards of one operation, checked in registration order.
#[derive(Clone, Default)]
pub struct GuardChain(Arc<Vec<Arc<dyn Guard>>>);

impl GuardChain {
    pub fn new(guards: Vec<Arc<dyn Guard>>) -> Self {
        GuardChain(Arc::new(guards))
    }

    pub async fn check(&self, parts: &Parts) -> Result<(), AppError> {
        for guard in self.0.iter() {
            guard.check(parts).await?;
        }
        Ok(())
    }
}

/// Middleware: the first rejecting guard ends the request before any datastore access.
pub async fn enforce_guards(
    State(chain): State<GuardChain>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (parts, body) = request.into_parts();
    if let Err(e) = chain.check(&parts).await {
        tracing::warn!(method = %parts.method, uri = %parts.uri, error = %e, "guard rejected request");
        return Err(e);
    }
    Ok(next.run(Request::from_parts(parts, body)).await)
}
