use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header::RETRY_AFTER, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use salesdash_core::AppConfig;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ApiError;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Correlates a request with its log lines and the `meta.request_id` of its body.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

#[derive(Debug)]
struct FetchWindow {
    started_at: Instant,
    fetches: usize,
}

/// Budget of upstream sales fetches per window.
///
/// Every data route performs one fetch against the sales API, so the budget
/// is counted per request on those routes. Health checks are not counted.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    state: Arc<Mutex<FetchWindow>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            state: Arc::new(Mutex::new(FetchWindow {
                started_at: Instant::now(),
                fetches: 0,
            })),
        }
    }

    /// Reads `SALESDASH_RATE_LIMIT_MAX_REQUESTS` and
    /// `SALESDASH_RATE_LIMIT_WINDOW_SECS` from the loaded config.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.rate_limit_max_requests,
            Duration::from_secs(config.rate_limit_window_secs),
        )
    }

    /// Counts one fetch, or returns the time left in the current window when
    /// the budget is spent.
    async fn try_acquire(&self) -> Result<(), Duration> {
        let mut window = self.state.lock().await;
        let elapsed = window.started_at.elapsed();
        if elapsed >= self.window {
            window.started_at = Instant::now();
            window.fetches = 0;
        } else if window.fetches >= self.max_requests {
            return Err(self.window.saturating_sub(elapsed));
        }
        window.fetches += 1;
        Ok(())
    }
}

/// Tags the request with the caller's `x-request-id`, or a fresh `UUIDv4`,
/// and echoes it on the response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));
    let mut res = next.run(req).await;
    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, val);
    }
    res
}

/// Answers 429 `rate_limited` with a `Retry-After` once the fetch budget of
/// the window is spent.
pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    let Err(retry_in) = rate_limit.try_acquire().await else {
        return next.run(req).await;
    };

    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    // Round up so clients never retry inside the closed window.
    let retry_secs = retry_in.as_secs() + u64::from(retry_in.subsec_nanos() > 0);
    tracing::warn!(
        request_id = %request_id,
        path = %req.uri().path(),
        max_requests = rate_limit.max_requests,
        retry_secs,
        "sales fetch budget exhausted"
    );

    let mut res = ApiError::new(
        request_id,
        "rate_limited",
        format!("too many requests, retry in {retry_secs}s"),
    )
    .into_response();
    res.headers_mut()
        .insert(RETRY_AFTER, HeaderValue::from(retry_secs));
    res
}
