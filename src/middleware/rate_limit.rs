use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    num::NonZeroU32,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use governor::{
    clock::{Clock, DefaultClock},
    state::keyed::DashMapStateStore,
    Quota, RateLimiter,
};

use crate::config::ApiConfig;
use crate::error::Failure;
use crate::state::AppState;

type KeyedLimiter = RateLimiter<IpAddr, DashMapStateStore<IpAddr>, DefaultClock>;

/// Checks between sweeps of idle client entries
const PRUNE_EVERY: usize = 1024;

/// Process-wide request limiter keyed by client address
pub struct ClientRateLimiter {
    limiter: KeyedLimiter,
    clock: DefaultClock,
    checks: AtomicUsize,
}

impl ClientRateLimiter {
    /// `None` when rate limiting is disabled or the quota is unusable
    pub fn from_config(api: &ApiConfig) -> Option<Self> {
        if !api.enable_rate_limiting {
            return None;
        }
        let limiter = Self::new(api.rate_limit_requests, Duration::from_secs(api.rate_limit_window_secs));
        if limiter.is_none() {
            tracing::warn!(
                requests = api.rate_limit_requests,
                window_secs = api.rate_limit_window_secs,
                "Invalid rate limit quota, rate limiting disabled"
            );
        }
        limiter
    }

    /// Allow `max_requests` per `window`, all of them usable as a burst
    pub fn new(max_requests: u32, window: Duration) -> Option<Self> {
        let burst = NonZeroU32::new(max_requests)?;
        let period = window.checked_div(max_requests)?;
        let quota = Quota::with_period(period)?.allow_burst(burst);

        Some(Self {
            limiter: RateLimiter::dashmap(quota),
            clock: DefaultClock::default(),
            checks: AtomicUsize::new(0),
        })
    }

    /// Seconds to wait before the next request is allowed
    pub fn check(&self, client: IpAddr) -> Result<(), u64> {
        if self.checks.fetch_add(1, Ordering::Relaxed) % PRUNE_EVERY == PRUNE_EVERY - 1 {
            self.prune();
        }
        self.limiter.check_key(&client).map_err(|not_until| {
            not_until.wait_time_from(self.clock.now()).as_secs().max(1)
        })
    }

    /// Drop clients whose quota has fully replenished
    pub fn prune(&self) {
        let before = self.limiter.len();
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        tracing::trace!(before, after = self.limiter.len(), "Pruned rate limiter state");
    }

    /// Number of clients currently holding limiter state
    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }
}

pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Result<Response, Failure> {
    if let Some(limiter) = &state.limiter {
        let client = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0.ip())
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

        limiter
            .check(client)
            .map_err(|retry_after| Failure::RateLimited { retry_after })?;
    }

    Ok(next.run(request).await)
}
