use std::collections::VecDeque;
use std::time::Duration;

use groundcheck_common::GroundcheckError;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Sliding-window limiter: at most `max_permits` admissions in any window of
/// length `window`. Permits come back with time; callers never release them.
pub struct RateLimiter {
    name: String,
    max_permits: usize,
    window: Duration,
    log: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(
        name: impl Into<String>,
        max_permits: usize,
        window: Duration,
    ) -> Result<Self, GroundcheckError> {
        let name = name.into();
        if max_permits == 0 {
            return Err(GroundcheckError::Config(format!(
                "rate limiter {name} needs at least one permit per window"
            )));
        }
        if window.is_zero() {
            return Err(GroundcheckError::Config(format!(
                "rate limiter {name} needs a non-zero window"
            )));
        }
        Ok(Self {
            name,
            max_permits,
            window,
            log: Mutex::new(VecDeque::with_capacity(max_permits)),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_permits(&self) -> usize {
        self.max_permits
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Wait until a permit is available and take it.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut log = self.log.lock().await;
                match admit(&mut log, Instant::now(), self.max_permits, self.window) {
                    Ok(()) => return,
                    Err(wait) => wait,
                }
            };
            debug!(
                limiter = self.name.as_str(),
                wait_ms = wait.as_millis() as u64,
                "Rate limit reached, waiting"
            );
            tokio::time::sleep(wait).await;
        }
    }

    /// Take a permit if one is free right now.
    pub async fn try_acquire(&self) -> bool {
        let mut log = self.log.lock().await;
        admit(&mut log, Instant::now(), self.max_permits, self.window).is_ok()
    }
}

/// Admission check over a log of past admissions. Prunes entries older than
/// `window`, records `now` and returns `Ok` if under `max`, otherwise returns
/// how long until the oldest entry expires.
pub fn admit(
    log: &mut VecDeque<Instant>,
    now: Instant,
    max: usize,
    window: Duration,
) -> Result<(), Duration> {
    while let Some(&oldest) = log.front() {
        if now.saturating_duration_since(oldest) >= window {
            log.pop_front();
        } else {
            break;
        }
    }

    if log.len() < max {
        log.push_back(now);
        return Ok(());
    }

    let oldest = log.front().copied().unwrap_or(now);
    Err(window.saturating_sub(now.saturating_duration_since(oldest)))
}
