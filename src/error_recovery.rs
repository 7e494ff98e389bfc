//! Retry with exponential backoff for calls to the generation service.
//!
//! Submission and polling share one loop: [`with_backoff`] runs an
//! operation, asks a caller-supplied classifier what the answer means,
//! and decides whether to return, fail, or wait and try again.

use crate::error::AppError;
use async_trait::async_trait;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// The ability to wait. Production code sleeps on the tokio timer;
/// tests substitute a recorder so waits are instant and observable.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Delay schedule applied after throttled (429/5xx) responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub base: Duration,
    pub cap: Duration,
    /// Upper bound on random jitter; never more than `base`.
    pub max_jitter: Duration,
}

impl BackoffPolicy {
    /// Delay before the next attempt after `consecutive` earlier throttles.
    ///
    /// A server-provided `Retry-After` wins outright. Otherwise the delay is
    /// `min(cap, base * 2^consecutive + jitter)`. Jitter is clamped to
    /// `base`, so the delay never shrinks between consecutive throttles.
    pub fn delay(
        &self,
        consecutive: u32,
        retry_after: Option<Duration>,
        jitter: Duration,
    ) -> Duration {
        if let Some(wait) = retry_after {
            return wait;
        }
        let factor = 2u32.saturating_pow(consecutive);
        let jitter = jitter.min(self.max_jitter).min(self.base);
        self.base
            .saturating_mul(factor)
            .saturating_add(jitter)
            .min(self.cap)
    }

    /// Like [`BackoffPolicy::delay`], drawing the jitter at random.
    pub fn next_delay(&self, consecutive: u32, retry_after: Option<Duration>) -> Duration {
        self.delay(consecutive, retry_after, self.draw_jitter())
    }

    fn draw_jitter(&self) -> Duration {
        let bound = self.max_jitter.min(self.base).as_millis() as u64;
        if bound == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(0..=bound))
    }
}

/// How many times to try, and how long to wait between tries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Wait after an attempt that reported "not done yet".
    pub interval: Duration,
    pub backoff: BackoffPolicy,
}

/// What a single attempt told us.
#[derive(Debug)]
pub enum Verdict<T> {
    /// Done; hand the value back.
    Ready(T),
    /// Not done yet; wait the fixed interval.
    Pending,
    /// Rate limited or server trouble; wait the backoff delay.
    Throttled { retry_after: Option<Duration> },
    /// Give up now.
    Fatal(AppError),
}

/// Why [`with_backoff`] stopped without a value.
#[derive(Debug)]
pub enum BackoffError {
    Fatal(AppError),
    Exhausted {
        attempts: u32,
        /// The final attempt was throttled rather than pending.
        throttled: bool,
    },
}

/// Runs `operation` until `classify` reports it ready or fatal, or the
/// attempts run out.
///
/// `operation` receives the 1-based attempt number. Waits happen only
/// between attempts, so `max_attempts` attempts incur at most
/// `max_attempts - 1` sleeps.
pub async fn with_backoff<R, T, F, Fut, C>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    mut operation: F,
    mut classify: C,
) -> Result<T, BackoffError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<R, AppError>>,
    C: FnMut(Result<R, AppError>) -> Verdict<T>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut consecutive_throttles = 0u32;
    let mut last_throttled = false;

    for attempt in 1..=max_attempts {
        let wait = match classify(operation(attempt).await) {
            Verdict::Ready(value) => return Ok(value),
            Verdict::Fatal(err) => return Err(BackoffError::Fatal(err)),
            Verdict::Pending => {
                consecutive_throttles = 0;
                last_throttled = false;
                policy.interval
            }
            Verdict::Throttled { retry_after } => {
                let delay = policy
                    .backoff
                    .next_delay(consecutive_throttles, retry_after);
                consecutive_throttles = consecutive_throttles.saturating_add(1);
                last_throttled = true;
                log::warn!(
                    "Attempt {}/{} throttled, retrying after {:?}{}",
                    attempt,
                    max_attempts,
                    delay,
                    if retry_after.is_some() {
                        " (Retry-After)"
                    } else {
                        ""
                    }
                );
                delay
            }
        };

        if attempt < max_attempts {
            sleeper.sleep(wait).await;
        }
    }

    Err(BackoffError::Exhausted {
        attempts: max_attempts,
        throttled: last_throttled,
    })
}

/// Parses a `Retry-After` header: delta-seconds or an HTTP date.
///
/// Dates in the past yield a zero wait.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    let value = value.trim();
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }
    let at = chrono::DateTime::parse_from_rfc2822(value).ok()?;
    let remaining = at.with_timezone(&chrono::Utc) - chrono::Utc::now();
    Some(remaining.to_std().unwrap_or(Duration::ZERO))
}
