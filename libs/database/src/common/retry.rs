use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Exponential backoff policy for establishing connections at startup.
///
/// Only connection setup is retried. Statements and commits issued through a
/// unit of work fail immediately.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
    /// Scale each delay into [50%, 100%] to spread reconnect storms
    pub jitter: bool,
}

impl RetryPolicy {
    /// 3 retries, 100ms initial delay doubling up to 5s, with jitter.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }

    /// Delay before retry number `retry` (1-based), before jitter.
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry.saturating_sub(1)).unwrap_or(i32::MAX);
        let factor = self.multiplier.powi(exponent);
        // Saturates at max_delay once the product no longer fits a Duration.
        Duration::try_from_secs_f64(self.initial_delay.as_secs_f64() * factor)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }

    fn delay_for(&self, retry: u32) -> Duration {
        let delay = self.backoff(retry);
        if self.jitter {
            delay.mul_f64(jitter_factor())
        } else {
            delay
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
            jitter: true,
        }
    }
}

/// Pseudo-random factor in [0.5, 1.0) derived from a randomly seeded hasher.
fn jitter_factor() -> f64 {
    use std::collections::hash_map::RandomState;
    use std::hash::BuildHasher;

    let sample = RandomState::new().hash_one(std::time::SystemTime::now()) % 500;
    0.5 + sample as f64 / 1000.0
}

/// Run `operation` until it succeeds or the policy's retries are exhausted.
///
/// Returns the last error when every attempt fails.
pub async fn retry_with_backoff<F, Fut, T, E>(policy: &RetryPolicy, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut retry = 0;

    loop {
        match operation().await {
            Ok(value) => {
                if retry > 0 {
                    debug!(retries = retry, "Operation succeeded after retrying");
                }
                return Ok(value);
            }
            Err(e) if retry >= policy.max_retries => {
                warn!(attempts = retry + 1, error = %e, "Giving up after final attempt");
                return Err(e);
            }
            Err(e) => {
                retry += 1;
                let delay = policy.delay_for(retry);
                debug!(
                    retry,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Operation failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new()
            .with_max_retries(max_retries)
            .with_initial_delay(Duration::from_millis(1))
            .without_jitter()
    }

    #[tokio::test]
    async fn test_retry_success_after_failures() {
        let attempts = AtomicU32::new(0);

        let result = retry_with_backoff(&fast_policy(3), || {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 2 {
                    Err(format!("attempt {}", attempt + 1))
                } else {
                    Ok("connected")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "connected");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_returns_last_error_when_exhausted() {
        let attempts = AtomicU32::new(0);

        let result = retry_with_backoff(&fast_policy(2), || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>("refused") }
        })
        .await;

        assert_eq!(result.unwrap_err(), "refused");
        // first attempt + 2 retries
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::new()
            .with_initial_delay(Duration::from_millis(100))
            .with_max_delay(Duration::from_millis(350));

        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(350));
    }

    #[test]
    fn test_backoff_saturates_for_large_retry_counts() {
        let policy = RetryPolicy::new().with_max_retries(500).without_jitter();

        assert_eq!(policy.backoff(80), policy.max_delay);
        assert_eq!(policy.backoff(200), policy.max_delay);
        assert_eq!(policy.backoff(u32::MAX), policy.max_delay);
        assert_eq!(policy.delay_for(200), policy.max_delay);
    }

    #[test]
    fn test_jitter_stays_within_bounds() {
        let policy = RetryPolicy::new().with_initial_delay(Duration::from_millis(1000));
        for _ in 0..20 {
            let delay = policy.delay_for(1);
            assert!(delay >= Duration::from_millis(500));
            assert!(delay <= Duration::from_millis(1000));
        }
    }
}
