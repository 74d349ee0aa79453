use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

const MAX_DELAY_MS: u64 = 60_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    Fixed,
    Exponential,
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Backoff,
    pub initial_delay_ms: u64,
}

impl RetryPolicy {
    pub fn exponential(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff: Backoff::Exponential,
            initial_delay_ms: 1_000,
        }
    }

    pub async fn run<F, Fut, T, E>(&self, operation: F) -> Result<T, E>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt = 1;

        loop {
            debug!("Attempt {}/{}", attempt, self.max_attempts);

            match operation().await {
                Ok(result) => return Ok(result),
                Err(err) => {
                    if attempt >= self.max_attempts {
                        warn!("All {} attempts failed. Last error: {}", self.max_attempts, err);
                        return Err(err);
                    }

                    let delay = self.delay_for(attempt);
                    warn!("Attempt {} failed: {}. Retrying in {:?}", attempt, err, delay);

                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        let delay_ms = match self.backoff {
            Backoff::Fixed => self.initial_delay_ms,
            Backoff::Exponential => {
                let multiplier = 2u64.saturating_pow(attempt.saturating_sub(1));
                self.initial_delay_ms.saturating_mul(multiplier)
            }
        };

        Duration::from_millis(delay_ms.min(MAX_DELAY_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fixed(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            backoff: Backoff::Fixed,
            initial_delay_ms: 5,
        }
    }

    #[tokio::test]
    async fn test_succeeds_on_second_attempt() {
        let counter = Arc::new(AtomicU32::new(0));

        let counter_clone = counter.clone();
        let result = fixed(3)
            .run(|| {
                let counter = counter_clone.clone();
                async move {
                    let count = counter.fetch_add(1, Ordering::SeqCst) + 1;
                    if count < 2 {
                        Err("smtp timeout")
                    } else {
                        Ok("sent")
                    }
                }
            })
            .await;

        assert_eq!(result, Ok("sent"));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let counter = Arc::new(AtomicU32::new(0));

        let counter_clone = counter.clone();
        let result: Result<(), &str> = fixed(2)
            .run(|| {
                let counter = counter_clone.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err("mailbox unavailable")
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_exponential_delays_are_capped() {
        let policy = RetryPolicy::exponential(10);

        assert_eq!(policy.delay_for(1), Duration::from_millis(1_000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(2_000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(4_000));
        assert_eq!(policy.delay_for(8), Duration::from_millis(MAX_DELAY_MS));
    }

    #[test]
    fn test_zero_attempts_still_tries_once() {
        assert_eq!(RetryPolicy::exponential(0).max_attempts, 1);
    }
}
