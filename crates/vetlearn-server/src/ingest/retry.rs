//! Retry of transient upstream failures

use std::future::Future;
use tracing::{info, warn};

use super::config::RetryPolicy;
use super::tga::TgaResult;

/// Run `op` until it succeeds, fails with a non-retriable error, or the
/// policy's retries are spent. Returns the last error in that case.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> TgaResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = TgaResult<T>>,
{
    let mut attempt = 0u32;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retriable() && attempt < policy.max_retries => {
                attempt += 1;
                let delay = policy.delay_for(attempt);
                warn!(
                    "{} attempt {}/{} failed: {}",
                    label,
                    attempt,
                    policy.max_retries + 1,
                    e
                );
                if !delay.is_zero() {
                    info!("Retrying {} in {} ms...", label, delay.as_millis());
                    tokio::time::sleep(delay).await;
                }
            },
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::tga::TgaError;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_transport_errors_are_retried_until_success() {
        let calls = AtomicU32::new(0);
        let result = with_retry(&RetryPolicy::immediate(3), "details", || async {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(TgaError::Transport("reset".into()))
            } else {
                Ok(7)
            }
        })
        .await;

        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let calls = AtomicU32::new(0);
        let result: TgaResult<()> = with_retry(&RetryPolicy::immediate(2), "details", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(TgaError::Transport("timeout".into()))
        })
        .await;

        assert!(matches!(result, Err(TgaError::Transport(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retriable_errors_return_immediately() {
        let calls = AtomicU32::new(0);
        let result: TgaResult<()> = with_retry(&RetryPolicy::immediate(5), "details", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(TgaError::Auth { status: 401 })
        })
        .await;

        assert_eq!(result, Err(TgaError::Auth { status: 401 }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_sleeps_between_attempts() {
        let policy = RetryPolicy {
            max_retries: 2,
            base_delay_ms: 100,
            max_delay_ms: 1_000,
        };
        let start = tokio::time::Instant::now();
        let _: TgaResult<()> =
            with_retry(&policy, "download", || async { Err(TgaError::Transport("x".into())) }).await;

        assert!(start.elapsed() >= std::time::Duration::from_millis(300));
    }
}
