//! Timeout enforcement.
//!
//! # Responsibilities
//! - Bound every reload (fetch + decode) by a deadline
//! - Cancel the fetch cleanly when the deadline passes
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from source errors but equally retryable

use std::future::Future;
use std::time::Duration;

use crate::runtime::error::LoadError;

/// Run `fut`, failing with [`LoadError::Timeout`] once `limit` elapses.
/// A zero limit disables the deadline.
pub async fn with_timeout<T, F>(limit: Duration, fut: F) -> Result<T, LoadError>
where
    F: Future<Output = Result<T, LoadError>>,
{
    if limit.is_zero() {
        return fut.await;
    }
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(LoadError::Timeout(limit)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_times_out_stuck_future() {
        let res: Result<(), _> = with_timeout(Duration::from_millis(20), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(res, Err(LoadError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_zero_limit_disables_deadline() {
        let res = with_timeout(Duration::ZERO, async { Ok(5u8) }).await;
        assert_eq!(res.unwrap(), 5);
    }
}
