//! Retry on SQLite lock contention
//!
//! Organ batches of one month commit concurrently, so a transaction can find
//! the database locked past the connection's busy timeout.

use std::future::Future;
use std::time::{Duration, Instant};

use crate::error::{SyncError, SyncResult};

const FIRST_PAUSE: Duration = Duration::from_millis(10);
const LONGEST_PAUSE: Duration = Duration::from_millis(1000);

/// True for SQLite "database is locked" failures
pub fn is_lock_error(err: &SyncError) -> bool {
    matches!(err, SyncError::Database(db_err) if db_err.to_string().contains("database is locked"))
}

/// Run `operation`, re-running it while it fails on a lock
///
/// Pauses start at 10ms and double up to 1s. Once `max_wait_ms` has elapsed
/// the most recent lock error is returned; any other error is returned at
/// once.
pub async fn retry_on_lock<F, Fut, T>(label: &str, max_wait_ms: u64, mut operation: F) -> SyncResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = SyncResult<T>>,
{
    let started = Instant::now();
    let budget = Duration::from_millis(max_wait_ms);
    let mut pause = FIRST_PAUSE;
    let mut tries: u32 = 0;

    loop {
        tries += 1;
        let err = match operation().await {
            Ok(value) => {
                if tries > 1 {
                    tracing::debug!(operation = label, tries, "Committed after lock retries");
                }
                return Ok(value);
            }
            Err(err) if is_lock_error(&err) => err,
            Err(err) => return Err(err),
        };

        let waited = started.elapsed();
        if waited >= budget {
            tracing::error!(
                operation = label,
                tries,
                waited_ms = waited.as_millis() as u64,
                "Database still locked, giving up"
            );
            return Err(err);
        }

        tracing::warn!(operation = label, tries, pause_ms = pause.as_millis() as u64, "Database locked, retrying");
        tokio::time::sleep(pause).await;
        pause = (pause * 2).min(LONGEST_PAUSE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locked() -> SyncError {
        SyncError::Database(sqlx::Error::Protocol("database is locked".to_string()))
    }

    #[tokio::test]
    async fn test_unlocked_operation_runs_once() {
        let mut calls = 0;
        let value = retry_on_lock("insert", 5000, || {
            calls += 1;
            async { Ok::<_, SyncError>(7) }
        })
        .await
        .unwrap();

        assert_eq!(value, 7);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_lock_cleared_after_two_failures() {
        let mut calls = 0;
        let value = retry_on_lock("insert", 5000, || {
            calls += 1;
            let call = calls;
            async move {
                if call <= 2 {
                    Err(locked())
                } else {
                    Ok("committed")
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(value, "committed");
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn test_persistent_lock_returns_last_error() {
        let err = retry_on_lock("insert", 40, || async { Err::<(), _>(locked()) })
            .await
            .unwrap_err();
        assert!(is_lock_error(&err));
    }

    #[tokio::test]
    async fn test_other_errors_not_retried() {
        let mut calls = 0;
        let err = retry_on_lock("insert", 5000, || {
            calls += 1;
            async { Err::<(), _>(SyncError::InvalidInput("bad month".to_string())) }
        })
        .await
        .unwrap_err();

        assert!(matches!(err, SyncError::InvalidInput(_)));
        assert_eq!(calls, 1);
    }
}
