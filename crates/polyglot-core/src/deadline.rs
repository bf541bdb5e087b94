//! Bounded outbound calls.

use std::future::Future;
use std::time::Duration;

/// Run `fut` with an upper bound of `limit`.
///
/// On expiry the future is dropped and `on_timeout(limit)` becomes the error,
/// so each collaborator keeps its own error type.
pub async fn with_deadline<T, E, F>(
    limit: Duration,
    fut: F,
    on_timeout: impl FnOnce(Duration) -> E,
) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(on_timeout(limit)),
    }
}
