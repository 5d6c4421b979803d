//! API route modules.

pub mod decisions;
pub mod meetings;
pub mod participants;
pub mod requests;

use super::error::{ApiError, ApiResult};

/// Run blocking database work off the async executor.
pub(crate) async fn blocking<T, E, F>(f: F) -> ApiResult<T>
where
    T: Send + 'static,
    E: Into<ApiError> + Send + 'static,
    F: FnOnce() -> Result<T, E> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::internal(format!("Worker task failed: {}", e)))?
        .map_err(Into::into)
}
