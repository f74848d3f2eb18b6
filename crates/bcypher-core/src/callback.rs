//! Callback-style adapter over the crate's futures.

use std::future::Future;

use tokio::task::JoinHandle;

use crate::error::CoreError;

/// Drive `future` on the current tokio runtime and hand its result to
/// `callback`. The returned handle completes after the callback has run.
pub fn with_callback<T, Fut, F>(future: Fut, callback: F) -> JoinHandle<()>
where
    T: Send + 'static,
    Fut: Future<Output = Result<T, CoreError>> + Send + 'static,
    F: FnOnce(Result<T, CoreError>) + Send + 'static,
{
    tokio::spawn(async move { callback(future.await) })
}
