//! Single-flight coordination for token refresh.

use std::future::Future;
use std::sync::{Arc, Mutex};

use futures::future::{BoxFuture, FutureExt, Shared};

/// Handle to the shared in-flight refresh operation.
///
/// Resolves to the new access token, or `None` when the refresh failed
/// and the session is gone.
pub type RefreshHandle = Shared<BoxFuture<'static, Option<String>>>;

/// Coalesces concurrent token refreshes into one outstanding operation.
///
/// State machine: `Idle -> Refreshing -> Idle`. While a refresh is in
/// flight, every caller receives a clone of the same shared future, so at
/// most one refresh request exists system-wide and all waiters observe the
/// same outcome. The slot is cleared by the wrapped future itself, before
/// any waiter resolves, so the next miss always starts a fresh attempt
/// rather than reusing a settled one.
#[derive(Clone, Default)]
pub struct RefreshCoordinator {
    inflight: Arc<Mutex<Option<RefreshHandle>>>,
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the in-flight refresh if one exists, otherwise start
    /// `refresh` and share it with every caller arriving before it settles.
    ///
    /// The lock guards only the install/lookup of the handle; it is never
    /// held across an await point.
    pub fn get_or_start<F, Fut>(&self, refresh: F) -> RefreshHandle
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<String>> + Send + 'static,
    {
        let mut slot = self.inflight.lock().expect("refresh slot lock poisoned");
        if let Some(handle) = slot.as_ref() {
            tracing::debug!("refresh already in flight; joining existing operation");
            return handle.clone();
        }
        let fut = refresh();
        let inflight = Arc::clone(&self.inflight);
        let handle = async move {
            let outcome = fut.await;
            // Back to Idle before waiters see the outcome.
            inflight
                .lock()
                .expect("refresh slot lock poisoned")
                .take();
            outcome
        }
        .boxed()
        .shared();
        *slot = Some(handle.clone());
        handle
    }

    #[cfg(test)]
    fn is_idle(&self) -> bool {
        self.inflight
            .lock()
            .expect("refresh slot lock poisoned")
            .is_none()
    }
}
