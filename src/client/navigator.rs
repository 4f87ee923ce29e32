//! Navigation signal for unrecoverable auth failures.

/// Receives the "user must log in again" signal.
///
/// Invoked by whichever code path detects an unrecoverable auth failure
/// (failed refresh, missing refresh token, or 401 after retry), always
/// after the stored credentials have been cleared. Embedders route this
/// to their UI; headless consumers can use [`NoopNavigator`].
pub trait Navigator: Send + Sync {
    fn redirect_to_login(&self);
}

/// Ignores navigation signals.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn redirect_to_login(&self) {}
}
