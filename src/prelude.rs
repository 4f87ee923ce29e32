//! Convenience re-exports for common usage.

pub use crate::auth::{CredentialStore, Credentials, FileCredentialStore, StoreConfig, StoreError};
pub use crate::client::{ApiClient, Navigator, NoopNavigator, RequestOptions};
pub use crate::config::ClientConfig;
pub use crate::error::{ClientError, Result};
