//! Credential types and storage.

pub mod credentials;
pub mod error;
pub mod store;

pub use credentials::Credentials;
pub use error::StoreError;
pub use store::{CredentialStore, FileCredentialStore, StoreConfig};
