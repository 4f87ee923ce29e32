//! Satchel — authenticated REST client for a school-management API.
//!
//! Wraps outbound HTTP calls with bearer-token attachment, detects
//! token-expiry responses, coalesces concurrent token refreshes into a
//! single in-flight operation, and retries the failed request once with
//! the refreshed token. Unrecoverable auth failures clear the stored
//! credentials and signal a redirect to the login view.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use satchel::prelude::*;
//!
//! # async fn example() -> satchel::error::Result<()> {
//! let store = Arc::new(FileCredentialStore::new_default());
//! let client = ApiClient::from_env(store);
//! let response = client.get("/notices").await?;
//! println!("{}", response.status());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod prelude;
