#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use satchel::auth::{CredentialStore, Credentials, StoreError};
use satchel::client::Navigator;

/// In-memory credential store for driving the client without a filesystem.
#[derive(Default)]
pub struct MemoryCredentialStore {
    credentials: Mutex<Option<Credentials>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, credentials: Credentials) {
        *self.credentials.lock().expect("store lock poisoned") = Some(credentials);
    }

    pub fn get(&self) -> Option<Credentials> {
        self.credentials.lock().expect("store lock poisoned").clone()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<Credentials>, StoreError> {
        Ok(self.get())
    }

    fn save(&self, credentials: &Credentials) -> Result<(), StoreError> {
        *self.credentials.lock().expect("store lock poisoned") = Some(credentials.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.credentials.lock().expect("store lock poisoned").take();
        Ok(())
    }
}

/// Counts login-redirect signals instead of navigating anywhere.
#[derive(Default)]
pub struct RecordingNavigator {
    redirects: AtomicUsize,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn redirects(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl Navigator for RecordingNavigator {
    fn redirect_to_login(&self) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn credentials(access: &str, refresh: Option<&str>) -> Credentials {
    let creds = Credentials::new(access);
    match refresh {
        Some(refresh) => creds.with_refresh_token(refresh),
        None => creds,
    }
}
