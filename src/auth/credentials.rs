use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Credential set persisted between sessions.
///
/// The access token, refresh token, and cached user profile live and die
/// together: login writes all three, and any unrecoverable auth failure
/// clears all three. The user profile is an opaque payload owned by the
/// backend; this client never inspects it.
///
/// # Example
/// ```
/// use satchel::auth::Credentials;
///
/// let creds = Credentials::new("access-token")
///     .with_refresh_token("refresh-token");
/// assert_eq!(creds.access_token, "access-token");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user: Option<serde_json::Value>,
    pub last_refresh: Option<DateTime<Utc>>,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            user: None,
            last_refresh: Some(Utc::now()),
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    pub fn with_user(mut self, user: serde_json::Value) -> Self {
        self.user = Some(user);
        self
    }
}
