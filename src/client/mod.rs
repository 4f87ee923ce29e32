//! Authenticated request client with coalesced token refresh.

pub mod error_body;
pub mod navigator;
pub mod refresh;

pub use error_body::ErrorBody;
pub use navigator::{Navigator, NoopNavigator};
pub use refresh::RefreshCoordinator;

use std::sync::Arc;

use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode};
use serde_json::{json, Value};

use crate::auth::{CredentialStore, Credentials};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// Options for a single API request.
///
/// Caller-supplied headers are merged over the defaults, so a caller can
/// override `Content-Type` or even `Authorization`.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn json(method: Method, body: Value) -> Self {
        Self {
            method,
            headers: HeaderMap::new(),
            body: Some(body),
        }
    }

    pub fn with_header(mut self, name: reqwest::header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Authenticated REST client.
///
/// Attaches the stored bearer token to every request. A 401 whose body
/// marks the token as expired or invalid triggers the refresh protocol:
/// concurrent callers coalesce onto one refresh call, the failed request
/// is retried exactly once with the new token, and an unrecoverable
/// failure clears the credentials and signals a login redirect. Every
/// other response status is handed back to the caller untouched.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use satchel::auth::FileCredentialStore;
/// use satchel::client::ApiClient;
///
/// # async fn example() -> satchel::error::Result<()> {
/// let client = ApiClient::from_env(Arc::new(FileCredentialStore::new_default()));
/// let marks = client.get("/marks").await?;
/// # Ok(())
/// # }
/// ```
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    refresh: RefreshCoordinator,
}

impl ApiClient {
    pub fn new(config: ClientConfig, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url,
            store,
            navigator: Arc::new(NoopNavigator),
            refresh: RefreshCoordinator::new(),
        }
    }

    /// Build a client configured from the environment.
    pub fn from_env(store: Arc<dyn CredentialStore>) -> Self {
        Self::new(ClientConfig::from_env(), store)
    }

    /// Route unrecoverable-failure signals to `navigator`.
    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    /// Use a preconfigured transport instead of the default one.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue an authenticated request against the backend API.
    ///
    /// `endpoint` is a path relative to the base URL, e.g. `/attendance`.
    /// Responses with any status other than 401 are returned unmodified;
    /// interpreting 4xx/5xx payloads is the caller's responsibility.
    pub async fn request(&self, endpoint: &str, options: RequestOptions) -> Result<Response> {
        let token = self.store.load()?.map(|creds| creds.access_token);
        let response = self.send(endpoint, &options, token.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let raw = response.text().await.unwrap_or_default();
        let body = ErrorBody::parse(&raw);
        if !body.indicates_stale_token() {
            return Err(ClientError::Authorization(
                body.message_or("authorization failed"),
            ));
        }

        tracing::debug!(endpoint, "access token rejected; requesting refresh");
        let Some(new_token) = self.refresh_access_token().await else {
            return Err(ClientError::SessionExpired);
        };

        let retry = self.send(endpoint, &options, Some(&new_token)).await?;
        if retry.status() == StatusCode::UNAUTHORIZED {
            // The freshly minted token was rejected too; the session is gone.
            tracing::warn!(endpoint, "retry with refreshed token still unauthorized");
            expire_session(&*self.store, &*self.navigator);
            return Err(ClientError::SessionExpired);
        }
        Ok(retry)
    }

    pub async fn get(&self, endpoint: &str) -> Result<Response> {
        self.request(endpoint, RequestOptions::new(Method::GET)).await
    }

    pub async fn post(&self, endpoint: &str, body: Value) -> Result<Response> {
        self.request(endpoint, RequestOptions::json(Method::POST, body))
            .await
    }

    pub async fn put(&self, endpoint: &str, body: Value) -> Result<Response> {
        self.request(endpoint, RequestOptions::json(Method::PUT, body))
            .await
    }

    pub async fn delete(&self, endpoint: &str) -> Result<Response> {
        self.request(endpoint, RequestOptions::new(Method::DELETE))
            .await
    }

    /// Authenticate against the backend and persist the returned
    /// credential set (tokens plus cached user profile).
    pub async fn login(&self, username: &str, password: &str) -> Result<Credentials> {
        let response = self
            .http
            .post(format!("{}/auth/login", self.base_url))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .map_err(|err| ClientError::network(err, &self.base_url))?;

        let status = response.status();
        let raw = response.text().await.unwrap_or_default();
        if !status.is_success() {
            let message = ErrorBody::parse(&raw).message_or("login failed");
            return Err(ClientError::api(status.as_u16(), message));
        }

        let payload: Value = serde_json::from_str(&raw)?;
        let access_token = extract_str(&payload, "accessToken").ok_or_else(|| {
            ClientError::api(status.as_u16(), "login response missing access token")
        })?;
        let mut credentials = Credentials::new(access_token);
        credentials.refresh_token = extract_str(&payload, "refreshToken");
        credentials.user = extract_field(&payload, "user").cloned();
        self.store.save(&credentials)?;
        Ok(credentials)
    }

    /// Log out: notify the server on a best-effort basis, then clear the
    /// local credentials unconditionally. The user's intent to log out
    /// locally must always succeed, so server failures are ignored.
    pub async fn logout(&self) {
        if let Ok(Some(creds)) = self.store.load() {
            let result = self
                .http
                .post(format!("{}/auth/logout", self.base_url))
                .bearer_auth(&creds.access_token)
                .send()
                .await;
            if let Err(err) = result {
                tracing::debug!(error = %err, "logout notification failed; clearing locally anyway");
            }
        }
        if let Err(err) = self.store.clear() {
            tracing::warn!(error = %err, "failed to clear credentials on logout");
        }
    }

    /// Cached user profile from the last login, if any.
    pub fn current_user(&self) -> Result<Option<Value>> {
        Ok(self.store.load()?.and_then(|creds| creds.user))
    }

    async fn send(
        &self,
        endpoint: &str,
        options: &RequestOptions,
        token: Option<&str>,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = token {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}")) {
                headers.insert(AUTHORIZATION, value);
            }
        }
        // Caller headers win over the defaults.
        for (name, value) in options.headers.iter() {
            headers.insert(name.clone(), value.clone());
        }

        let mut request = self.http.request(options.method.clone(), &url).headers(headers);
        if let Some(body) = &options.body {
            request = request.json(body);
        }
        request
            .send()
            .await
            .map_err(|err| ClientError::network(err, &self.base_url))
    }

    /// Obtain a fresh access token, coalescing with any refresh already in
    /// flight. Resolves to `None` when the session is unrecoverable.
    async fn refresh_access_token(&self) -> Option<String> {
        let http = self.http.clone();
        let base_url = self.base_url.clone();
        let store = Arc::clone(&self.store);
        let navigator = Arc::clone(&self.navigator);
        self.refresh
            .get_or_start(move || run_refresh(http, base_url, store, navigator))
            .await
    }
}

/// One refresh attempt: read the refresh token, exchange it, persist the
/// result. Any failure mode ends the session (credentials cleared, login
/// redirect signaled) and resolves `None` for every waiter.
async fn run_refresh(
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
) -> Option<String> {
    let credentials = match store.load() {
        Ok(creds) => creds,
        Err(err) => {
            tracing::warn!(error = %err, "credential store read failed during refresh");
            None
        }
    };
    let Some(refresh_token) = credentials
        .as_ref()
        .and_then(|creds| creds.refresh_token.clone())
    else {
        // No refresh token means no network call: straight to re-login.
        tracing::warn!("no refresh token in storage; forcing re-login");
        expire_session(&*store, &*navigator);
        return None;
    };

    let response = http
        .post(format!("{base_url}/auth/refresh"))
        .json(&json!({ "refreshToken": refresh_token }))
        .send()
        .await;

    let token = match response {
        Ok(resp) if resp.status().is_success() => {
            let payload = resp.json::<Value>().await.unwrap_or(Value::Null);
            extract_str(&payload, "accessToken")
        }
        Ok(resp) => {
            tracing::warn!(status = %resp.status(), "refresh endpoint rejected the refresh token");
            None
        }
        Err(err) => {
            tracing::warn!(error = %err, "refresh request failed");
            None
        }
    };

    match token {
        Some(token) => {
            // `credentials` is Some here: the refresh token came out of it.
            if let Some(mut creds) = credentials {
                creds.access_token = token.clone();
                creds.last_refresh = Some(Utc::now());
                if let Err(err) = store.save(&creds) {
                    tracing::warn!(error = %err, "failed to persist refreshed access token");
                }
            }
            tracing::debug!("access token refreshed");
            Some(token)
        }
        None => {
            expire_session(&*store, &*navigator);
            None
        }
    }
}

/// End the session: clear the whole credential set (access token, refresh
/// token, cached user go together), then signal navigation to login.
fn expire_session(store: &dyn CredentialStore, navigator: &dyn Navigator) {
    if let Err(err) = store.clear() {
        tracing::warn!(error = %err, "failed to clear credentials");
    }
    navigator.redirect_to_login();
}

/// The backend wraps payloads as `{ "data": { ... } }`; older endpoints
/// return the fields at the top level.
fn extract_field<'a>(payload: &'a Value, name: &str) -> Option<&'a Value> {
    payload
        .get("data")
        .and_then(|data| data.get(name))
        .or_else(|| payload.get(name))
}

fn extract_str(payload: &Value, name: &str) -> Option<String> {
    extract_field(payload, name)
        .and_then(Value::as_str)
        .map(str::to_string)
}
