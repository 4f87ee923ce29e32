//! Client configuration (env-sourced base URL with code overrides).

const BASE_URL_ENV: &str = "SATCHEL_BASE_URL";
const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// Configuration for an [`ApiClient`](crate::client::ApiClient).
///
/// Resolution order for the base URL:
/// 1. Explicit value (`with_base_url`)
/// 2. `SATCHEL_BASE_URL` environment variable (`.env` honored)
/// 3. Local development default
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Load from the environment (`SATCHEL_BASE_URL`).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let base_url =
            std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self {
            base_url: normalize_base_url(&base_url),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = normalize_base_url(&base_url.into());
        self
    }
}

// Endpoints are joined as `{base}{endpoint}`; a trailing slash would
// produce double-slash URLs.
fn normalize_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_local_dev_server() {
        let config = ClientConfig::new();
        assert_eq!(config.base_url, "http://localhost:5000/api");
    }

    #[test]
    fn with_base_url_strips_trailing_slash() {
        let config = ClientConfig::new().with_base_url("https://school.example/api/");
        assert_eq!(config.base_url, "https://school.example/api");
    }

    #[test]
    fn normalize_leaves_clean_urls_alone() {
        assert_eq!(
            normalize_base_url("https://school.example/api"),
            "https://school.example/api"
        );
    }
}
