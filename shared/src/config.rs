use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE_URL: &str = "/api";
pub const DEFAULT_BANNER_TIMEOUT_MS: u64 = 3_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Prefix for every API path. Absolute (`https://api.example.com`) or
    /// origin-relative (`/api`).
    pub api_base_url: String,
    pub banner_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

impl Config {
    /// Reads overrides baked in at compile time, the way a bundler inlines
    /// `VITE_*` variables.
    pub fn from_env() -> Self {
        Self::from_values(
            option_env!("TRAVELAPP_API_BASE_URL"),
            option_env!("TRAVELAPP_BANNER_TIMEOUT_MS"),
        )
    }

    fn from_values(api_base_url: Option<&str>, banner_timeout_ms: Option<&str>) -> Self {
        let api_base_url = api_base_url
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_API_BASE_URL);

        Self {
            api_base_url: normalize_base_url(api_base_url),
            banner_timeout_ms: banner_timeout_ms
                .and_then(|s| s.trim().parse().ok())
                .filter(|ms| *ms > 0)
                .unwrap_or(DEFAULT_BANNER_TIMEOUT_MS),
        }
    }

    #[must_use]
    pub fn with_api_base_url(mut self, api_base_url: impl AsRef<str>) -> Self {
        self.api_base_url = normalize_base_url(api_base_url.as_ref());
        self
    }

    /// Joins `path` (which starts with `/`) onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url, path)
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_values(None, None);
        assert_eq!(config.api_base_url, "/api");
        assert_eq!(config.banner_timeout_ms, 3_000);
    }

    #[test]
    fn blank_overrides_fall_back_to_defaults() {
        let config = Config::from_values(Some("  "), Some("soon"));
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.banner_timeout_ms, DEFAULT_BANNER_TIMEOUT_MS);
    }

    #[test]
    fn trailing_slashes_are_dropped() {
        let config = Config::from_values(Some("https://api.example.com/v1/"), Some("1500"));
        assert_eq!(config.api_base_url, "https://api.example.com/v1");
        assert_eq!(config.banner_timeout_ms, 1_500);
        assert_eq!(
            config.endpoint("/trips/mine"),
            "https://api.example.com/v1/trips/mine"
        );
    }

    #[test]
    fn runtime_override() {
        let config = Config::from_values(None, None).with_api_base_url("/backend/");
        assert_eq!(config.endpoint("/auth/me"), "/backend/auth/me");
    }
}
