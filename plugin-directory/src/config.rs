//! Directory client settings loaded from environment variables.
//!
//! - `WP_API_URL`           = endpoint (default `https://api.wordpress.org/plugins/info/1.2/`)
//! - `WP_PER_PAGE`          = results per request (1..=250, default 100)
//! - `WP_DESCRIPTION_MODE`  = `detailed` (default) or `summary`
//! - `WP_THROTTLE_MS`       = coalescing delay before a search is sent (default 300)
//! - `WP_HTTP_TIMEOUT_SECS` = request timeout (default 20)

use std::str::FromStr;
use std::time::Duration;

use crate::errors::DirectoryConfigError;
use crate::normalize::DescriptionMode;

pub const DEFAULT_API_URL: &str = "https://api.wordpress.org/plugins/info/1.2/";
const DEFAULT_PER_PAGE: u32 = 100;
const MAX_PER_PAGE: u32 = 250;
const DEFAULT_THROTTLE_MS: u64 = 300;
const DEFAULT_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryConfig {
    /// Query endpoint of the plugin info API.
    pub api_url: String,
    pub per_page: u32,
    pub description_mode: DescriptionMode,
    /// Delay a fetch ticket waits before hitting the network.
    pub throttle: Duration,
    pub timeout: Duration,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            per_page: DEFAULT_PER_PAGE,
            description_mode: DescriptionMode::Detailed,
            throttle: Duration::from_millis(DEFAULT_THROTTLE_MS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl DirectoryConfig {
    /// Reads the configuration from the process environment, using defaults
    /// for unset variables.
    pub fn from_env() -> Result<Self, DirectoryConfigError> {
        Self::from_source(&|name| std::env::var(name).ok().filter(|v| !v.trim().is_empty()))
    }

    fn from_source(
        var: &dyn Fn(&'static str) -> Option<String>,
    ) -> Result<Self, DirectoryConfigError> {
        let defaults = Self::default();

        let api_url = match var("WP_API_URL") {
            Some(url) => {
                let url = url.trim().to_string();
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(DirectoryConfigError::InvalidBaseUrl(url));
                }
                url
            }
            None => defaults.api_url,
        };

        let per_page = parse_opt::<u32>(var, "WP_PER_PAGE", "expected u32")?
            .unwrap_or(defaults.per_page);
        if per_page == 0 || per_page > MAX_PER_PAGE {
            return Err(DirectoryConfigError::InvalidNumber {
                var: "WP_PER_PAGE",
                reason: "expected 1..=250",
            });
        }

        let description_mode = match var("WP_DESCRIPTION_MODE") {
            Some(m) => DescriptionMode::from_str(&m)?,
            None => defaults.description_mode,
        };

        let throttle = parse_opt::<u64>(var, "WP_THROTTLE_MS", "expected u64")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.throttle);

        let timeout = parse_opt::<u64>(var, "WP_HTTP_TIMEOUT_SECS", "expected u64")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        Ok(Self {
            api_url,
            per_page,
            description_mode,
            throttle,
            timeout,
        })
    }
}

fn parse_opt<T: FromStr>(
    var: &dyn Fn(&'static str) -> Option<String>,
    name: &'static str,
    reason: &'static str,
) -> Result<Option<T>, DirectoryConfigError> {
    match var(name) {
        Some(v) => v
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| DirectoryConfigError::InvalidNumber { var: name, reason }),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&'static str, &str)]) -> Result<DirectoryConfig, DirectoryConfigError> {
        let map: HashMap<&'static str, String> =
            pairs.iter().map(|(k, v)| (*k, v.to_string())).collect();
        DirectoryConfig::from_source(&move |name| map.get(name).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        assert_eq!(load(&[]).unwrap(), DirectoryConfig::default());
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = load(&[
            ("WP_PER_PAGE", "25"),
            ("WP_DESCRIPTION_MODE", "summary"),
            ("WP_THROTTLE_MS", "0"),
        ])
        .unwrap();
        assert_eq!(cfg.per_page, 25);
        assert_eq!(cfg.description_mode, DescriptionMode::Summary);
        assert_eq!(cfg.throttle, Duration::ZERO);
    }

    #[test]
    fn per_page_is_bounded() {
        assert!(matches!(
            load(&[("WP_PER_PAGE", "0")]),
            Err(DirectoryConfigError::InvalidNumber { var: "WP_PER_PAGE", .. })
        ));
        assert!(load(&[("WP_PER_PAGE", "251")]).is_err());
    }

    #[test]
    fn base_url_needs_scheme() {
        assert!(matches!(
            load(&[("WP_API_URL", "api.wordpress.org")]),
            Err(DirectoryConfigError::InvalidBaseUrl(_))
        ));
    }
}
