use crate::reconcile::PageSize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration for one reaper run, loaded from environment variables.
///
/// Environment variables:
/// - `ZENOSS_URL` (required, http:// or https://)
/// - `ZENOSS_USERNAME` / `ZENOSS_PASSWORD` (required)
/// - `EVENT_CLASS` (default: /Unknown)
/// - `LOOKBACK_MINUTES` (default: 10, 0 closes everything last seen before now)
/// - `PAGE_SIZE` (default: 100, max 1000)
/// - `VERIFY_TLS` (default: true)
/// - `REQUEST_TIMEOUT_SECS` (default: 30)
/// - `LOG_FILE` (optional, logs go to stderr when unset)
/// - `RUST_LOG` (default: info)
#[derive(Debug, Clone)]
pub struct ReaperConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub event_class: String,
    pub lookback_minutes: u64,
    pub page_size: PageSize,
    pub verify_tls: bool,
    pub request_timeout: Duration,
    pub log_file: Option<PathBuf>,
    pub rust_log: String,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingVariable(String),
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingVariable(var) => write!(f, "Missing environment variable: {}", var),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid configuration value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

pub const DEFAULT_EVENT_CLASS: &str = "/Unknown";
pub const DEFAULT_LOOKBACK_MINUTES: u64 = 10;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

impl ReaperConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// `from_env` is the production entry point; tests pass a map so they
    /// never touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingVariable(key.to_string()))
        };

        let base_url = required("ZENOSS_URL")?.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue(
                "ZENOSS_URL must start with http:// or https://".to_string(),
            ));
        }

        let username = required("ZENOSS_USERNAME")?;
        let password = required("ZENOSS_PASSWORD")?;

        let event_class = lookup("EVENT_CLASS")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_EVENT_CLASS.to_string());

        let lookback_minutes =
            parse_or_default(&lookup, "LOOKBACK_MINUTES", DEFAULT_LOOKBACK_MINUTES)?;

        let raw_page_size = parse_or_default(&lookup, "PAGE_SIZE", PageSize::DEFAULT.get())?;
        let page_size = PageSize::new(raw_page_size)
            .map_err(|e| ConfigError::InvalidValue(format!("PAGE_SIZE: {}", e)))?;

        let verify_tls = parse_or_default(&lookup, "VERIFY_TLS", true)?;

        let timeout_secs =
            parse_or_default(&lookup, "REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "REQUEST_TIMEOUT_SECS must be greater than 0".to_string(),
            ));
        }

        let log_file = lookup("LOG_FILE")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let rust_log = lookup("RUST_LOG").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            base_url,
            username,
            password,
            event_class,
            lookback_minutes,
            page_size,
            verify_tls,
            request_timeout: Duration::from_secs(timeout_secs),
            log_file,
            rust_log,
        })
    }

    pub fn router_url(&self) -> String {
        format!("{}/zport/dmd/evconsole_router", self.base_url)
    }
}

fn parse_or_default<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw.trim().to_lowercase().parse::<T>().map_err(|_| {
            ConfigError::InvalidValue(format!("{} has invalid value '{}'", key, raw))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<ReaperConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ReaperConfig::from_lookup(|key| vars.get(key).cloned())
    }

    const BASE: [(&str, &str); 3] = [
        ("ZENOSS_URL", "https://zenoss.example.com/"),
        ("ZENOSS_USERNAME", "admin"),
        ("ZENOSS_PASSWORD", "secret"),
    ];

    #[test]
    fn test_default_config() {
        let config = load(&BASE).unwrap();

        assert_eq!(config.base_url, "https://zenoss.example.com");
        assert_eq!(
            config.router_url(),
            "https://zenoss.example.com/zport/dmd/evconsole_router"
        );
        assert_eq!(config.event_class, "/Unknown");
        assert_eq!(config.lookback_minutes, 10);
        assert_eq!(config.page_size.get(), 100);
        assert!(config.verify_tls);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.log_file.is_none());
        assert_eq!(config.rust_log, "info");
    }

    #[test]
    fn test_custom_config() {
        let mut pairs = BASE.to_vec();
        pairs.extend([
            ("EVENT_CLASS", "/Status/Ping"),
            ("LOOKBACK_MINUTES", "0"),
            ("PAGE_SIZE", "1000"),
            ("VERIFY_TLS", "FALSE"),
            ("REQUEST_TIMEOUT_SECS", "5"),
            ("LOG_FILE", "closed_events.log"),
        ]);

        let config = load(&pairs).unwrap();

        assert_eq!(config.event_class, "/Status/Ping");
        assert_eq!(config.lookback_minutes, 0);
        assert_eq!(config.page_size.get(), 1000);
        assert!(!config.verify_tls);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.log_file, Some(PathBuf::from("closed_events.log")));
    }

    #[test]
    fn test_missing_credentials() {
        let err = load(&BASE[..2]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVariable(ref v) if v == "ZENOSS_PASSWORD"));
    }

    #[test]
    fn test_rejects_non_http_url() {
        let mut pairs = BASE.to_vec();
        pairs[0] = ("ZENOSS_URL", "zenoss.example.com");
        assert!(matches!(load(&pairs), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_page_size_out_of_range_is_rejected() {
        for bad in ["0", "1001", "-5", "lots"] {
            let mut pairs = BASE.to_vec();
            pairs.push(("PAGE_SIZE", bad));
            assert!(
                matches!(load(&pairs), Err(ConfigError::InvalidValue(_))),
                "PAGE_SIZE={} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let mut pairs = BASE.to_vec();
        pairs.push(("REQUEST_TIMEOUT_SECS", "0"));
        assert!(matches!(load(&pairs), Err(ConfigError::InvalidValue(_))));
    }
}
