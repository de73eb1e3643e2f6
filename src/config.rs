use crate::components::credentials::DEFAULT_CREDENTIALS_FILE;
use crate::error::{config_error, env_error, AutofillResult};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

/// Optional file overriding environment settings
pub const CONFIG_FILE: &str = "config/automation.toml";

/// Main configuration structure for the automation server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address the API binds to
    pub bind_address: String,
    /// Port the API listens on
    pub port: u16,
    /// Base URL of the timesheet portal
    pub portal_url: String,
    /// Whether the browser runs without a window
    pub headless: bool,
    /// Pause between page steps, in milliseconds
    pub step_delay_ms: u64,
    /// Seed for reproducible schedules; random when unset
    pub schedule_seed: Option<u64>,
    /// Origins allowed to call the API; any origin when empty
    pub cors_origins: Vec<String>,
    /// Where the encrypted login is kept
    pub credentials_file: String,
    /// Passphrase the login file is encrypted with; only held in memory when unset
    #[serde(skip_serializing)]
    pub credentials_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 8000,
            portal_url: String::new(),
            headless: false,
            step_delay_ms: 2000,
            schedule_seed: None,
            cors_origins: Vec::new(),
            credentials_file: DEFAULT_CREDENTIALS_FILE.to_string(),
            credentials_key: None,
        }
    }
}

/// Settings that may be overridden from the config file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileOverrides {
    bind_address: Option<String>,
    port: Option<u16>,
    portal_url: Option<String>,
    headless: Option<bool>,
    step_delay_ms: Option<u64>,
    schedule_seed: Option<u64>,
    cors_origins: Option<Vec<String>>,
    credentials_file: Option<String>,
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> AutofillResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let defaults = Self::default();
        let mut config = Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            port: env_or("PORT", defaults.port)?,
            portal_url: env::var("PORTAL_URL").unwrap_or(defaults.portal_url),
            headless: env_or("HEADLESS", defaults.headless)?,
            step_delay_ms: env_or("STEP_DELAY_MS", defaults.step_delay_ms)?,
            schedule_seed: env::var("SCHEDULE_SEED")
                .ok()
                .map(|seed| seed.parse::<u64>().map_err(|_| env_error("SCHEDULE_SEED")))
                .transpose()?,
            cors_origins: env::var("CORS_ORIGINS")
                .map(|origins| split_list(&origins))
                .unwrap_or_default(),
            credentials_file: env::var("CREDENTIALS_FILE").unwrap_or(defaults.credentials_file),
            credentials_key: env::var("CREDENTIALS_KEY")
                .ok()
                .filter(|key| !key.is_empty()),
        };

        if let Ok(content) = fs::read_to_string(CONFIG_FILE) {
            config.apply_overrides(&content)?;
        }

        Ok(config)
    }

    /// Apply settings from a TOML document on top of the current ones
    pub fn apply_overrides(&mut self, content: &str) -> AutofillResult<()> {
        let overrides: FileOverrides = toml::from_str(content)?;

        if let Some(bind_address) = overrides.bind_address {
            self.bind_address = bind_address;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(portal_url) = overrides.portal_url {
            self.portal_url = portal_url;
        }
        if let Some(headless) = overrides.headless {
            self.headless = headless;
        }
        if let Some(step_delay_ms) = overrides.step_delay_ms {
            self.step_delay_ms = step_delay_ms;
        }
        if overrides.schedule_seed.is_some() {
            self.schedule_seed = overrides.schedule_seed;
        }
        if let Some(cors_origins) = overrides.cors_origins {
            self.cors_origins = cors_origins;
        }
        if let Some(credentials_file) = overrides.credentials_file {
            self.credentials_file = credentials_file;
        }

        Ok(())
    }

    /// Pause between page steps
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    /// Socket address the API listens on
    pub fn socket_addr(&self) -> AutofillResult<SocketAddr> {
        format!("{}:{}", self.bind_address, self.port)
            .parse()
            .map_err(|e| config_error(&format!("Invalid bind address: {}", e)))
    }
}

/// Read and parse an environment variable, falling back to a default when unset
fn env_or<T: FromStr>(var: &str, default: T) -> AutofillResult<T> {
    match env::var(var) {
        Ok(value) => value.trim().parse::<T>().map_err(|_| env_error(var)),
        Err(_) => Ok(default),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 8000);
        assert!(!config.headless);
        assert_eq!(config.step_delay(), Duration::from_secs(2));
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:8000");
    }

    #[test]
    fn test_file_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(
                r#"
                port = 9100
                headless = true
                schedule_seed = 42
                cors_origins = ["http://localhost:5173"]
                credentials_file = "/var/lib/autofill/login.enc"
                "#,
            )
            .unwrap();

        assert_eq!(config.port, 9100);
        assert!(config.headless);
        assert_eq!(config.schedule_seed, Some(42));
        assert_eq!(config.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.credentials_file, "/var/lib/autofill/login.enc");
        // Untouched values keep their defaults
        assert_eq!(config.step_delay_ms, 2000);
    }

    #[test]
    fn test_unknown_override_is_rejected() {
        let mut config = Config::default();
        assert!(config.apply_overrides("retries = 3").is_err());
        // The passphrase is never read from the file
        assert!(config.apply_overrides("credentials_key = \"hunter2\"").is_err());
    }

    #[test]
    fn test_passphrase_is_not_serialized() {
        let config = Config {
            credentials_key: Some("hunter2".to_string()),
            ..Config::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("hunter2"));
        assert!(json.contains(DEFAULT_CREDENTIALS_FILE));
    }

    #[test]
    fn test_invalid_bind_address() {
        let config = Config {
            bind_address: "not an address".to_string(),
            ..Config::default()
        };
        assert!(config.socket_addr().is_err());
    }

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list("http://a, http://b,,"),
            vec!["http://a".to_string(), "http://b".to_string()]
        );
    }
}
