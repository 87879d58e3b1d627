//! Application configuration loaded from environment variables.

use couriers::TcsConfig;

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `TCS_ACCOUNT_NUMBER`, `TCS_COST_CENTER`, `TCS_USERNAME`,
///   `TCS_PASSWORD`, `TCS_ORIGIN_CITY` — opaque courier credentials
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub tcs: TcsConfig,
}

impl Config {
    /// Loads configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        let mut tcs = TcsConfig::default();
        if let Ok(account) = std::env::var("TCS_ACCOUNT_NUMBER") {
            tcs.account_number = account;
        }
        if let Ok(cost_center) = std::env::var("TCS_COST_CENTER") {
            tcs.cost_center = cost_center;
        }
        if let Ok(username) = std::env::var("TCS_USERNAME") {
            tcs.username = username;
        }
        if let Ok(password) = std::env::var("TCS_PASSWORD") {
            tcs.password = password;
        }
        if let Ok(origin) = std::env::var("TCS_ORIGIN_CITY") {
            tcs.origin_city = origin;
        }

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            tcs,
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            tcs: TcsConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }
}
