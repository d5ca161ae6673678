//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults.

use std::env;
use std::fmt;
use std::str::FromStr;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Store configuration
    pub store: StoreConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
}

/// Which `IouStore` implementation to run with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StoreBackend {
    /// Durable SQLite database
    #[default]
    Sqlite,
    /// Volatile in-process store
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StoreBackend::Sqlite),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend: {}", other)),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Sqlite => write!(f, "sqlite"),
            StoreBackend::Memory => write!(f, "memory"),
        }
    }
}

/// Store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Backend selected with `IOU_STORE`
    pub backend: StoreBackend,
    /// SQLite path or URL; ignored by the memory backend
    pub database_url: String,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            },
            store: StoreConfig {
                backend: env::var("IOU_STORE")
                    .ok()
                    .map(|value| {
                        value.parse().unwrap_or_else(|e| {
                            tracing::warn!("{}, falling back to sqlite", e);
                            StoreBackend::default()
                        })
                    })
                    .unwrap_or_default(),
                database_url: env::var("DATABASE_URL").unwrap_or_else(|_| {
                    // Default to ~/.iou-tracker or current directory
                    if let Some(home) = env::var_os("HOME") {
                        format!("{}/.iou-tracker/ious.db", home.to_string_lossy())
                    } else {
                        ".iou-tracker/ious.db".to_string()
                    }
                }),
            },
        }
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 5] = ["PORT", "HOST", "IOU_STORE", "DATABASE_URL", "HOME"];

    fn with_env<F: FnOnce()>(vars: &[(&str, &str)], f: F) {
        let saved: Vec<(&str, Option<String>)> =
            VARS.iter().map(|k| (*k, env::var(k).ok())).collect();
        for key in VARS {
            env::remove_var(key);
        }
        for (key, value) in vars {
            env::set_var(key, value);
        }

        f();

        for (key, value) in saved {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        with_env(&[("HOME", "/home/tester")], || {
            let config = Config::from_env();
            assert_eq!(config.server_addr(), "0.0.0.0:8080");
            assert_eq!(config.store.backend, StoreBackend::Sqlite);
            assert_eq!(
                config.store.database_url,
                "/home/tester/.iou-tracker/ious.db"
            );
        });
    }

    #[test]
    #[serial]
    fn test_overrides() {
        with_env(
            &[
                ("PORT", "3000"),
                ("HOST", "127.0.0.1"),
                ("IOU_STORE", "Memory"),
                ("DATABASE_URL", "sqlite::memory:"),
            ],
            || {
                let config = Config::from_env();
                assert_eq!(config.server_addr(), "127.0.0.1:3000");
                assert_eq!(config.store.backend, StoreBackend::Memory);
                assert_eq!(config.store.database_url, "sqlite::memory:");
            },
        );
    }

    #[test]
    #[serial]
    fn test_invalid_values_fall_back() {
        with_env(&[("PORT", "not-a-port"), ("IOU_STORE", "postgres")], || {
            let config = Config::from_env();
            assert_eq!(config.server.port, 8080);
            assert_eq!(config.store.backend, StoreBackend::Sqlite);
            assert_eq!(config.store.database_url, ".iou-tracker/ious.db");
        });
    }

    #[test]
    fn test_store_backend_parse() {
        assert_eq!("sqlite".parse::<StoreBackend>(), Ok(StoreBackend::Sqlite));
        assert_eq!(" MEMORY ".parse::<StoreBackend>(), Ok(StoreBackend::Memory));
        assert!("redis".parse::<StoreBackend>().is_err());
        assert_eq!(StoreBackend::Memory.to_string(), "memory");
    }
}
