use crate::error::{GarnishError, Result};
use dashmap::DashMap;
use std::env;
use std::sync::Arc;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;

/// Key/value configuration, seeded from the process environment
#[derive(Clone, Default)]
pub struct ConfigService {
    config: Arc<DashMap<String, String>>,
}

impl ConfigService {
    /// Empty configuration, nothing read from the environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current process environment
    pub fn from_env() -> Self {
        let service = Self::default();
        for (key, value) in env::vars() {
            service.set(&key, &value);
        }
        service
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.config.get(key).map(|v| v.clone())
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    pub fn set(&self, key: &str, value: &str) {
        self.config.insert(key.to_string(), value.to_string());
    }
}

/// Address the HTTP server listens on (`HOST`, `PORT`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    pub fn from_config(config: &ConfigService) -> Result<Self> {
        let host = config.get_or("HOST", DEFAULT_HOST);
        let port = match config.get("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| GarnishError::InvalidConfig {
                key: "PORT".to_string(),
                value: raw.clone(),
            })?,
            None => DEFAULT_PORT,
        };
        Ok(Self { host, port })
    }

    pub fn from_env() -> Result<Self> {
        Self::from_config(&ConfigService::from_env())
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_config(&ConfigService::new()).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_reads_host_and_port() {
        let service = ConfigService::new();
        service.set("HOST", "127.0.0.1");
        service.set("PORT", " 8080 ");
        let config = ServerConfig::from_config(&service).unwrap();
        assert_eq!(config.address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_rejects_non_numeric_port() {
        let service = ConfigService::new();
        service.set("PORT", "http");
        match ServerConfig::from_config(&service) {
            Err(GarnishError::InvalidConfig { key, value }) => {
                assert_eq!(key, "PORT");
                assert_eq!(value, "http");
            }
            other => panic!("expected InvalidConfig, got {:?}", other),
        }
    }
}
