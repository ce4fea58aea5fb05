//! Server Configuration Module
//!
//! Loaded once at startup from environment variables:
//! - `SOC_API_BIND`: listen address (default: 0.0.0.0)
//! - `PORT` / `SOC_API_PORT`: listen port (default: 5000)
//! - `SOC_API_FALLBACK_PORT`: port tried when the first bind fails
//!   (default: 5001, empty disables)
//! - `SOC_STATIC_DIR`: client-side scripts (default: `<install root>/static`)

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::{ApiError, ApiResult};

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_FALLBACK_PORT: u16 = 5001;
const STATIC_DIR: &str = "static";

/// Where the server listens and what it serves from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub fallback_port: Option<u16>,
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            fallback_port: Some(DEFAULT_FALLBACK_PORT),
            static_dir: soc_storage::install_root().join(STATIC_DIR),
        }
    }
}

impl ServerConfig {
    /// Create a configuration from environment variables.
    pub fn from_env() -> ApiResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create a configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ApiResult<Self> {
        let host = lookup("SOC_API_BIND").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = match lookup("PORT").or_else(|| lookup("SOC_API_PORT")) {
            Some(value) => parse_port("PORT", &value)?,
            None => DEFAULT_PORT,
        };

        let fallback_port = match lookup("SOC_API_FALLBACK_PORT") {
            Some(value) if value.trim().is_empty() => None,
            Some(value) => Some(parse_port("SOC_API_FALLBACK_PORT", &value)?),
            None => Some(DEFAULT_FALLBACK_PORT),
        };

        let static_dir = match lookup("SOC_STATIC_DIR").filter(|d| !d.trim().is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => match lookup("SOC_HOME").filter(|h| !h.trim().is_empty()) {
                Some(home) => PathBuf::from(home).join(STATIC_DIR),
                None => soc_storage::install_root().join(STATIC_DIR),
            },
        };

        let config = Self {
            host,
            port,
            fallback_port,
            static_dir,
        };
        // Reject a bad bind address now rather than at bind time.
        config.addr()?;
        Ok(config)
    }

    /// Primary listen address.
    pub fn addr(&self) -> ApiResult<SocketAddr> {
        socket_addr(&self.host, self.port)
    }

    /// Fallback listen address, when one is configured.
    pub fn fallback_addr(&self) -> ApiResult<Option<SocketAddr>> {
        self.fallback_port
            .map(|port| socket_addr(&self.host, port))
            .transpose()
    }
}

fn parse_port(name: &str, value: &str) -> ApiResult<u16> {
    value
        .trim()
        .parse::<u16>()
        .map_err(|_| ApiError::invalid_input(format!("Invalid {} value: {}", name, value)))
}

fn socket_addr(host: &str, port: u16) -> ApiResult<SocketAddr> {
    let addr = format!("{}:{}", host, port);
    addr.parse::<SocketAddr>()
        .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() -> ApiResult<()> {
        let config = ServerConfig::from_lookup(lookup_from(&[("SOC_HOME", "/srv/soc")]))?;
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 5000);
        assert_eq!(config.fallback_port, Some(5001));
        assert_eq!(config.static_dir, PathBuf::from("/srv/soc/static"));
        assert_eq!(config.addr()?, "0.0.0.0:5000".parse::<SocketAddr>().expect("addr"));
        Ok(())
    }

    #[test]
    fn test_port_precedence() -> ApiResult<()> {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("PORT", "8080"),
            ("SOC_API_PORT", "9090"),
        ]))?;
        assert_eq!(config.port, 8080);

        let config = ServerConfig::from_lookup(lookup_from(&[("SOC_API_PORT", "9090")]))?;
        assert_eq!(config.port, 9090);
        Ok(())
    }

    #[test]
    fn test_invalid_port() {
        let err = ServerConfig::from_lookup(lookup_from(&[("PORT", "fifty")]))
            .expect_err("port must be numeric");
        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert!(err.message.contains("fifty"));

        let err = ServerConfig::from_lookup(lookup_from(&[("SOC_API_FALLBACK_PORT", "70000")]))
            .expect_err("port must fit u16");
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    #[test]
    fn test_empty_fallback_disables_it() -> ApiResult<()> {
        let config = ServerConfig::from_lookup(lookup_from(&[("SOC_API_FALLBACK_PORT", "")]))?;
        assert_eq!(config.fallback_port, None);
        assert_eq!(config.fallback_addr()?, None);
        Ok(())
    }

    #[test]
    fn test_invalid_bind_address() {
        let err = ServerConfig::from_lookup(lookup_from(&[("SOC_API_BIND", "not an ip")]))
            .expect_err("host must be an ip");
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    #[test]
    fn test_static_dir_override() -> ApiResult<()> {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("SOC_STATIC_DIR", "/opt/assets"),
            ("SOC_HOME", "/srv/soc"),
        ]))?;
        assert_eq!(config.static_dir, PathBuf::from("/opt/assets"));
        Ok(())
    }
}
