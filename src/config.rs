//! Server configuration.
//!
//! Values are layered with the `config` crate: built-in defaults, then an optional file, then
//! `XEBEC_`-prefixed environment variables. The result is read once before the server starts.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Prefix for environment overrides, e.g. `XEBEC_PORT=8080`.
pub const ENV_PREFIX: &str = "XEBEC";

/// When the static file resolver is consulted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaticPolicy {
    /// Only for requests no route matched.
    #[default]
    Fallback,
    /// After every request, so a file at a routed path replaces the handler's body and
    /// `Content-Type`.
    Overlay,
}

/// Settings read once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// IPv4 address to bind.
    pub host: String,
    /// TCP port to listen on. 0 picks an ephemeral port.
    pub port: u16,
    /// Root directory for static files.
    pub public_dir: PathBuf,
    /// When static files are served.
    pub static_policy: StaticPolicy,
    /// Use canonical reason phrases instead of `OK` for every status code.
    pub canonical_reasons: bool,
    /// Maximum number of connections served at once. Unbounded if unset.
    pub max_connections: Option<usize>,
    /// How long to wait for a client to send its request. Waits forever if unset.
    pub read_timeout_ms: Option<u64>,
    /// Default log filter, overridden by `RUST_LOG`.
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4119,
            public_dir: PathBuf::from("public"),
            static_policy: StaticPolicy::default(),
            canonical_reasons: true,
            max_connections: None,
            read_timeout_ms: None,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Loads the configuration, optionally from a file, with environment overrides on top.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or a value has the wrong type.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// The read timeout as a `Duration`.
    #[must_use]
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use std::{io::Write, path::PathBuf};

    use super::{ServerConfig, StaticPolicy};

    #[test]
    fn defaults_without_sources() {
        let config = ServerConfig::default();

        assert_eq!(config.port, 4119);
        assert_eq!(config.public_dir, PathBuf::from("public"));
        assert_eq!(config.static_policy, StaticPolicy::Fallback);
        assert!(config.canonical_reasons);
        assert!(config.max_connections.is_none());
        assert!(config.read_timeout().is_none());
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "port = 8080\npublic_dir = \"www\"\nstatic_policy = \"overlay\"\ncanonical_reasons = false\nmax_connections = 64\nread_timeout_ms = 1500"
        )
        .unwrap();

        let config = ServerConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.public_dir, PathBuf::from("www"));
        assert_eq!(config.static_policy, StaticPolicy::Overlay);
        assert!(!config.canonical_reasons);
        assert_eq!(config.max_connections, Some(64));
        assert_eq!(config.read_timeout_ms, Some(1500));
    }

    #[test]
    fn invalid_value_is_an_error() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "port = \"not a port\"").unwrap();

        assert!(ServerConfig::load(Some(file.path())).is_err());
    }
}
