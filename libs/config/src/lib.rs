//! Session configuration for connecting and logging on to an ACT server.
//!
//! This is a typed config surface only — parsing command-line arguments into
//! a [`SessionConfig`] is the caller's job, not this crate's.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default ACT server port.
pub const DEFAULT_PORT: u16 = 4722;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: String, source: std::io::Error },

    #[error("failed to parse config file {path}: {source}")]
    Parse { path: String, source: serde_yaml::Error },
}

/// Everything needed to connect and log on: host/port plus the fields that
/// go into the login request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub username: String,
    pub password: String,
    pub appname: String,
    #[serde(default)]
    pub failure_actions: Vec<String>,
    #[serde(default)]
    pub session_options: Vec<(String, String)>,
    #[serde(default)]
    pub client_properties: Vec<(String, String)>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl SessionConfig {
    pub fn new(host: impl Into<String>, username: impl Into<String>, password: impl Into<String>, appname: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            username: username.into(),
            password: password.into(),
            appname: appname.into(),
            failure_actions: Vec::new(),
            session_options: Vec::new(),
            client_properties: Vec::new(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(contents).map_err(|source| ConfigError::Parse { path: "<string>".to_string(), source })
    }

    pub fn from_yaml_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.display().to_string(), source })?;
        serde_yaml::from_str(&contents)
            .map_err(|source| ConfigError::Parse { path: path.display().to_string(), source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_defaults_the_port() {
        let cfg = SessionConfig::new("act.example.com", "trader", "hunter2", "my-strategy");
        assert_eq!(cfg.port, DEFAULT_PORT);
    }

    #[test]
    fn parses_minimal_yaml() {
        let yaml = r#"
host: act.example.com
username: trader
password: hunter2
appname: my-strategy
"#;
        let cfg = SessionConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(cfg.host, "act.example.com");
        assert_eq!(cfg.port, DEFAULT_PORT);
    }

    #[test]
    fn parses_yaml_with_overridden_port() {
        let yaml = "host: h\nport: 9999\nusername: u\npassword: p\nappname: a\n";
        let cfg = SessionConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(cfg.port, 9999);
    }

    #[test]
    fn loads_from_a_yaml_file_on_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"host: h\nusername: u\npassword: p\nappname: a\n").unwrap();
        let cfg = SessionConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(cfg.host, "h");
        assert_eq!(cfg.port, DEFAULT_PORT);
    }

    #[test]
    fn missing_file_reports_a_read_error() {
        let err = SessionConfig::from_yaml_file(std::path::Path::new("/nonexistent/path.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
