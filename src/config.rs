use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub listen_address: String,
    pub listen_port: u16,
    /// Address advertised in PASV replies. Usually the public IP.
    pub pasv_address: String,
    pub pasv_port_start: u16,
    pub pasv_port_end: u16,
    pub max_sessions: usize,
    /// Sessions idle longer than this are evicted. 0 disables the sweep.
    pub idle_timeout_minutes: u64,
    pub readonly: bool,
    pub server_name: String,
    /// Credential records, either `user:secret` or the seven-field
    /// `user:secret:uid:gid:comment:home:shell` form. An empty list puts
    /// the server in no-auth bootstrap mode.
    #[serde(default)]
    pub credentials: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: String::from("0.0.0.0"),
            listen_port: 21,
            pasv_address: String::from("127.0.0.1"),
            pasv_port_start: 49152,
            pasv_port_end: 49406,
            max_sessions: 10,
            idle_timeout_minutes: 15,
            readonly: false,
            server_name: String::from("ferroftpd"),
            credentials: Vec::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path))?;
        let config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse configuration file: {}", path))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_field() {
        let config = Config::default();
        assert_eq!(config.server.listen_port, 21);
        assert_eq!(config.server.max_sessions, 10);
        assert!(config.server.credentials.is_empty());
        assert!(!config.server.readonly);
    }

    #[test]
    fn parses_minimal_toml() {
        let toml_str = r#"
            [server]
            listen_address = "0.0.0.0"
            listen_port = 2121
            pasv_address = "192.0.2.1"
            pasv_port_start = 50000
            pasv_port_end = 50010
            max_sessions = 5
            idle_timeout_minutes = 1
            readonly = true
            server_name = "testftpd"
            credentials = ["felicia:friday"]
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen_port, 2121);
        assert!(config.server.readonly);
        assert_eq!(config.server.credentials.len(), 1);
    }
}
