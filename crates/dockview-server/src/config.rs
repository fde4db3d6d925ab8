use dockview_common::{DockviewError, Result};

pub const ENV_HOST: &str = "DOCKVIEW_HOST";
pub const ENV_PORT: &str = "DOCKVIEW_PORT";
pub const ENV_DOCKER_SOCKET: &str = "DOCKVIEW_DOCKER_SOCKET";

/// Server configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Engine socket path; `None` uses the local defaults.
    pub docker_socket: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            docker_socket: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let port = match lookup(ENV_PORT) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| DockviewError::Config(format!("{ENV_PORT} must be a port number, got {raw:?}")))?,
            None => defaults.port,
        };

        Ok(Self {
            host: lookup(ENV_HOST).unwrap_or(defaults.host),
            port,
            docker_socket: lookup(ENV_DOCKER_SOCKET).filter(|s| !s.is_empty()),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_addr(), "0.0.0.0:5000");
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            (ENV_HOST, "127.0.0.1"),
            (ENV_PORT, "8081"),
            (ENV_DOCKER_SOCKET, "/run/user/1000/podman/podman.sock"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr(), "127.0.0.1:8081");
        assert_eq!(
            config.docker_socket.as_deref(),
            Some("/run/user/1000/podman/podman.sock")
        );
    }

    #[test]
    fn test_invalid_port_is_config_error() {
        let err = ServerConfig::from_lookup(lookup_from(&[(ENV_PORT, "eighty")])).unwrap_err();
        assert!(matches!(err, DockviewError::Config(_)));
    }

    #[test]
    fn test_empty_socket_means_local_defaults() {
        let config = ServerConfig::from_lookup(lookup_from(&[(ENV_DOCKER_SOCKET, "")])).unwrap();
        assert!(config.docker_socket.is_none());
    }
}
