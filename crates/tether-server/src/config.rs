use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use tether_sync::SyncConfig;
use tether_types::StateName;

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Interval between keep-alive comments on notification streams.
    pub keep_alive_secs: u64,
}

impl ServerConfig {
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs.max(1))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 7878)),
            keep_alive_secs: 15,
        }
    }
}

/// A state created when the server starts, before any client connects.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateSeed {
    pub name: StateName,
    pub initial: Value,
}

/// Complete configuration file.
///
/// ```toml
/// [server]
/// bind_addr = "127.0.0.1:7878"
///
/// [sync.registry]
/// checkout = "fail-fast"
///
/// [[states]]
/// name = "settings"
/// initial = { theme = "dark" }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TetherConfig {
    pub server: ServerConfig,
    pub sync: SyncConfig,
    pub states: Vec<StateSeed>,
}

impl TetherConfig {
    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text).map_err(|e| match e {
            ServerError::Config(msg) => ServerError::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    pub fn from_toml(text: &str) -> ServerResult<Self> {
        toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn to_toml(&self) -> ServerResult<String> {
        toml::to_string_pretty(self).map_err(|e| ServerError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tether_registry::{CheckoutPolicy, UnknownStatePolicy};

    #[test]
    fn default_config() {
        let c = TetherConfig::default();
        assert_eq!(c.server.bind_addr, "127.0.0.1:7878".parse::<SocketAddr>().unwrap());
        assert_eq!(c.server.keep_alive(), Duration::from_secs(15));
        assert_eq!(c.sync.channel_capacity, 256);
        assert!(c.states.is_empty());
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(TetherConfig::from_toml("").unwrap(), TetherConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let c = TetherConfig::from_toml(
            r#"
            [server]
            bind_addr = "0.0.0.0:9000"

            [sync.registry]
            checkout = "fail-fast"
            unknown_state = "create-declared"

            [[states]]
            name = "settings"
            initial = { theme = "dark", size = 12 }
            "#,
        )
        .unwrap();

        assert_eq!(c.server.bind_addr.port(), 9000);
        assert_eq!(c.server.keep_alive_secs, 15);
        assert_eq!(c.sync.registry.checkout, CheckoutPolicy::FailFast);
        assert_eq!(c.sync.registry.unknown_state, UnknownStatePolicy::CreateDeclared);
        assert_eq!(c.sync.channel_capacity, 256);
        assert_eq!(c.states.len(), 1);
        assert_eq!(c.states[0].name.as_str(), "settings");
        assert_eq!(c.states[0].initial, json!({ "theme": "dark", "size": 12 }));
    }

    #[test]
    fn invalid_seed_name_rejected() {
        let err = TetherConfig::from_toml("[[states]]\nname = \"\"\ninitial = 1\n").unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nkeep_alive_secs = 3").unwrap();
        let c = TetherConfig::load(file.path()).unwrap();
        assert_eq!(c.server.keep_alive(), Duration::from_secs(3));
    }

    #[test]
    fn load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = TetherConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ServerError::Io(_)));
    }

    #[test]
    fn renders_back_to_toml() {
        let mut c = TetherConfig::default();
        c.states.push(StateSeed {
            name: StateName::new("counter").unwrap(),
            initial: json!({ "n": 0 }),
        });
        let text = c.to_toml().unwrap();
        assert_eq!(TetherConfig::from_toml(&text).unwrap(), c);
    }
}
