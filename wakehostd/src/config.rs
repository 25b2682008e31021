use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::Deserialize;
use anyhow::{Context, Result};
use shared::protocol::WOL_PORT;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub wake: WakeConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    /// Copy the previous file to `hosts.json.bak` before replacing it
    #[serde(default)]
    pub keep_backup: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResolverConfig {
    #[serde(default = "default_ping_timeout")]
    pub ping_timeout_ms: u64,
    #[serde(default = "default_command_timeout")]
    pub command_timeout_ms: u64,
    #[serde(default = "default_arp_cache_path")]
    pub arp_cache_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WakeConfig {
    #[serde(default = "default_wake_port")]
    pub port: u16,
    #[serde(default = "default_broadcast")]
    pub broadcast: Ipv4Addr,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("/var/lib/wakehost/hosts.json")
}

fn default_ping_timeout() -> u64 {
    2000
}

fn default_command_timeout() -> u64 {
    2000
}

fn default_arp_cache_path() -> PathBuf {
    PathBuf::from("/proc/net/arp")
}

fn default_wake_port() -> u16 {
    WOL_PORT
}

fn default_broadcast() -> Ipv4Addr {
    Ipv4Addr::BROADCAST
}

fn default_listen() -> String {
    "127.0.0.1:8094".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            keep_backup: false,
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            ping_timeout_ms: default_ping_timeout(),
            command_timeout_ms: default_command_timeout(),
            arp_cache_path: default_arp_cache_path(),
        }
    }
}

impl ResolverConfig {
    pub fn ping_timeout(&self) -> Duration {
        Duration::from_millis(self.ping_timeout_ms)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}

impl Default for WakeConfig {
    fn default() -> Self {
        Self {
            port: default_wake_port(),
            broadcast: default_broadcast(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}
