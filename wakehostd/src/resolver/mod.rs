//! MAC resolution: an ordered list of best-effort strategies run one after
//! another against a target IPv4 address until one yields a usable address.

pub mod arp;
pub mod arp_cache;
pub mod neighbor;
pub mod ping;

use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use anyhow::{Context, Result};
use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use crate::config::ResolverConfig;
use crate::mac::{self, MacAddress};

/// Directories searched, in order, for the external networking tools
const TOOL_DIRS: &[&str] = &["/usr/bin", "/bin", "/usr/sbin", "/sbin"];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("could not find MAC address for {ip}")]
pub struct ResolutionFailure {
    pub ip: Ipv4Addr,
    /// Number of strategies run before giving up
    pub attempts: usize,
}

/// One way of discovering the hardware address behind an IP.
///
/// `Ok(None)` means "nothing found here"; `Err` means the strategy itself broke.
/// Either way the resolver moves on to the next strategy.
#[async_trait]
pub trait ResolveStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Upper bound on a single attempt
    fn timeout(&self) -> Duration;

    async fn attempt(&self, ip: Ipv4Addr) -> Result<Option<String>>;
}

pub struct MacResolver {
    strategies: Vec<Box<dyn ResolveStrategy>>,
}

impl MacResolver {
    pub fn new(strategies: Vec<Box<dyn ResolveStrategy>>) -> Self {
        Self { strategies }
    }

    /// Ping to warm the neighbor cache, then `ip neigh`, `arp`, and the kernel ARP table.
    pub fn system(config: &ResolverConfig) -> Self {
        let command_timeout = config.command_timeout();
        Self::new(vec![
            Box::new(ping::CacheWarmPing::new(config.ping_timeout())),
            Box::new(neighbor::NeighborTable::new(command_timeout)),
            Box::new(arp::ArpCommand::new(command_timeout)),
            Box::new(arp_cache::ArpCacheFile::new(
                config.arp_cache_path.clone(),
                command_timeout,
            )),
        ])
    }

    pub async fn resolve(&self, ip: Ipv4Addr) -> Result<MacAddress, ResolutionFailure> {
        let mut attempts = 0;

        for strategy in &self.strategies {
            attempts += 1;

            let candidate = match tokio::time::timeout(strategy.timeout(), strategy.attempt(ip)).await {
                Ok(Ok(Some(candidate))) => candidate,
                Ok(Ok(None)) => continue,
                Ok(Err(e)) => {
                    tracing::debug!("{} failed for {}: {:#}", strategy.name(), ip, e);
                    continue;
                }
                Err(_) => {
                    tracing::warn!(
                        "{} timed out after {:?} for {}",
                        strategy.name(),
                        strategy.timeout(),
                        ip
                    );
                    continue;
                }
            };

            if !mac::is_valid(&candidate) {
                tracing::warn!(
                    "{} returned unusable address {} for {}",
                    strategy.name(),
                    candidate,
                    ip
                );
                continue;
            }

            match candidate.parse::<MacAddress>() {
                Ok(mac) => {
                    tracing::info!("Found MAC {} for IP {} via {}", mac, ip, strategy.name());
                    return Ok(mac);
                }
                Err(e) => {
                    tracing::warn!("{} returned {}: {}", strategy.name(), candidate, e);
                }
            }
        }

        Err(ResolutionFailure { ip, attempts })
    }
}

/// First existing `<dir>/<name>` among the well-known tool directories.
pub(crate) fn locate_tool(name: &str) -> Option<PathBuf> {
    locate_tool_in(name, TOOL_DIRS.iter().map(Path::new))
}

fn locate_tool_in<'a>(name: &str, dirs: impl IntoIterator<Item = &'a Path>) -> Option<PathBuf> {
    dirs.into_iter()
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// Run a located tool and capture stdout. The child is killed if the
/// calling future is dropped, so an outer timeout never leaks processes.
pub(crate) async fn run_tool(program: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .with_context(|| format!("Failed to run {}", program.display()))?;

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// First candidate the validator accepts. Sentinels and garbage are logged
/// and skipped, since a table may list the same IP once per interface.
pub(crate) fn first_valid<'a>(
    source: &str,
    ip: &str,
    candidates: impl IntoIterator<Item = &'a str>,
) -> Option<String> {
    candidates
        .into_iter()
        .find(|candidate| {
            let usable = mac::is_valid(candidate);
            if !usable {
                tracing::warn!("{} lists unusable address {} for {}", source, candidate, ip);
            }
            usable
        })
        .map(str::to_string)
}

/// True if any whitespace-separated token of `line` is `ip` or `(ip)`.
pub(crate) fn line_mentions(line: &str, ip: &str) -> bool {
    line.split_whitespace()
        .map(|token| token.trim_start_matches('(').trim_end_matches(')'))
        .any(|token| token == ip)
}
