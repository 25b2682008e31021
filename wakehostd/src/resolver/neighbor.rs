use std::net::Ipv4Addr;
use std::time::Duration;
use anyhow::Result;
use async_trait::async_trait;
use crate::mac;
use super::{first_valid, locate_tool, run_tool, ResolveStrategy};

/// Queries the kernel neighbor table with `ip neigh show <ip>`.
pub struct NeighborTable {
    timeout: Duration,
}

impl NeighborTable {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl ResolveStrategy for NeighborTable {
    fn name(&self) -> &'static str {
        "ip neigh"
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn attempt(&self, ip: Ipv4Addr) -> Result<Option<String>> {
        let Some(tool) = locate_tool("ip") else {
            tracing::debug!("ip not installed, skipping neighbor table");
            return Ok(None);
        };

        let target = ip.to_string();
        let output = run_tool(&tool, &["neigh", "show", &target]).await?;
        Ok(parse_neighbor_output(&output, &target))
    }
}

/// The query is already filtered to one address, but it can appear once per device.
fn parse_neighbor_output(output: &str, ip: &str) -> Option<String> {
    first_valid("ip neigh", ip, output.lines().filter_map(mac::find_in_text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reachable_entry() {
        let output = "192.168.1.50 dev enp3s0 lladdr aa:bb:cc:dd:ee:ff REACHABLE\n";
        assert_eq!(
            parse_neighbor_output(output, "192.168.1.50"),
            Some("aa:bb:cc:dd:ee:ff".to_string())
        );
    }

    #[test]
    fn test_parse_failed_entry() {
        assert_eq!(parse_neighbor_output("192.168.1.50 dev enp3s0 FAILED\n", "192.168.1.50"), None);
        assert_eq!(parse_neighbor_output("", "192.168.1.50"), None);
    }

    #[test]
    fn test_parse_skips_sentinel_on_other_device() {
        let output = "\
192.168.1.50 dev wlan0 lladdr 00:00:00:00:00:00 STALE
192.168.1.50 dev enp3s0 lladdr aa:bb:cc:dd:ee:ff REACHABLE
";
        assert_eq!(
            parse_neighbor_output(output, "192.168.1.50"),
            Some("aa:bb:cc:dd:ee:ff".to_string())
        );
    }
}
