use std::net::Ipv4Addr;
use std::time::Duration;
use anyhow::Result;
use async_trait::async_trait;
use crate::mac;
use super::{first_valid, line_mentions, locate_tool, run_tool, ResolveStrategy};

/// Legacy `arp -n <ip>` lookup from net-tools.
pub struct ArpCommand {
    timeout: Duration,
}

impl ArpCommand {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl ResolveStrategy for ArpCommand {
    fn name(&self) -> &'static str {
        "arp"
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn attempt(&self, ip: Ipv4Addr) -> Result<Option<String>> {
        let Some(tool) = locate_tool("arp") else {
            tracing::debug!("arp not installed, skipping ARP table");
            return Ok(None);
        };

        let target = ip.to_string();
        let output = run_tool(&tool, &["-n", &target]).await?;
        Ok(parse_arp_output(&output, &target))
    }
}

// Address                  HWtype  HWaddress           Flags Mask            Iface
// 192.168.1.50             ether   aa:bb:cc:dd:ee:ff   C                     eth0
fn parse_arp_output(output: &str, ip: &str) -> Option<String> {
    let candidates = output
        .lines()
        .filter(|line| line_mentions(line, ip))
        .filter_map(mac::find_in_text);
    first_valid("arp", ip, candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
Address                  HWtype  HWaddress           Flags Mask            Iface
192.168.1.5              ether   11:22:33:44:55:66   C                     eth0
192.168.1.50             ether   aa:bb:cc:dd:ee:ff   C                     eth0
";

    #[test]
    fn test_parse_matching_line() {
        assert_eq!(
            parse_arp_output(TABLE, "192.168.1.50"),
            Some("aa:bb:cc:dd:ee:ff".to_string())
        );
        assert_eq!(
            parse_arp_output(TABLE, "192.168.1.5"),
            Some("11:22:33:44:55:66".to_string())
        );
    }

    #[test]
    fn test_parse_incomplete_entry() {
        let output = "192.168.1.77                     (incomplete)                              eth0\n";
        assert_eq!(parse_arp_output(output, "192.168.1.77"), None);
    }

    #[test]
    fn test_parse_bsd_style() {
        let output = "? (10.0.0.4) at 0:11:22:33:44:55 on en0 ifscope [ethernet]\n? (10.0.0.4) at 00-11-22-33-44-55\n";
        assert_eq!(
            parse_arp_output(output, "10.0.0.4"),
            Some("00-11-22-33-44-55".to_string())
        );
    }

    #[test]
    fn test_skips_incomplete_interface_entry() {
        let output = "\
192.168.1.50             ether   00:00:00:00:00:00   C                     wlan0
192.168.1.50             ether   aa:bb:cc:dd:ee:ff   C                     eth0
";
        assert_eq!(
            parse_arp_output(output, "192.168.1.50"),
            Some("aa:bb:cc:dd:ee:ff".to_string())
        );
    }

    #[test]
    fn test_no_entry() {
        assert_eq!(parse_arp_output(TABLE, "192.168.1.99"), None);
    }
}
