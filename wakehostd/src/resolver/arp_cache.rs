use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::Duration;
use anyhow::{Context, Result};
use async_trait::async_trait;
use super::{first_valid, ResolveStrategy};

/// Reads the kernel ARP cache directly (`/proc/net/arp` on Linux).
pub struct ArpCacheFile {
    path: PathBuf,
    timeout: Duration,
}

impl ArpCacheFile {
    pub fn new(path: PathBuf, timeout: Duration) -> Self {
        Self { path, timeout }
    }
}

#[async_trait]
impl ResolveStrategy for ArpCacheFile {
    fn name(&self) -> &'static str {
        "arp cache"
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn attempt(&self, ip: Ipv4Addr) -> Result<Option<String>> {
        if !self.path.exists() {
            tracing::debug!("{} not present, skipping", self.path.display());
            return Ok(None);
        }

        let table = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read {}", self.path.display()))?;

        Ok(parse_arp_table(&table, &ip.to_string()))
    }
}

// IP address       HW type     Flags       HW address            Mask     Device
// 192.168.1.50     0x1         0x2         aa:bb:cc:dd:ee:ff     *        eth0
fn parse_arp_table(table: &str, ip: &str) -> Option<String> {
    let candidates = table.lines().skip(1).filter_map(|line| {
        let mut columns = line.split_whitespace();
        if columns.next()? != ip {
            return None;
        }
        columns.nth(2)
    });
    first_valid("arp cache", ip, candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
IP address       HW type     Flags       HW address            Mask     Device
192.168.1.1      0x1         0x2         10:20:30:40:50:60     *        eth0
192.168.1.77     0x1         0x0         00:00:00:00:00:00     *        eth0
192.168.1.50     0x1         0x2         aa:bb:cc:dd:ee:ff     *        eth0
";

    #[test]
    fn test_parse_hw_column() {
        assert_eq!(
            parse_arp_table(TABLE, "192.168.1.50"),
            Some("aa:bb:cc:dd:ee:ff".to_string())
        );
    }

    #[test]
    fn test_incomplete_entry_skipped() {
        assert_eq!(parse_arp_table(TABLE, "192.168.1.77"), None);
    }

    #[test]
    fn test_same_ip_on_two_interfaces() {
        let table = "\
IP address       HW type     Flags       HW address            Mask     Device
192.168.1.50     0x1         0x0         00:00:00:00:00:00     *        wlan0
192.168.1.50     0x1         0x2         aa:bb:cc:dd:ee:ff     *        eth0
";
        assert_eq!(
            parse_arp_table(table, "192.168.1.50"),
            Some("aa:bb:cc:dd:ee:ff".to_string())
        );
    }

    #[test]
    fn test_prefix_does_not_match() {
        assert_eq!(parse_arp_table(TABLE, "192.168.1.5"), None);
    }

    #[tokio::test]
    async fn test_reads_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("arp");
        std::fs::write(&path, TABLE).unwrap();

        let strategy = ArpCacheFile::new(path, Duration::from_secs(1));
        let found = strategy.attempt(Ipv4Addr::new(192, 168, 1, 1)).await.unwrap();
        assert_eq!(found, Some("10:20:30:40:50:60".to_string()));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let strategy = ArpCacheFile::new(dir.path().join("nope"), Duration::from_secs(1));
        let found = strategy.attempt(Ipv4Addr::new(192, 168, 1, 1)).await.unwrap();
        assert!(found.is_none());
    }
}
