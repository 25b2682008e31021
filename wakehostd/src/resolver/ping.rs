use std::net::Ipv4Addr;
use std::time::Duration;
use anyhow::Result;
use async_trait::async_trait;
use super::{locate_tool, run_tool, ResolveStrategy};

/// Sends a single echo request so the kernel learns the target's link-layer
/// address. Never yields an address itself, and never fails.
pub struct CacheWarmPing {
    timeout: Duration,
}

impl CacheWarmPing {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// `-W` takes whole seconds; keep at least one.
    fn wait_secs(&self) -> String {
        self.timeout.as_secs().saturating_sub(1).max(1).to_string()
    }
}

#[async_trait]
impl ResolveStrategy for CacheWarmPing {
    fn name(&self) -> &'static str {
        "ping"
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn attempt(&self, ip: Ipv4Addr) -> Result<Option<String>> {
        let Some(ping) = locate_tool("ping") else {
            tracing::debug!("ping not installed, skipping cache warm");
            return Ok(None);
        };

        let target = ip.to_string();
        let wait = self.wait_secs();
        if let Err(e) = run_tool(&ping, &["-c", "1", "-W", &wait, &target]).await {
            tracing::debug!("Cache warm ping to {} failed: {:#}", ip, e);
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wait_secs_never_zero() {
        assert_eq!(CacheWarmPing::new(Duration::from_millis(500)).wait_secs(), "1");
        assert_eq!(CacheWarmPing::new(Duration::from_secs(2)).wait_secs(), "1");
        assert_eq!(CacheWarmPing::new(Duration::from_secs(3)).wait_secs(), "2");
    }

    #[tokio::test]
    async fn test_ping_never_yields_address() {
        let ping = CacheWarmPing::new(Duration::from_secs(2));
        let result = ping.attempt(Ipv4Addr::new(127, 0, 0, 1)).await.unwrap();
        assert!(result.is_none());
    }
}
