use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use async_trait::async_trait;
use thiserror::Error;
use tokio::net::UdpSocket;

#[derive(Debug, Error)]
#[error("failed to send Wake-on-LAN packet: {0}")]
pub struct TransmissionFailure(#[from] std::io::Error);

/// Puts an encoded payload on the wire.
#[async_trait]
pub trait PacketDispatch: Send + Sync {
    /// Broadcast `payload` (mandatory), then send it straight to `target`
    /// when one is known (best-effort).
    async fn dispatch(&self, payload: &[u8], target: Option<Ipv4Addr>) -> Result<(), TransmissionFailure>;
}

/// UDP dispatcher. Opens a fresh socket for every call.
#[derive(Debug, Clone)]
pub struct UdpDispatcher {
    broadcast: Ipv4Addr,
    port: u16,
}

impl UdpDispatcher {
    pub fn new(broadcast: Ipv4Addr, port: u16) -> Self {
        Self { broadcast, port }
    }
}

#[async_trait]
impl PacketDispatch for UdpDispatcher {
    async fn dispatch(&self, payload: &[u8], target: Option<Ipv4Addr>) -> Result<(), TransmissionFailure> {
        // Bind to any available port
        let socket = UdpSocket::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))).await?;
        socket.set_broadcast(true)?;

        let broadcast = SocketAddrV4::new(self.broadcast, self.port);
        socket.send_to(payload, broadcast).await?;

        // A powered-off target usually has no ARP entry, so this often fails.
        if let Some(target) = target {
            let direct = SocketAddrV4::new(target, self.port);
            if let Err(e) = socket.send_to(payload, direct).await {
                tracing::debug!("Direct send to {} failed: {}", direct, e);
            }
        }

        Ok(())
    }
}
