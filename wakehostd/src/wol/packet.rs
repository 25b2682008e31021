use shared::protocol::{MAC_REPETITIONS, MAGIC_PACKET_LEN, SYNC_STREAM};
use crate::mac::{MacAddress, MalformedAddress};

/// Encoded Wake-on-LAN payload
///
/// Magic packet format:
/// - 6 bytes of 0xFF
/// - Target MAC repeated 16 times (96 bytes)
/// - Total: 102 bytes, no header or padding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagicPacket([u8; MAGIC_PACKET_LEN]);

impl MagicPacket {
    pub fn new(mac: &MacAddress) -> Self {
        let mut packet = [0u8; MAGIC_PACKET_LEN];

        packet[..SYNC_STREAM.len()].copy_from_slice(&SYNC_STREAM);

        for i in 0..MAC_REPETITIONS {
            let offset = SYNC_STREAM.len() + (i * 6);
            packet[offset..offset + 6].copy_from_slice(mac.octets());
        }

        Self(packet)
    }

    /// Parse `mac` (any of `:`, `-`, `.` or no separators) and encode it.
    pub fn encode(mac: &str) -> Result<Self, MalformedAddress> {
        Ok(Self::new(&mac.parse::<MacAddress>()?))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}
