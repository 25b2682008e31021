/// API path prefix
pub const API_PREFIX: &str = "/v1";

/// UDP port Wake-on-LAN listeners conventionally watch ("discard")
pub const WOL_PORT: u16 = 9;

/// Leading synchronization bytes of a magic packet
pub const SYNC_STREAM: [u8; 6] = [0xFF; 6];

/// Number of times the target hardware address is repeated
pub const MAC_REPETITIONS: usize = 16;

/// Total magic packet length: sync stream plus 16 copies of the address
pub const MAGIC_PACKET_LEN: usize = SYNC_STREAM.len() + MAC_REPETITIONS * 6;
