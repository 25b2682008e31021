//! Wake-on-LAN
//!
//! Wake-on-LAN is a simple protocol that sends a "magic packet" to wake
//! a machine from a powered-off state. Delivery is never acknowledged.

pub mod dispatch;
pub mod packet;

pub use dispatch::{PacketDispatch, TransmissionFailure, UdpDispatcher};
pub use packet::MagicPacket;
