//! Hardware (link-layer) addresses and the validator that separates real
//! identities from the all-zero and broadcast sentinels.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use regex::Regex;
use thiserror::Error;

/// Six hex pairs joined by `:` or `-`, as printed by `ip neigh` and `arp`
static MAC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9A-Fa-f]{2}[:-]){5}[0-9A-Fa-f]{2}").expect("MAC pattern must compile")
});

const ZERO_SENTINEL: &str = "000000000000";
const BROADCAST_SENTINEL: &str = "ffffffffffff";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid MAC address format")]
pub struct MalformedAddress;

/// A decoded 6-byte hardware address. Displays as `AA:BB:CC:DD:EE:FF`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    pub fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    pub fn octets(&self) -> &[u8; 6] {
        &self.0
    }
}

impl FromStr for MacAddress {
    type Err = MalformedAddress;

    /// Accepts `:`, `-` or `.` separators, or none at all.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex_digits = normalize(s);
        if hex_digits.len() != 12 {
            return Err(MalformedAddress);
        }

        let mut bytes = [0u8; 6];
        hex::decode_to_slice(&hex_digits, &mut bytes).map_err(|_| MalformedAddress)?;
        Ok(Self::new(bytes))
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

/// Strip separators and lower-case.
fn normalize(candidate: &str) -> String {
    candidate
        .chars()
        .filter(|c| !matches!(c, ':' | '-' | '.'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// True when `candidate` is a well-formed address that is neither
/// `00:00:00:00:00:00` nor `FF:FF:FF:FF:FF:FF`.
pub fn is_valid(candidate: &str) -> bool {
    let hex_digits = normalize(candidate);

    hex_digits.len() == 12
        && hex_digits.chars().all(|c| c.is_ascii_hexdigit())
        && hex_digits != ZERO_SENTINEL
        && hex_digits != BROADCAST_SENTINEL
}

/// First hardware-address-looking token in `text`, if any.
pub fn find_in_text(text: &str) -> Option<&str> {
    MAC_PATTERN.find(text).map(|m| m.as_str())
}
