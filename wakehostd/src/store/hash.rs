use sha2::{Digest, Sha256};
use shared::types::Host;

/// Fingerprint of the registry contents, stable across file order.
/// Clients poll it to notice additions, edits and MAC refreshes after a wake.
pub fn compute_hash(hosts: &[Host]) -> String {
    let mut by_id: Vec<&Host> = hosts.iter().collect();
    by_id.sort_by_key(|h| h.id);

    let json = serde_json::to_string(&by_id)
        .expect("Host records always serialize");

    hex::encode(Sha256::digest(json.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host(id: u64, mac: Option<&str>) -> Host {
        Host {
            id,
            name: format!("host-{id}"),
            ip: "192.168.1.50".to_string(),
            mac: mac.map(str::to_string),
        }
    }

    #[test]
    fn test_file_order_ignored() {
        let a = host(1, Some("AA:BB:CC:DD:EE:FF"));
        let b = host(2, None);

        assert_eq!(
            compute_hash(&[a.clone(), b.clone()]),
            compute_hash(&[b, a]),
        );
    }

    #[test]
    fn test_mac_cleared_changes_hash() {
        assert_ne!(
            compute_hash(&[host(1, Some("AA:BB:CC:DD:EE:FF"))]),
            compute_hash(&[host(1, None)]),
        );
    }

    #[test]
    fn test_mac_refresh_changes_hash() {
        let before = compute_hash(&[host(1, Some("AA:BB:CC:DD:EE:FF")), host(2, None)]);
        let after = compute_hash(&[host(1, Some("11:22:33:44:55:66")), host(2, None)]);

        assert_ne!(before, after, "a wake that refreshes the MAC must be visible");
    }

    #[test]
    fn test_empty_registry() {
        // SHA-256 of "[]"
        assert_eq!(
            compute_hash(&[]),
            "4f53cda18c2baa0c0354bb5f9a3ecbe5ed12ab4d8e11ba873c2f11161202b945"
        );
    }
}
