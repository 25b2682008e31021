//! Host registry operations: list, add, update, delete, and wake.
//!
//! Every operation reloads the host file, mutates the loaded list, and saves
//! it straight back. Errors never escape: each public operation folds its
//! result into the uniform [`OpResponse`] shape.

use std::net::Ipv4Addr;
use std::sync::Arc;
use thiserror::Error;
use shared::types::{Host, OpResponse};
use crate::mac::{MacAddress, MalformedAddress};
use crate::resolver::{MacResolver, ResolutionFailure};
use crate::store::{HostList, HostStore};
use crate::wol::{MagicPacket, PacketDispatch, TransmissionFailure};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Resolution(#[from] ResolutionFailure),

    #[error(transparent)]
    MalformedAddress(#[from] MalformedAddress),

    #[error(transparent)]
    Transmission(#[from] TransmissionFailure),

    #[error("Host not found")]
    HostNotFound,

    #[error("No MAC address available")]
    NoAddressAvailable,

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, RegistryError>;

pub struct Registry {
    store: HostStore,
    resolver: MacResolver,
    dispatcher: Arc<dyn PacketDispatch>,
}

impl Registry {
    pub fn new(store: HostStore, resolver: MacResolver, dispatcher: Arc<dyn PacketDispatch>) -> Self {
        Self {
            store,
            resolver,
            dispatcher,
        }
    }

    pub async fn list_hosts(&self) -> Result<Vec<Host>> {
        Ok(self.store.load().await?.into_vec())
    }

    pub async fn add_host(&self, name: &str, ip: &str) -> OpResponse {
        match self.try_add(name, ip).await {
            Ok(host) => OpResponse::with_host(host),
            Err(e) => failure("adding host", e),
        }
    }

    pub async fn update_host(&self, id: u64, name: &str, ip: &str) -> OpResponse {
        match self.try_update(id, name, ip).await {
            Ok(host) => OpResponse::with_host(host),
            Err(e) => failure("updating host", e),
        }
    }

    /// Deleting an unknown id succeeds.
    pub async fn delete_host(&self, id: u64) -> OpResponse {
        match self.try_delete(id).await {
            Ok(()) => OpResponse::ok(),
            Err(e) => failure("deleting host", e),
        }
    }

    /// Confirms the packet was sent, not that the machine woke up.
    pub async fn wake_host(&self, id: u64) -> OpResponse {
        match self.try_wake(id).await {
            Ok(message) => OpResponse::with_message(message),
            Err(e) => failure("sending WOL packet", e),
        }
    }

    async fn try_add(&self, name: &str, ip: &str) -> Result<Host> {
        let (name, ip) = validate_input(name, ip)?;
        let mac = self.resolver.resolve(ip).await?;

        let mut hosts = self.store.load().await?;
        let host = Host {
            id: hosts.next_id(),
            name,
            ip: ip.to_string(),
            mac: Some(mac.to_string()),
        };
        hosts.push(host.clone());
        self.store.save(&hosts).await?;

        tracing::info!("Added host {}: {} ({} -> {})", host.id, host.name, host.ip, mac);
        Ok(host)
    }

    async fn try_update(&self, id: u64, name: &str, ip: &str) -> Result<Host> {
        let (name, ip) = validate_input(name, ip)?;

        let mut hosts = self.store.load().await?;
        let existing = hosts.get(id).ok_or(RegistryError::HostNotFound)?;

        let mac = if existing.ip.parse::<Ipv4Addr>().ok() == Some(ip) {
            existing.mac.clone()
        } else {
            Some(self.resolver.resolve(ip).await?.to_string())
        };

        let host = hosts.get_mut(id).ok_or(RegistryError::HostNotFound)?;
        host.name = name;
        host.ip = ip.to_string();
        host.mac = mac;
        let updated = host.clone();
        self.store.save(&hosts).await?;

        tracing::info!("Updated host {}: {}", updated.id, updated.name);
        Ok(updated)
    }

    async fn try_delete(&self, id: u64) -> Result<()> {
        let mut hosts = self.store.load().await?;
        if hosts.remove(id) {
            self.store.save(&hosts).await?;
            tracing::info!("Deleted host with id: {}", id);
        } else {
            tracing::debug!("Delete of unknown host id {}", id);
        }
        Ok(())
    }

    /// A record whose IP does not parse (hand-edited file) can still be woken
    /// from its stored MAC; the packet then goes out as broadcast only.
    async fn try_wake(&self, id: u64) -> Result<String> {
        let mut hosts = self.store.load().await?;
        let host = hosts.get(id).cloned().ok_or(RegistryError::HostNotFound)?;
        let target = host.ip.parse::<Ipv4Addr>().ok();

        let resolved = match target {
            Some(ip) => match self.resolver.resolve(ip).await {
                Ok(mac) => Some(mac),
                Err(e) => {
                    tracing::warn!(
                        "Could not refresh MAC after {} attempts, using stored value: {}",
                        e.attempts,
                        e
                    );
                    None
                }
            },
            None => {
                tracing::warn!(
                    "Host {} has IP {:?} which is not IPv4, broadcasting only",
                    host.name,
                    host.ip
                );
                None
            }
        };

        let mac = match resolved {
            Some(mac) => {
                self.refresh_stored_mac(&mut hosts, &host, mac).await;
                mac.to_string()
            }
            None => host.mac.clone().ok_or(RegistryError::NoAddressAvailable)?,
        };

        let packet = MagicPacket::encode(&mac)?;
        self.dispatcher.dispatch(packet.as_bytes(), target).await?;

        tracing::info!("Sent WOL packet to {} ({} -> {})", host.name, host.ip, mac);
        Ok(format!("Wake-on-LAN packet sent to {} ({})", host.name, mac))
    }

    /// Persist a newly resolved address. A failed save is logged and the wake proceeds.
    async fn refresh_stored_mac(&self, hosts: &mut HostList, host: &Host, mac: MacAddress) {
        let stored = host.mac.as_deref().and_then(|m| m.parse::<MacAddress>().ok());
        if stored == Some(mac) {
            return;
        }

        if let Some(entry) = hosts.get_mut(host.id) {
            entry.mac = Some(mac.to_string());
        }
        match self.store.save(hosts).await {
            Ok(()) => tracing::info!("Updated stored MAC for {} to {}", host.name, mac),
            Err(e) => tracing::warn!("Failed to persist refreshed MAC for {}: {:#}", host.name, e),
        }
    }
}

fn failure(action: &str, e: RegistryError) -> OpResponse {
    tracing::error!("Error {}: {}", action, e);
    OpResponse::failure(e.to_string())
}

fn validate_input(name: &str, ip: &str) -> Result<(String, Ipv4Addr)> {
    let name = name.trim();
    let ip = ip.trim();
    if name.is_empty() || ip.is_empty() {
        return Err(RegistryError::Validation(
            "Name and IP address are required".to_string(),
        ));
    }
    let ip = ip
        .parse()
        .map_err(|_| RegistryError::Validation(format!("Invalid IPv4 address: {ip}")))?;
    Ok((name.to_string(), ip))
}
