use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;
use anyhow::Result;
use shared::types::{Host, OpResponse};
use crate::registry::Registry;
use crate::store::hash;

/// Commands sent to the registry task
pub enum RegistryCommand {
    List(oneshot::Sender<Result<Vec<Host>>>),
    Add {
        name: String,
        ip: String,
        reply: oneshot::Sender<OpResponse>,
    },
    Update {
        id: u64,
        name: String,
        ip: String,
        reply: oneshot::Sender<OpResponse>,
    },
    Delete(u64, oneshot::Sender<OpResponse>),
    Wake(u64, oneshot::Sender<OpResponse>),
}

/// Handle to the registry task. Commands run one at a time, so no two
/// load-mutate-save sequences ever interleave.
#[derive(Clone)]
pub struct RegistryHandle {
    tx: mpsc::Sender<RegistryCommand>,
}

impl RegistryHandle {
    /// Spawn the registry task. It exits when `cancel` fires or every handle is dropped.
    pub fn spawn(
        registry: Registry,
        hash_tx: watch::Sender<String>,
        cancel: CancellationToken,
    ) -> (Self, tokio::task::JoinHandle<()>) {
        let (tx, rx) = mpsc::channel::<RegistryCommand>(64);
        let task = tokio::spawn(run(registry, rx, hash_tx, cancel));
        (Self { tx }, task)
    }

    pub async fn list(&self) -> Result<Vec<Host>> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(RegistryCommand::List(reply)).await?;
        rx.await?
    }

    pub async fn add(&self, name: String, ip: String) -> Result<OpResponse> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(RegistryCommand::Add { name, ip, reply }).await?;
        Ok(rx.await?)
    }

    pub async fn update(&self, id: u64, name: String, ip: String) -> Result<OpResponse> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(RegistryCommand::Update { id, name, ip, reply }).await?;
        Ok(rx.await?)
    }

    pub async fn delete(&self, id: u64) -> Result<OpResponse> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(RegistryCommand::Delete(id, reply)).await?;
        Ok(rx.await?)
    }

    pub async fn wake(&self, id: u64) -> Result<OpResponse> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(RegistryCommand::Wake(id, reply)).await?;
        Ok(rx.await?)
    }
}

/// Registry event loop
async fn run(
    registry: Registry,
    mut rx: mpsc::Receiver<RegistryCommand>,
    hash_tx: watch::Sender<String>,
    cancel: CancellationToken,
) {
    loop {
        let cmd = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!("Registry task shutting down");
                break;
            }
            cmd = rx.recv() => match cmd {
                Some(cmd) => cmd,
                None => break,
            },
        };

        match cmd {
            RegistryCommand::List(reply) => {
                let result = registry.list_hosts().await.map_err(anyhow::Error::from);
                let _ = reply.send(result);
            }
            RegistryCommand::Add { name, ip, reply } => {
                let response = registry.add_host(&name, &ip).await;
                if response.success {
                    publish_hash(&registry, &hash_tx).await;
                }
                let _ = reply.send(response);
            }
            RegistryCommand::Update { id, name, ip, reply } => {
                let response = registry.update_host(id, &name, &ip).await;
                if response.success {
                    publish_hash(&registry, &hash_tx).await;
                }
                let _ = reply.send(response);
            }
            RegistryCommand::Delete(id, reply) => {
                let response = registry.delete_host(id).await;
                if response.success {
                    publish_hash(&registry, &hash_tx).await;
                }
                let _ = reply.send(response);
            }
            RegistryCommand::Wake(id, reply) => {
                // Wake may have refreshed a stored MAC
                let response = registry.wake_host(id).await;
                publish_hash(&registry, &hash_tx).await;
                let _ = reply.send(response);
            }
        }
    }
}

/// Recompute the fingerprint and publish it only if it changed.
async fn publish_hash(registry: &Registry, hash_tx: &watch::Sender<String>) {
    match registry.list_hosts().await {
        Ok(hosts) => {
            let new_hash = hash::compute_hash(&hosts);
            hash_tx.send_if_modified(|current| {
                if *current == new_hash {
                    false
                } else {
                    *current = new_hash;
                    true
                }
            });
        }
        Err(e) => tracing::error!("Failed to recompute registry hash: {}", e),
    }
}
