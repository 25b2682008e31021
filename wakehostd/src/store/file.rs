use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use shared::types::Host;
use crate::config::StoreConfig;

/// The loaded working set. Passed into each registry operation and handed
/// back to the store to persist; nothing keeps it between operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostList {
    hosts: Vec<Host>,
}

impl HostList {
    pub fn new(hosts: Vec<Host>) -> Self {
        Self { hosts }
    }

    /// 1 + the highest id in use, or 1 when empty. Gaps are never reused.
    pub fn next_id(&self) -> u64 {
        self.hosts.iter().map(|h| h.id).max().map_or(1, |max| max + 1)
    }

    pub fn get(&self, id: u64) -> Option<&Host> {
        self.hosts.iter().find(|h| h.id == id)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut Host> {
        self.hosts.iter_mut().find(|h| h.id == id)
    }

    pub fn push(&mut self, host: Host) {
        self.hosts.push(host);
    }

    /// Remove the host with `id`. Returns true if one was removed.
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.hosts.len();
        self.hosts.retain(|h| h.id != id);
        self.hosts.len() != before
    }

    pub fn as_slice(&self) -> &[Host] {
        &self.hosts
    }

    pub fn into_vec(self) -> Vec<Host> {
        self.hosts
    }
}

/// Flat JSON file holding every host, pretty-printed with 2-space indentation.
#[derive(Debug, Clone)]
pub struct HostStore {
    path: PathBuf,
    keep_backup: bool,
}

impl HostStore {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            path: config.path.clone(),
            keep_backup: config.keep_backup,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file off the async runtime. A missing file is an empty list.
    pub async fn load(&self) -> Result<HostList> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.load_blocking())
            .await
            .context("Host store load task failed")?
    }

    /// Persist `hosts` off the async runtime.
    pub async fn save(&self, hosts: &HostList) -> Result<()> {
        let store = self.clone();
        let hosts = hosts.clone();
        tokio::task::spawn_blocking(move || store.save_blocking(&hosts))
            .await
            .context("Host store save task failed")?
    }

    pub fn load_blocking(&self) -> Result<HostList> {
        if !self.path.exists() {
            return Ok(HostList::default());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read host file: {}", self.path.display()))?;

        let hosts: Vec<Host> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse host file: {}", self.path.display()))?;

        Ok(HostList::new(hosts))
    }

    /// Replace the file atomically: write a sibling temp file, sync, rename.
    pub fn save_blocking(&self, hosts: &HostList) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let serialized = serde_json::to_string_pretty(hosts.as_slice())
            .context("Failed to serialize hosts")?;

        let temp_path = self.path.with_extension("json.tmp");
        {
            let mut file = File::create(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;
            file.write_all(serialized.as_bytes())
                .with_context(|| format!("Failed to write temp file: {}", temp_path.display()))?;
            file.sync_all()
                .with_context(|| format!("Failed to sync temp file: {}", temp_path.display()))?;
        }

        if self.keep_backup && self.path.exists() {
            let backup_path = self.path.with_extension("json.bak");
            if let Err(e) = fs::copy(&self.path, &backup_path) {
                tracing::warn!("Failed to create backup {}: {}", backup_path.display(), e);
            }
        }

        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        tracing::debug!("Saved {} hosts to {}", hosts.as_slice().len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn host(id: u64, mac: Option<&str>) -> Host {
        Host {
            id,
            name: format!("host{id}"),
            ip: format!("192.168.1.{id}"),
            mac: mac.map(str::to_string),
        }
    }

    fn store_in(dir: &TempDir) -> HostStore {
        HostStore::new(&StoreConfig {
            path: dir.path().join("hosts.json"),
            keep_backup: false,
        })
    }

    #[test]
    fn test_next_id() {
        assert_eq!(HostList::default().next_id(), 1);

        let list = HostList::new(vec![host(1, None), host(3, None), host(5, None)]);
        assert_eq!(list.next_id(), 6);
    }

    #[test]
    fn test_remove_reports_change() {
        let mut list = HostList::new(vec![host(1, None), host(2, None)]);
        assert!(list.remove(1));
        assert!(!list.remove(1));
        assert_eq!(list.as_slice().len(), 1);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.load_blocking().unwrap(), HostList::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let list = HostList::new(vec![host(1, Some("AA:BB:CC:DD:EE:FF")), host(2, None)]);

        store.save_blocking(&list).unwrap();
        assert_eq!(store.load_blocking().unwrap(), list);
    }

    #[test]
    fn test_file_format() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store
            .save_blocking(&HostList::new(vec![host(1, Some("AA:BB:CC:DD:EE:FF"))]))
            .unwrap();

        let contents = fs::read_to_string(store.path()).unwrap();
        assert_eq!(
            contents,
            "[\n  {\n    \"id\": 1,\n    \"name\": \"host1\",\n    \"ip\": \"192.168.1.1\",\n    \"mac\": \"AA:BB:CC:DD:EE:FF\"\n  }\n]"
        );
    }

    #[test]
    fn test_save_creates_directories_and_backup() {
        let dir = TempDir::new().unwrap();
        let store = HostStore::new(&StoreConfig {
            path: dir.path().join("nested").join("hosts.json"),
            keep_backup: true,
        });

        store.save_blocking(&HostList::new(vec![host(1, None)])).unwrap();
        store.save_blocking(&HostList::new(vec![host(2, None)])).unwrap();

        let backup = dir.path().join("nested").join("hosts.json.bak");
        let backed_up: Vec<Host> =
            serde_json::from_str(&fs::read_to_string(backup).unwrap()).unwrap();
        assert_eq!(backed_up[0].id, 1);
        assert_eq!(store.load_blocking().unwrap().as_slice()[0].id, 2);
    }

    #[tokio::test]
    async fn test_async_save_and_load() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let list = HostList::new(vec![host(4, Some("AA:BB:CC:DD:EE:FF"))]);

        store.save(&list).await.unwrap();
        assert_eq!(store.load().await.unwrap(), list);
        assert!(!dir.path().join("hosts.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_async_load_reports_corruption() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "[{").unwrap();

        let err = store.load().await.unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse host file"));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "not json").unwrap();
        assert!(store.load_blocking().is_err());
    }
}
