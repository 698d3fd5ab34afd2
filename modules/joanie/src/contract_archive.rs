//! Local cache of contract archive ids.
//!
//! Generating an archive takes a while on the Joanie side, so the id returned
//! by [`ContractArchivesApi::create`] is remembered per `(organization,
//! offering)` filter pair and reused until it expires or the server no longer
//! knows it.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use richie_http::ApiError;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::api::ContractArchivesApi;
use crate::contract::model::ContractArchiveRequest;

const KEY_PREFIX: &str = "contract_archive";
const ANY: &str = "*";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store content is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
}

/// String key/value persistence.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: String) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.lock().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// Store persisted as one JSON object in a file. A missing file is an empty
/// store.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, String>, StoreError> {
        match std::fs::read(&self.path) {
            Ok(raw) if raw.iter().all(u8::is_ascii_whitespace) => Ok(HashMap::new()),
            Ok(raw) => Ok(serde_json::from_slice(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Replaces the file through a sibling temp file, so readers never see a
    /// truncated store.
    fn save(&self, entries: &HashMap<String, String>) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(&serde_json::to_vec_pretty(entries)?)?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock();
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        let _guard = self.lock.lock();
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value);
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock();
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Filter pair an archive was generated for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveFilters {
    pub organization_id: Option<String>,
    pub offering_id: Option<String>,
}

impl ArchiveFilters {
    pub fn new(organization_id: Option<String>, offering_id: Option<String>) -> Self {
        Self {
            organization_id,
            offering_id,
        }
    }

    fn key(&self) -> String {
        format!(
            "{KEY_PREFIX}:{}:{}",
            self.organization_id.as_deref().unwrap_or(ANY),
            self.offering_id.as_deref().unwrap_or(ANY)
        )
    }

    fn to_request(&self) -> ContractArchiveRequest {
        ContractArchiveRequest {
            organization_id: self.organization_id.clone(),
            offering_id: self.offering_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredContractArchive {
    pub organization_id: Option<String>,
    pub offering_id: Option<String>,
    pub contract_archive_id: String,
    pub created_on: DateTime<Utc>,
}

pub struct ContractArchiveStore {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    validity: Duration,
}

impl ContractArchiveStore {
    pub fn default_validity() -> Duration {
        Duration::days(1)
    }

    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            validity: Self::default_validity(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_validity(mut self, validity: Duration) -> Self {
        self.validity = validity;
        self
    }

    pub fn store(
        &self,
        filters: &ArchiveFilters,
        contract_archive_id: &str,
    ) -> Result<(), StoreError> {
        let entry = StoredContractArchive {
            organization_id: filters.organization_id.clone(),
            offering_id: filters.offering_id.clone(),
            contract_archive_id: contract_archive_id.to_string(),
            created_on: self.clock.now(),
        };
        self.store.set(&filters.key(), serde_json::to_string(&entry)?)
    }

    /// Stored id for `filters`, `None` once older than the validity window.
    pub fn get(&self, filters: &ArchiveFilters) -> Result<Option<String>, StoreError> {
        let Some(raw) = self.store.get(&filters.key())? else {
            return Ok(None);
        };

        let entry: StoredContractArchive = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(key = %filters.key(), error = %e, "ignoring unreadable archive entry");
                return Ok(None);
            }
        };

        if self.clock.now() - entry.created_on > self.validity {
            tracing::debug!(id = %entry.contract_archive_id, "stored contract archive expired");
            return Ok(None);
        }
        Ok(Some(entry.contract_archive_id))
    }

    pub fn unstore(&self, filters: &ArchiveFilters) -> Result<(), StoreError> {
        self.store.remove(&filters.key())
    }
}

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("no contract archive stored for these filters")]
    Missing,
}

/// Where the archive for a filter pair stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveStatus {
    /// Nothing requested, or the stored id is unknown to the server.
    Idle,
    /// Requested, still being generated.
    Pending(String),
    /// Generated, ready to download.
    Ready(String),
}

/// Archive workflow: request, poll, download.
pub struct ContractArchiveService {
    api: ContractArchivesApi,
    store: ContractArchiveStore,
}

impl ContractArchiveService {
    pub fn new(api: ContractArchivesApi, store: ContractArchiveStore) -> Self {
        Self { api, store }
    }

    pub fn store(&self) -> &ContractArchiveStore {
        &self.store
    }

    /// Initial status. A stored id the server does not know is forgotten.
    #[tracing::instrument(name = "joanie.contract_archive.status", skip_all)]
    pub async fn status(&self, filters: &ArchiveFilters) -> Result<ArchiveStatus, ArchiveError> {
        let Some(id) = self.store.get(filters)? else {
            return Ok(ArchiveStatus::Idle);
        };
        if self.api.check(&id).await? {
            return Ok(ArchiveStatus::Ready(id));
        }
        self.store.unstore(filters)?;
        Ok(ArchiveStatus::Idle)
    }

    /// Ask Joanie for a new archive and remember its id.
    #[tracing::instrument(name = "joanie.contract_archive.request", skip_all)]
    pub async fn request(&self, filters: &ArchiveFilters) -> Result<ArchiveStatus, ArchiveError> {
        let id = self.api.create(&filters.to_request()).await?;
        self.store.store(filters, &id)?;
        Ok(ArchiveStatus::Pending(id))
    }

    /// One polling step for an archive being generated.
    pub async fn poll(&self, id: &str) -> Result<ArchiveStatus, ArchiveError> {
        Ok(if self.api.check(id).await? {
            ArchiveStatus::Ready(id.to_string())
        } else {
            ArchiveStatus::Pending(id.to_string())
        })
    }

    pub async fn download(&self, filters: &ArchiveFilters) -> Result<Bytes, ArchiveError> {
        let id = self.store.get(filters)?.ok_or(ArchiveError::Missing)?;
        Ok(self.api.get(&id).await?)
    }
}
