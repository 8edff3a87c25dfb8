//! Durable store for the collection and its companion slots.
//!
//! `CollectionStore` is the only component that touches persisted
//! state. The collection is one whole JSON document: loads read and
//! parse the entire array, saves serialize and replace it. Writes that
//! fail transiently retry on a linear schedule; quota denials surface
//! immediately as `StorageFull`.
//!
//! Loading never fails. A slot that cannot be read or parsed after
//! retries degrades to an empty collection, logged at error level.
//! Hosts render an empty library in that case; recovery flows run
//! through the backup slots.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::backup::{BackupDocument, BackupMetadata};
use crate::error::{CurioError, Result};
use crate::item::MediaItem;
use crate::migration::{GuestBackup, MigrationStatus};
use crate::profile::UserProfile;
use crate::retry::{retry_storage, RetryPolicy};
use crate::sync::UserMode;

use super::backend::StorageBackend;
use super::{
    BACKUP_METADATA_KEY, COLLECTION_KEY, DEVICE_ID_KEY, GUEST_BACKUP_KEY, LAST_SYNC_KEY,
    LOCAL_BACKUP_KEY, MIGRATION_STATUS_KEY, SCHEMA_VERSION, SCHEMA_VERSION_KEY, USER_MODE_KEY,
    USER_PROFILE_KEY,
};

/// Durable store over an injected slot backend.
pub struct CollectionStore {
    backend: Arc<dyn StorageBackend>,
    policy: RetryPolicy,
    device_id: String,
}

impl CollectionStore {
    /// Open a store with the default retry schedule.
    ///
    /// Resolves the installation's device id, generating and persisting
    /// one on first use.
    ///
    /// # Errors
    ///
    /// Returns `CurioError::Storage` if the device id slot cannot be
    /// read or created.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Result<Self> {
        Self::with_policy(backend, RetryPolicy::default())
    }

    /// Open a store with a custom retry schedule.
    pub fn with_policy(backend: Arc<dyn StorageBackend>, policy: RetryPolicy) -> Result<Self> {
        let device_id = resolve_device_id(backend.as_ref())?;
        Ok(Self {
            backend,
            policy,
            device_id,
        })
    }

    /// Stable identifier for this installation.
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    // --- Collection slot ---

    /// Load the collection.
    ///
    /// On first run (no collection slot) this records the schema
    /// version marker and returns an empty collection. Records written
    /// by builds that predate the sync fields are back-filled with
    /// defaults, and the migrated collection is persisted immediately
    /// so the back-fill runs at most once.
    pub async fn load(&self) -> Vec<MediaItem> {
        let result = retry_storage(&self.policy, "load_collection", move || async move {
            self.read_collection()
        })
        .await;

        match result {
            Ok(Some((items, migrated))) => {
                if migrated {
                    debug!(
                        items = items.len(),
                        "Back-filled legacy records, persisting migrated collection"
                    );
                    if let Err(err) = self.save(&items).await {
                        warn!(error = %err, "Failed to persist migrated collection");
                    }
                }
                items
            }
            Ok(None) => {
                if let Err(err) = self.write_schema_marker() {
                    warn!(error = %err, "Failed to write schema version marker");
                }
                Vec::new()
            }
            Err(err) => {
                error!(error = %err, "Failed to load collection, starting empty");
                Vec::new()
            }
        }
    }

    /// Persist the whole collection.
    ///
    /// # Errors
    ///
    /// Returns `CurioError::StorageFull` without retrying when the
    /// device is out of space, `CurioError::Storage` once the retry
    /// schedule is exhausted for any other failure.
    pub async fn save(&self, items: &[MediaItem]) -> Result<()> {
        let payload = serde_json::to_string(items)?;
        let payload = payload.as_str();
        retry_storage(&self.policy, "save_collection", move || async move {
            self.backend.put(COLLECTION_KEY, payload)
        })
        .await
    }

    fn read_collection(&self) -> Result<Option<(Vec<MediaItem>, bool)>> {
        match self.backend.get(COLLECTION_KEY)? {
            Some(raw) => {
                let (items, migrated) = hydrate_items(&raw, &self.device_id)?;
                Ok(Some((items, migrated)))
            }
            None => Ok(None),
        }
    }

    fn write_schema_marker(&self) -> Result<()> {
        if self.backend.get(SCHEMA_VERSION_KEY)?.is_none() {
            self.backend.put(SCHEMA_VERSION_KEY, SCHEMA_VERSION)?;
        }
        Ok(())
    }

    /// Schema version recorded in storage, if any.
    pub fn schema_version(&self) -> Result<Option<String>> {
        self.backend.get(SCHEMA_VERSION_KEY)
    }

    // --- Companion slots ---

    /// Guest vs authenticated operation. Defaults to guest.
    pub fn user_mode(&self) -> Result<UserMode> {
        Ok(self.read_slot(USER_MODE_KEY)?.unwrap_or_default())
    }

    pub fn set_user_mode(&self, mode: UserMode) -> Result<()> {
        self.write_slot(USER_MODE_KEY, &mode)
    }

    /// Timestamp of the last successful sync handoff.
    pub fn last_sync(&self) -> Result<Option<DateTime<Utc>>> {
        self.read_slot(LAST_SYNC_KEY)
    }

    pub fn set_last_sync(&self, at: DateTime<Utc>) -> Result<()> {
        self.write_slot(LAST_SYNC_KEY, &at)
    }

    /// Guest-to-account migration progress. Defaults to not started.
    pub fn migration_status(&self) -> Result<MigrationStatus> {
        Ok(self.read_slot(MIGRATION_STATUS_KEY)?.unwrap_or_default())
    }

    pub fn set_migration_status(&self, status: MigrationStatus) -> Result<()> {
        self.write_slot(MIGRATION_STATUS_KEY, &status)
    }

    /// Snapshot guest data before a migration rewrites it.
    pub fn write_guest_backup(&self, backup: &GuestBackup) -> Result<()> {
        self.write_slot(GUEST_BACKUP_KEY, backup)
    }

    pub fn guest_backup(&self) -> Result<Option<GuestBackup>> {
        self.read_slot(GUEST_BACKUP_KEY)
    }

    pub fn clear_guest_backup(&self) -> Result<()> {
        self.backend.remove(GUEST_BACKUP_KEY)
    }

    /// Signed-in user profile, if one has been created.
    pub fn profile(&self) -> Result<Option<UserProfile>> {
        self.read_slot(USER_PROFILE_KEY)
    }

    pub fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        self.write_slot(USER_PROFILE_KEY, profile)
    }

    pub fn clear_profile(&self) -> Result<()> {
        self.backend.remove(USER_PROFILE_KEY)
    }

    /// Bookkeeping about explicit local backups.
    pub fn backup_metadata(&self) -> Result<Option<BackupMetadata>> {
        self.read_slot(BACKUP_METADATA_KEY)
    }

    pub fn set_backup_metadata(&self, metadata: &BackupMetadata) -> Result<()> {
        self.write_slot(BACKUP_METADATA_KEY, metadata)
    }

    /// The most recent explicit local backup.
    pub fn local_backup(&self) -> Result<Option<BackupDocument>> {
        self.read_slot(LOCAL_BACKUP_KEY)
    }

    pub fn write_local_backup(&self, backup: &BackupDocument) -> Result<()> {
        self.write_slot(LOCAL_BACKUP_KEY, backup)
    }

    fn read_slot<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.backend.get(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn write_slot<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let payload = serde_json::to_string(value)?;
        self.backend.put(key, &payload)
    }
}

fn resolve_device_id(backend: &dyn StorageBackend) -> Result<String> {
    match backend.get(DEVICE_ID_KEY)? {
        Some(existing) if !existing.trim().is_empty() => Ok(existing.trim().to_string()),
        _ => {
            let id = Uuid::new_v4().to_string();
            backend.put(DEVICE_ID_KEY, &id)?;
            Ok(id)
        }
    }
}

/// Parse a stored collection document, back-filling sync fields on
/// records that predate them.
///
/// Returns the items and whether anything was filled in. Back-fill
/// defaults: `updatedAt` from `createdAt`, `localOnly` true,
/// `syncStatus` local, `deviceId` from this installation, `version` 1.
fn hydrate_items(raw: &str, device_id: &str) -> Result<(Vec<MediaItem>, bool)> {
    let mut values: Vec<Value> = serde_json::from_str(raw)?;
    let mut migrated = false;

    for value in &mut values {
        let obj = value.as_object_mut().ok_or_else(|| {
            CurioError::Storage("Collection document entry is not an object".to_string())
        })?;

        if !obj.contains_key("updatedAt") {
            if let Some(created) = obj.get("createdAt").cloned() {
                obj.insert("updatedAt".to_string(), created);
                migrated = true;
            }
        }
        if !obj.contains_key("localOnly") {
            obj.insert("localOnly".to_string(), Value::Bool(true));
            migrated = true;
        }
        if !obj.contains_key("syncStatus") {
            obj.insert("syncStatus".to_string(), Value::String("local".to_string()));
            migrated = true;
        }
        if !obj.contains_key("deviceId") {
            obj.insert("deviceId".to_string(), Value::String(device_id.to_string()));
            migrated = true;
        }
        if !obj.contains_key("version") {
            obj.insert("version".to_string(), Value::from(1u32));
            migrated = true;
        }
    }

    let items: Vec<MediaItem> = serde_json::from_value(Value::Array(values))?;
    Ok((items, migrated))
}
