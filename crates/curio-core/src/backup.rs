//! Explicit local backups and JSON export/import.
//!
//! Backups are whole-collection snapshots written to their own slot on
//! demand, never automatically. Exports are the portable variant:
//! pretty-printed JSON with device and account identity stripped so a
//! file can move between installations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{CurioError, Result};
use crate::item::{MediaItem, SyncStatus};
use crate::storage::CollectionStore;

/// Document version stamped into backups and exports.
pub const BACKUP_VERSION: &str = "1.0.0";

/// Bookkeeping about explicit local backups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupMetadata {
    /// When the latest backup was taken
    pub last_backup: DateTime<Utc>,

    /// How many backups have been taken on this installation
    pub backup_count: u32,

    /// Serialized size of the latest backup, in bytes
    pub total_size: u64,

    /// Whether the host should back up on a schedule
    pub auto_backup_enabled: bool,
}

/// A whole-collection snapshot as persisted in the backup slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    pub items: Vec<MediaItem>,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

/// The portable export document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub item_count: usize,
    pub items: Vec<MediaItem>,
}

/// Snapshot the collection into the local backup slot.
///
/// Metadata bookkeeping is advisory: a failure to update it is logged
/// and does not fail the backup.
///
/// # Errors
///
/// Returns the storage error if the backup document itself cannot be
/// written.
///
/// # Returns
///
/// The updated metadata (backup count incremented, size refreshed,
/// auto-backup preference preserved).
pub fn create_local_backup(store: &CollectionStore, items: &[MediaItem]) -> Result<BackupMetadata> {
    let backup = BackupDocument {
        items: items.to_vec(),
        timestamp: Utc::now(),
        version: BACKUP_VERSION.to_string(),
    };
    let size = serde_json::to_string(&backup)?.len() as u64;
    store.write_local_backup(&backup)?;
    debug!(items = items.len(), size, "Local backup created");

    let previous = match store.backup_metadata() {
        Ok(metadata) => metadata,
        Err(err) => {
            warn!(error = %err, "Failed to read backup metadata, starting fresh");
            None
        }
    };
    let metadata = BackupMetadata {
        last_backup: backup.timestamp,
        backup_count: previous.as_ref().map_or(0, |m| m.backup_count) + 1,
        total_size: size,
        auto_backup_enabled: previous.as_ref().is_some_and(|m| m.auto_backup_enabled),
    };
    if let Err(err) = store.set_backup_metadata(&metadata) {
        warn!(error = %err, "Failed to update backup metadata");
    }
    Ok(metadata)
}

/// Read the items in the latest local backup, if one exists.
pub fn restore_local_backup(store: &CollectionStore) -> Result<Option<Vec<MediaItem>>> {
    match store.local_backup()? {
        Some(backup) => {
            debug!(timestamp = %backup.timestamp, items = backup.items.len(), "Restoring local backup");
            Ok(Some(backup.items))
        }
        None => Ok(None),
    }
}

fn sanitize_for_export(item: &MediaItem) -> MediaItem {
    let mut sanitized = item.clone();
    sanitized.sync_status = SyncStatus::Local;
    sanitized.device_id = String::new();
    sanitized.user_id = None;
    sanitized
}

/// Serialize the collection as a portable export document.
///
/// Records are sanitized first: sync status reset to local, device and
/// user identity stripped.
pub fn export_json(items: &[MediaItem]) -> Result<String> {
    let document = ExportDocument {
        version: BACKUP_VERSION.to_string(),
        exported_at: Utc::now(),
        item_count: items.len(),
        items: items.iter().map(sanitize_for_export).collect(),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Parse an export document.
///
/// Only the `items` array is required; other top-level fields are
/// ignored so older exports keep importing.
///
/// # Errors
///
/// Returns [`CurioError::InvalidInput`] when the text is not a JSON
/// object with a well-formed `items` array.
pub fn import_json(text: &str) -> Result<Vec<MediaItem>> {
    #[derive(Deserialize)]
    struct ImportDocument {
        items: Vec<MediaItem>,
    }

    let document: ImportDocument = serde_json::from_str(text)
        .map_err(|err| CurioError::InvalidInput(format!("Invalid import format: {}", err)))?;
    debug!(items = document.items.len(), "Parsed import document");
    Ok(document.items)
}
