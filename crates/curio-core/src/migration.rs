//! Guest-to-account migration.
//!
//! Signing in re-attributes every guest record to the new user. The
//! flow is: mark in-progress, snapshot the guest data to its backup
//! slot, rewrite and commit the collection, mark completed. Any hard
//! failure marks the migration failed and propagates; the backup slot
//! is left in place either way so the guest data can always be
//! recovered.
//!
//! Status markers are advisory. A failed marker write is logged and
//! never aborts a migration that otherwise succeeded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::collection::Collection;
use crate::error::Result;
use crate::item::MediaItem;
use crate::storage::CollectionStore;
use crate::sync::migrate_guest_items;

/// Where a guest-to-account migration currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MigrationStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    Failed,
}

impl MigrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MigrationStatus::NotStarted => "not-started",
            MigrationStatus::InProgress => "in-progress",
            MigrationStatus::Completed => "completed",
            MigrationStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for MigrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the guest collection taken before a migration rewrote it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestBackup {
    pub items: Vec<MediaItem>,
    pub timestamp: DateTime<Utc>,
}

impl GuestBackup {
    pub fn new(items: Vec<MediaItem>, timestamp: DateTime<Utc>) -> Self {
        Self { items, timestamp }
    }
}

fn set_status_logged(store: &CollectionStore, status: MigrationStatus) {
    if let Err(err) = store.set_migration_status(status) {
        warn!(status = %status, error = %err, "Failed to record migration status");
    }
}

/// Migrate the guest collection to a signed-in user.
///
/// # Errors
///
/// Propagates the first storage failure from the backup write or the
/// collection commit. The migration status slot reads `failed`
/// afterwards and the collection keeps its guest state.
///
/// # Returns
///
/// The re-attributed items as committed.
pub async fn migrate_guest_data(collection: &Collection, user_id: &str) -> Result<Vec<MediaItem>> {
    let store = collection.store();
    info!(user_id, "Starting guest data migration");
    set_status_logged(store, MigrationStatus::InProgress);

    match run_migration(collection, user_id).await {
        Ok(items) => {
            set_status_logged(store, MigrationStatus::Completed);
            info!(items = items.len(), "Guest data migration completed");
            Ok(items)
        }
        Err(err) => {
            error!(error = %err, "Guest data migration failed");
            set_status_logged(store, MigrationStatus::Failed);
            Err(err)
        }
    }
}

async fn run_migration(collection: &Collection, user_id: &str) -> Result<Vec<MediaItem>> {
    let guest_items = collection.items();
    collection
        .store()
        .write_guest_backup(&GuestBackup::new(guest_items.clone(), Utc::now()))?;

    let migrated = migrate_guest_items(&guest_items, user_id, collection.device_id(), Utc::now());
    collection.replace_all(migrated.clone()).await?;
    Ok(migrated)
}
