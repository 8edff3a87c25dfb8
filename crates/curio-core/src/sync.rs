//! Sync preparation utilities.
//!
//! Everything here is pure bookkeeping over item slices; nothing talks
//! to a network. Conflict resolution is last-writer-wins: higher
//! `version` first, later `updatedAt` as the tie-breaker.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::item::{MediaItem, SyncStatus};

/// Whether the installation runs against a signed-in account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UserMode {
    #[default]
    Guest,
    Authenticated,
}

impl UserMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserMode::Guest => "guest",
            UserMode::Authenticated => "authenticated",
        }
    }
}

impl std::fmt::Display for UserMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn wins_over(candidate: &MediaItem, incumbent: &MediaItem) -> bool {
    candidate.version > incumbent.version
        || (candidate.version == incumbent.version && candidate.updated_at > incumbent.updated_at)
}

/// Merge two snapshots of the same collection.
///
/// Per id the record with the higher `version` wins; equal versions
/// keep the later `updatedAt`. Tombstoned records never appear in the
/// result. Order is deterministic: local order first, previously
/// unseen remote records appended in remote order.
pub fn merge_items(local: &[MediaItem], remote: &[MediaItem]) -> Vec<MediaItem> {
    let mut merged: Vec<MediaItem> = Vec::with_capacity(local.len() + remote.len());
    let mut index: HashMap<String, usize> = HashMap::with_capacity(local.len() + remote.len());

    for item in local.iter().chain(remote.iter()) {
        match index.get(&item.id) {
            Some(&slot) => {
                if wins_over(item, &merged[slot]) {
                    merged[slot] = item.clone();
                }
            }
            None => {
                index.insert(item.id.clone(), merged.len());
                merged.push(item.clone());
            }
        }
    }

    merged.retain(|item| !item.is_deleted());
    merged
}

/// Records that still need a sync handoff (`local` or `pending`).
pub fn prepare_items_for_sync(items: &[MediaItem]) -> Vec<&MediaItem> {
    items.iter().filter(|item| item.needs_sync()).collect()
}

/// Copies of the given records marked as synced and no longer
/// device-local.
pub fn mark_items_synced(items: &[MediaItem]) -> Vec<MediaItem> {
    items
        .iter()
        .map(|item| {
            let mut synced = item.clone();
            synced.sync_status = SyncStatus::Synced;
            synced.local_only = false;
            synced
        })
        .collect()
}

/// Re-attribute guest records to a signed-in user.
///
/// Every record gets the new owner and device, loses its local-only
/// flag, is queued for sync, and takes a version bump so the rewrite
/// wins a later merge.
pub fn migrate_guest_items(
    items: &[MediaItem],
    user_id: &str,
    device_id: &str,
    now: DateTime<Utc>,
) -> Vec<MediaItem> {
    items
        .iter()
        .map(|item| {
            let mut migrated = item.clone();
            migrated.user_id = Some(user_id.to_string());
            migrated.device_id = device_id.to_string();
            migrated.local_only = false;
            migrated.sync_status = SyncStatus::Pending;
            migrated.updated_at = now;
            migrated.version = item.version + 1;
            migrated
        })
        .collect()
}
