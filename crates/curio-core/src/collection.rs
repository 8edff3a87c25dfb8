//! The collection manager: in-memory cache plus persistence.
//!
//! Mutations are optimistic. Under the mutation lock the manager
//! applies the change to its cache, publishes the new snapshot to
//! watchers, then persists the whole collection. If persistence fails
//! after retries the cache and snapshot are rolled back to the
//! previous state and the error surfaces to the caller.
//!
//! The async mutex doubles as the mutation queue: it is held across
//! the persist await, so a mutation issued while another is in flight
//! waits and then derives from the newest committed state. Reads never
//! take the lock; they borrow the watch channel's snapshot, which
//! includes any optimistic in-flight change.

use chrono::Utc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::barcode::BarcodeScan;
use crate::error::Result;
use crate::item::{ItemPatch, MediaItem, NewItem, SyncStatus};
use crate::loans::{self, LoanInfo};
use crate::sharing::{self, ShareOptions};
use crate::storage::CollectionStore;
use crate::valuation::ValuationUpdate;
use crate::wishlist::{self, WishlistInfo};

/// Serialized, optimistic access to the media collection.
pub struct Collection {
    store: CollectionStore,
    state: Mutex<Vec<MediaItem>>,
    tx: watch::Sender<Vec<MediaItem>>,
}

impl Collection {
    /// Open the collection, performing the initial load.
    ///
    /// Never fails: an unreadable collection degrades to empty (see
    /// [`CollectionStore::load`]).
    pub async fn open(store: CollectionStore) -> Self {
        let items = store.load().await;
        debug!(items = items.len(), "Collection opened");
        let (tx, _) = watch::channel(items.clone());
        Self {
            store,
            state: Mutex::new(items),
            tx,
        }
    }

    /// The backing store, for slot access beyond the collection itself.
    pub fn store(&self) -> &CollectionStore {
        &self.store
    }

    /// Stable identifier for this installation.
    pub fn device_id(&self) -> &str {
        self.store.device_id()
    }

    /// Snapshot of the current collection, optimistic changes included.
    pub fn items(&self) -> Vec<MediaItem> {
        self.tx.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.tx.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.borrow().is_empty()
    }

    /// Look up one item by id.
    pub fn get(&self, id: &str) -> Option<MediaItem> {
        self.tx.borrow().iter().find(|item| item.id == id).cloned()
    }

    /// Subscribe to snapshot updates. Every optimistic apply and every
    /// rollback publishes a new value.
    pub fn watch(&self) -> watch::Receiver<Vec<MediaItem>> {
        self.tx.subscribe()
    }

    /// Add a new item to the collection.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the collection could not be
    /// persisted; the item is not kept in that case.
    ///
    /// # Returns
    ///
    /// The stored item, with generated id and lifecycle fields.
    pub async fn add_item(&self, new: NewItem) -> Result<MediaItem> {
        let mut state = self.state.lock().await;
        let previous = state.clone();

        let item = MediaItem::create(
            new,
            Uuid::new_v4().to_string(),
            self.store.device_id().to_string(),
            Utc::now(),
        );
        state.push(item.clone());
        self.persist_or_rollback(&mut state, previous).await?;
        debug!(id = %item.id, title = %item.title, "Item added");
        Ok(item)
    }

    /// Apply a field patch to an item.
    pub async fn update_item(&self, id: &str, patch: ItemPatch) -> Result<Option<MediaItem>> {
        self.mutate_item(id, |item| patch.apply(item)).await
    }

    /// Delete an item.
    ///
    /// The record is stamped as a tombstone (deletion time, version
    /// bump, pending status) and then compacted out of the stored
    /// collection in the same commit.
    ///
    /// # Returns
    ///
    /// The stamped tombstone, or `None` if no such item exists.
    pub async fn delete_item(&self, id: &str) -> Result<Option<MediaItem>> {
        let mut state = self.state.lock().await;
        let Some(index) = position_of(&state, id) else {
            debug!(id, "Delete skipped, item not found");
            return Ok(None);
        };
        let previous = state.clone();

        let now = Utc::now();
        {
            let item = &mut state[index];
            item.deleted_at = Some(now);
            item.updated_at = now;
            item.version += 1;
            item.sync_status = SyncStatus::Pending;
        }
        let tombstone = state.remove(index);
        self.persist_or_rollback(&mut state, previous).await?;
        debug!(id = %tombstone.id, "Item deleted");
        Ok(Some(tombstone))
    }

    /// Record a loan.
    pub async fn loan_item(&self, id: &str, loan: LoanInfo) -> Result<Option<MediaItem>> {
        self.mutate_item(id, |item| loan.apply(item)).await
    }

    /// Record a loan's return.
    pub async fn return_item(&self, id: &str) -> Result<Option<MediaItem>> {
        self.mutate_item(id, loans::record_return).await
    }

    /// Put an item on the wishlist.
    pub async fn add_to_wishlist(&self, id: &str, info: WishlistInfo) -> Result<Option<MediaItem>> {
        self.mutate_item(id, |item| info.apply(item)).await
    }

    /// Take an item off the wishlist.
    pub async fn remove_from_wishlist(&self, id: &str) -> Result<Option<MediaItem>> {
        self.mutate_item(id, wishlist::clear_wishlist).await
    }

    /// Record an appraisal.
    pub async fn set_valuation(
        &self,
        id: &str,
        update: ValuationUpdate,
    ) -> Result<Option<MediaItem>> {
        self.mutate_item(id, |item| update.apply(item)).await
    }

    /// Attach a validated barcode scan.
    pub async fn attach_barcode(&self, id: &str, scan: BarcodeScan) -> Result<Option<MediaItem>> {
        self.mutate_item(id, |item| scan.apply(item)).await
    }

    /// Update sharing settings.
    pub async fn share_item(&self, id: &str, options: ShareOptions) -> Result<Option<MediaItem>> {
        self.mutate_item(id, |item| options.apply(item)).await
    }

    /// Withdraw all sharing.
    pub async fn revoke_sharing(&self, id: &str) -> Result<Option<MediaItem>> {
        self.mutate_item(id, sharing::revoke_sharing).await
    }

    /// Replace the whole collection, as used by restore, import, and
    /// migration.
    ///
    /// # Returns
    ///
    /// The number of items now in the collection.
    pub async fn replace_all(&self, items: Vec<MediaItem>) -> Result<usize> {
        let mut state = self.state.lock().await;
        let previous = state.clone();

        let count = items.len();
        *state = items;
        self.persist_or_rollback(&mut state, previous).await?;
        info!(items = count, "Collection replaced");
        Ok(count)
    }

    /// Find, mutate, and stamp one item, then persist.
    ///
    /// An id that matches nothing is not an error: the mutation is
    /// skipped, nothing is written, and `None` is returned.
    async fn mutate_item<F>(&self, id: &str, mutate: F) -> Result<Option<MediaItem>>
    where
        F: FnOnce(&mut MediaItem),
    {
        let mut state = self.state.lock().await;
        let Some(index) = position_of(&state, id) else {
            debug!(id, "Mutation skipped, item not found");
            return Ok(None);
        };
        let previous = state.clone();

        let item = &mut state[index];
        mutate(item);
        item.updated_at = Utc::now();
        item.version += 1;
        item.sync_status = SyncStatus::Pending;
        let updated = item.clone();

        self.persist_or_rollback(&mut state, previous).await?;
        debug!(id = %updated.id, version = updated.version, "Item updated");
        Ok(Some(updated))
    }

    /// Publish the mutated state, persist it, and roll back both on
    /// failure. Callers hold the mutation lock.
    async fn persist_or_rollback(
        &self,
        state: &mut Vec<MediaItem>,
        previous: Vec<MediaItem>,
    ) -> Result<()> {
        self.tx.send_replace(state.clone());
        match self.store.save(state).await {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!(error = %err, "Persist failed, rolling back");
                *state = previous;
                self.tx.send_replace(state.clone());
                Err(err)
            }
        }
    }
}

fn position_of(items: &[MediaItem], id: &str) -> Option<usize> {
    items
        .iter()
        .position(|item| item.id == id && !item.is_deleted())
}
