//! # Curio Core
//!
//! Core library for Curio - a local-first catalogue for physical media
//! collections (vinyl, books, films, games).
//!
//! This crate provides the collection manager, storage abstractions, and
//! data models independent of any host interface.
//!
//! ## Architecture
//!
//! - **collection**: Serialized, optimistic mutations over the in-memory
//!   collection with rollback on persistence failure
//! - **storage**: Slot-based durable store, retrying persistence, legacy
//!   back-fill
//! - **item**: The `MediaItem` record and its enumerations
//! - **loans / wishlist / valuation / barcode / sharing**: Domain inputs
//!   and pure derivations
//! - **sync / migration**: Last-writer-wins merge and guest-to-account
//!   migration
//! - **backup**: Local snapshots and portable JSON export/import
//! - **profile / subscription**: User profile, preferences, and tier
//!   entitlements
//! - **query**: Filtering, sorting, grouping, and collection stats

pub mod backup;
pub mod barcode;
pub mod collection;
pub mod error;
pub mod item;
pub mod loans;
pub mod migration;
pub mod profile;
pub mod query;
pub mod retry;
pub mod sharing;
pub mod storage;
pub mod subscription;
pub mod sync;
pub mod valuation;
pub mod wishlist;

pub use collection::Collection;
pub use error::{CurioError, Result};
pub use item::{Category, ItemPatch, MediaItem, NewItem, SyncStatus};
pub use storage::{CollectionStore, FileBackend, MemoryBackend, StorageBackend};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
