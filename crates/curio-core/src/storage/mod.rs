//! Durable storage for the media collection.
//!
//! Everything curio persists lives in a small set of named slots, each
//! holding one whole JSON document. `CollectionStore` owns every slot;
//! no other component writes them. The raw slot access sits behind the
//! `StorageBackend` trait so hosts and tests can swap the medium.

mod backend;
mod store;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};
pub use store::CollectionStore;

/// Slot holding the serialized item array.
pub const COLLECTION_KEY: &str = "media_collection";

/// Slot holding the storage schema version marker.
pub const SCHEMA_VERSION_KEY: &str = "schema_version";

/// Slot holding the per-installation device id.
pub const DEVICE_ID_KEY: &str = "device_id";

/// Slot recording guest vs authenticated operation.
pub const USER_MODE_KEY: &str = "user_mode";

/// Slot holding the signed-in user profile.
pub const USER_PROFILE_KEY: &str = "user_profile";

/// Slot recording the last successful sync handoff.
pub const LAST_SYNC_KEY: &str = "last_sync_timestamp";

/// Slot recording guest-to-account migration progress.
pub const MIGRATION_STATUS_KEY: &str = "migration_status";

/// Slot holding the pre-migration snapshot of guest data.
pub const GUEST_BACKUP_KEY: &str = "guest_data_backup";

/// Slot holding bookkeeping about local backups.
pub const BACKUP_METADATA_KEY: &str = "backup_metadata";

/// Slot holding the most recent explicit local backup.
pub const LOCAL_BACKUP_KEY: &str = "local_backup";

/// Schema version written by this build. Recorded on first run and
/// consulted only by future migrations, never as a required minimum.
pub const SCHEMA_VERSION: &str = "1";
