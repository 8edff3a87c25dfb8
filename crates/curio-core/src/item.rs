//! Core data types for the media collection.
//!
//! `MediaItem` is the persisted record. It serializes with camelCase keys
//! and omits unset optional fields, so documents written by older builds
//! keep deserializing as the schema grows (additive-only evolution).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CurioError;

/// Fixed set of media categories, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Vinyl,
    Cds,
    Books,
    Dvds,
    Vhs,
    Magazines,
    Games,
    Other,
}

impl Category {
    /// All categories in canonical display order.
    pub const ALL: [Category; 8] = [
        Category::Vinyl,
        Category::Cds,
        Category::Books,
        Category::Dvds,
        Category::Vhs,
        Category::Magazines,
        Category::Games,
        Category::Other,
    ];

    /// Stable identifier used on the wire and in CLI arguments.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Vinyl => "vinyl",
            Category::Cds => "cds",
            Category::Books => "books",
            Category::Dvds => "dvds",
            Category::Vhs => "vhs",
            Category::Magazines => "magazines",
            Category::Games => "games",
            Category::Other => "other",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Vinyl => "Vinyl Records",
            Category::Cds => "CDs",
            Category::Books => "Books",
            Category::Dvds => "DVDs",
            Category::Vhs => "VHS Tapes",
            Category::Magazines => "Magazines",
            Category::Games => "Video Games",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CurioError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vinyl" => Ok(Category::Vinyl),
            "cds" => Ok(Category::Cds),
            "books" => Ok(Category::Books),
            "dvds" => Ok(Category::Dvds),
            "vhs" => Ok(Category::Vhs),
            "magazines" => Ok(Category::Magazines),
            "games" => Ok(Category::Games),
            "other" => Ok(Category::Other),
            other => Err(CurioError::InvalidInput(format!(
                "Unknown category: {}",
                other
            ))),
        }
    }
}

/// Sync lifecycle state of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// Never attributed to an account; exists only on this device
    #[default]
    Local,
    /// Mutated since the last sync handoff
    Pending,
    /// Acknowledged by a sync backend
    Synced,
    /// Concurrent edits detected; needs resolution
    Conflict,
}

/// Physical condition used for valuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Mint,
    Excellent,
    Good,
    Fair,
    Poor,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Mint => "mint",
            Condition::Excellent => "excellent",
            Condition::Good => "good",
            Condition::Fair => "fair",
            Condition::Poor => "poor",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Condition {
    type Err = CurioError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mint" => Ok(Condition::Mint),
            "excellent" => Ok(Condition::Excellent),
            "good" => Ok(Condition::Good),
            "fair" => Ok(Condition::Fair),
            "poor" => Ok(Condition::Poor),
            other => Err(CurioError::InvalidInput(format!(
                "Unknown condition: {}",
                other
            ))),
        }
    }
}

/// Stored loan state. The effective state is derived at read time;
/// see `loans::effective_loan_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Available,
    Loaned,
    Overdue,
}

/// Wishlist priority. Ordering is ascending urgency (`Low < High`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WishlistPriority {
    Low,
    Medium,
    High,
}

impl WishlistPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            WishlistPriority::Low => "low",
            WishlistPriority::Medium => "medium",
            WishlistPriority::High => "high",
        }
    }
}

impl fmt::Display for WishlistPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WishlistPriority {
    type Err = CurioError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(WishlistPriority::Low),
            "medium" => Ok(WishlistPriority::Medium),
            "high" => Ok(WishlistPriority::High),
            other => Err(CurioError::InvalidInput(format!(
                "Unknown priority: {}",
                other
            ))),
        }
    }
}

/// Barcode symbology attached to an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarcodeFormat {
    Upc,
    Ean,
    Isbn,
    Qr,
    Other,
}

impl BarcodeFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            BarcodeFormat::Upc => "upc",
            BarcodeFormat::Ean => "ean",
            BarcodeFormat::Isbn => "isbn",
            BarcodeFormat::Qr => "qr",
            BarcodeFormat::Other => "other",
        }
    }
}

impl fmt::Display for BarcodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BarcodeFormat {
    type Err = CurioError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "upc" => Ok(BarcodeFormat::Upc),
            "ean" => Ok(BarcodeFormat::Ean),
            "isbn" => Ok(BarcodeFormat::Isbn),
            "qr" => Ok(BarcodeFormat::Qr),
            "other" => Ok(BarcodeFormat::Other),
            other => Err(CurioError::InvalidInput(format!(
                "Unknown barcode format: {}",
                other
            ))),
        }
    }
}

/// A single catalogued item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    /// Opaque unique identifier (UUID v4), immutable after creation
    pub id: String,

    /// Item title (non-empty; validated by the caller)
    pub title: String,

    /// Media category
    pub category: Category,

    /// Reference to the item photo (a URI, never image data)
    pub photo_uri: String,

    /// Free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// When this item was created
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last successful mutation
    pub updated_at: DateTime<Utc>,

    /// Tombstone marker; set on delete, compacted out of the stored array
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,

    /// Mutation counter, starts at 1 and increments by exactly one
    pub version: u32,

    /// Sync lifecycle state
    pub sync_status: SyncStatus,

    /// True until the record is attributed to an account
    pub local_only: bool,

    /// Installation that created or last migrated this record
    pub device_id: String,

    /// Owning account, absent in guest mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    // --- Valuation ---
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_price: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_value: Option<f64>,

    /// ISO 4217 currency code for the price fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valuation_date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valuation_source: Option<String>,

    // --- Loan tracking ---
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loaned_to: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loaned_to_contact: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loaned_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_return_date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loan_notes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loan_status: Option<LoanStatus>,

    // --- Wishlist ---
    #[serde(default, skip_serializing_if = "is_false")]
    pub wishlist: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wishlist_priority: Option<WishlistPriority>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wishlist_added_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wishlist_notes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_price: Option<f64>,

    // --- Sharing ---
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_token: Option<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub is_public: bool,

    /// Account ids this item is shared with
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shared_with: Vec<String>,

    // --- Barcode ---
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode_type: Option<BarcodeFormat>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scanned_at: Option<DateTime<Utc>>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl MediaItem {
    /// Construct a fresh record from validated content fields.
    ///
    /// Identity and attribution are supplied by the collection manager;
    /// every extension field starts unset.
    pub fn create(new: NewItem, id: String, device_id: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: new.title,
            category: new.category,
            photo_uri: new.photo_uri,
            notes: new.notes,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            version: 1,
            sync_status: SyncStatus::Local,
            local_only: true,
            device_id,
            user_id: new.user_id,
            purchase_price: None,
            current_value: None,
            currency: None,
            condition: None,
            valuation_date: None,
            valuation_source: None,
            loaned_to: None,
            loaned_to_contact: None,
            loaned_at: None,
            expected_return_date: None,
            loan_notes: None,
            loan_status: None,
            wishlist: false,
            wishlist_priority: None,
            wishlist_added_at: None,
            wishlist_notes: None,
            target_price: None,
            share_token: None,
            is_public: false,
            shared_with: Vec::new(),
            barcode: None,
            barcode_type: None,
            scanned_at: None,
        }
    }

    /// Whether this record is a delete tombstone.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Whether this record still needs to reach a sync backend.
    pub fn needs_sync(&self) -> bool {
        matches!(self.sync_status, SyncStatus::Local | SyncStatus::Pending)
    }
}

/// Builder for creating new items.
///
/// Identity, timestamps, version, and sync fields are derived by the
/// collection manager; callers only supply the validated content fields.
#[derive(Debug, Clone)]
pub struct NewItem {
    /// Item title (non-empty)
    pub title: String,

    /// Media category
    pub category: Category,

    /// Photo reference; empty when no photo was captured
    pub photo_uri: String,

    /// Free-form notes
    pub notes: Option<String>,

    /// Owning account, if signed in
    pub user_id: Option<String>,
}

impl NewItem {
    pub fn new(title: impl Into<String>, category: Category, photo_uri: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            category,
            photo_uri: photo_uri.into(),
            notes: None,
            user_id: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

/// Partial update for the editable content fields.
///
/// Unset fields are left untouched. Lifecycle bookkeeping (`version`,
/// `updated_at`, `sync_status`) is handled by the collection manager.
#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
    pub title: Option<String>,
    pub category: Option<Category>,
    pub photo_uri: Option<String>,
    pub notes: Option<String>,
}

impl ItemPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn photo_uri(mut self, photo_uri: impl Into<String>) -> Self {
        self.photo_uri = Some(photo_uri.into());
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// True when no field is set (applying it would be a no-op).
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.category.is_none()
            && self.photo_uri.is_none()
            && self.notes.is_none()
    }

    /// Apply the patch to an item, leaving unset fields untouched.
    pub fn apply(&self, item: &mut MediaItem) {
        if let Some(title) = &self.title {
            item.title = title.clone();
        }
        if let Some(category) = self.category {
            item.category = category;
        }
        if let Some(photo_uri) = &self.photo_uri {
            item.photo_uri = photo_uri.clone();
        }
        if let Some(notes) = &self.notes {
            item.notes = Some(notes.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_item(id: &str, title: &str, category: Category) -> MediaItem {
        MediaItem::create(
            NewItem::new(title, category, format!("file:///photos/{}.jpg", id)),
            id.to_string(),
            "device-1".to_string(),
            Utc::now(),
        )
    }

    #[test]
    fn test_new_item_builder() {
        let item = NewItem::new("Abbey Road", Category::Vinyl, "file:///photos/1.jpg")
            .with_notes("first pressing")
            .with_user_id("user-1");

        assert_eq!(item.title, "Abbey Road");
        assert_eq!(item.category, Category::Vinyl);
        assert_eq!(item.notes.as_deref(), Some("first pressing"));
        assert_eq!(item.user_id.as_deref(), Some("user-1"));
    }

    #[test]
    fn test_item_patch_applies_set_fields_only() {
        let mut item = sample_item("a", "Dune", Category::Books);
        item.notes = Some("hardcover".to_string());

        let patch = ItemPatch::new().title("Dune Messiah");
        patch.apply(&mut item);

        assert_eq!(item.title, "Dune Messiah");
        assert_eq!(item.category, Category::Books);
        assert_eq!(item.notes.as_deref(), Some("hardcover"));
    }

    #[test]
    fn test_item_serializes_camel_case_and_skips_unset() {
        let item = sample_item("a1", "Dune", Category::Books);
        let json = serde_json::to_value(&item).expect("serialize");

        assert_eq!(json["photoUri"], "file:///photos/a1.jpg");
        assert_eq!(json["syncStatus"], "local");
        assert_eq!(json["localOnly"], true);
        assert_eq!(json["version"], 1);
        // Unset extension fields stay off the wire entirely.
        assert!(json.get("loanedTo").is_none());
        assert!(json.get("wishlist").is_none());
        assert!(json.get("deletedAt").is_none());
    }

    #[test]
    fn test_item_round_trips_through_json() {
        let mut item = sample_item("b2", "OK Computer", Category::Cds);
        item.wishlist = true;
        item.wishlist_priority = Some(WishlistPriority::High);
        item.barcode = Some("724385522925".to_string());
        item.barcode_type = Some(BarcodeFormat::Ean);

        let json = serde_json::to_string(&item).expect("serialize");
        let back: MediaItem = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(back, item);
    }

    #[test]
    fn test_category_parse_and_display() {
        assert_eq!("vinyl".parse::<Category>().unwrap(), Category::Vinyl);
        assert_eq!("GAMES".parse::<Category>().unwrap(), Category::Games);
        assert!("tapes".parse::<Category>().is_err());
        assert_eq!(Category::Vhs.to_string(), "vhs");
        assert_eq!(Category::Vinyl.label(), "Vinyl Records");
        assert_eq!(Category::ALL.len(), 8);
    }

    #[test]
    fn test_wishlist_priority_ordering() {
        assert!(WishlistPriority::High > WishlistPriority::Medium);
        assert!(WishlistPriority::Medium > WishlistPriority::Low);
    }
}
