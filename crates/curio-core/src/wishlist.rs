//! Wishlist flags and derivations.
//!
//! Wishlist membership is a flag on the item, not a separate record.
//! An item with no explicit priority reads as medium.

use chrono::Utc;
use serde::Serialize;

use crate::item::{MediaItem, WishlistPriority};

/// Details for placing an item on the wishlist.
#[derive(Debug, Clone, Default)]
pub struct WishlistInfo {
    /// Priority; medium when unspecified
    pub priority: Option<WishlistPriority>,

    /// Price the owner hopes to pay
    pub target_price: Option<f64>,

    /// Currency for the target price
    pub currency: Option<String>,

    /// Free-form wishlist notes
    pub notes: Option<String>,
}

impl WishlistInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_priority(mut self, priority: WishlistPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_target_price(mut self, price: f64) -> Self {
        self.target_price = Some(price);
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Flag the item as wished-for. Lifecycle stamping is the
    /// collection manager's job.
    pub fn apply(&self, item: &mut MediaItem) {
        item.wishlist = true;
        item.wishlist_priority = Some(self.priority.unwrap_or(WishlistPriority::Medium));
        item.wishlist_added_at = Some(Utc::now());
        item.wishlist_notes = self.notes.clone();
        item.target_price = self.target_price;
        if let Some(currency) = &self.currency {
            item.currency = Some(currency.clone());
        }
    }
}

/// Clear the wishlist fields.
pub fn clear_wishlist(item: &mut MediaItem) {
    item.wishlist = false;
    item.wishlist_priority = None;
    item.wishlist_added_at = None;
    item.wishlist_notes = None;
    item.target_price = None;
}

/// Items flagged as wished-for.
pub fn wishlist_items(items: &[MediaItem]) -> Vec<&MediaItem> {
    items.iter().filter(|item| item.wishlist).collect()
}

/// Wishlist entries ordered by priority, most urgent first.
/// Preserves the incoming order within a priority.
pub fn sort_by_priority<'a>(items: &[&'a MediaItem]) -> Vec<&'a MediaItem> {
    let mut sorted = items.to_vec();
    sorted.sort_by_key(|item| {
        std::cmp::Reverse(item.wishlist_priority.unwrap_or(WishlistPriority::Medium))
    });
    sorted
}

/// High-priority wishlist entries.
pub fn high_priority(items: &[MediaItem]) -> Vec<&MediaItem> {
    wishlist_items(items)
        .into_iter()
        .filter(|item| item.wishlist_priority == Some(WishlistPriority::High))
        .collect()
}

/// Summary of target prices across the wishlist.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistBudget {
    pub total_target_price: f64,
    pub items_with_price: usize,
    pub average_price: f64,
}

/// Total, count, and average of the target prices on the wishlist.
/// Entries without a target price are counted in neither figure.
pub fn wishlist_budget(items: &[MediaItem]) -> WishlistBudget {
    let priced: Vec<f64> = wishlist_items(items)
        .into_iter()
        .filter_map(|item| item.target_price)
        .collect();
    let total: f64 = priced.iter().sum();
    let average = if priced.is_empty() {
        0.0
    } else {
        total / priced.len() as f64
    };

    WishlistBudget {
        total_target_price: total,
        items_with_price: priced.len(),
        average_price: average,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Category, NewItem};

    fn sample_item(id: &str, title: &str) -> MediaItem {
        MediaItem::create(
            NewItem::new(title, Category::Vinyl, format!("file:///photos/{}.jpg", id)),
            id.to_string(),
            "device-1".to_string(),
            Utc::now(),
        )
    }

    fn wished(id: &str, title: &str, info: WishlistInfo) -> MediaItem {
        let mut item = sample_item(id, title);
        info.apply(&mut item);
        item
    }

    #[test]
    fn test_apply_defaults_to_medium_priority() {
        let item = wished("a1", "Kind of Blue", WishlistInfo::new());
        assert!(item.wishlist);
        assert_eq!(item.wishlist_priority, Some(WishlistPriority::Medium));
        assert!(item.wishlist_added_at.is_some());
    }

    #[test]
    fn test_clear_removes_all_wishlist_fields() {
        let mut item = wished(
            "a1",
            "Kind of Blue",
            WishlistInfo::new()
                .with_priority(WishlistPriority::High)
                .with_target_price(35.0),
        );
        clear_wishlist(&mut item);

        assert!(!item.wishlist);
        assert!(item.wishlist_priority.is_none());
        assert!(item.wishlist_added_at.is_none());
        assert!(item.target_price.is_none());
    }

    #[test]
    fn test_sort_by_priority_high_first() {
        let low = wished(
            "a1",
            "Low",
            WishlistInfo::new().with_priority(WishlistPriority::Low),
        );
        let high = wished(
            "b2",
            "High",
            WishlistInfo::new().with_priority(WishlistPriority::High),
        );
        let medium = wished("c3", "Medium", WishlistInfo::new());

        let items = vec![low, high, medium];
        let entries = wishlist_items(&items);
        let sorted = sort_by_priority(&entries);

        let ids: Vec<&str> = sorted.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, vec!["b2", "c3", "a1"]);
    }

    #[test]
    fn test_budget_counts_only_priced_entries() {
        let items = vec![
            wished("a1", "A", WishlistInfo::new().with_target_price(30.0)),
            wished("b2", "B", WishlistInfo::new().with_target_price(10.0)),
            wished("c3", "C", WishlistInfo::new()),
            sample_item("d4", "not wished"),
        ];

        let budget = wishlist_budget(&items);
        assert_eq!(budget.items_with_price, 2);
        assert_eq!(budget.total_target_price, 40.0);
        assert_eq!(budget.average_price, 20.0);
    }

    #[test]
    fn test_budget_of_empty_wishlist_is_zero() {
        let items = vec![sample_item("a1", "A")];
        let budget = wishlist_budget(&items);
        assert_eq!(budget.items_with_price, 0);
        assert_eq!(budget.total_target_price, 0.0);
        assert_eq!(budget.average_price, 0.0);
    }

    #[test]
    fn test_high_priority_filter() {
        let items = vec![
            wished(
                "a1",
                "A",
                WishlistInfo::new().with_priority(WishlistPriority::High),
            ),
            wished("b2", "B", WishlistInfo::new()),
        ];

        let high = high_priority(&items);
        assert_eq!(high.len(), 1);
        assert_eq!(high[0].id, "a1");
    }
}
