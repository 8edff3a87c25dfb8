//! Pure queries over item slices: filtering, sorting, grouping, stats.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::CurioError;
use crate::item::{Category, LoanStatus, MediaItem};

/// A category and/or text filter.
///
/// Text matches are case-insensitive substring searches over title and
/// notes. An empty filter matches everything.
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    category: Option<Category>,
    query: Option<String>,
}

impl ItemFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn matches(&self, item: &MediaItem) -> bool {
        if let Some(category) = self.category {
            if item.category != category {
                return false;
            }
        }
        if let Some(query) = &self.query {
            let query = query.to_lowercase();
            let in_title = item.title.to_lowercase().contains(&query);
            let in_notes = item
                .notes
                .as_ref()
                .is_some_and(|notes| notes.to_lowercase().contains(&query));
            if !in_title && !in_notes {
                return false;
            }
        }
        true
    }
}

/// Items passing the filter, in their stored order.
pub fn filter_items<'a>(items: &'a [MediaItem], filter: &ItemFilter) -> Vec<&'a MediaItem> {
    items.iter().filter(|item| filter.matches(item)).collect()
}

/// Display orderings. Title comparison is case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
    TitleAsc,
    TitleDesc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::NewestFirst => "newest",
            SortOrder::OldestFirst => "oldest",
            SortOrder::TitleAsc => "title",
            SortOrder::TitleDesc => "title-desc",
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = CurioError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "newest" => Ok(SortOrder::NewestFirst),
            "oldest" => Ok(SortOrder::OldestFirst),
            "title" => Ok(SortOrder::TitleAsc),
            "title-desc" => Ok(SortOrder::TitleDesc),
            other => Err(CurioError::InvalidInput(format!(
                "Unknown sort order: {}",
                other
            ))),
        }
    }
}

/// Sort a selection of items for display.
pub fn sort_items<'a>(mut items: Vec<&'a MediaItem>, order: SortOrder) -> Vec<&'a MediaItem> {
    match order {
        SortOrder::NewestFirst => items.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortOrder::OldestFirst => items.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortOrder::TitleAsc => {
            items.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
        }
        SortOrder::TitleDesc => {
            items.sort_by(|a, b| b.title.to_lowercase().cmp(&a.title.to_lowercase()));
        }
    }
    items
}

/// Group items by category in canonical display order. Categories with
/// no items are omitted.
pub fn group_by_category(items: &[MediaItem]) -> Vec<(Category, Vec<&MediaItem>)> {
    Category::ALL
        .iter()
        .filter_map(|category| {
            let members: Vec<&MediaItem> = items
                .iter()
                .filter(|item| item.category == *category)
                .collect();
            if members.is_empty() {
                None
            } else {
                Some((*category, members))
            }
        })
        .collect()
}

/// Collection-wide aggregates for one currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionStats {
    pub total_items: usize,
    pub total_value: f64,
    pub currency: String,
    pub items_by_category: BTreeMap<Category, usize>,
    pub value_by_category: BTreeMap<Category, f64>,
    pub loaned_items: usize,
    pub wishlist_items: usize,
    pub updated_at: DateTime<Utc>,
}

/// Compute aggregates over the collection.
///
/// Values only count toward totals when the record's currency matches
/// the requested one; there is no conversion. Loaned counts include
/// overdue loans.
pub fn collection_stats(items: &[MediaItem], currency: &str) -> CollectionStats {
    let mut items_by_category: BTreeMap<Category, usize> = BTreeMap::new();
    let mut value_by_category: BTreeMap<Category, f64> = BTreeMap::new();
    let mut total_value = 0.0;
    let mut loaned_items = 0;
    let mut wishlist_items = 0;

    for item in items {
        *items_by_category.entry(item.category).or_insert(0) += 1;

        if let (Some(value), Some(item_currency)) = (item.current_value, &item.currency) {
            if item_currency == currency {
                total_value += value;
                *value_by_category.entry(item.category).or_insert(0.0) += value;
            }
        }

        if matches!(
            item.loan_status,
            Some(LoanStatus::Loaned) | Some(LoanStatus::Overdue)
        ) {
            loaned_items += 1;
        }
        if item.wishlist {
            wishlist_items += 1;
        }
    }

    CollectionStats {
        total_items: items.len(),
        total_value,
        currency: currency.to_string(),
        items_by_category,
        value_by_category,
        loaned_items,
        wishlist_items,
        updated_at: Utc::now(),
    }
}
