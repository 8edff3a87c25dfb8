//! Valuation fields and money derivations.
//!
//! All aggregation is currency-matched: an amount only counts toward a
//! total when the record's currency equals the requested one. There is
//! no conversion.

use chrono::Utc;
use serde::Serialize;

use crate::item::{Condition, MediaItem};

/// A new appraisal for an item.
#[derive(Debug, Clone)]
pub struct ValuationUpdate {
    /// Current appraised value
    pub current_value: f64,

    /// Currency of the appraisal
    pub currency: Option<String>,

    /// What the owner originally paid
    pub purchase_price: Option<f64>,

    /// Physical condition at appraisal time
    pub condition: Option<Condition>,

    /// Where the estimate came from
    pub source: Option<String>,
}

impl ValuationUpdate {
    pub fn new(current_value: f64) -> Self {
        Self {
            current_value,
            currency: None,
            purchase_price: None,
            condition: None,
            source: None,
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    pub fn with_purchase_price(mut self, price: f64) -> Self {
        self.purchase_price = Some(price);
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Write the appraisal onto an item. Lifecycle stamping is the
    /// collection manager's job.
    pub fn apply(&self, item: &mut MediaItem) {
        item.current_value = Some(self.current_value);
        item.valuation_date = Some(Utc::now());
        if let Some(currency) = &self.currency {
            item.currency = Some(currency.clone());
        }
        if let Some(price) = self.purchase_price {
            item.purchase_price = Some(price);
        }
        if let Some(condition) = self.condition {
            item.condition = Some(condition);
        }
        if let Some(source) = &self.source {
            item.valuation_source = Some(source.clone());
        }
    }
}

fn valued_in(item: &MediaItem, currency: &str) -> Option<f64> {
    match (&item.current_value, &item.currency) {
        (Some(value), Some(item_currency)) if item_currency == currency => Some(*value),
        _ => None,
    }
}

/// Sum of appraised values in the given currency.
pub fn collection_value(items: &[MediaItem], currency: &str) -> f64 {
    items
        .iter()
        .filter_map(|item| valued_in(item, currency))
        .sum()
}

/// Items at or above a value threshold, most valuable first.
pub fn high_value_items<'a>(
    items: &'a [MediaItem],
    threshold: f64,
    currency: &str,
) -> Vec<&'a MediaItem> {
    let mut matched: Vec<(&MediaItem, f64)> = items
        .iter()
        .filter_map(|item| {
            valued_in(item, currency)
                .filter(|value| *value >= threshold)
                .map(|value| (item, value))
        })
        .collect();
    matched.sort_by(|a, b| b.1.total_cmp(&a.1));
    matched.into_iter().map(|(item, _)| item).collect()
}

/// Direction of a value change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueDirection {
    Up,
    Down,
    Same,
}

/// Change between purchase price and current value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueChange {
    pub change: f64,
    pub change_percent: f64,
    pub direction: ValueDirection,
}

/// Absolute and percentage change from purchase price to current value.
/// The percentage is zero when the purchase price is not positive.
pub fn value_change(purchase_price: f64, current_value: f64) -> ValueChange {
    let change = current_value - purchase_price;
    let change_percent = if purchase_price > 0.0 {
        (change / purchase_price) * 100.0
    } else {
        0.0
    };
    let direction = if change > 0.0 {
        ValueDirection::Up
    } else if change < 0.0 {
        ValueDirection::Down
    } else {
        ValueDirection::Same
    };

    ValueChange {
        change,
        change_percent,
        direction,
    }
}

/// Items in a given physical condition.
pub fn items_by_condition(items: &[MediaItem], condition: Condition) -> Vec<&MediaItem> {
    items
        .iter()
        .filter(|item| item.condition == Some(condition))
        .collect()
}
