//! Subscription tiers and entitlement checks.
//!
//! The tier table is static data; nothing here talks to a store
//! backend. Checks are pure so hosts can gate features without extra
//! plumbing.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::profile::{ProfilePatch, UserProfile};

/// Paid tier of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    #[default]
    Free,
    Premium,
    Pro,
}

impl SubscriptionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionTier::Free => "free",
            SubscriptionTier::Premium => "premium",
            SubscriptionTier::Pro => "pro",
        }
    }

    /// Entitlements for this tier.
    pub fn features(&self) -> SubscriptionFeatures {
        match self {
            SubscriptionTier::Free => SubscriptionFeatures {
                max_items: Some(100),
                max_storage_mb: 100,
                cloud_sync: false,
                advanced_search: false,
                valuation_tools: false,
                loan_tracking: true,
                barcode_scanning: false,
                export_data: false,
                priority_support: false,
                custom_categories: false,
                share_collections: false,
            },
            SubscriptionTier::Premium => SubscriptionFeatures {
                max_items: Some(1000),
                max_storage_mb: 1000,
                cloud_sync: true,
                advanced_search: true,
                valuation_tools: true,
                loan_tracking: true,
                barcode_scanning: true,
                export_data: true,
                priority_support: false,
                custom_categories: true,
                share_collections: true,
            },
            SubscriptionTier::Pro => SubscriptionFeatures {
                max_items: None,
                max_storage_mb: 10_000,
                cloud_sync: true,
                advanced_search: true,
                valuation_tools: true,
                loan_tracking: true,
                barcode_scanning: true,
                export_data: true,
                priority_support: true,
                custom_categories: true,
                share_collections: true,
            },
        }
    }
}

impl std::fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    #[default]
    None,
    Active,
    Cancelled,
    Expired,
    Trial,
}

/// What a tier entitles an account to. `max_items` of `None` means
/// unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionFeatures {
    pub max_items: Option<u32>,
    pub max_storage_mb: u32,
    pub cloud_sync: bool,
    pub advanced_search: bool,
    pub valuation_tools: bool,
    pub loan_tracking: bool,
    pub barcode_scanning: bool,
    pub export_data: bool,
    pub priority_support: bool,
    pub custom_categories: bool,
    pub share_collections: bool,
}

/// Whether another item fits under the tier's item cap.
pub fn can_add_more_items(current_count: usize, tier: SubscriptionTier) -> bool {
    match tier.features().max_items {
        Some(max) => current_count < max as usize,
        None => true,
    }
}

/// Whether current storage usage is still under the tier's cap.
pub fn can_use_storage(current_usage_mb: f64, tier: SubscriptionTier) -> bool {
    current_usage_mb < f64::from(tier.features().max_storage_mb)
}

/// Active means a live paid subscription or a running trial.
pub fn is_subscription_active(profile: &UserProfile) -> bool {
    matches!(
        profile.subscription_status,
        SubscriptionStatus::Active | SubscriptionStatus::Trial
    )
}

/// Whether the subscription's end date has passed. A subscription
/// without an end date never expires.
pub fn is_subscription_expired(profile: &UserProfile) -> bool {
    match profile.subscription_end_date {
        Some(end) => end < Utc::now(),
        None => false,
    }
}

/// Days until the subscription ends, rounded up. `None` when there is
/// no end date; negative once the end date has passed.
pub fn days_until_expiration(profile: &UserProfile) -> Option<i64> {
    let end = profile.subscription_end_date?;
    let seconds = (end - Utc::now()).num_seconds();
    let days = seconds.div_euclid(86_400);
    if seconds.rem_euclid(86_400) > 0 {
        Some(days + 1)
    } else {
        Some(days)
    }
}

/// A patch that starts a trial of the given tier, no auto-renew.
pub fn trial(tier: SubscriptionTier, duration_days: i64) -> ProfilePatch {
    let now = Utc::now();
    let mut patch = ProfilePatch::new();
    patch.subscription_status = Some(SubscriptionStatus::Trial);
    patch.subscription_tier = Some(tier);
    patch.subscription_start_date = Some(now);
    patch.subscription_end_date = Some(now + chrono::Duration::days(duration_days));
    patch.subscription_auto_renew = Some(false);
    patch
}
