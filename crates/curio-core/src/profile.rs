//! Signed-in user profile and preferences.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::subscription::{SubscriptionStatus, SubscriptionTier};

fn default_true() -> bool {
    true
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_storage_quota_mb() -> f64 {
    100.0
}

/// Default visibility for wishlist entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WishlistPrivacy {
    #[default]
    Private,
    Public,
}

/// Per-user preference toggles. Every field has a serde default so
/// profiles written by older builds keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    #[serde(default = "default_currency")]
    pub default_currency: String,

    #[serde(default = "default_true")]
    pub show_value_estimates: bool,

    #[serde(default = "default_true")]
    pub enable_push_notifications: bool,

    #[serde(default = "default_true")]
    pub enable_loan_reminders: bool,

    #[serde(default)]
    pub default_wishlist_privacy: WishlistPrivacy,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            default_currency: default_currency(),
            show_value_estimates: true,
            enable_push_notifications: true,
            enable_loan_reminders: true,
            default_wishlist_privacy: WishlistPrivacy::Private,
        }
    }
}

/// A signed-in user's profile, persisted under its own slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Account identifier
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub subscription_status: SubscriptionStatus,

    #[serde(default)]
    pub subscription_tier: SubscriptionTier,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_start_date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_end_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub subscription_auto_renew: bool,

    /// Item count as of the last bookkeeping pass
    #[serde(default)]
    pub total_items: u32,

    #[serde(default)]
    pub storage_used_mb: f64,

    #[serde(default = "default_storage_quota_mb")]
    pub storage_quota_mb: f64,

    #[serde(default)]
    pub preferences: UserPreferences,
}

impl UserProfile {
    /// A fresh profile on the free tier with default preferences.
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            email: None,
            display_name: None,
            photo_url: None,
            created_at: now,
            updated_at: now,
            subscription_status: SubscriptionStatus::None,
            subscription_tier: SubscriptionTier::Free,
            subscription_start_date: None,
            subscription_end_date: None,
            subscription_auto_renew: false,
            total_items: 0,
            storage_used_mb: 0.0,
            storage_quota_mb: default_storage_quota_mb(),
            preferences: UserPreferences::default(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// A partial profile update. Unset fields keep their current values;
/// applying always bumps `updatedAt`.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub subscription_status: Option<SubscriptionStatus>,
    pub subscription_tier: Option<SubscriptionTier>,
    pub subscription_start_date: Option<DateTime<Utc>>,
    pub subscription_end_date: Option<DateTime<Utc>>,
    pub subscription_auto_renew: Option<bool>,
    pub total_items: Option<u32>,
    pub storage_used_mb: Option<f64>,
    pub default_currency: Option<String>,
}

impl ProfilePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn default_currency(mut self, currency: impl Into<String>) -> Self {
        self.default_currency = Some(currency.into());
        self
    }

    pub fn apply(&self, profile: &mut UserProfile) {
        if let Some(email) = &self.email {
            profile.email = Some(email.clone());
        }
        if let Some(name) = &self.display_name {
            profile.display_name = Some(name.clone());
        }
        if let Some(url) = &self.photo_url {
            profile.photo_url = Some(url.clone());
        }
        if let Some(status) = self.subscription_status {
            profile.subscription_status = status;
        }
        if let Some(tier) = self.subscription_tier {
            profile.subscription_tier = tier;
        }
        if let Some(start) = self.subscription_start_date {
            profile.subscription_start_date = Some(start);
        }
        if let Some(end) = self.subscription_end_date {
            profile.subscription_end_date = Some(end);
        }
        if let Some(auto) = self.subscription_auto_renew {
            profile.subscription_auto_renew = auto;
        }
        if let Some(count) = self.total_items {
            profile.total_items = count;
        }
        if let Some(used) = self.storage_used_mb {
            profile.storage_used_mb = used;
        }
        if let Some(currency) = &self.default_currency {
            profile.preferences.default_currency = currency.clone();
        }
        profile.updated_at = Utc::now();
    }
}
