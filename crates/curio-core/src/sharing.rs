//! Item sharing: visibility flags, share tokens, and access checks.

use uuid::Uuid;

use crate::item::MediaItem;

/// How an item should be shared.
#[derive(Debug, Clone, Default)]
pub struct ShareOptions {
    /// Visible to anyone with the link
    pub is_public: bool,

    /// User ids granted access directly
    pub shared_with: Vec<String>,
}

impl ShareOptions {
    pub fn public() -> Self {
        Self {
            is_public: true,
            shared_with: Vec::new(),
        }
    }

    pub fn with_users(users: Vec<String>) -> Self {
        Self {
            is_public: false,
            shared_with: users,
        }
    }

    /// Write the sharing settings onto an item. An existing share token
    /// is kept so links stay stable across setting changes.
    pub fn apply(&self, item: &mut MediaItem) {
        item.is_public = self.is_public;
        item.shared_with = self.shared_with.clone();
        if item.share_token.is_none() {
            item.share_token = Some(Uuid::new_v4().to_string());
        }
    }
}

/// Clear all sharing state, including the token.
pub fn revoke_sharing(item: &mut MediaItem) {
    item.is_public = false;
    item.shared_with.clear();
    item.share_token = None;
}

/// Whether a user may see an item: its owner, a direct grantee, or
/// anyone when the item is public.
pub fn can_access(item: &MediaItem, user_id: &str) -> bool {
    if item.user_id.as_deref() == Some(user_id) {
        return true;
    }
    if item.is_public {
        return true;
    }
    item.shared_with.iter().any(|shared| shared == user_id)
}

/// Items a user may see, deleted ones excluded.
pub fn accessible_items<'a>(items: &'a [MediaItem], user_id: &str) -> Vec<&'a MediaItem> {
    items
        .iter()
        .filter(|item| !item.is_deleted() && can_access(item, user_id))
        .collect()
}

/// First item carrying this share token, if it is still shared.
pub fn find_by_share_token<'a>(items: &'a [MediaItem], token: &str) -> Option<&'a MediaItem> {
    items
        .iter()
        .find(|item| !item.is_deleted() && item.share_token.as_deref() == Some(token))
}
