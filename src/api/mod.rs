//! Contracts against the excluded HTTP layer.
//!
//! The sync subsystem never performs its own transport; screens hand it
//! implementations of these traits that return parsed JSON or a typed
//! [`SyncError`].

use crate::core::error::SyncError;
use crate::core::models::{Cursor, Feed, FeedPage, Notification, SyncRecord};
use crate::core::preferences::{NotificationPreferences, PreferencesPatch};
use async_trait::async_trait;

/// Fetches pages of an entity feed, optionally incremental past a cursor.
///
/// `since: None` requests a full (non-incremental) load.
#[async_trait]
pub trait FeedClient: Send + Sync {
    type Item: SyncRecord + Send;

    async fn fetch_list(
        &self,
        feed: Feed,
        since: Option<Cursor>,
    ) -> Result<FeedPage<Self::Item>, SyncError>;
}

/// Notification endpoints consumed by the sync engine.
#[async_trait]
pub trait NotificationClient: Send + Sync {
    async fn fetch_notifications(
        &self,
        since: Option<Cursor>,
    ) -> Result<FeedPage<Notification>, SyncError>;

    async fn fetch_preferences(&self) -> Result<NotificationPreferences, SyncError>;

    /// Server is the source of truth; the echo is the merged result.
    async fn update_preferences(
        &self,
        patch: PreferencesPatch,
    ) -> Result<NotificationPreferences, SyncError>;

    async fn mark_read(&self, ids: &[String]) -> Result<bool, SyncError>;

    async fn clear_all(&self) -> Result<bool, SyncError>;
}
