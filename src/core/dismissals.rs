use crate::core::storage::KeyValueStorage;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Dismissal records expire 7 days after the dismissal.
pub const DISMISSAL_TTL_SECS: i64 = 604_800;

/// One dismissed notification, persisted under the per-user storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DismissalRecord {
    pub id: String,
    pub dismissed_at: i64,
}

/// Per-user persisted set of notification ids the user has explicitly
/// dismissed. Survives reloads through [`KeyValueStorage`]; expired
/// entries are pruned lazily on every read, never by a timer.
///
/// Storage keys are strictly namespaced per user
/// (`dismissed_notifications_<userId>`), so one user's dismissals are
/// never visible to reads under another user id.
#[derive(Clone)]
pub struct DismissalStore {
    storage: Arc<dyn KeyValueStorage>,
}

impl DismissalStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    fn storage_key(user_id: &str) -> String {
        format!("dismissed_notifications_{user_id}")
    }

    fn load(&self, user_id: &str) -> Vec<DismissalRecord> {
        let key = Self::storage_key(user_id);
        match self.storage.get(&key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(records) => records,
                Err(e) => {
                    tracing::warn!(user_id, error = %e, "Discarding unparseable dismissal data");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Failed to read dismissals");
                Vec::new()
            }
        }
    }

    fn save(&self, user_id: &str, records: &[DismissalRecord]) {
        let key = Self::storage_key(user_id);
        match serde_json::to_string(records) {
            Ok(raw) => {
                if let Err(e) = self.storage.set(&key, &raw) {
                    tracing::warn!(user_id, error = %e, "Failed to persist dismissals");
                }
            }
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Failed to serialize dismissals");
            }
        }
    }

    /// Whether the user has dismissed this notification within the TTL.
    /// Prunes expired records as a side effect.
    pub fn is_dismissed(&self, user_id: &str, id: &str) -> bool {
        let records = self.prune_and_load(user_id);
        records.iter().any(|r| r.id == id)
    }

    /// Record a dismissal. Dismissing an already-dismissed id is a no-op.
    pub fn dismiss(&self, user_id: &str, id: &str) {
        let mut records = self.prune_and_load(user_id);
        if records.iter().any(|r| r.id == id) {
            return;
        }
        records.push(DismissalRecord {
            id: id.to_string(),
            dismissed_at: Utc::now().timestamp(),
        });
        self.save(user_id, &records);
        tracing::debug!(user_id, id, "Notification dismissed");
    }

    /// Drop records older than [`DISMISSAL_TTL_SECS`]. Invoked lazily on
    /// every read; callable directly as well.
    pub fn prune_expired(&self, user_id: &str) {
        self.prune_and_load(user_id);
    }

    fn prune_and_load(&self, user_id: &str) -> Vec<DismissalRecord> {
        let records = self.load(user_id);
        let oldest_kept = Utc::now().timestamp() - DISMISSAL_TTL_SECS;
        let kept: Vec<DismissalRecord> = records
            .iter()
            .filter(|r| r.dismissed_at > oldest_kept)
            .cloned()
            .collect();
        if kept.len() != records.len() {
            tracing::debug!(
                user_id,
                pruned = records.len() - kept.len(),
                "Pruned expired dismissals"
            );
            self.save(user_id, &kept);
        }
        kept
    }
}
