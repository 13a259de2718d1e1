use crate::api::NotificationClient;
use crate::core::error::SyncError;
use crate::core::models::{Cursor, Notification};
use crate::core::preferences::{NotificationPreferences, PreferencesPatch};
use crate::scheduler::backoff::BackoffPolicy;
use crate::scheduler::poller::{
    ErrorCallback, PollFn, PollOutcome, PollScheduler, SchedulerConfig, SchedulerHandle,
    StatusCallback,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex, RwLock};

const DEFAULT_INTERVAL: Duration = Duration::from_secs(15);
const DEFAULT_BACKOFF_STEP: f64 = 0.5;
const DEFAULT_MAX_BACKOFF_FACTOR: f64 = 5.0;
const DEFAULT_EVENT_CAPACITY: usize = 64;

pub struct EngineConfig {
    pub interval: Duration,
    /// Additive backoff step applied per empty poll.
    pub backoff_step: f64,
    pub max_backoff_factor: f64,
    /// Bound on one fetch; a poll that exceeds it fails as a transient
    /// timeout instead of occupying the in-flight guard forever.
    /// Defaults to `interval * 3`.
    pub poll_timeout: Option<Duration>,
    pub event_capacity: usize,
    pub on_status_change: Option<StatusCallback>,
    pub on_error: Option<ErrorCallback>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            backoff_step: DEFAULT_BACKOFF_STEP,
            max_backoff_factor: DEFAULT_MAX_BACKOFF_FACTOR,
            poll_timeout: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            on_status_change: None,
            on_error: None,
        }
    }
}

/// Session-wide notification poller, independent of any screen.
///
/// Wraps a [`PollScheduler`] with notification semantics: preferences are
/// loaded before polling begins, incoming items are deduplicated against
/// a session-local seen set (an item can appear in two overlapping
/// incremental windows), filtered by the preference snapshot taken at the
/// start of the poll, and published to subscribers. Empty polls widen the
/// interval additively; any poll with at least one unseen notification
/// snaps it back to the base interval.
pub struct NotificationSyncEngine {
    handle: SchedulerHandle,
    client: Arc<dyn NotificationClient>,
    prefs: Arc<RwLock<NotificationPreferences>>,
    prefs_loaded: Arc<Mutex<bool>>,
    cursor: Arc<RwLock<Cursor>>,
    events_tx: broadcast::Sender<Notification>,
}

impl NotificationSyncEngine {
    pub fn new(client: Arc<dyn NotificationClient>, config: EngineConfig) -> Self {
        let prefs = Arc::new(RwLock::new(NotificationPreferences::default()));
        let cursor = Arc::new(RwLock::new(Cursor::unset()));
        let seen: Arc<RwLock<HashSet<String>>> = Arc::new(RwLock::new(HashSet::new()));
        let (events_tx, _) = broadcast::channel(config.event_capacity);

        let poll_timeout = config.poll_timeout.unwrap_or(config.interval * 3);
        let poll_fn = Self::poll_fn(
            Arc::clone(&client),
            Arc::clone(&prefs),
            Arc::clone(&cursor),
            Arc::clone(&seen),
            events_tx.clone(),
            poll_timeout,
        );

        let handle = PollScheduler::spawn(SchedulerConfig {
            name: "notifications".to_string(),
            interval: config.interval,
            backoff: BackoffPolicy::Additive {
                step: config.backoff_step,
                max_factor: config.max_backoff_factor,
            },
            poll_fn,
            on_status_change: config.on_status_change,
            on_error: config.on_error,
        });

        Self {
            handle,
            client,
            prefs,
            prefs_loaded: Arc::new(Mutex::new(false)),
            cursor,
            events_tx,
        }
    }

    fn poll_fn(
        client: Arc<dyn NotificationClient>,
        prefs: Arc<RwLock<NotificationPreferences>>,
        cursor: Arc<RwLock<Cursor>>,
        seen: Arc<RwLock<HashSet<String>>>,
        events_tx: broadcast::Sender<Notification>,
        poll_timeout: Duration,
    ) -> PollFn {
        Box::new(move || {
            let client = Arc::clone(&client);
            let prefs = Arc::clone(&prefs);
            let cursor = Arc::clone(&cursor);
            let seen = Arc::clone(&seen);
            let events_tx = events_tx.clone();

            Box::pin(async move {
                // the snapshot taken here is used for the whole poll, even
                // if preferences are updated mid-flight
                let snapshot = prefs.read().await.clone();
                let since = {
                    let c = *cursor.read().await;
                    c.is_set().then_some(c)
                };

                let page =
                    match tokio::time::timeout(poll_timeout, client.fetch_notifications(since))
                        .await
                    {
                        Ok(Ok(page)) => page,
                        Ok(Err(e)) => return Err(e),
                        Err(_) => return Err(SyncError::Timeout(poll_timeout)),
                    };

                cursor
                    .write()
                    .await
                    .advance_batch(&page.items, page.latest_cursor_hint);

                let mut seen_ids = seen.write().await;
                let mut unseen = 0usize;
                let mut dispatched = 0usize;
                for notification in page.items {
                    if !seen_ids.insert(notification.id.clone()) {
                        continue; // already delivered in an earlier window
                    }
                    unseen += 1;
                    if !snapshot.allows(&notification.kind) {
                        continue;
                    }
                    dispatched += 1;
                    // send only fails when nobody is subscribed
                    let _ = events_tx.send(notification);
                }

                if unseen > 0 {
                    tracing::debug!(unseen, dispatched, "New notifications received");
                    Ok(PollOutcome::Data)
                } else {
                    Ok(PollOutcome::Empty)
                }
            })
        })
    }

    /// Subscribe to new-notification events. Badge counters, sound
    /// playback, and the dropdown each hold their own receiver and
    /// consult [`crate::core::dismissals::DismissalStore`] before
    /// rendering.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.events_tx.subscribe()
    }

    /// Load preferences (once) and begin polling. Polling never starts
    /// before preferences resolve; a load failure falls back to the
    /// built-in defaults.
    pub async fn start(&self) {
        self.ensure_preferences().await;
        self.handle.start();
    }

    async fn ensure_preferences(&self) {
        let mut loaded = self.prefs_loaded.lock().await;
        if *loaded {
            return;
        }
        match self.client.fetch_preferences().await {
            Ok(fetched) => {
                *self.prefs.write().await = fetched;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Preference load failed, using defaults");
            }
        }
        *loaded = true;
    }

    /// Persist a partial update server-side and adopt the echoed merge.
    /// A poll in flight keeps the snapshot it started with; the next poll
    /// sees the new preferences.
    pub async fn update_preferences(
        &self,
        patch: PreferencesPatch,
    ) -> Result<NotificationPreferences, SyncError> {
        let merged = self.client.update_preferences(patch).await?;
        *self.prefs.write().await = merged.clone();
        Ok(merged)
    }

    pub async fn preferences(&self) -> NotificationPreferences {
        self.prefs.read().await.clone()
    }

    pub async fn cursor(&self) -> Cursor {
        *self.cursor.read().await
    }

    pub async fn mark_read(&self, ids: &[String]) -> Result<bool, SyncError> {
        self.client.mark_read(ids).await
    }

    pub async fn clear_all(&self) -> Result<bool, SyncError> {
        self.client.clear_all().await
    }

    /// Control handle for visibility binding and screen teardown.
    pub fn scheduler(&self) -> SchedulerHandle {
        self.handle.clone()
    }

    pub fn pause(&self) {
        self.handle.pause();
    }

    pub fn resume(&self) {
        self.handle.resume();
    }

    pub fn stop(&self) {
        self.handle.stop();
    }
}
