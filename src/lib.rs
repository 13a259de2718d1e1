//! Realtime synchronization layer for the helpdesk ticketing app.
//!
//! Screens instantiate one [`PollScheduler`] per feed and pass fetched
//! batches through [`sync::merge`] to keep their collections current;
//! [`VisibilityBinder`] pauses polling in background tabs, and a
//! session-wide [`NotificationSyncEngine`] publishes new-notification
//! events that consumers filter through the [`DismissalStore`].
//!
//! The crate performs no transport of its own: the host supplies
//! implementations of the [`api`] traits that return parsed JSON or a
//! typed [`SyncError`].

pub mod api;
pub mod core;
pub mod scheduler;
pub mod sync;

pub use crate::core::dismissals::{DismissalStore, DISMISSAL_TTL_SECS};
pub use crate::core::error::SyncError;
pub use crate::core::models::{
    ChatMessage, Cursor, Feed, FeedPage, Notification, SyncRecord, Ticket, TicketStatus,
};
pub use crate::core::preferences::{NotificationPreferences, PreferencesPatch};
pub use crate::core::storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use crate::scheduler::backoff::BackoffPolicy;
pub use crate::scheduler::poller::{
    PollOutcome, PollScheduler, SchedulerConfig, SchedulerHandle,
};
pub use crate::scheduler::status::{project, ConnectionStatus};
pub use crate::scheduler::visibility::{PageVisibility, VisibilityBinder, VisibilityGuard};
pub use crate::sync::engine::{EngineConfig, NotificationSyncEngine};
pub use crate::sync::merge::{merge, ApplyOutcome, FeedState, TaggedBatch};
