use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A polled data stream. Feeds are independent: each has its own cursor,
/// its own interval, and no ordering relationship with the others.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feed {
    ActiveTickets,
    ArchivedTickets,
    Chat { ticket_id: String },
}

impl Feed {
    pub fn name(&self) -> &'static str {
        match self {
            Feed::ActiveTickets => "active_tickets",
            Feed::ArchivedTickets => "archived_tickets",
            Feed::Chat { .. } => "chat",
        }
    }
}

/// Identity-bearing record that can flow through an incremental feed.
///
/// `recency` is the monotonic timestamp (epoch seconds) used both for
/// cursor advancement and merge ordering. Records are replaced whole on
/// merge, never field-patched.
pub trait SyncRecord {
    fn id(&self) -> &str;
    fn recency(&self) -> i64;
}

/// Timestamp watermark past which a feed's next incremental fetch requests
/// only newer records. Unset means the next fetch is a full load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cursor(Option<i64>);

impl Cursor {
    pub fn unset() -> Self {
        Cursor(None)
    }

    pub fn at(epoch_secs: i64) -> Self {
        Cursor(Some(epoch_secs))
    }

    pub fn value(&self) -> Option<i64> {
        self.0
    }

    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }

    /// Move the watermark forward, never backward.
    pub fn advance_to(&mut self, epoch_secs: i64) {
        match self.0 {
            Some(current) if current >= epoch_secs => {}
            _ => self.0 = Some(epoch_secs),
        }
    }

    /// Advance past everything in a fetched batch, honoring the server's
    /// cursor hint when it is ahead of the batch contents.
    pub fn advance_batch<T: SyncRecord>(&mut self, items: &[T], hint: Option<i64>) {
        for item in items {
            self.advance_to(item.recency());
        }
        if let Some(hint) = hint {
            self.advance_to(hint);
        }
    }
}

/// Result of one fetch against a feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedPage<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub latest_cursor_hint: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub subject: String,
    pub status: TicketStatus,
    pub requester: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    Pending,
    Resolved,
    Archived,
}

impl SyncRecord for Ticket {
    fn id(&self) -> &str {
        &self.id
    }

    fn recency(&self) -> i64 {
        self.updated_at.timestamp()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub ticket_id: String,
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl SyncRecord for ChatMessage {
    fn id(&self) -> &str {
        &self.id
    }

    fn recency(&self) -> i64 {
        self.created_at.timestamp()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    /// Category matched against `NotificationPreferences::notification_types`.
    pub kind: String,
    pub title: String,
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
}

impl SyncRecord for Notification {
    fn id(&self) -> &str {
        &self.id
    }

    fn recency(&self) -> i64 {
        self.created_at.timestamp()
    }
}
