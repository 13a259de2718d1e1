use crate::core::models::{Cursor, FeedPage, SyncRecord};
use std::collections::HashMap;

/// Merge a batch of changed-since-cursor records into an existing
/// collection. Incoming entities replace existing ones with the same id
/// wholesale; entities absent from the batch are preserved. The result is
/// sorted by recency descending (ties broken by id so the operation is
/// deterministic, which also makes it idempotent:
/// `merge(merge(c, b), b) == merge(c, b)`).
pub fn merge<T: SyncRecord>(existing: Vec<T>, incoming: Vec<T>) -> Vec<T> {
    let mut by_id: HashMap<String, T> = existing
        .into_iter()
        .map(|e| (e.id().to_string(), e))
        .collect();

    for item in incoming {
        by_id.insert(item.id().to_string(), item);
    }

    let mut merged: Vec<T> = by_id.into_values().collect();
    sort_by_recency(&mut merged);
    merged
}

fn sort_by_recency<T: SyncRecord>(items: &mut [T]) {
    items.sort_by(|a, b| {
        b.recency()
            .cmp(&a.recency())
            .then_with(|| a.id().cmp(b.id()))
    });
}

/// An incremental fetch response tagged with the cursor it was requested
/// at, so a slow response cannot be applied over a faster, newer one.
#[derive(Debug, Clone)]
pub struct TaggedBatch<T> {
    pub requested_at: Cursor,
    pub page: FeedPage<T>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied { fetched: usize },
    DiscardedStale,
}

/// A screen's view of one feed: the merged collection plus the cursor
/// its next incremental fetch should use.
#[derive(Debug, Default)]
pub struct FeedState<T> {
    pub items: Vec<T>,
    pub cursor: Cursor,
    /// Request cursor of the newest applied batch; responses requested at
    /// an older cursor are discarded.
    last_applied: Cursor,
}

impl<T: SyncRecord> FeedState<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            cursor: Cursor::unset(),
            last_applied: Cursor::unset(),
        }
    }

    /// Wholesale replace, used for the first load of a feed and for
    /// reloads triggered by locale or filter changes. Not a merge.
    pub fn replace(&mut self, page: FeedPage<T>) {
        self.cursor.advance_batch(&page.items, page.latest_cursor_hint);
        self.last_applied = self.cursor;
        self.items = page.items;
        sort_by_recency(&mut self.items);
    }

    /// Merge an incremental batch in receipt order. A batch whose request
    /// cursor is older than the newest applied one is discarded.
    pub fn apply(&mut self, batch: TaggedBatch<T>) -> ApplyOutcome {
        if batch.requested_at < self.last_applied {
            tracing::debug!(
                requested_at = ?batch.requested_at.value(),
                last_applied = ?self.last_applied.value(),
                "Discarding stale incremental batch"
            );
            return ApplyOutcome::DiscardedStale;
        }
        self.last_applied = batch.requested_at;

        let fetched = batch.page.items.len();
        self.cursor
            .advance_batch(&batch.page.items, batch.page.latest_cursor_hint);
        self.items = merge(std::mem::take(&mut self.items), batch.page.items);
        ApplyOutcome::Applied { fetched }
    }
}
