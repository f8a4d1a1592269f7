//! View sink port - fire-and-forget view tracking.

use uuid::Uuid;

/// A view to record off the request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    Post {
        post_id: Uuid,
        user_id: Option<Uuid>,
        duration_watched_seconds: Option<i32>,
    },
    Story {
        story_id: Uuid,
        user_id: Uuid,
    },
}

/// Accepts view events without blocking the caller.
pub trait ViewSink: Send + Sync {
    /// Returns false when the event was dropped.
    fn submit(&self, event: ViewEvent) -> bool;

    fn stats(&self) -> ViewQueueStats;
}

/// View queue statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ViewQueueStats {
    pub pending: usize,
    pub recorded: usize,
    pub dropped: usize,
}
