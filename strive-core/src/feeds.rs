use std::collections::HashMap;
use std::fmt;
use strive_types::{Comment, PointsRecord, TaskHistory};

/// The four independent dashboard feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedKind {
    MyPoints,
    Leaderboard,
    Comments,
    History,
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeedKind::MyPoints => "my-points",
            FeedKind::Leaderboard => "leaderboard",
            FeedKind::Comments => "comments",
            FeedKind::History => "history",
        };
        write!(f, "{}", name)
    }
}

/// Per-feed generation bookkeeping. Every fetch is issued under a fresh
/// generation; a response only renders if no newer response for that feed
/// rendered first. Ticks never wait on each other, so slow responses can
/// arrive out of order.
#[derive(Debug, Default)]
pub struct FeedTracker {
    issued: HashMap<FeedKind, u64>,
    applied: HashMap<FeedKind, u64>,
}

impl FeedTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves the next generation for a fetch about to be issued.
    pub fn begin(&mut self, feed: FeedKind) -> u64 {
        let next = self.issued.get(&feed).copied().unwrap_or(0) + 1;
        self.issued.insert(feed, next);
        next
    }

    /// True when this response is newer than the last applied one and may
    /// render. Stale responses return false and must be dropped.
    pub fn try_apply(&mut self, feed: FeedKind, generation: u64) -> bool {
        let last = self.applied.get(&feed).copied().unwrap_or(0);
        if generation > last {
            self.applied.insert(feed, generation);
            true
        } else {
            false
        }
    }
}

/// The my-points feed renders its first record, or 0 when the sequence is
/// empty. Failures normalize to 0 as well; the previous value never lingers.
pub fn first_points(records: &[PointsRecord]) -> i64 {
    records.first().map(|r| r.points).unwrap_or(0)
}

/// The view re-sorts the full collection on every render; server order is
/// not relied upon.
pub fn sort_comments_newest_first(comments: &mut [Comment]) {
    comments.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

/// An empty or all-zero history renders the placeholder instead of a graph.
pub fn history_is_blank(history: &TaskHistory) -> bool {
    history.values().all(|count| *count == 0)
}
