// src/tracker/dedup.rs
//
// The two dedup policies, kept as pure functions over a fetched page so the
// edge cases are testable without any I/O in sight.

use once_cell::sync::OnceCell;
use regex::Regex;
use std::collections::HashSet;

use crate::feed::FeedItem;

/// Outcome of the cursor policy for one fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorPlan {
    /// Still newest-first; the orchestrator reverses before dispatch.
    pub new_items: Vec<FeedItem>,
    /// `Some` when the cursor should advance once dispatch is scheduled.
    pub advance_to: Option<String>,
}

impl CursorPlan {
    fn noop() -> Self {
        Self {
            new_items: Vec::new(),
            advance_to: None,
        }
    }
}

/// Cursor policy: a single last-announced id against a newest-first page.
///
/// - No cursor yet: announce nothing, mark the newest id (suppresses a
///   backlog burst on the very first run).
/// - Cursor found at position P: positions `[0, P)` are new.
/// - Cursor not in the page: more was published than the page retains, so
///   the whole page counts as new — over-announcing a bounded page beats
///   silently dropping uploads.
/// - Cursor already the newest id: idempotent no-op, cursor untouched.
///
/// The cursor only ever advances to an id seen in a later page; it is never
/// rolled back.
pub fn cursor_plan(cursor: Option<&str>, feed: &[FeedItem]) -> CursorPlan {
    let Some(newest) = feed.first() else {
        return CursorPlan::noop();
    };

    let Some(cursor) = cursor else {
        return CursorPlan {
            new_items: Vec::new(),
            advance_to: Some(newest.video_id.clone()),
        };
    };

    if cursor == newest.video_id {
        return CursorPlan::noop();
    }

    let new_items = match feed.iter().position(|it| it.video_id == cursor) {
        Some(p) => feed[..p].to_vec(),
        None => feed.to_vec(),
    };

    CursorPlan {
        new_items,
        advance_to: Some(newest.video_id.clone()),
    }
}

/// Message-scan policy, step one: rebuild the announced-id set wholesale
/// from raw channel message text. Messages without a recognizable watch URL
/// contribute nothing; garbage never errors.
pub fn scan_announced_ids(messages: &[String]) -> HashSet<String> {
    static RE_WATCH: OnceCell<Regex> = OnceCell::new();
    let re = RE_WATCH
        .get_or_init(|| Regex::new(r"https://www\.youtube\.com/watch\?v=([0-9A-Za-z_-]+)").unwrap());

    let mut ids = HashSet::new();
    for msg in messages {
        for cap in re.captures_iter(msg) {
            ids.insert(cap[1].to_string());
        }
    }
    ids
}

/// Message-scan policy, step two: keep the fetched items whose id is not in
/// the freshly rebuilt set. Page order (newest-first) is preserved.
pub fn filter_unannounced(feed: &[FeedItem], announced: &HashSet<String>) -> Vec<FeedItem> {
    feed.iter()
        .filter(|it| !announced.contains(&it.video_id))
        .cloned()
        .collect()
}
