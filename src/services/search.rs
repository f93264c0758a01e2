//! Background pattern search.
//!
//! A view starts a search by handing the engine a [`SearchRequest`]: an
//! immutable snapshot of its rows, the compiled pattern, where to start, and
//! a [`SearchToken`] describing the view's position at that moment. The match
//! runs on a blocking worker and comes back to the handler loop as an
//! [`EngineEvent::SearchResult`]. The view compares the returned token with
//! its current one and drops the result if the user moved in the meantime or
//! the rows were replaced.

use crate::error::EngineError;
use crate::services::async_bridge::EngineEvent;
use crate::view::list_view::Row;
use crate::view::viewport::ViewPosition;
use crate::view::PaneId;
use regex::{Regex, RegexBuilder};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Snapshot of a view at the time a search started.
///
/// `epoch` changes whenever the view's rows are replaced (reload, filter),
/// so a result is rejected even if the position happens to be equal.
/// `generation` counts the searches a view started; only the latest one
/// may move the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchToken {
    pub position: ViewPosition,
    pub epoch: u64,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDirection {
    Forward,
    Backward,
}

impl SearchDirection {
    pub fn reversed(self) -> Self {
        match self {
            SearchDirection::Forward => SearchDirection::Backward,
            SearchDirection::Backward => SearchDirection::Forward,
        }
    }
}

/// Compile a user pattern. Patterns without upper case letters match
/// case-insensitively.
pub fn compile_pattern(pattern: &str) -> Result<Regex, EngineError> {
    let case_insensitive = !pattern.chars().any(|c| c.is_uppercase());
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|e| EngineError::runtime(format!("Invalid pattern {pattern}: {e}")))
}

/// Find the next row matching `regex`, starting after `start` and wrapping
/// around. The start row itself is checked last.
pub fn find_match(
    rows: &[Row],
    regex: &Regex,
    start: usize,
    direction: SearchDirection,
) -> Option<usize> {
    let count = rows.len();
    if count == 0 {
        return None;
    }
    let start = start.min(count - 1);
    (1..=count)
        .map(|offset| match direction {
            SearchDirection::Forward => (start + offset) % count,
            SearchDirection::Backward => (start + count - offset % count) % count,
        })
        .find(|&index| regex.is_match(&rows[index].text))
}

/// A search to run in the background
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub pane: PaneId,
    pub token: SearchToken,
    pub rows: Arc<Vec<Row>>,
    pub regex: Regex,
    pub start: usize,
    pub direction: SearchDirection,
}

/// Runs searches on the runtime's blocking pool.
#[derive(Debug, Clone)]
pub struct SearchEngine {
    handle: tokio::runtime::Handle,
    events: mpsc::Sender<EngineEvent>,
}

impl SearchEngine {
    pub fn new(handle: tokio::runtime::Handle, events: mpsc::Sender<EngineEvent>) -> Self {
        Self { handle, events }
    }

    pub fn start(&self, request: SearchRequest) {
        let events = self.events.clone();
        let SearchRequest {
            pane,
            token,
            rows,
            regex,
            start,
            direction,
        } = request;
        let pattern = regex.as_str().to_string();
        tracing::debug!("search {:?} for {} from row {}", direction, pattern, start);

        self.handle.spawn(async move {
            let worker =
                tokio::task::spawn_blocking(move || find_match(&rows, &regex, start, direction));
            let index = match worker.await {
                Ok(index) => index,
                Err(e) => {
                    tracing::warn!("Search worker failed: {}", e);
                    return;
                }
            };
            let result = EngineEvent::SearchResult {
                pane,
                token,
                pattern,
                index,
            };
            if events.send(result).await.is_err() {
                tracing::trace!("search finished after shutdown");
            }
        });
    }
}
