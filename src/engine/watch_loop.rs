//! Repository change notifications.
//!
//! File system events are classified and collected for `debounce`. When the
//! timer fires, one event goes to the handler loop: `Reload` if anything
//! structural changed, otherwise `StatusRefresh`.

use crate::error::EngineError;
use crate::model::repository::{ChangeKind, Repository};
use crate::services::async_bridge::{EngineEvent, ErrorReporter};
use notify::event::{EventKind, ModifyKind};
use notify::{RecursiveMode, Watcher};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

/// Capacity of the channel between the watcher thread and this loop
const WATCH_CHANNEL_CAPACITY: usize = 256;

/// The strongest change `event` means for `repo`.
pub(super) fn classify_event(repo: &Repository, event: &notify::Event) -> ChangeKind {
    let structural = match event.kind {
        EventKind::Create(_) | EventKind::Remove(_) => true,
        EventKind::Modify(ModifyKind::Name(_)) => true,
        EventKind::Modify(_) => false,
        EventKind::Access(_) | EventKind::Any | EventKind::Other => return ChangeKind::Ignored,
    };
    event
        .paths
        .iter()
        .map(|path| repo.classify(path, structural))
        .max()
        .unwrap_or(ChangeKind::Ignored)
}

/// Collects changes between two debounce deadlines.
#[derive(Debug, Default)]
pub(super) struct PendingChange {
    kind: Option<ChangeKind>,
}

impl PendingChange {
    /// Record a change. Returns true when it is the first of this window.
    pub fn add(&mut self, kind: ChangeKind) -> bool {
        if kind == ChangeKind::Ignored {
            return false;
        }
        let first = self.kind.is_none();
        self.kind = self.kind.max(Some(kind));
        first
    }

    /// The event to send for this window, clearing it.
    pub fn take(&mut self) -> Option<EngineEvent> {
        match self.kind.take()? {
            ChangeKind::Structural => Some(EngineEvent::Reload),
            ChangeKind::Content => Some(EngineEvent::StatusRefresh),
            ChangeKind::Ignored => None,
        }
    }
}

pub(super) async fn run(
    repo: Arc<Repository>,
    debounce: Duration,
    events: mpsc::Sender<EngineEvent>,
    errors: ErrorReporter,
    cancel: CancellationToken,
) -> Result<(), EngineError> {
    let (tx, mut rx) = mpsc::channel(WATCH_CHANNEL_CAPACITY);
    let watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        // Runs on the watcher's own thread
        let _ = tx.blocking_send(res);
    });
    let mut watcher = match watcher {
        Ok(watcher) => watcher,
        Err(e) => {
            errors.report(format!("Cannot watch repository: {e}"));
            return Ok(());
        }
    };
    if let Err(e) = watcher.watch(repo.root(), RecursiveMode::Recursive) {
        errors.report(format!("Cannot watch {}: {e}", repo.root().display()));
        return Ok(());
    }
    tracing::info!("Watching {}", repo.root().display());

    let mut pending = PendingChange::default();
    let mut deadline: Option<Instant> = None;

    loop {
        let timer = async move {
            match deadline {
                Some(at) => sleep_until(at).await,
                None => std::future::pending().await,
            }
        };
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            Some(res) = rx.recv() => match res {
                Ok(event) => {
                    let kind = classify_event(&repo, &event);
                    tracing::trace!("{:?} {:?} -> {:?}", event.kind, event.paths, kind);
                    if pending.add(kind) {
                        deadline = Some(Instant::now() + debounce);
                    }
                }
                Err(e) => errors.report(format!("Watch error: {e}")),
            },
            _ = timer => {
                deadline = None;
                if let Some(event) = pending.take() {
                    tracing::debug!("Repository change: {:?}", event);
                    if events.send(event).await.is_err() {
                        break;
                    }
                }
            }
        }
    }
    tracing::debug!("Watch loop stopped");
    Ok(())
}
