//! The render loop.
//!
//! The first redraw pulse arms the debounce timer and later pulses are
//! absorbed until it fires, so there is at most one render pass per
//! debounce quantum. Errors are collected for `error_batch` before they are
//! shown, and stay on screen for at least `min_error_display` after the
//! last batch arrived.

use crate::app::{lock, SharedDashboard};
use crate::error::EngineError;
use crate::services::async_bridge::RedrawRequester;
use crate::view::error_view::ErrorView;
use crate::view::surface::RenderBackend;
use ratatui::layout::Rect;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

pub(super) struct RenderLoop<B> {
    pub backend: B,
    pub dashboard: SharedDashboard,
    pub redraw_rx: mpsc::Receiver<()>,
    pub errors_rx: mpsc::Receiver<String>,
    pub redraw: RedrawRequester,
    pub debounce: Duration,
    pub error_batch: Duration,
    pub min_error_display: Duration,
    pub cancel: CancellationToken,
}

async fn until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Where the error surface goes: above the status bar, at most half the
/// content area.
fn error_area(screen: Rect, errors: &ErrorView) -> Option<Rect> {
    let content_height = screen.height.saturating_sub(1);
    let height = errors.height((content_height / 2).max(1));
    if height == 0 || content_height == 0 {
        return None;
    }
    Some(Rect::new(
        screen.x,
        screen.y + content_height - height,
        screen.width,
        height,
    ))
}

impl<B: RenderBackend> RenderLoop<B> {
    pub async fn run(mut self) -> Result<(), EngineError> {
        tracing::debug!("Render loop started");
        let mut errors = ErrorView::new();
        let mut batch: Vec<String> = Vec::new();
        let mut render_at: Option<Instant> = None;
        let mut batch_at: Option<Instant> = None;
        let mut errors_expire_at: Option<Instant> = None;

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                Some(()) = self.redraw_rx.recv() => {
                    if render_at.is_none() {
                        render_at = Some(Instant::now() + self.debounce);
                    }
                }
                Some(error) = self.errors_rx.recv() => {
                    batch.push(error);
                    if batch_at.is_none() {
                        batch_at = Some(Instant::now() + self.error_batch);
                    }
                }
                _ = until(batch_at) => {
                    batch_at = None;
                    errors.extend(batch.drain(..));
                    errors_expire_at = Some(Instant::now() + self.min_error_display);
                    render_at.get_or_insert_with(Instant::now);
                }
                _ = until(errors_expire_at) => {
                    errors_expire_at = None;
                    errors.clear();
                    render_at.get_or_insert_with(Instant::now);
                }
                _ = until(render_at) => {
                    render_at = None;
                    if let Err(e) = self.render(&errors) {
                        tracing::warn!("Render failed: {}", e);
                    }
                }
            }
        }
        tracing::debug!("Render loop stopped");
        Ok(())
    }

    fn render(&mut self, errors: &ErrorView) -> std::io::Result<()> {
        if self.redraw.take_full() {
            self.backend.clear()?;
        }
        let screen = self.backend.dimension()?;
        let mut surfaces = lock(&self.dashboard).render(screen);
        if let Some(area) = error_area(screen, errors) {
            surfaces.push(errors.render(area));
        }
        self.backend.draw(&surfaces)
    }
}
