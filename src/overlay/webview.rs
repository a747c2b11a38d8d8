//! Tauri-backed implementations of the overlay seams.
//!
//! The overlay page hosts the particle library. Rust asks it to draw via
//! events and the page answers through commands carrying the request id.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tauri::{AppHandle, Emitter, WebviewWindow};
use tokio::sync::oneshot;

use super::{ConfettiRenderer, FramePacer, OverlaySurface, RenderCompletion};
use crate::confetti::Burst;
use crate::error::Result;
use crate::events::{
    ConfettiFireEvent, OverlayFrameEvent, CONFETTI_FIRE, OVERLAY_FRAME, OVERLAY_WINDOW,
};

/// How long a stream frame waits for the page's animation-frame callback
/// before moving on. Hidden or throttled webviews may never answer.
pub const FRAME_FALLBACK: Duration = Duration::from_millis(100);

/// Outstanding requests to the page, keyed by id.
///
/// Entries whose receiver is gone (an untracked left cannon, a wait that
/// timed out) are pruned on the next `open`.
#[derive(Default)]
pub struct PendingReplies {
    next_id: AtomicU64,
    waiting: Mutex<HashMap<u64, oneshot::Sender<()>>>,
}

impl PendingReplies {
    pub fn open(&self) -> (u64, oneshot::Receiver<()>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let (tx, rx) = oneshot::channel();
        match self.waiting.lock() {
            Ok(mut waiting) => {
                waiting.retain(|_, tx| !tx.is_closed());
                waiting.insert(id, tx);
            }
            Err(err) => tracing::error!("pending replies lock poisoned: {err}"),
        }
        (id, rx)
    }

    /// Returns `false` for unknown or already-resolved ids.
    pub fn resolve(&self, id: u64) -> bool {
        let sender = match self.waiting.lock() {
            Ok(mut waiting) => waiting.remove(&id),
            Err(err) => {
                tracing::error!("pending replies lock poisoned: {err}");
                None
            }
        };
        match sender {
            Some(tx) => {
                let _ = tx.send(());
                true
            }
            None => false,
        }
    }

    fn forget(&self, id: u64) {
        if let Ok(mut waiting) = self.waiting.lock() {
            waiting.remove(&id);
        }
    }

    /// Drops every entry. Live waiters see their receiver close right away
    /// instead of running into the render timeout. Returns how many were
    /// still being awaited.
    pub fn cancel_all(&self) -> usize {
        match self.waiting.lock() {
            Ok(mut waiting) => waiting.drain().filter(|(_, tx)| !tx.is_closed()).count(),
            Err(err) => {
                tracing::error!("pending replies lock poisoned: {err}");
                0
            }
        }
    }
}

pub struct WebviewSurface {
    window: WebviewWindow,
}

impl WebviewSurface {
    pub fn new(window: WebviewWindow) -> Self {
        Self { window }
    }
}

#[async_trait]
impl OverlaySurface for WebviewSurface {
    async fn show(&self) -> Result<()> {
        self.window.show()?;
        Ok(())
    }

    async fn hide(&self) -> Result<()> {
        self.window.hide()?;
        Ok(())
    }

    fn set_click_through(&self, ignore: bool) -> Result<()> {
        self.window.set_ignore_cursor_events(ignore)?;
        Ok(())
    }
}

pub struct WebviewRenderer {
    app: AppHandle,
    replies: Arc<PendingReplies>,
    ready: AtomicBool,
}

impl WebviewRenderer {
    pub fn new(app: AppHandle, replies: Arc<PendingReplies>) -> Self {
        Self {
            app,
            replies,
            ready: AtomicBool::new(false),
        }
    }

    /// Called once the page has created its canvas. A page reload calls
    /// it again.
    pub fn mark_ready(&self) {
        if !self.ready.swap(true, Ordering::AcqRel) {
            tracing::info!("overlay canvas ready");
        }
    }

    /// The overlay page started (re)loading: its canvas and listeners are
    /// gone, so nothing sent so far will be answered.
    pub fn mark_unloaded(&self) {
        let was_ready = self.ready.swap(false, Ordering::AcqRel);
        let dropped = self.replies.cancel_all();
        if was_ready || dropped > 0 {
            tracing::info!(dropped, "overlay page reloading, canvas not ready");
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}

impl ConfettiRenderer for WebviewRenderer {
    fn fire(&self, burst: &Burst) -> Option<RenderCompletion> {
        if !self.is_ready() {
            tracing::debug!("overlay canvas not ready, burst skipped");
            return None;
        }

        let (id, done) = self.replies.open();
        let payload = ConfettiFireEvent {
            id,
            burst: burst.clone(),
        };
        if let Err(err) = self.app.emit_to(OVERLAY_WINDOW, CONFETTI_FIRE, payload) {
            tracing::warn!("failed to send burst to overlay: {err}");
            self.replies.forget(id);
            return None;
        }
        tracing::trace!(id, "burst sent");
        Some(done)
    }
}

pub struct WebviewFramePacer {
    app: AppHandle,
    replies: Arc<PendingReplies>,
}

impl WebviewFramePacer {
    pub fn new(app: AppHandle, replies: Arc<PendingReplies>) -> Self {
        Self { app, replies }
    }
}

#[async_trait]
impl FramePacer for WebviewFramePacer {
    async fn next_frame(&self) {
        let (id, frame) = self.replies.open();
        if let Err(err) = self
            .app
            .emit_to(OVERLAY_WINDOW, OVERLAY_FRAME, OverlayFrameEvent { id })
        {
            tracing::warn!("failed to request animation frame: {err}");
        }
        if tokio::time::timeout(FRAME_FALLBACK, frame).await.is_err() {
            tracing::trace!(id, "no animation frame from overlay, continuing");
            self.replies.forget(id);
        }
    }
}
