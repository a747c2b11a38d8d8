use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::time::Instant;

use super::{ConfettiRenderer, FramePacer, OverlaySurface, RenderCompletion};
use crate::confetti::{to_render_options, Burst};
use crate::events::Trigger;
use crate::settings::Settings;

pub const STREAM_DURATION: Duration = Duration::from_millis(3000);

/// Upper bound on waiting for the page to report a finished burst.
pub const RENDER_TIMEOUT: Duration = Duration::from_secs(10);

pub struct OverlayController {
    surface: Arc<dyn OverlaySurface>,
    renderer: Arc<dyn ConfettiRenderer>,
    pacer: Arc<dyn FramePacer>,
    settings: watch::Receiver<Settings>,
    /// In-flight celebrations. Held across show/hide so the window
    /// transition happens in the same step as the 0→1 / 1→0 change.
    active: Mutex<usize>,
}

impl OverlayController {
    pub fn new(
        surface: Arc<dyn OverlaySurface>,
        renderer: Arc<dyn ConfettiRenderer>,
        pacer: Arc<dyn FramePacer>,
        settings: watch::Receiver<Settings>,
    ) -> Self {
        Self {
            surface,
            renderer,
            pacer,
            settings,
            active: Mutex::new(0),
        }
    }

    /// Puts the overlay in its idle shape: hidden and click-through.
    pub async fn mount(&self) {
        if let Err(err) = self.surface.set_click_through(true) {
            tracing::warn!("failed to make overlay click-through: {err}");
        }
        let active = self.active.lock().await;
        if *active == 0 {
            if let Err(err) = self.surface.hide().await {
                tracing::warn!("failed to hide overlay on mount: {err}");
            }
        }
    }

    pub async fn active_celebrations(&self) -> usize {
        *self.active.lock().await
    }

    pub async fn begin_celebration(&self) {
        let mut active = self.active.lock().await;
        *active += 1;
        if *active == 1 {
            tracing::debug!("overlay active");
            if let Err(err) = self.surface.show().await {
                tracing::warn!("failed to show overlay: {err}");
            }
        }
    }

    pub async fn end_celebration(&self) {
        let mut active = self.active.lock().await;
        *active = active.saturating_sub(1);
        if *active == 0 {
            tracing::debug!("overlay idle");
            if let Err(err) = self.surface.hide().await {
                tracing::warn!("failed to hide overlay: {err}");
            }
        }
    }

    pub async fn celebrate(&self, trigger: Trigger) {
        tracing::info!(?trigger, "celebration triggered");
        match trigger {
            Trigger::Small => self.celebrate_small().await,
            Trigger::Big => self.celebrate_big().await,
        }
    }

    pub async fn celebrate_small(&self) {
        self.begin_celebration().await;

        let burst = Burst::small(to_render_options(&self.settings.borrow()));
        if let Some(done) = self.renderer.fire(&burst) {
            wait_for_render(done).await;
        }

        self.end_celebration().await;
    }

    /// Fires both edge cannons once per display frame for
    /// `STREAM_DURATION`, reading the live settings each frame.
    pub async fn celebrate_big(&self) {
        self.begin_celebration().await;

        let started = Instant::now();
        let mut last = None;
        let mut frames = 0u32;
        loop {
            let (left, right) = Burst::stream_pair(&self.settings.borrow());
            // only the right cannon's completion is awaited
            drop(self.renderer.fire(&left));
            if let Some(done) = self.renderer.fire(&right) {
                last = Some(done);
            }
            frames += 1;

            if started.elapsed() >= STREAM_DURATION {
                break;
            }
            self.pacer.next_frame().await;
        }
        tracing::debug!(frames, "stream finished emitting");

        if let Some(done) = last {
            wait_for_render(done).await;
        }

        self.end_celebration().await;
    }
}

async fn wait_for_render(done: RenderCompletion) {
    if tokio::time::timeout(RENDER_TIMEOUT, done).await.is_err() {
        tracing::warn!("renderer did not report completion within {RENDER_TIMEOUT:?}");
    }
}
