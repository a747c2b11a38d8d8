//! The transparent overlay window and everything that drives it.
//!
//! `controller` holds the celebration logic. It talks to the window, the
//! particle library and the display's frame cadence only through the traits
//! below; `webview` implements them on top of Tauri.

pub mod controller;
pub mod webview;

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::confetti::Burst;
use crate::error::Result;

pub use controller::OverlayController;

/// Resolves when the particle library reports the burst finished.
/// A dropped sender counts as finished.
pub type RenderCompletion = oneshot::Receiver<()>;

#[async_trait]
pub trait OverlaySurface: Send + Sync {
    async fn show(&self) -> Result<()>;
    async fn hide(&self) -> Result<()>;
    /// When `true` clicks pass through to whatever is underneath.
    fn set_click_through(&self, ignore: bool) -> Result<()>;
}

pub trait ConfettiRenderer: Send + Sync {
    /// Returns `None` while the canvas is not set up yet.
    fn fire(&self, burst: &Burst) -> Option<RenderCompletion>;
}

#[async_trait]
pub trait FramePacer: Send + Sync {
    async fn next_frame(&self);
}
