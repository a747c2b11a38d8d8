use serde::{Deserialize, Serialize};

use crate::confetti::Burst;

/// Label of the transparent overlay window that owns rendering.
pub const OVERLAY_WINDOW: &str = "main";
pub const SETTINGS_WINDOW: &str = "settings";

pub const CELEBRATE_SMALL: &str = "celebrate-small";
pub const CELEBRATE_BIG: &str = "celebrate-big";
pub const SETTINGS_CHANGED: &str = "settings:changed";
pub const CONFETTI_FIRE: &str = "confetti:fire";
pub const OVERLAY_FRAME: &str = "overlay:frame";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    Small,
    Big,
}

impl Trigger {
    pub const ALL: [Trigger; 2] = [Trigger::Small, Trigger::Big];

    pub fn event_name(self) -> &'static str {
        match self {
            Trigger::Small => CELEBRATE_SMALL,
            Trigger::Big => CELEBRATE_BIG,
        }
    }

    /// Maps the `type` field of a hook request; unknown kinds get the
    /// small burst.
    pub fn from_hook_kind(kind: &str) -> Self {
        match kind {
            "big" | "error" => Trigger::Big,
            _ => Trigger::Small,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfettiFireEvent {
    pub id: u64,
    pub burst: Burst,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverlayFrameEvent {
    pub id: u64,
}
