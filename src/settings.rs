use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Square,
    Circle,
    Star,
}

/// Persisted confetti configuration.
///
/// `#[serde(default)]` makes a stored record merge over the defaults:
/// missing fields take the default value, unknown fields are dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub particle_count: u32,
    pub spread: f64,
    pub start_velocity: f64,
    pub scalar: f64,
    pub colors: Vec<String>,
    pub shapes: Vec<ShapeKind>,
    pub emojis: Vec<String>,
    pub use_emojis: bool,
    /// Data URLs. Stored and editable, not yet turned into shapes.
    pub custom_images: Vec<String>,
    pub use_custom_images: bool,
    pub shortcut_small: String,
    pub shortcut_big: String,
}

impl Default for Settings {
    fn default() -> Self {
        let (shortcut_small, shortcut_big) = if cfg!(target_os = "macos") {
            ("Cmd+Alt+C".to_string(), "Cmd+Alt+B".to_string())
        } else {
            ("Ctrl+Alt+C".to_string(), "Ctrl+Alt+B".to_string())
        };

        Self {
            particle_count: 100,
            spread: 70.0,
            start_velocity: 45.0,
            scalar: 1.0,
            colors: [
                "#26ccff", "#a25afd", "#ff5e7e", "#88ff5a", "#fcff42", "#ffa62d", "#ff36ff",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            shapes: vec![ShapeKind::Square, ShapeKind::Circle],
            emojis: ["🎉", "🥳", "🚀"].into_iter().map(String::from).collect(),
            use_emojis: false,
            custom_images: Vec::new(),
            use_custom_images: false,
            shortcut_small,
            shortcut_big,
        }
    }
}

/// Partial update. Present fields replace the current value wholesale,
/// lists included.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub particle_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spread: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_velocity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scalar: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shapes: Option<Vec<ShapeKind>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emojis: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_emojis: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_custom_images: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortcut_small: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortcut_big: Option<String>,
}

impl Settings {
    pub fn merged(&self, patch: SettingsPatch) -> Settings {
        let mut next = self.clone();
        next.apply(patch);
        next
    }

    pub fn apply(&mut self, patch: SettingsPatch) {
        let SettingsPatch {
            particle_count,
            spread,
            start_velocity,
            scalar,
            colors,
            shapes,
            emojis,
            use_emojis,
            custom_images,
            use_custom_images,
            shortcut_small,
            shortcut_big,
        } = patch;

        if let Some(v) = particle_count {
            self.particle_count = v;
        }
        if let Some(v) = spread {
            self.spread = v;
        }
        if let Some(v) = start_velocity {
            self.start_velocity = v;
        }
        if let Some(v) = scalar {
            self.scalar = v;
        }
        if let Some(v) = colors {
            self.colors = v;
        }
        if let Some(v) = shapes {
            self.shapes = v;
        }
        if let Some(v) = emojis {
            self.emojis = v;
        }
        if let Some(v) = use_emojis {
            self.use_emojis = v;
        }
        if let Some(v) = custom_images {
            self.custom_images = v;
        }
        if let Some(v) = use_custom_images {
            self.use_custom_images = v;
        }
        if let Some(v) = shortcut_small {
            self.shortcut_small = v;
        }
        if let Some(v) = shortcut_big {
            self.shortcut_big = v;
        }
    }
}
