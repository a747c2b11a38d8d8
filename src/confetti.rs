//! Settings → particle-library parameters.
//!
//! Field names match what the overlay page hands to the particle library,
//! so a `Burst` is forwarded as-is.

use serde::Serialize;

use crate::settings::{Settings, ShapeKind};

/// Glyph size multiplier for emoji-derived shapes.
pub const EMOJI_SCALAR: f64 = 2.0;

/// Stream bursts use `particle_count / STREAM_DIVISOR`, never fewer than
/// `STREAM_MIN_PARTICLES`.
pub const STREAM_DIVISOR: u32 = 50;
pub const STREAM_MIN_PARTICLES: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ShapeToken {
    Geometric(ShapeKind),
    /// Rendered by the page via its text-to-shape helper.
    Text { text: String, scalar: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderParams {
    pub particle_count: u32,
    pub spread: f64,
    pub start_velocity: f64,
    pub scalar: f64,
    pub colors: Vec<String>,
    pub shapes: Vec<ShapeToken>,
    pub disable_for_reduced_motion: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Origin {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Burst {
    #[serde(flatten)]
    pub params: RenderParams,
    pub angle: f64,
    pub origin: Origin,
}

pub fn to_render_options(settings: &Settings) -> RenderParams {
    let mut shapes = Vec::with_capacity(settings.emojis.len() + settings.shapes.len());

    if settings.use_emojis {
        shapes.extend(settings.emojis.iter().map(|emoji| ShapeToken::Text {
            text: emoji.clone(),
            scalar: EMOJI_SCALAR,
        }));
    }
    // Geometric shapes combine with emojis rather than being replaced.
    shapes.extend(settings.shapes.iter().copied().map(ShapeToken::Geometric));

    RenderParams {
        particle_count: settings.particle_count,
        spread: settings.spread,
        start_velocity: settings.start_velocity,
        scalar: settings.scalar,
        colors: settings.colors.clone(),
        shapes,
        disable_for_reduced_motion: true,
    }
}

pub fn stream_particle_count(configured: u32) -> u32 {
    (configured / STREAM_DIVISOR).max(STREAM_MIN_PARTICLES)
}

impl Burst {
    /// Single upward burst from the lower middle of the screen.
    pub fn small(params: RenderParams) -> Self {
        Self {
            params,
            angle: 90.0,
            origin: Origin { x: 0.5, y: 0.6 },
        }
    }

    /// Left and right cannons for one stream frame.
    pub fn stream_pair(settings: &Settings) -> (Self, Self) {
        let mut params = to_render_options(settings);
        params.particle_count = stream_particle_count(settings.particle_count);

        let left = Self {
            params: params.clone(),
            angle: 60.0,
            origin: Origin { x: 0.0, y: 0.5 },
        };
        let right = Self {
            params,
            angle: 120.0,
            origin: Origin { x: 1.0, y: 0.5 },
        };
        (left, right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_translate_to_geometric_shapes_only() {
        let params = to_render_options(&Settings::default());

        assert_eq!(params.particle_count, 100);
        assert_eq!(params.spread, 70.0);
        assert_eq!(
            params.shapes,
            vec![
                ShapeToken::Geometric(ShapeKind::Square),
                ShapeToken::Geometric(ShapeKind::Circle)
            ]
        );
        assert!(params.disable_for_reduced_motion);
    }

    #[test]
    fn emojis_and_geometric_shapes_combine() {
        let settings = Settings {
            use_emojis: true,
            emojis: vec!["🎉".into()],
            shapes: vec![ShapeKind::Square],
            ..Settings::default()
        };

        let params = to_render_options(&settings);

        assert_eq!(
            params.shapes,
            vec![
                ShapeToken::Text {
                    text: "🎉".into(),
                    scalar: EMOJI_SCALAR
                },
                ShapeToken::Geometric(ShapeKind::Square),
            ]
        );
    }

    #[test]
    fn emojis_ignored_when_disabled() {
        let settings = Settings {
            use_emojis: false,
            emojis: vec!["🎉".into()],
            shapes: vec![],
            ..Settings::default()
        };
        assert!(to_render_options(&settings).shapes.is_empty());
    }

    #[test]
    fn translation_is_deterministic() {
        let settings = Settings {
            use_emojis: true,
            ..Settings::default()
        };
        assert_eq!(to_render_options(&settings), to_render_options(&settings));
    }

    #[test]
    fn custom_images_do_not_produce_shapes() {
        let settings = Settings {
            use_custom_images: true,
            custom_images: vec!["data:image/png;base64,AAAA".into()],
            shapes: vec![],
            ..Settings::default()
        };
        assert!(to_render_options(&settings).shapes.is_empty());
    }

    #[test]
    fn stream_count_never_below_two() {
        assert_eq!(stream_particle_count(10), 2);
        assert_eq!(stream_particle_count(0), 2);
        assert_eq!(stream_particle_count(100), 2);
        assert_eq!(stream_particle_count(149), 2);
        assert_eq!(stream_particle_count(150), 3);
        assert_eq!(stream_particle_count(1000), 20);
    }

    #[test]
    fn stream_pair_fires_from_both_edges() {
        let (left, right) = Burst::stream_pair(&Settings {
            particle_count: 10,
            ..Settings::default()
        });

        assert_eq!(left.angle, 60.0);
        assert_eq!(left.origin.x, 0.0);
        assert_eq!(right.angle, 120.0);
        assert_eq!(right.origin.x, 1.0);
        assert_eq!(left.params.particle_count, 2);
        assert_eq!(right.params.particle_count, 2);
    }

    #[test]
    fn burst_serializes_flat_for_the_page() {
        let settings = Settings {
            use_emojis: true,
            emojis: vec!["🥳".into()],
            shapes: vec![ShapeKind::Star],
            ..Settings::default()
        };
        let burst = Burst::small(to_render_options(&settings));
        let value = serde_json::to_value(&burst).unwrap();

        assert_eq!(value["particleCount"], 100);
        assert_eq!(value["disableForReducedMotion"], true);
        assert_eq!(value["origin"]["y"], 0.6);
        assert_eq!(value["shapes"][0]["text"], "🥳");
        assert_eq!(value["shapes"][1], "star");
    }
}
