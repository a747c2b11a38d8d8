//! List edits behind the settings window's controls.
//!
//! Each operation looks at the current settings and returns the patch to
//! apply, or `None` when the input would change nothing. The full new list
//! is always computed here, since patches replace lists wholesale.

use crate::settings::{Settings, SettingsPatch, ShapeKind};

pub fn add_emoji(settings: &Settings, emoji: &str) -> Option<SettingsPatch> {
    let emoji = emoji.trim();
    if emoji.is_empty() {
        return None;
    }
    let mut emojis = settings.emojis.clone();
    emojis.push(emoji.to_string());
    Some(SettingsPatch {
        emojis: Some(emojis),
        ..Default::default()
    })
}

pub fn remove_emoji(settings: &Settings, index: usize) -> Option<SettingsPatch> {
    let emojis = without_index(&settings.emojis, index)?;
    Some(SettingsPatch {
        emojis: Some(emojis),
        ..Default::default()
    })
}

/// Adds the shape if missing, removes it otherwise.
pub fn toggle_shape(settings: &Settings, shape: ShapeKind) -> Option<SettingsPatch> {
    let mut shapes = settings.shapes.clone();
    if let Some(pos) = shapes.iter().position(|s| *s == shape) {
        shapes.remove(pos);
    } else {
        shapes.push(shape);
    }
    Some(SettingsPatch {
        shapes: Some(shapes),
        ..Default::default()
    })
}

/// Accepts `#rgb` / `#rrggbb` hex colors. Duplicates are allowed.
pub fn add_color(settings: &Settings, color: &str) -> Option<SettingsPatch> {
    let color = color.trim().to_lowercase();
    if !is_hex_color(&color) {
        return None;
    }
    let mut colors = settings.colors.clone();
    colors.push(color);
    Some(SettingsPatch {
        colors: Some(colors),
        ..Default::default()
    })
}

pub fn remove_color(settings: &Settings, index: usize) -> Option<SettingsPatch> {
    let colors = without_index(&settings.colors, index)?;
    Some(SettingsPatch {
        colors: Some(colors),
        ..Default::default()
    })
}

pub fn add_custom_image(settings: &Settings, data_url: &str) -> Option<SettingsPatch> {
    let data_url = data_url.trim();
    if !data_url.starts_with("data:image/") {
        return None;
    }
    let mut images = settings.custom_images.clone();
    images.push(data_url.to_string());
    Some(SettingsPatch {
        custom_images: Some(images),
        ..Default::default()
    })
}

pub fn remove_custom_image(settings: &Settings, index: usize) -> Option<SettingsPatch> {
    let images = without_index(&settings.custom_images, index)?;
    Some(SettingsPatch {
        custom_images: Some(images),
        ..Default::default()
    })
}

fn without_index(items: &[String], index: usize) -> Option<Vec<String>> {
    if index >= items.len() {
        return None;
    }
    let mut out = items.to_vec();
    out.remove(index);
    Some(out)
}

fn is_hex_color(color: &str) -> bool {
    let Some(hex) = color.strip_prefix('#') else {
        return false;
    };
    matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
}
