use std::sync::Arc;

use tauri::{AppHandle, Manager, State};

use crate::editor;
use crate::error::Result;
use crate::events::SETTINGS_WINDOW;
use crate::settings::{Settings, SettingsPatch, ShapeKind};
use crate::SharedState;

type SharedStateArg<'a> = State<'a, Arc<SharedState>>;

#[tauri::command]
pub fn get_settings(state: SharedStateArg<'_>) -> Settings {
    state.store.current()
}

#[tauri::command]
pub fn update_settings(state: SharedStateArg<'_>, patch: SettingsPatch) -> Settings {
    state.store.update(patch)
}

#[tauri::command]
pub fn reset_settings(state: SharedStateArg<'_>) -> Settings {
    state.store.reset()
}

#[tauri::command]
pub fn add_emoji(state: SharedStateArg<'_>, emoji: String) -> Result<Settings> {
    edit(&state, |s| editor::add_emoji(s, &emoji))
}

#[tauri::command]
pub fn remove_emoji(state: SharedStateArg<'_>, index: usize) -> Result<Settings> {
    edit(&state, |s| editor::remove_emoji(s, index))
}

#[tauri::command]
pub fn toggle_shape(state: SharedStateArg<'_>, shape: ShapeKind) -> Result<Settings> {
    edit(&state, |s| editor::toggle_shape(s, shape))
}

#[tauri::command]
pub fn add_color(state: SharedStateArg<'_>, color: String) -> Result<Settings> {
    edit(&state, |s| editor::add_color(s, &color))
}

#[tauri::command]
pub fn remove_color(state: SharedStateArg<'_>, index: usize) -> Result<Settings> {
    edit(&state, |s| editor::remove_color(s, index))
}

#[tauri::command]
pub fn add_custom_image(state: SharedStateArg<'_>, data_url: String) -> Result<Settings> {
    edit(&state, |s| editor::add_custom_image(s, &data_url))
}

#[tauri::command]
pub fn remove_custom_image(state: SharedStateArg<'_>, index: usize) -> Result<Settings> {
    edit(&state, |s| editor::remove_custom_image(s, index))
}

#[tauri::command]
pub fn set_ignore_cursor_events(window: tauri::Window, ignore: bool) -> Result<()> {
    window.set_ignore_cursor_events(ignore)?;
    Ok(())
}

#[tauri::command]
pub fn install_git_hooks(app: AppHandle) -> Result<String> {
    let home = app.path().home_dir()?;
    crate::git_hooks::install_git_hooks(&home)
}

/// The overlay page finished creating its canvas.
#[tauri::command]
pub fn overlay_ready(state: SharedStateArg<'_>) {
    state.renderer.mark_ready();
}

#[tauri::command]
pub fn confetti_done(state: SharedStateArg<'_>, id: u64) {
    state.replies.resolve(id);
}

#[tauri::command]
pub fn overlay_frame(state: SharedStateArg<'_>, id: u64) {
    state.replies.resolve(id);
}

#[tauri::command]
pub fn open_settings_window(app: AppHandle) -> Result<()> {
    show_settings_window(&app)?;
    Ok(())
}

pub fn show_settings_window(app: &AppHandle) -> tauri::Result<()> {
    if let Some(window) = app.get_webview_window(SETTINGS_WINDOW) {
        window.show()?;
        window.unminimize()?;
        window.set_focus()?;
    }
    Ok(())
}

fn edit<F>(state: &SharedState, compute: F) -> Result<Settings>
where
    F: FnOnce(&Settings) -> Option<SettingsPatch>,
{
    state.store.update_with(compute)
}
