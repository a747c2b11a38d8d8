mod commands;
pub mod confetti;
pub mod editor;
pub mod error;
pub mod events;
pub mod git_hooks;
pub mod logging;
pub mod overlay;
pub mod server;
pub mod settings;
pub mod settings_store;
pub mod shortcuts;
pub mod storage;

use std::sync::Arc;

use anyhow::Context;
use tauri::image::Image;
use tauri::menu::{Menu, MenuEvent, MenuItem};
use tauri::tray::{MouseButton, MouseButtonState, TrayIconBuilder, TrayIconEvent};
use tauri::webview::PageLoadEvent;
use tauri::{AppHandle, Emitter, Listener, Manager, WindowEvent};
use tauri_plugin_global_shortcut::ShortcutState;
use tokio::sync::watch;

use crate::events::{Trigger, OVERLAY_WINDOW, SETTINGS_CHANGED, SETTINGS_WINDOW};
use crate::overlay::webview::{
    PendingReplies, WebviewFramePacer, WebviewRenderer, WebviewSurface,
};
use crate::overlay::OverlayController;
use crate::settings::Settings;
use crate::settings_store::SettingsStore;
use crate::shortcuts::{ArmedShortcuts, TauriRegistrar};
use crate::storage::Storage;

pub struct SharedState {
    pub store: SettingsStore,
    pub overlay: Arc<OverlayController>,
    pub renderer: Arc<WebviewRenderer>,
    pub replies: Arc<PendingReplies>,
    pub shortcuts: Arc<ArmedShortcuts>,
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    logging::init();

    tauri::Builder::default()
        .plugin(
            tauri_plugin_global_shortcut::Builder::new()
                .with_handler(|app, shortcut, event| {
                    if event.state() != ShortcutState::Pressed {
                        return;
                    }
                    let Some(state) = app.try_state::<Arc<SharedState>>() else {
                        return;
                    };
                    match state.shortcuts.trigger_for(shortcut.id()) {
                        Some(trigger) => spawn_celebration(state.overlay.clone(), trigger),
                        None => tracing::debug!("press for unarmed shortcut {shortcut:?}"),
                    }
                })
                .build(),
        )
        .on_page_load(|webview, payload| {
            if webview.label() != OVERLAY_WINDOW
                || !matches!(payload.event(), PageLoadEvent::Started)
            {
                return;
            }
            if let Some(state) = webview.try_state::<Arc<SharedState>>() {
                state.renderer.mark_unloaded();
            }
        })
        .on_window_event(|window, event| {
            if let WindowEvent::CloseRequested { api, .. } = event {
                if hides_on_close(window.label()) {
                    api.prevent_close();
                    if let Err(err) = window.hide() {
                        tracing::warn!("failed to hide {}: {err}", window.label());
                    }
                }
            }
        })
        .setup(|app| {
            #[cfg(target_os = "macos")]
            app.set_activation_policy(tauri::ActivationPolicy::Accessory);

            let app_dir = app
                .path()
                .app_data_dir()
                .context("failed to resolve app data dir")?;
            std::fs::create_dir_all(&app_dir)?;

            let db_path = app_dir.join("celebrator.db");
            let storage = Storage::open(&db_path)?;
            let store = SettingsStore::open(storage);

            let window = app
                .get_webview_window(OVERLAY_WINDOW)
                .context("overlay window missing from config")?;
            let replies = Arc::new(PendingReplies::default());
            let renderer = Arc::new(WebviewRenderer::new(app.handle().clone(), replies.clone()));
            let overlay = Arc::new(OverlayController::new(
                Arc::new(WebviewSurface::new(window)),
                renderer.clone(),
                Arc::new(WebviewFramePacer::new(app.handle().clone(), replies.clone())),
                store.subscribe(),
            ));

            let shortcuts = Arc::new(ArmedShortcuts::default());
            let registrar = TauriRegistrar::new(app.handle().clone(), shortcuts.clone());
            let bindings_rx = store.subscribe();
            let forward_rx = store.subscribe();

            let state = Arc::new(SharedState {
                store,
                overlay: overlay.clone(),
                renderer,
                replies,
                shortcuts,
            });
            app.manage(state);

            {
                let overlay = overlay.clone();
                tauri::async_runtime::spawn(async move { overlay.mount().await });
            }
            listen_for_celebrations(app.handle(), overlay);
            tauri::async_runtime::spawn(crate::shortcuts::watch_bindings(registrar, bindings_rx));
            tauri::async_runtime::spawn(forward_settings(app.handle().clone(), forward_rx));
            server::start_server(app.handle().clone());
            setup_tray(app.handle())?;

            tracing::info!("desktop celebrator ready");
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::get_settings,
            commands::update_settings,
            commands::reset_settings,
            commands::add_emoji,
            commands::remove_emoji,
            commands::toggle_shape,
            commands::add_color,
            commands::remove_color,
            commands::add_custom_image,
            commands::remove_custom_image,
            commands::set_ignore_cursor_events,
            commands::install_git_hooks,
            commands::overlay_ready,
            commands::confetti_done,
            commands::overlay_frame,
            commands::open_settings_window,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}

/// The settings window is reopened from the tray, so closing it only hides
/// it.
fn hides_on_close(label: &str) -> bool {
    label == SETTINGS_WINDOW
}

fn spawn_celebration(overlay: Arc<OverlayController>, trigger: Trigger) {
    tauri::async_runtime::spawn(async move { overlay.celebrate(trigger).await });
}

/// `celebrate-*` events from the settings window, the tray and the
/// trigger server all land here.
fn listen_for_celebrations(app: &AppHandle, overlay: Arc<OverlayController>) {
    for trigger in Trigger::ALL {
        let overlay = overlay.clone();
        app.listen_any(trigger.event_name(), move |_event| {
            spawn_celebration(overlay.clone(), trigger);
        });
    }
}

/// Pushes every published settings value to all webviews so their cached
/// copies converge.
async fn forward_settings(app: AppHandle, mut settings: watch::Receiver<Settings>) {
    while settings.changed().await.is_ok() {
        let snapshot = settings.borrow_and_update().clone();
        if let Err(err) = app.emit(SETTINGS_CHANGED, snapshot) {
            tracing::warn!("failed to broadcast settings: {err}");
        }
    }
}

fn setup_tray(app: &AppHandle) -> anyhow::Result<()> {
    let small_item =
        MenuItem::with_id(app, "celebrate_small", "Small Celebration", true, None::<&str>)?;
    let big_item =
        MenuItem::with_id(app, "celebrate_big", "Big Celebration", true, None::<&str>)?;
    let settings_item =
        MenuItem::with_id(app, "open_settings", "Settings", true, None::<&str>)?;
    let quit_item = MenuItem::with_id(app, "quit", "Quit", true, None::<&str>)?;
    let menu = Menu::with_items(app, &[&small_item, &big_item, &settings_item, &quit_item])?;

    let mut tray_builder = TrayIconBuilder::new()
        .icon(tray_icon_image())
        .tooltip("Desktop Celebrator")
        .menu(&menu)
        .on_menu_event(|app, event: MenuEvent| match event.id().as_ref() {
            "celebrate_small" => emit_trigger(app, Trigger::Small),
            "celebrate_big" => emit_trigger(app, Trigger::Big),
            "open_settings" => {
                if let Err(err) = commands::show_settings_window(app) {
                    tracing::warn!("failed to open settings: {err}");
                }
            }
            "quit" => {
                app.exit(0);
            }
            _ => {}
        })
        .on_tray_icon_event(|tray: &tauri::tray::TrayIcon, event: TrayIconEvent| {
            if let TrayIconEvent::Click {
                button: MouseButton::Left,
                button_state: MouseButtonState::Up,
                ..
            } = event
            {
                if let Err(err) = commands::show_settings_window(tray.app_handle()) {
                    tracing::warn!("failed to open settings: {err}");
                }
            }
        });

    #[cfg(target_os = "macos")]
    {
        tray_builder = tray_builder.icon_as_template(true);
    }

    let tray = tray_builder.build(app)?;

    // Keep tray alive for whole process lifetime.
    Box::leak(Box::new(tray));

    Ok(())
}

fn emit_trigger(app: &AppHandle, trigger: Trigger) {
    if let Err(err) = app.emit_to(OVERLAY_WINDOW, trigger.event_name(), ()) {
        tracing::warn!("failed to emit {}: {err}", trigger.event_name());
    }
}

/// 18x18 template icon: a small burst of four rays around a dot.
fn tray_icon_image() -> Image<'static> {
    const W: usize = 18;
    const H: usize = 18;
    let mut rgba = vec![0u8; W * H * 4];

    for y in 0..H {
        for x in 0..W {
            let dx = x as i32 - 8;
            let dy = y as i32 - 8;
            let center = dx.abs() <= 1 && dy.abs() <= 1;
            let axis_ray = (dx == 0 || dy == 0) && (4..=7).contains(&dx.abs().max(dy.abs()));
            let diag_ray = dx.abs() == dy.abs() && (3..=5).contains(&dx.abs());
            if center || axis_ray || diag_ray {
                let i = (y * W + x) * 4;
                rgba[i + 3] = 255;
            }
        }
    }

    Image::new_owned(rgba, W as u32, H as u32)
}
