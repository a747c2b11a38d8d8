//! Global shortcut arming.
//!
//! Re-arming always unregisters everything first and then registers the
//! small and big bindings in that order. A press that lands between the two
//! steps is lost, and a failed registration leaves the remaining bindings
//! unarmed until the next settings change.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tauri::AppHandle;
use tauri_plugin_global_shortcut::{Code, GlobalShortcutExt, Modifiers, Shortcut};
use tokio::sync::watch;

use crate::error::{CelebratorError, Result};
use crate::events::Trigger;
use crate::settings::Settings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutBindings {
    pub small: String,
    pub big: String,
}

impl From<&Settings> for ShortcutBindings {
    fn from(settings: &Settings) -> Self {
        Self {
            small: settings.shortcut_small.clone(),
            big: settings.shortcut_big.clone(),
        }
    }
}

impl ShortcutBindings {
    fn in_order(&self) -> [(&str, Trigger); 2] {
        [
            (self.small.as_str(), Trigger::Small),
            (self.big.as_str(), Trigger::Big),
        ]
    }
}

pub trait ShortcutRegistrar: Send + Sync {
    fn unregister_all(&self) -> Result<()>;
    fn register(&self, accelerator: &str, trigger: Trigger) -> Result<()>;
}

impl<T: ShortcutRegistrar + ?Sized> ShortcutRegistrar for Arc<T> {
    fn unregister_all(&self) -> Result<()> {
        self.as_ref().unregister_all()
    }

    fn register(&self, accelerator: &str, trigger: Trigger) -> Result<()> {
        self.as_ref().register(accelerator, trigger)
    }
}

pub fn rearm(registrar: &dyn ShortcutRegistrar, bindings: &ShortcutBindings) -> Result<()> {
    registrar.unregister_all().inspect_err(|err| {
        tracing::error!("failed to clear global shortcuts: {err}");
    })?;

    for (accelerator, trigger) in bindings.in_order() {
        registrar.register(accelerator, trigger).inspect_err(|err| {
            tracing::error!(?trigger, "failed to register shortcut '{accelerator}': {err}");
        })?;
        tracing::info!(?trigger, "shortcut '{accelerator}' armed");
    }

    Ok(())
}

/// Arms the current bindings, then re-arms whenever a published settings
/// value carries different ones. Returns when the store is dropped.
pub async fn watch_bindings<R>(registrar: R, mut settings: watch::Receiver<Settings>)
where
    R: ShortcutRegistrar,
{
    let mut armed = ShortcutBindings::from(&*settings.borrow_and_update());
    rearm(&registrar, &armed).ok();

    while settings.changed().await.is_ok() {
        let next = ShortcutBindings::from(&*settings.borrow_and_update());
        if next == armed {
            continue;
        }
        tracing::debug!(?next, "shortcut bindings changed");
        rearm(&registrar, &next).ok();
        armed = next;
    }
}

/// Shortcut id → trigger, consulted by the plugin's press handler.
#[derive(Default)]
pub struct ArmedShortcuts {
    table: Mutex<HashMap<u32, Trigger>>,
}

impl ArmedShortcuts {
    pub fn arm(&self, id: u32, trigger: Trigger) {
        if let Ok(mut table) = self.table.lock() {
            table.insert(id, trigger);
        }
    }

    pub fn clear(&self) {
        if let Ok(mut table) = self.table.lock() {
            table.clear();
        }
    }

    pub fn trigger_for(&self, id: u32) -> Option<Trigger> {
        self.table.lock().ok()?.get(&id).copied()
    }
}

pub struct TauriRegistrar {
    app: AppHandle,
    armed: Arc<ArmedShortcuts>,
}

impl TauriRegistrar {
    pub fn new(app: AppHandle, armed: Arc<ArmedShortcuts>) -> Self {
        Self { app, armed }
    }
}

impl ShortcutRegistrar for TauriRegistrar {
    fn unregister_all(&self) -> Result<()> {
        self.armed.clear();
        self.app
            .global_shortcut()
            .unregister_all()
            .map_err(|e| CelebratorError::shortcut(e.to_string()))
    }

    fn register(&self, accelerator: &str, trigger: Trigger) -> Result<()> {
        let shortcut = parse_shortcut(accelerator).ok_or_else(|| {
            CelebratorError::shortcut(format!("invalid shortcut format: {accelerator}"))
        })?;
        let id = shortcut.id();

        self.app
            .global_shortcut()
            .register(shortcut)
            .map_err(|e| CelebratorError::shortcut(e.to_string()))?;
        self.armed.arm(id, trigger);
        Ok(())
    }
}

pub fn parse_shortcut(shortcut: &str) -> Option<Shortcut> {
    let s = shortcut.trim().to_lowercase();
    let mut mods = Modifiers::empty();
    let mut code: Option<Code> = None;

    for part in s.split('+').map(|p| p.trim()) {
        match part {
            "ctrl" | "control" => mods |= Modifiers::CONTROL,
            "shift" => mods |= Modifiers::SHIFT,
            "alt" | "option" => mods |= Modifiers::ALT,
            "cmd" | "command" | "super" | "meta" => mods |= Modifiers::SUPER,
            "cmdorctrl" | "commandorcontrol" => mods |= primary_modifier(),
            "" => return None,
            key => code = Some(key_code_from_token(key)?),
        }
    }

    code.map(|c| Shortcut::new(Some(mods), c))
}

fn primary_modifier() -> Modifiers {
    if cfg!(target_os = "macos") {
        Modifiers::SUPER
    } else {
        Modifiers::CONTROL
    }
}

fn key_code_from_token(token: &str) -> Option<Code> {
    let code = match token {
        "a" => Code::KeyA,
        "b" => Code::KeyB,
        "c" => Code::KeyC,
        "d" => Code::KeyD,
        "e" => Code::KeyE,
        "f" => Code::KeyF,
        "g" => Code::KeyG,
        "h" => Code::KeyH,
        "i" => Code::KeyI,
        "j" => Code::KeyJ,
        "k" => Code::KeyK,
        "l" => Code::KeyL,
        "m" => Code::KeyM,
        "n" => Code::KeyN,
        "o" => Code::KeyO,
        "p" => Code::KeyP,
        "q" => Code::KeyQ,
        "r" => Code::KeyR,
        "s" => Code::KeyS,
        "t" => Code::KeyT,
        "u" => Code::KeyU,
        "v" => Code::KeyV,
        "w" => Code::KeyW,
        "x" => Code::KeyX,
        "y" => Code::KeyY,
        "z" => Code::KeyZ,
        "0" => Code::Digit0,
        "1" => Code::Digit1,
        "2" => Code::Digit2,
        "3" => Code::Digit3,
        "4" => Code::Digit4,
        "5" => Code::Digit5,
        "6" => Code::Digit6,
        "7" => Code::Digit7,
        "8" => Code::Digit8,
        "9" => Code::Digit9,
        "f1" => Code::F1,
        "f2" => Code::F2,
        "f3" => Code::F3,
        "f4" => Code::F4,
        "f5" => Code::F5,
        "f6" => Code::F6,
        "f7" => Code::F7,
        "f8" => Code::F8,
        "f9" => Code::F9,
        "f10" => Code::F10,
        "f11" => Code::F11,
        "f12" => Code::F12,
        "space" => Code::Space,
        "enter" | "return" => Code::Enter,
        "tab" => Code::Tab,
        "esc" | "escape" => Code::Escape,
        _ => return None,
    };
    Some(code)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use super::*;
    use crate::settings::SettingsPatch;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        UnregisterAll,
        Register(String, Trigger),
    }

    /// Records calls and rejects any accelerator listed in `reject`.
    #[derive(Default)]
    struct RecordingRegistrar {
        calls: StdMutex<Vec<Call>>,
        reject: Vec<String>,
    }

    impl RecordingRegistrar {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ShortcutRegistrar for RecordingRegistrar {
        fn unregister_all(&self) -> Result<()> {
            self.calls.lock().unwrap().push(Call::UnregisterAll);
            Ok(())
        }

        fn register(&self, accelerator: &str, trigger: Trigger) -> Result<()> {
            if self.reject.iter().any(|r| r == accelerator) {
                return Err(CelebratorError::shortcut("already taken"));
            }
            self.calls
                .lock()
                .unwrap()
                .push(Call::Register(accelerator.to_string(), trigger));
            Ok(())
        }
    }

    fn bindings(small: &str, big: &str) -> ShortcutBindings {
        ShortcutBindings {
            small: small.into(),
            big: big.into(),
        }
    }

    #[test]
    fn parses_modifiers_and_key() {
        let parsed = parse_shortcut("Ctrl+Shift+P").expect("valid");
        assert_eq!(
            parsed,
            Shortcut::new(Some(Modifiers::CONTROL | Modifiers::SHIFT), Code::KeyP)
        );

        let parsed = parse_shortcut(" alt + f9 ").expect("valid");
        assert_eq!(parsed, Shortcut::new(Some(Modifiers::ALT), Code::F9));
    }

    #[test]
    fn rejects_unknown_keys_and_missing_key() {
        assert!(parse_shortcut("Ctrl+Shift").is_none());
        assert!(parse_shortcut("Ctrl+Banana").is_none());
        assert!(parse_shortcut("Ctrl++C").is_none());
        assert!(parse_shortcut("").is_none());
    }

    #[test]
    fn default_bindings_parse() {
        let settings = Settings::default();
        assert!(parse_shortcut(&settings.shortcut_small).is_some());
        assert!(parse_shortcut(&settings.shortcut_big).is_some());
    }

    #[test]
    fn rearm_clears_before_registering_both() {
        let registrar = RecordingRegistrar::default();
        rearm(&registrar, &bindings("Ctrl+Alt+C", "Ctrl+Alt+B")).expect("armed");

        assert_eq!(
            registrar.calls(),
            vec![
                Call::UnregisterAll,
                Call::Register("Ctrl+Alt+C".into(), Trigger::Small),
                Call::Register("Ctrl+Alt+B".into(), Trigger::Big),
            ]
        );
    }

    #[test]
    fn failed_small_registration_leaves_nothing_armed() {
        let registrar = RecordingRegistrar {
            reject: vec!["Ctrl+Alt+C".into()],
            ..Default::default()
        };

        let result = rearm(&registrar, &bindings("Ctrl+Alt+C", "Ctrl+Alt+B"));

        assert!(matches!(result, Err(CelebratorError::Shortcut(_))));
        assert_eq!(registrar.calls(), vec![Call::UnregisterAll]);
    }

    #[test]
    fn failed_big_registration_keeps_small_armed() {
        crate::logging::init_test();
        let registrar = RecordingRegistrar {
            reject: vec!["Ctrl+Alt+B".into()],
            ..Default::default()
        };

        let result = rearm(&registrar, &bindings("Ctrl+Alt+C", "Ctrl+Alt+B"));

        assert!(matches!(result, Err(CelebratorError::Shortcut(_))));
        assert_eq!(
            registrar.calls(),
            vec![
                Call::UnregisterAll,
                Call::Register("Ctrl+Alt+C".into(), Trigger::Small),
            ]
        );
    }

    #[test]
    fn armed_table_maps_ids_to_triggers() {
        let armed = ArmedShortcuts::default();
        armed.arm(7, Trigger::Big);
        assert_eq!(armed.trigger_for(7), Some(Trigger::Big));
        assert_eq!(armed.trigger_for(8), None);

        armed.clear();
        assert_eq!(armed.trigger_for(7), None);
    }

    #[tokio::test]
    async fn watcher_rearms_only_when_bindings_change() {
        crate::logging::init_test();
        let registrar = Arc::new(RecordingRegistrar::default());
        let (tx, rx) = watch::channel(Settings::default());
        let task = tokio::spawn(watch_bindings(registrar.clone(), rx));
        tokio::task::yield_now().await;

        // unrelated change
        tx.send_modify(|s| {
            s.apply(SettingsPatch {
                spread: Some(10.0),
                ..Default::default()
            })
        });
        tokio::task::yield_now().await;
        assert_eq!(registrar.calls().len(), 3);

        tx.send_modify(|s| {
            s.apply(SettingsPatch {
                shortcut_big: Some("Ctrl+Shift+9".into()),
                ..Default::default()
            })
        });
        tokio::task::yield_now().await;

        let calls = registrar.calls();
        assert_eq!(calls.len(), 6);
        assert_eq!(calls[3], Call::UnregisterAll);
        assert_eq!(calls[5], Call::Register("Ctrl+Shift+9".into(), Trigger::Big));

        drop(tx);
        task.await.expect("watcher exits when the store goes away");
    }
}
