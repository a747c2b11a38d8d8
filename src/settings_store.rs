//! Process-owned settings service.
//!
//! The store is the single writer. Windows and background tasks hold a
//! `watch::Receiver` and always observe the latest published value.

use std::sync::Mutex;

use tokio::sync::watch;

use crate::error::{CelebratorError, Result};
use crate::settings::{Settings, SettingsPatch};
use crate::storage::Storage;

pub struct SettingsStore {
    storage: Mutex<Storage>,
    current: watch::Sender<Settings>,
}

impl SettingsStore {
    pub fn open(storage: Storage) -> Self {
        let initial = load_from(&storage);
        let (current, _) = watch::channel(initial);
        Self {
            storage: Mutex::new(storage),
            current,
        }
    }

    /// Reads the persisted record merged over defaults.
    ///
    /// Never fails: unreadable or malformed records yield the defaults.
    pub fn load(&self) -> Settings {
        match self.storage.lock() {
            Ok(storage) => load_from(&storage),
            Err(err) => {
                tracing::error!("settings storage lock poisoned: {err}");
                Settings::default()
            }
        }
    }

    pub fn current(&self) -> Settings {
        self.current.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Settings> {
        self.current.subscribe()
    }

    /// Persists, then publishes. A failed write is logged and the value
    /// is published anyway so open windows stay consistent.
    pub fn save(&self, settings: Settings) -> Settings {
        match self.storage.lock() {
            Ok(storage) => persist(&storage, &settings),
            Err(err) => tracing::error!("settings storage lock poisoned: {err}"),
        }
        self.current.send_replace(settings.clone());
        settings
    }

    pub fn update(&self, patch: SettingsPatch) -> Settings {
        match self.update_with(|_| Some(patch)) {
            Ok(next) => next,
            Err(err) => {
                tracing::error!("settings update dropped: {err}");
                self.current()
            }
        }
    }

    /// Computes a patch from the current value while holding the storage
    /// lock, so list edits from two windows cannot interleave. `None`
    /// means nothing to change.
    pub fn update_with<F>(&self, compute: F) -> Result<Settings>
    where
        F: FnOnce(&Settings) -> Option<SettingsPatch>,
    {
        let storage = self
            .storage
            .lock()
            .map_err(|e| CelebratorError::lock(e.to_string()))?;

        let before = self.current.borrow().clone();
        let Some(patch) = compute(&before) else {
            return Ok(before);
        };

        let next = before.merged(patch);
        persist(&storage, &next);
        self.current.send_replace(next.clone());
        Ok(next)
    }

    pub fn reset(&self) -> Settings {
        tracing::info!("resetting settings to defaults");
        self.save(Settings::default())
    }
}

fn load_from(storage: &Storage) -> Settings {
    let json = match storage.read_settings_json() {
        Ok(Some(json)) => json,
        Ok(None) => return Settings::default(),
        Err(err) => {
            tracing::error!("failed to read stored settings: {err:#}");
            return Settings::default();
        }
    };

    match serde_json::from_str::<Settings>(&json) {
        Ok(settings) => settings,
        Err(err) => {
            tracing::warn!("stored settings are malformed, using defaults: {err}");
            Settings::default()
        }
    }
}

fn persist(storage: &Storage, settings: &Settings) {
    if let Err(err) = storage.write_settings(settings) {
        tracing::error!("failed to persist settings: {err:#}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ShapeKind;

    fn store_with(json: Option<&str>) -> SettingsStore {
        let storage = Storage::open_in_memory().expect("open db");
        if let Some(json) = json {
            storage.write_settings_json(json).expect("seed");
        }
        SettingsStore::open(storage)
    }

    #[test]
    fn empty_storage_loads_defaults() {
        let store = store_with(None);
        assert_eq!(store.current(), Settings::default());
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn partial_record_merges_over_defaults() {
        let store = store_with(Some(r#"{"particleCount": 5, "useEmojis": true}"#));
        let loaded = store.load();
        assert_eq!(loaded.particle_count, 5);
        assert!(loaded.use_emojis);
        assert_eq!(loaded.spread, Settings::default().spread);
    }

    #[test]
    fn malformed_record_recovers_to_defaults() {
        let store = store_with(Some("{not json"));
        assert_eq!(store.load(), Settings::default());

        let store = store_with(Some(r#"{"particleCount": "lots"}"#));
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn update_persists_and_touches_only_patched_fields() {
        let store = store_with(None);
        let before = store.current();

        let after = store.update(SettingsPatch {
            shapes: Some(vec![ShapeKind::Star]),
            ..Default::default()
        });

        assert_eq!(after.shapes, vec![ShapeKind::Star]);
        assert_eq!(after.colors, before.colors);
        assert_eq!(after.shortcut_small, before.shortcut_small);
        assert_eq!(store.load(), after);
    }

    #[test]
    fn reset_then_load_yields_defaults() {
        let store = store_with(Some(r#"{"spread": 3, "emojis": []}"#));
        store.update(SettingsPatch {
            scalar: Some(4.0),
            ..Default::default()
        });

        store.reset();
        assert_eq!(store.load(), Settings::default());
        assert_eq!(store.current(), Settings::default());
    }

    #[test]
    fn update_with_none_leaves_state_untouched() {
        let store = store_with(None);
        let mut rx = store.subscribe();
        rx.borrow_and_update();

        let out = store.update_with(|_| None).expect("update");
        assert_eq!(out, Settings::default());
        assert!(!rx.has_changed().expect("sender alive"));
    }

    #[tokio::test]
    async fn failed_write_still_publishes() {
        crate::logging::init_test();
        let db_path = std::env::temp_dir().join(format!(
            "celebrator-store-{}.db",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        let store = SettingsStore::open(Storage::open(&db_path).expect("open db"));
        let mut rx = store.subscribe();

        rusqlite::Connection::open(&db_path)
            .expect("second connection")
            .execute_batch("DROP TABLE settings;")
            .expect("drop table");

        let saved = store.save(Settings {
            particle_count: 7,
            ..Settings::default()
        });
        assert_eq!(saved.particle_count, 7);
        rx.changed().await.expect("sender alive");
        assert_eq!(rx.borrow_and_update().particle_count, 7);

        let updated = store
            .update_with(|_| {
                Some(SettingsPatch {
                    spread: Some(15.0),
                    ..Default::default()
                })
            })
            .expect("update");
        assert_eq!(updated.spread, 15.0);
        assert_eq!(store.current(), updated);
        assert!(rx.has_changed().expect("sender alive"));

        // nothing reached disk
        assert_eq!(store.load(), Settings::default());

        drop(store);
        let _ = std::fs::remove_file(db_path);
    }

    #[tokio::test]
    async fn subscribers_observe_saves() {
        let store = store_with(None);
        let mut rx = store.subscribe();

        store.update(SettingsPatch {
            particle_count: Some(12),
            ..Default::default()
        });

        rx.changed().await.expect("sender alive");
        assert_eq!(rx.borrow().particle_count, 12);
    }
}
