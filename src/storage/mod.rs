use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::settings::Settings;

/// Key the whole settings record is stored under.
pub const SETTINGS_KEY: &str = "desktop-celebrator-settings";

pub struct Storage {
    conn: Connection,
}

impl Storage {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("failed to create db parent directory")?;
        }

        let conn = Connection::open(path).context("failed to open sqlite db")?;
        let mut storage = Self { conn };
        storage.run_migrations()?;
        Ok(storage)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory db")?;
        let mut storage = Self { conn };
        storage.run_migrations()?;
        Ok(storage)
    }

    pub fn run_migrations(&mut self) -> Result<()> {
        self.conn
            .execute_batch(include_str!("migrations/001_init.sql"))
            .context("failed to run migrations")?;
        Ok(())
    }

    /// Raw JSON of the stored settings record, if one was ever saved.
    pub fn read_settings_json(&self) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value_json FROM settings WHERE key = ?1 LIMIT 1",
                params![SETTINGS_KEY],
                |row| row.get(0),
            )
            .optional()
            .context("failed to read settings record")
    }

    pub fn write_settings(&self, settings: &Settings) -> Result<()> {
        let json = serde_json::to_string(settings).context("failed to encode settings")?;
        self.write_settings_json(&json)
    }

    pub fn write_settings_json(&self, json: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO settings(key, value_json, updated_at) VALUES(?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET
                   value_json = excluded.value_json,
                   updated_at = excluded.updated_at",
                params![SETTINGS_KEY, json, unix_ms()],
            )
            .context("failed to write settings record")?;
        Ok(())
    }
}

fn unix_ms() -> i64 {
    let dur = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    dur.as_millis() as i64
}
