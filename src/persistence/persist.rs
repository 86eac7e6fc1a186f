use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::macros::format_description;

use super::settings::AppSettings;
use crate::canvas::transform::ViewTransform;
use crate::store::graph::ChronicleStore;

/// On-disk shape of an autosave: the whole store plus the view transform.
#[derive(Debug, Serialize, Deserialize)]
pub struct AppStateFile {
    pub store: ChronicleStore,
    pub view: ViewTransform,
}

impl AppStateFile {
    pub fn from_runtime(store: &ChronicleStore, view: ViewTransform) -> Self {
        Self {
            store: store.clone(),
            view,
        }
    }

    pub fn into_runtime(self) -> (ChronicleStore, ViewTransform) {
        (self.store, self.view)
    }
}

/// One-way latch guarding autosave. Until the initial load has completed, a
/// save would overwrite the previous session with a still-empty store, so
/// `permits` stays false no matter what.
#[derive(Debug, Default)]
pub struct SaveGate {
    loaded: bool,
}

impl SaveGate {
    pub fn mark_loaded(&mut self) {
        self.loaded = true;
    }

    pub fn loaded(&self) -> bool {
        self.loaded
    }

    pub fn permits(&self, dirty: bool) -> bool {
        self.loaded && dirty
    }
}

static SETTINGS_OVERRIDE: OnceLock<AppSettings> = OnceLock::new();

pub fn set_settings_override(settings: AppSettings) {
    let _ = SETTINGS_OVERRIDE.set(settings);
}

fn settings() -> AppSettings {
    if let Some(settings) = SETTINGS_OVERRIDE.get() {
        return settings.clone();
    }
    // Load settings if present; else use defaults
    AppSettings::load().unwrap_or_default()
}

fn autosave_dir() -> PathBuf {
    settings().autosave_dir()
}

pub fn active_state_path() -> PathBuf {
    autosave_dir().join("chronicle.ron")
}

fn ensure_autosave_dir() -> std::io::Result<()> {
    fs::create_dir_all(autosave_dir())
}

fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let tmp_path = path.with_extension("ron.tmp");
    {
        let mut f = File::create(&tmp_path)?;
        f.write_all(data)?;
        f.flush()?;
    }
    fs::rename(tmp_path, path)?;
    Ok(())
}

pub fn save_active(state: &AppStateFile) -> anyhow::Result<PathBuf> {
    ensure_autosave_dir()?;
    let pretty = PrettyConfig::new()
        .separate_tuple_members(true)
        .enumerate_arrays(true);
    let s = ron::ser::to_string_pretty(state, pretty)?;
    let path = active_state_path();
    atomic_write(&path, s.as_bytes())?;
    Ok(path)
}

pub fn load_active() -> anyhow::Result<Option<AppStateFile>> {
    let path = active_state_path();
    if !path.exists() {
        return Ok(None);
    }
    load_from_path(&path).map(Some)
}

pub fn load_from_path(path: &Path) -> anyhow::Result<AppStateFile> {
    let mut f = File::open(path)?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let state: AppStateFile = ron::from_str(&buf)?;
    Ok(state)
}

/// Remove the autosave file. Returns whether anything was deleted. Used by
/// the world-reset action after its confirmation dialog.
pub fn clear_active() -> anyhow::Result<bool> {
    let path = active_state_path();
    if path.exists() {
        fs::remove_file(path)?;
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Write a pretty-printed `{nodes, edges}` JSON backup named with the
/// current date, e.g. `chronicle_backup_2026-08-08.json`.
pub fn export_backup(store: &ChronicleStore) -> anyhow::Result<PathBuf> {
    let dir = settings().export_dir();
    fs::create_dir_all(&dir)?;
    let now = OffsetDateTime::now_utc();
    let fmt = format_description!("[year]-[month]-[day]");
    let stamp = now.format(fmt).unwrap_or_else(|_| "backup".to_string());
    let path = dir.join(format!("chronicle_backup_{}.json", stamp));
    let mut json = serde_json::to_string_pretty(store)?;
    json.push('\n');
    let mut f = File::create(&path)?;
    f.write_all(json.as_bytes())?;
    Ok(path)
}
