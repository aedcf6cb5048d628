//! Save/load of the game snapshot.
//!
//! ## Versioning
//!
//! - `SAVE_VERSION`: current snapshot format. Bump when fields are added.
//! - `MIN_COMPATIBLE_VERSION`: oldest format that can still be read. Only
//!   bump it for breaking changes (a field changes meaning or is removed).
//!
//! Snapshots written by the first browser build carry no `version` and use
//! different field names (`money`, `count`, `bodyLevel`, …). They are read as
//! version 1 through serde aliases. Missing fields fall back to the initial
//! game values, so a partial snapshot is still a valid snapshot. So do fields
//! that are `null` or of the wrong type: `JSON.stringify` writes `NaN` and
//! `Infinity` as `null`, and one bad number must not cost the whole save.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use super::state::{GameState, UPGRADE_DEFS};

/// Snapshot format version. Increment when adding fields.
pub const SAVE_VERSION: u32 = 2;

/// Oldest readable version. Increment only for breaking changes.
pub const MIN_COMPATIBLE_VERSION: u32 = 1;

/// Key of the snapshot in the key-value store.
pub const STORAGE_KEY: &str = "nightCityHustlerSave";

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("snapshot is not valid JSON for this game: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("storage rejected the write: {0}")]
    Storage(String),
    #[error("save version {saved} is older than the oldest readable version {min}")]
    Incompatible { saved: u32, min: u32 },
}

fn legacy_version() -> u32 {
    1
}

/// Read a field as `T`, or `fallback()` if it holds something else.
fn read_or<'de, D, T>(deserializer: D, fallback: impl FnOnce() -> T) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_else(|_| fallback()))
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    read_or(deserializer, T::default)
}

fn lenient_level<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    read_or(deserializer, initial_level)
}

fn lenient_version<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    read_or(deserializer, legacy_version)
}

fn lenient_click_power<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    read_or(deserializer, || 1.0)
}

/// Keep the string entries of an id list and drop everything else.
fn lenient_ids<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value
        .as_array()
        .map(|ids| {
            ids.iter()
                .filter_map(|id| id.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default())
}

/// Keep the readable records of a list and drop everything else.
fn lenient_records<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<UpgradeRecord>, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value
        .as_array()
        .map(|records| {
            records
                .iter()
                .filter_map(|r| UpgradeRecord::deserialize(r).ok())
                .collect()
        })
        .unwrap_or_default())
}

/// One upgrade's progress, matched to `UPGRADE_DEFS` by id on load.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeRecord {
    pub id: String,
    #[serde(default, alias = "count", deserialize_with = "lenient")]
    pub purchase_count: u32,
    #[serde(default, alias = "lastAffordable", deserialize_with = "lenient")]
    pub was_affordable_last_check: bool,
}

fn initial_level() -> u32 {
    1
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SkillLevels {
    #[serde(default = "initial_level", alias = "bodyLevel", deserialize_with = "lenient_level")]
    pub body: u32,
    #[serde(default = "initial_level", alias = "reflexesLevel", deserialize_with = "lenient_level")]
    pub reflexes: u32,
    #[serde(default = "initial_level", alias = "technicalLevel", deserialize_with = "lenient_level")]
    pub technical: u32,
    #[serde(default = "initial_level", alias = "intelligenceLevel", deserialize_with = "lenient_level")]
    pub intelligence: u32,
    #[serde(default = "initial_level", alias = "coolLevel", deserialize_with = "lenient_level")]
    pub cool: u32,
}

impl Default for SkillLevels {
    fn default() -> Self {
        Self {
            body: 1,
            reflexes: 1,
            technical: 1,
            intelligence: 1,
            cool: 1,
        }
    }
}

impl SkillLevels {
    fn to_array(&self) -> [u32; 5] {
        [
            self.body,
            self.reflexes,
            self.technical,
            self.intelligence,
            self.cool,
        ]
    }

    fn from_array(levels: [u32; 5]) -> Self {
        let [body, reflexes, technical, intelligence, cool] = levels;
        Self {
            body,
            reflexes,
            technical,
            intelligence,
            cool,
        }
    }
}

/// Everything needed to reconstruct the game. UI state (tab, toasts,
/// floating texts, log) is not part of it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SaveSnapshot {
    #[serde(default = "legacy_version", deserialize_with = "lenient_version")]
    pub version: u32,
    #[serde(alias = "money", deserialize_with = "lenient")]
    pub currency: f64,
    #[serde(deserialize_with = "lenient_click_power")]
    pub click_power: f64,
    #[serde(alias = "passiveIncome", deserialize_with = "lenient")]
    pub passive_income_rate: f64,
    #[serde(deserialize_with = "lenient_records")]
    pub upgrades: Vec<UpgradeRecord>,
    #[serde(deserialize_with = "lenient")]
    pub skills: SkillLevels,
    /// Wall-clock ms of the last passive accrual.
    #[serde(alias = "lastUpdate", deserialize_with = "lenient")]
    pub last_update_timestamp: f64,
    #[serde(alias = "unlockedAchievements", deserialize_with = "lenient_ids")]
    pub unlocked_achievement_ids: Vec<String>,
}

impl Default for SaveSnapshot {
    /// The initial game, except `last_update_timestamp` which is 0 (unknown).
    fn default() -> Self {
        Self {
            version: legacy_version(),
            currency: 0.0,
            click_power: 1.0,
            passive_income_rate: 0.0,
            upgrades: Vec::new(),
            skills: SkillLevels::default(),
            last_update_timestamp: 0.0,
            unlocked_achievement_ids: Vec::new(),
        }
    }
}

/// Extract the persistent part of the state.
pub fn snapshot(state: &GameState) -> SaveSnapshot {
    SaveSnapshot {
        version: SAVE_VERSION,
        currency: state.economy.currency,
        click_power: state.economy.click_power,
        passive_income_rate: state.economy.passive_income,
        upgrades: state
            .upgrades
            .iter()
            .map(|u| UpgradeRecord {
                id: u.def.id.to_string(),
                purchase_count: u.purchase_count,
                was_affordable_last_check: u.was_affordable,
            })
            .collect(),
        skills: SkillLevels::from_array(state.skill_levels),
        last_update_timestamp: state.last_update_ms,
        unlocked_achievement_ids: state.unlocked.iter().cloned().collect(),
    }
}

/// Replace `value` by `fallback` unless it is finite and at least `min`.
fn sanitize(value: f64, min: f64, fallback: f64) -> f64 {
    if value.is_finite() && value >= min {
        value
    } else {
        fallback
    }
}

/// Restore a snapshot into `state`.
///
/// Upgrades are re-merged against `UPGRADE_DEFS`: records with unknown ids are
/// dropped, definitions without a record keep zero purchases. Out-of-range
/// numbers fall back to the initial values. A zero timestamp (never written)
/// keeps the state's own `last_update_ms`.
pub fn apply_snapshot(snap: &SaveSnapshot, state: &mut GameState) {
    state.economy.currency = sanitize(snap.currency, 0.0, 0.0);
    state.economy.click_power = sanitize(snap.click_power, 1.0, 1.0);
    state.economy.passive_income = sanitize(snap.passive_income_rate, 0.0, 0.0);

    let records: HashMap<&str, &UpgradeRecord> =
        snap.upgrades.iter().map(|r| (r.id.as_str(), r)).collect();
    for (upgrade, def) in state.upgrades.iter_mut().zip(UPGRADE_DEFS.iter()) {
        match records.get(def.id) {
            Some(record) => {
                upgrade.purchase_count = record.purchase_count;
                upgrade.was_affordable = record.was_affordable_last_check;
            }
            None => {
                upgrade.purchase_count = 0;
                upgrade.was_affordable = false;
            }
        }
    }

    for (slot, level) in state
        .skill_levels
        .iter_mut()
        .zip(snap.skills.to_array())
    {
        *slot = level.max(1);
    }

    if snap.last_update_timestamp.is_finite() && snap.last_update_timestamp > 0.0 {
        state.last_update_ms = snap.last_update_timestamp;
    }

    state
        .unlocked
        .extend(snap.unlocked_achievement_ids.iter().cloned());
}

pub fn encode(snap: &SaveSnapshot) -> Result<String, SaveError> {
    serde_json::to_string(snap).map_err(SaveError::Serialize)
}

/// Parse and version-check a stored snapshot.
pub fn decode(json: &str) -> Result<SaveSnapshot, SaveError> {
    let snap: SaveSnapshot = serde_json::from_str(json).map_err(SaveError::Parse)?;
    if snap.version < MIN_COMPATIBLE_VERSION {
        return Err(SaveError::Incompatible {
            saved: snap.version,
            min: MIN_COMPATIBLE_VERSION,
        });
    }
    Ok(snap)
}

/// An opaque string key-value store.
pub trait SaveStore {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), SaveError>;
    fn remove(&mut self, key: &str);
}

/// In-memory store. Used off-wasm and in tests.
#[derive(Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl SaveStore for MemoryStore {
    fn read(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), SaveError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// The browser's `localStorage`.
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage;

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

#[cfg(target_arch = "wasm32")]
impl SaveStore for LocalStorage {
    fn read(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), SaveError> {
        let storage = Self::storage()
            .ok_or_else(|| SaveError::Storage("localStorage is unavailable".to_string()))?;
        storage
            .set_item(key, value)
            .map_err(|e| SaveError::Storage(format!("{e:?}")))
    }

    fn remove(&mut self, key: &str) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(key);
        }
    }
}

/// Write a snapshot. Failures are logged and otherwise ignored.
pub fn store_snapshot<S: SaveStore>(store: &mut S, snap: &SaveSnapshot) -> bool {
    let result = encode(snap).and_then(|json| store.write(STORAGE_KEY, &json));
    match result {
        Ok(()) => true,
        Err(e) => {
            crate::console::warn(&format!("save failed: {e}"));
            false
        }
    }
}

/// Read the stored snapshot, if any.
///
/// A snapshot that cannot be read is logged and deleted so the next session
/// starts clean instead of failing the same way again.
pub fn load_snapshot<S: SaveStore>(store: &mut S) -> Option<SaveSnapshot> {
    let json = store.read(STORAGE_KEY)?;
    match decode(&json) {
        Ok(snap) => {
            if snap.version < SAVE_VERSION {
                crate::console::log(&format!(
                    "migrating save data (saved={}, current={})",
                    snap.version, SAVE_VERSION
                ));
            }
            Some(snap)
        }
        Err(e) => {
            crate::console::warn(&format!("discarding save data: {e}"));
            store.remove(STORAGE_KEY);
            None
        }
    }
}
