use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::api::models::DataDragonChampions;
use crate::error::AppError;

/// Champion id to display name, as published by Data Dragon for one patch.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChampionCatalog {
    pub version: String,
    pub fetched_at: DateTime<Utc>,
    names: HashMap<i64, String>,
}

impl ChampionCatalog {
    pub fn new(version: &str, fetched_at: DateTime<Utc>) -> Self {
        ChampionCatalog {
            version: version.to_string(),
            fetched_at,
            names: HashMap::new(),
        }
    }

    pub fn from_data_dragon(data: DataDragonChampions, fetched_at: DateTime<Utc>) -> Self {
        let mut catalog = ChampionCatalog::new(&data.version, fetched_at);
        for champion in data.data.into_values() {
            match champion.key.parse::<i64>() {
                Ok(key) => catalog.insert(key, champion.name),
                Err(_) => debug!(
                    champion = %champion.id,
                    key = %champion.key,
                    "Skipping champion with non-numeric key"
                ),
            }
        }
        catalog
    }

    pub fn insert(&mut self, key: i64, name: String) {
        self.names.insert(key, name);
    }

    pub fn name_for(&self, key: i64) -> Option<&str> {
        self.names.get(&key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn is_stale(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.fetched_at) > max_age
    }

    pub fn get_cache_path() -> PathBuf {
        let cache_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".clash_scout");

        cache_dir.join("champions.json")
    }

    /// Returns `None` when nothing has been cached yet.
    pub fn load() -> Result<Option<Self>, AppError> {
        Self::load_from(&Self::get_cache_path())
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, AppError> {
        match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).map(Some).map_err(|e| {
                AppError::CacheError(format!("Failed to parse champion cache: {}", e))
            }),
            Err(_) => Ok(None),
        }
    }

    pub fn save(&self) -> Result<(), AppError> {
        self.save_to(&Self::get_cache_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), AppError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| {
                AppError::CacheError(format!("Failed to create cache directory: {}", e))
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            AppError::CacheError(format!("Failed to serialize champion cache: {}", e))
        })?;

        fs::write(path, json)
            .map_err(|e| AppError::CacheError(format!("Failed to write champion cache: {}", e)))?;

        Ok(())
    }
}
