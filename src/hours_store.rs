// src/hours_store.rs
//
// External home of the business-hours configuration. The scheduling core
// only ever consumes the parsed, validated value; everything about where the
// blob lives is this collaborator's problem.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::warn;

use crate::schedule::hours::BusinessHoursConfig;

#[async_trait]
pub trait HoursStore: Send + Sync {
    /// The stored configuration, or None when nothing usable is stored.
    /// Callers still validate before activating it.
    async fn load(&self) -> Option<BusinessHoursConfig>;

    async fn save(&self, config: &BusinessHoursConfig) -> anyhow::Result<()>;
}

/// Keeps the configuration as a small JSON blob on disk.
pub struct FileHoursStore {
    path: PathBuf,
}

impl FileHoursStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl HoursStore for FileHoursStore {
    async fn load(&self) -> Option<BusinessHoursConfig> {
        let raw = tokio::fs::read_to_string(&self.path).await.ok()?;
        match serde_json::from_str::<BusinessHoursConfig>(&raw) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!(
                    "business hours file {} is not parseable: {e}",
                    self.path.display()
                );
                None
            }
        }
    }

    async fn save(&self, config: &BusinessHoursConfig) -> anyhow::Result<()> {
        let raw = serde_json::to_string_pretty(config)?;
        tokio::fs::write(&self.path, raw).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileHoursStore::new(dir.path().join("hours.json"));

        let config = BusinessHoursConfig {
            start_hour: 8,
            end_hour: 18,
            interval_minutes: 15,
        };
        store.save(&config).await.unwrap();

        assert_eq!(store.load().await, Some(config));
    }

    #[tokio::test]
    async fn missing_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileHoursStore::new(dir.path().join("absent.json"));

        assert_eq!(store.load().await, None);
    }

    #[tokio::test]
    async fn garbage_blob_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hours.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let store = FileHoursStore::new(path);
        assert_eq!(store.load().await, None);
    }

    #[tokio::test]
    async fn saved_blob_uses_wire_field_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hours.json");
        let store = FileHoursStore::new(&path);

        store.save(&BusinessHoursConfig::default()).await.unwrap();

        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["startHour"], 9);
        assert_eq!(json["endHour"], 17);
        assert_eq!(json["intervalMinutes"], 30);
    }
}
