use std::path::PathBuf;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::ensure_data_dir;
use crate::error::{AtendeError, AtendeResult};
use crate::models::{NotificationSettings, SettingsUpdate};

const SETTINGS_FILE: &str = "notification_settings.json";

/// Process-wide notification preferences, readable anywhere and writable
/// only through [`update`], which merges a partial update and persists the
/// result.
///
/// [`update`]: SettingsStore::update
pub struct SettingsStore {
    settings: RwLock<NotificationSettings>,
    path: Option<PathBuf>,
}

impl SettingsStore {
    /// Volatile store, for tests and embedded use.
    pub fn in_memory(settings: NotificationSettings) -> Self {
        Self {
            settings: RwLock::new(settings),
            path: None,
        }
    }

    /// Store backed by a JSON file at an explicit path. Missing or corrupt
    /// files fall back to defaults.
    pub fn at_path(path: PathBuf) -> Self {
        let settings = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(settings) => settings,
                Err(err) => {
                    warn!("Corrupt settings file, using defaults: {err}");
                    NotificationSettings::default()
                }
            },
            Err(_) => NotificationSettings::default(),
        };

        Self {
            settings: RwLock::new(settings),
            path: Some(path),
        }
    }

    /// Store backed by the platform data directory.
    pub fn open() -> AtendeResult<Self> {
        let dir = ensure_data_dir()?;
        Ok(Self::at_path(dir.join(SETTINGS_FILE)))
    }

    pub async fn current(&self) -> NotificationSettings {
        self.settings.read().await.clone()
    }

    /// Merge a partial update into the current settings and persist. The
    /// merged value is written to disk first; a write failure leaves the
    /// in-memory settings untouched so memory and disk never diverge.
    pub async fn update(&self, update: SettingsUpdate) -> AtendeResult<NotificationSettings> {
        let mut settings = self.settings.write().await;
        let mut merged = settings.clone();
        merged.merge(update);

        if let Some(ref path) = self.path {
            let raw = serde_json::to_string_pretty(&merged)?;
            std::fs::write(path, raw)
                .map_err(|err| AtendeError::SettingsStorageFailed(err.to_string()))?;
            debug!(path = %path.display(), "Notification settings persisted");
        }

        *settings = merged.clone();
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SoundKind;

    #[tokio::test]
    async fn test_in_memory_update() {
        let store = SettingsStore::in_memory(NotificationSettings::default());

        let updated = store
            .update(SettingsUpdate {
                sound: Some(SoundKind::Tap),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.sound, SoundKind::Tap);
        assert_eq!(store.current().await.sound, SoundKind::Tap);
    }

    #[tokio::test]
    async fn test_persists_across_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);

        let store = SettingsStore::at_path(path.clone());
        store
            .update(SettingsUpdate {
                browser_notifications: Some(true),
                visual_enabled: Some(false),
                ..Default::default()
            })
            .await
            .unwrap();

        let reloaded = SettingsStore::at_path(path);
        let settings = reloaded.current().await;
        assert!(settings.browser_notifications);
        assert!(!settings.visual_enabled);
        // untouched fields keep their defaults
        assert!(settings.sound_enabled);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_memory_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        // The path is a directory, so the write must fail.
        let store = SettingsStore::at_path(dir.path().to_path_buf());

        let err = store
            .update(SettingsUpdate {
                sound_enabled: Some(false),
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AtendeError::SettingsStorageFailed(_)));
        assert_eq!(store.current().await, NotificationSettings::default());
    }

    #[tokio::test]
    async fn test_corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, "{not json").unwrap();

        let store = SettingsStore::at_path(path);
        assert_eq!(store.current().await, NotificationSettings::default());
    }

    #[tokio::test]
    async fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::at_path(dir.path().join("nope.json"));
        assert_eq!(store.current().await, NotificationSettings::default());
    }
}
