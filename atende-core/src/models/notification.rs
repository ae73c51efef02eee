use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundKind {
    Ping,
    Pop,
    Bell,
    Tap,
}

impl std::fmt::Display for SoundKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SoundKind::Ping => write!(f, "ping"),
            SoundKind::Pop => write!(f, "pop"),
            SoundKind::Bell => write!(f, "bell"),
            SoundKind::Tap => write!(f, "tap"),
        }
    }
}

/// Process-wide notification preferences. Persisted across sessions and
/// mutated only through an explicit settings update (see
/// `services::SettingsStore`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationSettings {
    #[serde(default = "default_true")]
    pub sound_enabled: bool,

    #[serde(default = "default_true")]
    pub visual_enabled: bool,

    #[serde(default = "default_sound")]
    pub sound: SoundKind,

    #[serde(default)]
    pub browser_notifications: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            visual_enabled: true,
            sound: SoundKind::Ping,
            browser_notifications: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_sound() -> SoundKind {
    SoundKind::Ping
}

/// Partial settings update; `None` fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub sound_enabled: Option<bool>,
    pub visual_enabled: Option<bool>,
    pub sound: Option<SoundKind>,
    pub browser_notifications: Option<bool>,
}

impl NotificationSettings {
    pub fn merge(&mut self, update: SettingsUpdate) {
        if let Some(sound_enabled) = update.sound_enabled {
            self.sound_enabled = sound_enabled;
        }
        if let Some(visual_enabled) = update.visual_enabled {
            self.visual_enabled = visual_enabled;
        }
        if let Some(sound) = update.sound {
            self.sound = sound;
        }
        if let Some(browser_notifications) = update.browser_notifications {
            self.browser_notifications = browser_notifications;
        }
    }
}
