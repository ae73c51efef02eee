//! Error types for the Atende core library.
//!
//! This module provides a unified error handling system for all Atende
//! operations: conversation lifecycle, attendant transfers, notification
//! delivery and the achievement queue.
//!
//! # Error Codes Reference
//!
//! | Code Range | Category | Description |
//! |------------|----------|-------------|
//! | E1001-E1099 | Conversation | Conversation lookup and lifecycle errors |
//! | E2001-E2099 | Config | Config file, settings and validation errors |
//! | E3001-E3099 | Attendant | Attendant lookup and transfer errors |
//! | E4001-E4099 | Notification | Sound, toast and desktop channel errors |
//! | E5001-E5099 | Achievement | Achievement queue and push channel errors |
//! | E9001-E9099 | General | Internal, IO, serialization errors |

use thiserror::Error;
use tracing::{error, warn};

/// The main error type for the Atende core library.
#[derive(Debug, Error)]
pub enum AtendeError {
    // ========================================================================
    // Conversation Errors (E1001-E1099)
    // ========================================================================
    /// Conversation not found. Treated as a defect, never swallowed:
    /// every command operation takes an id the caller obtained from a view.
    #[error("[E1001] Conversation not found: {0}")]
    ConversationNotFound(uuid::Uuid),

    /// A page cursor did not parse or points past the end of the feed.
    #[error("[E1002] Invalid page cursor: {0}")]
    InvalidCursor(String),

    // ========================================================================
    // Configuration Errors (E2001-E2099)
    // ========================================================================
    /// Configuration file parse error
    #[error("[E2001] Failed to parse configuration: {0}")]
    ConfigParseError(String),

    /// Invalid configuration value
    #[error("[E2002] Invalid configuration value for '{key}': {message}")]
    InvalidConfigValue { key: String, message: String },

    /// Settings could not be persisted or reloaded
    #[error("[E2003] Settings storage failed: {0}")]
    SettingsStorageFailed(String),

    // ========================================================================
    // Attendant Errors (E3001-E3099)
    // ========================================================================
    /// Transfer target (or roster lookup) does not resolve to an attendant
    #[error("[E3001] Attendant not found: {0}")]
    AttendantNotFound(uuid::Uuid),

    // ========================================================================
    // Notification Errors (E4001-E4099)
    // ========================================================================
    /// Audio device missing or tone synthesis failed
    #[error("[E4001] Sound playback failed: {0}")]
    SoundPlaybackFailed(String),

    /// Desktop notification channel failed
    #[error("[E4002] Desktop notification failed: {0}")]
    DesktopNotificationFailed(String),

    /// Desktop notification permission was denied
    #[error("[E4003] Desktop notification permission denied")]
    NotificationPermissionDenied,

    // ========================================================================
    // Achievement Errors (E5001-E5099)
    // ========================================================================
    /// Shown-today set could not be read or written
    #[error("[E5001] Achievement dedup storage failed: {0}")]
    ShownStorageFailed(String),

    /// Push channel closed or disconnected
    #[error("[E5002] Push channel disconnected: {0}")]
    PushChannelDisconnected(String),

    // ========================================================================
    // General Errors (E9001-E9099)
    // ========================================================================
    /// Internal error (catch-all for unexpected conditions)
    #[error("[E9001] Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("[E9002] IO error: {0}")]
    IoError(String),

    /// Serialization/deserialization error
    #[error("[E9003] Serialization error: {0}")]
    SerializationError(String),
}

/// Result type alias for Atende operations.
pub type AtendeResult<T> = Result<T, AtendeError>;

impl From<std::io::Error> for AtendeError {
    fn from(err: std::io::Error) -> Self {
        AtendeError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for AtendeError {
    fn from(err: serde_json::Error) -> Self {
        AtendeError::SerializationError(err.to_string())
    }
}

impl From<config::ConfigError> for AtendeError {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::NotFound(key) => AtendeError::InvalidConfigValue {
                key,
                message: "Key not found".to_string(),
            },
            _ => AtendeError::ConfigParseError(err.to_string()),
        }
    }
}

impl AtendeError {
    /// Returns true if this error is related to conversation operations.
    pub fn is_conversation_error(&self) -> bool {
        matches!(
            self,
            AtendeError::ConversationNotFound(_) | AtendeError::InvalidCursor(_)
        )
    }

    /// Returns true if this error is related to configuration or settings.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            AtendeError::ConfigParseError(_)
                | AtendeError::InvalidConfigValue { .. }
                | AtendeError::SettingsStorageFailed(_)
        )
    }

    /// Returns true if this error is related to notification delivery.
    pub fn is_notification_error(&self) -> bool {
        matches!(
            self,
            AtendeError::SoundPlaybackFailed(_)
                | AtendeError::DesktopNotificationFailed(_)
                | AtendeError::NotificationPermissionDenied
        )
    }

    /// Returns true if only a single feature should be disabled in response,
    /// leaving the conversation flow itself intact.
    pub fn is_degradable(&self) -> bool {
        matches!(
            self,
            AtendeError::SoundPlaybackFailed(_)
                | AtendeError::DesktopNotificationFailed(_)
                | AtendeError::NotificationPermissionDenied
                | AtendeError::PushChannelDisconnected(_)
        )
    }

    /// Returns an error code suitable for logging or external reporting.
    pub fn error_code(&self) -> &'static str {
        match self {
            AtendeError::ConversationNotFound(_) => "E1001",
            AtendeError::InvalidCursor(_) => "E1002",
            AtendeError::ConfigParseError(_) => "E2001",
            AtendeError::InvalidConfigValue { .. } => "E2002",
            AtendeError::SettingsStorageFailed(_) => "E2003",
            AtendeError::AttendantNotFound(_) => "E3001",
            AtendeError::SoundPlaybackFailed(_) => "E4001",
            AtendeError::DesktopNotificationFailed(_) => "E4002",
            AtendeError::NotificationPermissionDenied => "E4003",
            AtendeError::ShownStorageFailed(_) => "E5001",
            AtendeError::PushChannelDisconnected(_) => "E5002",
            AtendeError::Internal(_) => "E9001",
            AtendeError::IoError(_) => "E9002",
            AtendeError::SerializationError(_) => "E9003",
        }
    }

    /// Returns a user-friendly suggestion for how to resolve this error.
    pub fn user_suggestion(&self) -> Option<&'static str> {
        match self {
            AtendeError::AttendantNotFound(_) => {
                Some("Selecione um atendente válido antes de transferir")
            }
            AtendeError::SoundPlaybackFailed(_) => {
                Some("Verifique o dispositivo de áudio; o aviso sonoro foi desativado")
            }
            AtendeError::NotificationPermissionDenied => {
                Some("Ative as notificações do navegador nas preferências do sistema")
            }
            AtendeError::PushChannelDisconnected(_) => {
                Some("Conexão em tempo real perdida; os avisos voltam ao reconectar")
            }
            _ => None,
        }
    }

    /// Log this error with appropriate severity level.
    pub fn log(&self) {
        let code = self.error_code();
        let suggestion = self.user_suggestion();

        if self.is_degradable() {
            warn!(
                error_code = %code,
                suggestion = suggestion,
                "Degradable error occurred: {}",
                self
            );
        } else {
            error!(
                error_code = %code,
                suggestion = suggestion,
                "Error occurred: {}",
                self
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_display() {
        let id = Uuid::new_v4();
        let err = AtendeError::ConversationNotFound(id);
        assert!(err.to_string().contains("E1001"));
        assert!(err.to_string().contains(&id.to_string()));

        let err = AtendeError::InvalidConfigValue {
            key: "logging.level".to_string(),
            message: "unknown level".to_string(),
        };
        assert!(err.to_string().contains("E2002"));
        assert!(err.to_string().contains("logging.level"));
    }

    #[test]
    fn test_error_categorization() {
        let conv_err = AtendeError::ConversationNotFound(Uuid::new_v4());
        assert!(conv_err.is_conversation_error());
        assert!(!conv_err.is_config_error());
        assert!(!conv_err.is_notification_error());

        let config_err = AtendeError::ConfigParseError("bad toml".to_string());
        assert!(config_err.is_config_error());

        let sound_err = AtendeError::SoundPlaybackFailed("no device".to_string());
        assert!(sound_err.is_notification_error());
    }

    #[test]
    fn test_is_degradable() {
        assert!(AtendeError::SoundPlaybackFailed("no device".to_string()).is_degradable());
        assert!(AtendeError::NotificationPermissionDenied.is_degradable());
        assert!(AtendeError::PushChannelDisconnected("closed".to_string()).is_degradable());

        assert!(!AtendeError::ConversationNotFound(Uuid::new_v4()).is_degradable());
        assert!(!AtendeError::Internal("bug".to_string()).is_degradable());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AtendeError::ConversationNotFound(Uuid::nil()).error_code(),
            "E1001"
        );
        assert_eq!(
            AtendeError::AttendantNotFound(Uuid::nil()).error_code(),
            "E3001"
        );
        assert_eq!(AtendeError::NotificationPermissionDenied.error_code(), "E4003");
        assert_eq!(
            AtendeError::Internal("err".to_string()).error_code(),
            "E9001"
        );
    }

    #[test]
    fn test_user_suggestions() {
        assert!(AtendeError::AttendantNotFound(Uuid::nil())
            .user_suggestion()
            .is_some());
        assert!(AtendeError::Internal("err".to_string())
            .user_suggestion()
            .is_none());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: AtendeError = io_err.into();
        assert!(matches!(err, AtendeError::IoError(_)));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_result: Result<serde_json::Value, _> = serde_json::from_str("not json");
        let err: AtendeError = json_result.unwrap_err().into();
        assert!(matches!(err, AtendeError::SerializationError(_)));
    }
}
