use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::error::{AtendeError, AtendeResult};
use crate::models::SoundKind;

use super::settings::SettingsStore;
use super::store::StoreEvent;

/// Invoked when the user clicks a desktop notification, to focus the app.
pub type FocusCallback = Box<dyn Fn() + Send + Sync>;

/// Frequency/envelope parameters for one synthesized alert tone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneSpec {
    pub frequency_hz: f32,
    pub duration_ms: u64,
    pub attack_ms: u64,
    pub release_ms: u64,
}

impl ToneSpec {
    pub fn for_sound(kind: SoundKind) -> Self {
        match kind {
            SoundKind::Ping => Self {
                frequency_hz: 880.0,
                duration_ms: 150,
                attack_ms: 5,
                release_ms: 120,
            },
            SoundKind::Pop => Self {
                frequency_hz: 440.0,
                duration_ms: 80,
                attack_ms: 2,
                release_ms: 40,
            },
            SoundKind::Bell => Self {
                frequency_hz: 1320.0,
                duration_ms: 400,
                attack_ms: 10,
                release_ms: 350,
            },
            SoundKind::Tap => Self {
                frequency_hz: 220.0,
                duration_ms: 60,
                attack_ms: 1,
                release_ms: 30,
            },
        }
    }
}

/// Platform audio seam. Implementations turn a [`ToneSpec`] into an actual
/// tone; tests use a recording fake.
#[async_trait]
pub trait ToneGenerator: Send + Sync {
    async fn play(&self, spec: &ToneSpec) -> AtendeResult<()>;
}

/// In-app toast seam.
#[async_trait]
pub trait ToastSink: Send + Sync {
    async fn show(&self, title: &str, body: &str);
}

/// OS-level notification seam. The sink owns auto-dismissal and click
/// handling; `is_focused` reports whether the app window currently has
/// focus.
#[async_trait]
pub trait DesktopNotifier: Send + Sync {
    async fn request_permission(&self) -> bool;

    fn is_focused(&self) -> bool;

    async fn show(&self, title: &str, body: &str, on_click: FocusCallback) -> AtendeResult<()>;
}

/// Cached outcome of the one-time desktop permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Unrequested,
    Granted,
    Denied,
}

/// Composes the three notification channels, each gated by its own settings
/// flag. Desktop permission is requested once at first use and cached for
/// the process lifetime; a denial disables that channel without re-prompting.
pub struct NotificationDispatcher {
    settings: Arc<SettingsStore>,
    tone: Arc<dyn ToneGenerator>,
    toast: Arc<dyn ToastSink>,
    desktop: Arc<dyn DesktopNotifier>,
    permission: Mutex<PermissionState>,
    sound_disabled: AtomicBool,
}

impl NotificationDispatcher {
    pub fn new(
        settings: Arc<SettingsStore>,
        tone: Arc<dyn ToneGenerator>,
        toast: Arc<dyn ToastSink>,
        desktop: Arc<dyn DesktopNotifier>,
    ) -> Self {
        Self {
            settings,
            tone,
            toast,
            desktop,
            permission: Mutex::new(PermissionState::Unrequested),
            sound_disabled: AtomicBool::new(false),
        }
    }

    /// Deliver a new-message notification through every enabled channel.
    /// Channel failures degrade that channel only; the call never fails.
    pub async fn notify_new_message(
        &self,
        subject_name: &str,
        content: &str,
        on_focus: FocusCallback,
    ) {
        let desktop_title = format!("Nova mensagem de {subject_name}");
        self.dispatch(subject_name, &desktop_title, content, on_focus)
            .await;
    }

    /// Notify the receiving attendant that a conversation was handed to
    /// them. The audit text already names both parties and the reason.
    pub async fn notify_transfer(
        &self,
        student_name: &str,
        audit_content: &str,
        on_focus: FocusCallback,
    ) {
        let desktop_title = format!("Atendimento de {student_name} transferido para você");
        self.dispatch(student_name, &desktop_title, audit_content, on_focus)
            .await;
    }

    async fn dispatch(
        &self,
        toast_title: &str,
        desktop_title: &str,
        content: &str,
        on_focus: FocusCallback,
    ) {
        let settings = self.settings.current().await;

        if settings.sound_enabled && !self.sound_disabled.load(Ordering::SeqCst) {
            let spec = ToneSpec::for_sound(settings.sound);
            if let Err(err) = self.tone.play(&spec).await {
                // Missing audio device: disable the channel for this
                // session, keep everything else flowing.
                err.log();
                self.sound_disabled.store(true, Ordering::SeqCst);
            }
        }

        if settings.visual_enabled {
            self.toast.show(toast_title, content).await;
        }

        if settings.browser_notifications {
            self.notify_desktop(desktop_title, content, on_focus).await;
        }
    }

    async fn notify_desktop(&self, title: &str, content: &str, on_focus: FocusCallback) {
        let mut permission = self.permission.lock().await;

        if *permission == PermissionState::Unrequested {
            *permission = if self.desktop.request_permission().await {
                info!("Desktop notification permission granted");
                PermissionState::Granted
            } else {
                AtendeError::NotificationPermissionDenied.log();
                PermissionState::Denied
            };
        }

        if *permission != PermissionState::Granted {
            return;
        }
        drop(permission);

        // Only interrupt at OS level while the app is in the background.
        if self.desktop.is_focused() {
            debug!("App focused; skipping desktop notification");
            return;
        }

        if let Err(err) = self.desktop.show(title, content, on_focus).await {
            warn!("Desktop notification failed: {err}");
        }
    }
}

/// Bridge store events into the dispatcher: every inbound student message
/// becomes a notification for the attendant side, and a transfer notifies
/// the receiving attendant unless they handed it to themselves.
pub async fn forward_store_events(
    mut events: broadcast::Receiver<StoreEvent>,
    dispatcher: Arc<NotificationDispatcher>,
) {
    loop {
        match events.recv().await {
            Ok(StoreEvent::StudentMessage {
                student_name,
                message,
                ..
            }) => {
                dispatcher
                    .notify_new_message(&student_name, &message.content, Box::new(|| {}))
                    .await;
            }
            Ok(StoreEvent::Transferred {
                from_attendant_id,
                to_attendant_id,
                student_name,
                audit,
                ..
            }) if from_attendant_id != to_attendant_id => {
                dispatcher
                    .notify_transfer(&student_name, &audit.content, Box::new(|| {}))
                    .await;
            }
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "Notification bridge lagged behind store events");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
