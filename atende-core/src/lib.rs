#![allow(clippy::type_complexity)]

pub mod config;
pub mod error;
pub mod models;
pub mod repo;
pub mod services;

pub use config::{
    ensure_config_dir, ensure_data_dir, get_config_dir, get_data_dir, init_logging, AtendeConfig,
    ConfigLoadError, LoggingConfig, SupportConfig,
};
pub use error::{AtendeError, AtendeResult};
pub use models::{
    AchievementEvent, AchievementKind, AchievementPush, Attendant, AttendantRole, Conversation,
    ConversationStatus, GoalPeriod, InternalNote, Message, MessageKind, NotificationSettings,
    SenderKind, SettingsUpdate, SoundKind, Student,
};
pub use repo::{
    AttendantRepository, ConversationRepository, MemoryAttendantRepository,
    MemoryConversationRepository, Page, PageRequest,
};
pub use services::{
    forward_store_events, run_push_listener, AchievementQueue, AlreadyShownRepository,
    ConversationFilter, ConversationStore, DesktopNotifier, FeedStatus, FileShownRepository,
    FocusCallback, MemoryShownRepository, NotificationDispatcher, Paginator, PermissionState,
    QueueEvent, SettingsStore, StoreEvent, ToastSink, ToneGenerator, ToneSpec, TransferProtocol,
};
