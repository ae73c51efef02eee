pub mod achievements;
pub mod notifier;
pub mod pagination;
pub mod settings;
pub mod store;
pub mod transfer;

pub use achievements::{
    run_push_listener, AchievementQueue, AlreadyShownRepository, FileShownRepository,
    MemoryShownRepository, QueueEvent,
};
pub use notifier::{
    forward_store_events, DesktopNotifier, FocusCallback, NotificationDispatcher, PermissionState,
    ToastSink, ToneGenerator, ToneSpec,
};
pub use pagination::{FeedStatus, Paginator};
pub use settings::SettingsStore;
pub use store::{ConversationFilter, ConversationStore, StoreEvent};
pub use transfer::TransferProtocol;
