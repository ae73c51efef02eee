pub mod achievement;
pub mod attendant;
pub mod conversation;
pub mod notification;

pub use achievement::{AchievementEvent, AchievementKind, AchievementPush, GoalPeriod};
pub use attendant::{Attendant, AttendantRole};
pub use conversation::{
    Conversation, ConversationStatus, InternalNote, Message, MessageKind, SenderKind, Student,
};
pub use notification::{NotificationSettings, SettingsUpdate, SoundKind};
