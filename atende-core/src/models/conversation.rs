use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStatus {
    Novo,
    EmAndamento,
    Finalizado,
}

impl std::fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConversationStatus::Novo => write!(f, "novo"),
            ConversationStatus::EmAndamento => write!(f, "em_andamento"),
            ConversationStatus::Finalizado => write!(f, "finalizado"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderKind {
    Student,
    Attendant,
    System,
}

impl std::fmt::Display for SenderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SenderKind::Student => write!(f, "student"),
            SenderKind::Attendant => write!(f, "attendant"),
            SenderKind::System => write!(f, "system"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Text,
    System,
    Media,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub sender: SenderKind,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub kind: MessageKind,
    pub read: bool,
}

impl Message {
    pub fn text(sender_id: Uuid, sender_name: impl Into<String>, sender: SenderKind, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender_id,
            sender_name: sender_name.into(),
            sender,
            content: content.into(),
            timestamp: Utc::now(),
            kind: MessageKind::Text,
            read: false,
        }
    }

    /// System messages carry no human author; they are synthesized by the
    /// store itself (transfer audits and the like).
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender_id: Uuid::nil(),
            sender_name: "Sistema".to_string(),
            sender: SenderKind::System,
            content: content.into(),
            timestamp: Utc::now(),
            kind: MessageKind::System,
            read: true,
        }
    }

    pub fn is_system(&self) -> bool {
        self.sender == SenderKind::System
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InternalNote {
    pub id: Uuid,
    pub content: String,
    pub author_id: Uuid,
    pub author_name: String,
    pub timestamp: DateTime<Utc>,
}

impl InternalNote {
    pub fn new(content: impl Into<String>, author_id: Uuid, author_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            author_id,
            author_name: author_name.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub course: String,
}

impl Student {
    pub fn new(name: impl Into<String>, email: impl Into<String>, course: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            course: course.into(),
        }
    }
}

/// A single student-support thread. Owns its messages and internal notes;
/// the attendant is referenced by id only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub student: Student,
    pub attendant_id: Option<Uuid>,
    pub status: ConversationStatus,
    pub messages: Vec<Message>,
    pub notes: Vec<InternalNote>,
    pub unread_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub has_new_message: bool,
}

impl Conversation {
    pub fn new(student: Student) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            student,
            attendant_id: None,
            status: ConversationStatus::Novo,
            messages: Vec::new(),
            notes: Vec::new(),
            unread_count: 0,
            created_at: now,
            updated_at: now,
            has_new_message: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status != ConversationStatus::Finalizado
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Messages and notes are appended in invocation order; `updated_at`
    /// tracks the most recent append.
    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
        self.updated_at = Utc::now();
    }

    pub fn push_note(&mut self, note: InternalNote) {
        self.notes.push(note);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        assert_eq!(ConversationStatus::Novo.to_string(), "novo");
        assert_eq!(ConversationStatus::EmAndamento.to_string(), "em_andamento");
        assert_eq!(ConversationStatus::Finalizado.to_string(), "finalizado");
    }

    #[test]
    fn test_status_serde_wire_values() {
        let json = serde_json::to_string(&ConversationStatus::EmAndamento).unwrap();
        assert_eq!(json, "\"em_andamento\"");

        let back: ConversationStatus = serde_json::from_str("\"finalizado\"").unwrap();
        assert_eq!(back, ConversationStatus::Finalizado);
    }

    #[test]
    fn test_new_conversation_defaults() {
        let conversation = Conversation::new(Student::new("Ana", "ana@edu.br", "Direito"));

        assert_eq!(conversation.status, ConversationStatus::Novo);
        assert!(conversation.attendant_id.is_none());
        assert!(conversation.messages.is_empty());
        assert!(conversation.notes.is_empty());
        assert_eq!(conversation.unread_count, 0);
        assert!(!conversation.has_new_message);
    }

    #[test]
    fn test_system_message() {
        let message = Message::system("transferido");

        assert!(message.is_system());
        assert_eq!(message.kind, MessageKind::System);
        assert_eq!(message.sender_id, Uuid::nil());
        assert!(message.read);
    }

    #[test]
    fn test_push_message_bumps_updated_at() {
        let mut conversation = Conversation::new(Student::new("Ana", "ana@edu.br", "Direito"));
        let before = conversation.updated_at;

        conversation.push_message(Message::text(
            Uuid::new_v4(),
            "Ana",
            SenderKind::Student,
            "oi",
        ));

        assert_eq!(conversation.messages.len(), 1);
        assert!(conversation.updated_at >= before);
    }

    #[test]
    fn test_notes_do_not_touch_updated_at_ordering() {
        let mut conversation = Conversation::new(Student::new("Ana", "ana@edu.br", "Direito"));
        conversation.push_note(InternalNote::new("aluna ligou", Uuid::new_v4(), "Carlos"));

        assert_eq!(conversation.notes.len(), 1);
        assert!(conversation.messages.is_empty());
    }

    #[test]
    fn test_is_open() {
        let mut conversation = Conversation::new(Student::new("Ana", "ana@edu.br", "Direito"));
        assert!(conversation.is_open());

        conversation.status = ConversationStatus::Finalizado;
        assert!(!conversation.is_open());
    }
}
