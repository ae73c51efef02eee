use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{AtendeError, AtendeResult};
use crate::models::{
    Attendant, Conversation, ConversationStatus, InternalNote, Message, SenderKind,
};
use crate::repo::{AttendantRepository, ConversationRepository};

use super::transfer::TransferProtocol;

/// Events fanned out to subscribers (views, the notification bridge) after
/// every successful mutation.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    MessageSent {
        conversation_id: Uuid,
        message: Message,
    },
    StudentMessage {
        conversation_id: Uuid,
        student_name: String,
        message: Message,
    },
    NoteSaved {
        conversation_id: Uuid,
        note: InternalNote,
    },
    StatusChanged {
        conversation_id: Uuid,
        status: ConversationStatus,
    },
    Transferred {
        conversation_id: Uuid,
        from_attendant_id: Uuid,
        to_attendant_id: Uuid,
        student_name: String,
        audit: Message,
    },
}

/// Pure projection over the conversation set. Builder-style, matching is
/// side-effect free.
#[derive(Debug, Clone, Default)]
pub struct ConversationFilter {
    pub course: Option<String>,
    pub status: Option<ConversationStatus>,
    pub attendant_name: Option<String>,
}

impl ConversationFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_course(mut self, course: impl Into<String>) -> Self {
        self.course = Some(course.into());
        self
    }

    pub fn with_status(mut self, status: ConversationStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_attendant_name(mut self, name: impl Into<String>) -> Self {
        self.attendant_name = Some(name.into());
        self
    }

    fn matches(&self, conversation: &Conversation, attendant_name: Option<&str>) -> bool {
        if let Some(ref course) = self.course {
            if !conversation.student.course.eq_ignore_ascii_case(course) {
                return false;
            }
        }

        if let Some(status) = self.status {
            if conversation.status != status {
                return false;
            }
        }

        if let Some(ref wanted) = self.attendant_name {
            match attendant_name {
                Some(name) => {
                    if !name.to_lowercase().contains(&wanted.to_lowercase()) {
                        return false;
                    }
                }
                None => return false,
            }
        }

        true
    }
}

/// Owns conversation lifecycle: messaging on both channels, status edits,
/// transfers and filtered views. Writes are serialized per conversation id
/// so concurrent clients keep the at-most-one-writer invariant.
pub struct ConversationStore {
    conversations: Arc<dyn ConversationRepository>,
    attendants: Arc<dyn AttendantRepository>,
    transfer_protocol: TransferProtocol,
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
    events: broadcast::Sender<StoreEvent>,
}

impl ConversationStore {
    pub fn new(
        conversations: Arc<dyn ConversationRepository>,
        attendants: Arc<dyn AttendantRepository>,
    ) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            conversations,
            attendants: attendants.clone(),
            transfer_protocol: TransferProtocol::new(attendants),
            locks: Mutex::new(HashMap::new()),
            events,
        }
    }

    /// Subscribe to store mutations.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    async fn write_lock(&self, conversation_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        // A strong count of 1 means nobody holds or awaits this lock
        // anymore; dropping those entries keeps the map bounded by the
        // number of writes actually in flight.
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks
            .entry(conversation_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn load(&self, conversation_id: Uuid) -> AtendeResult<Conversation> {
        self.conversations
            .get(conversation_id)
            .await?
            .ok_or(AtendeError::ConversationNotFound(conversation_id))
    }

    fn emit(&self, event: StoreEvent) {
        // No receivers is fine; views come and go.
        let _ = self.events.send(event);
    }

    /// Append a student-visible message authored by an attendant.
    ///
    /// Empty content (after trimming) is a silent no-op, mirroring the
    /// input-layer contract. A first response moves a novo conversation to
    /// em_andamento and claims it for the author. Returns the appended
    /// message, or `None` for the no-op case.
    pub async fn send_message(
        &self,
        conversation_id: Uuid,
        content: &str,
        author: &Attendant,
    ) -> AtendeResult<Option<Message>> {
        let content = content.trim();
        if content.is_empty() {
            debug!(%conversation_id, "Ignoring empty message");
            return Ok(None);
        }

        let lock = self.write_lock(conversation_id).await;
        let _guard = lock.lock().await;

        let mut conversation = self.load(conversation_id).await?;

        let message = Message::text(author.id, author.name.clone(), SenderKind::Attendant, content);
        conversation.push_message(message.clone());

        if conversation.status == ConversationStatus::Novo {
            conversation.status = ConversationStatus::EmAndamento;
        }
        if conversation.attendant_id.is_none() {
            conversation.attendant_id = Some(author.id);
        }
        conversation.has_new_message = false;

        self.conversations.put(conversation).await?;

        self.emit(StoreEvent::MessageSent {
            conversation_id,
            message: message.clone(),
        });

        Ok(Some(message))
    }

    /// Inbound path: a message from the student. Bumps the unread counter
    /// and raises the new-message flag that feeds notification delivery.
    pub async fn record_student_message(
        &self,
        conversation_id: Uuid,
        content: &str,
    ) -> AtendeResult<Message> {
        let lock = self.write_lock(conversation_id).await;
        let _guard = lock.lock().await;

        let mut conversation = self.load(conversation_id).await?;

        let message = Message::text(
            conversation.student.id,
            conversation.student.name.clone(),
            SenderKind::Student,
            content,
        );
        conversation.push_message(message.clone());
        conversation.unread_count += 1;
        conversation.has_new_message = true;

        let student_name = conversation.student.name.clone();
        self.conversations.put(conversation).await?;

        self.emit(StoreEvent::StudentMessage {
            conversation_id,
            student_name,
            message: message.clone(),
        });

        Ok(message)
    }

    /// Append an attendant-only note. Never touches status, unread_count or
    /// has_new_message; the student never sees it.
    pub async fn save_internal_note(
        &self,
        conversation_id: Uuid,
        content: &str,
        author: &Attendant,
    ) -> AtendeResult<Option<InternalNote>> {
        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }

        let lock = self.write_lock(conversation_id).await;
        let _guard = lock.lock().await;

        let mut conversation = self.load(conversation_id).await?;
        let note = InternalNote::new(content, author.id, author.name.clone());
        conversation.push_note(note.clone());
        self.conversations.put(conversation).await?;

        self.emit(StoreEvent::NoteSaved {
            conversation_id,
            note: note.clone(),
        });

        Ok(Some(note))
    }

    /// Unconditional status overwrite. Any state to any state: the manual
    /// edit is what reopens a finalized conversation.
    pub async fn update_status(
        &self,
        conversation_id: Uuid,
        status: ConversationStatus,
    ) -> AtendeResult<()> {
        let lock = self.write_lock(conversation_id).await;
        let _guard = lock.lock().await;

        let mut conversation = self.load(conversation_id).await?;
        conversation.status = status;
        conversation.updated_at = Utc::now();
        self.conversations.put(conversation).await?;

        info!(%conversation_id, %status, "Status updated");
        self.emit(StoreEvent::StatusChanged {
            conversation_id,
            status,
        });

        Ok(())
    }

    /// Hand the conversation to another attendant (see
    /// [`TransferProtocol`]). Rejects unknown targets.
    pub async fn transfer(
        &self,
        conversation_id: Uuid,
        from_attendant_id: Uuid,
        to_attendant_id: Uuid,
        reason: Option<&str>,
    ) -> AtendeResult<Message> {
        let lock = self.write_lock(conversation_id).await;
        let _guard = lock.lock().await;

        let mut conversation = self.load(conversation_id).await?;
        let audit = self
            .transfer_protocol
            .execute(&mut conversation, from_attendant_id, to_attendant_id, reason)
            .await?;
        let student_name = conversation.student.name.clone();
        self.conversations.put(conversation).await?;

        self.emit(StoreEvent::Transferred {
            conversation_id,
            from_attendant_id,
            to_attendant_id,
            student_name,
            audit: audit.clone(),
        });

        Ok(audit)
    }

    /// Clear unread state when a conversation is opened.
    pub async fn mark_read(&self, conversation_id: Uuid) -> AtendeResult<()> {
        let lock = self.write_lock(conversation_id).await;
        let _guard = lock.lock().await;

        let mut conversation = self.load(conversation_id).await?;
        conversation.unread_count = 0;
        conversation.has_new_message = false;
        for message in conversation
            .messages
            .iter_mut()
            .filter(|m| m.sender == SenderKind::Student)
        {
            message.read = true;
        }
        self.conversations.put(conversation).await?;

        Ok(())
    }

    /// Store-level send rule. The store itself never rejects a send on a
    /// finalized conversation (`send_message` stays permissive so reopened
    /// flows cannot wedge); this predicate is the single gate both the UI
    /// and any API layer consult.
    pub fn can_send_message(&self, conversation: &Conversation) -> bool {
        conversation.is_open()
    }

    pub async fn get(&self, conversation_id: Uuid) -> AtendeResult<Conversation> {
        self.load(conversation_id).await
    }

    /// Filtered, read-only view of the conversation set. Attendant-name
    /// matching resolves the roster once per call.
    pub async fn conversations(
        &self,
        filter: &ConversationFilter,
    ) -> AtendeResult<Vec<Conversation>> {
        let all = self.conversations.get_all().await?;

        let roster: HashMap<Uuid, String> = self
            .attendants
            .get_all()
            .await?
            .into_iter()
            .map(|a| (a.id, a.name))
            .collect();

        Ok(all
            .into_iter()
            .filter(|conversation| {
                let attendant_name = conversation
                    .attendant_id
                    .and_then(|id| roster.get(&id))
                    .map(String::as_str);
                filter.matches(conversation, attendant_name)
            })
            .collect())
    }
}
