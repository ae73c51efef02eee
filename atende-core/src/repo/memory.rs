use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AtendeError, AtendeResult};
use crate::models::{Attendant, Conversation, Message};

use super::{AttendantRepository, ConversationRepository, Page, PageRequest};

/// In-memory conversation storage. Cursors are plain offsets encoded as
/// strings; they are opaque to everything above this layer.
#[derive(Default)]
pub struct MemoryConversationRepository {
    conversations: RwLock<HashMap<Uuid, Conversation>>,
    /// Counts repository fetches, for pagination tests.
    fetch_count: AtomicUsize,
}

impl MemoryConversationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, conversations: Vec<Conversation>) {
        let mut map = self.conversations.write().await;
        for conversation in conversations {
            map.insert(conversation.id, conversation);
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    fn parse_cursor(cursor: &Option<String>) -> AtendeResult<usize> {
        match cursor {
            None => Ok(0),
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|_| AtendeError::InvalidCursor(raw.clone())),
        }
    }

    fn page_slice<T: Clone>(items: &[T], offset: usize, limit: usize) -> Page<T> {
        let end = (offset + limit).min(items.len());
        let page_items = items
            .get(offset..end)
            .map(|s| s.to_vec())
            .unwrap_or_default();
        let next_cursor = if end < items.len() {
            Some(end.to_string())
        } else {
            None
        };
        Page {
            items: page_items,
            next_cursor,
        }
    }
}

#[async_trait]
impl ConversationRepository for MemoryConversationRepository {
    async fn get(&self, id: Uuid) -> AtendeResult<Option<Conversation>> {
        let map = self.conversations.read().await;
        Ok(map.get(&id).cloned())
    }

    async fn put(&self, conversation: Conversation) -> AtendeResult<()> {
        let mut map = self.conversations.write().await;
        map.insert(conversation.id, conversation);
        Ok(())
    }

    async fn get_all(&self) -> AtendeResult<Vec<Conversation>> {
        let map = self.conversations.read().await;
        let mut all: Vec<Conversation> = map.values().cloned().collect();
        all.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn page_conversations(&self, request: PageRequest) -> AtendeResult<Page<Conversation>> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        let offset = Self::parse_cursor(&request.cursor)?;
        let all = self.get_all().await?;
        Ok(Self::page_slice(&all, offset, request.limit))
    }

    async fn page_messages(
        &self,
        conversation_id: Uuid,
        request: PageRequest,
    ) -> AtendeResult<Page<Message>> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        let offset = Self::parse_cursor(&request.cursor)?;

        let map = self.conversations.read().await;
        let conversation = map
            .get(&conversation_id)
            .ok_or(AtendeError::ConversationNotFound(conversation_id))?;

        // Newest first: each following page reaches further back in history.
        let mut newest_first: Vec<Message> = conversation.messages.clone();
        newest_first.reverse();
        Ok(Self::page_slice(&newest_first, offset, request.limit))
    }
}

#[derive(Default)]
pub struct MemoryAttendantRepository {
    attendants: RwLock<HashMap<Uuid, Attendant>>,
}

impl MemoryAttendantRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, attendants: Vec<Attendant>) {
        let mut map = self.attendants.write().await;
        for attendant in attendants {
            map.insert(attendant.id, attendant);
        }
    }
}

#[async_trait]
impl AttendantRepository for MemoryAttendantRepository {
    async fn get(&self, id: Uuid) -> AtendeResult<Option<Attendant>> {
        let map = self.attendants.read().await;
        Ok(map.get(&id).cloned())
    }

    async fn put(&self, attendant: Attendant) -> AtendeResult<()> {
        let mut map = self.attendants.write().await;
        map.insert(attendant.id, attendant);
        Ok(())
    }

    async fn get_all(&self) -> AtendeResult<Vec<Attendant>> {
        let map = self.attendants.read().await;
        let mut all: Vec<Attendant> = map.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }
}
