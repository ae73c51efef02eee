pub mod memory;

pub use memory::{MemoryAttendantRepository, MemoryConversationRepository};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AtendeResult;
use crate::models::{Attendant, Conversation, Message};

/// Cursor-based page request. `cursor` is opaque to callers; `None` starts
/// a feed from the beginning.
#[derive(Debug, Clone, Default)]
pub struct PageRequest {
    pub cursor: Option<String>,
    pub limit: usize,
}

impl PageRequest {
    pub fn first(limit: usize) -> Self {
        Self {
            cursor: None,
            limit,
        }
    }

    pub fn after(cursor: impl Into<String>, limit: usize) -> Self {
        Self {
            cursor: Some(cursor.into()),
            limit,
        }
    }
}

/// One page of a feed. A `None` next_cursor means the feed is exhausted.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
        }
    }

    pub fn has_next(&self) -> bool {
        self.next_cursor.is_some()
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Query/persistence seam for conversations. The production deployment backs
/// this with the institution's query layer; the in-memory implementation in
/// [`memory`] serves tests and the mock-data mode.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> AtendeResult<Option<Conversation>>;

    async fn put(&self, conversation: Conversation) -> AtendeResult<()>;

    async fn get_all(&self) -> AtendeResult<Vec<Conversation>>;

    /// Conversation-list feed, ordered by `updated_at` descending.
    async fn page_conversations(&self, request: PageRequest) -> AtendeResult<Page<Conversation>>;

    /// Message-history feed for one conversation, newest page first (each
    /// following page is older history, matching an infinite-scroll view).
    async fn page_messages(
        &self,
        conversation_id: Uuid,
        request: PageRequest,
    ) -> AtendeResult<Page<Message>>;
}

#[async_trait]
pub trait AttendantRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> AtendeResult<Option<Attendant>>;

    async fn put(&self, attendant: Attendant) -> AtendeResult<()>;

    async fn get_all(&self) -> AtendeResult<Vec<Attendant>>;
}
