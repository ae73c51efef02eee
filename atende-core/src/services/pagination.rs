use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::error::AtendeResult;
use crate::models::{Conversation, Message};
use crate::repo::{ConversationRepository, PageRequest};

/// Snapshot of one feed's paging state, for view bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedStatus {
    pub has_next_page: bool,
    pub is_loading: bool,
}

#[derive(Debug, Clone)]
struct FeedState {
    cursor: Option<String>,
    has_next_page: bool,
    is_loading: bool,
    generation: u64,
}

impl FeedState {
    fn fresh(generation: u64) -> Self {
        Self {
            cursor: None,
            has_next_page: true,
            is_loading: false,
            generation,
        }
    }

    fn status(&self) -> FeedStatus {
        FeedStatus {
            has_next_page: self.has_next_page,
            is_loading: self.is_loading,
        }
    }
}

#[derive(Default)]
struct PaginatorInner {
    list: Option<FeedState>,
    messages: HashMap<Uuid, FeedState>,
    next_generation: u64,
}

impl PaginatorInner {
    fn bump_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }
}

/// Drives infinite-scroll loading for the conversation list and for
/// per-conversation message history, each tracked independently.
///
/// `load_next_*` while a page is already in flight is a no-op (returns an
/// empty batch), never a queued request. Selecting a conversation resets its
/// message feed and bumps the feed generation, so a superseded in-flight
/// load is dropped when it resolves instead of being applied retroactively.
pub struct Paginator {
    repo: Arc<dyn ConversationRepository>,
    conversation_page_size: usize,
    message_page_size: usize,
    inner: Mutex<PaginatorInner>,
}

impl Paginator {
    pub fn new(
        repo: Arc<dyn ConversationRepository>,
        conversation_page_size: usize,
        message_page_size: usize,
    ) -> Self {
        Self {
            repo,
            conversation_page_size,
            message_page_size,
            inner: Mutex::new(PaginatorInner::default()),
        }
    }

    pub async fn conversation_list_status(&self) -> FeedStatus {
        let mut inner = self.inner.lock().await;
        inner
            .list
            .get_or_insert_with(|| FeedState::fresh(0))
            .status()
    }

    pub async fn message_feed_status(&self, conversation_id: Uuid) -> Option<FeedStatus> {
        let inner = self.inner.lock().await;
        inner.messages.get(&conversation_id).map(FeedState::status)
    }

    /// (Re)initialize the message feed for the newly active conversation.
    /// Prior page state never leaks into the new selection.
    pub async fn select_conversation(&self, conversation_id: Uuid) {
        let mut inner = self.inner.lock().await;
        let generation = inner.bump_generation();
        inner
            .messages
            .insert(conversation_id, FeedState::fresh(generation));
        debug!(%conversation_id, generation, "Message feed initialized");
    }

    /// Explicit teardown once a conversation is no longer active, so the
    /// feed map does not grow without bound.
    pub async fn release_conversation(&self, conversation_id: Uuid) {
        let mut inner = self.inner.lock().await;
        inner.messages.remove(&conversation_id);
    }

    /// Fetch the next page of the conversation list. Empty result while a
    /// page is in flight or after the feed is exhausted.
    pub async fn load_next_conversations(&self) -> AtendeResult<Vec<Conversation>> {
        let (cursor, generation) = {
            let mut inner = self.inner.lock().await;
            let feed = inner.list.get_or_insert_with(|| FeedState::fresh(0));
            if feed.is_loading || !feed.has_next_page {
                return Ok(Vec::new());
            }
            feed.is_loading = true;
            (feed.cursor.clone(), feed.generation)
        };

        let result = self
            .repo
            .page_conversations(PageRequest {
                cursor,
                limit: self.conversation_page_size,
            })
            .await;

        let mut inner = self.inner.lock().await;
        let Some(feed) = inner.list.as_mut() else {
            return Ok(Vec::new());
        };

        if feed.generation != generation {
            // Feed was reset while the fetch was in flight.
            return Ok(Vec::new());
        }
        feed.is_loading = false;

        let page = result?;
        feed.has_next_page = page.next_cursor.is_some();
        feed.cursor = page.next_cursor;
        Ok(page.items)
    }

    /// Fetch the next page of message history for one conversation. The
    /// feed must have been initialized with [`select_conversation`]; loads
    /// resolving for a superseded or released feed are ignored.
    ///
    /// [`select_conversation`]: Paginator::select_conversation
    pub async fn load_next_messages(&self, conversation_id: Uuid) -> AtendeResult<Vec<Message>> {
        let (cursor, generation) = {
            let mut inner = self.inner.lock().await;
            let Some(feed) = inner.messages.get_mut(&conversation_id) else {
                return Ok(Vec::new());
            };
            if feed.is_loading || !feed.has_next_page {
                return Ok(Vec::new());
            }
            feed.is_loading = true;
            (feed.cursor.clone(), feed.generation)
        };

        let result = self
            .repo
            .page_messages(
                conversation_id,
                PageRequest {
                    cursor,
                    limit: self.message_page_size,
                },
            )
            .await;

        let mut inner = self.inner.lock().await;
        let Some(feed) = inner.messages.get_mut(&conversation_id) else {
            debug!(%conversation_id, "Dropping page for released feed");
            return Ok(Vec::new());
        };

        if feed.generation != generation {
            debug!(%conversation_id, "Dropping superseded page load");
            return Ok(Vec::new());
        }
        feed.is_loading = false;

        let page = result?;
        feed.has_next_page = page.next_cursor.is_some();
        feed.cursor = page.next_cursor;
        Ok(page.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AtendeResult;
    use crate::models::{SenderKind, Student};
    use crate::repo::{MemoryConversationRepository, Page};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    fn seeded_conversation(message_count: usize) -> Conversation {
        let mut conversation = Conversation::new(Student::new("Ana", "ana@edu.br", "Direito"));
        for i in 0..message_count {
            conversation.push_message(Message::text(
                conversation.student.id,
                "Ana",
                SenderKind::Student,
                format!("m{i}"),
            ));
        }
        conversation
    }

    /// Repository wrapper that parks every page fetch until released, to
    /// exercise in-flight guards.
    struct GatedRepository {
        delegate: MemoryConversationRepository,
        gate: Notify,
        fetches: AtomicUsize,
    }

    impl GatedRepository {
        fn new(delegate: MemoryConversationRepository) -> Self {
            Self {
                delegate,
                gate: Notify::new(),
                fetches: AtomicUsize::new(0),
            }
        }

        fn release(&self) {
            self.gate.notify_waiters();
        }

        fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ConversationRepository for GatedRepository {
        async fn get(&self, id: Uuid) -> AtendeResult<Option<Conversation>> {
            self.delegate.get(id).await
        }

        async fn put(&self, conversation: Conversation) -> AtendeResult<()> {
            self.delegate.put(conversation).await
        }

        async fn get_all(&self) -> AtendeResult<Vec<Conversation>> {
            self.delegate.get_all().await
        }

        async fn page_conversations(
            &self,
            request: PageRequest,
        ) -> AtendeResult<Page<Conversation>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            self.delegate.page_conversations(request).await
        }

        async fn page_messages(
            &self,
            conversation_id: Uuid,
            request: PageRequest,
        ) -> AtendeResult<Page<Message>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            self.delegate.page_messages(conversation_id, request).await
        }
    }

    #[tokio::test]
    async fn test_conversation_list_paging_to_exhaustion() {
        let repo = MemoryConversationRepository::new();
        repo.seed(vec![
            seeded_conversation(0),
            seeded_conversation(0),
            seeded_conversation(0),
        ])
        .await;
        let paginator = Paginator::new(Arc::new(repo), 2, 10);

        let first = paginator.load_next_conversations().await.unwrap();
        assert_eq!(first.len(), 2);
        assert!(paginator.conversation_list_status().await.has_next_page);

        let second = paginator.load_next_conversations().await.unwrap();
        assert_eq!(second.len(), 1);
        assert!(!paginator.conversation_list_status().await.has_next_page);

        // Exhausted feed: further calls are no-ops.
        let third = paginator.load_next_conversations().await.unwrap();
        assert!(third.is_empty());
    }

    #[tokio::test]
    async fn test_load_while_in_flight_is_noop() {
        let repo = Arc::new(GatedRepository::new(MemoryConversationRepository::new()));
        let paginator = Arc::new(Paginator::new(repo.clone(), 2, 10));

        let in_flight = {
            let paginator = paginator.clone();
            tokio::spawn(async move { paginator.load_next_conversations().await })
        };
        tokio::task::yield_now().await;
        assert!(paginator.conversation_list_status().await.is_loading);

        // Second trigger while the first page is in flight: no extra fetch.
        let concurrent = paginator.load_next_conversations().await.unwrap();
        assert!(concurrent.is_empty());
        assert_eq!(repo.fetch_count(), 1);

        repo.release();
        in_flight.await.unwrap().unwrap();
        assert_eq!(repo.fetch_count(), 1);
        assert!(!paginator.conversation_list_status().await.is_loading);
    }

    #[tokio::test]
    async fn test_message_feed_requires_selection() {
        let repo = MemoryConversationRepository::new();
        let conversation = seeded_conversation(5);
        let id = conversation.id;
        repo.seed(vec![conversation]).await;
        let paginator = Paginator::new(Arc::new(repo), 10, 3);

        // No selection: nothing is fetched.
        assert!(paginator.load_next_messages(id).await.unwrap().is_empty());
        assert!(paginator.message_feed_status(id).await.is_none());

        paginator.select_conversation(id).await;
        let page = paginator.load_next_messages(id).await.unwrap();
        assert_eq!(page.len(), 3);
        assert_eq!(page[0].content, "m4");
    }

    #[tokio::test]
    async fn test_selection_resets_state() {
        let repo = MemoryConversationRepository::new();
        let conversation = seeded_conversation(4);
        let id = conversation.id;
        repo.seed(vec![conversation]).await;
        let paginator = Paginator::new(Arc::new(repo), 10, 3);

        paginator.select_conversation(id).await;
        paginator.load_next_messages(id).await.unwrap();
        paginator.load_next_messages(id).await.unwrap();
        assert!(!paginator.message_feed_status(id).await.unwrap().has_next_page);

        // Re-selecting starts from the first page again.
        paginator.select_conversation(id).await;
        assert!(paginator.message_feed_status(id).await.unwrap().has_next_page);
        let page = paginator.load_next_messages(id).await.unwrap();
        assert_eq!(page.len(), 3);
        assert_eq!(page[0].content, "m3");
    }

    #[tokio::test]
    async fn test_superseded_load_is_ignored() {
        let delegate = MemoryConversationRepository::new();
        let conversation = seeded_conversation(6);
        let id = conversation.id;
        delegate.seed(vec![conversation]).await;
        let repo = Arc::new(GatedRepository::new(delegate));
        let paginator = Arc::new(Paginator::new(repo.clone(), 10, 2));

        paginator.select_conversation(id).await;
        let in_flight = {
            let paginator = paginator.clone();
            tokio::spawn(async move { paginator.load_next_messages(id).await })
        };
        tokio::task::yield_now().await;

        // Conversation switched away and back mid-fetch: new generation.
        paginator.select_conversation(id).await;

        repo.release();
        let stale = in_flight.await.unwrap().unwrap();
        assert!(stale.is_empty());

        // The fresh feed still starts from the first page.
        let status = paginator.message_feed_status(id).await.unwrap();
        assert!(status.has_next_page);
        assert!(!status.is_loading);
    }

    #[tokio::test]
    async fn test_release_drops_feed_state() {
        let repo = MemoryConversationRepository::new();
        let conversation = seeded_conversation(2);
        let id = conversation.id;
        repo.seed(vec![conversation]).await;
        let paginator = Paginator::new(Arc::new(repo), 10, 5);

        paginator.select_conversation(id).await;
        paginator.load_next_messages(id).await.unwrap();
        assert!(paginator.message_feed_status(id).await.is_some());

        paginator.release_conversation(id).await;
        assert!(paginator.message_feed_status(id).await.is_none());
    }
}
