use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::{broadcast, mpsc, Mutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{AtendeError, AtendeResult};
use crate::models::{AchievementEvent, AchievementPush};

/// Per-day display suppression: `mark` records that a dedup key was shown
/// on the given day, `has` answers whether it already was.
#[async_trait]
pub trait AlreadyShownRepository: Send + Sync {
    async fn has(&self, key: &str, day: NaiveDate) -> AtendeResult<bool>;

    async fn mark(&self, key: &str, day: NaiveDate) -> AtendeResult<()>;
}

#[derive(Default)]
pub struct MemoryShownRepository {
    shown: Mutex<HashSet<(String, NaiveDate)>>,
}

impl MemoryShownRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AlreadyShownRepository for MemoryShownRepository {
    async fn has(&self, key: &str, day: NaiveDate) -> AtendeResult<bool> {
        let shown = self.shown.lock().await;
        Ok(shown.contains(&(key.to_string(), day)))
    }

    async fn mark(&self, key: &str, day: NaiveDate) -> AtendeResult<()> {
        let mut shown = self.shown.lock().await;
        shown.insert((key.to_string(), day));
        Ok(())
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct ShownFile {
    day: NaiveDate,
    keys: HashSet<String>,
}

/// JSON-file-backed shown set. Only one day is ever kept: marking on a new
/// day discards the previous day's keys, so the set cannot grow unbounded.
pub struct FileShownRepository {
    path: PathBuf,
    state: Mutex<ShownFile>,
}

impl FileShownRepository {
    pub fn at_path(path: PathBuf) -> Self {
        let state = std::fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_else(|| ShownFile {
                day: Utc::now().date_naive(),
                keys: HashSet::new(),
            });

        Self {
            path,
            state: Mutex::new(state),
        }
    }

    fn persist(&self, state: &ShownFile) -> AtendeResult<()> {
        let raw = serde_json::to_string(state)?;
        std::fs::write(&self.path, raw)
            .map_err(|err| AtendeError::ShownStorageFailed(err.to_string()))
    }
}

#[async_trait]
impl AlreadyShownRepository for FileShownRepository {
    async fn has(&self, key: &str, day: NaiveDate) -> AtendeResult<bool> {
        let state = self.state.lock().await;
        Ok(state.day == day && state.keys.contains(key))
    }

    async fn mark(&self, key: &str, day: NaiveDate) -> AtendeResult<()> {
        let mut state = self.state.lock().await;
        if state.day != day {
            state.day = day;
            state.keys.clear();
        }
        state.keys.insert(key.to_string());
        self.persist(&state)
    }
}

#[derive(Debug, Clone)]
pub enum QueueEvent {
    Shown(AchievementEvent),
    Hidden,
}

#[derive(Default)]
struct QueueInner {
    current: Option<AchievementEvent>,
    pending: VecDeque<AchievementEvent>,
}

/// Serializes achievement announcements: at most one visible at a time,
/// each dedup key displayed at most once per calendar day regardless of how
/// many times (or from which origin) it is enqueued.
pub struct AchievementQueue {
    shown: Arc<dyn AlreadyShownRepository>,
    inner: Arc<Mutex<QueueInner>>,
    events: broadcast::Sender<QueueEvent>,
    advance_delay: Duration,
}

impl AchievementQueue {
    pub fn new(shown: Arc<dyn AlreadyShownRepository>, advance_delay: Duration) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            shown,
            inner: Arc::new(Mutex::new(QueueInner::default())),
            events,
            advance_delay,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.events.subscribe()
    }

    pub async fn current(&self) -> Option<AchievementEvent> {
        self.inner.lock().await.current.clone()
    }

    /// Admit an achievement. Returns false when it was suppressed (already
    /// shown today, or already waiting in the queue).
    pub async fn enqueue(&self, event: AchievementEvent) -> AtendeResult<bool> {
        let today = Utc::now().date_naive();

        if self.shown.has(event.dedup_key(), today).await? {
            debug!(key = event.dedup_key(), "Achievement already shown today");
            return Ok(false);
        }

        let mut inner = self.inner.lock().await;

        let duplicate_in_flight = inner
            .current
            .as_ref()
            .map(|c| c.dedup_key() == event.dedup_key())
            .unwrap_or(false)
            || inner
                .pending
                .iter()
                .any(|p| p.dedup_key() == event.dedup_key());
        if duplicate_in_flight {
            debug!(key = event.dedup_key(), "Achievement already queued");
            return Ok(false);
        }

        if inner.current.is_none() {
            self.shown.mark(event.dedup_key(), today).await?;
            inner.current = Some(event.clone());
            info!(key = event.dedup_key(), "Showing achievement");
            let _ = self.events.send(QueueEvent::Shown(event));
        } else {
            inner.pending.push_back(event);
        }

        Ok(true)
    }

    /// Hide the current achievement. The next pending one (if any) is shown
    /// after a short delay so consecutive toasts do not visually collide.
    pub async fn dismiss(&self) {
        {
            let mut inner = self.inner.lock().await;
            if inner.current.take().is_none() {
                return;
            }
        }
        let _ = self.events.send(QueueEvent::Hidden);

        let shown = self.shown.clone();
        let inner = self.inner.clone();
        let events = self.events.clone();
        let delay = self.advance_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let mut inner = inner.lock().await;
            if inner.current.is_some() {
                return;
            }
            if let Some(next) = inner.pending.pop_front() {
                let today = Utc::now().date_naive();
                if let Err(err) = shown.mark(next.dedup_key(), today).await {
                    err.log();
                }
                inner.current = Some(next.clone());
                let _ = events.send(QueueEvent::Shown(next));
            }
        });
    }
}

/// Funnel push-channel envelopes into the queue, admitting only broadcasts
/// and events addressed to the current user.
pub async fn run_push_listener(
    mut pushes: mpsc::Receiver<AchievementPush>,
    queue: Arc<AchievementQueue>,
    current_user_id: Uuid,
) {
    while let Some(push) = pushes.recv().await {
        if !push.addressed_to(current_user_id) {
            continue;
        }
        if let Err(err) = queue.enqueue(push.achievement).await {
            warn!("Failed to enqueue achievement from push channel: {err}");
        }
    }
    debug!("Push channel closed");
}
