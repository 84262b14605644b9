use std::sync::Arc;
use std::time::Duration;

use futures::Stream;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::api::{ApiResult, SharedApi};
use crate::models::{ConversationKey, Message};
use crate::schedule::{spawn_periodic, FirstTick, PollHandle};
use crate::session::SessionStore;

/// Ids of messages addressed to `self_email` that are still unread, in feed order
pub fn unread_message_ids(messages: &[Message], self_email: &str) -> Vec<String> {
    messages
        .iter()
        .filter(|m| m.is_unread_for(self_email))
        .map(|m| m.id.clone())
        .collect()
}

/// What one applied poll changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickOutcome {
    /// Length differs from the previous snapshot
    pub new_activity: bool,
    /// Ids sent in the read-receipt write (empty when none was issued)
    pub unread_ids: Vec<String>,
}

/// Published view of the conversation
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    pub messages: Arc<Vec<Message>>,
    /// True until the first tick resolves, whether it succeeded or not
    pub loading: bool,
    /// Successful ticks applied so far
    pub ticks: u64,
}

impl Default for FeedSnapshot {
    fn default() -> Self {
        Self {
            messages: Arc::new(Vec::new()),
            loading: true,
            ticks: 0,
        }
    }
}

struct FeedState {
    snapshot: FeedSnapshot,
    /// Edge-triggered scroll-to-latest request
    scroll_pending: bool,
}

/// Near-real-time view of one conversation.
///
/// Every tick replaces the whole snapshot with the backend's list. A change in
/// length raises the scroll signal; unread messages addressed to us are marked
/// read with a fire-and-forget write.
pub struct ConversationFeed {
    api: SharedApi,
    session: Arc<SessionStore>,
    key: ConversationKey,
    interval: Duration,
    state: Mutex<FeedState>,
    snapshot_tx: watch::Sender<FeedSnapshot>,
}

impl ConversationFeed {
    pub fn new(
        api: SharedApi,
        session: Arc<SessionStore>,
        key: ConversationKey,
        interval: Duration,
    ) -> Arc<Self> {
        let (snapshot_tx, _) = watch::channel(FeedSnapshot::default());
        Arc::new(Self {
            api,
            session,
            key,
            interval,
            state: Mutex::new(FeedState {
                snapshot: FeedSnapshot::default(),
                scroll_pending: false,
            }),
            snapshot_tx,
        })
    }

    pub fn key(&self) -> &ConversationKey {
        &self.key
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        self.state.lock().snapshot.clone()
    }

    pub fn messages(&self) -> Arc<Vec<Message>> {
        self.state.lock().snapshot.messages.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().snapshot.loading
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Consume the scroll signal. Returns true once per detected change.
    pub fn take_scroll_request(&self) -> bool {
        std::mem::take(&mut self.state.lock().scroll_pending)
    }

    /// Fetch the full conversation. `None` when there is no session to poll with.
    async fn fetch(&self) -> Option<ApiResult<Vec<Message>>> {
        let Some(token) = self.session.token() else {
            debug!(peer = %self.key.peer, "no session, skipping conversation poll");
            return None;
        };
        Some(self.api.fetch_conversation(&token, &self.key).await)
    }

    /// Run one tick without cancellation
    pub async fn poll_once(&self) -> Option<TickOutcome> {
        let result = self.fetch().await?;
        self.handle_result(result)
    }

    fn handle_result(&self, result: ApiResult<Vec<Message>>) -> Option<TickOutcome> {
        match result {
            Ok(messages) => Some(self.apply(messages)),
            Err(e) => {
                warn!(peer = %self.key.peer, "Conversation poll failed: {}", e);
                if e.is_unauthorized() {
                    self.session.invalidate();
                }
                let mut state = self.state.lock();
                if state.snapshot.loading {
                    state.snapshot.loading = false;
                    self.snapshot_tx.send_replace(state.snapshot.clone());
                }
                None
            }
        }
    }

    /// Replace the snapshot wholesale and reconcile read receipts
    pub fn apply(&self, messages: Vec<Message>) -> TickOutcome {
        let self_email = self
            .session
            .profile()
            .map(|p| p.email)
            .unwrap_or_default();
        let unread_ids = unread_message_ids(&messages, &self_email);

        let new_activity = {
            let mut state = self.state.lock();
            let new_activity = state.snapshot.messages.len() != messages.len();
            state.snapshot = FeedSnapshot {
                messages: Arc::new(messages),
                loading: false,
                ticks: state.snapshot.ticks + 1,
            };
            if new_activity {
                state.scroll_pending = true;
            }
            self.snapshot_tx.send_replace(state.snapshot.clone());
            new_activity
        };

        if !unread_ids.is_empty() {
            self.mark_read(unread_ids.clone());
        }

        TickOutcome {
            new_activity,
            unread_ids,
        }
    }

    fn mark_read(&self, ids: Vec<String>) {
        let Some(token) = self.session.token() else {
            return;
        };
        let api = self.api.clone();
        let session = self.session.clone();
        tokio::spawn(async move {
            if let Err(e) = api.mark_messages_read(&token, &ids).await {
                warn!(count = ids.len(), "Failed to mark messages read: {}", e);
                if e.is_unauthorized() {
                    session.invalidate();
                }
            }
        });
    }

    /// Start the poll loop. A tick that resolves after cancellation is discarded.
    pub fn spawn(self: &Arc<Self>) -> PollHandle {
        let feed = self.clone();
        spawn_periodic(self.interval, FirstTick::AfterPeriod, move |cancel| {
            let feed = feed.clone();
            async move {
                let Some(result) = feed.fetch().await else {
                    return;
                };
                if cancel.is_cancelled() {
                    debug!(peer = %feed.key.peer, "view torn down, discarding poll result");
                    return;
                }
                feed.handle_result(result);
            }
        })
    }

    /// Lazy, restartable, infinite sequence of snapshots, one per successful tick.
    ///
    /// Each call starts a fresh interval. Failed ticks and ticks without a
    /// session yield nothing; the stream never ends on its own, matching the
    /// spawned poll loop.
    pub fn snapshots(self: &Arc<Self>) -> impl Stream<Item = Arc<Vec<Message>>> + Send + 'static {
        let mut interval = tokio::time::interval_at(
            tokio::time::Instant::now() + self.interval,
            self.interval,
        );
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        futures::stream::unfold((self.clone(), interval), |(feed, mut interval)| async move {
            loop {
                interval.tick().await;
                let Some(result) = feed.fetch().await else {
                    continue;
                };
                if feed.handle_result(result).is_some() {
                    let messages = feed.messages();
                    return Some((messages, (feed, interval)));
                }
            }
        })
    }
}

/// The chat screen: owns at most one running feed, keyed by the selected peer.
///
/// Selecting another peer restarts polling with a fresh snapshot; clearing
/// the peer or dropping the view stops it.
pub struct ConversationView {
    api: SharedApi,
    session: Arc<SessionStore>,
    interval: Duration,
    active: Option<(Arc<ConversationFeed>, PollHandle)>,
}

impl ConversationView {
    pub fn new(api: SharedApi, session: Arc<SessionStore>, interval: Duration) -> Self {
        Self {
            api,
            session,
            interval,
            active: None,
        }
    }

    pub fn set_peer(&mut self, key: Option<ConversationKey>) {
        if let (Some((feed, _)), Some(key)) = (&self.active, &key) {
            if feed.key() == key {
                return;
            }
        }
        // Dropping the old handle cancels its loop
        self.active = key.map(|key| {
            debug!(peer = %key.peer, "starting conversation poll");
            let feed = ConversationFeed::new(
                self.api.clone(),
                self.session.clone(),
                key,
                self.interval,
            );
            let handle = feed.spawn();
            (feed, handle)
        });
    }

    pub fn close(&mut self) {
        self.set_peer(None);
    }

    pub fn feed(&self) -> Option<Arc<ConversationFeed>> {
        self.active.as_ref().map(|(feed, _)| feed.clone())
    }

    pub fn is_polling(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|(_, handle)| !handle.is_cancelled())
    }
}
