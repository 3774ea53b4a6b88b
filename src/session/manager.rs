use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;
use tokio::task::{Id, JoinError, JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::SessionError;
use crate::models::{Confidence, FilterCriteria, SwipeAction, SwipeCandidate, SwipeRecord};
use crate::session::client::{CandidateBatch, SwipeClient, WriteOutcome};

pub const DEFAULT_PRELOAD_COUNT: usize = 3;
const EXHAUSTED_MESSAGE: &str = "No more stocks available with current filters";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Nothing loaded yet.
    Idle,
    /// No current candidate, a fetch for the active filters is in flight.
    Loading,
    /// A candidate is on screen. Background prefetch may still be running.
    Ready,
    /// No current candidate and nothing more to fetch until the user acts.
    Exhausted,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Loading => write!(f, "loading"),
            SessionState::Ready => write!(f, "ready"),
            SessionState::Exhausted => write!(f, "exhausted"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub filters: FilterCriteria,
    pub preload_count: usize,
}

impl SessionOptions {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            filters: cfg.default_filters.clone(),
            preload_count: cfg.preload_count,
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            filters: FilterCriteria::default(),
            preload_count: DEFAULT_PRELOAD_COUNT,
        }
    }
}

struct FetchOutcome {
    generation: u64,
    batch: CandidateBatch,
}

/// Drives one swipe session: a single current candidate, a short lookahead
/// queue, and a durable record for every swipe.
///
/// All state changes happen synchronously inside `&mut self` calls. Network
/// work runs on spawned tasks; completed fetches are folded in by `poll`,
/// `settle`, or the next operation. Every fetch carries the generation it
/// was started under, and a filter change or refresh bumps the generation,
/// so a slow response for old criteria is dropped instead of applied.
///
/// Must be used from within a Tokio runtime.
pub struct SwipeSession {
    client: Arc<SwipeClient>,
    filters: FilterCriteria,
    preload_count: usize,

    current: Option<SwipeCandidate>,
    queue: VecDeque<SwipeCandidate>,
    swiped: HashSet<String>,
    portfolio: HashSet<String>,
    error: Option<SessionError>,
    initialized: bool,

    generation: u64,
    fetches: JoinSet<FetchOutcome>,
    fetch_generations: HashMap<Id, u64>,
    pending_writes: Vec<JoinHandle<WriteOutcome>>,
}

impl SwipeSession {
    pub fn new(client: Arc<SwipeClient>, options: SessionOptions) -> Result<Self, SessionError> {
        if options.preload_count == 0 {
            return Err(SessionError::Validation(
                "preload count must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            client,
            filters: options.filters,
            preload_count: options.preload_count,
            current: None,
            queue: VecDeque::new(),
            swiped: HashSet::new(),
            portfolio: HashSet::new(),
            error: None,
            initialized: false,
            generation: 0,
            fetches: JoinSet::new(),
            fetch_generations: HashMap::new(),
            pending_writes: Vec::new(),
        })
    }

    /// Load the user's portfolio, then the first batch. Resolves once the
    /// session is Ready or Exhausted. A failed portfolio fetch leaves the
    /// owned set empty.
    ///
    /// The portfolio comes first so the fallback table can rank and hide
    /// owned stocks on the very first query.
    pub async fn initialize(&mut self) {
        if self.initialized {
            self.refresh_stocks().await;
            return;
        }
        info!(
            "Starting swipe session (filters: {}, preload: {})",
            self.filters, self.preload_count
        );
        let owned = self.client.get_user_portfolio().await;
        self.portfolio = owned.into_iter().collect();

        self.initialized = true;
        self.spawn_fetch();
        self.settle().await;
    }

    pub fn state(&self) -> SessionState {
        if self.current.is_some() {
            SessionState::Ready
        } else if self.is_fetching() {
            SessionState::Loading
        } else if self.error.is_some() {
            SessionState::Exhausted
        } else {
            SessionState::Idle
        }
    }

    pub fn current(&self) -> Option<&SwipeCandidate> {
        self.current.as_ref()
    }

    /// Buffered candidates behind the current one, in display order.
    pub fn queue(&self) -> &VecDeque<SwipeCandidate> {
        &self.queue
    }

    pub fn is_loading(&self) -> bool {
        !self.initialized || self.is_fetching()
    }

    pub fn error(&self) -> Option<&SessionError> {
        self.error.as_ref()
    }

    pub fn portfolio(&self) -> &HashSet<String> {
        &self.portfolio
    }

    pub fn filters(&self) -> &FilterCriteria {
        &self.filters
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn has_more_stocks(&self) -> bool {
        !self.queue.is_empty() || self.error.is_none()
    }

    pub fn client(&self) -> &Arc<SwipeClient> {
        &self.client
    }

    /// Act on the current candidate and advance. Returns the record, or
    /// `None` without touching anything if no candidate is showing.
    ///
    /// The record is written in the background; the session advances
    /// whatever the write outcome.
    pub fn swipe(
        &mut self,
        action: SwipeAction,
        confidence: Option<Confidence>,
    ) -> Option<SwipeRecord> {
        self.poll();

        let Some(consumed) = self.current.take() else {
            debug!("Swipe {} ignored: no current candidate", action);
            return None;
        };

        let record = SwipeRecord::new(&consumed.symbol, action, confidence);
        match record.confidence {
            Some(c) => info!("Swiped {} on {} ({})", action, consumed.symbol, c),
            None => info!("Swiped {} on {}", action, consumed.symbol),
        }

        let client = self.client.clone();
        let to_write = record.clone();
        self.pending_writes
            .push(tokio::spawn(async move { client.record_swipe(&to_write).await }));

        self.swiped.insert(consumed.symbol.clone());
        self.current = self.queue.pop_front();
        self.queue.retain(|c| c.symbol != consumed.symbol);

        if self.current.is_none() && !self.is_fetching() {
            // Last card gone: one more attempt even if the previous batch
            // came back empty.
            debug!("Queue drained after {}, fetching more", consumed.symbol);
            self.spawn_fetch();
        } else {
            self.maybe_refill();
        }

        Some(record)
    }

    pub fn swipe_left(&mut self) -> Option<SwipeRecord> {
        self.swipe(SwipeAction::Skip, None)
    }

    pub fn swipe_right(&mut self, confidence: Option<Confidence>) -> Option<SwipeRecord> {
        self.swipe(SwipeAction::Queue, confidence)
    }

    pub fn save_for_later(&mut self) -> Option<SwipeRecord> {
        self.swipe(SwipeAction::Save, None)
    }

    /// Drop everything buffered and refetch with the active filters.
    pub async fn refresh_stocks(&mut self) {
        info!("Refreshing stocks ({})", self.filters);
        self.restart();
        self.settle().await;
    }

    /// Replace the filters wholesale and refetch. Does not wait for the
    /// new batch; any fetch still running for the old filters is ignored.
    pub fn update_filters(&mut self, filters: FilterCriteria) {
        info!("Filters changed: {} -> {}", self.filters, filters);
        self.filters = filters;
        self.restart();
    }

    /// Apply every fetch that has already completed. Never waits.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Some(result) = self.fetches.try_join_next_with_id() {
            self.on_fetch_complete(result);
            applied += 1;
        }
        applied
    }

    /// Wait until no fetch is outstanding, applying each as it lands.
    pub async fn settle(&mut self) {
        while let Some(result) = self.fetches.join_next_with_id().await {
            self.on_fetch_complete(result);
        }
    }

    /// Wait for every swipe write issued so far.
    pub async fn flush(&mut self) -> Vec<WriteOutcome> {
        let mut outcomes = Vec::with_capacity(self.pending_writes.len());
        for handle in self.pending_writes.drain(..) {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    warn!("Swipe write task failed: {}", e);
                    outcomes.push(WriteOutcome::Dropped);
                }
            }
        }
        outcomes
    }

    fn restart(&mut self) {
        self.generation += 1;
        self.initialized = true;
        self.queue.clear();
        self.current = None;
        self.error = None;
        self.spawn_fetch();
    }

    fn is_fetching(&self) -> bool {
        self.fetch_generations
            .values()
            .any(|g| *g == self.generation)
    }

    fn known_symbols(&self) -> HashSet<String> {
        self.swiped
            .iter()
            .cloned()
            .chain(self.current.iter().map(|c| c.symbol.clone()))
            .chain(self.queue.iter().map(|c| c.symbol.clone()))
            .collect()
    }

    fn spawn_fetch(&mut self) {
        let generation = self.generation;
        let client = self.client.clone();
        let filters = self.filters.clone();
        let limit = self.preload_count;
        let owned = self.portfolio.clone();
        let exclude = self.known_symbols();

        debug!(
            "Fetching {} candidates (generation {}, {} known symbols)",
            limit,
            generation,
            exclude.len()
        );

        let handle = self.fetches.spawn(async move {
            let batch = client
                .get_swipeable_stocks(&filters, limit, &owned, &exclude)
                .await;
            FetchOutcome { generation, batch }
        });
        self.fetch_generations.insert(handle.id(), generation);
    }

    /// Low-water refill: top up once the lookahead is down to one item.
    fn maybe_refill(&mut self) {
        if !self.initialized
            || self.queue.len() > 1
            || self.is_fetching()
            || self.error.is_some()
        {
            return;
        }
        debug!("Queue low ({} buffered), prefetching", self.queue.len());
        self.spawn_fetch();
    }

    fn on_fetch_complete(&mut self, result: Result<(Id, FetchOutcome), JoinError>) {
        match result {
            Ok((id, outcome)) => {
                self.fetch_generations.remove(&id);
                if outcome.generation != self.generation {
                    debug!(
                        "Discarding stale batch of {} from generation {} (now {})",
                        outcome.batch.candidates.len(),
                        outcome.generation,
                        self.generation
                    );
                    return;
                }
                self.apply_batch(outcome.batch);
            }
            Err(e) => {
                let generation = self.fetch_generations.remove(&e.id());
                warn!("Candidate fetch task failed: {}", e);
                if generation == Some(self.generation) {
                    self.set_error(SessionError::Network(e.to_string()));
                }
            }
        }
    }

    fn apply_batch(&mut self, batch: CandidateBatch) {
        let fresh = self.admit(batch.candidates);

        if fresh.is_empty() {
            let err = match batch.remote_error {
                Some(reason) => SessionError::Network(reason),
                None => SessionError::Exhausted(EXHAUSTED_MESSAGE.to_string()),
            };
            self.set_error(err);
            return;
        }

        debug!(
            "Queued {} candidates from {:?}: {}",
            fresh.len(),
            batch.source,
            fresh
                .iter()
                .map(|c| c.symbol.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        self.error = None;
        self.queue.extend(fresh);
        if self.current.is_none() {
            self.current = self.queue.pop_front();
        }
        self.maybe_refill();
    }

    /// Rank a batch by descending priority (stable, so ties keep arrival
    /// order), drop anything already known or hidden as owned, and cap it
    /// at the preload count.
    fn admit(&self, mut candidates: Vec<SwipeCandidate>) -> Vec<SwipeCandidate> {
        candidates.sort_by(|a, b| b.priority_score.total_cmp(&a.priority_score));

        let mut known = self.known_symbols();
        let mut fresh = Vec::with_capacity(self.preload_count);
        for candidate in candidates {
            if self.filters.hide_owned
                && (candidate.already_owned || self.portfolio.contains(&candidate.symbol))
            {
                continue;
            }
            if !known.insert(candidate.symbol.clone()) {
                continue;
            }
            fresh.push(candidate);
            if fresh.len() == self.preload_count {
                break;
            }
        }
        fresh
    }

    /// Running dry behind a visible card is the normal end of a list.
    fn set_error(&mut self, err: SessionError) {
        if self.current.is_some() {
            debug!("Prefetch found nothing new: {}", err);
        } else {
            warn!("{}", err);
        }
        self.error = Some(err);
    }
}
