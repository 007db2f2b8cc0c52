//! The feed orchestrator.

use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use tracing::{debug, info, warn};

use super::builder::FeedManagerBuilder;
use super::observer::{FeedObserver, ViewportProbe};
use super::outcome::{FeedPhase, LoadOutcome, SkipReason};
use crate::cache::{CacheEntry, CacheStore};
use crate::fetcher::{ContentFetcher, PageRequest};
use crate::filter::{AccessToken, FilterState};
use crate::throttle::RateLimiter;
use crate::types::{CacheKey, FeedPage, ImageRecord, RenderInstruction, TagSet, Visibility};
use crate::{Result, VitrineError, telemetry};

type SharedOutcome = Shared<BoxFuture<'static, LoadOutcome>>;

/// Orchestrates loading, caching and pagination for one feed view.
///
/// Cheap to clone; clones drive the same view. Several managers may share
/// one [`CacheStore`] (e.g. multiple panels), each with its own filter,
/// phase and rate-limit session.
///
/// Concurrency rules:
///
/// - `load_initial` is single-flight: concurrent callers for the same view
///   await one fetch and receive the same outcome.
/// - `load_more` is mutually exclusive with any other load; a second
///   trigger while one is in flight is dropped, not queued.
/// - A result that arrives after the view changed is discarded.
#[derive(Clone)]
pub struct FeedManager {
    inner: Arc<Inner>,
}

pub(super) struct Inner {
    pub(super) fetcher: Arc<dyn ContentFetcher>,
    pub(super) cache: Arc<CacheStore>,
    pub(super) observers: Vec<Arc<dyn FeedObserver>>,
    pub(super) viewport: Option<Arc<dyn ViewportProbe>>,
    pub(super) request_timeout: Duration,
    pub(super) state: Mutex<FeedState>,
}

pub(super) struct FeedState {
    filter: FilterState,
    limiter: RateLimiter,
    phase: FeedPhase,
    /// Bumped whenever the view is reset; results from older generations
    /// are stale.
    generation: u64,
    /// Bumped whenever the rate-limit session restarts.
    session: u64,
    initial_flight: Option<InitialFlight>,
    /// A pagination trigger was refused during the current cooldown.
    deferred_trigger: bool,
}

impl FeedState {
    pub(super) fn new(filter: FilterState, limiter: RateLimiter) -> Self {
        Self {
            filter,
            limiter,
            phase: FeedPhase::Idle,
            generation: 0,
            session: 0,
            initial_flight: None,
            deferred_trigger: false,
        }
    }

    /// Start a new view: anything in flight becomes stale.
    fn reset_view(&mut self) {
        self.generation += 1;
        self.phase = FeedPhase::Idle;
        self.initial_flight = None;
    }

    /// Start a new rate-limit session.
    /// Returns whether a cooldown was cut short; its pending
    /// `Loading(false)` is then owed to the host.
    fn reset_session(&mut self) -> bool {
        let was_cooling = self.limiter.is_cooling_down();
        self.limiter.reset();
        self.session += 1;
        self.deferred_trigger = false;
        was_cooling
    }
}

struct InitialFlight {
    key: CacheKey,
    generation: u64,
    outcome: SharedOutcome,
}

/// What `load_more` decided under the lock.
struct MoreTicket {
    key: CacheKey,
    page: u32,
    generation: u64,
    token: Option<AccessToken>,
}

impl FeedManager {
    /// Create a builder for configuring a feed manager.
    pub fn builder() -> FeedManagerBuilder {
        FeedManagerBuilder::new()
    }

    pub(super) fn from_inner(inner: Inner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn phase(&self) -> FeedPhase {
        self.state().phase
    }

    /// Cache key of the view currently selected.
    pub fn active_key(&self) -> CacheKey {
        self.state().filter.cache_key()
    }

    /// Snapshot of the current filter selection.
    pub fn filter(&self) -> FilterState {
        self.state().filter.clone()
    }

    /// Images cached for the active view, in feed order.
    pub fn current_images(&self) -> Vec<ImageRecord> {
        self.inner
            .cache
            .get(&self.active_key())
            .map(|entry| entry.images)
            .unwrap_or_default()
    }

    /// Whether the active view has further pages.
    pub fn has_more(&self) -> bool {
        self.inner
            .cache
            .get(&self.active_key())
            .is_some_and(|entry| entry.has_more)
    }

    /// Pages loaded by pagination since the last filter switch.
    pub fn pages_loaded(&self) -> u32 {
        self.state().limiter.pages_loaded()
    }

    pub fn is_cooling_down(&self) -> bool {
        self.state().limiter.is_cooling_down()
    }

    pub fn cache(&self) -> &Arc<CacheStore> {
        &self.inner.cache
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Load the first page of the active view.
    ///
    /// Renders the cached entry if the view is already loaded. Otherwise
    /// fetches page 0, replaces the cache entry and renders it. Joins an
    /// in-flight initial load for the same view instead of fetching again.
    pub async fn load_initial(&self) -> LoadOutcome {
        self.start_initial(false).await
    }

    /// Manual refresh: refetch page 0 of the active view, bypassing the
    /// cache. Joins an in-flight initial load for the same view.
    pub async fn refresh(&self) -> LoadOutcome {
        self.start_initial(true).await
    }

    /// Load the next page of the active view.
    ///
    /// Skipped while another load is in flight, while the rate limiter is
    /// cooling down, or once the view has no more pages. The cursor advances
    /// by exactly one page per success, however many items the page held.
    pub async fn load_more(&self) -> LoadOutcome {
        let ticket = match self.begin_more() {
            Ok(ticket) => ticket,
            Err(outcome) => return outcome,
        };
        self.emit(vec![RenderInstruction::Loading(true)]);

        let request = PageRequest {
            visibility: ticket.key.visibility,
            page: ticket.page,
            tags: ticket.key.tags.clone(),
            token: ticket.token.clone(),
        };
        let result = self.fetch(&request, "more").await;
        self.finish_more(ticket, result)
    }

    /// Infinite-scroll trigger: the viewport reached the end of the feed.
    pub async fn on_scroll_near_end(&self) -> LoadOutcome {
        let outcome = self.load_more().await;
        if let LoadOutcome::Skipped(reason) = &outcome {
            debug!(?reason, "scroll trigger ignored");
        }
        outcome
    }

    // ========================================================================
    // View changes
    // ========================================================================

    /// Switch the visibility filter and load the new view.
    ///
    /// Always starts a fresh rate-limit session; a cooldown cut short by the
    /// switch releases the busy indicator. Selecting the filter that is
    /// already active only re-runs [`load_initial`](Self::load_initial).
    pub async fn on_filter_changed(&self, visibility: Visibility) -> LoadOutcome {
        let (changed, cooldown_cut) = {
            let mut state = self.state();
            let changed = state.filter.set_visibility(visibility);
            let mut cooldown_cut = false;
            if changed {
                state.reset_view();
                cooldown_cut = state.reset_session();
            }
            (changed, cooldown_cut)
        };
        if changed {
            info!(%visibility, "feed filter changed");
        }
        if cooldown_cut {
            self.emit(vec![RenderInstruction::Loading(false)]);
        }
        self.load_initial().await
    }

    /// Replace the active tag set and load the new view.
    ///
    /// Unlike a filter switch, this keeps the current rate-limit session.
    pub async fn on_tags_changed(&self, tags: TagSet) -> LoadOutcome {
        let changed = {
            let mut state = self.state();
            let changed = state.filter.set_tags(tags.clone());
            if changed {
                state.reset_view();
            }
            changed
        };
        if changed {
            info!(%tags, "feed tags changed");
        }
        self.load_initial().await
    }

    /// Update the caller's credentials.
    ///
    /// Cached private views are dropped on any change, since they belong to
    /// whoever was signed in. If the private view is showing and the caller
    /// signed out, the view resets to the login-required state.
    pub fn set_access_token(&self, token: Option<AccessToken>) {
        let lost_view = {
            let mut state = self.state();
            let was_authenticated = state.filter.is_authenticated();
            state.filter.set_access_token(token);
            let lost = was_authenticated && !state.filter.is_valid();
            if lost {
                state.reset_view();
            }
            lost
        };
        self.inner.cache.invalidate_visibility(Visibility::Private);
        if lost_view {
            info!("signed out while viewing private feed");
            self.emit(vec![
                RenderInstruction::ClearFeed,
                RenderInstruction::ShowLoginRequired,
            ]);
        }
    }

    // ========================================================================
    // Mutations from elsewhere in the app
    // ========================================================================

    /// Show a freshly created item at the top of the active view.
    ///
    /// The item is prepended to the cached entry without touching the
    /// pagination cursor. Returns `false` if the view is not loaded or
    /// already holds the item.
    pub fn add_item_to_top(&self, image: ImageRecord) -> bool {
        let key = self.active_key();
        if !self.inner.cache.prepend(&key, image.clone()) {
            return false;
        }
        self.emit(vec![RenderInstruction::prepend(image)]);
        true
    }

    /// An item's visibility was toggled elsewhere; every cached view is
    /// stale.
    ///
    /// The rendered view stays on screen, but pagination stops until the
    /// next explicit trigger reloads it.
    pub fn on_item_visibility_toggled(&self) {
        self.inner.cache.invalidate_all();
        info!("item visibility toggled; feed cache invalidated");
    }

    /// An item was deleted elsewhere; drop it from every cached view.
    ///
    /// Returns whether the active view held it.
    pub fn remove_item(&self, id: &str) -> bool {
        let key = self.active_key();
        let shown = self
            .inner
            .cache
            .get(&key)
            .is_some_and(|entry| entry.contains(id));
        self.inner.cache.remove_image(id);
        if shown {
            self.emit(vec![RenderInstruction::RemoveFromFeed { id: id.to_string() }]);
        }
        shown
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn state(&self) -> MutexGuard<'_, FeedState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Deliver instructions to every observer, in registration order.
    fn emit(&self, instructions: Vec<RenderInstruction>) {
        for instruction in &instructions {
            for observer in &self.inner.observers {
                observer.render(instruction);
            }
        }
    }

    async fn start_initial(&self, force: bool) -> LoadOutcome {
        let mut instructions = Vec::new();
        let decided = {
            let mut state = self.state();
            self.plan_initial(&mut state, force, &mut instructions)
        };
        self.emit(instructions);
        match decided {
            Ok(outcome) => outcome.await,
            Err(outcome) => outcome,
        }
    }

    /// Decide, under the lock, how an initial load proceeds.
    ///
    /// `Ok` carries the shared in-flight outcome to await; `Err` an outcome
    /// that is already final.
    fn plan_initial(
        &self,
        state: &mut FeedState,
        force: bool,
        instructions: &mut Vec<RenderInstruction>,
    ) -> std::result::Result<SharedOutcome, LoadOutcome> {
        let key = state.filter.cache_key();

        if let Some(flight) = &state.initial_flight
            && flight.key == key
            && flight.generation == state.generation
        {
            metrics::counter!(telemetry::SINGLE_FLIGHT_JOINS_TOTAL).increment(1);
            debug!(%key, "joining in-flight initial load");
            return Ok(flight.outcome.clone());
        }

        if force {
            state.reset_view();
        }

        let token = match state.filter.credentials_for(key.visibility) {
            Ok(token) => token,
            Err(_) => {
                state.phase = FeedPhase::Idle;
                instructions.push(RenderInstruction::ClearFeed);
                instructions.push(RenderInstruction::ShowLoginRequired);
                return Err(LoadOutcome::AuthRequired);
            }
        };

        if !force
            && let Some(entry) = self.inner.cache.get(&key)
            && entry.is_loaded
        {
            debug!(%key, images = entry.len(), "initial load served from cache");
            // An in-flight page for this view still lands on top of the
            // re-rendered entry.
            if state.phase != FeedPhase::LoadingMore {
                state.phase = FeedPhase::Ready;
            }
            instructions.push(RenderInstruction::ClearFeed);
            instructions.extend(render_view(&entry));
            return Err(view_outcome(entry, true));
        }

        state.phase = FeedPhase::LoadingInitial;
        instructions.push(RenderInstruction::ClearFeed);
        instructions.push(RenderInstruction::Loading(true));

        let generation = state.generation;
        let handle = tokio::spawn(self.clone().run_initial(key.clone(), generation, token));
        let outcome = async move {
            handle.await.unwrap_or_else(|e| {
                LoadOutcome::Failed(Arc::new(VitrineError::Task(e.to_string())))
            })
        }
        .boxed()
        .shared();

        state.initial_flight = Some(InitialFlight {
            key,
            generation,
            outcome: outcome.clone(),
        });
        Ok(outcome)
    }

    async fn run_initial(
        self,
        key: CacheKey,
        generation: u64,
        token: Option<AccessToken>,
    ) -> LoadOutcome {
        let request = PageRequest {
            visibility: key.visibility,
            page: 0,
            tags: key.tags.clone(),
            token,
        };
        let result = self.fetch(&request, "initial").await;
        self.finish_initial(key, generation, result)
    }

    fn finish_initial(
        &self,
        key: CacheKey,
        generation: u64,
        result: Result<FeedPage>,
    ) -> LoadOutcome {
        let mut instructions = vec![RenderInstruction::Loading(false)];
        let outcome = {
            let mut state = self.state();
            if state
                .initial_flight
                .as_ref()
                .is_some_and(|f| f.generation == generation && f.key == key)
            {
                state.initial_flight = None;
            }

            if state.generation != generation || state.filter.cache_key() != key {
                metrics::counter!(telemetry::STALE_RESPONSES_TOTAL, "kind" => "initial")
                    .increment(1);
                debug!(%key, "discarding stale initial page");
                return LoadOutcome::Stale;
            }

            match result {
                Ok(page) => {
                    let has_more = page.has_more && !page.is_empty();
                    let entry = CacheEntry::first_page(page.images, has_more);
                    self.inner.cache.put(key, entry.clone());
                    state.phase = FeedPhase::Ready;
                    instructions.extend(render_view(&entry));
                    view_outcome(entry, false)
                }
                Err(e) => self.fail(&mut state, e, &mut instructions),
            }
        };
        self.emit(instructions);
        outcome
    }

    /// Check the pagination guards under the lock and claim the view.
    fn begin_more(&self) -> std::result::Result<MoreTicket, LoadOutcome> {
        let mut state = self.state();
        match state.phase {
            FeedPhase::Ready => {}
            FeedPhase::LoadingInitial | FeedPhase::LoadingMore => {
                return Err(LoadOutcome::Skipped(SkipReason::InFlight));
            }
            FeedPhase::Idle | FeedPhase::Error => {
                return Err(LoadOutcome::Skipped(SkipReason::NotReady));
            }
        }

        if state.limiter.is_cooling_down() {
            state.deferred_trigger = true;
            return Err(LoadOutcome::Skipped(SkipReason::CoolingDown));
        }

        let key = state.filter.cache_key();
        let Some(entry) = self.inner.cache.get(&key) else {
            debug!(%key, "active view no longer cached; waiting for reload");
            state.phase = FeedPhase::Idle;
            return Err(LoadOutcome::Skipped(SkipReason::NotReady));
        };
        if !entry.has_more {
            return Err(LoadOutcome::Skipped(SkipReason::Exhausted));
        }

        let token = state
            .filter
            .credentials_for(key.visibility)
            .map_err(|_| LoadOutcome::AuthRequired)?;

        state.phase = FeedPhase::LoadingMore;
        Ok(MoreTicket {
            key,
            page: entry.next_page,
            generation: state.generation,
            token,
        })
    }

    fn finish_more(&self, ticket: MoreTicket, result: Result<FeedPage>) -> LoadOutcome {
        let mut instructions = Vec::new();
        let mut cooldown = None;
        let outcome = {
            let mut state = self.state();
            if state.generation != ticket.generation || state.filter.cache_key() != ticket.key {
                metrics::counter!(telemetry::STALE_RESPONSES_TOTAL, "kind" => "more")
                    .increment(1);
                debug!(key = %ticket.key, page = ticket.page, "discarding stale page");
                return LoadOutcome::Stale;
            }

            match result {
                Ok(page) => {
                    let has_more = page.has_more && !page.is_empty();
                    let added = self.inner.cache.append(&ticket.key, page.images);
                    if !self
                        .inner
                        .cache
                        .set_pagination(&ticket.key, ticket.page + 1, has_more)
                    {
                        // Entry dropped while the page was in flight
                        debug!(
                            key = %ticket.key,
                            page = ticket.page,
                            "cache entry gone, page dropped"
                        );
                        state.phase = FeedPhase::Idle;
                        instructions.push(RenderInstruction::Loading(false));
                        drop(state);
                        self.emit(instructions);
                        return LoadOutcome::Skipped(SkipReason::NotReady);
                    }
                    state.phase = FeedPhase::Ready;

                    let session = state.session;
                    cooldown = state.limiter.record_page().map(|length| (length, session));
                    if cooldown.is_none() {
                        instructions.push(RenderInstruction::Loading(false));
                    }
                    instructions.extend(added.iter().cloned().map(RenderInstruction::append));
                    if !has_more {
                        instructions.push(RenderInstruction::EndOfFeed);
                    }
                    LoadOutcome::Loaded {
                        images: added,
                        has_more,
                        from_cache: false,
                    }
                }
                Err(e) => {
                    instructions.push(RenderInstruction::Loading(false));
                    self.fail(&mut state, e, &mut instructions)
                }
            }
        };

        if let Some((length, session)) = cooldown {
            metrics::counter!(telemetry::COOLDOWNS_TOTAL).increment(1);
            info!(cooldown_ms = length.as_millis() as u64, "pagination cooling down");
            self.schedule_cooldown_end(length, session);
        }
        self.emit(instructions);
        outcome
    }

    /// Move the view into its failure state and queue the matching render.
    fn fail(
        &self,
        state: &mut FeedState,
        error: VitrineError,
        instructions: &mut Vec<RenderInstruction>,
    ) -> LoadOutcome {
        if matches!(error, VitrineError::AuthRequired) {
            state.phase = FeedPhase::Idle;
            instructions.push(RenderInstruction::ShowLoginRequired);
            return LoadOutcome::AuthRequired;
        }
        warn!(error = %error, "feed load failed");
        state.phase = FeedPhase::Error;
        instructions.push(RenderInstruction::ShowError {
            message: error.to_string(),
        });
        LoadOutcome::Failed(Arc::new(error))
    }

    /// Fetch one page with the request deadline applied.
    async fn fetch(&self, request: &PageRequest, kind: &'static str) -> Result<FeedPage> {
        let start = Instant::now();
        let timeout = self.inner.request_timeout;
        let result = match tokio::time::timeout(timeout, self.inner.fetcher.fetch_page(request)).await
        {
            Ok(result) => result,
            Err(_) => Err(VitrineError::Timeout(timeout)),
        };

        let status = if result.is_ok() { "ok" } else { "error" };
        metrics::counter!(telemetry::PAGES_FETCHED_TOTAL, "kind" => kind, "status" => status)
            .increment(1);
        metrics::histogram!(telemetry::FETCH_DURATION_SECONDS, "kind" => kind)
            .record(start.elapsed().as_secs_f64());
        result
    }

    fn schedule_cooldown_end(&self, length: Duration, session: u64) {
        let this = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(length).await;
            this.on_cooldown_elapsed(session).await;
        });
    }

    /// Re-enable pagination after a cooldown and replay a refused trigger
    /// if the viewport is still at the end.
    async fn on_cooldown_elapsed(&self, session: u64) {
        let replay = {
            let mut state = self.state();
            if state.session != session {
                return;
            }
            mem::take(&mut state.deferred_trigger)
        };
        self.emit(vec![RenderInstruction::Loading(false)]);

        let still_near_end = self
            .inner
            .viewport
            .as_ref()
            .is_none_or(|probe| probe.is_near_end());
        if replay && still_near_end {
            debug!("replaying scroll trigger deferred by cooldown");
            self.load_more().await;
        }
    }
}

/// Render instructions for a whole view (after `ClearFeed`).
fn render_view(entry: &CacheEntry) -> Vec<RenderInstruction> {
    if entry.is_empty() {
        return vec![RenderInstruction::ShowNoResults];
    }
    let mut instructions: Vec<_> = entry
        .images
        .iter()
        .cloned()
        .map(RenderInstruction::append)
        .collect();
    if !entry.has_more {
        instructions.push(RenderInstruction::EndOfFeed);
    }
    instructions
}

fn view_outcome(entry: CacheEntry, from_cache: bool) -> LoadOutcome {
    if entry.is_empty() {
        return LoadOutcome::NoResults;
    }
    LoadOutcome::Loaded {
        images: entry.images,
        has_more: entry.has_more,
        from_cache,
    }
}
