// SPDX-FileCopyrightText: 2026 Carelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The orchestration hub.
//!
//! [`MessagingHub`] owns the three channel clients, the TTL cache, and the
//! in-memory collections, and enforces the two disciplines every caller gets
//! for free:
//!
//! - **Reads are fail-soft.** A fetch serves a valid cache entry with zero
//!   network calls unless forced; on any failure it logs, records the error,
//!   and returns an empty vector. No partial payload is ever adopted.
//! - **Writes are fail-loud.** A mutation is guarded against duplicate
//!   submission, invalidates the owning collection on success, force-refreshes
//!   it so the next read reflects the backend's answer, and emits a notice
//!   either way. There is no optimistic local flip.

use std::sync::Arc;
use std::time::{Duration, Instant};

use carelay_cache::CollectionCache;
use carelay_channel::{ActionClient, ChannelClient};
use carelay_config::model::{CarelayConfig, RefreshConfig};
use carelay_core::types::{
    ActionDispatch, ActionTrigger, ConnectionStatus, MessageDraft, Schedule, ScheduleDraft,
    ScheduleId, SendReceipt, Template, TemplateDraft, TemplateId,
};
use carelay_core::{CarelayError, ChannelKind, HistoryFilter, HistoryRecord, Recurrence};
use carelay_http::ApiClient;
use tokio::sync::{Mutex, RwLock, broadcast};
use tracing::{debug, info};

use crate::guard::{ActionRegistry, LoadingCounter};
use crate::notify::{Notice, NoticeSender};
use crate::refresh::{RefreshHandle, spawn_refresher};
use crate::state::{self, Freshness, HubState};

const NOTICE_CAPACITY: usize = 32;

/// Shared internals, also held by the background refresher task.
pub(crate) struct HubCore {
    clients: [ChannelClient; 3],
    actions: ActionClient,
    cache: CollectionCache,
    state: HubState,
    loading: LoadingCounter,
    inflight: ActionRegistry,
    notices: NoticeSender,
    last_error: RwLock<Option<String>>,
    pub(crate) enabled: Vec<ChannelKind>,
}

impl HubCore {
    fn client(&self, kind: ChannelKind) -> &ChannelClient {
        match kind {
            ChannelKind::WhatsApp => &self.clients[0],
            ChannelKind::Email => &self.clients[1],
            ChannelKind::Sms => &self.clients[2],
        }
    }

    async fn record_error(&self, error: &CarelayError) {
        *self.last_error.write().await = Some(error.to_string());
    }

    pub(crate) async fn fetch_schedules(&self, kind: ChannelKind, force: bool) -> Vec<Schedule> {
        if !force && let Some(cached) = self.cache.schedules(kind) {
            debug!(channel = %kind, "serving schedules from cache");
            self.state.adopt_schedules(kind, cached.clone()).await;
            return cached;
        }

        self.state
            .set_schedules_freshness(kind, Freshness::Fetching)
            .await;
        let _load = self.loading.begin();
        match self.client(kind).schedules().await {
            Ok(items) => {
                self.cache.set_schedules(kind, items.clone());
                self.state.adopt_schedules(kind, items.clone()).await;
                items
            }
            Err(e) => {
                debug!(channel = %kind, error = %e, "schedule fetch failed, returning empty");
                self.record_error(&e).await;
                self.state
                    .set_schedules_freshness(kind, Freshness::Stale)
                    .await;
                Vec::new()
            }
        }
    }

    async fn fetch_templates(&self, kind: ChannelKind, force: bool) -> Vec<Template> {
        if !force && let Some(cached) = self.cache.templates(kind) {
            debug!(channel = %kind, "serving templates from cache");
            self.state.adopt_templates(kind, cached.clone()).await;
            return cached;
        }

        self.state
            .set_templates_freshness(kind, Freshness::Fetching)
            .await;
        let _load = self.loading.begin();
        match self.client(kind).templates().await {
            Ok(items) => {
                self.cache.set_templates(kind, items.clone());
                self.state.adopt_templates(kind, items.clone()).await;
                items
            }
            Err(e) => {
                debug!(channel = %kind, error = %e, "template fetch failed, returning empty");
                self.record_error(&e).await;
                self.state
                    .set_templates_freshness(kind, Freshness::Stale)
                    .await;
                Vec::new()
            }
        }
    }

    async fn fetch_history(
        &self,
        kind: ChannelKind,
        filter: &HistoryFilter,
        force: bool,
    ) -> Vec<HistoryRecord> {
        if !force && let Some(cached) = self.cache.history(kind, filter) {
            debug!(channel = %kind, "serving history from cache");
            self.state.adopt_history(kind, cached.clone()).await;
            return cached;
        }

        let _load = self.loading.begin();
        match self.client(kind).history(filter).await {
            Ok(items) => {
                self.cache.set_history(kind, filter, items.clone());
                self.state.adopt_history(kind, items.clone()).await;
                items
            }
            Err(e) => {
                debug!(channel = %kind, error = %e, "history fetch failed, returning empty");
                self.record_error(&e).await;
                Vec::new()
            }
        }
    }

    async fn refresh_after_schedule_mutation(&self, kind: ChannelKind) {
        self.cache.invalidate_schedules(kind);
        self.fetch_schedules(kind, true).await;
    }

    async fn refresh_after_template_mutation(&self, kind: ChannelKind) {
        self.cache.invalidate_templates(kind);
        self.fetch_templates(kind, true).await;
    }

    async fn refresh_after_send(&self, kind: ChannelKind) {
        self.cache.invalidate_history(kind);
        self.fetch_history(kind, &HistoryFilter::default(), true).await;
    }

    async fn probe(&self, kind: ChannelKind) -> ConnectionStatus {
        match self.client(kind).test_connection().await {
            Ok(status) => status,
            Err(e) => {
                self.record_error(&e).await;
                ConnectionStatus {
                    connected: false,
                    detail: Some(e.to_string()),
                    provider: None,
                }
            }
        }
    }
}

/// Orchestrates the channel clients behind the cache and collection state.
pub struct MessagingHub {
    core: Arc<HubCore>,
    refresh: RefreshConfig,
    refresher: Mutex<Option<RefreshHandle>>,
}

impl MessagingHub {
    pub fn new(config: &CarelayConfig, api: Arc<ApiClient>) -> Self {
        let clients = ChannelKind::ALL.map(|kind| ChannelClient::new(api.clone(), kind));
        let core = Arc::new(HubCore {
            clients,
            actions: ActionClient::new(api),
            cache: CollectionCache::new(Duration::from_secs(config.cache.ttl_secs)),
            state: HubState::new(),
            loading: LoadingCounter::new(),
            inflight: ActionRegistry::new(),
            notices: NoticeSender::new(NOTICE_CAPACITY),
            last_error: RwLock::new(None),
            enabled: config.channels.enabled(),
        });
        Self {
            core,
            refresh: config.refresh.clone(),
            refresher: Mutex::new(None),
        }
    }

    /// Channels this hub serves, per configuration.
    pub fn channels(&self) -> &[ChannelKind] {
        &self.core.enabled
    }

    // ---- reads -------------------------------------------------------------

    /// Schedules for one channel, cache-first unless `force`.
    pub async fn schedules(&self, kind: ChannelKind, force: bool) -> Vec<Schedule> {
        self.core.fetch_schedules(kind, force).await
    }

    /// Templates for one channel, cache-first unless `force`.
    pub async fn templates(&self, kind: ChannelKind, force: bool) -> Vec<Template> {
        self.core.fetch_templates(kind, force).await
    }

    /// Delivery history for one channel and filter, cache-first unless `force`.
    pub async fn history(
        &self,
        kind: ChannelKind,
        filter: &HistoryFilter,
        force: bool,
    ) -> Vec<HistoryRecord> {
        self.core.fetch_history(kind, filter, force).await
    }

    /// Loads schedules and templates for every enabled channel concurrently.
    /// Each load is independently fail-soft; history loads lazily on demand.
    pub async fn prime(&self) {
        let schedules = futures::future::join_all(
            self.core
                .enabled
                .iter()
                .map(|&kind| self.core.fetch_schedules(kind, false)),
        );
        let templates = futures::future::join_all(
            self.core
                .enabled
                .iter()
                .map(|&kind| self.core.fetch_templates(kind, false)),
        );
        tokio::join!(schedules, templates);
        info!(channels = self.core.enabled.len(), "collections primed");
    }

    // ---- state snapshots and derived views ---------------------------------

    /// Currently adopted schedules, without any fetch.
    pub async fn schedules_snapshot(&self, kind: ChannelKind) -> Vec<Schedule> {
        self.core.state.schedules(kind).await
    }

    /// Currently adopted templates, without any fetch.
    pub async fn templates_snapshot(&self, kind: ChannelKind) -> Vec<Template> {
        self.core.state.templates(kind).await
    }

    /// Most recently adopted history page, without any fetch.
    pub async fn history_snapshot(&self, kind: ChannelKind) -> Vec<HistoryRecord> {
        self.core.state.history(kind).await
    }

    pub async fn schedules_freshness(&self, kind: ChannelKind) -> Freshness {
        self.core.state.schedules_freshness(kind).await
    }

    pub async fn templates_freshness(&self, kind: ChannelKind) -> Freshness {
        self.core.state.templates_freshness(kind).await
    }

    /// Armed schedules. Pure filter over current state, no I/O.
    pub async fn active_schedules(&self, kind: ChannelKind) -> Vec<Schedule> {
        state::active_schedules(&self.core.state.schedules(kind).await)
    }

    /// Paused schedules. Pure filter over current state, no I/O.
    pub async fn inactive_schedules(&self, kind: ChannelKind) -> Vec<Schedule> {
        state::inactive_schedules(&self.core.state.schedules(kind).await)
    }

    /// Schedules with the given recurrence. Pure filter over current state.
    pub async fn schedules_by_recurrence(
        &self,
        kind: ChannelKind,
        recurrence: Recurrence,
    ) -> Vec<Schedule> {
        state::schedules_by_recurrence(&self.core.state.schedules(kind).await, recurrence)
    }

    // ---- mutations ---------------------------------------------------------

    /// Sends a message immediately.
    pub async fn send(
        &self,
        kind: ChannelKind,
        draft: &MessageDraft,
    ) -> Result<SendReceipt, CarelayError> {
        let core = &self.core;
        let _action = core.inflight.begin(format!("{kind}:send"))?;
        let _load = core.loading.begin();
        match core.client(kind).send(draft).await {
            Ok(receipt) => {
                core.refresh_after_send(kind).await;
                core.notices.info(format!("{kind}: message sent"));
                Ok(receipt)
            }
            Err(e) => {
                core.record_error(&e).await;
                core.notices.error(format!("{kind}: send failed: {e}"));
                Err(e)
            }
        }
    }

    /// Creates a schedule and force-refreshes the schedule collection.
    pub async fn create_schedule(
        &self,
        kind: ChannelKind,
        draft: &ScheduleDraft,
    ) -> Result<Option<Schedule>, CarelayError> {
        let core = &self.core;
        let _action = core.inflight.begin(format!("{kind}:create-schedule"))?;
        let _load = core.loading.begin();
        match core.client(kind).create_schedule(draft).await {
            Ok(created) => {
                core.refresh_after_schedule_mutation(kind).await;
                core.notices.info(format!("{kind}: schedule created"));
                Ok(created)
            }
            Err(e) => {
                core.record_error(&e).await;
                core.notices
                    .error(format!("{kind}: schedule create failed: {e}"));
                Err(e)
            }
        }
    }

    /// Replaces a schedule and force-refreshes the schedule collection.
    pub async fn update_schedule(
        &self,
        kind: ChannelKind,
        id: &ScheduleId,
        draft: &ScheduleDraft,
    ) -> Result<Option<Schedule>, CarelayError> {
        let core = &self.core;
        let _action = core
            .inflight
            .begin(format!("{kind}:update-schedule:{}", id.0))?;
        let _load = core.loading.begin();
        match core.client(kind).update_schedule(id, draft).await {
            Ok(updated) => {
                core.refresh_after_schedule_mutation(kind).await;
                core.notices
                    .info(format!("{kind}: schedule {} updated", id.0));
                Ok(updated)
            }
            Err(e) => {
                core.record_error(&e).await;
                core.notices
                    .error(format!("{kind}: schedule update failed: {e}"));
                Err(e)
            }
        }
    }

    /// Deletes a schedule and force-refreshes the schedule collection.
    pub async fn delete_schedule(
        &self,
        kind: ChannelKind,
        id: &ScheduleId,
    ) -> Result<(), CarelayError> {
        let core = &self.core;
        let _action = core
            .inflight
            .begin(format!("{kind}:delete-schedule:{}", id.0))?;
        let _load = core.loading.begin();
        match core.client(kind).delete_schedule(id).await {
            Ok(()) => {
                core.refresh_after_schedule_mutation(kind).await;
                core.notices
                    .info(format!("{kind}: schedule {} deleted", id.0));
                Ok(())
            }
            Err(e) => {
                core.record_error(&e).await;
                core.notices
                    .error(format!("{kind}: schedule delete failed: {e}"));
                Err(e)
            }
        }
    }

    /// Flips a schedule's active flag and force-refreshes the collection.
    pub async fn toggle_schedule(
        &self,
        kind: ChannelKind,
        id: &ScheduleId,
        active: bool,
    ) -> Result<(), CarelayError> {
        let core = &self.core;
        let _action = core
            .inflight
            .begin(format!("{kind}:toggle-schedule:{}", id.0))?;
        let _load = core.loading.begin();
        match core.client(kind).toggle_schedule(id, active).await {
            Ok(()) => {
                core.refresh_after_schedule_mutation(kind).await;
                let verb = if active { "resumed" } else { "paused" };
                core.notices
                    .info(format!("{kind}: schedule {} {verb}", id.0));
                Ok(())
            }
            Err(e) => {
                core.record_error(&e).await;
                core.notices
                    .error(format!("{kind}: schedule toggle failed: {e}"));
                Err(e)
            }
        }
    }

    /// Creates a template and force-refreshes the template collection.
    pub async fn create_template(
        &self,
        kind: ChannelKind,
        draft: &TemplateDraft,
    ) -> Result<Option<Template>, CarelayError> {
        let core = &self.core;
        let _action = core.inflight.begin(format!("{kind}:create-template"))?;
        let _load = core.loading.begin();
        match core.client(kind).create_template(draft).await {
            Ok(created) => {
                core.refresh_after_template_mutation(kind).await;
                core.notices.info(format!("{kind}: template created"));
                Ok(created)
            }
            Err(e) => {
                core.record_error(&e).await;
                core.notices
                    .error(format!("{kind}: template create failed: {e}"));
                Err(e)
            }
        }
    }

    /// Replaces a template and force-refreshes the template collection.
    pub async fn update_template(
        &self,
        kind: ChannelKind,
        id: &TemplateId,
        draft: &TemplateDraft,
    ) -> Result<Option<Template>, CarelayError> {
        let core = &self.core;
        let _action = core
            .inflight
            .begin(format!("{kind}:update-template:{}", id.0))?;
        let _load = core.loading.begin();
        match core.client(kind).update_template(id, draft).await {
            Ok(updated) => {
                core.refresh_after_template_mutation(kind).await;
                core.notices
                    .info(format!("{kind}: template {} updated", id.0));
                Ok(updated)
            }
            Err(e) => {
                core.record_error(&e).await;
                core.notices
                    .error(format!("{kind}: template update failed: {e}"));
                Err(e)
            }
        }
    }

    /// Deletes a template and force-refreshes the template collection.
    pub async fn delete_template(
        &self,
        kind: ChannelKind,
        id: &TemplateId,
    ) -> Result<(), CarelayError> {
        let core = &self.core;
        let _action = core
            .inflight
            .begin(format!("{kind}:delete-template:{}", id.0))?;
        let _load = core.loading.begin();
        match core.client(kind).delete_template(id).await {
            Ok(()) => {
                core.refresh_after_template_mutation(kind).await;
                core.notices
                    .info(format!("{kind}: template {} deleted", id.0));
                Ok(())
            }
            Err(e) => {
                core.record_error(&e).await;
                core.notices
                    .error(format!("{kind}: template delete failed: {e}"));
                Err(e)
            }
        }
    }

    /// Fires a templated send for a system action.
    pub async fn dispatch_action(
        &self,
        action: &ActionDispatch,
    ) -> Result<SendReceipt, CarelayError> {
        let core = &self.core;
        let _guard = core
            .inflight
            .begin(format!("{}:action:{}", action.channel, action.action_type))?;
        let _load = core.loading.begin();
        match core.actions.dispatch(action).await {
            Ok(receipt) => {
                core.refresh_after_send(action.channel).await;
                core.notices.info(format!(
                    "{}: action {} dispatched",
                    action.channel, action.action_type
                ));
                Ok(receipt)
            }
            Err(e) => {
                core.record_error(&e).await;
                core.notices.error(format!(
                    "{}: action {} failed: {e}",
                    action.channel, action.action_type
                ));
                Err(e)
            }
        }
    }

    /// Lists the system action types. Uncached read; errors propagate.
    pub async fn action_triggers(&self) -> Result<Vec<ActionTrigger>, CarelayError> {
        let _load = self.core.loading.begin();
        match self.core.actions.triggers().await {
            Ok(triggers) => Ok(triggers),
            Err(e) => {
                self.core.record_error(&e).await;
                Err(e)
            }
        }
    }

    /// Probes connectivity for one channel. A failed probe reports as a
    /// disconnected status instead of an error.
    pub async fn check_connection(&self, kind: ChannelKind) -> ConnectionStatus {
        self.core.probe(kind).await
    }

    /// Probes connectivity for every enabled channel concurrently. Each
    /// probe is timed on its own, not as part of the batch.
    pub async fn check_connections(&self) -> Vec<(ChannelKind, ConnectionStatus, Duration)> {
        let probes = self.core.enabled.iter().map(|&kind| async move {
            let start = Instant::now();
            let status = self.core.probe(kind).await;
            (kind, status, start.elapsed())
        });
        futures::future::join_all(probes).await
    }

    // ---- observation -------------------------------------------------------

    /// Subscribes to action notices.
    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.core.notices.subscribe()
    }

    /// True while any operation is touching the network.
    pub fn is_loading(&self) -> bool {
        self.core.loading.is_loading()
    }

    /// Message of the most recent failure, if any.
    pub async fn last_error(&self) -> Option<String> {
        self.core.last_error.read().await.clone()
    }

    /// Drops all cached and adopted collections. Used on logout.
    pub async fn clear(&self) {
        self.core.cache.clear();
        self.core.state.clear().await;
        *self.core.last_error.write().await = None;
    }

    // ---- background refresh ------------------------------------------------

    /// Starts the periodic schedule refresher. A disabled refresher is a
    /// no-op; a second start while one is running is rejected.
    pub async fn start_refresh(&self) -> Result<(), CarelayError> {
        if !self.refresh.enabled {
            info!("background refresh disabled by configuration");
            return Ok(());
        }

        let mut slot = self.refresher.lock().await;
        if slot.is_some() {
            return Err(CarelayError::Internal(
                "background refresh is already running".into(),
            ));
        }

        let interval = Duration::from_secs(self.refresh.interval_secs);
        *slot = Some(spawn_refresher(self.core.clone(), interval));
        info!(interval_secs = self.refresh.interval_secs, "background refresh started");
        Ok(())
    }

    /// Cancels the refresher and waits for it to wind down.
    pub async fn stop_refresh(&self) {
        let handle = self.refresher.lock().await.take();
        if let Some(handle) = handle {
            handle.shutdown().await;
            info!("background refresh stopped");
        }
    }

    pub async fn is_refreshing(&self) -> bool {
        self.refresher.lock().await.is_some()
    }
}

impl Drop for MessagingHub {
    fn drop(&mut self) {
        // Cannot await in drop; cancel and let the task wind down on its own.
        if let Ok(mut slot) = self.refresher.try_lock()
            && let Some(handle) = slot.take()
        {
            handle.cancel();
        }
    }
}
