// SPDX-FileCopyrightText: 2026 Carelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The collection cache shared by the orchestration hub.
//!
//! A fixed-shape store: one slot per (channel, collection) pair for schedules
//! and templates, seeded up front, plus history entries keyed by channel and
//! serialized filter so differently-filtered queries never collide. Owned by
//! the hub and passed by reference; nothing else writes it.

use std::time::Duration;

use carelay_core::{ChannelKind, HistoryFilter, HistoryRecord, Schedule, Template};
use tracing::debug;

use crate::ttl::TtlMap;

/// Cache of the per-channel collections, all sharing one TTL.
pub struct CollectionCache {
    schedules: TtlMap<ChannelKind, Vec<Schedule>>,
    templates: TtlMap<ChannelKind, Vec<Template>>,
    history: TtlMap<(ChannelKind, String), Vec<HistoryRecord>>,
}

impl CollectionCache {
    /// Creates the cache with its six fixed collection slots seeded empty.
    pub fn new(ttl: Duration) -> Self {
        let cache = Self {
            schedules: TtlMap::new(ttl),
            templates: TtlMap::new(ttl),
            history: TtlMap::new(ttl),
        };
        for kind in ChannelKind::ALL {
            cache.schedules.seed(kind);
            cache.templates.seed(kind);
        }
        cache
    }

    pub fn ttl(&self) -> Duration {
        self.schedules.ttl()
    }

    pub fn schedules(&self, kind: ChannelKind) -> Option<Vec<Schedule>> {
        let hit = self.schedules.get(&kind);
        record_lookup("schedules", kind, hit.is_some());
        hit
    }

    pub fn set_schedules(&self, kind: ChannelKind, data: Vec<Schedule>) {
        self.schedules.set(kind, data);
    }

    pub fn invalidate_schedules(&self, kind: ChannelKind) {
        debug!(channel = %kind, "invalidating schedule cache");
        self.schedules.invalidate(&kind);
    }

    pub fn templates(&self, kind: ChannelKind) -> Option<Vec<Template>> {
        let hit = self.templates.get(&kind);
        record_lookup("templates", kind, hit.is_some());
        hit
    }

    pub fn set_templates(&self, kind: ChannelKind, data: Vec<Template>) {
        self.templates.set(kind, data);
    }

    pub fn invalidate_templates(&self, kind: ChannelKind) {
        debug!(channel = %kind, "invalidating template cache");
        self.templates.invalidate(&kind);
    }

    pub fn history(&self, kind: ChannelKind, filter: &HistoryFilter) -> Option<Vec<HistoryRecord>> {
        let hit = self.history.get(&(kind, filter.cache_suffix()));
        record_lookup("history", kind, hit.is_some());
        hit
    }

    pub fn set_history(&self, kind: ChannelKind, filter: &HistoryFilter, data: Vec<HistoryRecord>) {
        self.history.set((kind, filter.cache_suffix()), data);
    }

    /// Drops every cached history page for `kind`, whatever its filter.
    pub fn invalidate_history(&self, kind: ChannelKind) {
        debug!(channel = %kind, "dropping history cache entries");
        self.history.remove_matching(|key| key.0 == kind);
    }

    /// Invalidates everything belonging to one channel.
    pub fn invalidate_channel(&self, kind: ChannelKind) {
        self.invalidate_schedules(kind);
        self.invalidate_templates(kind);
        self.invalidate_history(kind);
    }

    /// Resets the store to its initial shape: the six fixed slots emptied,
    /// all filter-suffixed history entries dropped.
    pub fn clear(&self) {
        debug!("clearing collection cache");
        for kind in ChannelKind::ALL {
            self.schedules.invalidate(&kind);
            self.templates.invalidate(&kind);
        }
        self.history.clear();
    }

    /// Number of history entries currently held, across all channels.
    pub fn history_entry_count(&self) -> usize {
        self.history.len()
    }
}

fn record_lookup(collection: &'static str, kind: ChannelKind, hit: bool) {
    let name = if hit {
        "carelay_cache_hits_total"
    } else {
        "carelay_cache_misses_total"
    };
    metrics::counter!(name, "collection" => collection, "channel" => kind.base_path())
        .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use carelay_core::{DeliveryStatus, MessageId, ScheduleId, TemplateId};
    use chrono::Utc;

    const TTL: Duration = Duration::from_secs(60);

    fn schedule(id: &str) -> Schedule {
        Schedule {
            id: ScheduleId(id.into()),
            recipients: vec!["+15550001111".into()],
            message: "checkup reminder".into(),
            subject: None,
            cc: Vec::new(),
            bcc: Vec::new(),
            scheduled_time: Utc::now(),
            recurrence: Default::default(),
            template_id: None,
            is_active: true,
        }
    }

    fn template(id: &str) -> Template {
        Template {
            id: TemplateId(id.into()),
            name: "reminder".into(),
            content: "hello".into(),
            subject: None,
            action_type: None,
            auto_send: false,
        }
    }

    fn record(id: &str) -> HistoryRecord {
        HistoryRecord {
            id: MessageId(id.into()),
            recipients: vec!["+15550001111".into()],
            subject: None,
            message: None,
            status: DeliveryStatus::Sent,
            sent_at: Utc::now(),
            template_id: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slots_start_seeded_but_invalid() {
        let cache = CollectionCache::new(TTL);
        for kind in ChannelKind::ALL {
            assert!(cache.schedules(kind).is_none());
            assert!(cache.templates(kind).is_none());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn collections_are_independent_per_channel() {
        let cache = CollectionCache::new(TTL);
        cache.set_schedules(ChannelKind::WhatsApp, vec![schedule("s1")]);

        assert_eq!(cache.schedules(ChannelKind::WhatsApp).unwrap().len(), 1);
        assert!(cache.schedules(ChannelKind::Email).is_none());
        assert!(cache.templates(ChannelKind::WhatsApp).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn differently_filtered_history_never_collides() {
        let cache = CollectionCache::new(TTL);
        let fifty = HistoryFilter {
            limit: Some(50),
            ..Default::default()
        };
        let ten = HistoryFilter {
            limit: Some(10),
            ..Default::default()
        };

        cache.set_history(ChannelKind::Sms, &fifty, vec![record("m1"), record("m2")]);

        assert_eq!(cache.history(ChannelKind::Sms, &fifty).unwrap().len(), 2);
        assert!(cache.history(ChannelKind::Sms, &ten).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn invalidate_history_only_touches_one_channel() {
        let cache = CollectionCache::new(TTL);
        let filter = HistoryFilter::default();
        cache.set_history(ChannelKind::Sms, &filter, vec![record("m1")]);
        cache.set_history(ChannelKind::Email, &filter, vec![record("m2")]);

        cache.invalidate_history(ChannelKind::Sms);

        assert!(cache.history(ChannelKind::Sms, &filter).is_none());
        assert_eq!(cache.history(ChannelKind::Email, &filter).unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn mutation_style_invalidation_beats_ttl() {
        let cache = CollectionCache::new(TTL);
        cache.set_templates(ChannelKind::Email, vec![template("t1")]);
        assert!(cache.templates(ChannelKind::Email).is_some());

        // Well within the TTL window, but a mutation invalidated the slot.
        tokio::time::advance(Duration::from_secs(5)).await;
        cache.invalidate_templates(ChannelKind::Email);
        assert!(cache.templates(ChannelKind::Email).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn clear_restores_the_initial_shape() {
        let cache = CollectionCache::new(TTL);
        cache.set_schedules(ChannelKind::WhatsApp, vec![schedule("s1")]);
        cache.set_templates(ChannelKind::Email, vec![template("t1")]);
        cache.set_history(ChannelKind::Sms, &HistoryFilter::default(), vec![record("m1")]);

        cache.clear();

        for kind in ChannelKind::ALL {
            assert!(cache.schedules(kind).is_none());
            assert!(cache.templates(kind).is_none());
        }
        assert_eq!(cache.history_entry_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_the_ttl() {
        let cache = CollectionCache::new(TTL);
        cache.set_schedules(ChannelKind::Sms, vec![schedule("s1")]);

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(cache.schedules(ChannelKind::Sms).is_none());
    }
}
