// SPDX-FileCopyrightText: 2026 Carelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory collection state.
//!
//! One slot per channel, each holding the adopted schedules, templates, and
//! most recent history page. Every collection tracks its freshness: stale
//! until the first successful fetch, fetching while a network load is in
//! progress, fresh after adoption. A failed fetch reverts to stale and leaves
//! the previously adopted items untouched.

use carelay_core::{ChannelKind, HistoryRecord, Recurrence, Schedule, Template};
use tokio::sync::RwLock;

/// Lifecycle of one in-memory collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Freshness {
    #[default]
    Stale,
    Fetching,
    Fresh,
}

#[derive(Debug)]
struct CollectionSlot<T> {
    items: Vec<T>,
    freshness: Freshness,
}

// Derived Default would demand `T: Default`; the slot only needs an empty vec.
impl<T> Default for CollectionSlot<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            freshness: Freshness::Stale,
        }
    }
}

impl<T> CollectionSlot<T> {
    fn adopt(&mut self, items: Vec<T>) {
        self.items = items;
        self.freshness = Freshness::Fresh;
    }
}

#[derive(Debug, Default)]
struct ChannelSlot {
    schedules: CollectionSlot<Schedule>,
    templates: CollectionSlot<Template>,
    history: Vec<HistoryRecord>,
}

/// The hub's view of all channel collections.
#[derive(Debug, Default)]
pub struct HubState {
    whatsapp: RwLock<ChannelSlot>,
    email: RwLock<ChannelSlot>,
    sms: RwLock<ChannelSlot>,
}

impl HubState {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, kind: ChannelKind) -> &RwLock<ChannelSlot> {
        match kind {
            ChannelKind::WhatsApp => &self.whatsapp,
            ChannelKind::Email => &self.email,
            ChannelKind::Sms => &self.sms,
        }
    }

    pub async fn schedules(&self, kind: ChannelKind) -> Vec<Schedule> {
        self.slot(kind).read().await.schedules.items.clone()
    }

    pub async fn templates(&self, kind: ChannelKind) -> Vec<Template> {
        self.slot(kind).read().await.templates.items.clone()
    }

    pub async fn history(&self, kind: ChannelKind) -> Vec<HistoryRecord> {
        self.slot(kind).read().await.history.clone()
    }

    pub async fn schedules_freshness(&self, kind: ChannelKind) -> Freshness {
        self.slot(kind).read().await.schedules.freshness
    }

    pub async fn templates_freshness(&self, kind: ChannelKind) -> Freshness {
        self.slot(kind).read().await.templates.freshness
    }

    pub async fn adopt_schedules(&self, kind: ChannelKind, items: Vec<Schedule>) {
        self.slot(kind).write().await.schedules.adopt(items);
    }

    pub async fn adopt_templates(&self, kind: ChannelKind, items: Vec<Template>) {
        self.slot(kind).write().await.templates.adopt(items);
    }

    pub async fn adopt_history(&self, kind: ChannelKind, items: Vec<HistoryRecord>) {
        self.slot(kind).write().await.history = items;
    }

    pub async fn set_schedules_freshness(&self, kind: ChannelKind, freshness: Freshness) {
        self.slot(kind).write().await.schedules.freshness = freshness;
    }

    pub async fn set_templates_freshness(&self, kind: ChannelKind, freshness: Freshness) {
        self.slot(kind).write().await.templates.freshness = freshness;
    }

    /// Drops every adopted collection and returns all slots to stale.
    pub async fn clear(&self) {
        for kind in ChannelKind::ALL {
            *self.slot(kind).write().await = ChannelSlot::default();
        }
    }
}

/// Schedules currently armed to fire. Pure filter, no I/O.
pub fn active_schedules(schedules: &[Schedule]) -> Vec<Schedule> {
    schedules.iter().filter(|s| s.is_active).cloned().collect()
}

/// Schedules that are paused. Pure filter, no I/O.
pub fn inactive_schedules(schedules: &[Schedule]) -> Vec<Schedule> {
    schedules.iter().filter(|s| !s.is_active).cloned().collect()
}

/// Schedules with the given recurrence. Pure filter, no I/O.
pub fn schedules_by_recurrence(schedules: &[Schedule], recurrence: Recurrence) -> Vec<Schedule> {
    schedules
        .iter()
        .filter(|s| s.recurrence == recurrence)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use carelay_core::ScheduleId;
    use chrono::Utc;

    fn schedule(id: &str, active: bool, recurrence: Recurrence) -> Schedule {
        Schedule {
            id: ScheduleId(id.into()),
            recipients: vec!["+15550001111".into()],
            message: "reminder".into(),
            subject: None,
            cc: Vec::new(),
            bcc: Vec::new(),
            scheduled_time: Utc::now(),
            recurrence,
            template_id: None,
            is_active: active,
        }
    }

    #[tokio::test]
    async fn slots_start_stale_and_empty() {
        let state = HubState::new();
        for kind in ChannelKind::ALL {
            assert!(state.schedules(kind).await.is_empty());
            assert_eq!(state.schedules_freshness(kind).await, Freshness::Stale);
        }
    }

    #[tokio::test]
    async fn adoption_marks_fresh_and_is_per_channel() {
        let state = HubState::new();
        state
            .adopt_schedules(ChannelKind::Sms, vec![schedule("s1", true, Recurrence::Once)])
            .await;

        assert_eq!(state.schedules(ChannelKind::Sms).await.len(), 1);
        assert_eq!(
            state.schedules_freshness(ChannelKind::Sms).await,
            Freshness::Fresh
        );
        assert!(state.schedules(ChannelKind::Email).await.is_empty());
        assert_eq!(
            state.schedules_freshness(ChannelKind::Email).await,
            Freshness::Stale
        );
    }

    #[tokio::test]
    async fn failed_fetch_reverts_to_stale_keeping_items() {
        let state = HubState::new();
        state
            .adopt_schedules(ChannelKind::Email, vec![schedule("s1", true, Recurrence::Once)])
            .await;

        state
            .set_schedules_freshness(ChannelKind::Email, Freshness::Fetching)
            .await;
        state
            .set_schedules_freshness(ChannelKind::Email, Freshness::Stale)
            .await;

        assert_eq!(state.schedules(ChannelKind::Email).await.len(), 1);
        assert_eq!(
            state.schedules_freshness(ChannelKind::Email).await,
            Freshness::Stale
        );
    }

    #[tokio::test]
    async fn clear_resets_every_slot() {
        let state = HubState::new();
        state
            .adopt_schedules(ChannelKind::WhatsApp, vec![schedule("s1", true, Recurrence::Once)])
            .await;
        state.adopt_history(ChannelKind::WhatsApp, Vec::new()).await;

        state.clear().await;
        assert!(state.schedules(ChannelKind::WhatsApp).await.is_empty());
        assert_eq!(
            state.schedules_freshness(ChannelKind::WhatsApp).await,
            Freshness::Stale
        );
    }

    #[test]
    fn derived_views_are_pure_partitions() {
        let all = vec![
            schedule("s1", true, Recurrence::Once),
            schedule("s2", false, Recurrence::Daily),
            schedule("s3", true, Recurrence::Daily),
        ];

        let active = active_schedules(&all);
        let inactive = inactive_schedules(&all);
        assert_eq!(active.len(), 2);
        assert_eq!(inactive.len(), 1);
        assert_eq!(active.len() + inactive.len(), all.len());

        let daily = schedules_by_recurrence(&all, Recurrence::Daily);
        assert_eq!(daily.len(), 2);
        assert!(schedules_by_recurrence(&all, Recurrence::Monthly).is_empty());

        // Input untouched.
        assert_eq!(all.len(), 3);
    }
}
