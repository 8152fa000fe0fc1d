// SPDX-FileCopyrightText: 2026 Carelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! History query filters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CarelayError;
use crate::types::DeliveryStatus;

/// Filter for delivery-history queries.
///
/// Serializes to a query string omitting absent fields entirely, never as
/// empty values. The same serialization doubles as the cache-key suffix, so
/// two differently-filtered queries can never collide in the cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DeliveryStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

impl HistoryFilter {
    pub fn is_empty(&self) -> bool {
        *self == HistoryFilter::default()
    }

    /// Query-string form, without a leading `?`. Empty for the empty filter.
    pub fn query_string(&self) -> Result<String, CarelayError> {
        serde_urlencoded::to_string(self)
            .map_err(|e| CarelayError::Internal(format!("unencodable history filter: {e}")))
    }

    /// Cache-key suffix. Field order is fixed by declaration order, so equal
    /// filters always produce equal suffixes.
    pub fn cache_suffix(&self) -> String {
        self.query_string().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    #[test]
    fn empty_filter_has_empty_query() {
        let filter = HistoryFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter.query_string().unwrap(), "");
        assert_eq!(filter.cache_suffix(), "");
    }

    #[test]
    fn absent_fields_are_omitted() {
        let filter = HistoryFilter {
            recipient: Some("+15550001111".into()),
            limit: Some(25),
            ..Default::default()
        };
        let query = filter.query_string().unwrap();
        assert_eq!(query, "recipient=%2B15550001111&limit=25");
        assert!(!query.contains("from"));
        assert!(!query.contains("status"));
    }

    #[test]
    fn dates_and_status_encode() {
        let filter = HistoryFilter {
            from: Some(Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap()),
            status: Some(DeliveryStatus::Failed),
            ..Default::default()
        };
        let query = filter.query_string().unwrap();
        assert!(query.starts_with("from=2026-08-01"));
        assert!(query.ends_with("status=failed"));
    }

    fn arb_filter() -> impl Strategy<Value = HistoryFilter> {
        (
            prop::option::of(0i64..2_000_000_000),
            prop::option::of("[a-z0-9+@.]{1,12}"),
            prop::option::of(prop_oneof![
                Just(DeliveryStatus::Sent),
                Just(DeliveryStatus::Failed),
                Just(DeliveryStatus::Pending),
            ]),
            prop::option::of(0u32..1000),
            prop::option::of(0u32..1000),
        )
            .prop_map(|(from, recipient, status, limit, offset)| HistoryFilter {
                from: from.and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
                to: None,
                recipient,
                status,
                limit,
                offset,
            })
    }

    proptest! {
        // Equal filters always map to the same cache key.
        #[test]
        fn suffix_is_deterministic(filter in arb_filter()) {
            prop_assert_eq!(filter.cache_suffix(), filter.clone().cache_suffix());
        }

        // Distinct limits never collide in the cache.
        #[test]
        fn distinct_limits_get_distinct_suffixes(
            filter in arb_filter(),
            a in 0u32..1000,
            b in 0u32..1000,
        ) {
            prop_assume!(a != b);
            let mut fa = filter.clone();
            fa.limit = Some(a);
            let mut fb = filter;
            fb.limit = Some(b);
            prop_assert_ne!(fa.cache_suffix(), fb.cache_suffix());
        }
    }
}
