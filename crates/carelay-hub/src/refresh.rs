// SPDX-FileCopyrightText: 2026 Carelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic background refresh of schedule collections.
//!
//! One task per hub, started on demand. Every tick force-refreshes the
//! schedule collection of each enabled channel so toggles made elsewhere
//! (another device, the backend itself) become visible without a manual
//! reload. Failures are logged and recorded but never surfaced as notices;
//! the next tick simply tries again.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::hub::HubCore;

/// Handle to a running refresher task.
pub(crate) struct RefreshHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// Signals the task to stop without waiting.
    pub(crate) fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Signals the task to stop and waits for it to finish.
    pub(crate) async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            error!(error = %e, "refresh task panicked");
        }
    }
}

/// Spawns the refresher. The first refresh happens one full interval after
/// start; the caller is expected to have primed the collections already.
pub(crate) fn spawn_refresher(core: Arc<HubCore>, interval: Duration) -> RefreshHandle {
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately; skip it.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!("refresh task stopping");
                    break;
                }
                _ = ticker.tick() => {
                    metrics::counter!("carelay_refresh_cycles_total").increment(1);
                    for &kind in &core.enabled {
                        debug!(channel = %kind, "refreshing schedules");
                        core.fetch_schedules(kind, true).await;
                    }
                }
            }
        }
    });

    RefreshHandle { cancel, task }
}
