// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Badge Poller - Background task refreshing notification counters
//!
//! Owned by the navigation shell. Screens call [`BadgePoller::subscribe`]
//! and read the latest [`BadgeCounts`] from the watch receiver instead of
//! polling the backend themselves.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Periodic unread-count refresh with subscribe interface

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::gateway::BadgeSource;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeCounts {
    pub unread: u64,
}

pub struct BadgePoller {
    receiver: watch::Receiver<BadgeCounts>,
    shutdown_token: CancellationToken,
    handle: JoinHandle<()>,
}

impl BadgePoller {
    /// Start polling immediately, then every `every`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(source: Arc<dyn BadgeSource>, every: Duration) -> Self {
        let (sender, receiver) = watch::channel(BadgeCounts::default());
        let shutdown_token = CancellationToken::new();
        let token = shutdown_token.clone();

        let handle = tokio::spawn(async move {
            info!(interval_secs = every.as_secs(), "Starting badge poller");
            let mut tick = interval(every);
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = tick.tick() => {
                        match source.unread_count().await {
                            Ok(unread) => {
                                let changed = sender.send_if_modified(|counts| {
                                    if counts.unread == unread {
                                        return false;
                                    }
                                    counts.unread = unread;
                                    true
                                });
                                if changed {
                                    debug!(unread, "Badge count changed");
                                }
                            }
                            // Keep showing the last known count
                            Err(e) => warn!("Badge poll failed: {}", e),
                        }
                    }
                    _ = token.cancelled() => break,
                }
            }

            info!("Badge poller stopped");
        });

        Self {
            receiver,
            shutdown_token,
            handle,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<BadgeCounts> {
        self.receiver.clone()
    }

    pub fn latest(&self) -> BadgeCounts {
        *self.receiver.borrow()
    }

    /// Stop polling. Subscribers keep the last published value.
    pub fn stop(&self) {
        self.shutdown_token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for BadgePoller {
    fn drop(&mut self) {
        self.shutdown_token.cancel();
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::gateway::GatewayError;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    struct ScriptedSource {
        responses: Mutex<VecDeque<Result<u64, GatewayError>>>,
    }

    #[async_trait]
    impl BadgeSource for ScriptedSource {
        async fn unread_count(&self) -> Result<u64, GatewayError> {
            self.responses
                .lock()
                .pop_front()
                .unwrap_or(Err(GatewayError::Transport("exhausted".into())))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_publishes_and_keeps_last_value_on_failure() {
        let source = Arc::new(ScriptedSource {
            responses: Mutex::new(VecDeque::from(vec![
                Ok(3),
                Err(GatewayError::Transport("offline".into())),
                Ok(5),
            ])),
        });
        let poller = BadgePoller::spawn(source, Duration::from_secs(30));
        let mut rx = poller.subscribe();

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().unread, 3);

        // The failed poll publishes nothing; the next success does
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().unread, 5);
        assert_eq!(poller.latest().unread, 5);

        poller.stop();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(poller.is_finished());
    }
}
