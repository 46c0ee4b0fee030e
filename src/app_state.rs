//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::{GiveawayLimits, RerollPolicy};
use crate::domain::{EventBus, NotificationSink, WinnerSelector};
use crate::persistence::GiveawayStore;
use crate::service::{CompletionProcessor, EntryManager, GiveawayService, RerollService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Creation path and lookups.
    pub giveaways: Arc<GiveawayService>,
    /// Entry recording.
    pub entries: Arc<EntryManager>,
    /// Manual and scheduled completion.
    pub completion: Arc<CompletionProcessor>,
    /// Winner redraws.
    pub reroll: Arc<RerollService>,
    /// Event bus for WebSocket subscriptions and entry confirmations.
    pub event_bus: EventBus,
}

impl AppState {
    /// Wires every service over one store, one selector and one event bus.
    #[must_use]
    pub fn new(
        store: &Arc<dyn GiveawayStore>,
        event_bus: EventBus,
        selector: Arc<WinnerSelector>,
        limits: GiveawayLimits,
        reroll_policy: RerollPolicy,
    ) -> Self {
        let sink: Arc<dyn NotificationSink> = Arc::new(event_bus.clone());

        Self {
            giveaways: Arc::new(GiveawayService::new(
                Arc::clone(store),
                Arc::clone(&sink),
                limits,
            )),
            entries: Arc::new(EntryManager::new(Arc::clone(store))),
            completion: Arc::new(CompletionProcessor::new(
                Arc::clone(store),
                Arc::clone(&selector),
                Arc::clone(&sink),
            )),
            reroll: Arc::new(RerollService::new(
                Arc::clone(store),
                selector,
                sink,
                reroll_policy,
            )),
            event_bus,
        }
    }
}
