//! Shared harness: an in-memory engine served on an ephemeral port.

#![allow(dead_code, clippy::panic)]

use std::net::SocketAddr;
use std::sync::Arc;

use giveaway_gateway::api;
use giveaway_gateway::app_state::AppState;
use giveaway_gateway::config::{GiveawayLimits, RerollPolicy};
use giveaway_gateway::domain::{EventBus, WinnerSelector};
use giveaway_gateway::persistence::{GiveawayStore, MemoryGiveawayStore};

pub struct TestServer {
    pub addr: SocketAddr,
    pub state: AppState,
    pub store: Arc<dyn GiveawayStore>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }
}

pub fn engine(seed: u64) -> (AppState, Arc<dyn GiveawayStore>) {
    let store: Arc<dyn GiveawayStore> = Arc::new(MemoryGiveawayStore::new());
    let state = AppState::new(
        &store,
        EventBus::new(256),
        Arc::new(WinnerSelector::seeded(seed)),
        GiveawayLimits::default(),
        RerollPolicy::FullPool,
    );
    (state, store)
}

pub async fn spawn_server() -> TestServer {
    let (state, store) = engine(42);
    let app = api::build_router().with_state(state.clone());

    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("failed to bind ephemeral port");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("listener has no local address");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    TestServer { addr, state, store }
}
