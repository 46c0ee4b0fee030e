//! # giveaway-gateway
//!
//! Engine for time-boxed giveaways run by chat-platform bots.
//!
//! Administrators create a giveaway with a prize, a winner count and a
//! duration; users enter once each while it is active; a background
//! sweeper completes it when its end time passes and draws winners
//! uniformly at random. Winners of a completed giveaway can be rerolled.
//! Rendering (embeds, buttons, DMs) is left to presentation clients, which
//! drive the engine over REST and follow its events over WebSocket.
//!
//! ## Architecture
//!
//! ```text
//! Presentation clients (bot, dashboard)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── GiveawayService, EntryManager,
//!     │   CompletionProcessor, RerollService (service/)
//!     ├── ExpirySweeper (tasks/)
//!     ├── EventBus, WinnerSelector, DurationParser (domain/)
//!     │
//!     └── GiveawayStore: in-memory or PostgreSQL (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod tasks;
pub mod ws;
