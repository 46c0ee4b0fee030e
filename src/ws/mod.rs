//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The endpoint at `/ws` streams giveaway events to presentation clients,
//! which subscribe per giveaway id or with the `"*"` wildcard.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
