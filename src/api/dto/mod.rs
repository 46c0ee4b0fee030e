//! Data Transfer Objects for REST request/response serialization.
//!
//! Discord-style snowflakes are serialized as JSON strings to prevent
//! precision loss in JavaScript clients.

pub mod common_dto;
pub mod entry_dto;
pub mod giveaway_dto;

pub use common_dto::*;
pub use entry_dto::*;
pub use giveaway_dto::*;
