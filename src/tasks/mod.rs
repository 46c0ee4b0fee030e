//! Background scheduled tasks.
//!
//! The only recurring job is the [`ExpirySweeper`], which completes
//! giveaways once their end time passes. Call [`ExpirySweeper::spawn`]
//! once during startup; the first sweep runs immediately so giveaways
//! that expired while the process was down are completed on boot.

pub mod expiry_sweeper;

pub use expiry_sweeper::{ExpirySweeper, SweepReport};
