//! Uniform random winner draws over an in-memory entry pool.
//!
//! Selection is a pure function of the entry list, the requested winner
//! count and a random source, so it can be exercised with a seeded RNG.

use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::UserId;

/// Draws `min(want, entries.len())` distinct entrants, each with equal
/// probability, sampling without replacement.
///
/// Returns an empty vector when `entries` is empty or `want` is zero.
pub fn select_winners<R: Rng + ?Sized>(
    entries: &[UserId],
    want: usize,
    rng: &mut R,
) -> Vec<UserId> {
    let count = want.min(entries.len());
    entries.choose_multiple(rng, count).copied().collect()
}

/// Shared random source for winner draws.
///
/// Services hold one of these behind an `Arc`; tests construct it with a
/// fixed seed to make draws reproducible.
#[derive(Debug)]
pub struct WinnerSelector {
    rng: Mutex<StdRng>,
}

impl WinnerSelector {
    /// Creates a selector seeded from the operating system.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Creates a deterministic selector.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Draws winners from `entries`. See [`select_winners`].
    pub fn select(&self, entries: &[UserId], want: usize) -> Vec<UserId> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        select_winners(entries, want, &mut *rng)
    }
}

impl Default for WinnerSelector {
    fn default() -> Self {
        Self::from_entropy()
    }
}
