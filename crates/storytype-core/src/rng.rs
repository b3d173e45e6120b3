//! Random number generator abstraction for determinism.
//!
//! Goal and dimension selection draw from an injected source. Production
//! code wraps a real RNG; tests inject a seeded or scripted implementation.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::DomainError;

/// Abstraction over random number generation.
pub trait DeterministicRng: Send + Sync {
    /// Generate a random `u32` in the range `[min, max]` inclusive.
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32;
}

/// Picks one element of `items` uniformly, or `None` if `items` is empty.
///
/// Out-of-range values from a scripted RNG are clamped to the last element.
pub fn pick<'a, T>(rng: &mut dyn DeterministicRng, items: &'a [T]) -> Option<&'a T> {
    let last = u32::try_from(items.len().checked_sub(1)?).unwrap_or(u32::MAX);
    let index = rng.next_u32_range(0, last).min(last);
    items.get(index as usize)
}

/// Runs `f` with the shared RNG locked. Never hold the lock across an await.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the mutex is poisoned.
pub fn with_locked<T>(
    rng: &Mutex<dyn DeterministicRng + Send>,
    f: impl FnOnce(&mut dyn DeterministicRng) -> T,
) -> Result<T, DomainError> {
    let mut guard = rng
        .lock()
        .map_err(|e| DomainError::Infrastructure(format!("RNG mutex poisoned: {e}")))?;
    Ok(f(&mut *guard))
}

/// Production RNG backed by [`StdRng`].
#[derive(Debug)]
pub struct StdDeterministicRng(StdRng);

impl StdDeterministicRng {
    /// Seeds from operating-system entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self(StdRng::from_os_rng())
    }

    /// Seeds from a fixed value, for reproducible runs.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl DeterministicRng for StdDeterministicRng {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        self.0.random_range(min..=max)
    }
}
