//! Throttle ledger: suppresses repeated reports of the same fingerprint
//!
//! Each fingerprint maps to the earliest time it may be reported again. The
//! check and the update happen under one lock, so concurrent callers racing on
//! the same fingerprint see exactly one admission per interval.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

/// Fingerprint → next-allowed-time map with periodic eviction.
#[derive(Debug)]
pub struct ThrottleLedger {
    interval: TimeDelta,
    state: Mutex<LedgerState>,
}

#[derive(Debug, Default)]
struct LedgerState {
    next_allowed: HashMap<u32, DateTime<Utc>>,
    last_sweep: Option<DateTime<Utc>>,
}

impl ThrottleLedger {
    /// Create a ledger that admits each fingerprint at most once per `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: TimeDelta::from_std(interval).unwrap_or(TimeDelta::MAX),
            state: Mutex::new(LedgerState::default()),
        }
    }

    /// Admit `fingerprint` at `now` if its interval has elapsed.
    ///
    /// On admission the next-allowed time becomes `now + interval`. A refused
    /// call leaves the ledger untouched.
    pub fn try_admit(&self, fingerprint: u32, now: DateTime<Utc>) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(next) = state.next_allowed.get(&fingerprint) {
            if now < *next {
                return false;
            }
        }

        let next = now
            .checked_add_signed(self.interval)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        state.next_allowed.insert(fingerprint, next);
        state.sweep(now, self.interval);
        true
    }

    /// Number of fingerprints currently remembered
    pub fn len(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next_allowed
            .len()
    }

    /// True when no fingerprint is remembered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LedgerState {
    /// Drop entries whose next-allowed time has passed.
    ///
    /// An expired entry admits exactly like a missing one, so this is invisible
    /// to callers. Runs at most once per interval.
    fn sweep(&mut self, now: DateTime<Utc>, interval: TimeDelta) {
        let due = match self.last_sweep {
            None => true,
            Some(last) => last
                .checked_add_signed(interval)
                .is_some_and(|deadline| now >= deadline),
        };
        if !due {
            return;
        }

        let before = self.next_allowed.len();
        self.next_allowed.retain(|_, next| *next > now);
        self.last_sweep = Some(now);

        let evicted = before - self.next_allowed.len();
        if evicted > 0 {
            tracing::trace!(evicted, remaining = self.next_allowed.len(), "Swept throttle ledger");
        }
    }
}
