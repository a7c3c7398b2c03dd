use std::pin::pin;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Unlocked,
    Locked,
}

/// Two-state lock serializing credential refreshes.
///
/// Only a [`RefreshPermit`] holder locks the gate. Waiting for it to unlock
/// never takes it, so a pass-through caller cannot make the gate look busy.
/// Dropping the permit unlocks the gate on every exit path.
#[derive(Default)]
pub struct RefreshGate {
    locked: AtomicBool,
    released: Notify,
}

/// Proof that the holder is the single in-flight refresher.
pub struct RefreshPermit<'a> {
    gate: &'a RefreshGate,
}

impl Drop for RefreshPermit<'_> {
    fn drop(&mut self) {
        self.gate.locked.store(false, Ordering::Release);
        self.gate.released.notify_waiters();
    }
}

impl RefreshGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GateState {
        if self.locked.load(Ordering::Acquire) {
            GateState::Locked
        } else {
            GateState::Unlocked
        }
    }

    /// Takes the gate only if nobody holds it.
    pub fn try_acquire(&self) -> Option<RefreshPermit<'_>> {
        self.locked
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RefreshPermit { gate: self })
    }

    /// Suspends until the gate is unlocked. Does not take it.
    pub async fn wait_until_unlocked(&self) {
        loop {
            let mut released = pin!(self.released.notified());
            // Register before checking so a release in between is not missed.
            released.as_mut().enable();
            if !self.locked.load(Ordering::Acquire) {
                return;
            }
            released.await;
        }
    }
}
