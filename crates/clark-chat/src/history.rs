//! Bounded conversation history.

use std::collections::VecDeque;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};

use clark_core::Turn;
use tokio::sync::{Mutex, MutexGuard};

/// Ordered turns, capped at `cap` entries. The oldest entries are evicted
/// first when a push would exceed the cap.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    turns: VecDeque<Turn>,
    cap: usize,
}

impl ConversationHistory {
    /// Create an empty history. A cap of zero is raised to one so the
    /// current message always survives.
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            turns: VecDeque::with_capacity(cap.min(256)),
            cap,
        }
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push_back(turn);
        while self.turns.len() > self.cap {
            self.turns.pop_front();
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    pub fn to_vec(&self) -> Vec<Turn> {
        self.turns.iter().cloned().collect()
    }
}

/// Process-wide history shared by every request.
///
/// The dispatcher holds the lock for a whole turn, so turns never
/// interleave on the history. The length is mirrored in an atomic when each
/// lock is released, so `len` never waits on an in-flight turn.
#[derive(Debug)]
pub struct ConversationStore {
    inner: Mutex<ConversationHistory>,
    committed_len: AtomicUsize,
}

impl ConversationStore {
    pub fn new(cap: usize) -> Self {
        Self {
            inner: Mutex::new(ConversationHistory::new(cap)),
            committed_len: AtomicUsize::new(0),
        }
    }

    pub async fn lock(&self) -> HistoryGuard<'_> {
        HistoryGuard {
            guard: self.inner.lock().await,
            committed_len: &self.committed_len,
        }
    }

    pub async fn snapshot(&self) -> Vec<Turn> {
        self.inner.lock().await.to_vec()
    }

    /// Length as of the last released lock.
    pub fn len(&self) -> usize {
        self.committed_len.load(Ordering::Acquire)
    }
}

/// Exclusive access to the history. Publishes the new length on drop.
pub struct HistoryGuard<'a> {
    guard: MutexGuard<'a, ConversationHistory>,
    committed_len: &'a AtomicUsize,
}

impl Deref for HistoryGuard<'_> {
    type Target = ConversationHistory;

    fn deref(&self) -> &ConversationHistory {
        &self.guard
    }
}

impl DerefMut for HistoryGuard<'_> {
    fn deref_mut(&mut self) -> &mut ConversationHistory {
        &mut self.guard
    }
}

impl Drop for HistoryGuard<'_> {
    fn drop(&mut self) {
        self.committed_len.store(self.guard.len(), Ordering::Release);
    }
}
