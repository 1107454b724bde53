//! Per-user rolling conversation memory.

use std::num::NonZeroUsize;
use std::sync::Arc;

use dashmap::DashMap;
use log::debug;
use poise::serenity_prelude::UserId;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::types::{ConversationTurn, MessageRole};

/// In-memory map from user to their recent turns.
///
/// Only user and assistant turns are stored; the system turn is added when a
/// prompt is assembled. Nothing survives a restart.
#[derive(Debug)]
pub struct HistoryStore {
    max_pairs: NonZeroUsize,
    turns: DashMap<UserId, Vec<ConversationTurn>>,
    locks: DashMap<UserId, Arc<Mutex<()>>>,
}

impl HistoryStore {
    pub fn new(max_pairs: NonZeroUsize) -> Self {
        Self {
            max_pairs,
            turns: DashMap::new(),
            locks: DashMap::new(),
        }
    }

    /// Maximum number of turns retained per user.
    pub fn capacity(&self) -> usize {
        self.max_pairs.get() * 2
    }

    /// Append a turn, dropping the oldest pairs once over capacity.
    ///
    /// Turns are removed from the front two at a time. With a capacity of at
    /// least one pair the removal never exceeds the stored length, so history
    /// stays pair aligned.
    pub fn append(&self, user_id: UserId, role: MessageRole, content: impl Into<String>) {
        let capacity = self.capacity();
        let mut turns = self.turns.entry(user_id).or_default();
        turns.push(ConversationTurn::new(role, content));
        debug!("Appended {role} turn for user {user_id}");

        if turns.len() > capacity {
            let excess = turns.len() - capacity;
            let evict = excess.div_ceil(2) * 2;
            turns.drain(..evict);
            debug!("Evicted {evict} turns from history of user {user_id}");
        }
    }

    /// Delete all history for a user. Returns whether anything was stored.
    pub fn reset(&self, user_id: UserId) -> bool {
        self.turns.remove(&user_id).is_some()
    }

    /// Snapshot of the user's stored turns, oldest first.
    pub fn read(&self, user_id: UserId) -> Vec<ConversationTurn> {
        self.turns
            .get(&user_id)
            .map(|turns| turns.clone())
            .unwrap_or_default()
    }

    /// Drop a trailing user turn that never received an answer.
    pub fn discard_pending(&self, user_id: UserId) -> bool {
        let Some(mut turns) = self.turns.get_mut(&user_id) else {
            return false;
        };
        if turns.last().is_some_and(|turn| turn.role == MessageRole::User) {
            turns.pop();
            true
        } else {
            false
        }
    }

    /// Exclusive section for one user's read-modify-write exchange.
    ///
    /// serenity runs every gateway event on its own task, so two messages from
    /// the same user can be in flight at once. Holders of the guard are
    /// serialized per user; other users are unaffected.
    pub async fn lock_user(&self, user_id: UserId) -> OwnedMutexGuard<()> {
        let lock = Arc::clone(self.locks.entry(user_id).or_default().value());
        lock.lock_owned().await
    }

    /// Forget the user's lock entry when no guard or waiter still refers to it.
    ///
    /// Lock entries are created on demand, so without this the map keeps one
    /// entry per user ever seen. Returns whether the entry was removed.
    pub fn release_lock(&self, user_id: UserId) -> bool {
        self.locks
            .remove_if(&user_id, |_, lock| Arc::strong_count(lock) == 1)
            .is_some()
    }

    #[cfg(test)]
    pub(crate) fn tracked_locks(&self) -> usize {
        self.locks.len()
    }
}
