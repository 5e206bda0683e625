//! # State Cache Service
//!
//! `StateCache` owns the committed consensus state; `StateCacheDelta` is
//! the single mutable copy-on-write overlay over it. The overlay tracks
//! inserted/modified/removed entries per sub-cache and touches the
//! committed maps only inside `commit(height)`.
//!
//! The delta guard is move-only; dropping it without commit discards every
//! overlay change and releases the exclusive slot. `detach()` yields an
//! independently try-lockable handle onto the same overlay so a second
//! writer (the unconfirmed-transaction updater) can briefly inspect state
//! without contending with the sync path's borrow; the shared mutex keeps
//! mutating access serialized.

use crate::domain::accounts::AccountState;
use crate::domain::difficulty::DifficultyInfo;
use crate::domain::errors::StateCacheError;
use parking_lot::{Mutex, MutexGuard, RwLock};
use shared_types::PublicKey;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Default number of difficulty-history entries retained after commit.
pub const DEFAULT_HISTORY_DEPTH: u64 = 60;

#[derive(Debug, Default)]
struct CommittedState {
    height: u64,
    accounts: BTreeMap<PublicKey, AccountState>,
    difficulties: BTreeMap<u64, DifficultyInfo>,
}

#[derive(Debug, Default)]
struct DeltaChanges {
    account_upserts: BTreeMap<PublicKey, AccountState>,
    account_removals: BTreeSet<PublicKey>,
    difficulty_inserts: BTreeMap<u64, DifficultyInfo>,
    difficulty_removals: BTreeSet<u64>,
}

impl DeltaChanges {
    fn account(&self, committed: &CommittedState, key: &PublicKey) -> Option<AccountState> {
        if self.account_removals.contains(key) {
            return None;
        }
        self.account_upserts
            .get(key)
            .or_else(|| committed.accounts.get(key))
            .copied()
    }

    fn merged_difficulties(&self, committed: &CommittedState) -> BTreeMap<u64, DifficultyInfo> {
        let mut merged = committed.difficulties.clone();
        for height in &self.difficulty_removals {
            merged.remove(height);
        }
        for (height, info) in &self.difficulty_inserts {
            merged.insert(*height, *info);
        }
        merged
    }
}

/// Versioned consensus state with exclusive-delta semantics.
pub struct StateCache {
    committed: Arc<RwLock<CommittedState>>,
    delta_active: Arc<AtomicBool>,
    history_depth: u64,
}

impl StateCache {
    /// Create an empty cache retaining `history_depth` difficulty entries.
    pub fn new(history_depth: u64) -> Self {
        Self {
            committed: Arc::new(RwLock::new(CommittedState::default())),
            delta_active: Arc::new(AtomicBool::new(false)),
            history_depth: history_depth.max(1),
        }
    }

    /// Current committed height.
    pub fn height(&self) -> u64 {
        self.committed.read().height
    }

    /// Snapshot the committed state for read-only consumers.
    pub fn read(&self) -> ReadOnlyState {
        let committed = self.committed.read();
        ReadOnlyState {
            height: committed.height,
            accounts: committed.accounts.clone(),
            difficulties: committed.difficulties.clone(),
        }
    }

    /// Create the exclusive mutable overlay.
    ///
    /// Fails with [`StateCacheError::DeltaAlreadyActive`] when a delta is
    /// already outstanding.
    pub fn create_delta(&self) -> Result<StateCacheDelta, StateCacheError> {
        if self.delta_active.swap(true, Ordering::AcqRel) {
            return Err(StateCacheError::DeltaAlreadyActive);
        }

        Ok(StateCacheDelta {
            committed: Arc::clone(&self.committed),
            delta_active: Arc::clone(&self.delta_active),
            changes: Arc::new(Mutex::new(DeltaChanges::default())),
            history_depth: self.history_depth,
        })
    }
}

impl Default for StateCache {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}

/// Exclusive copy-on-write overlay over a [`StateCache`].
pub struct StateCacheDelta {
    committed: Arc<RwLock<CommittedState>>,
    delta_active: Arc<AtomicBool>,
    changes: Arc<Mutex<DeltaChanges>>,
    history_depth: u64,
}

impl StateCacheDelta {
    /// Merged view of one account.
    pub fn account(&self, key: &PublicKey) -> Option<AccountState> {
        let committed = self.committed.read();
        self.changes.lock().account(&committed, key)
    }

    /// Whether the merged view contains `key`.
    pub fn contains_account(&self, key: &PublicKey) -> bool {
        self.account(key).is_some()
    }

    /// Insert or replace an account.
    pub fn upsert_account(&self, key: PublicKey, state: AccountState) {
        let mut changes = self.changes.lock();
        changes.account_removals.remove(&key);
        changes.account_upserts.insert(key, state);
    }

    /// Remove an account from the merged view.
    pub fn remove_account(&self, key: &PublicKey) {
        let mut changes = self.changes.lock();
        changes.account_upserts.remove(key);
        changes.account_removals.insert(*key);
    }

    /// Add to an account's balance, creating the account if absent.
    pub fn credit(&self, key: PublicKey, amount: u64) {
        let mut state = self.account(&key).unwrap_or_default();
        state.balance = state.balance.saturating_add(amount);
        state.effective_balance = state.effective_balance.saturating_add(amount);
        self.upsert_account(key, state);
    }

    /// Subtract from an account's balance.
    pub fn debit(&self, key: PublicKey, amount: u64) -> Result<(), StateCacheError> {
        let mut state = self.account(&key).unwrap_or_default();
        if state.balance < amount {
            return Err(StateCacheError::InsufficientBalance {
                available: state.balance,
                needed: amount,
            });
        }
        state.balance -= amount;
        state.effective_balance = state.effective_balance.saturating_sub(amount);
        self.upsert_account(key, state);
        Ok(())
    }

    /// Record one block's difficulty info.
    pub fn insert_difficulty(&self, info: DifficultyInfo) {
        let mut changes = self.changes.lock();
        changes.difficulty_removals.remove(&info.height);
        changes.difficulty_inserts.insert(info.height, info);
    }

    /// Remove the difficulty info recorded at `height`.
    pub fn remove_difficulty(&self, height: u64) {
        let mut changes = self.changes.lock();
        changes.difficulty_inserts.remove(&height);
        changes.difficulty_removals.insert(height);
    }

    /// The most recent `max_count` difficulty infos, ascending by height,
    /// from the merged view.
    pub fn last_difficulty_infos(&self, max_count: usize) -> Vec<DifficultyInfo> {
        let committed = self.committed.read();
        let merged = self.changes.lock().merged_difficulties(&committed);
        let mut infos: Vec<_> = merged.into_values().collect();
        if infos.len() > max_count {
            infos.drain(..infos.len() - max_count);
        }
        infos
    }

    /// Summarize the recorded overlay operations.
    pub fn changes(&self) -> CacheChanges {
        let changes = self.changes.lock();
        CacheChanges {
            modified_accounts: changes.account_upserts.keys().copied().collect(),
            removed_accounts: changes.account_removals.iter().copied().collect(),
            difficulty_insertions: changes.difficulty_inserts.keys().copied().collect(),
            difficulty_removals: changes.difficulty_removals.iter().copied().collect(),
        }
    }

    /// Snapshot the merged view for read-only consumers.
    pub fn to_read_only(&self) -> ReadOnlyState {
        let committed = self.committed.read();
        let changes = self.changes.lock();

        let mut accounts = committed.accounts.clone();
        for key in &changes.account_removals {
            accounts.remove(key);
        }
        for (key, state) in &changes.account_upserts {
            accounts.insert(*key, *state);
        }

        ReadOnlyState {
            height: committed.height,
            accounts,
            difficulties: changes.merged_difficulties(&committed),
        }
    }

    /// Take a detached, independently lockable handle onto this overlay.
    pub fn detach(&self) -> DetachedDelta {
        DetachedDelta {
            committed: Arc::clone(&self.committed),
            changes: Arc::clone(&self.changes),
        }
    }

    /// Apply the overlay to the committed state and advance the visible
    /// height to `height`, releasing the exclusive slot.
    pub fn commit(self, height: u64) -> Result<(), StateCacheError> {
        let mut committed = self.committed.write();
        if height < committed.height {
            return Err(StateCacheError::HeightRegression {
                current: committed.height,
                requested: height,
            });
        }

        let mut changes = self.changes.lock();
        for key in std::mem::take(&mut changes.account_removals) {
            committed.accounts.remove(&key);
        }
        for (key, state) in std::mem::take(&mut changes.account_upserts) {
            committed.accounts.insert(key, state);
        }
        for h in std::mem::take(&mut changes.difficulty_removals) {
            committed.difficulties.remove(&h);
        }
        for (h, info) in std::mem::take(&mut changes.difficulty_inserts) {
            committed.difficulties.insert(h, info);
        }

        // prune difficulty history to the retained window
        let floor = height.saturating_sub(self.history_depth);
        committed.difficulties = committed.difficulties.split_off(&(floor + 1));

        committed.height = height;
        tracing::debug!(height, "state cache committed");
        Ok(())
    }
}

impl Drop for StateCacheDelta {
    fn drop(&mut self) {
        self.delta_active.store(false, Ordering::Release);
    }
}

/// Detached handle onto an outstanding delta.
///
/// The handle does not own the exclusive slot; it serializes access to the
/// overlay through the same mutex the delta uses.
pub struct DetachedDelta {
    committed: Arc<RwLock<CommittedState>>,
    changes: Arc<Mutex<DeltaChanges>>,
}

impl DetachedDelta {
    /// Try to lock the overlay; `None` when the sync path holds it.
    pub fn try_lock(&self) -> Option<DetachedGuard<'_>> {
        self.changes.try_lock().map(|guard| DetachedGuard {
            committed: &self.committed,
            guard,
        })
    }
}

/// Locked access to a detached delta.
pub struct DetachedGuard<'a> {
    committed: &'a RwLock<CommittedState>,
    guard: MutexGuard<'a, DeltaChanges>,
}

impl DetachedGuard<'_> {
    /// Merged view of one account.
    pub fn account(&self, key: &PublicKey) -> Option<AccountState> {
        let committed = self.committed.read();
        self.guard.account(&committed, key)
    }

    /// Insert or replace an account through the detached handle.
    pub fn upsert_account(&mut self, key: PublicKey, state: AccountState) {
        self.guard.account_removals.remove(&key);
        self.guard.account_upserts.insert(key, state);
    }
}

/// Immutable snapshot of (merged) cache state.
#[derive(Debug, Clone)]
pub struct ReadOnlyState {
    height: u64,
    accounts: BTreeMap<PublicKey, AccountState>,
    difficulties: BTreeMap<u64, DifficultyInfo>,
}

impl ReadOnlyState {
    /// Committed height at snapshot time.
    pub fn height(&self) -> u64 {
        self.height
    }

    /// Look up one account.
    pub fn account(&self, key: &PublicKey) -> Option<AccountState> {
        self.accounts.get(key).copied()
    }

    /// The difficulty info recorded at `height`, if any.
    pub fn difficulty_info(&self, height: u64) -> Option<DifficultyInfo> {
        self.difficulties.get(&height).copied()
    }

    /// The most recent `max_count` difficulty infos, ascending by height.
    pub fn last_difficulty_infos(&self, max_count: usize) -> Vec<DifficultyInfo> {
        let mut infos: Vec<_> = self.difficulties.values().copied().collect();
        if infos.len() > max_count {
            infos.drain(..infos.len() - max_count);
        }
        infos
    }

    /// Up to `max_count` difficulty infos at or below `height`, ascending.
    pub fn difficulty_infos_before(&self, height: u64, max_count: usize) -> Vec<DifficultyInfo> {
        let mut infos: Vec<_> = self
            .difficulties
            .range(..=height)
            .map(|(_, info)| *info)
            .collect();
        if infos.len() > max_count {
            infos.drain(..infos.len() - max_count);
        }
        infos
    }
}

/// Summary of the operations recorded by a delta.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheChanges {
    /// Accounts inserted or modified.
    pub modified_accounts: Vec<PublicKey>,
    /// Accounts removed.
    pub removed_accounts: Vec<PublicKey>,
    /// Heights with difficulty entries inserted.
    pub difficulty_insertions: Vec<u64>,
    /// Heights with difficulty entries removed.
    pub difficulty_removals: Vec<u64>,
}
