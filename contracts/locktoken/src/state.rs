use cosmwasm_schema::cw_serde;

use cosmwasm_std::{Addr, Empty, Timestamp, Uint128};
use cw_storage_plus::{Item, Map};

/// Lock capacity applied when instantiation does not configure one.
pub const DEFAULT_MAX_LOCKS_PER_ACCOUNT: u32 = 100;

#[cw_serde]
pub struct Config {
    pub owner: Addr,
    /// Global lock-checking toggle
    pub lock_enabled: bool,
    pub max_locks_per_account: u32,
}

/// A fixed amount of an account's balance that cannot be spent before `unlock_at`.
/// Entries are never mutated; expiry is derived from the time they are read at.
#[cw_serde]
pub struct LockEntry {
    pub locked_at: Timestamp,
    pub locked_amount: Uint128,
    pub unlock_at: Timestamp,
}

impl LockEntry {
    pub fn is_active(&self, at_time: Timestamp) -> bool {
        at_time < self.unlock_at
    }
}

pub const CONFIG: Item<Config> = Item::new("config");

// locks are keyed by (owner, insertion index)
pub const LOCKS: Map<(&Addr, u32), LockEntry> = Map::new("locks");
pub const LOCK_COUNTS: Map<&Addr, u32> = Map::new("lock_counts");

pub const LOCK_TRANSFER_ADMINS: Map<&Addr, Empty> = Map::new("lock_transfer_admins");
