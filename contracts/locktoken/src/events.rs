use cosmwasm_std::{Addr, Event, Timestamp, Uint128};

use crate::state::LockEntry;

pub fn tokens_locked(account: &Addr, entry: &LockEntry) -> Event {
    Event::new("tokens_locked")
        .add_attribute("account", account)
        .add_attribute("amount", entry.locked_amount)
        .add_attribute("unlock_time", entry.unlock_at.seconds().to_string())
}

/// `time_reference` is the block height the transfer was included at.
pub fn transfer_and_lock(from: &Addr, to: &Addr, amount: Uint128, time_reference: u64) -> Event {
    Event::new("transfer_and_lock")
        .add_attribute("from", from)
        .add_attribute("to", to)
        .add_attribute("amount", amount)
        .add_attribute("time_reference", time_reference.to_string())
}

pub fn lock_enabled(time: Timestamp) -> Event {
    Event::new("lock_enabled").add_attribute("time", time.seconds().to_string())
}

pub fn lock_disabled(time: Timestamp) -> Event {
    Event::new("lock_disabled").add_attribute("time", time.seconds().to_string())
}
