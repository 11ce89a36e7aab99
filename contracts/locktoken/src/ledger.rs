//! Lock-aware transfer engine.
//!
//! Every mutating operation validates all of its preconditions before the
//! first write, so a rejected call leaves balances and lock lists untouched.
//! Time is always supplied by the caller.

use cosmwasm_std::{Addr, Order, StdResult, Storage, Timestamp, Uint128};
use cw_storage_plus::Bound;

use crate::balance;
use crate::error::ContractError;
use crate::state::{Config, LockEntry, LOCKS, LOCK_COUNTS};

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 30;

/// Settings the ledger is run with for one call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LedgerConfig {
    pub lock_enabled: bool,
    pub max_locks_per_account: u32,
}

impl From<&Config> for LedgerConfig {
    fn from(config: &Config) -> Self {
        LedgerConfig {
            lock_enabled: config.lock_enabled,
            max_locks_per_account: config.max_locks_per_account,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AvailableBalance {
    pub total: Uint128,
    pub locked: Uint128,
    pub available: Uint128,
}

impl AvailableBalance {
    /// More is locked than the account holds, which only an administrative
    /// burn can cause.
    pub fn is_overcommitted(&self) -> bool {
        self.locked > self.total
    }
}

pub fn lock_count(storage: &dyn Storage, account: &Addr) -> StdResult<u32> {
    Ok(LOCK_COUNTS.may_load(storage, account)?.unwrap_or_default())
}

/// Sum of all entries still active at `at_time`.
pub fn locked_amount(
    storage: &dyn Storage,
    account: &Addr,
    at_time: Timestamp,
) -> StdResult<Uint128> {
    LOCKS
        .prefix(account)
        .range(storage, None, None, Order::Ascending)
        .try_fold(Uint128::zero(), |acc, item| -> StdResult<Uint128> {
            let (_, entry) = item?;
            if entry.is_active(at_time) {
                Ok(acc.checked_add(entry.locked_amount)?)
            } else {
                Ok(acc)
            }
        })
}

pub fn available_balance(
    storage: &dyn Storage,
    account: &Addr,
    at_time: Timestamp,
) -> StdResult<AvailableBalance> {
    let total = balance::balance_of(storage, account)?;
    let locked = locked_amount(storage, account, at_time)?;
    Ok(AvailableBalance {
        total,
        locked,
        available: total.saturating_sub(locked),
    })
}

pub fn can_transfer(
    storage: &dyn Storage,
    account: &Addr,
    amount: Uint128,
    at_time: Timestamp,
) -> StdResult<bool> {
    Ok(available_balance(storage, account, at_time)?.available >= amount)
}

/// Rejects spending `amount` from `account` when that would touch locked tokens.
/// Accounts without lock entries, and all accounts while lock checking is off,
/// pass unconditionally.
fn check_unlocked(
    storage: &dyn Storage,
    config: &LedgerConfig,
    account: &Addr,
    amount: Uint128,
    at_time: Timestamp,
) -> Result<(), ContractError> {
    if !config.lock_enabled || lock_count(storage, account)? == 0 {
        return Ok(());
    }
    let balance = available_balance(storage, account, at_time)?;
    if balance.available < amount {
        return Err(ContractError::InsufficientUnlockedBalance {
            available: balance.available,
            required: amount,
        });
    }
    Ok(())
}

/// Validates a transfer without writing anything.
///
/// Zero amounts succeed without any check and move nothing. A null recipient
/// skips the lock check and is then refused by the store.
pub fn check_transfer(
    storage: &dyn Storage,
    config: &LedgerConfig,
    from: &Addr,
    to: &Addr,
    amount: Uint128,
    at_time: Timestamp,
) -> Result<(), ContractError> {
    if amount.is_zero() {
        return Ok(());
    }
    if !balance::is_null_account(to) {
        check_unlocked(storage, config, from, amount, at_time)?;
    }
    balance::check_credit(to, amount)?;
    balance::check_debit(storage, from, amount)?;
    Ok(())
}

pub fn transfer(
    storage: &mut dyn Storage,
    config: &LedgerConfig,
    from: &Addr,
    to: &Addr,
    amount: Uint128,
    at_time: Timestamp,
) -> Result<(), ContractError> {
    check_transfer(storage, config, from, to, amount, at_time)?;
    if amount.is_zero() {
        return Ok(());
    }
    balance::debit(storage, from, amount)?;
    balance::credit(storage, to, amount)?;
    Ok(())
}

/// Validates a burn of unlocked tokens without writing anything.
pub fn check_burn(
    storage: &dyn Storage,
    config: &LedgerConfig,
    account: &Addr,
    amount: Uint128,
    at_time: Timestamp,
) -> Result<(), ContractError> {
    if amount.is_zero() {
        return Err(ContractError::InvalidAmount {});
    }
    check_unlocked(storage, config, account, amount, at_time)?;
    balance::check_debit(storage, account, amount)?;
    Ok(())
}

/// Burns tokens the holder is free to spend.
pub fn burn(
    storage: &mut dyn Storage,
    config: &LedgerConfig,
    account: &Addr,
    amount: Uint128,
    at_time: Timestamp,
) -> Result<Uint128, ContractError> {
    check_burn(storage, config, account, amount, at_time)?;
    balance::burn(storage, account, amount)
}

/// Builds the entry that `lock` would append, and its index.
fn prepare_lock(
    storage: &dyn Storage,
    config: &LedgerConfig,
    account: &Addr,
    amount: Uint128,
    duration: u64,
    at_time: Timestamp,
) -> Result<(u32, LockEntry), ContractError> {
    if amount.is_zero() {
        return Err(ContractError::InvalidAmount {});
    }
    if duration == 0 {
        return Err(ContractError::InvalidDuration {});
    }
    let unlock_at = duration
        .checked_mul(1_000_000_000)
        .and_then(|nanos| at_time.nanos().checked_add(nanos))
        .map(Timestamp::from_nanos)
        .ok_or(ContractError::InvalidDuration {})?;

    let index = lock_count(storage, account)?;
    if index >= config.max_locks_per_account {
        return Err(ContractError::TooManyLocks {
            max: config.max_locks_per_account,
        });
    }

    let entry = LockEntry {
        locked_at: at_time,
        locked_amount: amount,
        unlock_at,
    };
    Ok((index, entry))
}

fn append_lock(
    storage: &mut dyn Storage,
    account: &Addr,
    index: u32,
    entry: &LockEntry,
) -> StdResult<()> {
    LOCKS.save(storage, (account, index), entry)?;
    LOCK_COUNTS.save(storage, account, &(index + 1))
}

/// Appends a lock of `amount` on `account` for `duration` seconds.
pub fn lock(
    storage: &mut dyn Storage,
    config: &LedgerConfig,
    account: &Addr,
    amount: Uint128,
    duration: u64,
    at_time: Timestamp,
) -> Result<LockEntry, ContractError> {
    let (index, entry) = prepare_lock(storage, config, account, amount, duration, at_time)?;
    append_lock(storage, account, index, &entry)?;
    Ok(entry)
}

/// Moves `amount` to `to` and locks it there for `duration` seconds.
/// Either both effects happen or neither does.
pub fn transfer_and_lock(
    storage: &mut dyn Storage,
    config: &LedgerConfig,
    from: &Addr,
    to: &Addr,
    amount: Uint128,
    duration: u64,
    at_time: Timestamp,
) -> Result<LockEntry, ContractError> {
    if !config.lock_enabled {
        return Err(ContractError::LockingDisabled {});
    }
    let (index, entry) = prepare_lock(storage, config, to, amount, duration, at_time)?;
    check_transfer(storage, config, from, to, amount, at_time)?;

    transfer(storage, config, from, to, amount, at_time)?;
    append_lock(storage, to, index, &entry)?;
    Ok(entry)
}

pub fn get_lock_entry(
    storage: &dyn Storage,
    account: &Addr,
    index: u32,
) -> Result<LockEntry, ContractError> {
    let len = lock_count(storage, account)?;
    if index >= len {
        return Err(ContractError::IndexOutOfRange { index, len });
    }
    Ok(LOCKS.load(storage, (account, index))?)
}

/// Entries of `account` in insertion order, paginated by index.
pub fn lock_entries(
    storage: &dyn Storage,
    account: &Addr,
    start_after: Option<u32>,
    limit: Option<u32>,
) -> StdResult<Vec<(u32, LockEntry)>> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start = start_after.map(|index| Bound::exclusive(index));

    LOCKS
        .prefix(account)
        .range(storage, start, None, Order::Ascending)
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balance::{balance_of, null_account, total_supply};
    use crate::mock::setup_token;
    use cosmwasm_std::testing::MockStorage;

    const ENABLED: LedgerConfig = LedgerConfig {
        lock_enabled: true,
        max_locks_per_account: 100,
    };
    const DISABLED: LedgerConfig = LedgerConfig {
        lock_enabled: false,
        max_locks_per_account: 100,
    };

    fn at(seconds: u64) -> Timestamp {
        Timestamp::from_seconds(seconds)
    }

    fn addr(name: &str) -> Addr {
        Addr::unchecked(name)
    }

    #[test]
    fn no_entries_means_nothing_locked() {
        let mut store = MockStorage::new();
        setup_token(&mut store, &[("alice", 1000)], None);

        assert_eq!(
            locked_amount(&store, &addr("alice"), at(0)).unwrap(),
            Uint128::zero()
        );
        let balance = available_balance(&store, &addr("alice"), at(0)).unwrap();
        assert_eq!(balance.total, Uint128::new(1000));
        assert_eq!(balance.available, Uint128::new(1000));
        assert_eq!(lock_count(&store, &addr("nobody")).unwrap(), 0);
    }

    #[test]
    fn single_lock_scenario() {
        let mut store = MockStorage::new();
        setup_token(&mut store, &[("a", 1000)], None);
        let a = addr("a");
        let b = addr("b");

        lock(&mut store, &ENABLED, &a, Uint128::new(500), 3600, at(0)).unwrap();

        let balance = available_balance(&store, &a, at(1000)).unwrap();
        assert_eq!(
            (balance.total, balance.available),
            (Uint128::new(1000), Uint128::new(500))
        );
        assert!(!can_transfer(&store, &a, Uint128::new(600), at(1000)).unwrap());

        let err = transfer(&mut store, &ENABLED, &a, &b, Uint128::new(600), at(1000)).unwrap_err();
        assert_eq!(
            err,
            ContractError::InsufficientUnlockedBalance {
                available: Uint128::new(500),
                required: Uint128::new(600),
            }
        );
        transfer(&mut store, &ENABLED, &a, &b, Uint128::new(500), at(1000)).unwrap();

        let balance = available_balance(&store, &a, at(3601)).unwrap();
        assert_eq!(
            (balance.total, balance.available),
            (Uint128::new(500), Uint128::new(500))
        );
        transfer(&mut store, &ENABLED, &a, &b, Uint128::new(500), at(3601)).unwrap();
        assert_eq!(balance_of(&store, &a).unwrap(), Uint128::zero());
        assert_eq!(balance_of(&store, &b).unwrap(), Uint128::new(1000));
    }

    #[test]
    fn staggered_locks_release_in_order() {
        let mut store = MockStorage::new();
        setup_token(&mut store, &[("account", 1000), ("sender", 700)], None);
        let account = addr("account");
        let sender = addr("sender");

        transfer_and_lock(
            &mut store,
            &ENABLED,
            &sender,
            &account,
            Uint128::new(300),
            86400,
            at(0),
        )
        .unwrap();
        transfer_and_lock(
            &mut store,
            &ENABLED,
            &sender,
            &account,
            Uint128::new(400),
            172800,
            at(0),
        )
        .unwrap();

        let available = |t| available_balance(&store, &account, at(t)).unwrap();
        assert_eq!(available(0).total, Uint128::new(1700));
        assert_eq!(available(0).available, Uint128::new(1000));
        assert_eq!(available(86401).available, Uint128::new(1300));
        assert_eq!(available(172801).available, Uint128::new(1700));
    }

    #[test]
    fn expiry_is_monotonic() {
        let mut store = MockStorage::new();
        setup_token(&mut store, &[("a", 10_000)], None);
        let a = addr("a");
        for (i, duration) in [50u64, 10, 300, 10, 75].iter().enumerate() {
            lock(
                &mut store,
                &ENABLED,
                &a,
                Uint128::new(100 * (i as u128 + 1)),
                *duration,
                at(i as u64),
            )
            .unwrap();
        }

        let mut previous = locked_amount(&store, &a, at(0)).unwrap();
        for t in 1..=310 {
            let current = locked_amount(&store, &a, at(t)).unwrap();
            assert!(current <= previous);
            let balance = available_balance(&store, &a, at(t)).unwrap();
            assert_eq!(balance.total, balance.available + current);
            previous = current;
        }
        assert_eq!(previous, Uint128::zero());
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let mut store = MockStorage::new();
        setup_token(&mut store, &[("a", 100)], None);
        let a = addr("a");
        lock(&mut store, &ENABLED, &a, Uint128::new(100), 10, at(5)).unwrap();

        assert_eq!(locked_amount(&store, &a, at(14)).unwrap(), Uint128::new(100));
        assert_eq!(locked_amount(&store, &a, at(15)).unwrap(), Uint128::zero());
    }

    #[test]
    fn disabled_locking_ignores_entries() {
        let mut store = MockStorage::new();
        setup_token(&mut store, &[("a", 1000)], None);
        let a = addr("a");
        let b = addr("b");
        lock(&mut store, &ENABLED, &a, Uint128::new(900), 3600, at(0)).unwrap();

        transfer(&mut store, &DISABLED, &a, &b, Uint128::new(1000), at(10)).unwrap();
        assert_eq!(balance_of(&store, &b).unwrap(), Uint128::new(1000));

        let err = transfer_and_lock(&mut store, &DISABLED, &b, &a, Uint128::new(1), 10, at(10))
            .unwrap_err();
        assert_eq!(err, ContractError::LockingDisabled {});
    }

    #[test]
    fn capacity_limit() {
        let mut store = MockStorage::new();
        setup_token(&mut store, &[("a", 1000)], None);
        let a = addr("a");

        for i in 0..100 {
            lock(&mut store, &ENABLED, &a, Uint128::new(1), 60, at(i)).unwrap();
        }
        let err = lock(&mut store, &ENABLED, &a, Uint128::new(1), 60, at(100)).unwrap_err();
        assert_eq!(err, ContractError::TooManyLocks { max: 100 });
        assert_eq!(lock_count(&store, &a).unwrap(), 100);
    }

    #[test]
    fn lock_rejects_bad_input() {
        let mut store = MockStorage::new();
        setup_token(&mut store, &[("a", 1000)], None);
        let a = addr("a");

        let err = lock(&mut store, &ENABLED, &a, Uint128::zero(), 60, at(0)).unwrap_err();
        assert_eq!(err, ContractError::InvalidAmount {});
        let err = lock(&mut store, &ENABLED, &a, Uint128::new(1), 0, at(0)).unwrap_err();
        assert_eq!(err, ContractError::InvalidDuration {});
        let err = lock(&mut store, &ENABLED, &a, Uint128::new(1), u64::MAX, at(1)).unwrap_err();
        assert_eq!(err, ContractError::InvalidDuration {});
        assert_eq!(lock_count(&store, &a).unwrap(), 0);
    }

    #[test]
    fn transfer_and_lock_is_atomic() {
        let mut store = MockStorage::new();
        setup_token(&mut store, &[("from", 100)], None);
        let from = addr("from");
        let to = addr("to");
        let tight = LedgerConfig {
            lock_enabled: true,
            max_locks_per_account: 1,
        };

        // insufficient balance: no lock entry appears
        let err = transfer_and_lock(&mut store, &tight, &from, &to, Uint128::new(101), 60, at(0))
            .unwrap_err();
        assert!(matches!(err, ContractError::InsufficientBalance { .. }));
        assert_eq!(lock_count(&store, &to).unwrap(), 0);

        transfer_and_lock(&mut store, &tight, &from, &to, Uint128::new(10), 60, at(0)).unwrap();

        // recipient at capacity: no transfer happens
        let err = transfer_and_lock(&mut store, &tight, &from, &to, Uint128::new(10), 60, at(0))
            .unwrap_err();
        assert_eq!(err, ContractError::TooManyLocks { max: 1 });
        assert_eq!(balance_of(&store, &from).unwrap(), Uint128::new(90));
        assert_eq!(balance_of(&store, &to).unwrap(), Uint128::new(10));

        // zero duration: no transfer happens
        let err = transfer_and_lock(&mut store, &ENABLED, &from, &to, Uint128::new(10), 0, at(0))
            .unwrap_err();
        assert_eq!(err, ContractError::InvalidDuration {});
        assert_eq!(balance_of(&store, &from).unwrap(), Uint128::new(90));
    }

    #[test]
    fn zero_and_null_transfers() {
        let mut store = MockStorage::new();
        setup_token(&mut store, &[("a", 100)], None);
        let a = addr("a");
        lock(&mut store, &ENABLED, &a, Uint128::new(100), 60, at(0)).unwrap();

        // zero amount skips the lock check and moves nothing
        transfer(&mut store, &ENABLED, &a, &addr("b"), Uint128::zero(), at(1)).unwrap();
        assert_eq!(balance_of(&store, &addr("b")).unwrap(), Uint128::zero());

        // null recipient skips the lock check but the store refuses it
        let err = transfer(&mut store, &ENABLED, &a, &null_account(), Uint128::new(1), at(1))
            .unwrap_err();
        assert_eq!(err, ContractError::InvalidAccount {});
        assert_eq!(balance_of(&store, &a).unwrap(), Uint128::new(100));
    }

    #[test]
    fn transfers_conserve_supply() {
        let mut store = MockStorage::new();
        setup_token(&mut store, &[("a", 500), ("b", 300), ("c", 200)], None);
        let names = ["a", "b", "c"];
        lock(&mut store, &ENABLED, &addr("b"), Uint128::new(250), 100, at(0)).unwrap();

        for step in 0..30u64 {
            let from = addr(names[(step % 3) as usize]);
            let to = addr(names[((step + 1) % 3) as usize]);
            // failures are fine, they must not change anything
            let _ = transfer(
                &mut store,
                &ENABLED,
                &from,
                &to,
                Uint128::new(37 * (step as u128 % 5)),
                at(step * 5),
            );
            let sum: Uint128 = names
                .iter()
                .map(|n| balance_of(&store, &addr(n)).unwrap())
                .sum();
            assert_eq!(sum, total_supply(&store).unwrap());
        }
    }

    #[test]
    fn burn_respects_locks_and_raw_burn_is_clamped() {
        let mut store = MockStorage::new();
        setup_token(&mut store, &[("a", 100)], None);
        let a = addr("a");
        lock(&mut store, &ENABLED, &a, Uint128::new(80), 60, at(0)).unwrap();

        let err = burn(&mut store, &ENABLED, &a, Uint128::new(30), at(1)).unwrap_err();
        assert!(matches!(
            err,
            ContractError::InsufficientUnlockedBalance { .. }
        ));
        burn(&mut store, &ENABLED, &a, Uint128::new(20), at(1)).unwrap();

        // administrative burn goes straight to the store
        balance::burn(&mut store, &a, Uint128::new(50)).unwrap();
        let balance = available_balance(&store, &a, at(1)).unwrap();
        assert!(balance.is_overcommitted());
        assert_eq!(balance.total, Uint128::new(30));
        assert_eq!(balance.available, Uint128::zero());
    }

    #[test]
    fn entries_by_index() {
        let mut store = MockStorage::new();
        setup_token(&mut store, &[("a", 100)], None);
        let a = addr("a");
        for i in 1..=12u64 {
            lock(&mut store, &ENABLED, &a, Uint128::new(i as u128), i, at(0)).unwrap();
        }

        let entry = get_lock_entry(&store, &a, 2).unwrap();
        assert_eq!(entry.locked_amount, Uint128::new(3));
        assert_eq!(entry.locked_at, at(0));
        assert_eq!(entry.unlock_at, at(3));

        let err = get_lock_entry(&store, &a, 12).unwrap_err();
        assert_eq!(err, ContractError::IndexOutOfRange { index: 12, len: 12 });

        let page = lock_entries(&store, &a, None, None).unwrap();
        assert_eq!(page.len(), 10);
        assert_eq!(page[0].0, 0);
        let page = lock_entries(&store, &a, Some(9), None).unwrap();
        assert_eq!(page.iter().map(|(i, _)| *i).collect::<Vec<_>>(), vec![10, 11]);
    }
}
