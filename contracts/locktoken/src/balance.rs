use cosmwasm_std::{Addr, StdError, StdResult, Storage, Uint128};
use cw20_base::state::{BALANCES, TOKEN_INFO};

use crate::error::ContractError;

/// The empty address stands for "no account" and can never hold tokens.
pub fn null_account() -> Addr {
    Addr::unchecked("")
}

pub fn is_null_account(account: &Addr) -> bool {
    account.as_str().is_empty()
}

pub fn balance_of(storage: &dyn Storage, account: &Addr) -> StdResult<Uint128> {
    Ok(BALANCES.may_load(storage, account)?.unwrap_or_default())
}

pub fn total_supply(storage: &dyn Storage) -> StdResult<Uint128> {
    Ok(TOKEN_INFO.load(storage)?.total_supply)
}

/// Checks a credit would be accepted without touching storage.
pub fn check_credit(account: &Addr, amount: Uint128) -> Result<(), ContractError> {
    if amount.is_zero() {
        return Err(ContractError::InvalidAmount {});
    }
    if is_null_account(account) {
        return Err(ContractError::InvalidAccount {});
    }
    Ok(())
}

/// Checks a debit would be accepted without touching storage.
pub fn check_debit(
    storage: &dyn Storage,
    account: &Addr,
    amount: Uint128,
) -> Result<Uint128, ContractError> {
    let balance = balance_of(storage, account)?;
    balance
        .checked_sub(amount)
        .map_err(|_| ContractError::InsufficientBalance {
            balance,
            required: amount,
        })
}

pub fn credit(
    storage: &mut dyn Storage,
    account: &Addr,
    amount: Uint128,
) -> Result<Uint128, ContractError> {
    check_credit(account, amount)?;
    BALANCES.update(storage, account, |balance| -> Result<_, ContractError> {
        Ok(balance
            .unwrap_or_default()
            .checked_add(amount)
            .map_err(StdError::from)?)
    })
}

/// Raw debit, locks are not consulted here.
pub fn debit(
    storage: &mut dyn Storage,
    account: &Addr,
    amount: Uint128,
) -> Result<Uint128, ContractError> {
    let remaining = check_debit(storage, account, amount)?;
    if !amount.is_zero() {
        BALANCES.save(storage, account, &remaining)?;
    }
    Ok(remaining)
}

/// Removes tokens from `account` and from the total supply.
pub fn burn(
    storage: &mut dyn Storage,
    account: &Addr,
    amount: Uint128,
) -> Result<Uint128, ContractError> {
    if amount.is_zero() {
        return Err(ContractError::InvalidAmount {});
    }
    let remaining = check_debit(storage, account, amount)?;
    let mut info = TOKEN_INFO.load(storage)?;
    info.total_supply = info
        .total_supply
        .checked_sub(amount)
        .map_err(StdError::from)?;

    BALANCES.save(storage, account, &remaining)?;
    TOKEN_INFO.save(storage, &info)?;
    Ok(info.total_supply)
}

/// Creates tokens for `account`, bounded by the minter cap when one is set.
pub fn mint(
    storage: &mut dyn Storage,
    account: &Addr,
    amount: Uint128,
) -> Result<Uint128, ContractError> {
    check_credit(account, amount)?;
    let mut info = TOKEN_INFO.load(storage)?;
    info.total_supply = info
        .total_supply
        .checked_add(amount)
        .map_err(StdError::from)?;
    if let Some(cap) = info.mint.as_ref().and_then(|m| m.cap) {
        if info.total_supply > cap {
            return Err(ContractError::CannotExceedCap {});
        }
    }

    credit(storage, account, amount)?;
    TOKEN_INFO.save(storage, &info)?;
    Ok(info.total_supply)
}
