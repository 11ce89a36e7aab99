#![cfg(test)]

use cosmwasm_std::{Addr, StdResult, Storage, Uint128};
use cw20_base::state::{MinterData, TokenInfo, TOKEN_INFO};

use crate::balance;
use crate::capability::Capabilities;

/// Stores token info and mints the given balances.
pub fn setup_token(storage: &mut dyn Storage, balances: &[(&str, u128)], cap: Option<Uint128>) {
    let info = TokenInfo {
        name: "Lock Token".to_string(),
        symbol: "LOCK".to_string(),
        decimals: 6,
        total_supply: Uint128::zero(),
        mint: Some(MinterData {
            minter: Addr::unchecked("minter"),
            cap,
        }),
    };
    TOKEN_INFO.save(storage, &info).unwrap();

    for (account, amount) in balances {
        balance::mint(storage, &Addr::unchecked(*account), Uint128::new(*amount)).unwrap();
    }
}

/// Fixed answers for code that only needs to ask who may do what.
pub struct StaticCapabilities {
    pub owner: Addr,
    pub lock_transfer: Vec<Addr>,
    pub lock_enabled: bool,
}

impl Capabilities for StaticCapabilities {
    fn is_owner(&self, caller: &Addr) -> StdResult<bool> {
        Ok(caller == &self.owner)
    }

    fn has_lock_transfer_capability(&self, caller: &Addr) -> StdResult<bool> {
        Ok(self.is_owner(caller)? || self.lock_transfer.contains(caller))
    }

    fn is_lock_globally_enabled(&self) -> StdResult<bool> {
        Ok(self.lock_enabled)
    }
}
