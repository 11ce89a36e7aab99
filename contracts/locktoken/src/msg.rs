use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Binary, Timestamp, Uint128};
use cw20::{Cw20Coin, Expiration, MinterResponse};

#[cw_serde]
pub struct InstantiateMsg {
    // CW20
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub initial_balances: Vec<Cw20Coin>,
    pub mint: Option<MinterResponse>,

    /// Whether transfers consult lock entries from the start
    pub lock_enabled: bool,
    /// Max lock entries per account, defaults to 100
    pub max_locks_per_account: Option<u32>,
    /// Accounts allowed to transfer and lock on top of the owner
    pub lock_transfer_admins: Vec<String>,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Transfer tokens the sender is free to spend
    Transfer { recipient: String, amount: Uint128 },
    /// Transfer tokens and lock them on the recipient for `duration` seconds.
    /// Requires the lock-transfer capability.
    TransferAndLock {
        recipient: String,
        amount: Uint128,
        duration: u64,
    },
    /// Burn unlocked tokens of the sender
    Burn { amount: Uint128 },
    /// Transfer unlocked tokens to a contract and trigger its receive hook
    Send {
        contract: String,
        amount: Uint128,
        msg: Binary,
    },
    /// Only the minter. Create new tokens
    Mint { recipient: String, amount: Uint128 },

    /// CW20 "approval" extension
    IncreaseAllowance {
        spender: String,
        amount: Uint128,
        expires: Option<Expiration>,
    },
    /// CW20 "approval" extension
    DecreaseAllowance {
        spender: String,
        amount: Uint128,
        expires: Option<Expiration>,
    },
    /// CW20 "approval" extension. Moves unlocked tokens of `owner`
    TransferFrom {
        owner: String,
        recipient: String,
        amount: Uint128,
    },
    /// CW20 "approval" extension. Burns unlocked tokens of `owner`
    BurnFrom { owner: String, amount: Uint128 },

    /// Only owner. Turn lock checking on
    EnableLock {},
    /// Only owner. Turn lock checking off
    DisableLock {},
    /// Only owner
    GrantLockTransfer { address: String },
    /// Only owner
    RevokeLockTransfer { address: String },
    /// Only owner. Burn tokens of any account, locked or not
    AdminBurn { account: String, amount: Uint128 },
    /// Only owner
    UpdateOwner { owner: String },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    /// CW20. Returns the current balance of the given address, 0 if unset.
    #[returns(cw20::BalanceResponse)]
    Balance { address: String },
    #[returns(cw20::TokenInfoResponse)]
    TokenInfo {},
    #[returns(Option<cw20::MinterResponse>)]
    Minter {},
    #[returns(cw20::AllowanceResponse)]
    Allowance { owner: String, spender: String },
    #[returns(cw20::AllAllowancesResponse)]
    AllAllowances {
        owner: String,
        start_after: Option<String>,
        limit: Option<u32>,
    },
    #[returns(cw20::AllAccountsResponse)]
    AllAccounts {
        start_after: Option<String>,
        limit: Option<u32>,
    },

    /// Amount still locked at `at_time`, current block time if unset
    #[returns(LockedAmountResponse)]
    LockedAmount {
        address: String,
        at_time: Option<Timestamp>,
    },
    /// Total and spendable balance at `at_time`, current block time if unset
    #[returns(AvailableBalanceResponse)]
    AvailableBalance {
        address: String,
        at_time: Option<Timestamp>,
    },
    #[returns(LockCountResponse)]
    LockCount { address: String },
    #[returns(LockInfo)]
    LockEntry { address: String, index: u32 },
    /// Lock entries in creation order. Supports pagination.
    #[returns(LockEntriesResponse)]
    LockEntries {
        address: String,
        start_after: Option<u32>,
        limit: Option<u32>,
    },
    #[returns(ConfigResponse)]
    Config {},
    #[returns(LockTransferAdminsResponse)]
    LockTransferAdmins {
        start_after: Option<String>,
        limit: Option<u32>,
    },
}

#[cw_serde]
pub struct MigrateMsg {}

#[cw_serde]
pub struct LockedAmountResponse {
    pub locked: Uint128,
}

#[cw_serde]
pub struct AvailableBalanceResponse {
    pub total: Uint128,
    pub locked: Uint128,
    pub available: Uint128,
}

#[cw_serde]
pub struct LockCountResponse {
    pub count: u32,
}

#[cw_serde]
pub struct LockInfo {
    pub index: u32,
    pub locked_at: Timestamp,
    pub locked_amount: Uint128,
    pub unlock_at: Timestamp,
}

#[cw_serde]
pub struct LockEntriesResponse {
    pub locks: Vec<LockInfo>,
}

#[cw_serde]
pub struct ConfigResponse {
    pub owner: String,
    pub lock_enabled: bool,
    pub max_locks_per_account: u32,
}

#[cw_serde]
pub struct LockTransferAdminsResponse {
    pub admins: Vec<String>,
}
