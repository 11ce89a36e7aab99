use cosmwasm_std::{StdError, Uint128};
use cw20_base::ContractError as Cw20ContractError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("Unauthorized")]
    Unauthorized {},

    #[error("Caller lacks the required capability")]
    CapabilityDenied {},

    #[error("Invalid amount")]
    InvalidAmount {},

    #[error("Invalid account")]
    InvalidAccount {},

    #[error("Invalid lock duration")]
    InvalidDuration {},

    #[error("Insufficient balance: {balance} available, {required} required")]
    InsufficientBalance { balance: Uint128, required: Uint128 },

    #[error("Insufficient unlocked balance: {available} available, {required} required")]
    InsufficientUnlockedBalance {
        available: Uint128,
        required: Uint128,
    },

    #[error("Account reached the limit of {max} locks")]
    TooManyLocks { max: u32 },

    #[error("Lock index {index} out of range ({len} entries)")]
    IndexOutOfRange { index: u32, len: u32 },

    #[error("Lock checking is disabled")]
    LockingDisabled {},

    #[error("Minting cannot exceed the cap")]
    CannotExceedCap {},

    #[error("Invalid config: {reason}")]
    InvalidConfig { reason: String },

    #[error("Duplicate initial balance addresses")]
    DuplicateInitialBalanceAddresses {},

    #[error("Cannot set to own account")]
    CannotSetOwnAccount {},

    #[error("Allowance is expired")]
    Expired {},

    #[error("No allowance for this account")]
    NoAllowance {},

    #[error("{msg}")]
    Base { msg: String },
}

impl From<Cw20ContractError> for ContractError {
    fn from(err: Cw20ContractError) -> Self {
        match err {
            Cw20ContractError::Std(error) => ContractError::Std(error),
            Cw20ContractError::Unauthorized {} => ContractError::Unauthorized {},
            Cw20ContractError::CannotSetOwnAccount {} => ContractError::CannotSetOwnAccount {},
            Cw20ContractError::InvalidZeroAmount {} => ContractError::InvalidAmount {},
            Cw20ContractError::Expired {} => ContractError::Expired {},
            Cw20ContractError::NoAllowance {} => ContractError::NoAllowance {},
            Cw20ContractError::CannotExceedCap {} => ContractError::CannotExceedCap {},
            other => ContractError::Base {
                msg: other.to_string(),
            },
        }
    }
}
