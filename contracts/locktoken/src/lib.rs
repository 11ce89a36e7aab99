pub mod balance;
pub mod capability;
pub mod contract;
mod error;
pub mod events;
pub mod ledger;
mod mock;
pub mod msg;
pub mod state;

pub use crate::error::ContractError;
