use cosmwasm_std::{Addr, StdResult, Storage};

use crate::error::ContractError;
use crate::state::{CONFIG, LOCK_TRANSFER_ADMINS};

/// Permission queries the contract asks before calling into the ledger.
/// The ledger itself never consults these.
pub trait Capabilities {
    fn is_owner(&self, caller: &Addr) -> StdResult<bool>;

    /// The owner always holds the lock-transfer capability.
    fn has_lock_transfer_capability(&self, caller: &Addr) -> StdResult<bool>;

    fn is_lock_globally_enabled(&self) -> StdResult<bool>;
}

/// Capabilities backed by the contract's own config and allow-list.
pub struct StoredCapabilities<'a> {
    storage: &'a dyn Storage,
}

impl<'a> StoredCapabilities<'a> {
    pub fn new(storage: &'a dyn Storage) -> Self {
        Self { storage }
    }
}

impl<'a> Capabilities for StoredCapabilities<'a> {
    fn is_owner(&self, caller: &Addr) -> StdResult<bool> {
        Ok(CONFIG.load(self.storage)?.owner == *caller)
    }

    fn has_lock_transfer_capability(&self, caller: &Addr) -> StdResult<bool> {
        Ok(self.is_owner(caller)? || LOCK_TRANSFER_ADMINS.has(self.storage, caller))
    }

    fn is_lock_globally_enabled(&self) -> StdResult<bool> {
        Ok(CONFIG.load(self.storage)?.lock_enabled)
    }
}

pub fn ensure_owner(caps: &dyn Capabilities, caller: &Addr) -> Result<(), ContractError> {
    if !caps.is_owner(caller)? {
        return Err(ContractError::CapabilityDenied {});
    }
    Ok(())
}

pub fn ensure_lock_transfer(caps: &dyn Capabilities, caller: &Addr) -> Result<(), ContractError> {
    if !caps.has_lock_transfer_capability(caller)? {
        return Err(ContractError::CapabilityDenied {});
    }
    Ok(())
}
