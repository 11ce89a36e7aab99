use cosmwasm_std::{
    entry_point, to_binary, Addr, Api, Binary, CosmosMsg, Deps, DepsMut, Empty, Env,
    MessageInfo, Order, Response, StdError, StdResult, Storage, Timestamp, Uint128,
};
use cw_storage_plus::Bound;

use crate::balance;
use crate::capability::{ensure_lock_transfer, ensure_owner, Capabilities, StoredCapabilities};
use crate::error::ContractError;
use crate::events;
use crate::ledger::{self, LedgerConfig, DEFAULT_LIMIT, MAX_LIMIT};
use crate::msg::{
    AvailableBalanceResponse, ConfigResponse, ExecuteMsg, InstantiateMsg, LockCountResponse,
    LockEntriesResponse, LockInfo, LockTransferAdminsResponse, LockedAmountResponse, MigrateMsg,
    QueryMsg,
};
use crate::state::{
    Config, LockEntry, CONFIG, DEFAULT_MAX_LOCKS_PER_ACCOUNT, LOCK_TRANSFER_ADMINS,
};

use cw2::{get_contract_version, set_contract_version};
use cw20::{Cw20Coin, Cw20ReceiveMsg};
use cw20_base::allowances::{
    deduct_allowance, execute_decrease_allowance, execute_increase_allowance, query_allowance,
};
use cw20_base::contract::{query_balance, query_minter, query_token_info};
use cw20_base::msg::InstantiateMsg as Cw20InstantiateMsg;
use cw20_base::enumerable::{query_all_accounts, query_owner_allowances};
use cw20_base::state::{MinterData, TokenInfo, TOKEN_INFO};

// version info for migration info
const CONTRACT_NAME: &str = "crates.io:cw-disper-locktoken";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;
    // name, symbol and decimals follow the cw20-base rules
    Cw20InstantiateMsg {
        name: msg.name.clone(),
        symbol: msg.symbol.clone(),
        decimals: msg.decimals,
        initial_balances: vec![],
        mint: None,
        marketing: None,
    }
    .validate()?;
    validate_initial_balances(&msg.initial_balances)?;

    let max_locks_per_account = msg
        .max_locks_per_account
        .unwrap_or(DEFAULT_MAX_LOCKS_PER_ACCOUNT);
    if max_locks_per_account == 0 {
        return Err(ContractError::InvalidConfig {
            reason: "max_locks_per_account must be positive".to_string(),
        });
    }

    let mint = match msg.mint {
        Some(m) => Some(MinterData {
            minter: deps.api.addr_validate(&m.minter)?,
            cap: m.cap,
        }),
        None => None,
    };

    // store token info
    let data = TokenInfo {
        name: msg.name,
        symbol: msg.symbol,
        decimals: msg.decimals,
        total_supply: Uint128::zero(),
        mint,
    };
    TOKEN_INFO.save(deps.storage, &data)?;

    for coin in msg.initial_balances {
        if coin.amount.is_zero() {
            continue;
        }
        let address = deps.api.addr_validate(&coin.address)?;
        balance::mint(deps.storage, &address, coin.amount)?;
    }

    let config = Config {
        owner: info.sender.clone(),
        lock_enabled: msg.lock_enabled,
        max_locks_per_account,
    };
    CONFIG.save(deps.storage, &config)?;

    for admin in msg.lock_transfer_admins {
        let admin = deps.api.addr_validate(&admin)?;
        LOCK_TRANSFER_ADMINS.save(deps.storage, &admin, &Empty {})?;
    }

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("owner", info.sender))
}

fn validate_initial_balances(balances: &[Cw20Coin]) -> Result<(), ContractError> {
    let mut addresses: Vec<&str> = balances.iter().map(|c| c.address.as_str()).collect();
    addresses.sort_unstable();
    addresses.dedup();
    if addresses.len() != balances.len() {
        return Err(ContractError::DuplicateInitialBalanceAddresses {});
    }
    Ok(())
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::Transfer { recipient, amount } => {
            execute_transfer(deps, env, info, recipient, amount)
        }
        ExecuteMsg::TransferAndLock {
            recipient,
            amount,
            duration,
        } => execute_transfer_and_lock(deps, env, info, recipient, amount, duration),
        ExecuteMsg::Burn { amount } => execute_burn(deps, env, info, amount),
        ExecuteMsg::Send {
            contract,
            amount,
            msg,
        } => execute_send(deps, env, info, contract, amount, msg),
        ExecuteMsg::Mint { recipient, amount } => execute_mint(deps, info, recipient, amount),

        // cw20 approval extension
        ExecuteMsg::IncreaseAllowance {
            spender,
            amount,
            expires,
        } => Ok(execute_increase_allowance(
            deps, env, info, spender, amount, expires,
        )?),
        ExecuteMsg::DecreaseAllowance {
            spender,
            amount,
            expires,
        } => Ok(execute_decrease_allowance(
            deps, env, info, spender, amount, expires,
        )?),
        ExecuteMsg::TransferFrom {
            owner,
            recipient,
            amount,
        } => execute_transfer_from(deps, env, info, owner, recipient, amount),
        ExecuteMsg::BurnFrom { owner, amount } => execute_burn_from(deps, env, info, owner, amount),

        // administration
        ExecuteMsg::EnableLock {} => execute_set_lock_enabled(deps, env, info, true),
        ExecuteMsg::DisableLock {} => execute_set_lock_enabled(deps, env, info, false),
        ExecuteMsg::GrantLockTransfer { address } => {
            execute_grant_lock_transfer(deps, info, address)
        }
        ExecuteMsg::RevokeLockTransfer { address } => {
            execute_revoke_lock_transfer(deps, info, address)
        }
        ExecuteMsg::AdminBurn { account, amount } => {
            execute_admin_burn(deps, info, account, amount)
        }
        ExecuteMsg::UpdateOwner { owner } => execute_update_owner(deps, info, owner),
    }
}

fn load_ledger_config(storage: &dyn Storage) -> StdResult<LedgerConfig> {
    Ok(LedgerConfig::from(&CONFIG.load(storage)?))
}

/// An empty string names the null account, which the ledger refuses to credit.
fn validate_account(api: &dyn Api, account: &str) -> StdResult<Addr> {
    if account.is_empty() {
        return Ok(balance::null_account());
    }
    api.addr_validate(account)
}

pub fn execute_transfer(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    recipient: String,
    amount: Uint128,
) -> Result<Response, ContractError> {
    let recipient = validate_account(deps.api, &recipient)?;
    let config = load_ledger_config(deps.storage)?;

    ledger::transfer(
        deps.storage,
        &config,
        &info.sender,
        &recipient,
        amount,
        env.block.time,
    )?;

    let res = Response::new()
        .add_attribute("action", "transfer")
        .add_attribute("from", info.sender)
        .add_attribute("to", recipient)
        .add_attribute("amount", amount);
    Ok(res)
}

pub fn execute_transfer_and_lock(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    recipient: String,
    amount: Uint128,
    duration: u64,
) -> Result<Response, ContractError> {
    {
        let caps = StoredCapabilities::new(deps.storage);
        ensure_lock_transfer(&caps, &info.sender)?;
        if !caps.is_lock_globally_enabled()? {
            return Err(ContractError::LockingDisabled {});
        }
    }

    let recipient = validate_account(deps.api, &recipient)?;
    let config = load_ledger_config(deps.storage)?;

    let entry = ledger::transfer_and_lock(
        deps.storage,
        &config,
        &info.sender,
        &recipient,
        amount,
        duration,
        env.block.time,
    )?;

    let res = Response::new()
        .add_attribute("action", "transfer_and_lock")
        .add_attribute("from", info.sender.clone())
        .add_attribute("to", recipient.clone())
        .add_attribute("amount", amount)
        .add_event(events::tokens_locked(&recipient, &entry))
        .add_event(events::transfer_and_lock(
            &info.sender,
            &recipient,
            amount,
            env.block.height,
        ));
    Ok(res)
}

pub fn execute_burn(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    amount: Uint128,
) -> Result<Response, ContractError> {
    let config = load_ledger_config(deps.storage)?;
    ledger::burn(deps.storage, &config, &info.sender, amount, env.block.time)?;

    let res = Response::new()
        .add_attribute("action", "burn")
        .add_attribute("from", info.sender)
        .add_attribute("amount", amount);
    Ok(res)
}

pub fn execute_send(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    contract: String,
    amount: Uint128,
    msg: Binary,
) -> Result<Response, ContractError> {
    if amount.is_zero() {
        return Err(ContractError::InvalidAmount {});
    }
    let contract = deps.api.addr_validate(&contract)?;
    let config = load_ledger_config(deps.storage)?;

    ledger::transfer(
        deps.storage,
        &config,
        &info.sender,
        &contract,
        amount,
        env.block.time,
    )?;

    // the hook runs after this execution has committed
    let hook: CosmosMsg = Cw20ReceiveMsg {
        sender: info.sender.to_string(),
        amount,
        msg,
    }
    .into_cosmos_msg(contract.to_string())?;

    let res = Response::new()
        .add_attribute("action", "send")
        .add_attribute("from", info.sender)
        .add_attribute("to", contract)
        .add_attribute("amount", amount)
        .add_message(hook);
    Ok(res)
}

pub fn execute_mint(
    deps: DepsMut,
    info: MessageInfo,
    recipient: String,
    amount: Uint128,
) -> Result<Response, ContractError> {
    let token_info = TOKEN_INFO.load(deps.storage)?;
    match token_info.mint {
        Some(ref m) if m.minter == info.sender => {}
        _ => return Err(ContractError::Unauthorized {}),
    }

    let recipient = validate_account(deps.api, &recipient)?;
    balance::mint(deps.storage, &recipient, amount)?;

    let res = Response::new()
        .add_attribute("action", "mint")
        .add_attribute("to", recipient)
        .add_attribute("amount", amount);
    Ok(res)
}

pub fn execute_transfer_from(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    owner: String,
    recipient: String,
    amount: Uint128,
) -> Result<Response, ContractError> {
    let owner = deps.api.addr_validate(&owner)?;
    let recipient = validate_account(deps.api, &recipient)?;
    let config = load_ledger_config(deps.storage)?;

    // zero moves nothing, so no allowance is consulted or spent
    if amount.is_zero() {
        return Ok(Response::new()
            .add_attribute("action", "transfer_from")
            .add_attribute("from", owner)
            .add_attribute("to", recipient)
            .add_attribute("by", info.sender)
            .add_attribute("amount", amount));
    }

    // the allowance is only spent once the transfer is known to go through
    ledger::check_transfer(
        deps.storage,
        &config,
        &owner,
        &recipient,
        amount,
        env.block.time,
    )?;
    deduct_allowance(deps.storage, &owner, &info.sender, &env.block, amount)?;
    ledger::transfer(
        deps.storage,
        &config,
        &owner,
        &recipient,
        amount,
        env.block.time,
    )?;

    let res = Response::new()
        .add_attribute("action", "transfer_from")
        .add_attribute("from", owner)
        .add_attribute("to", recipient)
        .add_attribute("by", info.sender)
        .add_attribute("amount", amount);
    Ok(res)
}

pub fn execute_burn_from(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    owner: String,
    amount: Uint128,
) -> Result<Response, ContractError> {
    let owner = deps.api.addr_validate(&owner)?;
    let config = load_ledger_config(deps.storage)?;

    ledger::check_burn(deps.storage, &config, &owner, amount, env.block.time)?;
    deduct_allowance(deps.storage, &owner, &info.sender, &env.block, amount)?;
    ledger::burn(deps.storage, &config, &owner, amount, env.block.time)?;

    let res = Response::new()
        .add_attribute("action", "burn_from")
        .add_attribute("from", owner)
        .add_attribute("by", info.sender)
        .add_attribute("amount", amount);
    Ok(res)
}

pub fn execute_set_lock_enabled(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    enabled: bool,
) -> Result<Response, ContractError> {
    ensure_owner(&StoredCapabilities::new(deps.storage), &info.sender)?;

    CONFIG.update(deps.storage, |mut config| -> StdResult<_> {
        config.lock_enabled = enabled;
        Ok(config)
    })?;

    let res = if enabled {
        Response::new()
            .add_attribute("action", "enable_lock")
            .add_event(events::lock_enabled(env.block.time))
    } else {
        Response::new()
            .add_attribute("action", "disable_lock")
            .add_event(events::lock_disabled(env.block.time))
    };
    Ok(res)
}

pub fn execute_grant_lock_transfer(
    deps: DepsMut,
    info: MessageInfo,
    address: String,
) -> Result<Response, ContractError> {
    ensure_owner(&StoredCapabilities::new(deps.storage), &info.sender)?;

    let address = deps.api.addr_validate(&address)?;
    LOCK_TRANSFER_ADMINS.save(deps.storage, &address, &Empty {})?;

    Ok(Response::new()
        .add_attribute("action", "grant_lock_transfer")
        .add_attribute("address", address))
}

pub fn execute_revoke_lock_transfer(
    deps: DepsMut,
    info: MessageInfo,
    address: String,
) -> Result<Response, ContractError> {
    ensure_owner(&StoredCapabilities::new(deps.storage), &info.sender)?;

    let address = deps.api.addr_validate(&address)?;
    LOCK_TRANSFER_ADMINS.remove(deps.storage, &address);

    Ok(Response::new()
        .add_attribute("action", "revoke_lock_transfer")
        .add_attribute("address", address))
}

/// Supply management. Goes straight to the store, so it can leave an
/// account with more locked than it holds.
pub fn execute_admin_burn(
    deps: DepsMut,
    info: MessageInfo,
    account: String,
    amount: Uint128,
) -> Result<Response, ContractError> {
    ensure_owner(&StoredCapabilities::new(deps.storage), &info.sender)?;

    let account = deps.api.addr_validate(&account)?;
    balance::burn(deps.storage, &account, amount)?;

    Ok(Response::new()
        .add_attribute("action", "admin_burn")
        .add_attribute("from", account)
        .add_attribute("amount", amount))
}

pub fn execute_update_owner(
    deps: DepsMut,
    info: MessageInfo,
    owner: String,
) -> Result<Response, ContractError> {
    ensure_owner(&StoredCapabilities::new(deps.storage), &info.sender)?;

    let owner = deps.api.addr_validate(&owner)?;
    CONFIG.update(deps.storage, |mut config| -> StdResult<_> {
        config.owner = owner.clone();
        Ok(config)
    })?;

    Ok(Response::new()
        .add_attribute("action", "update_owner")
        .add_attribute("owner", owner))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        // cw20 standard
        QueryMsg::Balance { address } => to_binary(&query_balance(deps, address)?),
        QueryMsg::TokenInfo {} => to_binary(&query_token_info(deps)?),
        QueryMsg::Minter {} => to_binary(&query_minter(deps)?),
        QueryMsg::Allowance { owner, spender } => {
            to_binary(&query_allowance(deps, owner, spender)?)
        }
        QueryMsg::AllAllowances {
            owner,
            start_after,
            limit,
        } => to_binary(&query_owner_allowances(deps, owner, start_after, limit)?),
        QueryMsg::AllAccounts { start_after, limit } => {
            to_binary(&query_all_accounts(deps, start_after, limit)?)
        }

        // locks
        QueryMsg::LockedAmount { address, at_time } => {
            let at_time = at_time.unwrap_or(env.block.time);
            to_binary(&query_locked_amount(deps, address, at_time)?)
        }
        QueryMsg::AvailableBalance { address, at_time } => {
            let at_time = at_time.unwrap_or(env.block.time);
            to_binary(&query_available_balance(deps, address, at_time)?)
        }
        QueryMsg::LockCount { address } => to_binary(&query_lock_count(deps, address)?),
        QueryMsg::LockEntry { address, index } => {
            to_binary(&query_lock_entry(deps, address, index)?)
        }
        QueryMsg::LockEntries {
            address,
            start_after,
            limit,
        } => to_binary(&query_lock_entries(deps, address, start_after, limit)?),
        QueryMsg::Config {} => to_binary(&query_config(deps)?),
        QueryMsg::LockTransferAdmins { start_after, limit } => {
            to_binary(&query_lock_transfer_admins(deps, start_after, limit)?)
        }
    }
}

fn query_locked_amount(
    deps: Deps,
    address: String,
    at_time: Timestamp,
) -> StdResult<LockedAmountResponse> {
    let address = deps.api.addr_validate(&address)?;
    let locked = ledger::locked_amount(deps.storage, &address, at_time)?;
    Ok(LockedAmountResponse { locked })
}

fn query_available_balance(
    deps: Deps,
    address: String,
    at_time: Timestamp,
) -> StdResult<AvailableBalanceResponse> {
    let address = deps.api.addr_validate(&address)?;
    let balance = ledger::available_balance(deps.storage, &address, at_time)?;
    if balance.is_overcommitted() {
        deps.api.debug(&format!(
            "{} has {} locked but holds {}",
            address, balance.locked, balance.total
        ));
    }

    Ok(AvailableBalanceResponse {
        total: balance.total,
        locked: balance.locked,
        available: balance.available,
    })
}

fn query_lock_count(deps: Deps, address: String) -> StdResult<LockCountResponse> {
    let address = deps.api.addr_validate(&address)?;
    let count = ledger::lock_count(deps.storage, &address)?;
    Ok(LockCountResponse { count })
}

fn query_lock_entry(deps: Deps, address: String, index: u32) -> StdResult<LockInfo> {
    let address = deps.api.addr_validate(&address)?;
    let entry = ledger::get_lock_entry(deps.storage, &address, index)
        .map_err(|err| match err {
            ContractError::Std(err) => err,
            other => StdError::generic_err(other.to_string()),
        })?;
    Ok(to_lock_info(index, entry))
}

fn query_lock_entries(
    deps: Deps,
    address: String,
    start_after: Option<u32>,
    limit: Option<u32>,
) -> StdResult<LockEntriesResponse> {
    let address = deps.api.addr_validate(&address)?;
    let locks = ledger::lock_entries(deps.storage, &address, start_after, limit)?
        .into_iter()
        .map(|(index, entry)| to_lock_info(index, entry))
        .collect();
    Ok(LockEntriesResponse { locks })
}

fn to_lock_info(index: u32, entry: LockEntry) -> LockInfo {
    LockInfo {
        index,
        locked_at: entry.locked_at,
        locked_amount: entry.locked_amount,
        unlock_at: entry.unlock_at,
    }
}

fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(ConfigResponse {
        owner: config.owner.into(),
        lock_enabled: config.lock_enabled,
        max_locks_per_account: config.max_locks_per_account,
    })
}

fn query_lock_transfer_admins(
    deps: Deps,
    start_after: Option<String>,
    limit: Option<u32>,
) -> StdResult<LockTransferAdminsResponse> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start_addr = start_after
        .map(|addr| deps.api.addr_validate(&addr))
        .transpose()?;
    let start = start_addr.as_ref().map(|addr| Bound::exclusive(addr));

    let admins: StdResult<Vec<_>> = LOCK_TRANSFER_ADMINS
        .keys(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .map(|item| item.map(String::from))
        .collect();

    Ok(LockTransferAdminsResponse { admins: admins? })
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    let stored = get_contract_version(deps.storage)?;
    if stored.contract != CONTRACT_NAME {
        return Err(ContractError::InvalidConfig {
            reason: format!("cannot migrate from {}", stored.contract),
        });
    }
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    Ok(Response::new()
        .add_attribute("action", "migrate")
        .add_attribute("from_version", stored.version)
        .add_attribute("to_version", CONTRACT_VERSION))
}
