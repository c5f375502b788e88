#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, Env};

// ── Event payloads ──────────────────────────────────────────────────────────

/// Fired once when the contract is bootstrapped.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub admin: Address,
    pub stake_token: Address,
    pub reward_token: Address,
    pub apy_bps: u32,
    pub cooldown_seconds: u64,
    pub timestamp: u64,
}

/// Fired when a user deposits stake.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakedEvent {
    pub staker: Address,
    pub amount: i128,
    pub new_principal: i128,
    pub new_total_staked: i128,
    pub timestamp: u64,
}

/// Fired when a user opens their unstake cooldown window.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CooldownStartedEvent {
    pub staker: Address,
    pub amount: i128,
    pub cooldown_end: u64,
    pub timestamp: u64,
}

/// Fired when a user withdraws after the cooldown elapses.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawnEvent {
    pub staker: Address,
    pub principal: i128,
    pub reward: i128,
    pub timestamp: u64,
}

/// Fired when a user claims accumulated rewards.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardClaimedEvent {
    pub staker: Address,
    pub amount: i128,
    pub timestamp: u64,
}

/// Fired when the administrator changes the APY.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApySetEvent {
    pub new_apy_bps: u32,
    pub timestamp: u64,
}

/// Fired when the administrator changes the cooldown period.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CooldownPeriodSetEvent {
    pub new_seconds: u64,
    pub timestamp: u64,
}

/// Fired when an admin transfer is proposed.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdminTransferProposedEvent {
    pub current_admin: Address,
    pub proposed_admin: Address,
    pub timestamp: u64,
}

/// Fired when the proposed admin accepts the transfer.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdminTransferAcceptedEvent {
    pub old_admin: Address,
    pub new_admin: Address,
    pub timestamp: u64,
}

/// Fired when a pending admin transfer is cancelled.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdminTransferCancelledEvent {
    pub admin: Address,
    pub cancelled_proposed: Address,
    pub timestamp: u64,
}

// ── Publishers ──────────────────────────────────────────────────────────────

pub fn publish_initialized(
    env: &Env,
    admin: Address,
    stake_token: Address,
    reward_token: Address,
    apy_bps: u32,
    cooldown_seconds: u64,
) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            admin,
            stake_token,
            reward_token,
            apy_bps,
            cooldown_seconds,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_staked(
    env: &Env,
    staker: Address,
    amount: i128,
    new_principal: i128,
    new_total_staked: i128,
) {
    env.events().publish(
        (symbol_short!("STAKED"), staker.clone()),
        StakedEvent {
            staker,
            amount,
            new_principal,
            new_total_staked,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_cooldown_started(env: &Env, staker: Address, amount: i128, cooldown_end: u64) {
    env.events().publish(
        (symbol_short!("COOL_STRT"), staker.clone()),
        CooldownStartedEvent {
            staker,
            amount,
            cooldown_end,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_withdrawn(env: &Env, staker: Address, principal: i128, reward: i128) {
    env.events().publish(
        (symbol_short!("WITHDRAWN"), staker.clone()),
        WithdrawnEvent {
            staker,
            principal,
            reward,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_reward_claimed(env: &Env, staker: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("CLMD"), staker.clone()),
        RewardClaimedEvent {
            staker,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_apy_set(env: &Env, new_apy_bps: u32) {
    env.events().publish(
        (symbol_short!("APY_SET"),),
        ApySetEvent {
            new_apy_bps,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_cooldown_period_set(env: &Env, new_seconds: u64) {
    env.events().publish(
        (symbol_short!("COOL_SET"),),
        CooldownPeriodSetEvent {
            new_seconds,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_admin_transfer_proposed(env: &Env, current_admin: Address, proposed_admin: Address) {
    env.events().publish(
        (symbol_short!("ADM_PROP"), current_admin.clone()),
        AdminTransferProposedEvent {
            current_admin,
            proposed_admin,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_admin_transfer_accepted(env: &Env, old_admin: Address, new_admin: Address) {
    env.events().publish(
        (symbol_short!("ADM_ACPT"), new_admin.clone()),
        AdminTransferAcceptedEvent {
            old_admin,
            new_admin,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_admin_transfer_cancelled(env: &Env, admin: Address, cancelled_proposed: Address) {
    env.events().publish(
        (symbol_short!("ADM_CNCL"), admin.clone()),
        AdminTransferCancelledEvent {
            admin,
            cancelled_proposed,
            timestamp: env.ledger().timestamp(),
        },
    );
}
