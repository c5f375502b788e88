#![no_std]

pub mod events;
pub mod ledger;
pub mod rewards;

use soroban_sdk::{contract, contractimpl, symbol_short, token, Address, Env, Symbol};

use ledger::{StakeRecord, StakeState};
use rewards::{MAX_APY_BPS, MAX_COOLDOWN_SECONDS};

// ── Storage key constants ────────────────────────────────────────────────────

const ADMIN: Symbol = symbol_short!("ADMIN");
const PENDING_ADMIN: Symbol = symbol_short!("PEND_ADM");
const INITIALIZED: Symbol = symbol_short!("INIT");
const STAKE_TOKEN: Symbol = symbol_short!("STK_TOK");
const REWARD_TOKEN: Symbol = symbol_short!("RWD_TOK");
const APY_BPS: Symbol = symbol_short!("APY_BPS");
const COOLDOWN_SECONDS: Symbol = symbol_short!("COOL_SECS");
const TOTAL_STAKED: Symbol = symbol_short!("TOT_STK");

// ── Contract errors ──────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    InvalidParameter = 4,
    InvalidAmount = 5,
    StakeLockedByCooldown = 6,
    NothingStaked = 7,
    CooldownAlreadyActive = 8,
    NoCooldown = 9,
    CooldownNotElapsed = 10,
    TransferFailed = 11,
    ClockRegression = 12,
    ArithmeticOverflow = 13,
    TokensIdentical = 14,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct StakingContract;

#[contractimpl]
impl StakingContract {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the contract.
    ///
    /// * `stake_token`      – SAC address of the token users stake.
    /// * `reward_token`     – SAC address of the token paid out as yield.
    /// * `apy_bps`          – annual yield in basis points (1 bp = 0.01 %).
    /// * `cooldown_seconds` – seconds between `initiate_unstake` and
    ///   withdrawal eligibility. Zero is legal (instant withdrawal).
    pub fn initialize(
        env: Env,
        admin: Address,
        stake_token: Address,
        reward_token: Address,
        apy_bps: u32,
        cooldown_seconds: u64,
    ) -> Result<(), ContractError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::AlreadyInitialized);
        }
        if stake_token == reward_token {
            return Err(ContractError::TokensIdentical);
        }
        if apy_bps > MAX_APY_BPS || cooldown_seconds > MAX_COOLDOWN_SECONDS {
            return Err(ContractError::InvalidParameter);
        }

        env.storage().instance().set(&ADMIN, &admin);
        env.storage().instance().set(&INITIALIZED, &true);
        env.storage().instance().set(&STAKE_TOKEN, &stake_token);
        env.storage().instance().set(&REWARD_TOKEN, &reward_token);
        env.storage().instance().set(&APY_BPS, &apy_bps);
        env.storage().instance().set(&COOLDOWN_SECONDS, &cooldown_seconds);
        // TOTAL_STAKED starts at zero; unwrap_or(0) handles the absent key.

        events::publish_initialized(
            &env,
            admin,
            stake_token,
            reward_token,
            apy_bps,
            cooldown_seconds,
        );

        Ok(())
    }

    // ── Staking ─────────────────────────────────────────────────────────────

    /// Deposit `amount` stake tokens.
    ///
    /// Pending reward is settled before the principal changes, so the new
    /// deposit never earns yield for time it was not in custody. Rejected
    /// while a cooldown window is open: principal mid-exit and fresh
    /// principal cannot share one record.
    pub fn stake(env: Env, staker: Address, amount: i128) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();

        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }

        let now = env.ledger().timestamp();
        let mut record = ledger::load_record(&env, &staker);

        if record.has_open_cooldown() {
            return Err(ContractError::StakeLockedByCooldown);
        }

        // 1. Settle accrued reward at the pre-deposit principal.
        Self::settle_rewards(&env, &mut record, now)?;

        // 2. Pull tokens from the staker into custody. The ledger is only
        //    written after the transfer is confirmed.
        let stake_token = Self::read_stake_token(&env)?;
        Self::transfer_tokens(
            &env,
            &stake_token,
            &staker,
            &env.current_contract_address(),
            amount,
        )?;

        // 3. Commit the enlarged position.
        record.principal = record
            .principal
            .checked_add(amount)
            .ok_or(ContractError::ArithmeticOverflow)?;
        ledger::store_record(&env, &staker, &record);

        let new_total = Self::read_total_staked(&env)
            .checked_add(amount)
            .ok_or(ContractError::ArithmeticOverflow)?;
        env.storage().instance().set(&TOTAL_STAKED, &new_total);

        events::publish_staked(&env, staker, amount, record.principal, new_total);

        Ok(())
    }

    // ── Unstaking ───────────────────────────────────────────────────────────

    /// Open the cooldown window over the account's full principal.
    ///
    /// The unlock timestamp is computed here from the currently configured
    /// cooldown and persisted, so later administrator changes never move a
    /// window already in flight. No tokens move until `withdraw`.
    pub fn initiate_unstake(env: Env, staker: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();

        let now = env.ledger().timestamp();
        let mut record = ledger::load_record(&env, &staker);

        if record.principal <= 0 {
            return Err(ContractError::NothingStaked);
        }
        if record.has_open_cooldown() {
            return Err(ContractError::CooldownAlreadyActive);
        }

        Self::settle_rewards(&env, &mut record, now)?;

        let cooldown_seconds = Self::read_cooldown_period(&env);
        record.cooldown_start = now;
        record.cooldown_end = now
            .checked_add(cooldown_seconds)
            .ok_or(ContractError::ArithmeticOverflow)?;
        record.cooldown_amount = record.principal;
        ledger::store_record(&env, &staker, &record);

        events::publish_cooldown_started(&env, staker, record.cooldown_amount, record.cooldown_end);

        Ok(())
    }

    /// Pay out a matured cooldown: the cooled principal in stake tokens plus
    /// the full claimable reward in reward tokens.
    ///
    /// Fails with `CooldownNotElapsed` strictly before the unlock timestamp
    /// and succeeds exactly at it. Both transfers must be confirmed before
    /// any ledger write; if either fails the call fails with
    /// `TransferFailed` and the record is left untouched.
    pub fn withdraw(env: Env, staker: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();

        let now = env.ledger().timestamp();
        let mut record = ledger::load_record(&env, &staker);

        if !record.has_open_cooldown() {
            return Err(ContractError::NoCooldown);
        }
        if now < record.cooldown_end {
            return Err(ContractError::CooldownNotElapsed);
        }

        // Final settlement at the current APY, covering the cooldown window.
        Self::settle_rewards(&env, &mut record, now)?;

        let principal_out = record.cooldown_amount;
        let reward_out = record.claimable_reward;
        let contract = env.current_contract_address();

        let stake_token = Self::read_stake_token(&env)?;
        Self::transfer_tokens(&env, &stake_token, &contract, &staker, principal_out)?;

        if reward_out > 0 {
            let reward_token = Self::read_reward_token(&env)?;
            Self::transfer_tokens(&env, &reward_token, &contract, &staker, reward_out)?;
        }

        record.principal = record
            .principal
            .checked_sub(principal_out)
            .ok_or(ContractError::ArithmeticOverflow)?;
        record.claimable_reward = 0;
        record.cooldown_start = 0;
        record.cooldown_end = 0;
        record.cooldown_amount = 0;
        ledger::store_record(&env, &staker, &record);

        let new_total = Self::read_total_staked(&env)
            .checked_sub(principal_out)
            .ok_or(ContractError::ArithmeticOverflow)?;
        env.storage().instance().set(&TOTAL_STAKED, &new_total);

        events::publish_withdrawn(&env, staker, principal_out, reward_out);

        Ok(())
    }

    // ── Rewards ─────────────────────────────────────────────────────────────

    /// Settle and pay out all claimable reward for `staker` without touching
    /// principal or an open cooldown window.
    ///
    /// Returns the amount paid. An account with an active position but a
    /// zero balance receives 0 without failing; an idle account fails with
    /// `NothingStaked`.
    pub fn claim_rewards(env: Env, staker: Address) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();

        let now = env.ledger().timestamp();
        let mut record = ledger::load_record(&env, &staker);

        if record.principal <= 0 && !record.has_open_cooldown() {
            return Err(ContractError::NothingStaked);
        }

        Self::settle_rewards(&env, &mut record, now)?;

        let earned = record.claimable_reward;
        if earned == 0 {
            // Nothing to transfer; persist the advanced accrual checkpoint.
            ledger::store_record(&env, &staker, &record);
            return Ok(0);
        }

        record.claimable_reward = 0;

        let reward_token = Self::read_reward_token(&env)?;
        Self::transfer_tokens(
            &env,
            &reward_token,
            &env.current_contract_address(),
            &staker,
            earned,
        )?;
        ledger::store_record(&env, &staker, &record);

        events::publish_reward_claimed(&env, staker, earned);

        Ok(earned)
    }

    // ── View functions ──────────────────────────────────────────────────────

    /// Snapshot of an account's record. Unknown accounts read as all-zero.
    pub fn get_stake_info(env: Env, staker: Address) -> StakeRecord {
        ledger::load_record(&env, &staker)
    }

    /// Total claimable reward — settled balance plus reward accrued since
    /// the last settlement at the current APY — without committing anything.
    pub fn calculate_reward(env: Env, staker: Address) -> Result<i128, ContractError> {
        let record = ledger::load_record(&env, &staker);
        let pending = rewards::pending_reward(
            record.principal,
            Self::read_apy(&env),
            record.last_accrual_time,
            env.ledger().timestamp(),
        )?;
        record
            .claimable_reward
            .checked_add(pending)
            .ok_or(ContractError::ArithmeticOverflow)
    }

    /// Lifecycle state of an account, derived from its record.
    pub fn get_stake_state(env: Env, staker: Address) -> StakeState {
        ledger::load_record(&env, &staker).state_at(env.ledger().timestamp())
    }

    /// Current annual yield in basis points.
    pub fn get_apy(env: Env) -> u32 {
        Self::read_apy(&env)
    }

    /// Cooldown applied to *future* unstake initiations, in seconds.
    pub fn get_cooldown_period(env: Env) -> u64 {
        Self::read_cooldown_period(&env)
    }

    /// Sum of all principal currently in custody.
    pub fn get_total_staked(env: Env) -> i128 {
        Self::read_total_staked(&env)
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&INITIALIZED)
    }

    pub fn get_admin(env: Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&ADMIN)
            .ok_or(ContractError::NotInitialized)
    }

    // ── Admin functions ─────────────────────────────────────────────────────

    /// Replace the APY used for all accrual computed after this call.
    ///
    /// Reward already settled into `claimable_reward` is never recomputed.
    pub fn set_apy(env: Env, caller: Address, new_apy_bps: u32) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_admin(&env, &caller)?;

        if new_apy_bps > MAX_APY_BPS {
            return Err(ContractError::InvalidParameter);
        }

        env.storage().instance().set(&APY_BPS, &new_apy_bps);

        events::publish_apy_set(&env, new_apy_bps);

        Ok(())
    }

    /// Update the cooldown for future unstake initiations. Windows already
    /// open keep the unlock timestamp fixed at their initiation.
    pub fn set_cooldown_period(
        env: Env,
        caller: Address,
        new_seconds: u64,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_admin(&env, &caller)?;

        if new_seconds > MAX_COOLDOWN_SECONDS {
            return Err(ContractError::InvalidParameter);
        }

        env.storage().instance().set(&COOLDOWN_SECONDS, &new_seconds);

        events::publish_cooldown_period_set(&env, new_seconds);

        Ok(())
    }

    // ── Admin transfer (two-step) ───────────────────────────────────────────

    /// Propose a new admin address. Only the current admin can call this.
    /// The new admin must call `accept_admin` to complete the transfer.
    pub fn propose_admin(
        env: Env,
        current_admin: Address,
        new_admin: Address,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        current_admin.require_auth();
        Self::require_admin(&env, &current_admin)?;

        env.storage().instance().set(&PENDING_ADMIN, &new_admin);

        events::publish_admin_transfer_proposed(&env, current_admin, new_admin);

        Ok(())
    }

    /// Accept the pending admin transfer. Only the proposed new admin can
    /// call this.
    pub fn accept_admin(env: Env, new_admin: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        new_admin.require_auth();

        let pending: Address = env
            .storage()
            .instance()
            .get(&PENDING_ADMIN)
            .ok_or(ContractError::InvalidParameter)?;

        if new_admin != pending {
            return Err(ContractError::Unauthorized);
        }

        let old_admin: Address = env
            .storage()
            .instance()
            .get(&ADMIN)
            .ok_or(ContractError::NotInitialized)?;

        env.storage().instance().set(&ADMIN, &new_admin);
        env.storage().instance().remove(&PENDING_ADMIN);

        events::publish_admin_transfer_accepted(&env, old_admin, new_admin);

        Ok(())
    }

    /// Cancel a pending admin transfer. Only the current admin can call this.
    pub fn cancel_admin_transfer(env: Env, current_admin: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        current_admin.require_auth();
        Self::require_admin(&env, &current_admin)?;

        let pending: Address = env
            .storage()
            .instance()
            .get(&PENDING_ADMIN)
            .ok_or(ContractError::InvalidParameter)?;

        env.storage().instance().remove(&PENDING_ADMIN);

        events::publish_admin_transfer_cancelled(&env, current_admin, pending);

        Ok(())
    }

    /// Get the pending admin address, if any.
    pub fn get_pending_admin(env: Env) -> Option<Address> {
        env.storage().instance().get(&PENDING_ADMIN)
    }

    // ── Internal helpers ────────────────────────────────────────────────────

    /// Guard: fail if the contract is not yet initialized.
    fn require_initialized(env: &Env) -> Result<(), ContractError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::NotInitialized);
        }
        Ok(())
    }

    /// Guard: fail if `caller` is not the stored admin.
    fn require_admin(env: &Env, caller: &Address) -> Result<(), ContractError> {
        let admin: Address = env
            .storage()
            .instance()
            .get(&ADMIN)
            .ok_or(ContractError::NotInitialized)?;
        if *caller != admin {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    /// Commit pending reward into `claimable_reward` and advance the accrual
    /// checkpoint to `now`. Runs at the head of every mutating staker
    /// operation, before the operation's own effect.
    fn settle_rewards(env: &Env, record: &mut StakeRecord, now: u64) -> Result<(), ContractError> {
        let pending = rewards::pending_reward(
            record.principal,
            Self::read_apy(env),
            record.last_accrual_time,
            now,
        )?;
        if pending > 0 {
            record.claimable_reward = record
                .claimable_reward
                .checked_add(pending)
                .ok_or(ContractError::ArithmeticOverflow)?;
        }
        record.last_accrual_time = now;
        Ok(())
    }

    /// Move tokens through the token contract, mapping any failure to
    /// `TransferFailed`. Callers write the ledger only after this returns
    /// success; an error return aborts the invocation's storage writes, so a
    /// half-paid operation cannot be observed.
    fn transfer_tokens(
        env: &Env,
        token_addr: &Address,
        from: &Address,
        to: &Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        match token::Client::new(env, token_addr).try_transfer(from, to, &amount) {
            Ok(Ok(_)) => Ok(()),
            _ => Err(ContractError::TransferFailed),
        }
    }

    fn read_apy(env: &Env) -> u32 {
        env.storage().instance().get(&APY_BPS).unwrap_or(0)
    }

    fn read_cooldown_period(env: &Env) -> u64 {
        env.storage().instance().get(&COOLDOWN_SECONDS).unwrap_or(0)
    }

    fn read_total_staked(env: &Env) -> i128 {
        env.storage().instance().get(&TOTAL_STAKED).unwrap_or(0)
    }

    fn read_stake_token(env: &Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&STAKE_TOKEN)
            .ok_or(ContractError::NotInitialized)
    }

    fn read_reward_token(env: &Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&REWARD_TOKEN)
            .ok_or(ContractError::NotInitialized)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
