use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

// ── Storage key constants ───────────────────────────────────────────────────

// Per-account records use tuple keys: (prefix, account_address)
const STAKE_RECORD: Symbol = symbol_short!("STK_REC");

// ── Types ───────────────────────────────────────────────────────────────────

/// One account's staking position.
///
/// A record is created implicitly on first deposit and never deleted: a
/// fully withdrawn account holds the all-zero record, indistinguishable
/// from an account that never staked.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakeRecord {
    /// Staked amount currently in custody.
    pub principal: i128,
    /// Timestamp of the last event that settled pending reward into
    /// `claimable_reward`.
    pub last_accrual_time: u64,
    /// Reward settled but not yet transferred out.
    pub claimable_reward: i128,
    /// Ledger timestamp at which the cooldown window was opened.
    /// Zero when no window is open.
    pub cooldown_start: u64,
    /// Timestamp after which withdrawal is permitted. Computed once at
    /// initiation, so later changes to the configured cooldown never move
    /// an open window. Zero when no window is open.
    pub cooldown_end: u64,
    /// Amount undergoing cooldown. Equals `principal` while a window is
    /// open, but tracked separately so withdrawal stays idempotent.
    pub cooldown_amount: i128,
}

/// Composite lifecycle state derived from a record's fields.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StakeState {
    Idle,
    Staked,
    Cooling,
    Withdrawable,
}

impl StakeRecord {
    pub fn empty() -> Self {
        Self {
            principal: 0,
            last_accrual_time: 0,
            claimable_reward: 0,
            cooldown_start: 0,
            cooldown_end: 0,
            cooldown_amount: 0,
        }
    }

    /// True while an unstake cooldown window is open for this account.
    ///
    /// The cooled amount is the authoritative marker: it is positive for
    /// exactly the lifetime of a window, whereas a start timestamp of zero
    /// is ambiguous for a window opened at ledger time zero.
    pub fn has_open_cooldown(&self) -> bool {
        self.cooldown_amount > 0
    }

    pub fn state_at(&self, now: u64) -> StakeState {
        if self.has_open_cooldown() {
            if now >= self.cooldown_end {
                StakeState::Withdrawable
            } else {
                StakeState::Cooling
            }
        } else if self.principal > 0 {
            StakeState::Staked
        } else {
            StakeState::Idle
        }
    }
}

// ── Storage helpers ─────────────────────────────────────────────────────────

fn record_key(account: &Address) -> (Symbol, Address) {
    (STAKE_RECORD, account.clone())
}

/// Load an account's record, yielding the all-zero record for accounts
/// that have never staked.
pub fn load_record(env: &Env, account: &Address) -> StakeRecord {
    env.storage()
        .persistent()
        .get(&record_key(account))
        .unwrap_or_else(StakeRecord::empty)
}

/// Persist an account's record.
pub fn store_record(env: &Env, account: &Address, record: &StakeRecord) {
    env.storage().persistent().set(&record_key(account), record);
}

// ── Unit tests ──────────────────────────────────────────────────────────────
