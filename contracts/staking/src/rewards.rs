use crate::ContractError;

// ── Rate-domain constants ───────────────────────────────────────────────────

/// Fixed 365-day year used by the accrual formula.
///
/// A calendar-exact year would make identical stakes accrue differently
/// depending on when they were opened; a fixed denominator keeps the math
/// reproducible.
pub const SECONDS_PER_YEAR: u64 = 31_536_000;

/// Basis-point denominator (10_000 bp = 100 %).
pub const BPS_DENOMINATOR: i128 = 10_000;

/// Highest APY the administrator may configure (100 %).
pub const MAX_APY_BPS: u32 = 10_000;

/// Longest cooldown the administrator may configure (one year).
pub const MAX_COOLDOWN_SECONDS: u64 = SECONDS_PER_YEAR;

// ── Core accrual engine ─────────────────────────────────────────────────────

/// Reward accrued by `principal` between `last_accrual_time` and `now`:
///
/// ```text
/// pending = principal × apy_bps × elapsed ⁄ (10_000 × SECONDS_PER_YEAR)
/// ```
///
/// Integer arithmetic, truncating toward zero. Returns 0 for an empty
/// position or a zero-length window. A clock reading behind the stored
/// checkpoint violates the clock-source contract and fails with
/// `ClockRegression`; an intermediate product exceeding `i128` fails with
/// `ArithmeticOverflow`.
#[allow(clippy::arithmetic_side_effects)]
pub fn pending_reward(
    principal: i128,
    apy_bps: u32,
    last_accrual_time: u64,
    now: u64,
) -> Result<i128, ContractError> {
    if now < last_accrual_time {
        return Err(ContractError::ClockRegression);
    }
    if principal <= 0 {
        return Ok(0);
    }

    let elapsed = now - last_accrual_time;
    if elapsed == 0 {
        return Ok(0);
    }

    let gross = principal
        .checked_mul(apy_bps as i128)
        .and_then(|v| v.checked_mul(elapsed as i128))
        .ok_or(ContractError::ArithmeticOverflow)?;

    // Divisor is a positive constant, so the division itself cannot fail.
    Ok(gross / (BPS_DENOMINATOR * SECONDS_PER_YEAR as i128))
}

// ── Unit tests ──────────────────────────────────────────────────────────────
// Pure-math tests with no Soroban environment dependency.
