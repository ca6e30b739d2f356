use anchor_lang::prelude::*;

use crate::errors::SaleError;
use crate::ledger;
use crate::phase::{require_phase, SalePhase};
use crate::state::{ParticipantBalances, PoolState};

// ─────────────────────────────────────────────────────────────────────────────
// Exchange engine
// ─────────────────────────────────────────────────────────────────────────────
//
// deposit  ──deposit_for_claim──▶  claim  ──redeem_claim_for_asset──▶  asset
//          ◀──reverse_claim─────
//
// Every operation stages its writes on copies of the pool and the
// participant, then commits both at the end. Any `Err` leaves the caller's
// values untouched.

/// What a successful exchange moved. The instruction layer mirrors these
/// amounts onto the token accounts.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Exchange {
    /// Phase the operation ran in.
    pub phase: SalePhase,
    /// Claims minted (deposit) or burned (reverse, redeem).
    pub claims: u64,
    /// Deposit currency (reverse) or distributed asset (redeem) paid out.
    /// Zero for deposits.
    pub payout: u64,
    /// Set when this call froze the distribution denominator.
    pub frozen_denominator: Option<u64>,
}

/// Exchanges deposit currency for claims, 1:1.
pub fn deposit_for_claim(
    pool: &mut PoolState,
    participant: &mut ParticipantBalances,
    amount: u64,
    now: i64,
) -> Result<Exchange> {
    let phase = require_phase("deposit", now, &pool.config, SalePhase::accepts_deposits)?;
    require_gt!(amount, 0u64, SaleError::InvalidAmount);

    let mut next = pool.clone();
    let mut wallet = participant.clone();

    ledger::transfer(
        &mut wallet.deposit_balance,
        &mut next.deposit_vault_balance,
        amount,
    )?;
    ledger::mint_to(&mut next.claim_supply, &mut wallet.claim_balance, amount)?;

    *pool = next;
    *participant = wallet;

    msg!(
        "SALE: {} deposited {} (claims held: {}, outstanding: {})",
        participant.owner,
        amount,
        participant.claim_balance,
        pool.claim_supply
    );

    Ok(Exchange {
        phase,
        claims: amount,
        payout: 0,
        frozen_denominator: None,
    })
}

/// Burns claims and returns the same amount of deposit currency. Only while
/// deposits are open: after that the denominator is frozen.
pub fn reverse_claim(
    pool: &mut PoolState,
    participant: &mut ParticipantBalances,
    amount: u64,
    now: i64,
) -> Result<Exchange> {
    let phase = require_phase("reverse", now, &pool.config, SalePhase::accepts_deposits)?;
    require_gt!(amount, 0u64, SaleError::InvalidAmount);
    require_gte!(
        participant.claim_balance,
        amount,
        SaleError::InsufficientBalance
    );

    let mut next = pool.clone();
    let mut wallet = participant.clone();

    ledger::burn(&mut next.claim_supply, &mut wallet.claim_balance, amount)?;
    ledger::transfer(
        &mut next.deposit_vault_balance,
        &mut wallet.deposit_balance,
        amount,
    )?;

    *pool = next;
    *participant = wallet;

    msg!(
        "SALE: {} reversed {} claims (claims held: {}, outstanding: {})",
        participant.owner,
        amount,
        participant.claim_balance,
        pool.claim_supply
    );

    Ok(Exchange {
        phase,
        claims: amount,
        payout: amount,
        frozen_denominator: None,
    })
}

/// Burns claims for a pro-rata share of the distributed asset:
/// `floor(amount * distributed_asset_total / total_deposited_at_close)`.
///
/// The first successful call after deposits close freezes the denominator.
/// Floor rounding leaves dust in the asset vault; it is bounded by the
/// number of redemptions and never paid out.
pub fn redeem_claim_for_asset(
    pool: &mut PoolState,
    participant: &mut ParticipantBalances,
    amount: u64,
    now: i64,
) -> Result<Exchange> {
    let phase = require_phase("redeem", now, &pool.config, SalePhase::allows_redemption)?;
    require_gt!(amount, 0u64, SaleError::InvalidAmount);
    require_gte!(
        participant.claim_balance,
        amount,
        SaleError::InsufficientBalance
    );

    let mut next = pool.clone();
    let mut wallet = participant.clone();

    let frozen_denominator = next.freeze_distribution(now);
    let payout = distribution_share(
        amount,
        next.config.distributed_asset_total,
        next.distribution_denominator(),
    )?;

    ledger::burn(&mut next.claim_supply, &mut wallet.claim_balance, amount)?;
    ledger::transfer(
        &mut next.asset_vault_balance,
        &mut wallet.asset_balance,
        payout,
    )?;

    *pool = next;
    *participant = wallet;

    msg!(
        "SALE: {} redeemed {} claims for {} (asset vault: {})",
        participant.owner,
        amount,
        payout,
        pool.asset_vault_balance
    );

    Ok(Exchange {
        phase,
        claims: amount,
        payout,
        frozen_denominator,
    })
}

/// Read-only preview of what `redeem_claim_for_asset` would pay for
/// `amount` claims at `now`.
pub fn quote_redemption(pool: &PoolState, amount: u64, now: i64) -> Result<u64> {
    require_phase("quote", now, &pool.config, SalePhase::allows_redemption)?;
    require_gt!(amount, 0u64, SaleError::InvalidAmount);
    require_gte!(pool.claim_supply, amount, SaleError::InsufficientBalance);

    distribution_share(
        amount,
        pool.config.distributed_asset_total,
        pool.distribution_denominator(),
    )
}

/// `floor(amount * total / denominator)` with a 128-bit intermediate.
pub fn distribution_share(amount: u64, total: u64, denominator: u64) -> Result<u64> {
    let share = (amount as u128)
        .checked_mul(total as u128)
        .ok_or(SaleError::ArithmeticOverflow)?
        .checked_div(denominator as u128)
        .ok_or(SaleError::ArithmeticOverflow)?;

    u64::try_from(share).map_err(|_| error!(SaleError::ArithmeticOverflow))
}
