use anchor_lang::prelude::*;

use crate::errors::SaleError;
use crate::ledger;
use crate::phase::{require_phase, SalePhase};
use crate::state::{ParticipantBalances, PoolState};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Withdrawal {
    /// Deposit currency swept to the operator. May be zero.
    pub amount: u64,
    /// Set when this call froze the distribution denominator.
    pub frozen_denominator: Option<u64>,
}

/// Sweeps the whole deposit vault to the operator once the sale has closed.
///
/// The caller is checked before the phase, so a non-operator always gets
/// `Unauthorized`. An empty vault is not an error: the sweep moves zero.
pub fn withdraw_deposits(
    pool: &mut PoolState,
    operator: &mut ParticipantBalances,
    now: i64,
) -> Result<Withdrawal> {
    require_keys_eq!(
        operator.owner,
        pool.config.operator_authority,
        SaleError::Unauthorized
    );
    require_phase("withdraw", now, &pool.config, SalePhase::allows_withdrawal)?;

    let mut next = pool.clone();
    let mut wallet = operator.clone();

    let frozen_denominator = next.freeze_distribution(now);
    let amount = next.deposit_vault_balance;
    ledger::transfer(
        &mut next.deposit_vault_balance,
        &mut wallet.deposit_balance,
        amount,
    )?;

    *pool = next;
    *operator = wallet;

    msg!("SALE: operator {} withdrew {} deposits", operator.owner, amount);

    Ok(Withdrawal {
        amount,
        frozen_denominator,
    })
}
