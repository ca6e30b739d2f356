use anchor_lang::prelude::*;

use crate::errors::SaleError;
use crate::state::SaleConfig;

/// Time-derived sale phase. Bounds are closed below and open above, so
/// `now == deposit_close_time` is already `DepositClosedSaleOpen`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
#[repr(u8)]
pub enum SalePhase {
    /// `now < start_time`
    PreSale = 0,
    /// `start_time <= now < deposit_close_time`
    DepositOpen = 1,
    /// `deposit_close_time <= now < sale_close_time`
    DepositClosedSaleOpen = 2,
    /// `now >= sale_close_time`
    SaleClosed = 3,
}

impl SalePhase {
    pub fn at(now: i64, config: &SaleConfig) -> Self {
        if now < config.start_time {
            SalePhase::PreSale
        } else if now < config.deposit_close_time {
            SalePhase::DepositOpen
        } else if now < config.sale_close_time {
            SalePhase::DepositClosedSaleOpen
        } else {
            SalePhase::SaleClosed
        }
    }

    /// Deposits and reversals are only legal while the window is open.
    pub fn accepts_deposits(&self) -> bool {
        matches!(self, SalePhase::DepositOpen)
    }

    pub fn allows_redemption(&self) -> bool {
        matches!(
            self,
            SalePhase::DepositClosedSaleOpen | SalePhase::SaleClosed
        )
    }

    pub fn allows_withdrawal(&self) -> bool {
        matches!(self, SalePhase::SaleClosed)
    }

    /// True once the distribution denominator must be frozen.
    pub fn deposits_closed(&self) -> bool {
        *self >= SalePhase::DepositClosedSaleOpen
    }
}

/// Pure phase lookup.
pub fn phase(now: i64, config: &SaleConfig) -> SalePhase {
    SalePhase::at(now, config)
}

/// Fails with `PhaseViolation` unless `allowed(phase)` holds, logging
/// enough context to explain the rejection.
pub(crate) fn require_phase(
    op: &str,
    now: i64,
    config: &SaleConfig,
    allowed: fn(&SalePhase) -> bool,
) -> Result<SalePhase> {
    let current = SalePhase::at(now, config);
    if !allowed(&current) {
        msg!(
            "SALE: {} rejected in phase {:?} at {} (start {}, deposits close {}, sale closes {})",
            op,
            current,
            now,
            config.start_time,
            config.deposit_close_time,
            config.sale_close_time
        );
        return err!(SaleError::PhaseViolation);
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SaleConfig {
        SaleConfig {
            distributed_asset_total: 1_000,
            start_time: 100,
            deposit_close_time: 200,
            sale_close_time: 300,
            operator_authority: Pubkey::new_unique(),
        }
    }

    #[test]
    fn boundaries_are_closed_below_open_above() {
        let cfg = config();
        assert_eq!(phase(99, &cfg), SalePhase::PreSale);
        assert_eq!(phase(100, &cfg), SalePhase::DepositOpen);
        assert_eq!(phase(199, &cfg), SalePhase::DepositOpen);
        assert_eq!(phase(200, &cfg), SalePhase::DepositClosedSaleOpen);
        assert_eq!(phase(299, &cfg), SalePhase::DepositClosedSaleOpen);
        assert_eq!(phase(300, &cfg), SalePhase::SaleClosed);
        assert_eq!(phase(i64::MAX, &cfg), SalePhase::SaleClosed);
        assert_eq!(phase(i64::MIN, &cfg), SalePhase::PreSale);
    }

    #[test]
    fn gates_match_phase() {
        use SalePhase::*;
        let table = [
            (PreSale, false, false, false),
            (DepositOpen, true, false, false),
            (DepositClosedSaleOpen, false, true, false),
            (SaleClosed, false, true, true),
        ];
        for (p, deposits, redeem, withdraw) in table {
            assert_eq!(p.accepts_deposits(), deposits, "{:?}", p);
            assert_eq!(p.allows_redemption(), redeem, "{:?}", p);
            assert_eq!(p.allows_withdrawal(), withdraw, "{:?}", p);
            assert_eq!(p.deposits_closed(), redeem, "{:?}", p);
        }
    }

    #[test]
    fn require_phase_reports_violation() {
        let cfg = config();
        let err = require_phase("deposit", 250, &cfg, SalePhase::accepts_deposits).unwrap_err();
        assert_eq!(err, anchor_lang::error::Error::from(SaleError::PhaseViolation));
        assert_eq!(
            require_phase("redeem", 250, &cfg, SalePhase::allows_redemption).unwrap(),
            SalePhase::DepositClosedSaleOpen
        );
    }
}
