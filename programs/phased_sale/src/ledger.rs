use anchor_lang::prelude::*;

use crate::errors::SaleError;

// ─────────────────────────────────────────────────────────────────────────────
// Ledger primitives
// ─────────────────────────────────────────────────────────────────────────────
//
// Value-bearing balances are plain `u64` raw token amounts. Every movement
// goes through one of the three primitives below so that conservation holds
// by construction:
//
//   transfer: from + to is unchanged
//   mint_to:  supply and holder grow by the same amount
//   burn:     supply and holder shrink by the same amount
//
// Each primitive checks before it writes, so an `Err` leaves both sides
// exactly as they were.

/// Moves `amount` from one balance to another.
pub fn transfer(from: &mut u64, to: &mut u64, amount: u64) -> Result<()> {
    require_gte!(*from, amount, SaleError::InsufficientBalance);
    let credited = to
        .checked_add(amount)
        .ok_or(SaleError::ArithmeticOverflow)?;

    *from -= amount;
    *to = credited;
    Ok(())
}

/// Creates `amount` new units, crediting them to `holder`.
pub fn mint_to(supply: &mut u64, holder: &mut u64, amount: u64) -> Result<()> {
    let new_supply = supply
        .checked_add(amount)
        .ok_or(SaleError::ArithmeticOverflow)?;
    let new_holder = holder
        .checked_add(amount)
        .ok_or(SaleError::ArithmeticOverflow)?;

    *supply = new_supply;
    *holder = new_holder;
    Ok(())
}

/// Destroys `amount` units held by `holder`.
pub fn burn(supply: &mut u64, holder: &mut u64, amount: u64) -> Result<()> {
    require_gte!(*holder, amount, SaleError::InsufficientBalance);
    // holder <= supply; a violation means the pool record is corrupt.
    require_gte!(*supply, amount, SaleError::ArithmeticOverflow);

    *holder -= amount;
    *supply -= amount;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_sale_err<T: std::fmt::Debug>(res: Result<T>, expected: SaleError) {
        let err = res.expect_err("expected failure");
        assert_eq!(err, anchor_lang::error::Error::from(expected));
    }

    #[test]
    fn transfer_conserves_total() {
        let (mut a, mut b) = (500u64, 20u64);
        transfer(&mut a, &mut b, 120).unwrap();
        assert_eq!((a, b), (380, 140));
        assert_eq!(a + b, 520);
    }

    #[test]
    fn transfer_rejects_overdraw_without_mutation() {
        let (mut a, mut b) = (10u64, 0u64);
        assert_sale_err(transfer(&mut a, &mut b, 11), SaleError::InsufficientBalance);
        assert_eq!((a, b), (10, 0));
    }

    #[test]
    fn transfer_rejects_credit_overflow_without_mutation() {
        let (mut a, mut b) = (10u64, u64::MAX - 5);
        assert_sale_err(transfer(&mut a, &mut b, 6), SaleError::ArithmeticOverflow);
        assert_eq!((a, b), (10, u64::MAX - 5));
    }

    #[test]
    fn mint_and_burn_move_supply_in_lockstep() {
        let (mut supply, mut holder) = (0u64, 0u64);
        mint_to(&mut supply, &mut holder, 42).unwrap();
        assert_eq!((supply, holder), (42, 42));

        burn(&mut supply, &mut holder, 40).unwrap();
        assert_eq!((supply, holder), (2, 2));
    }

    #[test]
    fn mint_overflow_leaves_both_untouched() {
        let (mut supply, mut holder) = (u64::MAX, 0u64);
        assert_sale_err(mint_to(&mut supply, &mut holder, 1), SaleError::ArithmeticOverflow);
        assert_eq!((supply, holder), (u64::MAX, 0));
    }

    #[test]
    fn burn_more_than_held_fails() {
        let (mut supply, mut holder) = (100u64, 5u64);
        assert_sale_err(burn(&mut supply, &mut holder, 6), SaleError::InsufficientBalance);
        assert_eq!((supply, holder), (100, 5));
    }
}
