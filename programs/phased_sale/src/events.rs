//! Event definitions

use anchor_lang::prelude::*;

/// Emitted once when a sale pool is created and funded.
#[event]
pub struct SaleInitialized {
    pub sale_pool: Pubkey,
    pub operator: Pubkey,
    pub distributed_asset_total: u64,
    pub start_time: i64,
    pub deposit_close_time: i64,
    pub sale_close_time: i64,
}

#[event]
pub struct ClaimsIssued {
    pub sale_pool: Pubkey,
    pub participant: Pubkey,
    pub amount: u64,
    pub claim_supply: u64,
    pub timestamp: i64,
}

#[event]
pub struct ClaimsReversed {
    pub sale_pool: Pubkey,
    pub participant: Pubkey,
    pub amount: u64,
    pub claim_supply: u64,
    pub timestamp: i64,
}

#[event]
pub struct ClaimsRedeemed {
    pub sale_pool: Pubkey,
    pub participant: Pubkey,
    pub claims_burned: u64,
    pub asset_paid: u64,
    pub asset_vault_balance: u64,
    pub timestamp: i64,
}

/// Emitted by whichever operation froze the distribution denominator.
#[event]
pub struct DistributionFrozen {
    pub sale_pool: Pubkey,
    pub total_deposited_at_close: u64,
    pub timestamp: i64,
}

#[event]
pub struct DepositsWithdrawn {
    pub sale_pool: Pubkey,
    pub operator: Pubkey,
    pub amount: u64,
    pub timestamp: i64,
}
