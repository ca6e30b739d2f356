use anchor_lang::prelude::*;

use crate::errors::SaleError;
use crate::ledger;
use crate::phase::SalePhase;

/// PDA seed for the pool record: `[SALE_POOL_SEED, asset_mint]`.
pub const SALE_POOL_SEED: &[u8] = b"sale_pool";

// ─────────────────────────────────────────────────────────────────────────────
// SaleConfig: fixed at creation
// ─────────────────────────────────────────────────────────────────────────────

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub struct SaleConfig {
    /// Raw amount of the distributed asset committed to the sale.
    pub distributed_asset_total: u64,

    /// Deposits open at this unix timestamp.
    pub start_time: i64,

    /// Deposits and reversals stop; redemption opens.
    pub deposit_close_time: i64,

    /// Operator may sweep the deposit vault from here on.
    pub sale_close_time: i64,

    /// Only identity allowed to withdraw collected deposits.
    pub operator_authority: Pubkey,
}

impl SaleConfig {
    pub const SIZE: usize = 8  // distributed_asset_total
        + 8   // start_time
        + 8   // deposit_close_time
        + 8   // sale_close_time
        + 32; // operator_authority

    /// Validates and freezes the sale parameters. The window must start in
    /// the future and the three timestamps must strictly increase.
    pub fn new(
        distributed_asset_total: u64,
        start_time: i64,
        deposit_close_time: i64,
        sale_close_time: i64,
        operator_authority: Pubkey,
        now: i64,
    ) -> Result<Self> {
        require_gt!(
            distributed_asset_total,
            0u64,
            SaleError::InvalidConfiguration
        );
        if !(start_time < deposit_close_time && deposit_close_time < sale_close_time) {
            msg!(
                "SALE: times must satisfy start < deposit close < sale close (got {}, {}, {})",
                start_time,
                deposit_close_time,
                sale_close_time
            );
            return err!(SaleError::InvalidConfiguration);
        }
        if now >= start_time {
            msg!("SALE: start {} is not in the future (now {})", start_time, now);
            return err!(SaleError::InvalidConfiguration);
        }

        Ok(Self {
            distributed_asset_total,
            start_time,
            deposit_close_time,
            sale_close_time,
            operator_authority,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PoolState: running totals for one sale
// ─────────────────────────────────────────────────────────────────────────────

#[derive(AnchorSerialize, AnchorDeserialize, Clone, PartialEq, Eq, Debug)]
pub struct PoolState {
    pub config: SaleConfig,

    /// Deposit currency held by the pool.
    pub deposit_vault_balance: u64,

    /// Distributed asset still held by the pool. Only ever decreases.
    pub asset_vault_balance: u64,

    /// Outstanding redeemable claims.
    pub claim_supply: u64,

    /// `claim_supply` as first observed after deposits closed. Set once.
    pub total_deposited_at_close: Option<u64>,
}

impl PoolState {
    pub const SIZE: usize = SaleConfig::SIZE
        + 8   // deposit_vault_balance
        + 8   // asset_vault_balance
        + 8   // claim_supply
        + 1 + 8; // total_deposited_at_close (Option<u64>)

    /// Creates the pool and moves the full committed supply from `funder`
    /// into the asset vault. Either both happen or neither does.
    pub fn initialize(
        distributed_asset_total: u64,
        start_time: i64,
        deposit_close_time: i64,
        sale_close_time: i64,
        operator_authority: Pubkey,
        funder: &mut ParticipantBalances,
        now: i64,
    ) -> Result<Self> {
        let config = SaleConfig::new(
            distributed_asset_total,
            start_time,
            deposit_close_time,
            sale_close_time,
            operator_authority,
            now,
        )?;

        require_gte!(
            funder.asset_balance,
            distributed_asset_total,
            SaleError::InsufficientFunding
        );

        let mut funding = funder.clone();
        let mut pool = Self {
            config,
            deposit_vault_balance: 0,
            asset_vault_balance: 0,
            claim_supply: 0,
            total_deposited_at_close: None,
        };
        ledger::transfer(
            &mut funding.asset_balance,
            &mut pool.asset_vault_balance,
            distributed_asset_total,
        )?;

        *funder = funding;
        Ok(pool)
    }

    pub fn phase(&self, now: i64) -> SalePhase {
        SalePhase::at(now, &self.config)
    }

    /// Takes the distribution snapshot if deposits have closed and none has
    /// been taken yet. Returns `Some(denominator)` only for the call that
    /// actually froze it.
    pub fn freeze_distribution(&mut self, now: i64) -> Option<u64> {
        if self.total_deposited_at_close.is_some() || !self.phase(now).deposits_closed() {
            return None;
        }
        self.total_deposited_at_close = Some(self.claim_supply);
        self.total_deposited_at_close
    }

    /// Aligns `claim_supply` with the redeemable mint's live supply once
    /// deposits have closed. Claims burned outside the sale drop out of the
    /// distribution if the snapshot has not been taken yet; after it, their
    /// share stays in the asset vault. The mint can never exceed the
    /// recorded supply because only the pool mints it.
    pub fn sync_claim_supply(&mut self, mint_supply: u64, now: i64) -> Result<()> {
        require_gte!(
            self.claim_supply,
            mint_supply,
            SaleError::InvalidRedeemableMint
        );
        if self.phase(now).deposits_closed() {
            self.claim_supply = mint_supply;
        }
        Ok(())
    }

    /// Denominator for pro-rata payouts. Before the snapshot exists this is
    /// the live claim supply, which is what the snapshot would capture.
    pub fn distribution_denominator(&self) -> u64 {
        self.total_deposited_at_close.unwrap_or(self.claim_supply)
    }

    /// Nothing left to do: sale closed, every claim redeemed, deposits swept.
    pub fn is_inert(&self, now: i64) -> bool {
        self.phase(now) == SalePhase::SaleClosed
            && self.claim_supply == 0
            && self.deposit_vault_balance == 0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SalePool: on-chain record binding PoolState to its token accounts
// ─────────────────────────────────────────────────────────────────────────────
// PDA seeds: [SALE_POOL_SEED, asset_mint.key().as_ref()]
// The PDA owns both vaults and is the redeemable mint authority.

#[account]
#[derive(Debug)]
pub struct SalePool {
    /// Mint of the deposit currency.
    pub deposit_mint: Pubkey,

    /// Mint of the distributed asset.
    pub asset_mint: Pubkey,

    /// Mint of the redeemable claim token.
    pub redeemable_mint: Pubkey,

    /// Pool-owned token account holding deposits.
    pub deposit_vault: Pubkey,

    /// Pool-owned token account holding the distributed asset.
    pub asset_vault: Pubkey,

    pub state: PoolState,

    /// Bump seed for this PDA.
    pub bump: u8,

    /// Reserved for future use.
    pub _reserved: [u8; 64],
}

impl SalePool {
    pub const MAX_SIZE: usize = 8  // discriminator
        + 32  // deposit_mint
        + 32  // asset_mint
        + 32  // redeemable_mint
        + 32  // deposit_vault
        + 32  // asset_vault
        + PoolState::SIZE
        + 1   // bump
        + 64; // _reserved

    /// Seeds the pool PDA signs with when moving vault funds or minting
    /// redeemable.
    pub fn signer_seeds(&self) -> [&[u8]; 3] {
        [
            SALE_POOL_SEED,
            self.asset_mint.as_ref(),
            std::slice::from_ref(&self.bump),
        ]
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ParticipantBalances: a participant's wallet as seen by the core
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ClaimStatus {
    None,
    Holding,
}

/// Balances a participant holds outside the pool. The instruction layer
/// builds this from the participant's token accounts; tests build it directly.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ParticipantBalances {
    pub owner: Pubkey,
    pub deposit_balance: u64,
    pub claim_balance: u64,
    pub asset_balance: u64,
}

impl ParticipantBalances {
    pub fn new(owner: Pubkey, deposit_balance: u64) -> Self {
        Self {
            owner,
            deposit_balance,
            claim_balance: 0,
            asset_balance: 0,
        }
    }

    pub fn claim_status(&self) -> ClaimStatus {
        if self.claim_balance > 0 {
            ClaimStatus::Holding
        } else {
            ClaimStatus::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::error::Error;

    const NOW: i64 = 1_000;

    fn creator(asset_balance: u64) -> ParticipantBalances {
        ParticipantBalances {
            asset_balance,
            ..ParticipantBalances::new(Pubkey::new_unique(), 0)
        }
    }

    fn init(
        total: u64,
        times: (i64, i64, i64),
        funder: &mut ParticipantBalances,
    ) -> Result<PoolState> {
        PoolState::initialize(total, times.0, times.1, times.2, funder.owner, funder, NOW)
    }

    #[test]
    fn initialize_moves_full_supply_into_vault() {
        let mut funder = creator(5_000_000);
        let pool = init(5_000_000, (NOW + 5, NOW + 10, NOW + 15), &mut funder).unwrap();

        assert_eq!(pool.asset_vault_balance, 5_000_000);
        assert_eq!(pool.deposit_vault_balance, 0);
        assert_eq!(pool.claim_supply, 0);
        assert_eq!(pool.total_deposited_at_close, None);
        assert_eq!(funder.asset_balance, 0);
    }

    #[test]
    fn initialize_rejects_bad_ordering() {
        let cases = [
            (NOW + 10, NOW + 10, NOW + 15),
            (NOW + 10, NOW + 5, NOW + 15),
            (NOW + 5, NOW + 15, NOW + 15),
            (NOW + 5, NOW + 20, NOW + 15),
        ];
        for times in cases {
            let mut funder = creator(100);
            let err = init(100, times, &mut funder).unwrap_err();
            assert_eq!(err, Error::from(SaleError::InvalidConfiguration), "{:?}", times);
            assert_eq!(funder.asset_balance, 100);
        }
    }

    #[test]
    fn initialize_rejects_zero_supply_and_past_start() {
        let mut funder = creator(100);
        let err = init(0, (NOW + 5, NOW + 10, NOW + 15), &mut funder).unwrap_err();
        assert_eq!(err, Error::from(SaleError::InvalidConfiguration));

        let err = init(100, (NOW, NOW + 10, NOW + 15), &mut funder).unwrap_err();
        assert_eq!(err, Error::from(SaleError::InvalidConfiguration));
        assert_eq!(funder.asset_balance, 100);
    }

    #[test]
    fn initialize_requires_full_funding() {
        let mut funder = creator(4_999_999);
        let err = init(5_000_000, (NOW + 5, NOW + 10, NOW + 15), &mut funder).unwrap_err();
        assert_eq!(err, Error::from(SaleError::InsufficientFunding));
        assert_eq!(funder.asset_balance, 4_999_999);
    }

    #[test]
    fn freeze_distribution_happens_once() {
        let mut funder = creator(10);
        let mut pool = init(10, (NOW + 5, NOW + 10, NOW + 15), &mut funder).unwrap();
        pool.claim_supply = 77;

        assert_eq!(pool.freeze_distribution(NOW + 9), None);
        assert_eq!(pool.total_deposited_at_close, None);
        assert_eq!(pool.distribution_denominator(), 77);

        assert_eq!(pool.freeze_distribution(NOW + 10), Some(77));
        pool.claim_supply = 40;
        assert_eq!(pool.freeze_distribution(NOW + 20), None);
        assert_eq!(pool.total_deposited_at_close, Some(77));
        assert_eq!(pool.distribution_denominator(), 77);
    }

    #[test]
    fn sync_claim_supply_drops_claims_burned_outside_the_sale() {
        let mut funder = creator(10);
        let mut pool = init(10, (NOW + 5, NOW + 10, NOW + 15), &mut funder).unwrap();
        pool.claim_supply = 100;
        pool.deposit_vault_balance = 100;

        pool.sync_claim_supply(60, NOW + 7).unwrap();
        assert_eq!(pool.claim_supply, 100);

        pool.sync_claim_supply(60, NOW + 10).unwrap();
        assert_eq!(pool.claim_supply, 60);
        assert_eq!(pool.deposit_vault_balance, 100);
        assert_eq!(pool.freeze_distribution(NOW + 10), Some(60));

        pool.sync_claim_supply(50, NOW + 12).unwrap();
        assert_eq!(pool.claim_supply, 50);
        assert_eq!(pool.distribution_denominator(), 60);

        let before = pool.clone();
        let err = pool.sync_claim_supply(51, NOW + 12).unwrap_err();
        assert_eq!(err, Error::from(SaleError::InvalidRedeemableMint));
        assert_eq!(pool, before);
    }

    #[test]
    fn signer_seeds_derive_the_pool_address() {
        let asset_mint = Pubkey::new_unique();
        let (address, bump) = Pubkey::find_program_address(
            &[SALE_POOL_SEED, asset_mint.as_ref()],
            &crate::ID,
        );
        let pool = SalePool {
            deposit_mint: Pubkey::new_unique(),
            asset_mint,
            redeemable_mint: Pubkey::new_unique(),
            deposit_vault: Pubkey::new_unique(),
            asset_vault: Pubkey::new_unique(),
            state: init(10, (NOW + 5, NOW + 10, NOW + 15), &mut creator(10)).unwrap(),
            bump,
            _reserved: [0u8; 64],
        };
        assert_eq!(
            Pubkey::create_program_address(&pool.signer_seeds(), &crate::ID).unwrap(),
            address
        );
    }

    #[test]
    fn claim_status_tracks_balance() {
        let mut p = ParticipantBalances::new(Pubkey::new_unique(), 10);
        assert_eq!(p.claim_status(), ClaimStatus::None);
        p.claim_balance = 1;
        assert_eq!(p.claim_status(), ClaimStatus::Holding);
    }

    #[test]
    fn account_size_covers_serialized_record() {
        let pool = SalePool {
            deposit_mint: Pubkey::new_unique(),
            asset_mint: Pubkey::new_unique(),
            redeemable_mint: Pubkey::new_unique(),
            deposit_vault: Pubkey::new_unique(),
            asset_vault: Pubkey::new_unique(),
            state: PoolState {
                config: SaleConfig {
                    distributed_asset_total: u64::MAX,
                    start_time: i64::MAX,
                    deposit_close_time: i64::MAX,
                    sale_close_time: i64::MAX,
                    operator_authority: Pubkey::new_unique(),
                },
                deposit_vault_balance: u64::MAX,
                asset_vault_balance: u64::MAX,
                claim_supply: u64::MAX,
                total_deposited_at_close: Some(u64::MAX),
            },
            bump: 255,
            _reserved: [0u8; 64],
        };
        let mut bytes = Vec::new();
        pool.serialize(&mut bytes).unwrap();
        assert_eq!(bytes.len() + 8, SalePool::MAX_SIZE);
    }
}
