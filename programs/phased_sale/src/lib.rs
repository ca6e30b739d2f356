use anchor_lang::prelude::*;
use anchor_lang::solana_program::program_option::COption;
use anchor_spl::token_interface::{
    self, Burn, Mint, MintTo, TokenAccount, TokenInterface, TransferChecked,
};

pub mod engine;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod mint_checks;
pub mod phase;
pub mod state;
pub mod withdrawal;

use errors::SaleError;
use events::*;
use state::*;

declare_id!("BP1LNed58PkVZRQCpvXRuMvxPEWpvfuqXZsAhhcUXMqj");

#[program]
pub mod phased_sale {
    use super::*;

    // ═════════════════════════════════════════════════════════════════════
    // 1. INITIALIZE POOL
    // ═════════════════════════════════════════════════════════════════════
    /// Operator creates the sale and funds the asset vault with the full
    /// distributed supply in the same instruction.
    ///
    /// Mints and vault token accounts must already exist. Both vaults and the
    /// redeemable mint authority belong to the SalePool PDA.
    pub fn initialize_pool(
        ctx: Context<InitializePool>,
        distributed_asset_total: u64,
        start_time: i64,
        deposit_close_time: i64,
        sale_close_time: i64,
    ) -> Result<()> {
        let now = Clock::get()?.unix_timestamp;
        mint_checks::require_fee_free(&ctx.accounts.deposit_mint.to_account_info())?;
        mint_checks::require_fee_free(&ctx.accounts.asset_mint.to_account_info())?;

        let mut funder = ParticipantBalances {
            asset_balance: ctx.accounts.operator_asset.amount,
            ..ParticipantBalances::new(ctx.accounts.operator.key(), 0)
        };
        let pool_state = PoolState::initialize(
            distributed_asset_total,
            start_time,
            deposit_close_time,
            sale_close_time,
            ctx.accounts.operator.key(),
            &mut funder,
            now,
        )?;

        // ── Fund the asset vault ────────────────────────────────────────
        token_interface::transfer_checked(
            CpiContext::new(
                ctx.accounts.token_program.to_account_info(),
                TransferChecked {
                    from: ctx.accounts.operator_asset.to_account_info(),
                    mint: ctx.accounts.asset_mint.to_account_info(),
                    to: ctx.accounts.asset_vault.to_account_info(),
                    authority: ctx.accounts.operator.to_account_info(),
                },
            ),
            distributed_asset_total,
            ctx.accounts.asset_mint.decimals,
        )?;

        // ── Record the pool ─────────────────────────────────────────────
        let pool = &mut ctx.accounts.sale_pool;
        pool.deposit_mint = ctx.accounts.deposit_mint.key();
        pool.asset_mint = ctx.accounts.asset_mint.key();
        pool.redeemable_mint = ctx.accounts.redeemable_mint.key();
        pool.deposit_vault = ctx.accounts.deposit_vault.key();
        pool.asset_vault = ctx.accounts.asset_vault.key();
        pool.state = pool_state;
        pool.bump = ctx.bumps.sale_pool;
        pool._reserved = [0u8; 64];

        emit!(SaleInitialized {
            sale_pool: pool.key(),
            operator: pool.state.config.operator_authority,
            distributed_asset_total,
            start_time,
            deposit_close_time,
            sale_close_time,
        });
        msg!(
            "SALE: Pool created. Deposits {} to {}, sale closes {}",
            start_time,
            deposit_close_time,
            sale_close_time
        );

        Ok(())
    }

    // ═════════════════════════════════════════════════════════════════════
    // 2. DEPOSIT → REDEEMABLE
    // ═════════════════════════════════════════════════════════════════════
    /// Participant deposits during the open window and receives the same
    /// amount of redeemable tokens.
    pub fn exchange_deposit_for_redeemable(
        ctx: Context<ExchangeDeposit>,
        amount: u64,
    ) -> Result<()> {
        let now = Clock::get()?.unix_timestamp;
        let mut pool_state = ctx.accounts.sale_pool.state.clone();
        let mut participant = ctx.accounts.participant_balances();

        let exchange = engine::deposit_for_claim(&mut pool_state, &mut participant, amount, now)?;

        // ── Deposit into the vault ──────────────────────────────────────
        token_interface::transfer_checked(
            CpiContext::new(
                ctx.accounts.token_program.to_account_info(),
                TransferChecked {
                    from: ctx.accounts.participant_deposit.to_account_info(),
                    mint: ctx.accounts.deposit_mint.to_account_info(),
                    to: ctx.accounts.deposit_vault.to_account_info(),
                    authority: ctx.accounts.participant.to_account_info(),
                },
            ),
            exchange.claims,
            ctx.accounts.deposit_mint.decimals,
        )?;

        // ── Mint redeemable, signed by the pool PDA ─────────────────────
        let pool_seeds = ctx.accounts.sale_pool.signer_seeds();
        token_interface::mint_to(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                MintTo {
                    mint: ctx.accounts.redeemable_mint.to_account_info(),
                    to: ctx.accounts.participant_redeemable.to_account_info(),
                    authority: ctx.accounts.sale_pool.to_account_info(),
                },
                &[&pool_seeds[..]],
            ),
            exchange.claims,
        )?;

        ctx.accounts.sale_pool.state = pool_state;

        emit!(ClaimsIssued {
            sale_pool: ctx.accounts.sale_pool.key(),
            participant: participant.owner,
            amount: exchange.claims,
            claim_supply: ctx.accounts.sale_pool.state.claim_supply,
            timestamp: now,
        });

        Ok(())
    }

    // ═════════════════════════════════════════════════════════════════════
    // 3. REDEEMABLE → DEPOSIT
    // ═════════════════════════════════════════════════════════════════════
    /// Participant backs out while deposits are still open.
    pub fn exchange_redeemable_for_deposit(
        ctx: Context<ExchangeDeposit>,
        amount: u64,
    ) -> Result<()> {
        let now = Clock::get()?.unix_timestamp;
        let mut pool_state = ctx.accounts.sale_pool.state.clone();
        let mut participant = ctx.accounts.participant_balances();

        let exchange = engine::reverse_claim(&mut pool_state, &mut participant, amount, now)?;

        // ── Burn the participant's redeemable ───────────────────────────
        token_interface::burn(
            CpiContext::new(
                ctx.accounts.token_program.to_account_info(),
                Burn {
                    mint: ctx.accounts.redeemable_mint.to_account_info(),
                    from: ctx.accounts.participant_redeemable.to_account_info(),
                    authority: ctx.accounts.participant.to_account_info(),
                },
            ),
            exchange.claims,
        )?;

        // ── Return the deposit, signed by the pool PDA ──────────────────
        let pool_seeds = ctx.accounts.sale_pool.signer_seeds();
        token_interface::transfer_checked(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                TransferChecked {
                    from: ctx.accounts.deposit_vault.to_account_info(),
                    mint: ctx.accounts.deposit_mint.to_account_info(),
                    to: ctx.accounts.participant_deposit.to_account_info(),
                    authority: ctx.accounts.sale_pool.to_account_info(),
                },
                &[&pool_seeds[..]],
            ),
            exchange.payout,
            ctx.accounts.deposit_mint.decimals,
        )?;

        ctx.accounts.sale_pool.state = pool_state;

        emit!(ClaimsReversed {
            sale_pool: ctx.accounts.sale_pool.key(),
            participant: participant.owner,
            amount: exchange.claims,
            claim_supply: ctx.accounts.sale_pool.state.claim_supply,
            timestamp: now,
        });

        Ok(())
    }

    // ═════════════════════════════════════════════════════════════════════
    // 4. REDEEMABLE → ASSET
    // ═════════════════════════════════════════════════════════════════════
    /// After deposits close, burns redeemable for a pro-rata share of the
    /// distributed asset.
    pub fn exchange_redeemable_for_asset(ctx: Context<RedeemAsset>, amount: u64) -> Result<()> {
        let now = Clock::get()?.unix_timestamp;
        let mut pool_state = ctx.accounts.sale_pool.state.clone();
        pool_state.sync_claim_supply(ctx.accounts.redeemable_mint.supply, now)?;
        let mut participant = ctx.accounts.participant_balances();

        let exchange =
            engine::redeem_claim_for_asset(&mut pool_state, &mut participant, amount, now)?;

        token_interface::burn(
            CpiContext::new(
                ctx.accounts.token_program.to_account_info(),
                Burn {
                    mint: ctx.accounts.redeemable_mint.to_account_info(),
                    from: ctx.accounts.participant_redeemable.to_account_info(),
                    authority: ctx.accounts.participant.to_account_info(),
                },
            ),
            exchange.claims,
        )?;

        let pool_seeds = ctx.accounts.sale_pool.signer_seeds();
        token_interface::transfer_checked(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                TransferChecked {
                    from: ctx.accounts.asset_vault.to_account_info(),
                    mint: ctx.accounts.asset_mint.to_account_info(),
                    to: ctx.accounts.participant_asset.to_account_info(),
                    authority: ctx.accounts.sale_pool.to_account_info(),
                },
                &[&pool_seeds[..]],
            ),
            exchange.payout,
            ctx.accounts.asset_mint.decimals,
        )?;

        ctx.accounts.sale_pool.state = pool_state;
        let sale_pool = ctx.accounts.sale_pool.key();

        if let Some(total_deposited_at_close) = exchange.frozen_denominator {
            emit!(DistributionFrozen {
                sale_pool,
                total_deposited_at_close,
                timestamp: now,
            });
        }
        emit!(ClaimsRedeemed {
            sale_pool,
            participant: participant.owner,
            claims_burned: exchange.claims,
            asset_paid: exchange.payout,
            asset_vault_balance: ctx.accounts.sale_pool.state.asset_vault_balance,
            timestamp: now,
        });

        Ok(())
    }

    // ═════════════════════════════════════════════════════════════════════
    // 5. WITHDRAW POOL DEPOSITS
    // ═════════════════════════════════════════════════════════════════════
    /// Operator sweeps collected deposits once the sale has closed.
    /// Sweeping an empty vault succeeds and moves nothing.
    pub fn withdraw_pool_deposits(ctx: Context<WithdrawPoolDeposits>) -> Result<()> {
        let now = Clock::get()?.unix_timestamp;
        let mut pool_state = ctx.accounts.sale_pool.state.clone();
        pool_state.sync_claim_supply(ctx.accounts.redeemable_mint.supply, now)?;
        let mut operator = ParticipantBalances::new(
            ctx.accounts.operator.key(),
            ctx.accounts.operator_deposit.amount,
        );

        let sweep = withdrawal::withdraw_deposits(&mut pool_state, &mut operator, now)?;

        if sweep.amount > 0 {
            let pool_seeds = ctx.accounts.sale_pool.signer_seeds();
            token_interface::transfer_checked(
                CpiContext::new_with_signer(
                    ctx.accounts.token_program.to_account_info(),
                    TransferChecked {
                        from: ctx.accounts.deposit_vault.to_account_info(),
                        mint: ctx.accounts.deposit_mint.to_account_info(),
                        to: ctx.accounts.operator_deposit.to_account_info(),
                        authority: ctx.accounts.sale_pool.to_account_info(),
                    },
                    &[&pool_seeds[..]],
                ),
                sweep.amount,
                ctx.accounts.deposit_mint.decimals,
            )?;
        }

        ctx.accounts.sale_pool.state = pool_state;
        let sale_pool = ctx.accounts.sale_pool.key();

        if let Some(total_deposited_at_close) = sweep.frozen_denominator {
            emit!(DistributionFrozen {
                sale_pool,
                total_deposited_at_close,
                timestamp: now,
            });
        }
        emit!(DepositsWithdrawn {
            sale_pool,
            operator: operator.owner,
            amount: sweep.amount,
            timestamp: now,
        });

        Ok(())
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// ACCOUNT CONTEXTS
// ═════════════════════════════════════════════════════════════════════════════

#[derive(Accounts)]
pub struct InitializePool<'info> {
    /// Sale operator: funds the asset vault and may later withdraw deposits.
    #[account(mut)]
    pub operator: Signer<'info>,

    /// SalePool PDA: stores all sale state, owns the vaults.
    #[account(
        init,
        payer = operator,
        space = SalePool::MAX_SIZE,
        seeds = [SALE_POOL_SEED, asset_mint.key().as_ref()],
        bump,
    )]
    pub sale_pool: Account<'info, SalePool>,

    pub deposit_mint: InterfaceAccount<'info, Mint>,

    pub asset_mint: InterfaceAccount<'info, Mint>,

    /// Fresh mint controlled by the pool PDA.
    #[account(
        constraint = redeemable_mint.mint_authority == COption::Some(sale_pool.key())
            @ SaleError::InvalidRedeemableMint,
        constraint = redeemable_mint.supply == 0 @ SaleError::InvalidRedeemableMint,
        constraint = redeemable_mint.decimals == deposit_mint.decimals @ SaleError::DecimalsMismatch,
    )]
    pub redeemable_mint: InterfaceAccount<'info, Mint>,

    #[account(
        constraint = deposit_vault.owner == sale_pool.key() @ SaleError::InvalidMint,
        constraint = deposit_vault.mint == deposit_mint.key() @ SaleError::InvalidMint,
    )]
    pub deposit_vault: InterfaceAccount<'info, TokenAccount>,

    #[account(
        mut,
        constraint = asset_vault.owner == sale_pool.key() @ SaleError::InvalidMint,
        constraint = asset_vault.mint == asset_mint.key() @ SaleError::InvalidMint,
    )]
    pub asset_vault: InterfaceAccount<'info, TokenAccount>,

    /// Operator's source of the distributed asset.
    #[account(
        mut,
        constraint = operator_asset.owner == operator.key() @ SaleError::InvalidMint,
        constraint = operator_asset.mint == asset_mint.key() @ SaleError::InvalidMint,
    )]
    pub operator_asset: InterfaceAccount<'info, TokenAccount>,

    pub token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
}

/// Shared by deposit and reversal.
#[derive(Accounts)]
pub struct ExchangeDeposit<'info> {
    pub participant: Signer<'info>,

    #[account(
        mut,
        seeds = [SALE_POOL_SEED, sale_pool.asset_mint.as_ref()],
        bump = sale_pool.bump,
        has_one = deposit_mint @ SaleError::InvalidMint,
        has_one = redeemable_mint @ SaleError::InvalidMint,
        has_one = deposit_vault @ SaleError::InvalidMint,
    )]
    pub sale_pool: Account<'info, SalePool>,

    pub deposit_mint: InterfaceAccount<'info, Mint>,

    #[account(mut)]
    pub redeemable_mint: InterfaceAccount<'info, Mint>,

    #[account(mut)]
    pub deposit_vault: InterfaceAccount<'info, TokenAccount>,

    #[account(
        mut,
        constraint = participant_deposit.owner == participant.key() @ SaleError::InvalidMint,
        constraint = participant_deposit.mint == deposit_mint.key() @ SaleError::InvalidMint,
    )]
    pub participant_deposit: InterfaceAccount<'info, TokenAccount>,

    #[account(
        mut,
        constraint = participant_redeemable.owner == participant.key() @ SaleError::InvalidMint,
        constraint = participant_redeemable.mint == redeemable_mint.key() @ SaleError::InvalidMint,
    )]
    pub participant_redeemable: InterfaceAccount<'info, TokenAccount>,

    pub token_program: Interface<'info, TokenInterface>,
}

impl<'info> ExchangeDeposit<'info> {
    fn participant_balances(&self) -> ParticipantBalances {
        ParticipantBalances {
            owner: self.participant.key(),
            deposit_balance: self.participant_deposit.amount,
            claim_balance: self.participant_redeemable.amount,
            asset_balance: 0,
        }
    }
}

#[derive(Accounts)]
pub struct RedeemAsset<'info> {
    pub participant: Signer<'info>,

    #[account(
        mut,
        seeds = [SALE_POOL_SEED, sale_pool.asset_mint.as_ref()],
        bump = sale_pool.bump,
        has_one = asset_mint @ SaleError::InvalidMint,
        has_one = redeemable_mint @ SaleError::InvalidMint,
        has_one = asset_vault @ SaleError::InvalidMint,
    )]
    pub sale_pool: Account<'info, SalePool>,

    pub asset_mint: InterfaceAccount<'info, Mint>,

    #[account(mut)]
    pub redeemable_mint: InterfaceAccount<'info, Mint>,

    #[account(mut)]
    pub asset_vault: InterfaceAccount<'info, TokenAccount>,

    #[account(
        mut,
        constraint = participant_redeemable.owner == participant.key() @ SaleError::InvalidMint,
        constraint = participant_redeemable.mint == redeemable_mint.key() @ SaleError::InvalidMint,
    )]
    pub participant_redeemable: InterfaceAccount<'info, TokenAccount>,

    #[account(
        mut,
        constraint = participant_asset.owner == participant.key() @ SaleError::InvalidMint,
        constraint = participant_asset.mint == asset_mint.key() @ SaleError::InvalidMint,
    )]
    pub participant_asset: InterfaceAccount<'info, TokenAccount>,

    pub token_program: Interface<'info, TokenInterface>,
}

impl<'info> RedeemAsset<'info> {
    fn participant_balances(&self) -> ParticipantBalances {
        ParticipantBalances {
            owner: self.participant.key(),
            deposit_balance: 0,
            claim_balance: self.participant_redeemable.amount,
            asset_balance: self.participant_asset.amount,
        }
    }
}

#[derive(Accounts)]
pub struct WithdrawPoolDeposits<'info> {
    /// Checked against the pool's operator authority by the withdrawal logic.
    pub operator: Signer<'info>,

    #[account(
        mut,
        seeds = [SALE_POOL_SEED, sale_pool.asset_mint.as_ref()],
        bump = sale_pool.bump,
        has_one = deposit_mint @ SaleError::InvalidMint,
        has_one = redeemable_mint @ SaleError::InvalidMint,
        has_one = deposit_vault @ SaleError::InvalidMint,
    )]
    pub sale_pool: Account<'info, SalePool>,

    pub deposit_mint: InterfaceAccount<'info, Mint>,

    /// Read for its live supply before the distribution is frozen.
    pub redeemable_mint: InterfaceAccount<'info, Mint>,

    #[account(mut)]
    pub deposit_vault: InterfaceAccount<'info, TokenAccount>,

    /// Destination for the swept deposits.
    #[account(
        mut,
        constraint = operator_deposit.mint == deposit_mint.key() @ SaleError::InvalidMint,
    )]
    pub operator_deposit: InterfaceAccount<'info, TokenAccount>,

    pub token_program: Interface<'info, TokenInterface>,
}
