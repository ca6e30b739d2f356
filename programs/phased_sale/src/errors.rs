use anchor_lang::prelude::*;

#[error_code]
pub enum SaleError {
    #[msg("Sale configuration is invalid (times must be future and strictly increasing, supply non-zero)")]
    InvalidConfiguration,
    #[msg("Creator cannot fund the full distributed asset supply")]
    InsufficientFunding,
    #[msg("Operation is not allowed in the current sale phase")]
    PhaseViolation,
    #[msg("Amount must be greater than zero")]
    InvalidAmount,
    #[msg("Insufficient balance for the requested amount")]
    InsufficientBalance,
    #[msg("Only the sale operator can call this")]
    Unauthorized,
    #[msg("Arithmetic overflow")]
    ArithmeticOverflow,
    #[msg("Token account or mint does not belong to this sale")]
    InvalidMint,
    #[msg("Redeemable mint must be controlled by the pool and have zero supply")]
    InvalidRedeemableMint,
    #[msg("Deposit and redeemable mints must share decimals")]
    DecimalsMismatch,
    #[msg("Mints with a transfer fee cannot be used for deposits or the distributed asset")]
    TransferFeeMint,
}
