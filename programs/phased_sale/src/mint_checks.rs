use anchor_lang::prelude::*;
use anchor_spl::token_2022::spl_token_2022::{
    extension::{BaseStateWithExtensions, ExtensionType, StateWithExtensions},
    state::Mint,
};

use crate::errors::SaleError;

/// True if the mint charges a fee on transfer. Legacy SPL Token mints carry
/// no extensions and always return false.
pub fn has_transfer_fee(mint_data: &[u8]) -> Result<bool> {
    let mint = StateWithExtensions::<Mint>::unpack(mint_data)?;
    let extensions = mint.get_extension_types()?;
    Ok(extensions.contains(&ExtensionType::TransferFeeConfig))
}

/// Vault balances are tracked as the requested transfer amount, so every
/// token moved in or out of a vault must arrive in full.
pub fn require_fee_free(mint: &AccountInfo) -> Result<()> {
    let data = mint.try_borrow_data()?;
    if has_transfer_fee(&data)? {
        msg!("SALE: mint {} has a transfer fee", mint.key);
        return err!(SaleError::TransferFeeMint);
    }
    Ok(())
}
