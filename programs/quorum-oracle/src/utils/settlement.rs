use crate::state::{ExpiryPolicy, ProtocolConfig};
use anchor_lang::prelude::*;
use anchor_spl::token_interface::{self, Mint, TokenAccount, TokenInterface, TransferChecked};

/// Where a reserved fee ends up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeeDestination {
    Treasury,
    Refund,
}

/// Destination of an expired request's fee. A refund account that can no longer
/// receive tokens falls back to the treasury so that expiry always completes.
pub fn expiry_destination(policy: ExpiryPolicy, refund_usable: bool) -> FeeDestination {
    match policy {
        ExpiryPolicy::Refund if refund_usable => FeeDestination::Refund,
        _ => FeeDestination::Treasury,
    }
}

/// Whether `info` is a live, unfrozen token account of `fee_mint` under `token_program`.
/// Closed or frozen accounts return `false` instead of failing.
pub fn can_receive(info: &AccountInfo, fee_mint: &Pubkey, token_program: &Pubkey) -> bool {
    if info.owner != token_program || info.data_is_empty() {
        return false;
    }
    let Ok(data) = info.try_borrow_data() else {
        return false;
    };
    match TokenAccount::try_deserialize(&mut &data[..]) {
        Ok(account) => account.mint == *fee_mint && !account.is_frozen(),
        Err(_) => false,
    }
}

/// Accounts needed to release a reserved fee out of the vault.
pub struct FeeSettlement<'a, 'info> {
    pub protocol_config: &'a Account<'info, ProtocolConfig>,
    pub vault: &'a InterfaceAccount<'info, TokenAccount>,
    pub treasury: &'a InterfaceAccount<'info, TokenAccount>,
    pub fee_mint: &'a InterfaceAccount<'info, Mint>,
    pub token_program: &'a Interface<'info, TokenInterface>,
}

impl<'a, 'info> FeeSettlement<'a, 'info> {
    /// Transfers `amount` from the vault, signed by the config PDA.
    pub fn pay_out(&self, to: AccountInfo<'info>, amount: u64) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }

        let seeds = self.protocol_config.signer_seeds();
        let signer_seeds = &[&seeds[..]];

        let cpi_context = CpiContext::new_with_signer(
            self.token_program.to_account_info(),
            TransferChecked {
                from: self.vault.to_account_info(),
                mint: self.fee_mint.to_account_info(),
                to,
                authority: self.protocol_config.to_account_info(),
            },
            signer_seeds,
        );
        token_interface::transfer_checked(cpi_context, amount, self.fee_mint.decimals)
    }

    pub fn pay_treasury(&self, amount: u64) -> Result<()> {
        self.pay_out(self.treasury.to_account_info(), amount)
    }

    /// Settles an expired request's fee per the configured policy.
    pub fn settle_expired(
        &self,
        refund_account: &AccountInfo<'info>,
        amount: u64,
    ) -> Result<FeeDestination> {
        let refund_usable = can_receive(
            refund_account,
            &self.fee_mint.key(),
            &self.token_program.key(),
        );
        let destination = expiry_destination(self.protocol_config.expiry_policy, refund_usable);

        match destination {
            FeeDestination::Refund => self.pay_out(refund_account.clone(), amount)?,
            FeeDestination::Treasury => self.pay_treasury(amount)?,
        }
        Ok(destination)
    }
}
