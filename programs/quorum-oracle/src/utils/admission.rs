use crate::error::FeeError;
use crate::state::ProtocolConfig;
use anchor_lang::prelude::*;
use anchor_lang::solana_program::sysvar::instructions;
use anchor_lang::Discriminator;
use std::collections::BTreeMap;

/// Account position of the paying signer in every fee-bearing instruction.
pub const PAYER_ACCOUNT_INDEX: usize = 0;

/// Instructions of this program that carry a fee.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeeBearingOp {
    CreateFeed,
    SubmitRequest,
}

impl FeeBearingOp {
    pub fn from_instruction_data(data: &[u8]) -> Option<Self> {
        if data.starts_with(&crate::instruction::CreateFeed::DISCRIMINATOR[..]) {
            Some(Self::CreateFeed)
        } else if data.starts_with(&crate::instruction::SubmitRequest::DISCRIMINATOR[..]) {
            Some(Self::SubmitRequest)
        } else {
            None
        }
    }

    pub fn fee(&self, config: &ProtocolConfig) -> u64 {
        match self {
            Self::CreateFeed => config.fee_schedule.create_feed,
            Self::SubmitRequest => config.fee_schedule.submit_request,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Shortfall {
    pub payer: Pubkey,
    pub denom: Pubkey,
    pub required: u64,
    pub available: u64,
}

impl Shortfall {
    pub fn amount(&self) -> u64 {
        self.required.saturating_sub(self.available)
    }
}

/// Fees owed per `(payer, denom)` across one transaction.
#[derive(Clone, Debug, Default)]
pub struct FeeObligations {
    totals: BTreeMap<(Pubkey, Pubkey), u64>,
}

impl FeeObligations {
    pub fn add(&mut self, payer: Pubkey, denom: Pubkey, amount: u64) -> Result<()> {
        let total = self.totals.entry((payer, denom)).or_insert(0);
        *total = total
            .checked_add(amount)
            .ok_or(error!(FeeError::ArithmeticOverflow))?;
        Ok(())
    }

    pub fn owed(&self, payer: &Pubkey, denom: &Pubkey) -> u64 {
        self.totals.get(&(*payer, *denom)).copied().unwrap_or(0)
    }

    pub fn check_payer(
        &self,
        payer: &Pubkey,
        denom: &Pubkey,
        available: u64,
    ) -> std::result::Result<(), Shortfall> {
        let required = self.owed(payer, denom);
        if available < required {
            return Err(Shortfall {
                payer: *payer,
                denom: *denom,
                required,
                available,
            });
        }
        Ok(())
    }
}

/// Sums the fees `payer` and every other payer owe from the current instruction to
/// the end of the transaction. Fees of earlier instructions are already deducted
/// from the balances, so checking the remainder against the current balance is the
/// same as checking the whole transaction against its opening balance.
pub fn remaining_obligations(
    instructions_sysvar: &AccountInfo,
    config: &ProtocolConfig,
    current_op: FeeBearingOp,
    payer: &Pubkey,
) -> Result<FeeObligations> {
    let current_index = instructions::load_current_index_checked(instructions_sysvar)? as usize;

    let mut obligations = FeeObligations::default();
    let mut current_is_top_level = false;
    let mut index = current_index;

    while let Ok(instruction) = instructions::load_instruction_at_checked(index, instructions_sysvar)
    {
        if instruction.program_id == crate::ID {
            if let Some(op) = FeeBearingOp::from_instruction_data(&instruction.data) {
                let op_payer = instruction
                    .accounts
                    .get(PAYER_ACCOUNT_INDEX)
                    .ok_or(error!(FeeError::MalformedInstruction))?
                    .pubkey;
                if index == current_index && op == current_op && op_payer == *payer {
                    current_is_top_level = true;
                }
                obligations.add(op_payer, config.fee_mint, op.fee(config))?;
            }
        }
        index += 1;
    }

    // Invoked through CPI: the top-level list does not contain this instruction.
    if !current_is_top_level {
        obligations.add(*payer, config.fee_mint, current_op.fee(config))?;
    }

    Ok(obligations)
}

/// Admission gate. Runs on entry of every fee-bearing instruction, before any
/// state is touched, and fails the whole transaction if the payer cannot cover
/// everything it owes in it.
pub fn admit(
    instructions_sysvar: &AccountInfo,
    config: &ProtocolConfig,
    current_op: FeeBearingOp,
    payer: &Pubkey,
    available: u64,
) -> Result<()> {
    let obligations = remaining_obligations(instructions_sysvar, config, current_op, payer)?;

    if let Err(shortfall) = obligations.check_payer(payer, &config.fee_mint, available) {
        msg!(
            "Admission rejected: payer {} owes {} of {} but holds {} (short {}).",
            shortfall.payer,
            shortfall.required,
            shortfall.denom,
            shortfall.available,
            shortfall.amount()
        );
        return err!(FeeError::InsufficientFunds);
    }

    Ok(())
}
