use super::ExpiryPolicy;
use anchor_lang::prelude::*;

/// Fee amounts by operation type, denominated in `ProtocolConfig::fee_mint`.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, Default, InitSpace)]
pub struct FeeSchedule {
    pub create_feed: u64,
    pub submit_request: u64,
}

#[account]
#[derive(Default, InitSpace)]
pub struct ProtocolConfig {
    pub authority: Pubkey,
    pub fee_mint: Pubkey,
    pub treasury: Pubkey,    // Token account receiving settled fees
    pub vault: Pubkey,       // Escrow for reserved request fees
    pub fee_schedule: FeeSchedule,
    pub expiry_policy: ExpiryPolicy,
    pub max_timeout_slots: u64,
    pub bump: u8,
    pub vault_bump: u8,
}

impl ProtocolConfig {
    pub const SEED_PREFIX: &'static [u8] = b"config";
    pub const VAULT_SEED_PREFIX: &'static [u8] = b"vault";
    pub const SPACE: usize = 8 + Self::INIT_SPACE;

    pub fn signer_seeds(&self) -> [&[u8]; 2] {
        [Self::SEED_PREFIX, std::slice::from_ref(&self.bump)]
    }
}
