use crate::error::FeeError;
use crate::events::ProtocolInitialized;
use crate::state::{ExpiryPolicy, FeeSchedule, ProtocolConfig};
use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

pub fn initialize_protocol(
    ctx: Context<InitializeProtocol>,
    params: InitializeProtocolParams,
) -> Result<()> {
    require!(
        params.max_timeout_slots > 0,
        FeeError::InvalidProtocolConfig
    );

    let clock = Clock::get()?;
    let config = &mut ctx.accounts.protocol_config;
    config.authority = ctx.accounts.authority.key();
    config.fee_mint = ctx.accounts.fee_mint.key();
    config.treasury = ctx.accounts.treasury.key();
    config.vault = ctx.accounts.vault.key();
    config.fee_schedule = params.fee_schedule;
    config.expiry_policy = params.expiry_policy;
    config.max_timeout_slots = params.max_timeout_slots;
    config.bump = ctx.bumps.protocol_config;
    config.vault_bump = ctx.bumps.vault;

    msg!(
        "Protocol initialized with fee mint: {}, feed fee: {}, request fee: {}, expiry policy: {:?}",
        config.fee_mint,
        config.fee_schedule.create_feed,
        config.fee_schedule.submit_request,
        config.expiry_policy
    );

    emit!(ProtocolInitialized {
        protocol_config: ctx.accounts.protocol_config.key(),
        authority: ctx.accounts.authority.key(),
        fee_mint: ctx.accounts.fee_mint.key(),
        initialized_slot: clock.slot,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct InitializeProtocol<'info> {
    #[account(
        init,
        payer = authority,
        space = ProtocolConfig::SPACE,
        seeds = [ProtocolConfig::SEED_PREFIX],
        bump
    )]
    pub protocol_config: Account<'info, ProtocolConfig>,

    pub fee_mint: InterfaceAccount<'info, Mint>,

    #[account(
        constraint = treasury.mint == fee_mint.key() @ FeeError::InvalidProtocolConfig,
    )]
    pub treasury: InterfaceAccount<'info, TokenAccount>,

    /// Escrow for reserved request fees, owned by the config PDA
    #[account(
        init,
        payer = authority,
        seeds = [ProtocolConfig::VAULT_SEED_PREFIX],
        bump,
        token::mint = fee_mint,
        token::authority = protocol_config,
        token::token_program = token_program,
    )]
    pub vault: InterfaceAccount<'info, TokenAccount>,

    #[account(mut)]
    pub authority: Signer<'info>,

    pub system_program: Program<'info, System>,
    pub token_program: Interface<'info, TokenInterface>,
}

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct InitializeProtocolParams {
    pub fee_schedule: FeeSchedule,
    pub expiry_policy: ExpiryPolicy,
    pub max_timeout_slots: u64,
}
