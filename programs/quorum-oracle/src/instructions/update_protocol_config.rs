use crate::error::{FeeError, OracleError};
use crate::events::ProtocolConfigUpdated;
use crate::state::{ExpiryPolicy, FeeSchedule, ProtocolConfig};
use anchor_lang::prelude::*;
use anchor_spl::token_interface::TokenAccount;

pub fn update_protocol_config(
    ctx: Context<UpdateProtocolConfig>,
    params: UpdateProtocolConfigParams,
) -> Result<()> {
    require!(
        params.max_timeout_slots > 0,
        FeeError::InvalidProtocolConfig
    );

    let config = &mut ctx.accounts.protocol_config;
    config.fee_schedule = params.fee_schedule;
    config.expiry_policy = params.expiry_policy;
    config.max_timeout_slots = params.max_timeout_slots;
    config.treasury = ctx.accounts.treasury.key();

    msg!(
        "Protocol config updated. Feed fee: {}, request fee: {}, expiry policy: {:?}, max timeout: {} slots",
        params.fee_schedule.create_feed,
        params.fee_schedule.submit_request,
        params.expiry_policy,
        params.max_timeout_slots
    );

    emit!(ProtocolConfigUpdated {
        protocol_config: ctx.accounts.protocol_config.key(),
        authority: ctx.accounts.authority.key(),
        fee_schedule: params.fee_schedule,
        expiry_policy: params.expiry_policy,
        updated_slot: Clock::get()?.slot,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct UpdateProtocolConfig<'info> {
    #[account(
        mut,
        seeds = [ProtocolConfig::SEED_PREFIX],
        bump = protocol_config.bump,
        has_one = authority @ OracleError::NotAuthorized,
    )]
    pub protocol_config: Account<'info, ProtocolConfig>,

    #[account(
        constraint = treasury.mint == protocol_config.fee_mint @ FeeError::InvalidProtocolConfig,
    )]
    pub treasury: InterfaceAccount<'info, TokenAccount>,

    pub authority: Signer<'info>,
}

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct UpdateProtocolConfigParams {
    pub fee_schedule: FeeSchedule,
    pub expiry_policy: ExpiryPolicy,
    pub max_timeout_slots: u64,
}
