use anchor_lang::prelude::*;

pub mod error;
pub mod events;
pub mod instructions;
pub mod state;
pub mod utils;

use instructions::*;
use state::*;

declare_id!("AHFsfaih1ydTm8Gj7PEnVe1Tgzek7rL3gHb75n1HkFHb");

#[program]
pub mod quorum_oracle {
    use super::*;

    // Protocol administration
    pub fn initialize_protocol(
        ctx: Context<InitializeProtocol>,
        params: InitializeProtocolParams,
    ) -> Result<()> {
        instructions::initialize_protocol(ctx, params)
    }

    pub fn update_protocol_config(
        ctx: Context<UpdateProtocolConfig>,
        params: UpdateProtocolConfigParams,
    ) -> Result<()> {
        instructions::update_protocol_config(ctx, params)
    }

    // Feed lifecycle
    pub fn create_feed(ctx: Context<CreateFeed>, params: CreateFeedParams) -> Result<()> {
        instructions::create_feed(ctx, params)
    }

    pub fn start_feed(ctx: Context<ManageFeed>) -> Result<()> {
        instructions::start_feed(ctx)
    }

    pub fn pause_feed(ctx: Context<ManageFeed>) -> Result<()> {
        instructions::pause_feed(ctx)
    }

    pub fn edit_feed(ctx: Context<EditFeed>, params: EditFeedParams) -> Result<()> {
        instructions::edit_feed(ctx, params)
    }

    // Requests and responses
    pub fn submit_request(ctx: Context<SubmitRequest>, seq: u64) -> Result<Pubkey> {
        instructions::submit_request(ctx, seq)
    }

    pub fn commit_response(ctx: Context<CommitResponse>, commitment: [u8; 32]) -> Result<()> {
        instructions::commit_response(ctx, commitment)
    }

    pub fn submit_response(
        ctx: Context<SubmitResponse>,
        payload: [u8; 32],
        salt: [u8; 32],
    ) -> Result<()> {
        instructions::submit_response(ctx, payload, salt)
    }

    pub fn expire_request(ctx: Context<ExpireRequest>) -> Result<()> {
        instructions::expire_request(ctx)
    }

    // Views
    pub fn list_pending_requests(ctx: Context<ReadFeed>) -> Result<Vec<PendingSummary>> {
        instructions::list_pending_requests(ctx)
    }

    pub fn get_latest_result(ctx: Context<ReadFeed>) -> Result<Option<ResultEntry>> {
        instructions::get_latest_result(ctx)
    }

    pub fn get_request_status(ctx: Context<ReadRequest>) -> Result<RequestStatusView> {
        instructions::get_request_status(ctx)
    }
}
