use crate::error::OracleError;
use crate::state::{Feed, PendingRequest, PendingSummary, RequestStatus, ResultEntry};
use crate::utils::lookup;
use anchor_lang::prelude::*;

pub fn list_pending_requests(ctx: Context<ReadFeed>) -> Result<Vec<PendingSummary>> {
    let feed: Feed = lookup::load(&ctx.accounts.feed, OracleError::UnknownFeed)?;
    Ok(feed.pending)
}

pub fn get_latest_result(ctx: Context<ReadFeed>) -> Result<Option<ResultEntry>> {
    let feed: Feed = lookup::load(&ctx.accounts.feed, OracleError::UnknownFeed)?;
    Ok(feed.latest_result)
}

pub fn get_request_status(ctx: Context<ReadRequest>) -> Result<RequestStatusView> {
    let request: PendingRequest =
        lookup::load(&ctx.accounts.request, OracleError::UnknownRequest)?;
    Ok(RequestStatusView::from(&request))
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub struct RequestStatusView {
    pub status: RequestStatus,
    pub result: Option<[u8; 32]>,
    pub accepted: u8,
    pub resolved_slot: u64,
}

impl From<&PendingRequest> for RequestStatusView {
    fn from(request: &PendingRequest) -> Self {
        Self {
            status: request.status,
            result: request.result,
            accepted: request.accepted_count() as u8,
            resolved_slot: request.resolved_slot,
        }
    }
}

#[derive(Accounts)]
pub struct ReadFeed<'info> {
    /// CHECK: Decoded by `lookup::load`.
    pub feed: UncheckedAccount<'info>,
}

#[derive(Accounts)]
pub struct ReadRequest<'info> {
    /// CHECK: Decoded by `lookup::load`.
    pub request: UncheckedAccount<'info>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ProviderResponse, ResponseMode};

    #[test]
    fn status_view_counts_only_revealed_responses() {
        let request = PendingRequest {
            threshold: 2,
            response_mode: ResponseMode::CommitReveal,
            responses: vec![
                ProviderResponse {
                    provider: Pubkey::new_unique(),
                    revealed: true,
                    order: 1,
                    ..Default::default()
                },
                ProviderResponse {
                    provider: Pubkey::new_unique(),
                    commitment: [7; 32],
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let view = RequestStatusView::from(&request);
        assert_eq!(view.status, RequestStatus::Pending);
        assert_eq!(view.accepted, 1);
        assert_eq!(view.result, None);
    }

    #[test]
    fn status_view_reports_fulfilled_result() {
        let mut request = PendingRequest {
            threshold: 1,
            deadline_slot: 20,
            ..Default::default()
        };
        request
            .record_response(Pubkey::new_unique(), [3; 32], [0; 32], 12)
            .unwrap();
        request.fulfil([4; 32], 12).unwrap();

        let view = RequestStatusView::from(&request);
        assert_eq!(view.status, RequestStatus::Fulfilled);
        assert_eq!(view.result, Some([4; 32]));
        assert_eq!(view.accepted, 1);
        assert_eq!(view.resolved_slot, 12);
    }
}
