use super::{AggregationRule, PendingSummary, RequestStatus, ResponseMode, MAX_PROVIDERS};
use crate::error::OracleError;
use anchor_lang::prelude::*;
use anchor_lang::solana_program::keccak;

pub const MAX_RESPONSES: usize = MAX_PROVIDERS;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, Default, InitSpace)]
pub struct ProviderResponse {
    pub provider: Pubkey,
    pub commitment: [u8; 32], // zero in direct mode
    pub payload: [u8; 32],
    pub revealed: bool,
    pub order: u8,            // 1-based acceptance order, 0 until accepted
    pub slot: u64,
}

#[account]
#[derive(Default, Debug, InitSpace)]
pub struct PendingRequest {
    pub feed: Pubkey,
    pub seq: u64,
    pub consumer: Pubkey,
    pub fee: u64,
    pub refund_account: Pubkey,
    pub created_slot: u64,
    pub deadline_slot: u64,
    pub threshold: u8,
    pub aggregation: AggregationRule,
    pub response_mode: ResponseMode,
    #[max_len(MAX_RESPONSES)]
    pub responses: Vec<ProviderResponse>,
    pub status: RequestStatus,
    pub result: Option<[u8; 32]>,
    pub resolved_slot: u64,
    pub bump: u8,
}

impl PendingRequest {
    pub const SEED_PREFIX: &'static [u8] = b"request";
    pub const SPACE: usize = 8 + Self::INIT_SPACE;

    pub fn commitment_for(payload: &[u8; 32], salt: &[u8; 32], provider: &Pubkey) -> [u8; 32] {
        keccak::hashv(&[&payload[..], &salt[..], provider.as_ref()]).to_bytes()
    }

    pub fn is_resolved(&self) -> bool {
        self.status.is_terminal()
    }

    /// A pending request is due once the slot is strictly past its deadline.
    pub fn is_due(&self, slot: u64) -> bool {
        self.status == RequestStatus::Pending && slot > self.deadline_slot
    }

    pub fn accepted_count(&self) -> usize {
        self.responses.iter().filter(|r| r.revealed).count()
    }

    pub fn threshold_reached(&self) -> bool {
        self.accepted_count() >= self.threshold as usize
    }

    /// Accepted `(provider, payload)` pairs in acceptance order.
    pub fn accepted_payloads(&self) -> Vec<(Pubkey, [u8; 32])> {
        let mut accepted: Vec<&ProviderResponse> =
            self.responses.iter().filter(|r| r.revealed).collect();
        accepted.sort_by_key(|r| r.order);
        accepted.iter().map(|r| (r.provider, r.payload)).collect()
    }

    pub fn summary(&self, key: Pubkey) -> PendingSummary {
        PendingSummary {
            request: key,
            threshold: self.threshold,
            deadline_slot: self.deadline_slot,
            awaiting_reveal: 0,
        }
    }

    fn ensure_pending(&self) -> Result<()> {
        require!(!self.is_resolved(), OracleError::RequestAlreadyResolved);
        Ok(())
    }

    fn position_of(&self, provider: &Pubkey) -> Option<usize> {
        self.responses.iter().position(|r| r.provider == *provider)
    }

    pub fn record_commitment(
        &mut self,
        provider: Pubkey,
        commitment: [u8; 32],
        slot: u64,
    ) -> Result<()> {
        self.ensure_pending()?;
        require!(
            self.response_mode == ResponseMode::CommitReveal,
            OracleError::NotCommitReveal
        );
        require!(
            self.position_of(&provider).is_none(),
            OracleError::DuplicateResponse
        );
        require!(
            self.responses.len() < self.threshold as usize,
            OracleError::CommitPhaseClosed
        );

        self.responses.push(ProviderResponse {
            provider,
            commitment,
            slot,
            ..Default::default()
        });
        Ok(())
    }

    /// Records a provider payload and returns the number of accepted responses.
    /// Provider membership is checked by the caller against the feed.
    pub fn record_response(
        &mut self,
        provider: Pubkey,
        payload: [u8; 32],
        salt: [u8; 32],
        slot: u64,
    ) -> Result<usize> {
        self.ensure_pending()?;
        let order = (self.accepted_count() + 1) as u8;

        match self.response_mode {
            ResponseMode::Direct => {
                require!(
                    self.position_of(&provider).is_none(),
                    OracleError::DuplicateResponse
                );
                require!(
                    self.responses.len() < MAX_RESPONSES,
                    OracleError::TooManyResponses
                );
                self.responses.push(ProviderResponse {
                    provider,
                    payload,
                    revealed: true,
                    order,
                    slot,
                    ..Default::default()
                });
            }
            ResponseMode::CommitReveal => {
                let idx = self.position_of(&provider);
                if let Some(idx) = idx {
                    require!(
                        !self.responses[idx].revealed,
                        OracleError::DuplicateResponse
                    );
                }
                require!(
                    self.responses.len() >= self.threshold as usize,
                    OracleError::RevealNotOpen
                );
                let idx = idx.ok_or(error!(OracleError::MissingCommitment))?;
                let entry = &mut self.responses[idx];
                require!(
                    Self::commitment_for(&payload, &salt, &provider) == entry.commitment,
                    OracleError::CommitmentMismatch
                );
                entry.payload = payload;
                entry.revealed = true;
                entry.order = order;
                entry.slot = slot;
            }
        }

        Ok(self.accepted_count())
    }

    pub fn fulfil(&mut self, result: [u8; 32], slot: u64) -> Result<()> {
        self.ensure_pending()?;
        self.status = RequestStatus::Fulfilled;
        self.result = Some(result);
        self.resolved_slot = slot;
        Ok(())
    }

    pub fn expire(&mut self, slot: u64) -> Result<()> {
        self.ensure_pending()?;
        require!(self.is_due(slot), OracleError::RequestNotDue);
        self.status = RequestStatus::Expired;
        self.resolved_slot = slot;
        Ok(())
    }
}
