use crate::state::{AggregationRule, ExpiryPolicy, FeeSchedule, RejectionReason, ResponseMode};
use anchor_lang::prelude::*;

#[event]
pub struct ProtocolInitialized {
    pub protocol_config: Pubkey,
    pub authority: Pubkey,
    pub fee_mint: Pubkey,
    pub initialized_slot: u64,
}

#[event]
pub struct ProtocolConfigUpdated {
    pub protocol_config: Pubkey,
    pub authority: Pubkey,
    pub fee_schedule: FeeSchedule,
    pub expiry_policy: ExpiryPolicy,
    pub updated_slot: u64,
}

#[event]
pub struct FeedCreated {
    pub feed: Pubkey,
    pub creator: Pubkey,
    pub seq: u64,
    pub providers: Vec<Pubkey>,
    pub threshold: u8,
    pub timeout_slots: u64,
    pub aggregation: AggregationRule,
    pub response_mode: ResponseMode,
    pub fee_paid: u64,
    pub created_slot: u64,
}

#[event]
pub struct FeedStarted {
    pub feed: Pubkey,
    pub creator: Pubkey,
    pub started_slot: u64,
}

#[event]
pub struct FeedPaused {
    pub feed: Pubkey,
    pub creator: Pubkey,
    pub paused_slot: u64,
}

#[event]
pub struct FeedEdited {
    pub feed: Pubkey,
    pub creator: Pubkey,
    pub providers: Vec<Pubkey>,
    pub threshold: u8,
    pub timeout_slots: u64,
    pub edited_slot: u64,
}

#[event]
pub struct RequestSubmitted {
    pub request: Pubkey,
    pub feed: Pubkey,
    pub consumer: Pubkey,
    pub fee: u64,
    pub threshold: u8,
    pub created_slot: u64,
    pub deadline_slot: u64,
}

#[event]
pub struct ResponseCommitted {
    pub request: Pubkey,
    pub provider: Pubkey,
    pub commitment: [u8; 32],
    pub committed_slot: u64,
}

#[event]
pub struct ResponseAccepted {
    pub request: Pubkey,
    pub provider: Pubkey,
    pub payload: [u8; 32],
    pub accepted: u8,
    pub threshold: u8,
    pub accepted_slot: u64,
}

#[event]
pub struct ResponseRejected {
    pub request: Pubkey,
    pub provider: Pubkey,
    pub reason: RejectionReason,
    pub rejected_slot: u64,
}

#[event]
pub struct RequestFulfilled {
    pub request: Pubkey,
    pub feed: Pubkey,
    pub result: [u8; 32],
    pub responses: u8,
    pub fulfilled_slot: u64,
}

#[event]
pub struct RequestExpired {
    pub request: Pubkey,
    pub feed: Pubkey,
    pub responses: u8,
    pub fee_refunded: bool,
    pub expired_slot: u64,
}
