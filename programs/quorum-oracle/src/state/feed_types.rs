use anchor_lang::prelude::*;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, Default, InitSpace)]
pub enum FeedState {
    #[default]
    Created,
    Started,
    Paused,
}

/// How accepted payloads are folded into a single result.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, Default, InitSpace)]
pub enum AggregationRule {
    /// Bias-resistant mix of all payloads with slot entropy.
    #[default]
    Randomness,
    FirstAccepted,
    Majority,
    /// Payloads carry a little-endian i64 in their first 8 bytes.
    Median,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, Default, InitSpace)]
pub enum ResponseMode {
    #[default]
    Direct,
    /// Providers commit to `keccak(payload || salt || provider)` before revealing.
    CommitReveal,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, Default, InitSpace)]
pub enum RequestStatus {
    #[default]
    Pending,
    Fulfilled,
    Expired,
}

impl RequestStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

/// What happens to a reserved fee when its request expires.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, Default, InitSpace)]
pub enum ExpiryPolicy {
    #[default]
    Forfeit,
    Refund,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum RejectionReason {
    RequestAlreadyResolved,
}
