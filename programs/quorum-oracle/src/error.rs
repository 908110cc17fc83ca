use anchor_lang::prelude::*;

#[error_code]
pub enum OracleError {
    #[msg("The caller is not allowed to manage this account.")]
    NotAuthorized,
    #[msg("The feed cannot make this lifecycle transition from its current state.")]
    InvalidState,
    #[msg("The referenced feed does not exist.")]
    UnknownFeed,
    #[msg("The referenced request does not exist.")]
    UnknownRequest,
    #[msg("The feed is not started and does not accept requests.")]
    FeedNotActive,
    #[msg("The responder is not an authorized provider of this feed.")]
    UnauthorizedProvider,
    #[msg("The provider has already responded to this request.")]
    DuplicateResponse,
    #[msg("The request has already been resolved.")]
    RequestAlreadyResolved,
    #[msg("The edit would leave an in-flight request unable to reach its threshold.")]
    ConflictingPendingRequest,
    #[msg("Invalid feed configuration.")]
    InvalidFeedConfig,
    #[msg("The feed sequence does not match the creator's next sequence.")]
    InvalidFeedSequence,
    #[msg("The request sequence does not match the feed's next sequence.")]
    InvalidRequestSequence,
    #[msg("The refund account does not match the request.")]
    InvalidRefundAccount,
    #[msg("The feed has too many pending requests.")]
    TooManyPendingRequests,
    #[msg("The request deadline has not passed yet.")]
    RequestNotDue,
    #[msg("The request does not use commit-reveal responses.")]
    NotCommitReveal,
    #[msg("Reveals are accepted only after enough providers have committed.")]
    RevealNotOpen,
    #[msg("Enough providers have committed; new commitments are closed.")]
    CommitPhaseClosed,
    #[msg("The provider did not commit before revealing.")]
    MissingCommitment,
    #[msg("The revealed payload does not match the commitment.")]
    CommitmentMismatch,
    #[msg("The request cannot hold more responses.")]
    TooManyResponses,
    #[msg("The payload cannot be aggregated with the feed's rule.")]
    InvalidPayload,
    #[msg("The slot hashes sysvar could not be read.")]
    InvalidEntropySource,
}

#[error_code(offset = 6100)]
pub enum FeeError {
    #[msg("Insufficient funds to cover the fees of this transaction.")]
    InsufficientFunds,
    #[msg("Invalid protocol configuration.")]
    InvalidProtocolConfig,
    #[msg("Arithmetic overflow while computing fees.")]
    ArithmeticOverflow,
    #[msg("Failed to decode an instruction of this transaction.")]
    MalformedInstruction,
}
