use super::{AggregationRule, FeedState, ResponseMode};
use crate::error::OracleError;
use crate::instructions::EditFeedParams;
use anchor_lang::prelude::*;

pub const MAX_PROVIDERS: usize = 16;
pub const MAX_PENDING: usize = 16;
pub const MAX_HISTORY: usize = 8;
pub const MAX_NAME_LEN: usize = 32;
pub const MAX_DESCRIPTION_LEN: usize = 128;
pub const MAX_SCHEMA_LEN: usize = 512;

/// In-flight request as seen from its feed.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, Default, InitSpace)]
pub struct PendingSummary {
    pub request: Pubkey,
    pub threshold: u8,
    pub deadline_slot: u64,
    /// Bit `i` is set while `providers[i]` has committed but not yet revealed.
    pub awaiting_reveal: u16,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, Default, InitSpace)]
pub struct ResultEntry {
    pub request: Pubkey,
    pub value: [u8; 32],
    pub slot: u64,
}

#[account]
#[derive(Default, Debug, InitSpace)]
pub struct Feed {
    pub creator: Pubkey,
    pub seq: u64,
    #[max_len(MAX_NAME_LEN)]
    pub name: String,
    #[max_len(MAX_DESCRIPTION_LEN)]
    pub description: String,
    #[max_len(MAX_PROVIDERS)]
    pub providers: Vec<Pubkey>,
    pub threshold: u8,
    pub timeout_slots: u64,
    pub aggregation: AggregationRule,
    pub response_mode: ResponseMode,
    #[max_len(MAX_SCHEMA_LEN)]
    pub schema: String,
    pub state: FeedState,
    pub next_request_seq: u64,
    #[max_len(MAX_PENDING)]
    pub pending: Vec<PendingSummary>,
    pub latest_result: Option<ResultEntry>,
    #[max_len(MAX_HISTORY)]
    pub result_history: Vec<ResultEntry>,
    pub history_idx: u64,
    pub created_slot: u64,
    pub bump: u8,
}

impl Feed {
    pub const SEED_PREFIX: &'static [u8] = b"feed";
    pub const SPACE: usize = 8 + Self::INIT_SPACE;

    /// Checks the editable settings of a feed. Shared by creation and edits.
    pub fn validate_settings(
        name: &str,
        description: &str,
        providers: &[Pubkey],
        threshold: u8,
        timeout_slots: u64,
        schema: &str,
        max_timeout_slots: u64,
    ) -> Result<()> {
        require!(name.len() <= MAX_NAME_LEN, OracleError::InvalidFeedConfig);
        require!(
            description.len() <= MAX_DESCRIPTION_LEN,
            OracleError::InvalidFeedConfig
        );
        require!(schema.len() <= MAX_SCHEMA_LEN, OracleError::InvalidFeedConfig);
        require!(
            !providers.is_empty() && providers.len() <= MAX_PROVIDERS,
            OracleError::InvalidFeedConfig
        );
        for (i, provider) in providers.iter().enumerate() {
            require!(
                *provider != Pubkey::default() && !providers[..i].contains(provider),
                OracleError::InvalidFeedConfig
            );
        }
        require!(
            threshold > 0 && threshold as usize <= providers.len(),
            OracleError::InvalidFeedConfig
        );
        require!(
            timeout_slots > 0 && timeout_slots <= max_timeout_slots,
            OracleError::InvalidFeedConfig
        );
        Ok(())
    }

    pub fn ensure_creator(&self, caller: &Pubkey) -> Result<()> {
        require_keys_eq!(self.creator, *caller, OracleError::NotAuthorized);
        Ok(())
    }

    /// `Created | Paused -> Started`
    pub fn start(&mut self, caller: &Pubkey) -> Result<()> {
        self.ensure_creator(caller)?;
        require!(self.state != FeedState::Started, OracleError::InvalidState);
        self.state = FeedState::Started;
        Ok(())
    }

    /// `Started -> Paused`
    pub fn pause(&mut self, caller: &Pubkey) -> Result<()> {
        self.ensure_creator(caller)?;
        require!(self.state == FeedState::Started, OracleError::InvalidState);
        self.state = FeedState::Paused;
        Ok(())
    }

    pub fn ensure_accepting_requests(&self) -> Result<()> {
        require!(self.state == FeedState::Started, OracleError::FeedNotActive);
        Ok(())
    }

    pub fn ensure_provider(&self, provider: &Pubkey) -> Result<()> {
        require!(
            self.providers.contains(provider),
            OracleError::UnauthorizedProvider
        );
        Ok(())
    }

    /// Largest threshold among requests that can still be fulfilled at `slot`.
    pub fn max_in_flight_threshold(&self, slot: u64) -> u8 {
        self.pending
            .iter()
            .filter(|p| p.deadline_slot >= slot)
            .map(|p| p.threshold)
            .max()
            .unwrap_or(0)
    }

    /// Applies an edit atomically: nothing is written unless the edited feed is valid
    /// and every in-flight request can still reach its threshold.
    pub fn apply_edit(
        &mut self,
        caller: &Pubkey,
        edit: &EditFeedParams,
        max_timeout_slots: u64,
        slot: u64,
    ) -> Result<()> {
        self.ensure_creator(caller)?;

        let name = edit.name.as_ref().unwrap_or(&self.name);
        let description = edit.description.as_ref().unwrap_or(&self.description);
        let providers = edit.providers.as_ref().unwrap_or(&self.providers);
        let threshold = edit.threshold.unwrap_or(self.threshold);
        let timeout_slots = edit.timeout_slots.unwrap_or(self.timeout_slots);
        let schema = edit.schema.as_ref().unwrap_or(&self.schema);

        Self::validate_settings(
            name,
            description,
            providers,
            threshold,
            timeout_slots,
            schema,
            max_timeout_slots,
        )?;

        require!(
            providers.len() >= self.max_in_flight_threshold(slot) as usize,
            OracleError::ConflictingPendingRequest
        );

        // Commit-reveal requests close their commit phase at `threshold` commitments,
        // so a committed provider that can no longer reveal strands the request.
        for summary in self.pending.iter().filter(|p| p.deadline_slot >= slot) {
            for (i, committed) in self.providers.iter().enumerate() {
                if summary.awaiting_reveal & (1 << i) != 0 && !providers.contains(committed) {
                    msg!(
                        "Provider {} still owes a reveal for request {}.",
                        committed,
                        summary.request
                    );
                    return err!(OracleError::ConflictingPendingRequest);
                }
            }
        }

        if let Some(name) = &edit.name {
            self.name = name.clone();
        }
        if let Some(description) = &edit.description {
            self.description = description.clone();
        }
        if let Some(providers) = &edit.providers {
            for summary in self.pending.iter_mut() {
                summary.awaiting_reveal =
                    remap_providers(&self.providers, providers, summary.awaiting_reveal);
            }
            self.providers = providers.clone();
        }
        if let Some(schema) = &edit.schema {
            self.schema = schema.clone();
        }
        self.threshold = threshold;
        self.timeout_slots = timeout_slots;
        Ok(())
    }

    /// Registers a new in-flight request. Entries already past their deadline can
    /// never be fulfilled and are dropped first; their keys are returned so the
    /// caller can report them. Their request accounts are settled by the expiry crank.
    pub fn track_pending(&mut self, summary: PendingSummary, slot: u64) -> Result<Vec<Pubkey>> {
        let dropped: Vec<Pubkey> = self
            .pending
            .iter()
            .filter(|p| p.deadline_slot < slot)
            .map(|p| p.request)
            .collect();
        self.pending.retain(|p| p.deadline_slot >= slot);

        require!(
            self.pending.len() < MAX_PENDING,
            OracleError::TooManyPendingRequests
        );
        self.pending.push(summary);
        Ok(dropped)
    }

    fn provider_bit(&self, provider: &Pubkey) -> u16 {
        self.providers
            .iter()
            .position(|p| p == provider)
            .map_or(0, |i| 1 << i)
    }

    pub fn note_commitment(&mut self, request: &Pubkey, provider: &Pubkey) {
        let bit = self.provider_bit(provider);
        if let Some(entry) = self.pending.iter_mut().find(|p| p.request == *request) {
            entry.awaiting_reveal |= bit;
        }
    }

    pub fn note_reveal(&mut self, request: &Pubkey, provider: &Pubkey) {
        let bit = self.provider_bit(provider);
        if let Some(entry) = self.pending.iter_mut().find(|p| p.request == *request) {
            entry.awaiting_reveal &= !bit;
        }
    }

    pub fn untrack_pending(&mut self, request: &Pubkey) {
        self.pending.retain(|p| p.request != *request);
    }

    pub fn record_result(&mut self, entry: ResultEntry) {
        self.latest_result = Some(entry);

        // Ring buffer for history
        if self.result_history.len() < MAX_HISTORY {
            self.result_history.push(entry);
            self.history_idx = (self.result_history.len() % MAX_HISTORY) as u64;
        } else {
            let history_idx = self.history_idx as usize;
            self.result_history[history_idx] = entry;
            self.history_idx = ((history_idx + 1) % MAX_HISTORY) as u64;
        }
    }
}

/// Re-indexes a provider bitmask from `old` positions to `new` positions.
/// Providers absent from `new` drop out of the mask.
fn remap_providers(old: &[Pubkey], new: &[Pubkey], mask: u16) -> u16 {
    new.iter().enumerate().fold(0, |acc, (j, provider)| {
        match old.iter().position(|p| p == provider) {
            Some(i) if mask & (1 << i) != 0 => acc | (1 << j),
            _ => acc,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_with_providers(creator: Pubkey, count: usize, threshold: u8) -> Feed {
        Feed {
            creator,
            providers: (0..count).map(|_| Pubkey::new_unique()).collect(),
            threshold,
            timeout_slots: 5,
            ..Default::default()
        }
    }

    fn no_edit() -> EditFeedParams {
        EditFeedParams::default()
    }

    #[test]
    fn lifecycle_transitions() {
        let creator = Pubkey::new_unique();
        let mut feed = feed_with_providers(creator, 3, 2);
        assert_eq!(feed.state, FeedState::Created);
        assert_eq!(
            feed.ensure_accepting_requests().unwrap_err(),
            error!(OracleError::FeedNotActive)
        );

        feed.start(&creator).unwrap();
        assert_eq!(feed.state, FeedState::Started);
        feed.ensure_accepting_requests().unwrap();
        assert_eq!(
            feed.start(&creator).unwrap_err(),
            error!(OracleError::InvalidState)
        );

        feed.pause(&creator).unwrap();
        assert_eq!(feed.state, FeedState::Paused);
        assert_eq!(
            feed.pause(&creator).unwrap_err(),
            error!(OracleError::InvalidState)
        );
        assert_eq!(
            feed.ensure_accepting_requests().unwrap_err(),
            error!(OracleError::FeedNotActive)
        );

        feed.start(&creator).unwrap();
        assert_eq!(feed.state, FeedState::Started);
    }

    #[test]
    fn pause_from_created_is_invalid() {
        let creator = Pubkey::new_unique();
        let mut feed = feed_with_providers(creator, 1, 1);
        assert_eq!(
            feed.pause(&creator).unwrap_err(),
            error!(OracleError::InvalidState)
        );
    }

    #[test]
    fn only_creator_manages_feed() {
        let creator = Pubkey::new_unique();
        let stranger = Pubkey::new_unique();
        let mut feed = feed_with_providers(creator, 3, 2);

        assert_eq!(
            feed.start(&stranger).unwrap_err(),
            error!(OracleError::NotAuthorized)
        );
        feed.start(&creator).unwrap();
        assert_eq!(
            feed.pause(&stranger).unwrap_err(),
            error!(OracleError::NotAuthorized)
        );
        assert_eq!(
            feed.apply_edit(&stranger, &no_edit(), 100, 0).unwrap_err(),
            error!(OracleError::NotAuthorized)
        );
        assert_eq!(feed.state, FeedState::Started);
    }

    #[test]
    fn settings_validation() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();

        Feed::validate_settings("btc", "", &[a, b], 2, 5, "{}", 100).unwrap();

        let invalid = error!(OracleError::InvalidFeedConfig);
        assert_eq!(
            Feed::validate_settings("btc", "", &[], 1, 5, "", 100).unwrap_err(),
            invalid
        );
        assert_eq!(
            Feed::validate_settings("btc", "", &[a, b], 3, 5, "", 100).unwrap_err(),
            invalid
        );
        assert_eq!(
            Feed::validate_settings("btc", "", &[a, b], 0, 5, "", 100).unwrap_err(),
            invalid
        );
        assert_eq!(
            Feed::validate_settings("btc", "", &[a, b], 1, 0, "", 100).unwrap_err(),
            invalid
        );
        assert_eq!(
            Feed::validate_settings("btc", "", &[a, b], 1, 101, "", 100).unwrap_err(),
            invalid
        );
        assert_eq!(
            Feed::validate_settings("btc", "", &[a, a], 1, 5, "", 100).unwrap_err(),
            invalid
        );
        let long_name = "x".repeat(MAX_NAME_LEN + 1);
        assert_eq!(
            Feed::validate_settings(&long_name, "", &[a], 1, 5, "", 100).unwrap_err(),
            invalid
        );
    }

    #[test]
    fn edit_rejects_shrinking_below_in_flight_threshold() {
        let creator = Pubkey::new_unique();
        let mut feed = feed_with_providers(creator, 3, 3);
        feed.track_pending(PendingSummary {
            request: Pubkey::new_unique(),
            threshold: 3,
            deadline_slot: 20,
            ..Default::default()
        }, 10)
        .unwrap();

        let edit = EditFeedParams {
            providers: Some(feed.providers[..2].to_vec()),
            threshold: Some(2),
            ..no_edit()
        };
        let before = feed.providers.clone();
        assert_eq!(
            feed.apply_edit(&creator, &edit, 100, 15).unwrap_err(),
            error!(OracleError::ConflictingPendingRequest)
        );
        assert_eq!(feed.providers, before);
        assert_eq!(feed.threshold, 3);

        // Once the request is past its deadline it no longer blocks the edit.
        feed.apply_edit(&creator, &edit, 100, 21).unwrap();
        assert_eq!(feed.providers.len(), 2);
        assert_eq!(feed.threshold, 2);
    }

    #[test]
    fn edit_keeps_unspecified_fields() {
        let creator = Pubkey::new_unique();
        let mut feed = feed_with_providers(creator, 3, 2);
        feed.name = "eth-usd".to_string();

        let edit = EditFeedParams {
            description: Some("ETH spot".to_string()),
            timeout_slots: Some(9),
            ..no_edit()
        };
        feed.apply_edit(&creator, &edit, 100, 0).unwrap();
        assert_eq!(feed.name, "eth-usd");
        assert_eq!(feed.description, "ETH spot");
        assert_eq!(feed.timeout_slots, 9);
        assert_eq!(feed.threshold, 2);
        assert_eq!(feed.providers.len(), 3);
    }

    #[test]
    fn pending_list_is_bounded() {
        let mut feed = feed_with_providers(Pubkey::new_unique(), 1, 1);
        for _ in 0..MAX_PENDING {
            feed.track_pending(PendingSummary::default(), 0).unwrap();
        }
        assert_eq!(
            feed.track_pending(PendingSummary::default(), 0).unwrap_err(),
            error!(OracleError::TooManyPendingRequests)
        );
    }

    #[test]
    fn overdue_entries_free_pending_capacity() {
        let mut feed = feed_with_providers(Pubkey::new_unique(), 1, 1);
        let overdue: Vec<Pubkey> = (0..MAX_PENDING).map(|_| Pubkey::new_unique()).collect();
        for request in &overdue {
            feed.track_pending(
                PendingSummary {
                    request: *request,
                    threshold: 1,
                    deadline_slot: 10,
                    ..Default::default()
                },
                5,
            )
            .unwrap();
        }

        // Still fulfillable at slot 10: the list is full.
        assert_eq!(
            feed.track_pending(PendingSummary::default(), 10).unwrap_err(),
            error!(OracleError::TooManyPendingRequests)
        );
        assert_eq!(feed.pending.len(), MAX_PENDING);

        let fresh = PendingSummary {
            request: Pubkey::new_unique(),
            threshold: 1,
            deadline_slot: 1_005,
            ..Default::default()
        };
        let dropped = feed.track_pending(fresh, 1_000).unwrap();
        assert_eq!(dropped, overdue);
        assert_eq!(feed.pending, vec![fresh]);
    }

    #[test]
    fn edit_cannot_drop_a_provider_owing_a_reveal() {
        let creator = Pubkey::new_unique();
        let mut feed = feed_with_providers(creator, 3, 2);
        let (a, b, c) = (feed.providers[0], feed.providers[1], feed.providers[2]);
        let d = Pubkey::new_unique();
        let request = Pubkey::new_unique();

        feed.track_pending(
            PendingSummary {
                request,
                threshold: 2,
                deadline_slot: 20,
                ..Default::default()
            },
            10,
        )
        .unwrap();
        feed.note_commitment(&request, &a);
        feed.note_commitment(&request, &b);
        assert_eq!(feed.pending[0].awaiting_reveal, 0b011);

        let swap_b = EditFeedParams {
            providers: Some(vec![a, c, d]),
            ..no_edit()
        };
        assert_eq!(
            feed.apply_edit(&creator, &swap_b, 100, 12).unwrap_err(),
            error!(OracleError::ConflictingPendingRequest)
        );
        assert_eq!(feed.providers, vec![a, b, c]);

        // c never committed, so it can be replaced; the mask follows b to its new index.
        let swap_c = EditFeedParams {
            providers: Some(vec![d, b, a]),
            ..no_edit()
        };
        feed.apply_edit(&creator, &swap_c, 100, 12).unwrap();
        assert_eq!(feed.pending[0].awaiting_reveal, 0b110);

        // Once b has revealed it may leave.
        feed.note_reveal(&request, &b);
        assert_eq!(feed.pending[0].awaiting_reveal, 0b100);
        let drop_b = EditFeedParams {
            providers: Some(vec![d, a]),
            ..no_edit()
        };
        feed.apply_edit(&creator, &drop_b, 100, 13).unwrap();
        assert_eq!(feed.pending[0].awaiting_reveal, 0b10);
    }

    #[test]
    fn result_history_wraps() {
        let mut feed = feed_with_providers(Pubkey::new_unique(), 1, 1);
        for slot in 0..(MAX_HISTORY as u64 + 3) {
            feed.record_result(ResultEntry {
                slot,
                ..Default::default()
            });
        }
        assert_eq!(feed.result_history.len(), MAX_HISTORY);
        assert_eq!(feed.latest_result.unwrap().slot, MAX_HISTORY as u64 + 2);
        assert_eq!(feed.result_history[2].slot, MAX_HISTORY as u64 + 2);
        assert_eq!(feed.history_idx, 3);
    }
}
