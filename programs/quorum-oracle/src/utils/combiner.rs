use crate::error::OracleError;
use crate::state::AggregationRule;
use anchor_lang::prelude::*;
use anchor_lang::solana_program::keccak;

const RANDOMNESS_DOMAIN: &[u8] = b"quorum-oracle:randomness:v1";

/// Per-request entropy: the slot hash every replica sees, bound to the request id
/// so that requests resolved in the same slot do not share a seed.
pub fn derive_entropy(slot_hash: &[u8; 32], request: &Pubkey) -> [u8; 32] {
    keccak::hashv(&[&slot_hash[..], request.as_ref()]).to_bytes()
}

/// keccak256(domain || entropy || payloads sorted by provider).
///
/// Sorting by provider identity makes the output independent of submission order.
pub fn combine_randomness(accepted: &[(Pubkey, [u8; 32])], entropy: &[u8; 32]) -> [u8; 32] {
    let mut sorted = accepted.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let mut parts: Vec<&[u8]> = Vec::with_capacity(sorted.len() + 2);
    parts.push(RANDOMNESS_DOMAIN);
    parts.push(&entropy[..]);
    for (_, payload) in sorted.iter() {
        parts.push(&payload[..]);
    }
    keccak::hashv(&parts).to_bytes()
}

/// Rejects payloads that the feed's rule could not aggregate later.
pub fn validate_payload(rule: AggregationRule, payload: &[u8; 32]) -> Result<()> {
    if rule == AggregationRule::Median {
        decode_i64(payload)?;
    }
    Ok(())
}

/// Folds the accepted payloads (in acceptance order) into the final result.
pub fn aggregate(
    rule: AggregationRule,
    accepted: &[(Pubkey, [u8; 32])],
    entropy: &[u8; 32],
) -> Result<[u8; 32]> {
    require!(!accepted.is_empty(), OracleError::InvalidPayload);

    match rule {
        AggregationRule::Randomness => Ok(combine_randomness(accepted, entropy)),
        AggregationRule::FirstAccepted => Ok(accepted[0].1),
        AggregationRule::Majority => Ok(majority(accepted)),
        AggregationRule::Median => median(accepted),
    }
}

/// Most frequent payload; ties go to the lexicographically smallest value.
fn majority(accepted: &[(Pubkey, [u8; 32])]) -> [u8; 32] {
    let mut values: Vec<[u8; 32]> = accepted.iter().map(|(_, payload)| *payload).collect();
    values.sort_unstable();

    let mut best = values[0];
    let mut best_count = 0;
    let mut start = 0;
    while start < values.len() {
        let mut end = start;
        while end < values.len() && values[end] == values[start] {
            end += 1;
        }
        if end - start > best_count {
            best = values[start];
            best_count = end - start;
        }
        start = end;
    }
    best
}

fn median(accepted: &[(Pubkey, [u8; 32])]) -> Result<[u8; 32]> {
    let mut values = accepted
        .iter()
        .map(|(_, payload)| decode_i64(payload))
        .collect::<Result<Vec<i64>>>()?;
    values.sort_unstable();

    let mid = values.len() / 2;
    let value = if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] as i128 + values[mid] as i128).div_euclid(2) as i64
    };
    Ok(encode_i64(value))
}

/// Numeric payloads: little-endian i64 in the first 8 bytes, the rest zero.
pub fn decode_i64(payload: &[u8; 32]) -> Result<i64> {
    require!(
        payload[8..].iter().all(|b| *b == 0),
        OracleError::InvalidPayload
    );
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&payload[..8]);
    Ok(i64::from_le_bytes(raw))
}

pub fn encode_i64(value: i64) -> [u8; 32] {
    let mut payload = [0u8; 32];
    payload[..8].copy_from_slice(&value.to_le_bytes());
    payload
}

#[cfg(test)]
mod tests {
    use super::*;

    fn responses(payloads: &[[u8; 32]]) -> Vec<(Pubkey, [u8; 32])> {
        payloads.iter().map(|p| (Pubkey::new_unique(), *p)).collect()
    }

    #[test]
    fn randomness_is_order_independent() {
        let accepted = responses(&[[1; 32], [2; 32], [3; 32]]);
        let entropy = [5; 32];

        let mut reversed = accepted.clone();
        reversed.reverse();
        let mut rotated = accepted.clone();
        rotated.rotate_left(1);

        let expected = combine_randomness(&accepted, &entropy);
        assert_eq!(combine_randomness(&reversed, &entropy), expected);
        assert_eq!(combine_randomness(&rotated, &entropy), expected);
        assert_eq!(
            aggregate(AggregationRule::Randomness, &reversed, &entropy).unwrap(),
            expected
        );
    }

    #[test]
    fn randomness_depends_on_entropy_and_payloads() {
        let accepted = responses(&[[1; 32], [2; 32]]);
        let base = combine_randomness(&accepted, &[0; 32]);
        assert_ne!(combine_randomness(&accepted, &[1; 32]), base);

        let mut changed = accepted.clone();
        changed[1].1 = [3; 32];
        assert_ne!(combine_randomness(&changed, &[0; 32]), base);
    }

    #[test]
    fn entropy_is_bound_to_request() {
        let slot_hash = [9; 32];
        assert_ne!(
            derive_entropy(&slot_hash, &Pubkey::new_unique()),
            derive_entropy(&slot_hash, &Pubkey::new_unique())
        );
    }

    #[test]
    fn first_accepted_keeps_acceptance_order() {
        let accepted = responses(&[[4; 32], [1; 32]]);
        assert_eq!(
            aggregate(AggregationRule::FirstAccepted, &accepted, &[0; 32]).unwrap(),
            [4; 32]
        );
    }

    #[test]
    fn majority_with_tie_break() {
        let accepted = responses(&[[2; 32], [1; 32], [2; 32]]);
        assert_eq!(
            aggregate(AggregationRule::Majority, &accepted, &[0; 32]).unwrap(),
            [2; 32]
        );

        let tied = responses(&[[7; 32], [3; 32]]);
        assert_eq!(
            aggregate(AggregationRule::Majority, &tied, &[0; 32]).unwrap(),
            [3; 32]
        );
    }

    #[test]
    fn median_odd_even_and_negative() {
        let odd = responses(&[encode_i64(30), encode_i64(-5), encode_i64(10)]);
        assert_eq!(
            aggregate(AggregationRule::Median, &odd, &[0; 32]).unwrap(),
            encode_i64(10)
        );

        let even = responses(&[encode_i64(4), encode_i64(1), encode_i64(8), encode_i64(3)]);
        assert_eq!(
            aggregate(AggregationRule::Median, &even, &[0; 32]).unwrap(),
            encode_i64(3)
        );

        let negative = responses(&[encode_i64(-3), encode_i64(-4)]);
        assert_eq!(
            aggregate(AggregationRule::Median, &negative, &[0; 32]).unwrap(),
            encode_i64(-4)
        );

        let extreme = responses(&[encode_i64(i64::MAX), encode_i64(i64::MAX - 2)]);
        assert_eq!(
            aggregate(AggregationRule::Median, &extreme, &[0; 32]).unwrap(),
            encode_i64(i64::MAX - 1)
        );
    }

    #[test]
    fn median_rejects_non_numeric_payload() {
        let mut payload = encode_i64(1);
        payload[31] = 1;
        assert_eq!(
            validate_payload(AggregationRule::Median, &payload).unwrap_err(),
            error!(OracleError::InvalidPayload)
        );
        validate_payload(AggregationRule::Majority, &payload).unwrap();
    }

    #[test]
    fn empty_set_cannot_aggregate() {
        assert_eq!(
            aggregate(AggregationRule::FirstAccepted, &[], &[0; 32]).unwrap_err(),
            error!(OracleError::InvalidPayload)
        );
    }
}
