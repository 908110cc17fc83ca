use crate::error::OracleError;
use anchor_lang::prelude::*;

/// Reads the newest `(slot, hash)` entry of the SlotHashes sysvar.
///
/// Layout: u64 entry count, then `(u64 slot, [u8; 32] hash)` entries, newest first.
/// The sysvar is too large for `Sysvar::get`, so the raw account data is parsed.
pub fn latest_slot_hash(slot_hashes: &AccountInfo) -> Result<(u64, [u8; 32])> {
    let data = slot_hashes.try_borrow_data()?;
    parse_latest_slot_hash(&data)
}

pub fn parse_latest_slot_hash(data: &[u8]) -> Result<(u64, [u8; 32])> {
    const ENTRY_START: usize = 8;
    const ENTRY_END: usize = ENTRY_START + 8 + 32;

    if data.len() < ENTRY_END {
        return err!(OracleError::InvalidEntropySource);
    }

    let mut raw = [0u8; 8];
    raw.copy_from_slice(&data[..ENTRY_START]);
    require!(
        u64::from_le_bytes(raw) > 0,
        OracleError::InvalidEntropySource
    );

    raw.copy_from_slice(&data[ENTRY_START..ENTRY_START + 8]);
    let slot = u64::from_le_bytes(raw);
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&data[ENTRY_START + 8..ENTRY_END]);

    Ok((slot, hash))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_newest_entry() {
        let mut data = Vec::new();
        data.extend_from_slice(&2u64.to_le_bytes());
        data.extend_from_slice(&41u64.to_le_bytes());
        data.extend_from_slice(&[0xab; 32]);
        data.extend_from_slice(&40u64.to_le_bytes());
        data.extend_from_slice(&[0xcd; 32]);

        assert_eq!(parse_latest_slot_hash(&data).unwrap(), (41, [0xab; 32]));
    }

    #[test]
    fn rejects_empty_or_short_data() {
        assert_eq!(
            parse_latest_slot_hash(&[0u8; 20]).unwrap_err(),
            error!(OracleError::InvalidEntropySource)
        );

        let empty = [0u8; 48];
        assert_eq!(
            parse_latest_slot_hash(&empty).unwrap_err(),
            error!(OracleError::InvalidEntropySource)
        );
    }
}
