use crate::error::OracleError;
use crate::state::{Feed, PendingRequest};
use anchor_lang::prelude::*;

/// Deserializes an account owned by this program. A missing account, a foreign
/// owner or another account type are all reported as `unknown`.
pub fn load<T>(info: &AccountInfo, unknown: OracleError) -> Result<T>
where
    T: AccountDeserialize + Owner,
{
    if *info.owner != T::owner() || info.data_is_empty() {
        msg!(
            "{:?}: account {} is missing or not owned by this program.",
            unknown,
            info.key
        );
        return Err(error!(unknown));
    }

    let data = info.try_borrow_data()?;
    T::try_deserialize(&mut &data[..]).map_err(|_| {
        msg!("Account {} failed to decode.", info.key);
        error!(unknown)
    })
}

/// Writes a loaded account back. The account keeps the size it was created with.
pub fn store<T: AccountSerialize>(info: &AccountInfo, value: &T) -> Result<()> {
    let mut data = info.try_borrow_mut_data()?;
    value.try_serialize(&mut &mut data[..])
}

/// Loads a request together with the feed it belongs to.
pub fn load_request_with_feed(
    feed_info: &AccountInfo,
    request_info: &AccountInfo,
) -> Result<(Feed, PendingRequest)> {
    let request: PendingRequest = load(request_info, OracleError::UnknownRequest)?;
    let feed: Feed = load(feed_info, OracleError::UnknownFeed)?;
    require_keys_eq!(request.feed, *feed_info.key, OracleError::UnknownRequest);
    Ok((feed, request))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serialized<T: AccountSerialize>(value: &T, space: usize) -> Vec<u8> {
        let mut data = vec![0u8; space];
        value.try_serialize(&mut &mut data[..]).unwrap();
        data
    }

    #[test]
    fn loads_and_stores_program_accounts() {
        let key = Pubkey::new_unique();
        let owner = crate::ID;
        let mut lamports = 0;
        let mut data = serialized(&Feed::default(), Feed::SPACE);
        let info = AccountInfo::new(&key, false, true, &mut lamports, &mut data, &owner, false, 0);

        let mut feed: Feed = load(&info, OracleError::UnknownFeed).unwrap();
        feed.next_request_seq = 4;
        store(&info, &feed).unwrap();

        let reloaded: Feed = load(&info, OracleError::UnknownFeed).unwrap();
        assert_eq!(reloaded.next_request_seq, 4);
    }

    #[test]
    fn missing_or_foreign_accounts_are_unknown() {
        let key = Pubkey::new_unique();
        let program = crate::ID;
        let system = Pubkey::default();

        let mut lamports = 0;
        let mut empty: Vec<u8> = Vec::new();
        let closed = AccountInfo::new(&key, false, true, &mut lamports, &mut empty, &system, false, 0);
        assert_eq!(
            load::<Feed>(&closed, OracleError::UnknownFeed).unwrap_err(),
            error!(OracleError::UnknownFeed)
        );

        let mut lamports = 0;
        let mut data = serialized(&Feed::default(), Feed::SPACE);
        let foreign = AccountInfo::new(&key, false, true, &mut lamports, &mut data, &system, false, 0);
        assert_eq!(
            load::<Feed>(&foreign, OracleError::UnknownFeed).unwrap_err(),
            error!(OracleError::UnknownFeed)
        );

        // A request account passed where a feed is expected.
        let mut lamports = 0;
        let mut data = serialized(&PendingRequest::default(), PendingRequest::SPACE);
        let wrong_type = AccountInfo::new(&key, false, true, &mut lamports, &mut data, &program, false, 0);
        assert_eq!(
            load::<Feed>(&wrong_type, OracleError::UnknownFeed).unwrap_err(),
            error!(OracleError::UnknownFeed)
        );
    }

    #[test]
    fn request_must_belong_to_feed() {
        let program = crate::ID;
        let feed_key = Pubkey::new_unique();
        let other_feed = Pubkey::new_unique();
        let request_key = Pubkey::new_unique();

        let mut feed_lamports = 0;
        let mut feed_data = serialized(&Feed::default(), Feed::SPACE);
        let feed_info = AccountInfo::new(
            &feed_key, false, true, &mut feed_lamports, &mut feed_data, &program, false, 0,
        );

        let request = PendingRequest {
            feed: other_feed,
            ..Default::default()
        };
        let mut request_lamports = 0;
        let mut request_data = serialized(&request, PendingRequest::SPACE);
        let request_info = AccountInfo::new(
            &request_key, false, true, &mut request_lamports, &mut request_data, &program, false, 0,
        );

        assert_eq!(
            load_request_with_feed(&feed_info, &request_info).unwrap_err(),
            error!(OracleError::UnknownRequest)
        );
    }
}
