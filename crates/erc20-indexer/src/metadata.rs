use std::collections::HashMap;

use futures::future::try_join_all;
use tracing::debug;

use crate::address::Address;
use crate::error::Error;
use crate::provider::IndexingProvider;
use crate::types::balance::TokenBalance;
use crate::types::metadata::TokenMetadata;

/// Fetch metadata for every balance, returned position-for-position.
///
/// Each distinct contract is looked up once and all lookups run
/// concurrently. Any failure fails the whole batch.
#[tracing::instrument(skip_all, fields(balances = balances.len()))]
pub async fn enrich(
    provider: &dyn IndexingProvider,
    balances: &[TokenBalance],
) -> Result<Vec<TokenMetadata>, Error> {
    let mut distinct: Vec<Address> = Vec::new();
    let mut slot_of: HashMap<Address, usize> = HashMap::new();
    for balance in balances {
        slot_of.entry(balance.contract_address).or_insert_with(|| {
            distinct.push(balance.contract_address);
            distinct.len() - 1
        });
    }

    let lookups = distinct.iter().map(|&contract_address| async move {
        provider
            .token_metadata(contract_address)
            .await
            .map(|response| TokenMetadata::from_response(contract_address, response))
            .map_err(|err| Error::metadata(contract_address.to_string(), err))
    });
    let fetched = try_join_all(lookups).await?;
    debug!(lookups = fetched.len(), "metadata fetched");

    Ok(balances
        .iter()
        .map(|balance| fetched[slot_of[&balance.contract_address]].clone())
        .collect())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use num_bigint::BigUint;

    use super::*;
    use crate::error::ProviderError;
    use crate::provider::StaticProvider;
    use crate::state::ErrorKind;

    fn addr(byte: u8) -> Address {
        Address::new([byte; 20])
    }

    fn balance(contract: Address) -> TokenBalance {
        TokenBalance {
            contract_address: contract,
            raw_balance: "0x1".to_string(),
            amount: BigUint::from(1u32),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_order_preserved_regardless_of_completion() {
        let (a, b, c) = (addr(1), addr(2), addr(3));
        let mut provider = StaticProvider::new();
        provider.insert_metadata(a, "AAA", 18);
        provider.insert_metadata(b, "BBB", 6);
        provider.insert_metadata(c, "CCC", 8);
        // A finishes last, C first.
        provider.delay_metadata(a, Duration::from_millis(300));
        provider.delay_metadata(b, Duration::from_millis(200));
        provider.delay_metadata(c, Duration::from_millis(100));

        let start = tokio::time::Instant::now();
        let metadata = enrich(&provider, &[balance(a), balance(b), balance(c)])
            .await
            .unwrap();

        let symbols: Vec<&str> = metadata.iter().map(|m| m.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAA", "BBB", "CCC"]);
        assert_eq!(metadata[1].contract_address, b);
        // concurrent: bounded by the slowest call, not the sum
        assert!(start.elapsed() < Duration::from_millis(600));
    }

    #[tokio::test]
    async fn test_duplicate_contracts_looked_up_once() {
        let a = addr(1);
        let mut provider = StaticProvider::new();
        provider.insert_metadata(a, "AAA", 18);

        let metadata = enrich(&provider, &[balance(a), balance(a)]).await.unwrap();
        assert_eq!(metadata.len(), 2);
        assert_eq!(provider.metadata_lookups(), 1);
    }

    #[tokio::test]
    async fn test_any_failure_fails_all() {
        let (a, b) = (addr(1), addr(2));
        let mut provider = StaticProvider::new();
        provider.insert_metadata(a, "AAA", 18);
        provider.fail_metadata(b, ProviderError::Status(500));

        let err = enrich(&provider, &[balance(a), balance(b)]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MetadataFetchError);
        assert!(err.to_string().contains(&b.to_string()));
    }

    #[tokio::test]
    async fn test_missing_logo_is_fine() {
        let a = addr(1);
        let mut provider = StaticProvider::new();
        provider.insert_metadata(a, "AAA", 18);

        let metadata = enrich(&provider, &[balance(a)]).await.unwrap();
        assert_eq!(metadata[0].logo_url, None);
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_calls() {
        let provider = StaticProvider::new();
        let metadata = enrich(&provider, &[]).await.unwrap();
        assert!(metadata.is_empty());
        assert_eq!(provider.metadata_lookups(), 0);
    }
}
