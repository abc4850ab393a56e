use tracing::debug;

use crate::address::Address;
use crate::ens;
use crate::error::Error;
use crate::provider::IndexingProvider;

/// Turn user input into a canonical address.
///
/// A well-formed address is returned without touching the provider. An
/// ENS-style name is looked up once. Anything else is rejected locally.
#[tracing::instrument(skip(provider))]
pub async fn resolve(provider: &dyn IndexingProvider, input: &str) -> Result<Address, Error> {
    let input = input.trim();
    if input.is_empty() {
        return Err(Error::InvalidOrUnresolvable("empty input".to_string()));
    }

    if let Ok(address) = Address::parse(input) {
        return Ok(address);
    }

    if !ens::is_name(input) {
        return Err(Error::InvalidOrUnresolvable(input.to_string()));
    }

    let name = ens::normalize(input);
    match provider.resolve_name(&name).await {
        Ok(Some(address)) if !address.is_zero() => {
            debug!(%name, %address, "resolved name");
            Ok(address)
        }
        Ok(_) => Err(Error::InvalidOrUnresolvable(name)),
        Err(err) => Err(Error::resolution(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::provider::StaticProvider;
    use crate::state::ErrorKind;

    const VITALIK: &str = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";

    #[tokio::test]
    async fn test_checksummed_address_skips_lookup() {
        let provider = StaticProvider::new();
        let resolved = resolve(&provider, VITALIK).await.unwrap();
        assert_eq!(resolved.to_string(), VITALIK);
        assert_eq!(provider.name_lookups(), 0);
    }

    #[tokio::test]
    async fn test_lowercase_address_is_canonicalised() {
        let provider = StaticProvider::new();
        let resolved = resolve(&provider, &format!("  {}  ", VITALIK.to_lowercase()))
            .await
            .unwrap();
        assert_eq!(resolved.to_string(), VITALIK);
        assert_eq!(provider.name_lookups(), 0);
    }

    #[tokio::test]
    async fn test_name_lookup() {
        let mut provider = StaticProvider::new();
        provider.insert_name("vitalik.eth", VITALIK.parse().unwrap());
        let resolved = resolve(&provider, "Vitalik.ETH").await.unwrap();
        assert_eq!(resolved.to_string(), VITALIK);
        assert_eq!(provider.name_lookups(), 1);
    }

    #[tokio::test]
    async fn test_unresolvable_name() {
        let provider = StaticProvider::new();
        let err = resolve(&provider, "nobody.eth").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOrUnresolvable);
    }

    #[tokio::test]
    async fn test_zero_address_counts_as_unresolved() {
        let mut provider = StaticProvider::new();
        provider.insert_name("burned.eth", Address::ZERO);
        let err = resolve(&provider, "burned.eth").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOrUnresolvable);
    }

    #[tokio::test]
    async fn test_malformed_input_rejected_locally() {
        let provider = StaticProvider::new();
        for input in ["", "   ", "0x12", "hello world", "vitalik"] {
            let err = resolve(&provider, input).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidOrUnresolvable, "{input:?}");
        }
        assert_eq!(provider.name_lookups(), 0);
    }

    #[tokio::test]
    async fn test_lookup_failure_is_service_error() {
        let mut provider = StaticProvider::new();
        provider.fail_names(ProviderError::Transport("connection reset".to_string()));
        let err = resolve(&provider, "vitalik.eth").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResolutionServiceError);
    }
}
