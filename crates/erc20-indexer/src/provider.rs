use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::address::Address;
use crate::error::ProviderError;
use crate::types::balance::{RawTokenBalance, TokenBalances};
use crate::types::metadata::TokenMetadataResponse;

/// The external indexing provider the pipeline queries.
#[async_trait]
pub trait IndexingProvider: Send + Sync {
    /// All ERC-20 balances held by `owner`, in provider order.
    async fn token_balances(&self, owner: Address) -> Result<TokenBalances, ProviderError>;

    /// Symbol, decimals and logo of one token contract.
    async fn token_metadata(
        &self,
        contract_address: Address,
    ) -> Result<TokenMetadataResponse, ProviderError>;

    /// Resolve an ENS name. `Ok(None)` means the name has no address.
    async fn resolve_name(&self, name: &str) -> Result<Option<Address>, ProviderError>;
}

/// In-memory provider for testing.
///
/// Unknown owners hold no tokens, unknown names resolve to nothing and
/// unknown contracts fail the metadata lookup.
#[derive(Default)]
pub struct StaticProvider {
    balances: HashMap<Address, Vec<RawTokenBalance>>,
    metadata: HashMap<Address, TokenMetadataResponse>,
    names: HashMap<String, Address>,
    balance_delays: HashMap<Address, Duration>,
    metadata_delays: HashMap<Address, Duration>,
    balance_failures: HashMap<Address, ProviderError>,
    metadata_failures: HashMap<Address, ProviderError>,
    name_failure: Option<ProviderError>,
    name_lookups: AtomicUsize,
    metadata_lookups: AtomicUsize,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a balance entry for `owner`. `raw` is sent verbatim.
    pub fn insert_balance(&mut self, owner: Address, contract_address: Address, raw: &str) {
        self.balances.entry(owner).or_default().push(RawTokenBalance {
            contract_address,
            token_balance: Some(raw.to_string()),
            error: None,
        });
    }

    /// Append an entry the provider could not read.
    pub fn insert_failed_balance(&mut self, owner: Address, contract_address: Address, error: &str) {
        self.balances.entry(owner).or_default().push(RawTokenBalance {
            contract_address,
            token_balance: None,
            error: Some(error.to_string()),
        });
    }

    pub fn insert_metadata(&mut self, contract_address: Address, symbol: &str, decimals: u8) {
        self.metadata.insert(
            contract_address,
            TokenMetadataResponse {
                name: None,
                symbol: Some(symbol.to_string()),
                decimals: Some(decimals),
                logo: None,
            },
        );
    }

    pub fn insert_metadata_response(
        &mut self,
        contract_address: Address,
        response: TokenMetadataResponse,
    ) {
        self.metadata.insert(contract_address, response);
    }

    pub fn insert_name(&mut self, name: &str, address: Address) {
        self.names.insert(name.to_lowercase(), address);
    }

    pub fn delay_balances(&mut self, owner: Address, delay: Duration) {
        self.balance_delays.insert(owner, delay);
    }

    pub fn delay_metadata(&mut self, contract_address: Address, delay: Duration) {
        self.metadata_delays.insert(contract_address, delay);
    }

    pub fn fail_balances(&mut self, owner: Address, error: ProviderError) {
        self.balance_failures.insert(owner, error);
    }

    pub fn fail_metadata(&mut self, contract_address: Address, error: ProviderError) {
        self.metadata_failures.insert(contract_address, error);
    }

    pub fn fail_names(&mut self, error: ProviderError) {
        self.name_failure = Some(error);
    }

    /// Number of `resolve_name` calls served so far.
    pub fn name_lookups(&self) -> usize {
        self.name_lookups.load(Ordering::SeqCst)
    }

    /// Number of `token_metadata` calls served so far.
    pub fn metadata_lookups(&self) -> usize {
        self.metadata_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IndexingProvider for StaticProvider {
    async fn token_balances(&self, owner: Address) -> Result<TokenBalances, ProviderError> {
        if let Some(delay) = self.balance_delays.get(&owner) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(err) = self.balance_failures.get(&owner) {
            return Err(err.clone());
        }
        Ok(TokenBalances {
            address: owner,
            token_balances: self.balances.get(&owner).cloned().unwrap_or_default(),
            page_key: None,
        })
    }

    async fn token_metadata(
        &self,
        contract_address: Address,
    ) -> Result<TokenMetadataResponse, ProviderError> {
        self.metadata_lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.metadata_delays.get(&contract_address) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(err) = self.metadata_failures.get(&contract_address) {
            return Err(err.clone());
        }
        self.metadata
            .get(&contract_address)
            .cloned()
            .ok_or_else(|| ProviderError::Rpc {
                code: -32602,
                message: format!("{contract_address} is not a token contract"),
            })
    }

    async fn resolve_name(&self, name: &str) -> Result<Option<Address>, ProviderError> {
        self.name_lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.name_failure {
            return Err(err.clone());
        }
        Ok(self.names.get(&name.to_lowercase()).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_provider_unknown_owner_is_empty() {
        let provider = StaticProvider::new();
        let balances = provider.token_balances(Address::ZERO).await.unwrap();
        assert!(balances.token_balances.is_empty());
    }

    #[tokio::test]
    async fn test_static_provider_unknown_contract_fails() {
        let provider = StaticProvider::new();
        assert!(provider.token_metadata(Address::ZERO).await.is_err());
        assert_eq!(provider.metadata_lookups(), 1);
    }

    #[tokio::test]
    async fn test_static_provider_names_case_insensitive() {
        let mut provider = StaticProvider::new();
        let addr = Address::new([7u8; 20]);
        provider.insert_name("Vitalik.eth", addr);
        assert_eq!(provider.resolve_name("vitalik.eth").await.unwrap(), Some(addr));
        assert_eq!(provider.resolve_name("nobody.eth").await.unwrap(), None);
        assert_eq!(provider.name_lookups(), 2);
    }
}
