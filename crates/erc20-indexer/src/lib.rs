pub mod address;
#[cfg(feature = "alchemy")]
pub mod alchemy;
pub mod balances;
pub mod config;
pub mod ens;
pub mod error;
pub mod format;
pub mod metadata;
pub mod orchestrator;
pub mod provider;
pub mod resolver;
pub mod state;
pub mod types;
pub mod wallet;

use tracing::info;

// Re-exports for convenience
pub use address::Address;
#[cfg(feature = "alchemy")]
pub use alchemy::AlchemyProvider;
pub use config::{Config, Network};
pub use error::Error;
pub use format::{format_amount, format_balance};
pub use orchestrator::QueryOrchestrator;
pub use provider::{IndexingProvider, StaticProvider};
pub use state::{ErrorKind, Notification, QueryResult, QueryState, TokenHolding};
pub use wallet::{WalletConnector, WalletSession};

/// Query the non-zero ERC-20 holdings of an address or ENS name.
///
/// This is the main entry point: resolve the input, fetch balances, then
/// enrich them with token metadata.
pub async fn query_balances(
    provider: &dyn IndexingProvider,
    input: &str,
) -> Result<QueryResult, Error> {
    let address = resolver::resolve(provider, input).await?;
    query_address(provider, address).await
}

/// Same as [`query_balances`] for an address that needs no resolution.
#[tracing::instrument(skip(provider), fields(address = %address))]
pub async fn query_address(
    provider: &dyn IndexingProvider,
    address: Address,
) -> Result<QueryResult, Error> {
    let balances = balances::fetch_balances(provider, address).await?;
    let metadata = metadata::enrich(provider, &balances).await?;
    info!(tokens = balances.len(), "balance query complete");
    QueryResult::new(address, balances, metadata)
}
