use num_traits::Zero;
use tracing::{debug, warn};

use crate::address::Address;
use crate::error::{Error, ProviderError};
use crate::provider::IndexingProvider;
use crate::types::balance::{parse_hex_quantity, TokenBalance};

/// Fetch every non-zero ERC-20 balance of `owner`, in provider order.
///
/// One request, no retry. Entries the provider could not read are skipped.
#[tracing::instrument(skip(provider), fields(owner = %owner))]
pub async fn fetch_balances(
    provider: &dyn IndexingProvider,
    owner: Address,
) -> Result<Vec<TokenBalance>, Error> {
    let response = provider.token_balances(owner).await.map_err(Error::fetch)?;
    if response.page_key.is_some() {
        warn!("provider paginated the balance list, only the first page is used");
    }

    let mut balances = Vec::with_capacity(response.token_balances.len());
    for entry in response.token_balances {
        let Some(raw) = entry.token_balance else {
            debug!(
                contract = %entry.contract_address,
                error = ?entry.error,
                "skipping unreadable balance"
            );
            continue;
        };
        let amount = parse_hex_quantity(&raw).ok_or_else(|| {
            Error::fetch(ProviderError::Decode(format!(
                "invalid balance {raw:?} for {}",
                entry.contract_address
            )))
        })?;
        if amount.is_zero() {
            continue;
        }
        balances.push(TokenBalance {
            contract_address: entry.contract_address,
            raw_balance: raw,
            amount,
        });
    }

    debug!(count = balances.len(), "non-zero balances");
    Ok(balances)
}
