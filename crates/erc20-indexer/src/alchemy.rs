//! Alchemy JSON-RPC implementation of [`IndexingProvider`].

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::address::Address;
use crate::config::Network;
use crate::ens;
use crate::error::ProviderError;
use crate::provider::IndexingProvider;
use crate::types::balance::TokenBalances;
use crate::types::metadata::TokenMetadataResponse;

/// JSON-RPC error code Alchemy uses for exhausted compute units.
const RATE_LIMIT_CODE: i64 = 429;
/// EIP-1474 "limit exceeded".
const LIMIT_EXCEEDED_CODE: i64 = -32005;
/// `eth_call` revert with revert data.
const EXECUTION_REVERTED_CODE: i64 = 3;

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Decode a JSON-RPC response body into its result.
fn parse_response<T: DeserializeOwned>(body: &str) -> Result<T, ProviderError> {
    let response: RpcResponse<T> =
        serde_json::from_str(body).map_err(|e| ProviderError::Decode(e.to_string()))?;
    if let Some(error) = response.error {
        if error.code == RATE_LIMIT_CODE || error.code == LIMIT_EXCEEDED_CODE {
            return Err(ProviderError::RateLimited);
        }
        return Err(ProviderError::Rpc {
            code: error.code,
            message: error.message,
        });
    }
    response
        .result
        .ok_or_else(|| ProviderError::Decode("response has neither result nor error".to_string()))
}

/// HTTP client for one Alchemy network endpoint.
pub struct AlchemyProvider {
    client: reqwest::Client,
    endpoint: String,
    network: Network,
    next_id: AtomicU64,
}

impl AlchemyProvider {
    pub fn new(api_key: &str, network: Network) -> Self {
        Self::with_client(reqwest::Client::new(), api_key, network)
    }

    pub fn with_client(client: reqwest::Client, api_key: &str, network: Network) -> Self {
        let endpoint = format!("https://{}.g.alchemy.com/v2/{api_key}", network.subdomain());
        Self::with_endpoint(client, endpoint, network)
    }

    /// Talk to an arbitrary JSON-RPC endpoint, such as a proxy or a local mock.
    pub fn with_endpoint(client: reqwest::Client, endpoint: impl Into<String>, network: Network) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            network,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    fn request<'a>(&self, method: &'a str, params: Value) -> RpcRequest<'a> {
        RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, ProviderError> {
        let request = self.request(method, params);
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(e.without_url().to_string()))?;
        debug!(method, id = request.id, bytes = body.len(), "rpc response");
        parse_response(&body)
    }

    async fn eth_call(&self, to: Address, data: String) -> Result<String, ProviderError> {
        self.call(
            "eth_call",
            json!([{ "to": to.to_lower_hex(), "data": data }, "latest"]),
        )
        .await
    }
}

#[async_trait]
impl IndexingProvider for AlchemyProvider {
    #[tracing::instrument(skip(self), fields(owner = %owner))]
    async fn token_balances(&self, owner: Address) -> Result<TokenBalances, ProviderError> {
        self.call(
            "alchemy_getTokenBalances",
            json!([owner.to_lower_hex(), "erc20"]),
        )
        .await
    }

    #[tracing::instrument(skip(self), fields(contract = %contract_address))]
    async fn token_metadata(
        &self,
        contract_address: Address,
    ) -> Result<TokenMetadataResponse, ProviderError> {
        self.call(
            "alchemy_getTokenMetadata",
            json!([contract_address.to_lower_hex()]),
        )
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn resolve_name(&self, name: &str) -> Result<Option<Address>, ProviderError> {
        let node = ens::namehash(&ens::normalize(name));

        let resolver_word = self
            .eth_call(ens::ENS_REGISTRY, ens::resolver_calldata(&node))
            .await?;
        let Some(resolver) = ens::decode_address_word(&resolver_word)? else {
            debug!("name has no resolver");
            return Ok(None);
        };

        match self.eth_call(resolver, ens::addr_calldata(&node)).await {
            Ok(addr_word) => ens::decode_address_word(&addr_word),
            Err(err) if is_revert(&err) => {
                debug!(%resolver, error = %err, "resolver reverted on addr");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

/// Whether an `eth_call` failed because the target contract reverted.
fn is_revert(err: &ProviderError) -> bool {
    match err {
        ProviderError::Rpc { code, message } => {
            *code == EXECUTION_REVERTED_CODE || message.contains("execution reverted")
        }
        _ => false,
    }
}

impl fmt::Debug for AlchemyProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlchemyProvider")
            .field("network", &self.network)
            .finish_non_exhaustive()
    }
}
