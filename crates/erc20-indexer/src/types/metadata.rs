use serde::{Deserialize, Serialize};

use crate::address::Address;

/// Decimals assumed when the provider does not report any.
pub const DEFAULT_DECIMALS: u8 = 18;

/// Provider response for `alchemy_getTokenMetadata`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenMetadataResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u8>,

    /// Logo image URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

/// Token metadata joined to one surviving balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    #[serde(rename = "contractAddress")]
    pub contract_address: Address,

    pub symbol: String,

    pub decimals: u8,

    #[serde(rename = "logoUrl")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl TokenMetadata {
    pub fn from_response(contract_address: Address, response: TokenMetadataResponse) -> Self {
        Self {
            contract_address,
            symbol: response.symbol.unwrap_or_default(),
            decimals: response.decimals.unwrap_or(DEFAULT_DECIMALS),
            logo_url: response.logo.filter(|url| !url.trim().is_empty()),
            name: response.name,
        }
    }
}
