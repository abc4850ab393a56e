use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::address::Address;

/// Provider response for `alchemy_getTokenBalances`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenBalances {
    pub address: Address,

    #[serde(rename = "tokenBalances")]
    #[serde(default)]
    pub token_balances: Vec<RawTokenBalance>,

    /// Present when the provider paginated the result.
    #[serde(rename = "pageKey")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_key: Option<String>,
}

/// One entry of [`TokenBalances`] as the provider sends it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTokenBalance {
    #[serde(rename = "contractAddress")]
    pub contract_address: Address,

    /// Hex-encoded unsigned integer; `None` when the provider could not read it.
    #[serde(rename = "tokenBalance")]
    pub token_balance: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A non-zero token balance that survived filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBalance {
    pub contract_address: Address,
    /// The provider's hex encoding, kept verbatim.
    pub raw_balance: String,
    pub amount: BigUint,
}

/// Parse a hex quantity of any width. `0x` on its own is zero.
pub fn parse_hex_quantity(raw: &str) -> Option<BigUint> {
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);
    if digits.is_empty() {
        return Some(BigUint::default());
    }
    BigUint::parse_bytes(digits.as_bytes(), 16)
}
