//! ENS name handling: syntax checks, namehash and the two registry calls
//! needed to turn a name into an address.

use tiny_keccak::{Hasher, Keccak};

use crate::address::Address;
use crate::error::ProviderError;

/// ENS registry, same address on mainnet and the public testnets.
pub const ENS_REGISTRY: Address = Address::new([
    0x00, 0x00, 0x00, 0x00, 0x00, 0x0c, 0x2e, 0x07, 0x4e, 0xc6, 0x9a, 0x0d, 0xfb, 0x29, 0x97,
    0xba, 0x6c, 0x7d, 0x2e, 0x1e,
]);

fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}

/// Compute a 4-byte function selector from a canonical signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Whether `input` looks like an ENS-style name: dot-separated, non-empty
/// labels, no whitespace.
pub fn is_name(input: &str) -> bool {
    !input.is_empty()
        && input.contains('.')
        && !input.chars().any(char::is_whitespace)
        && input.split('.').all(|label| !label.is_empty())
}

/// Lowercase normalisation. Full UTS-46 processing is left to the provider.
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// EIP-137 namehash.
pub fn namehash(name: &str) -> [u8; 32] {
    let mut node = [0u8; 32];
    if name.is_empty() {
        return node;
    }
    for label in name.rsplit('.') {
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(&node);
        buf[32..].copy_from_slice(&keccak256(label.as_bytes()));
        node = keccak256(&buf);
    }
    node
}

/// Calldata for `resolver(bytes32)` on the registry.
pub fn resolver_calldata(node: &[u8; 32]) -> String {
    encode_call("resolver(bytes32)", node)
}

/// Calldata for `addr(bytes32)` on a public resolver.
pub fn addr_calldata(node: &[u8; 32]) -> String {
    encode_call("addr(bytes32)", node)
}

fn encode_call(signature: &str, node: &[u8; 32]) -> String {
    let mut data = Vec::with_capacity(36);
    data.extend_from_slice(&selector(signature));
    data.extend_from_slice(node);
    format!("0x{}", hex::encode(data))
}

/// Decode an ABI-encoded `address` return word.
///
/// An empty result (call to an account without code) and the zero address
/// both mean "not set".
pub fn decode_address_word(result: &str) -> Result<Option<Address>, ProviderError> {
    let digits = result.strip_prefix("0x").unwrap_or(result);
    if digits.is_empty() {
        return Ok(None);
    }
    if digits.len() < 64 || !digits.is_ascii() {
        return Err(ProviderError::Decode(format!(
            "malformed eth_call result: {} bytes",
            digits.len()
        )));
    }
    let word = hex::decode(&digits[..64]).map_err(|e| ProviderError::Decode(e.to_string()))?;
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&word[12..32]);
    let address = Address::new(bytes);
    Ok((!address.is_zero()).then_some(address))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namehash_vectors() {
        assert_eq!(namehash(""), [0u8; 32]);
        assert_eq!(
            hex::encode(namehash("eth")),
            "93cdeb708b7545dc668eb9280176169d1c33cfd8ed6f04690a0bcc88a93fc4ae"
        );
        assert_eq!(
            hex::encode(namehash("foo.eth")),
            "de9b09fd7c5f901e23a3f19fecc54828e9c848539801e86591bd9801b019f84f"
        );
    }

    #[test]
    fn test_selectors() {
        assert_eq!(hex::encode(selector("resolver(bytes32)")), "0178b8bf");
        assert_eq!(hex::encode(selector("addr(bytes32)")), "3b3b57de");
    }

    #[test]
    fn test_registry_address() {
        assert_eq!(
            ENS_REGISTRY.to_checksum(),
            "0x00000000000C2E074eC69A0dFb2997BA6C7d2e1e"
        );
    }

    #[test]
    fn test_is_name() {
        assert!(is_name("vitalik.eth"));
        assert!(is_name("pay.vitalik.eth"));
        assert!(!is_name("vitalik"));
        assert!(!is_name("vitalik..eth"));
        assert!(!is_name(".eth"));
        assert!(!is_name("my name.eth"));
        assert!(!is_name(""));
    }

    #[test]
    fn test_calldata_layout() {
        let data = addr_calldata(&namehash("eth"));
        assert_eq!(data.len(), 2 + 72);
        assert!(data.starts_with("0x3b3b57de93cdeb70"));
    }

    #[test]
    fn test_decode_address_word() {
        let word = "0x000000000000000000000000d8da6bf26964af9d7eed9e03e53415d37aa96045";
        let addr = decode_address_word(word).unwrap().unwrap();
        assert_eq!(addr.to_checksum(), "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045");

        assert_eq!(decode_address_word("0x").unwrap(), None);
        assert_eq!(decode_address_word(&format!("0x{}", "0".repeat(64))).unwrap(), None);
        assert!(decode_address_word("0x1234").is_err());
    }
}
