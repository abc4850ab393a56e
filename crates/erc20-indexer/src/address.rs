use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tiny_keccak::{Hasher, Keccak};

/// A 20-byte Ethereum account or contract address.
///
/// Displays as its EIP-55 checksummed form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 20]);

/// Why a string failed the address well-formedness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressParseError {
    MissingPrefix,
    InvalidLength(usize),
    InvalidHex,
    BadChecksum,
}

impl fmt::Display for AddressParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressParseError::MissingPrefix => write!(f, "address must start with 0x"),
            AddressParseError::InvalidLength(len) => {
                write!(f, "expected 40 hex digits, got {len}")
            }
            AddressParseError::InvalidHex => write!(f, "address contains non-hex characters"),
            AddressParseError::BadChecksum => write!(f, "mixed-case address fails EIP-55 checksum"),
        }
    }
}

impl std::error::Error for AddressParseError {}

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Parse a `0x`-prefixed hex address.
    ///
    /// All-lowercase and all-uppercase digits carry no checksum and are
    /// accepted as-is. Mixed case must match the EIP-55 checksum.
    pub fn parse(input: &str) -> Result<Self, AddressParseError> {
        let digits = input
            .strip_prefix("0x")
            .or_else(|| input.strip_prefix("0X"))
            .ok_or(AddressParseError::MissingPrefix)?;
        if digits.len() != 40 {
            return Err(AddressParseError::InvalidLength(digits.len()));
        }

        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes).map_err(|_| AddressParseError::InvalidHex)?;
        let address = Self(bytes);

        let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
        if has_lower && has_upper && address.to_checksum()[2..] != *digits {
            return Err(AddressParseError::BadChecksum);
        }

        Ok(address)
    }

    /// Whether `input` passes the well-formedness check.
    pub fn is_valid(input: &str) -> bool {
        Self::parse(input).is_ok()
    }

    /// EIP-55 mixed-case checksum encoding.
    pub fn to_checksum(&self) -> String {
        let hex_addr = hex::encode(self.0);
        let mut hasher = Keccak::v256();
        hasher.update(hex_addr.as_bytes());
        let mut hash = [0u8; 32];
        hasher.finalize(&mut hash);

        let mut result = String::with_capacity(42);
        result.push_str("0x");
        for (i, c) in hex_addr.chars().enumerate() {
            let hash_nibble = if i % 2 == 0 {
                (hash[i / 2] >> 4) & 0x0f
            } else {
                hash[i / 2] & 0x0f
            };
            if hash_nibble >= 8 {
                result.push(c.to_ascii_uppercase());
            } else {
                result.push(c);
            }
        }
        result
    }

    /// Lowercase `0x`-prefixed hex, the form provider requests use.
    pub fn to_lower_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Short badge form for a connected wallet: `0xd8dA...6045`.
    pub fn shortened(&self) -> String {
        let full = self.to_checksum();
        format!("{}...{}", &full[..6], &full[full.len() - 4..])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksum())
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USDT: &str = "0xdAC17F958D2ee523a2206206994597C13D831ec7";

    #[test]
    fn test_eip55_checksum() {
        for known in [
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
            "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
            USDT,
        ] {
            let addr = Address::parse(&known.to_lowercase()).unwrap();
            assert_eq!(addr.to_checksum(), known);
        }
    }

    #[test]
    fn test_checksummed_roundtrips_unchanged() {
        let addr: Address = USDT.parse().unwrap();
        assert_eq!(addr.to_string(), USDT);
    }

    #[test]
    fn test_single_case_accepted() {
        assert!(Address::is_valid(&USDT.to_lowercase()));
        assert!(Address::is_valid(&format!("0x{}", USDT[2..].to_uppercase())));
    }

    #[test]
    fn test_bad_checksum_rejected() {
        let broken = USDT.replacen("0xd", "0xD", 1);
        assert_eq!(Address::parse(&broken), Err(AddressParseError::BadChecksum));
    }

    #[test]
    fn test_malformed_rejected() {
        assert_eq!(
            Address::parse("dac17f958d2ee523a2206206994597c13d831ec7"),
            Err(AddressParseError::MissingPrefix)
        );
        assert_eq!(Address::parse("0x12"), Err(AddressParseError::InvalidLength(2)));
        assert_eq!(
            Address::parse("0xzac17f958d2ee523a2206206994597c13d831ec7"),
            Err(AddressParseError::InvalidHex)
        );
        assert!(!Address::is_valid(""));
    }

    #[test]
    fn test_shortened() {
        let addr: Address = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045".parse().unwrap();
        assert_eq!(addr.shortened(), "0xd8dA...6045");
    }

    #[test]
    fn test_serde_uses_checksum() {
        let addr: Address = serde_json::from_str(&format!("\"{}\"", USDT.to_lowercase())).unwrap();
        assert_eq!(serde_json::to_string(&addr).unwrap(), format!("\"{USDT}\""));
    }
}
