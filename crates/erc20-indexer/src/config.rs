use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::orchestrator::DEFAULT_DISMISS_AFTER;

pub const API_KEY_VAR: &str = "ALCHEMY_API_KEY";
pub const CLIENT_ID_VAR: &str = "THIRDWEB_CLIENT_ID";
pub const NETWORK_VAR: &str = "ALCHEMY_NETWORK";
pub const TIMEOUT_VAR: &str = "NOTIFICATION_TIMEOUT_SECS";

/// Networks the indexing provider serves, named by their endpoint subdomain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Network {
    #[default]
    EthMainnet,
    EthSepolia,
    EthHolesky,
    ArbMainnet,
    OptMainnet,
    BaseMainnet,
    MaticMainnet,
}

impl Network {
    pub fn subdomain(self) -> &'static str {
        match self {
            Network::EthMainnet => "eth-mainnet",
            Network::EthSepolia => "eth-sepolia",
            Network::EthHolesky => "eth-holesky",
            Network::ArbMainnet => "arb-mainnet",
            Network::OptMainnet => "opt-mainnet",
            Network::BaseMainnet => "base-mainnet",
            Network::MaticMainnet => "polygon-mainnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.subdomain())
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "eth-mainnet" | "mainnet" => Ok(Network::EthMainnet),
            "eth-sepolia" | "sepolia" => Ok(Network::EthSepolia),
            "eth-holesky" | "holesky" => Ok(Network::EthHolesky),
            "arb-mainnet" => Ok(Network::ArbMainnet),
            "opt-mainnet" => Ok(Network::OptMainnet),
            "base-mainnet" => Ok(Network::BaseMainnet),
            "polygon-mainnet" | "matic-mainnet" => Ok(Network::MaticMainnet),
            other => Err(format!("unknown network {other:?}")),
        }
    }
}

/// Process configuration, supplied through the environment.
#[derive(Clone)]
pub struct Config {
    /// Indexing provider API key.
    pub api_key: String,
    /// Wallet connection provider client identifier.
    pub wallet_client_id: String,
    pub network: Network,
    /// How long error notifications stay up.
    pub notification_timeout: Duration,
}

impl Config {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Build from any variable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let network = match lookup(NETWORK_VAR) {
            Some(raw) => raw.parse().map_err(|reason| ConfigError::Invalid {
                name: NETWORK_VAR,
                reason,
            })?,
            None => Network::default(),
        };

        let notification_timeout = match lookup(TIMEOUT_VAR) {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                    ConfigError::Invalid {
                        name: TIMEOUT_VAR,
                        reason: e.to_string(),
                    }
                })?;
                Duration::from_secs(secs)
            }
            None => DEFAULT_DISMISS_AFTER,
        };

        Ok(Self {
            api_key: required(API_KEY_VAR)?,
            wallet_client_id: required(CLIENT_ID_VAR)?,
            network,
            notification_timeout,
        })
    }

    /// HTTP provider for the configured network.
    #[cfg(feature = "alchemy")]
    pub fn provider(&self) -> crate::alchemy::AlchemyProvider {
        crate::alchemy::AlchemyProvider::new(&self.api_key, self.network)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("wallet_client_id", &self.wallet_client_id)
            .field("network", &self.network)
            .field("notification_timeout", &self.notification_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let env = vars(&[(API_KEY_VAR, "secret-key"), (CLIENT_ID_VAR, "client")]);
        let config = Config::from_vars(|k| env.get(k).cloned()).unwrap();
        assert_eq!(config.network, Network::EthMainnet);
        assert_eq!(config.notification_timeout, Duration::from_secs(5));
        assert!(!format!("{config:?}").contains("secret-key"));
    }

    #[test]
    fn test_overrides() {
        let env = vars(&[
            (API_KEY_VAR, "key"),
            (CLIENT_ID_VAR, "client"),
            (NETWORK_VAR, "eth-sepolia"),
            (TIMEOUT_VAR, "8"),
        ]);
        let config = Config::from_vars(|k| env.get(k).cloned()).unwrap();
        assert_eq!(config.network, Network::EthSepolia);
        assert_eq!(config.notification_timeout, Duration::from_secs(8));
    }

    #[test]
    fn test_missing_key() {
        let env = vars(&[(CLIENT_ID_VAR, "client"), (API_KEY_VAR, "  ")]);
        let err = Config::from_vars(|k| env.get(k).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(API_KEY_VAR)));
    }

    #[test]
    fn test_bad_values() {
        let env = vars(&[
            (API_KEY_VAR, "key"),
            (CLIENT_ID_VAR, "client"),
            (NETWORK_VAR, "moon-mainnet"),
        ]);
        assert!(matches!(
            Config::from_vars(|k| env.get(k).cloned()),
            Err(ConfigError::Invalid { name: NETWORK_VAR, .. })
        ));

        let env = vars(&[
            (API_KEY_VAR, "key"),
            (CLIENT_ID_VAR, "client"),
            (TIMEOUT_VAR, "soon"),
        ]);
        assert!(matches!(
            Config::from_vars(|k| env.get(k).cloned()),
            Err(ConfigError::Invalid { name: TIMEOUT_VAR, .. })
        ));
    }
}
