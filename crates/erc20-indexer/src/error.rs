use thiserror::Error;

use crate::state::ErrorKind;

/// Unified error type for the balance query pipeline.
///
/// Every variant is terminal for the query that produced it.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid or unresolvable address: {0}")]
    InvalidOrUnresolvable(String),

    #[error("name resolution failed: {0}")]
    ResolutionService(#[source] ProviderError),

    #[error("token balance fetch failed: {0}")]
    Fetch(#[source] ProviderError),

    #[error("token metadata fetch failed for {contract_address}: {source}")]
    MetadataFetch {
        contract_address: String,
        #[source]
        source: ProviderError,
    },

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// The user-facing category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidOrUnresolvable(_) => ErrorKind::InvalidOrUnresolvable,
            Error::ResolutionService(_) => ErrorKind::ResolutionServiceError,
            Error::Fetch(_) => ErrorKind::FetchError,
            Error::MetadataFetch { .. } => ErrorKind::MetadataFetchError,
            Error::Unexpected(_) => ErrorKind::UnexpectedError,
        }
    }

    /// Wrap a provider fault raised while fetching balances.
    ///
    /// Quota exhaustion is not a user-correctable fetch failure and is
    /// reported as unexpected.
    pub(crate) fn fetch(err: ProviderError) -> Self {
        match err {
            ProviderError::RateLimited => Error::Unexpected(ProviderError::RateLimited.to_string()),
            other => Error::Fetch(other),
        }
    }

    pub(crate) fn metadata(contract_address: String, err: ProviderError) -> Self {
        match err {
            ProviderError::RateLimited => Error::Unexpected(ProviderError::RateLimited.to_string()),
            source => Error::MetadataFetch {
                contract_address,
                source,
            },
        }
    }

    pub(crate) fn resolution(err: ProviderError) -> Self {
        match err {
            ProviderError::RateLimited => Error::Unexpected(ProviderError::RateLimited.to_string()),
            other => Error::ResolutionService(other),
        }
    }
}

/// Errors raised by an indexing provider call.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("malformed provider response: {0}")]
    Decode(String),

    #[error("provider request quota exhausted")]
    RateLimited,
}

/// Errors raised while connecting or disconnecting a wallet.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("no wallet extension is installed")]
    NotInstalled,

    #[error("wallet did not connect")]
    NotConnected,

    #[error("wallet provider error: {0}")]
    Unexpected(String),
}

/// Errors while loading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_is_unexpected_in_every_stage() {
        assert_eq!(
            Error::fetch(ProviderError::RateLimited).kind(),
            ErrorKind::UnexpectedError
        );
        assert_eq!(
            Error::metadata("0xabc".to_string(), ProviderError::RateLimited).kind(),
            ErrorKind::UnexpectedError
        );
        assert_eq!(
            Error::resolution(ProviderError::RateLimited).kind(),
            ErrorKind::UnexpectedError
        );
    }

    #[test]
    fn test_stage_errors_keep_their_kind() {
        let err = Error::fetch(ProviderError::Status(502));
        assert_eq!(err.kind(), ErrorKind::FetchError);
        assert_eq!(
            err.to_string(),
            "token balance fetch failed: unexpected HTTP status 502"
        );

        let err = Error::resolution(ProviderError::Transport("timed out".into()));
        assert_eq!(err.kind(), ErrorKind::ResolutionServiceError);
    }
}
