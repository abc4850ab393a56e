use crate::address::Address;
use crate::error::Error;
use crate::format::format_amount;
use crate::types::balance::TokenBalance;
use crate::types::metadata::TokenMetadata;

/// Image shown for tokens whose metadata carries no logo.
pub const PLACEHOLDER_LOGO_URL: &str =
    "https://static-00.iconduck.com/assets.00/generic-cryptocurrency-icon-512x508-icecu3wp.png";

/// What the display layer shows. Exactly one is active at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum QueryState {
    #[default]
    Idle,
    Loading,
    Success(QueryResult),
    EmptyResult,
    Error(ErrorKind),
}

impl QueryState {
    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }

    pub fn result(&self) -> Option<&QueryResult> {
        match self {
            QueryState::Success(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<ErrorKind> {
        match self {
            QueryState::Error(kind) => Some(*kind),
            _ => None,
        }
    }
}

/// User-facing error category of a failed query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidOrUnresolvable,
    ResolutionServiceError,
    FetchError,
    MetadataFetchError,
    UnexpectedError,
}

/// Title and body of an auto-dismissing alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notification {
    pub title: &'static str,
    pub description: &'static str,
}

impl ErrorKind {
    pub fn notification(self) -> Notification {
        let (title, description) = match self {
            ErrorKind::InvalidOrUnresolvable => (
                "Invalid address!",
                "Please enter a valid Ethereum address or ENS name.",
            ),
            ErrorKind::ResolutionServiceError => {
                ("Name lookup failed!", "Please try again in a moment.")
            }
            ErrorKind::FetchError => ("Could not fetch token balances!", "Please try again!"),
            ErrorKind::MetadataFetchError => {
                ("Could not load token details!", "Please try again!")
            }
            ErrorKind::UnexpectedError => ("Unexpected Error Occurred!", "Please contact support."),
        };
        Notification { title, description }
    }

    /// Whether the operator should see this in the logs.
    pub fn is_fault(self) -> bool {
        matches!(self, ErrorKind::UnexpectedError)
    }
}

/// Balances of one address joined with their token metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    pub address: Address,
    pub holdings: Vec<TokenHolding>,
}

impl QueryResult {
    /// Join balances and metadata by position. Both lists must be the
    /// same length.
    pub fn new(
        address: Address,
        balances: Vec<TokenBalance>,
        metadata: Vec<TokenMetadata>,
    ) -> Result<Self, Error> {
        if balances.len() != metadata.len() {
            return Err(Error::Unexpected(format!(
                "{} balances but {} metadata entries",
                balances.len(),
                metadata.len()
            )));
        }
        let holdings = balances
            .into_iter()
            .zip(metadata)
            .map(|(balance, metadata)| TokenHolding { balance, metadata })
            .collect();
        Ok(Self { address, holdings })
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.holdings.len()
    }
}

/// One row of the result grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenHolding {
    pub balance: TokenBalance,
    pub metadata: TokenMetadata,
}

impl TokenHolding {
    pub fn symbol(&self) -> &str {
        &self.metadata.symbol
    }

    pub fn display_balance(&self) -> String {
        format_amount(&self.balance.amount, self.metadata.decimals)
    }

    pub fn logo_or_placeholder(&self) -> &str {
        self.metadata
            .logo_url
            .as_deref()
            .unwrap_or(PLACEHOLDER_LOGO_URL)
    }
}
