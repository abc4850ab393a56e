use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::address::Address;
use crate::error::WalletError;
use crate::state::Notification;

/// Opaque handle to a wallet the connection provider opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletHandle {
    pub id: String,
}

/// Account exposed by a connected wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub address: Option<String>,
}

/// The wallet connection provider (browser extension + connect modal).
#[async_trait]
pub trait WalletConnector: Send + Sync {
    /// Whether a wallet extension is present at all.
    fn is_available(&self) -> bool;

    /// Open the connect flow. `Ok(None)` means the user backed out.
    async fn connect(&self) -> Result<Option<WalletHandle>, WalletError>;

    async fn disconnect(&self, wallet: &WalletHandle);

    fn active_wallet(&self) -> Option<WalletHandle>;

    async fn account(&self, wallet: &WalletHandle) -> Result<Account, WalletError>;
}

impl WalletError {
    pub fn notification(&self) -> Notification {
        let (title, description) = match self {
            WalletError::NotInstalled => (
                "You do not have a wallet installed!",
                "Please install Metamask or Coinbase Wallet",
            ),
            WalletError::NotConnected => ("Wallet did not connect!", "Please try again!"),
            WalletError::Unexpected(_) => ("Unexpected Error Occurred!", "Please contact support."),
        };
        Notification { title, description }
    }
}

/// Connect/disconnect intents and the address they yield.
pub struct WalletSession<C> {
    connector: C,
    connected: Option<Address>,
}

impl<C: WalletConnector> WalletSession<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            connected: None,
        }
    }

    pub fn address(&self) -> Option<Address> {
        self.connected
    }

    /// Shortened address for the connect button, once connected.
    pub fn badge(&self) -> Option<String> {
        self.connected.as_ref().map(Address::shortened)
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Connect a wallet and read its account address.
    pub async fn connect(&mut self) -> Result<Address, WalletError> {
        if !self.connector.is_available() {
            return Err(WalletError::NotInstalled);
        }

        let wallet = match self.connector.connect().await {
            Ok(Some(wallet)) => wallet,
            Ok(None) => return Err(WalletError::NotConnected),
            Err(err) => {
                error!(error = %err, "wallet connect failed");
                return Err(WalletError::Unexpected(err.to_string()));
            }
        };

        let account = self.connector.account(&wallet).await.map_err(|err| {
            error!(error = %err, "reading wallet account failed");
            WalletError::Unexpected(err.to_string())
        })?;
        let raw = account
            .address
            .ok_or_else(|| WalletError::Unexpected("wallet reported no account address".into()))?;
        let address = Address::parse(&raw).map_err(|err| {
            error!(address = %raw, error = %err, "wallet reported a malformed address");
            WalletError::Unexpected(err.to_string())
        })?;

        info!(%address, "wallet connected");
        self.connected = Some(address);
        Ok(address)
    }

    /// Disconnect the active wallet. Fails when nothing is connected.
    pub async fn disconnect(&mut self) -> Result<(), WalletError> {
        let wallet = match (self.connected, self.connector.active_wallet()) {
            (Some(_), Some(wallet)) => wallet,
            _ => return Err(WalletError::NotConnected),
        };
        self.connector.disconnect(&wallet).await;
        self.connected = None;
        info!("wallet disconnected");
        Ok(())
    }
}

/// In-memory wallet connector for testing.
pub struct StaticWallet {
    installed: bool,
    approve: bool,
    address: Option<String>,
    active: Mutex<Option<WalletHandle>>,
}

impl StaticWallet {
    /// An installed wallet that approves the connection and reports `address`.
    pub fn with_account(address: &str) -> Self {
        Self {
            installed: true,
            approve: true,
            address: Some(address.to_string()),
            active: Mutex::new(None),
        }
    }

    pub fn not_installed() -> Self {
        Self {
            installed: false,
            approve: false,
            address: None,
            active: Mutex::new(None),
        }
    }

    /// An installed wallet whose user closes the connect modal.
    pub fn declining() -> Self {
        Self {
            installed: true,
            approve: false,
            address: None,
            active: Mutex::new(None),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<WalletHandle>> {
        self.active.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl WalletConnector for StaticWallet {
    fn is_available(&self) -> bool {
        self.installed
    }

    async fn connect(&self) -> Result<Option<WalletHandle>, WalletError> {
        if !self.approve {
            return Ok(None);
        }
        let wallet = WalletHandle {
            id: "static".to_string(),
        };
        *self.slot() = Some(wallet.clone());
        Ok(Some(wallet))
    }

    async fn disconnect(&self, wallet: &WalletHandle) {
        let mut slot = self.slot();
        if slot.as_ref() == Some(wallet) {
            *slot = None;
        }
    }

    fn active_wallet(&self) -> Option<WalletHandle> {
        self.slot().clone()
    }

    async fn account(&self, _wallet: &WalletHandle) -> Result<Account, WalletError> {
        Ok(Account {
            address: self.address.clone(),
        })
    }
}
