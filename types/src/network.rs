//! Network identifiers and per-network connection details.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifies which Stellar network a wallet is looking at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// The production network.
    Public,
    /// The public test network.
    Testnet,
    /// The preview network for upcoming protocol releases.
    Futurenet,
}

impl Network {
    /// Passphrase mixed into every transaction and contract id hash.
    pub fn passphrase(&self) -> &'static str {
        match self {
            Self::Public => "Public Global Stellar Network ; September 2015",
            Self::Testnet => "Test SDF Network ; September 2015",
            Self::Futurenet => "Test SDF Future Network ; October 2022",
        }
    }

    /// Default Horizon endpoint.
    pub fn horizon_url(&self) -> &'static str {
        match self {
            Self::Public => "https://horizon.stellar.org",
            Self::Testnet => "https://horizon-testnet.stellar.org",
            Self::Futurenet => "https://horizon-futurenet.stellar.org",
        }
    }

    /// Contract address of the native asset's Stellar Asset Contract.
    ///
    /// Only published for networks whose id is stable; futurenet resets
    /// periodically so callers must derive it from the passphrase instead.
    pub fn native_contract(&self) -> Option<&'static str> {
        match self {
            Self::Public => Some("CAS3J7GYLGXMF6TDJBBYYSE3HQ6BBSMLNUQ34T6TZMYMW2EVH34XOWMA"),
            Self::Testnet => Some("CDLZFC3SYJYDZT7K67VZ75HPJVIEUVNIXF47ZG2FB2RMQQVU2HHGCYSC"),
            Self::Futurenet => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Testnet => "testnet",
            Self::Futurenet => "futurenet",
        }
    }

    pub fn details(&self) -> NetworkDetails {
        NetworkDetails::from(*self)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "public" | "pubnet" | "mainnet" => Ok(Self::Public),
            "testnet" | "test" => Ok(Self::Testnet),
            "futurenet" | "future" => Ok(Self::Futurenet),
            other => Err(format!("unknown network: {other}")),
        }
    }
}

/// Everything the history engine needs to know about one network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDetails {
    pub network: Network,
    pub passphrase: String,
    pub horizon_url: String,
    /// Well-known native asset contract, when the network publishes one.
    pub native_contract: Option<String>,
}

impl NetworkDetails {
    /// Same network, different Horizon endpoint (self-hosted or proxied).
    pub fn with_horizon_url(mut self, url: impl Into<String>) -> Self {
        self.horizon_url = url.into();
        self
    }
}

impl From<Network> for NetworkDetails {
    fn from(network: Network) -> Self {
        Self {
            network,
            passphrase: network.passphrase().to_string(),
            horizon_url: network.horizon_url().to_string(),
            native_contract: network.native_contract().map(str::to_string),
        }
    }
}
