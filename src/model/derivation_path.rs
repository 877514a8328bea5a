use bip32::ChildNumber;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Account path used when a ledger key is added without one
const DEFAULT_PATH: &str = "m/44'/118'/0'/0/0";

/// BIP-32 path of a ledger-held key, stored in its `m/...` text form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DerivationPath(bip32::DerivationPath);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid derivation path {path}: {source}")]
pub struct DerivationPathError {
    path: String,
    source: bip32::Error,
}

impl DerivationPath {
    /// Raw child indices, hardened ones with the top bit set
    pub fn indices(&self) -> Vec<u32> {
        self.0.iter().map(u32::from).collect()
    }

    /// Coin type of a BIP-44 path, `None` for paths of another shape
    pub fn coin_type(&self) -> Option<u32> {
        let children: Vec<ChildNumber> = self.0.iter().collect();
        match children.as_slice() {
            [purpose, coin, ..] if purpose.is_hardened() && purpose.index() == 44 => {
                coin.is_hardened().then(|| coin.index())
            }
            _ => None,
        }
    }
}

impl FromStr for DerivationPath {
    type Err = DerivationPathError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        path.parse::<bip32::DerivationPath>()
            .map(DerivationPath)
            .map_err(|source| DerivationPathError {
                path: path.to_string(),
                source,
            })
    }
}

impl TryFrom<String> for DerivationPath {
    type Error = DerivationPathError;

    fn try_from(path: String) -> Result<Self, Self::Error> {
        path.parse()
    }
}

impl From<DerivationPath> for String {
    fn from(path: DerivationPath) -> Self {
        path.to_string()
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Default for DerivationPath {
    fn default() -> Self {
        DEFAULT_PATH
            .parse()
            .expect("default derivation path is well formed")
    }
}
