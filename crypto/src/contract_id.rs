//! Stellar Asset Contract (SAC) address derivation.
//!
//! Every classic asset has exactly one contract address on the Soroban side:
//!
//! ```text
//! contract_id = SHA-256(XDR(HashIdPreimage::ContractId {
//!     network_id: SHA-256(passphrase),
//!     preimage:   ContractIdPreimage::FromAsset(asset),
//! }))
//! ```
//!
//! The address is a pure function of (asset code, issuer, passphrase).

use crate::hash::{network_id, sha256_multi};
use crate::strkey::{decode_account, encode_contract, StrKeyError};

const ENVELOPE_TYPE_CONTRACT_ID: u32 = 8;
const CONTRACT_ID_PREIMAGE_FROM_ASSET: u32 = 1;
const ASSET_TYPE_NATIVE: u32 = 0;
const ASSET_TYPE_CREDIT_ALPHANUM4: u32 = 1;
const ASSET_TYPE_CREDIT_ALPHANUM12: u32 = 2;
const PUBLIC_KEY_TYPE_ED25519: u32 = 0;

/// A classic asset in the shape the contract id preimage needs.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ClassicAsset {
    Native,
    AlphaNum4 { code: [u8; 4], issuer: [u8; 32] },
    AlphaNum12 { code: [u8; 12], issuer: [u8; 32] },
}

impl ClassicAsset {
    /// Build from a textual code and a `G...` issuer.
    ///
    /// Codes of 1–4 characters are alphanum4, 5–12 are alphanum12; both are
    /// zero-padded on the right.
    pub fn new(code: &str, issuer: &str) -> Result<Self, StrKeyError> {
        if code.is_empty() || code.len() > 12 || !code.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(StrKeyError::InvalidAssetCode(code.to_string()));
        }
        let issuer = decode_account(issuer)?;
        if code.len() <= 4 {
            let mut padded = [0u8; 4];
            padded[..code.len()].copy_from_slice(code.as_bytes());
            Ok(Self::AlphaNum4 {
                code: padded,
                issuer,
            })
        } else {
            let mut padded = [0u8; 12];
            padded[..code.len()].copy_from_slice(code.as_bytes());
            Ok(Self::AlphaNum12 {
                code: padded,
                issuer,
            })
        }
    }

    /// Parse `"native"` or `"CODE:ISSUER"`.
    pub fn from_canonical(name: &str) -> Result<Self, StrKeyError> {
        if name == "native" {
            return Ok(Self::Native);
        }
        match name.split_once(':') {
            Some((code, issuer)) => Self::new(code, issuer),
            None => Err(StrKeyError::InvalidAssetCode(name.to_string())),
        }
    }

    fn to_xdr(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + 12 + 4 + 32);
        match self {
            Self::Native => out.extend_from_slice(&ASSET_TYPE_NATIVE.to_be_bytes()),
            Self::AlphaNum4 { code, issuer } => {
                out.extend_from_slice(&ASSET_TYPE_CREDIT_ALPHANUM4.to_be_bytes());
                out.extend_from_slice(code);
                out.extend_from_slice(&PUBLIC_KEY_TYPE_ED25519.to_be_bytes());
                out.extend_from_slice(issuer);
            }
            Self::AlphaNum12 { code, issuer } => {
                out.extend_from_slice(&ASSET_TYPE_CREDIT_ALPHANUM12.to_be_bytes());
                out.extend_from_slice(code);
                out.extend_from_slice(&PUBLIC_KEY_TYPE_ED25519.to_be_bytes());
                out.extend_from_slice(issuer);
            }
        }
        out
    }
}

/// Raw contract id of the asset's SAC on the given network.
pub fn asset_contract_id(asset: &ClassicAsset, passphrase: &str) -> [u8; 32] {
    let network = network_id(passphrase);
    sha256_multi(&[
        &ENVELOPE_TYPE_CONTRACT_ID.to_be_bytes(),
        &network,
        &CONTRACT_ID_PREIMAGE_FROM_ASSET.to_be_bytes(),
        &asset.to_xdr(),
    ])
}

/// `C...` address of the asset's SAC on the given network.
pub fn asset_contract_address(asset: &ClassicAsset, passphrase: &str) -> String {
    encode_contract(&asset_contract_id(asset, passphrase))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUBLIC: &str = "Public Global Stellar Network ; September 2015";
    const TESTNET: &str = "Test SDF Network ; September 2015";
    const CIRCLE: &str = "GA5ZSEJYB37JRC5AVCIA5MOP4RHTM335X2KGX3IHOJAPP5RE34K4KZVN";

    #[test]
    fn native_sac_matches_published_addresses() {
        assert_eq!(
            asset_contract_address(&ClassicAsset::Native, PUBLIC),
            "CAS3J7GYLGXMF6TDJBBYYSE3HQ6BBSMLNUQ34T6TZMYMW2EVH34XOWMA"
        );
        assert_eq!(
            asset_contract_address(&ClassicAsset::Native, TESTNET),
            "CDLZFC3SYJYDZT7K67VZ75HPJVIEUVNIXF47ZG2FB2RMQQVU2HHGCYSC"
        );
    }

    #[test]
    fn usdc_sac_on_public() {
        let usdc = ClassicAsset::new("USDC", CIRCLE).unwrap();
        assert_eq!(
            asset_contract_address(&usdc, PUBLIC),
            "CCW67TSZV3SSS2HXMBQ5JFGCKJNXKZM7UQUWUZPUTHXSTZLEO7SJMI75"
        );
    }

    #[test]
    fn alphanum12_is_padded() {
        let asset = ClassicAsset::new("LONGCODE", CIRCLE).unwrap();
        assert!(matches!(asset, ClassicAsset::AlphaNum12 { .. }));
        assert_eq!(
            asset_contract_address(&asset, TESTNET),
            "CCWO4NAMN4RTXZFG5KOFYWTJJE5J7N365GLMMPLZVZMGZM22KRVF5T7O"
        );
    }

    #[test]
    fn derivation_depends_on_network() {
        let usdc = ClassicAsset::new("USDC", CIRCLE).unwrap();
        assert_ne!(
            asset_contract_id(&usdc, PUBLIC),
            asset_contract_id(&usdc, TESTNET)
        );
    }

    #[test]
    fn rejects_bad_codes_and_issuers() {
        assert!(ClassicAsset::new("", CIRCLE).is_err());
        assert!(ClassicAsset::new("THIRTEENCHARS", CIRCLE).is_err());
        assert!(ClassicAsset::new("US-D", CIRCLE).is_err());
        assert!(ClassicAsset::new("USDC", "GNOTANISSUER").is_err());
        assert!(ClassicAsset::from_canonical("USDC").is_err());
        assert_eq!(
            ClassicAsset::from_canonical("native").unwrap(),
            ClassicAsset::Native
        );
    }
}
