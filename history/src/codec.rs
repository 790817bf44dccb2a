//! Address codec boundary.
//!
//! The history engine never formats addresses itself: binary account keys and
//! contract hashes are turned into text, and classic assets are mapped to
//! their contract addresses, through this trait.

use strand_crypto::{asset_contract_address, encode_account, encode_contract, ClassicAsset};
use strand_types::ScAddress;

use crate::error::CodecError;

pub trait AddressCodec: Send + Sync {
    /// `G...` text of an ed25519 account key.
    fn account_to_text(&self, key: &[u8; 32]) -> String;

    /// `C...` text of a contract id.
    fn contract_to_text(&self, id: &[u8; 32]) -> String;

    /// Contract address representing the classic asset `code:issuer` on the
    /// network identified by `passphrase`.
    fn classic_asset_contract(
        &self,
        code: &str,
        issuer: &str,
        passphrase: &str,
    ) -> Result<String, CodecError>;

    /// Contract address of the native asset, for networks without a
    /// published one.
    fn native_asset_contract(&self, passphrase: &str) -> Result<String, CodecError>;

    fn sc_address_to_text(&self, address: &ScAddress) -> String {
        match address {
            ScAddress::Account(key) => self.account_to_text(key),
            ScAddress::Contract(id) => self.contract_to_text(id),
        }
    }
}

/// Production codec backed by `strand-crypto`.
#[derive(Clone, Copy, Debug, Default)]
pub struct StrKeyCodec;

impl AddressCodec for StrKeyCodec {
    fn account_to_text(&self, key: &[u8; 32]) -> String {
        encode_account(key)
    }

    fn contract_to_text(&self, id: &[u8; 32]) -> String {
        encode_contract(id)
    }

    fn classic_asset_contract(
        &self,
        code: &str,
        issuer: &str,
        passphrase: &str,
    ) -> Result<String, CodecError> {
        let asset = ClassicAsset::new(code, issuer).map_err(|e| CodecError::DerivationFailure {
            asset: format!("{code}:{issuer}"),
            reason: e.to_string(),
        })?;
        Ok(asset_contract_address(&asset, passphrase))
    }

    fn native_asset_contract(&self, passphrase: &str) -> Result<String, CodecError> {
        Ok(asset_contract_address(&ClassicAsset::Native, passphrase))
    }
}
