//! Nullable address codec with switchable derivation failure.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use strand_history::{AddressCodec, CodecError, StrKeyCodec};

/// Encodes addresses like the real codec but can be told to fail every
/// asset-contract derivation.
#[derive(Default)]
pub struct NullAddressCodec {
    fail_derivation: AtomicBool,
    derivations: AtomicUsize,
}

impl NullAddressCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let codec = Self::new();
        codec.set_derivation_failure(true);
        codec
    }

    pub fn set_derivation_failure(&self, fail: bool) {
        self.fail_derivation.store(fail, Ordering::SeqCst);
    }

    /// Number of asset-contract derivations attempted.
    pub fn derivations(&self) -> usize {
        self.derivations.load(Ordering::SeqCst)
    }

    fn check(&self, asset: String) -> Result<(), CodecError> {
        self.derivations.fetch_add(1, Ordering::SeqCst);
        if self.fail_derivation.load(Ordering::SeqCst) {
            return Err(CodecError::DerivationFailure {
                asset,
                reason: "derivation disabled".into(),
            });
        }
        Ok(())
    }
}

impl AddressCodec for NullAddressCodec {
    fn account_to_text(&self, key: &[u8; 32]) -> String {
        StrKeyCodec.account_to_text(key)
    }

    fn contract_to_text(&self, id: &[u8; 32]) -> String {
        StrKeyCodec.contract_to_text(id)
    }

    fn classic_asset_contract(
        &self,
        code: &str,
        issuer: &str,
        passphrase: &str,
    ) -> Result<String, CodecError> {
        self.check(format!("{code}:{issuer}"))?;
        StrKeyCodec.classic_asset_contract(code, issuer, passphrase)
    }

    fn native_asset_contract(&self, passphrase: &str) -> Result<String, CodecError> {
        self.check("native".into())?;
        StrKeyCodec.native_asset_contract(passphrase)
    }
}
