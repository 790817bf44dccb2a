//! Asset identity: which operations "belong" to a token.
//!
//! A token id comes in three shapes (`"native"`, `"CODE:ISSUER"`, `C...`)
//! and the same asset may show up either as a classic payment or as a call
//! on its Stellar Asset Contract. Matching checks both sides.

use std::fmt;

use strand_crypto::is_valid_contract;
use strand_types::{NetworkDetails, OperationKind, RawOperation};
use tracing::debug;

use crate::codec::AddressCodec;
use crate::invocation::token_invocation;

pub const NATIVE: &str = "native";

/// Network and codec needed to compare an operation against a target.
#[derive(Clone, Copy)]
pub struct MatchContext<'a> {
    pub network: &'a NetworkDetails,
    pub codec: &'a dyn AddressCodec,
}

impl<'a> MatchContext<'a> {
    pub fn new(network: &'a NetworkDetails, codec: &'a dyn AddressCodec) -> Self {
        Self { network, codec }
    }
}

impl fmt::Debug for MatchContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchContext")
            .field("network", &self.network.network)
            .finish_non_exhaustive()
    }
}

/// The asset a history view is narrowed to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AssetTarget {
    Native,
    Classic { code: String, issuer: String },
    Contract { address: String },
}

impl AssetTarget {
    /// Interpret a token identifier. Never fails: anything that is not
    /// `native` or a valid contract address is taken as `CODE[:ISSUER]`.
    pub fn resolve(identifier: &str) -> Self {
        if identifier == NATIVE {
            return Self::Native;
        }
        if is_valid_contract(identifier) {
            return Self::Contract {
                address: identifier.to_string(),
            };
        }
        let (code, issuer) = identifier.split_once(':').unwrap_or((identifier, ""));
        Self::Classic {
            code: code.to_string(),
            issuer: issuer.to_string(),
        }
    }

    /// Inverse of [`AssetTarget::resolve`].
    pub fn canonical_id(&self) -> String {
        match self {
            Self::Native => NATIVE.to_string(),
            Self::Classic { code, issuer } if issuer.is_empty() => code.clone(),
            Self::Classic { code, issuer } => format!("{code}:{issuer}"),
            Self::Contract { address } => address.clone(),
        }
    }

    /// Contract-side identity of the asset on the context's network.
    pub fn contract_address(&self, ctx: &MatchContext<'_>) -> Option<String> {
        match self {
            Self::Native => match &ctx.network.native_contract {
                Some(address) => Some(address.clone()),
                None => ctx
                    .codec
                    .native_asset_contract(&ctx.network.passphrase)
                    .map_err(|e| debug!(error = %e, "native asset contract unavailable"))
                    .ok(),
            },
            Self::Classic { code, issuer } => ctx
                .codec
                .classic_asset_contract(code, issuer, &ctx.network.passphrase)
                .map_err(|e| debug!(error = %e, "asset contract derivation failed"))
                .ok(),
            Self::Contract { address } => Some(address.clone()),
        }
    }

    /// Whether `op` moves this asset, classically or through its contract.
    pub fn matches(&self, op: &RawOperation, ctx: &MatchContext<'_>) -> bool {
        if self.matches_classic(op) {
            return true;
        }
        let Some(invocation) = token_invocation(op, ctx.codec) else {
            return false;
        };
        match self.contract_address(ctx) {
            Some(address) => invocation.contract_id == address,
            None => false,
        }
    }

    fn matches_classic(&self, op: &RawOperation) -> bool {
        if !is_payment_kind(op.effective_kind()) {
            return false;
        }
        let sides = [op.asset(), op.source_asset()];
        match self {
            Self::Native => sides.iter().flatten().any(|a| a.is_native()),
            Self::Classic { code, issuer } => {
                sides.iter().flatten().any(|a| a.is_classic(code, issuer))
            }
            Self::Contract { .. } => false,
        }
    }
}

impl fmt::Display for AssetTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_id())
    }
}

pub(crate) fn is_payment_kind(kind: OperationKind) -> bool {
    matches!(
        kind,
        OperationKind::Payment
            | OperationKind::PathPaymentStrictSend
            | OperationKind::PathPaymentStrictReceive
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::StrKeyCodec;
    use serde_json::json;
    use strand_types::xdr::encode_sc_val_base64;
    use strand_types::{Network, ScAddress, ScVal};

    const CIRCLE: &str = "GA5ZSEJYB37JRC5AVCIA5MOP4RHTM335X2KGX3IHOJAPP5RE34K4KZVN";
    const USDC_SAC: &str = "CCW67TSZV3SSS2HXMBQ5JFGCKJNXKZM7UQUWUZPUTHXSTZLEO7SJMI75";
    const NATIVE_SAC: &str = "CAS3J7GYLGXMF6TDJBBYYSE3HQ6BBSMLNUQ34T6TZMYMW2EVH34XOWMA";

    fn op(value: serde_json::Value) -> RawOperation {
        let mut base = json!({ "id": "1", "created_at": "2024-05-01T00:00:00Z" });
        if let (Some(base), Some(extra)) = (base.as_object_mut(), value.as_object()) {
            base.extend(extra.clone());
        }
        serde_json::from_value(base).unwrap()
    }

    fn contract_call(contract: &str, fn_name: &str) -> RawOperation {
        op(json!({
            "type": "invoke_host_function",
            "transaction_attr": { "operation_count": 1, "contractId": contract, "fnName": fn_name }
        }))
    }

    #[test]
    fn resolve_shapes() {
        assert_eq!(AssetTarget::resolve("native"), AssetTarget::Native);
        assert_eq!(
            AssetTarget::resolve(USDC_SAC),
            AssetTarget::Contract {
                address: USDC_SAC.into()
            }
        );
        assert_eq!(
            AssetTarget::resolve(&format!("USDC:{CIRCLE}")),
            AssetTarget::Classic {
                code: "USDC".into(),
                issuer: CIRCLE.into()
            }
        );
        // 56 characters starting with C but failing the checksum
        let mut broken = USDC_SAC.to_string();
        broken.replace_range(55.., "A");
        assert!(matches!(
            AssetTarget::resolve(&broken),
            AssetTarget::Classic { ref issuer, .. } if issuer.is_empty()
        ));
    }

    #[test]
    fn canonical_id_round_trips() {
        for id in ["native", USDC_SAC, "USDC:GISSUER", "LONELY"] {
            assert_eq!(AssetTarget::resolve(id).canonical_id(), id);
        }
    }

    #[test]
    fn native_matches_classic_payment_and_sac_call() {
        let network = Network::Public.details();
        let ctx = MatchContext::new(&network, &StrKeyCodec);
        let target = AssetTarget::Native;

        assert!(target.matches(&op(json!({ "type": "payment", "asset_type": "native" })), &ctx));
        assert!(target.matches(
            &op(json!({
                "type": "path_payment_strict_send",
                "asset_type": "credit_alphanum4", "asset_code": "USDC", "asset_issuer": CIRCLE,
                "source_asset_type": "native"
            })),
            &ctx
        ));
        assert!(target.matches(&contract_call(NATIVE_SAC, "transfer"), &ctx));
        assert!(!target.matches(&contract_call(NATIVE_SAC, "approve"), &ctx));
        assert!(!target.matches(&contract_call(USDC_SAC, "transfer"), &ctx));
        assert!(!target.matches(
            &op(json!({ "type": "create_account", "account": "GX", "starting_balance": "1.0" })),
            &ctx
        ));
    }

    #[test]
    fn classic_matches_through_derived_contract() {
        let network = Network::Public.details();
        let ctx = MatchContext::new(&network, &StrKeyCodec);
        let target = AssetTarget::resolve(&format!("USDC:{CIRCLE}"));

        assert!(target.matches(
            &op(json!({
                "type": "payment", "asset_type": "credit_alphanum4",
                "asset_code": "USDC", "asset_issuer": CIRCLE
            })),
            &ctx
        ));
        assert!(target.matches(&contract_call(USDC_SAC, "mint"), &ctx));
        assert!(!target.matches(&op(json!({ "type": "payment", "asset_type": "native" })), &ctx));
        assert_eq!(target.contract_address(&ctx).as_deref(), Some(USDC_SAC));
    }

    #[test]
    fn same_code_from_other_issuer_does_not_match() {
        let network = Network::Public.details();
        let ctx = MatchContext::new(&network, &StrKeyCodec);
        let other_issuer = StrKeyCodec.account_to_text(&[7; 32]);
        let target = AssetTarget::resolve(&format!("USDC:{other_issuer}"));

        let derived = target.contract_address(&ctx).unwrap();
        assert_ne!(derived, USDC_SAC);
        assert!(!target.matches(
            &op(json!({
                "type": "payment", "asset_type": "credit_alphanum4",
                "asset_code": "USDC", "asset_issuer": CIRCLE
            })),
            &ctx
        ));
        assert!(!target.matches(&contract_call(USDC_SAC, "transfer"), &ctx));
        assert!(target.matches(&contract_call(&derived, "transfer"), &ctx));
    }

    #[test]
    fn underivable_classic_asset_only_matches_classically() {
        let network = Network::Public.details();
        let ctx = MatchContext::new(&network, &StrKeyCodec);
        let target = AssetTarget::resolve("USDC:GBAD");
        assert_eq!(target.contract_address(&ctx), None);
        assert!(!target.matches(&contract_call(USDC_SAC, "transfer"), &ctx));
        assert!(target.matches(
            &op(json!({
                "type": "payment", "asset_type": "credit_alphanum4",
                "asset_code": "USDC", "asset_issuer": "GBAD"
            })),
            &ctx
        ));
    }

    #[test]
    fn contract_target_matches_decoded_parameters() {
        let network = Network::Testnet.details();
        let ctx = MatchContext::new(&network, &StrKeyCodec);
        let contract_text = StrKeyCodec.contract_to_text(&[9; 32]);
        let params: Vec<_> = [
            ScVal::Address(ScAddress::Contract([9; 32])),
            ScVal::Symbol("transfer".into()),
            ScVal::Address(ScAddress::Account([1; 32])),
            ScVal::Address(ScAddress::Account([2; 32])),
            ScVal::U32(4),
        ]
        .iter()
        .map(|v| json!({ "type": "", "value": encode_sc_val_base64(v) }))
        .collect();
        let call = op(json!({
            "type": "invoke_host_function",
            "function": "HostFunctionTypeHostFunctionTypeInvokeContract",
            "parameters": params,
        }));

        assert!(AssetTarget::resolve(&contract_text).matches(&call, &ctx));
        assert!(!AssetTarget::Native.matches(&call, &ctx));
    }

    #[test]
    fn futurenet_native_contract_is_derived() {
        let network = Network::Futurenet.details();
        let ctx = MatchContext::new(&network, &StrKeyCodec);
        let derived = AssetTarget::Native.contract_address(&ctx).unwrap();
        assert!(derived.starts_with('C'));
        assert!(AssetTarget::Native.matches(&contract_call(&derived, "transfer"), &ctx));
    }
}
