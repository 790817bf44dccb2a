//! Raw ledger operation records as served by the indexing API.
//!
//! The record is deliberately loose: every kind-specific field is optional
//! so that operation kinds this crate has never heard of still deserialize
//! and can be shown (unclassified) instead of breaking the whole page.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::amount::Stroops;

/// Operation kind tag (`type` in Horizon records).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    CreateAccount,
    Payment,
    PathPaymentStrictReceive,
    ManageSellOffer,
    CreatePassiveSellOffer,
    SetOptions,
    ChangeTrust,
    AllowTrust,
    AccountMerge,
    Inflation,
    ManageData,
    BumpSequence,
    ManageBuyOffer,
    PathPaymentStrictSend,
    CreateClaimableBalance,
    ClaimClaimableBalance,
    BeginSponsoringFutureReserves,
    EndSponsoringFutureReserves,
    RevokeSponsorship,
    Clawback,
    ClawbackClaimableBalance,
    SetTrustLineFlags,
    LiquidityPoolDeposit,
    LiquidityPoolWithdraw,
    InvokeHostFunction,
    ExtendFootprintTtl,
    RestoreFootprint,
    #[serde(other)]
    Other,
}

impl OperationKind {
    /// Map Horizon's numeric `type_i` code to a kind.
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => Self::CreateAccount,
            1 => Self::Payment,
            2 => Self::PathPaymentStrictReceive,
            3 => Self::ManageSellOffer,
            4 => Self::CreatePassiveSellOffer,
            5 => Self::SetOptions,
            6 => Self::ChangeTrust,
            7 => Self::AllowTrust,
            8 => Self::AccountMerge,
            9 => Self::Inflation,
            10 => Self::ManageData,
            11 => Self::BumpSequence,
            12 => Self::ManageBuyOffer,
            13 => Self::PathPaymentStrictSend,
            14 => Self::CreateClaimableBalance,
            15 => Self::ClaimClaimableBalance,
            16 => Self::BeginSponsoringFutureReserves,
            17 => Self::EndSponsoringFutureReserves,
            18 => Self::RevokeSponsorship,
            19 => Self::Clawback,
            20 => Self::ClawbackClaimableBalance,
            21 => Self::SetTrustLineFlags,
            22 => Self::LiquidityPoolDeposit,
            23 => Self::LiquidityPoolWithdraw,
            24 => Self::InvokeHostFunction,
            25 => Self::ExtendFootprintTtl,
            26 => Self::RestoreFootprint,
            _ => Self::Other,
        }
    }
}

/// Asset type strings used by Horizon.
pub const ASSET_TYPE_NATIVE: &str = "native";

/// One entry of an invoke-host-function record's `parameters` list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostFunctionParameter {
    /// Horizon's hint (`"Address"`, `"Sym"`, `"I128"`, ...). Informational only.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Base64 XDR of the value.
    pub value: String,
}

/// Token-call fields pre-decoded by an indexer, when it supplies them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreDecodedArgs {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    /// Indexers send this as a string or a bare JSON number.
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub amount: Option<String>,
    #[serde(default, rename = "tokenId", skip_serializing_if = "Option::is_none")]
    pub token_id: Option<u32>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct AmountVisitor;

    impl<'de> serde::de::Visitor<'de> for AmountVisitor {
        type Value = Option<String>;

        fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("an amount as a string or number")
        }

        fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_string<E: serde::de::Error>(self, v: String) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_i128<E: serde::de::Error>(self, v: i128) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_u128<E: serde::de::Error>(self, v: u128) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_none<E: serde::de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D2>(self, deserializer: D2) -> Result<Self::Value, D2::Error>
        where
            D2: serde::Deserializer<'de>,
        {
            deserializer.deserialize_any(self)
        }
    }

    deserializer.deserialize_any(AmountVisitor)
}

/// Transaction-level attributes attached to an operation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionAttr {
    #[serde(default)]
    pub hash: Option<String>,
    /// Number of operations in the parent transaction.
    #[serde(default)]
    pub operation_count: u32,
    #[serde(default = "default_true")]
    pub successful: bool,
    #[serde(default)]
    pub fee_charged: Option<String>,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub memo_type: Option<String>,
    #[serde(default, rename = "contractId", skip_serializing_if = "Option::is_none")]
    pub contract_id: Option<String>,
    #[serde(default, rename = "fnName", skip_serializing_if = "Option::is_none")]
    pub fn_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<PreDecodedArgs>,
}

fn default_true() -> bool {
    true
}

/// Classic asset as described by a payment-family record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AssetRef<'a> {
    pub asset_type: &'a str,
    pub code: Option<&'a str>,
    pub issuer: Option<&'a str>,
}

impl AssetRef<'_> {
    pub fn is_native(&self) -> bool {
        self.asset_type == ASSET_TYPE_NATIVE
    }

    pub fn is_classic(&self, code: &str, issuer: &str) -> bool {
        !self.is_native() && self.code == Some(code) && self.issuer == Some(issuer)
    }
}

/// An operation record exactly as returned by the ledger query service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawOperation {
    pub id: String,
    #[serde(default)]
    pub paging_token: String,
    #[serde(rename = "type")]
    pub kind: OperationKind,
    #[serde(default)]
    pub type_i: Option<u32>,
    #[serde(default)]
    pub source_account: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub transaction_hash: String,
    #[serde(default = "default_true")]
    pub transaction_successful: bool,

    // payment family
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_issuer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_asset_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_asset_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_asset_issuer: Option<String>,

    // create_account
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starting_balance: Option<String>,

    // create_claimable_balance ("native" or "CODE:ISSUER")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,

    // invoke_host_function
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<HostFunctionParameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wasm_hash: Option<String>,

    #[serde(default, alias = "transaction")]
    pub transaction_attr: TransactionAttr,
}

impl RawOperation {
    /// Kind, falling back to the numeric code when the tag is unknown.
    pub fn effective_kind(&self) -> OperationKind {
        match (self.kind, self.type_i) {
            (OperationKind::Other, Some(code)) => OperationKind::from_code(code),
            (kind, _) => kind,
        }
    }

    /// Destination asset of a payment-family record.
    pub fn asset(&self) -> Option<AssetRef<'_>> {
        self.asset_type.as_deref().map(|asset_type| AssetRef {
            asset_type,
            code: self.asset_code.as_deref(),
            issuer: self.asset_issuer.as_deref(),
        })
    }

    /// Source asset of a path payment.
    pub fn source_asset(&self) -> Option<AssetRef<'_>> {
        self.source_asset_type.as_deref().map(|asset_type| AssetRef {
            asset_type,
            code: self.source_asset_code.as_deref(),
            issuer: self.source_asset_issuer.as_deref(),
        })
    }

    pub fn amount_stroops(&self) -> Option<Stroops> {
        self.amount.as_deref().and_then(Stroops::parse)
    }

    /// Operation count of the parent transaction (0 when unknown).
    pub fn sibling_count(&self) -> u32 {
        self.transaction_attr.operation_count
    }
}
