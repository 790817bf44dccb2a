//! Account balance snapshots.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::amount::Stroops;

/// Balances keyed by canonical token id (`"native"`, `"CODE:ISSUER"`, or a
/// liquidity pool id).
pub type BalanceMap = BTreeMap<String, Balance>;

/// One balance line as reported by Horizon's account endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub balance: String,
    pub asset_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_issuer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liquidity_pool_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buying_liabilities: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selling_liabilities: Option<String>,
}

impl Balance {
    /// Key under which this balance is stored in a [`BalanceMap`].
    pub fn canonical_id(&self) -> String {
        if self.asset_type == "native" {
            return "native".to_string();
        }
        if let Some(pool) = &self.liquidity_pool_id {
            return pool.clone();
        }
        match (&self.asset_code, &self.asset_issuer) {
            (Some(code), Some(issuer)) => format!("{code}:{issuer}"),
            (Some(code), None) => code.clone(),
            _ => self.asset_type.clone(),
        }
    }

    pub fn total(&self) -> Option<Stroops> {
        Stroops::parse(&self.balance)
    }

    /// Total minus selling liabilities, floored at zero.
    pub fn available(&self) -> Option<Stroops> {
        let total = self.total()?;
        let selling = match &self.selling_liabilities {
            Some(s) => Stroops::parse(s)?,
            None => Stroops::ZERO,
        };
        Some(Stroops::new((total.raw() - selling.raw()).max(0)))
    }
}

/// Index a list of balance lines by canonical id.
pub fn balance_map(balances: impl IntoIterator<Item = Balance>) -> BalanceMap {
    balances
        .into_iter()
        .map(|b| (b.canonical_id(), b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(asset_type: &str, code: Option<&str>, issuer: Option<&str>) -> Balance {
        Balance {
            balance: "10.0000000".into(),
            asset_type: asset_type.into(),
            asset_code: code.map(Into::into),
            asset_issuer: issuer.map(Into::into),
            liquidity_pool_id: None,
            limit: None,
            buying_liabilities: None,
            selling_liabilities: Some("2.5000000".into()),
        }
    }

    #[test]
    fn canonical_ids() {
        assert_eq!(line("native", None, None).canonical_id(), "native");
        assert_eq!(
            line("credit_alphanum4", Some("USDC"), Some("GISSUER")).canonical_id(),
            "USDC:GISSUER"
        );
    }

    #[test]
    fn available_subtracts_selling_liabilities() {
        let b = line("native", None, None);
        assert_eq!(b.available(), Some(Stroops::new(75_000_000)));
    }

    #[test]
    fn map_is_keyed_by_canonical_id() {
        let map = balance_map(vec![
            line("native", None, None),
            line("credit_alphanum4", Some("EURC"), Some("GX")),
        ]);
        assert!(map.contains_key("native"));
        assert!(map.contains_key("EURC:GX"));
    }
}
