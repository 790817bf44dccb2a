//! Per-operation classification flags.

use std::sync::Arc;

use strand_types::{OperationKind, RawOperation, Stroops};

use crate::asset::is_payment_kind;

/// Native payments to the viewer at or below this amount (0.1 XLM) are dust.
pub const DUST_THRESHOLD: Stroops = Stroops::new(1_000_000);

/// Claimable-balance creations in transactions with more operations than
/// this are treated as airdrop spam.
pub const SPAM_OPERATION_COUNT: u32 = 50;

/// A raw operation together with the flags the history view needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassifiedOperation {
    pub operation: Arc<RawOperation>,
    pub is_payment: bool,
    pub is_swap: bool,
    pub is_create_external_account: bool,
}

impl ClassifiedOperation {
    pub fn id(&self) -> &str {
        &self.operation.id
    }
}

/// Classify `op` as seen from `viewer`. Unknown kinds get all flags false.
pub fn classify(op: &Arc<RawOperation>, viewer: &str) -> ClassifiedOperation {
    let kind = op.effective_kind();
    let is_payment = is_payment_kind(kind);
    let is_swap = kind == OperationKind::PathPaymentStrictSend
        && op.to.as_deref() == Some(op.source_account.as_str());
    let is_create_external_account = kind == OperationKind::CreateAccount
        && op.account.as_deref() != Some(viewer);

    ClassifiedOperation {
        operation: Arc::clone(op),
        is_payment,
        is_swap,
        is_create_external_account,
    }
}

/// Reasons an operation may be left out of the history view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Exclusion {
    pub dust: bool,
    pub spam: bool,
}

impl Exclusion {
    /// Spam is always hidden; dust only when the viewer asks for it.
    pub fn should_hide(&self, hide_dust: bool) -> bool {
        (self.dust && hide_dust) || self.spam
    }
}

pub fn exclusion(op: &RawOperation, viewer: &str) -> Exclusion {
    let kind = op.effective_kind();

    let dust = is_payment_kind(kind)
        && op.asset().is_some_and(|a| a.is_native())
        && op.to.as_deref() == Some(viewer)
        && op.amount_stroops().is_some_and(|amount| amount <= DUST_THRESHOLD);

    let spam = kind == OperationKind::CreateClaimableBalance
        && op.sibling_count() > SPAM_OPERATION_COUNT;

    Exclusion { dust, spam }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const VIEWER: &str = "GVIEWER";

    fn op(value: serde_json::Value) -> Arc<RawOperation> {
        let mut base = json!({ "id": "1", "created_at": "2024-05-01T00:00:00Z" });
        if let (Some(base), Some(extra)) = (base.as_object_mut(), value.as_object()) {
            base.extend(extra.clone());
        }
        Arc::new(serde_json::from_value(base).unwrap())
    }

    #[test]
    fn payment_family_is_payment() {
        for kind in ["payment", "path_payment_strict_send", "path_payment_strict_receive"] {
            assert!(classify(&op(json!({ "type": kind })), VIEWER).is_payment, "{kind}");
        }
        assert!(!classify(&op(json!({ "type": "change_trust" })), VIEWER).is_payment);
    }

    #[test]
    fn swap_requires_strict_send_to_self() {
        let swap = op(json!({
            "type": "path_payment_strict_send", "source_account": "GA", "to": "GA"
        }));
        let sent = op(json!({
            "type": "path_payment_strict_send", "source_account": "GA", "to": "GB"
        }));
        let receive = op(json!({
            "type": "path_payment_strict_receive", "source_account": "GA", "to": "GA"
        }));
        assert!(classify(&swap, VIEWER).is_swap);
        assert!(!classify(&sent, VIEWER).is_swap);
        assert!(!classify(&receive, VIEWER).is_swap);
    }

    #[test]
    fn external_account_creation() {
        let other = op(json!({ "type": "create_account", "account": "GOTHER" }));
        let own = op(json!({ "type": "create_account", "account": VIEWER }));
        assert!(classify(&other, VIEWER).is_create_external_account);
        assert!(!classify(&own, VIEWER).is_create_external_account);
    }

    #[test]
    fn unknown_kind_has_no_flags() {
        let c = classify(&op(json!({ "type": "something_new" })), VIEWER);
        assert!(!c.is_payment && !c.is_swap && !c.is_create_external_account);
        assert_eq!(exclusion(&c.operation, VIEWER), Exclusion::default());
    }

    #[test]
    fn unknown_tag_uses_numeric_code() {
        let c = classify(&op(json!({ "type": "renamed", "type_i": 1 })), VIEWER);
        assert!(c.is_payment);
    }

    #[test]
    fn dust_rule() {
        let payment = |amount: &str, asset: &str, to: &str| {
            op(json!({ "type": "payment", "asset_type": asset, "amount": amount, "to": to }))
        };
        assert!(exclusion(&payment("0.1000000", "native", VIEWER), VIEWER).dust);
        assert!(exclusion(&payment("0.0000001", "native", VIEWER), VIEWER).dust);
        assert!(!exclusion(&payment("0.1000001", "native", VIEWER), VIEWER).dust);
        assert!(!exclusion(&payment("0.05", "native", "GOTHER"), VIEWER).dust);
        assert!(!exclusion(&payment("0.05", "credit_alphanum4", VIEWER), VIEWER).dust);
    }

    #[test]
    fn spam_rule_and_hiding() {
        let claimable = |count: u32| {
            op(json!({
                "type": "create_claimable_balance",
                "transaction_attr": { "operation_count": count }
            }))
        };
        assert!(!exclusion(&claimable(50), VIEWER).spam);
        let spam = exclusion(&claimable(51), VIEWER);
        assert!(spam.spam);
        assert!(spam.should_hide(false));

        let dust = Exclusion { dust: true, spam: false };
        assert!(dust.should_hide(true));
        assert!(!dust.should_hide(false));
    }
}
