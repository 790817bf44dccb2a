//! Text and JSON rendering of history views.

use serde_json::{json, Value};
use strand_history::{
    token_invocation, AddressCodec, ClassifiedOperation, HistoryData, TokenInvocationResult,
};
use strand_types::{OperationKind, RawOperation, Stroops};

fn asset_label(op: &RawOperation) -> String {
    match op.asset() {
        Some(asset) if asset.is_native() => "XLM".to_string(),
        Some(asset) => asset.code.unwrap_or(asset.asset_type).to_string(),
        None => op.asset.clone().unwrap_or_default(),
    }
}

fn amount_label(amount: Option<&str>) -> String {
    amount
        .and_then(Stroops::parse)
        .map(|s| s.to_string())
        .unwrap_or_default()
}

/// One-line description of an operation from the viewer's side.
pub fn describe(op: &ClassifiedOperation, viewer: &str, codec: &dyn AddressCodec) -> String {
    let raw = &op.operation;
    if op.is_swap {
        let from = raw
            .source_asset()
            .map(|a| if a.is_native() { "XLM" } else { a.code.unwrap_or("?") })
            .unwrap_or("?");
        return format!(
            "swapped {} {from} for {} {}",
            amount_label(raw.source_amount.as_deref()),
            amount_label(raw.amount.as_deref()),
            asset_label(raw)
        );
    }
    if op.is_payment {
        let amount = amount_label(raw.amount.as_deref());
        let asset = asset_label(raw);
        return if raw.to.as_deref() == Some(viewer) {
            format!("received {amount} {asset} from {}", raw.from.as_deref().unwrap_or("?"))
        } else {
            format!("sent {amount} {asset} to {}", raw.to.as_deref().unwrap_or("?"))
        };
    }
    if op.is_create_external_account {
        return format!(
            "created account {} with {} XLM",
            raw.account.as_deref().unwrap_or("?"),
            amount_label(raw.starting_balance.as_deref())
        );
    }
    match raw.effective_kind() {
        OperationKind::CreateAccount => format!(
            "account funded by {} with {} XLM",
            raw.funder.as_deref().unwrap_or("?"),
            amount_label(raw.starting_balance.as_deref())
        ),
        OperationKind::InvokeHostFunction => match token_invocation(raw, codec) {
            Some(inv) => format!(
                "{} on {}: {}",
                inv.function.as_str(),
                inv.contract_id,
                describe_token_result(&inv.result)
            ),
            None => "contract call".to_string(),
        },
        other => serde_json::to_value(other)
            .ok()
            .and_then(|v| v.as_str().map(|s| s.replace('_', " ")))
            .unwrap_or_else(|| "operation".to_string()),
    }
}

pub fn describe_token_result(result: &TokenInvocationResult) -> String {
    let value = match (result.amount, result.token_id) {
        (Some(amount), _) => format!("amount {amount}"),
        (None, Some(id)) => format!("token #{id}"),
        (None, None) => "no amount".to_string(),
    };
    let from = if result.from.is_empty() { "-" } else { &result.from };
    let to = if result.to.is_empty() { "-" } else { &result.to };
    format!("{from} -> {to}, {value}")
}

pub fn history_text(data: &HistoryData, viewer: &str, codec: &dyn AddressCodec) -> String {
    let mut out = String::new();
    for (id, balance) in &data.balances {
        out.push_str(&format!("balance {id}: {}\n", balance.balance));
    }
    if data.sections.is_empty() {
        out.push_str("no operations\n");
    }
    for section in &data.sections {
        out.push_str(&format!("\n[{}]\n", section.month_year));
        for op in &section.operations {
            let failed = if op.operation.transaction_successful { "" } else { " (failed)" };
            out.push_str(&format!(
                "  {}  {}{failed}\n",
                op.operation.created_at.format("%Y-%m-%d %H:%M"),
                describe(op, viewer, codec)
            ));
        }
    }
    out
}

pub fn history_json(data: &HistoryData, viewer: &str, codec: &dyn AddressCodec) -> Value {
    let sections: Vec<Value> = data
        .sections
        .iter()
        .map(|section| {
            let operations: Vec<Value> = section
                .operations
                .iter()
                .map(|op| {
                    json!({
                        "id": op.operation.id,
                        "created_at": op.operation.created_at,
                        "type": op.operation.kind,
                        "is_payment": op.is_payment,
                        "is_swap": op.is_swap,
                        "is_create_external_account": op.is_create_external_account,
                        "description": describe(op, viewer, codec),
                    })
                })
                .collect();
            json!({ "month_year": section.month_year.to_string(), "operations": operations })
        })
        .collect();
    json!({ "balances": data.balances, "sections": sections })
}
