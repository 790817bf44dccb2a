//! Nullable ledger service: scripted responses instead of HTTP.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use strand_history::{HistoryError, LedgerQueryService};
use strand_types::{BalanceMap, NetworkDetails, RawOperation};
use tokio::sync::{watch, Notify};

/// A ledger service that returns whatever the test scripted.
///
/// Responses persist until replaced. An optional gate holds
/// `fetch_operations` in flight until released, so tests can observe the
/// store mid-fetch.
pub struct NullLedgerService {
    operations: Mutex<Result<Vec<RawOperation>, HistoryError>>,
    balances: Mutex<Result<BalanceMap, HistoryError>>,
    operation_calls: AtomicUsize,
    balance_calls: AtomicUsize,
    gate: watch::Sender<bool>,
    entered: Notify,
}

impl NullLedgerService {
    pub fn new() -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            operations: Mutex::new(Ok(Vec::new())),
            balances: Mutex::new(Ok(BalanceMap::new())),
            operation_calls: AtomicUsize::new(0),
            balance_calls: AtomicUsize::new(0),
            gate,
            entered: Notify::new(),
        }
    }

    pub fn with_operations(operations: Vec<RawOperation>) -> Self {
        let service = Self::new();
        service.set_operations(operations);
        service
    }

    pub fn set_operations(&self, operations: Vec<RawOperation>) {
        *self.operations.lock().unwrap_or_else(PoisonError::into_inner) = Ok(operations);
    }

    pub fn set_balances(&self, balances: BalanceMap) {
        *self.balances.lock().unwrap_or_else(PoisonError::into_inner) = Ok(balances);
    }

    /// Make every following operations request fail with `message`.
    pub fn fail_operations(&self, message: &str) {
        *self.operations.lock().unwrap_or_else(PoisonError::into_inner) =
            Err(HistoryError::Other(message.to_string()));
    }

    /// Make every following balances request fail with `message`.
    pub fn fail_balances(&self, message: &str) {
        *self.balances.lock().unwrap_or_else(PoisonError::into_inner) =
            Err(HistoryError::Other(message.to_string()));
    }

    /// Hold operation requests in flight until [`release`](Self::release).
    pub fn hold(&self) {
        self.gate.send_replace(false);
    }

    pub fn release(&self) {
        self.gate.send_replace(true);
    }

    /// Resolves once an operations request has started (one permit per call).
    pub async fn wait_until_entered(&self) {
        self.entered.notified().await;
    }

    pub fn operation_calls(&self) -> usize {
        self.operation_calls.load(Ordering::SeqCst)
    }

    pub fn balance_calls(&self) -> usize {
        self.balance_calls.load(Ordering::SeqCst)
    }
}

impl Default for NullLedgerService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerQueryService for NullLedgerService {
    async fn fetch_operations(
        &self,
        _public_key: &str,
        _network: &NetworkDetails,
    ) -> Result<Vec<RawOperation>, HistoryError> {
        self.operation_calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();

        let mut gate = self.gate.subscribe();
        if gate.wait_for(|open| *open).await.is_err() {
            return Err(HistoryError::Other("ledger service dropped".into()));
        }

        self.operations.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    async fn fetch_balances(
        &self,
        _public_key: &str,
        _network: &NetworkDetails,
    ) -> Result<BalanceMap, HistoryError> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        self.balances.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// Build an operation record from the fields a test cares about.
///
/// `id`, `type` and `created_at` default to `"0"`, `"payment"` and
/// `2024-01-01T00:00:00Z` when absent.
pub fn operation(fields: serde_json::Value) -> RawOperation {
    let mut record = serde_json::json!({
        "id": "0",
        "type": "payment",
        "created_at": "2024-01-01T00:00:00Z",
    });
    if let (Some(record), Some(fields)) = (record.as_object_mut(), fields.as_object()) {
        record.extend(fields.clone());
    }
    serde_json::from_value(record).expect("operation fields must form a valid record")
}
