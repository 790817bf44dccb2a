//! Ledger query service boundary.

use async_trait::async_trait;
use strand_types::{BalanceMap, NetworkDetails, RawOperation};

use crate::error::HistoryError;

/// Source of raw operations and balance snapshots for one account.
///
/// Operations must come back newest first; the store groups them in the
/// order received. Retry policy, if any, belongs to the implementation.
#[async_trait]
pub trait LedgerQueryService: Send + Sync {
    async fn fetch_operations(
        &self,
        public_key: &str,
        network: &NetworkDetails,
    ) -> Result<Vec<RawOperation>, HistoryError>;

    async fn fetch_balances(
        &self,
        public_key: &str,
        network: &NetworkDetails,
    ) -> Result<BalanceMap, HistoryError>;
}
