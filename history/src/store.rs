//! Cached account history with fetch orchestration and background polling.
//!
//! The store owns one [`RawHistoryData`] snapshot. A fetch cycle requests
//! balances and operations concurrently and replaces the snapshot only when
//! both succeed; a failed cycle keeps the old snapshot and records the error.
//! Views are derived from the snapshot on demand and never mutate it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};
use std::time::Duration;

use strand_types::{BalanceMap, NetworkDetails, RawOperation};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::asset::{AssetTarget, MatchContext};
use crate::codec::AddressCodec;
use crate::error::HistoryError;
use crate::poller::{Poller, DEFAULT_POLL_INTERVAL};
use crate::sections::{build_sections, HistoryData};
use crate::service::LedgerQueryService;

/// Everything fetched for one account in one successful cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawHistoryData {
    pub public_key: String,
    pub network: NetworkDetails,
    pub balances: BalanceMap,
    pub operations: Vec<Arc<RawOperation>>,
}

#[derive(Clone, Debug)]
pub struct FetchParams {
    pub public_key: String,
    pub network: NetworkDetails,
    /// Background refreshes never raise `is_loading`.
    pub is_background_refresh: bool,
    /// The caller just submitted a transaction; cleared on the next success.
    pub has_recent_transaction: bool,
}

impl FetchParams {
    pub fn new(public_key: impl Into<String>, network: NetworkDetails) -> Self {
        Self {
            public_key: public_key.into(),
            network,
            is_background_refresh: false,
            has_recent_transaction: false,
        }
    }

    pub fn background(mut self) -> Self {
        self.is_background_refresh = true;
        self
    }

    pub fn with_recent_transaction(mut self) -> Self {
        self.has_recent_transaction = true;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterParams {
    pub public_key: String,
    /// `"native"`, `"CODE:ISSUER"` or a contract address.
    pub token_id: Option<String>,
    pub hide_dust: bool,
}

impl FilterParams {
    pub fn new(public_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            token_id: None,
            hide_dust: true,
        }
    }

    pub fn token(mut self, token_id: impl Into<String>) -> Self {
        self.token_id = Some(token_id.into());
        self
    }

    pub fn hide_dust(mut self, hide: bool) -> Self {
        self.hide_dust = hide;
        self
    }
}

#[derive(Clone, Debug)]
pub struct PollParams {
    pub public_key: String,
    pub network: NetworkDetails,
    pub interval: Duration,
}

impl PollParams {
    pub fn new(public_key: impl Into<String>, network: NetworkDetails) -> Self {
        Self {
            public_key: public_key.into(),
            network,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn every(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// How one call to [`HistoryStore::fetch_account_history`] ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    Updated,
    /// Another fetch was running; nothing was done.
    AlreadyInFlight,
    /// Empty public key; nothing was done.
    MissingAccount,
    /// The cache was kept; the message is also available via `error()`.
    Failed(String),
}

#[derive(Debug, Default)]
struct State {
    is_loading: bool,
    error: Option<String>,
    has_recent_transaction: bool,
    raw: Option<Arc<RawHistoryData>>,
}

struct Inner {
    service: Arc<dyn LedgerQueryService>,
    codec: Arc<dyn AddressCodec>,
    is_fetching: AtomicBool,
    state: RwLock<State>,
    revision: watch::Sender<u64>,
    poller: Mutex<Option<Poller>>,
}

/// Clears `is_fetching` on every exit path of a fetch, and `is_loading`
/// when the fetch future is dropped before it settles.
struct FetchingGuard<'a> {
    inner: &'a Inner,
    settled: bool,
}

impl<'a> FetchingGuard<'a> {
    fn new(inner: &'a Inner) -> Self {
        Self {
            inner,
            settled: false,
        }
    }
}

impl Drop for FetchingGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            debug!("fetch cancelled before completion");
            self.inner
                .state
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .is_loading = false;
        }
        self.inner.is_fetching.store(false, Ordering::Release);
    }
}

/// Shared handle to one account-history cache. Clones share state.
#[derive(Clone)]
pub struct HistoryStore {
    inner: Arc<Inner>,
}

impl HistoryStore {
    pub fn new(service: Arc<dyn LedgerQueryService>, codec: Arc<dyn AddressCodec>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                service,
                codec,
                is_fetching: AtomicBool::new(false),
                state: RwLock::new(State::default()),
                revision,
                poller: Mutex::new(None),
            }),
        }
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, State> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, State> {
        self.inner.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run one fetch cycle for `params.public_key`.
    pub async fn fetch_account_history(&self, params: FetchParams) -> FetchOutcome {
        if params.public_key.is_empty() {
            warn!("fetch skipped: no public key");
            return FetchOutcome::MissingAccount;
        }
        if self
            .inner
            .is_fetching
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            info!(account = %params.public_key, "fetch skipped: already in flight");
            return FetchOutcome::AlreadyInFlight;
        }
        let mut guard = FetchingGuard::new(&self.inner);

        {
            let mut state = self.write_state();
            if params.has_recent_transaction {
                state.has_recent_transaction = true;
            }
            if !params.is_background_refresh {
                state.is_loading = true;
                state.error = None;
            }
        }

        info!(
            account = %params.public_key,
            network = %params.network.network,
            background = params.is_background_refresh,
            "fetching account history"
        );

        let service = &self.inner.service;
        let result = tokio::try_join!(
            service.fetch_balances(&params.public_key, &params.network),
            service.fetch_operations(&params.public_key, &params.network),
        );

        guard.settled = true;

        match result {
            Ok((balances, operations)) => {
                let count = operations.len();
                let raw = RawHistoryData {
                    public_key: params.public_key.clone(),
                    network: params.network,
                    balances,
                    operations: operations.into_iter().map(Arc::new).collect(),
                };
                {
                    let mut state = self.write_state();
                    state.raw = Some(Arc::new(raw));
                    state.error = None;
                    state.is_loading = false;
                    state.has_recent_transaction = false;
                }
                self.inner.revision.send_modify(|rev| *rev += 1);
                info!(account = %params.public_key, operations = count, "account history updated");
                FetchOutcome::Updated
            }
            Err(e) => {
                let message = e.to_string();
                {
                    let mut state = self.write_state();
                    state.error = Some(message.clone());
                    state.is_loading = false;
                }
                error!(account = %params.public_key, error = %message, "account history fetch failed");
                FetchOutcome::Failed(message)
            }
        }
    }

    /// Month-grouped view of the cached history, optionally narrowed to one
    /// token. `None` when nothing is cached for `params.public_key`.
    pub fn filtered_history(&self, params: &FilterParams) -> Option<HistoryData> {
        let raw = self.raw_history()?;
        if raw.public_key != params.public_key {
            debug!(
                requested = %params.public_key,
                cached = %raw.public_key,
                "no cached history for account"
            );
            return None;
        }

        let sections = match params.token_id.as_deref() {
            Some(token_id) => {
                let target = AssetTarget::resolve(token_id);
                let ctx = MatchContext::new(&raw.network, self.inner.codec.as_ref());
                let matching: Vec<&Arc<RawOperation>> = raw
                    .operations
                    .iter()
                    .filter(|op| target.matches(op, &ctx))
                    .collect();
                build_sections(&raw.public_key, matching, params.hide_dust)
            }
            None => build_sections(&raw.public_key, &raw.operations, params.hide_dust),
        };

        Some(HistoryData {
            balances: raw.balances.clone(),
            sections,
        })
    }

    /// Refresh in the background every `params.interval`, replacing any
    /// poller already running on this store.
    ///
    /// The poller is spawned onto the tokio runtime of the caller; outside
    /// a runtime this returns [`HistoryError::NoRuntime`] and nothing starts.
    pub fn start_polling(&self, params: PollParams) -> Result<(), HistoryError> {
        if let Err(e) = Handle::try_current() {
            warn!(account = %params.public_key, "cannot start polling: {e}");
            return Err(HistoryError::NoRuntime(e.to_string()));
        }
        let mut slot = self.inner.poller.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = slot.take() {
            previous.stop();
        }

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let fetch = FetchParams::new(params.public_key.clone(), params.network.clone()).background();
        info!(account = %params.public_key, "starting history polling");

        *slot = Some(Poller::spawn(params.interval, move || {
            let Some(inner) = weak.upgrade() else {
                return false;
            };
            let store = HistoryStore { inner };
            let fetch = fetch.clone();
            tokio::spawn(async move {
                store.fetch_account_history(fetch).await;
            });
            true
        }));
        Ok(())
    }

    /// Stop scheduling background refreshes. A fetch already running is
    /// left to finish.
    pub fn stop_polling(&self) {
        let previous = self
            .inner
            .poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(poller) = previous {
            poller.stop();
        }
    }

    pub fn is_polling(&self) -> bool {
        self.inner
            .poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(Poller::is_running)
    }

    pub fn is_loading(&self) -> bool {
        self.read_state().is_loading
    }

    pub fn error(&self) -> Option<String> {
        self.read_state().error.clone()
    }

    pub fn is_fetching(&self) -> bool {
        self.inner.is_fetching.load(Ordering::Acquire)
    }

    pub fn has_recent_transaction(&self) -> bool {
        self.read_state().has_recent_transaction
    }

    pub fn raw_history(&self) -> Option<Arc<RawHistoryData>> {
        self.read_state().raw.clone()
    }

    /// Revision counter bumped on every cache replacement.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read_state();
        f.debug_struct("HistoryStore")
            .field("is_loading", &state.is_loading)
            .field("error", &state.error)
            .field("is_fetching", &self.is_fetching())
            .field("cached_account", &state.raw.as_ref().map(|r| r.public_key.clone()))
            .finish()
    }
}
