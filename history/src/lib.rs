//! Transaction-history engine for Stellar accounts.
//!
//! Fetches an account's balances and operations, caches them, and derives
//! month-grouped views narrowed to one asset, with payments, swaps and
//! account creations flagged and dust or spam hidden.
//!
//! - [`asset`] resolves token identifiers and matches operations to them
//! - [`classify`] flags individual operations
//! - [`invocation`] decodes Soroban contract calls
//! - [`store`] owns the cache, fetch cycle and background poller

pub mod asset;
pub mod classify;
pub mod codec;
pub mod config;
pub mod error;
pub mod horizon;
pub mod invocation;
pub mod poller;
pub mod sections;
pub mod service;
pub mod store;

pub use asset::{AssetTarget, MatchContext};
pub use classify::{classify, exclusion, ClassifiedOperation, Exclusion};
pub use codec::{AddressCodec, StrKeyCodec};
pub use config::HistoryConfig;
pub use error::{CodecError, HistoryError, InvocationError};
pub use horizon::HorizonClient;
pub use invocation::{
    decode_token_call, display_value, invocation_details, token_invocation, InvocationArgs,
    TokenFunction, TokenInvocation, TokenInvocationResult,
};
pub use poller::Poller;
pub use sections::{build_sections, HistoryData, HistorySection, MonthYear};
pub use service::LedgerQueryService;
pub use store::{FetchOutcome, FetchParams, FilterParams, HistoryStore, PollParams, RawHistoryData};
