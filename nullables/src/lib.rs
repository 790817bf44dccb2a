//! Nullable infrastructure for deterministic testing.
//!
//! The history engine talks to the outside world through two traits: the
//! ledger query service and the address codec. This crate provides
//! test-friendly implementations that:
//! - Return scripted values
//! - Can be controlled programmatically (failures, held fetches)
//! - Never touch the network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod codec;
pub mod ledger;

pub use codec::NullAddressCodec;
pub use ledger::{operation, NullLedgerService};
