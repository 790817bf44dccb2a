//! Ledger data model for Strand.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! raw operation records, balances, networks, fixed-point amounts, and
//! Soroban contract values together with their XDR encoding.

pub mod amount;
pub mod auth;
pub mod balance;
pub mod error;
pub mod network;
pub mod operation;
pub mod scval;
pub mod xdr;

pub use amount::Stroops;
pub use auth::{AuthorizedFunction, AuthorizedInvocation, ContractExecutable, ContractIdPreimage};
pub use balance::{balance_map, Balance, BalanceMap};
pub use error::TypesError;
pub use network::{Network, NetworkDetails};
pub use operation::{
    AssetRef, HostFunctionParameter, OperationKind, PreDecodedArgs, RawOperation, TransactionAttr,
};
pub use scval::{ScAddress, ScVal, ScValKind};
