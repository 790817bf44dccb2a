//! Decoded Soroban contract values.
//!
//! Contract calls carry their arguments as untyped-on-the-wire values whose
//! declared kind is the only thing that tells a fungible `transfer(from, to,
//! i128)` apart from a collectible `transfer(from, to, u32)`.

use serde::{Deserialize, Serialize};

/// Address of an account or a contract, as raw 32-byte payloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScAddress {
    /// Ed25519 public key of a classic account.
    Account([u8; 32]),
    /// Contract id hash.
    Contract([u8; 32]),
}

/// A contract value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScVal {
    Bool(bool),
    Void,
    Error { kind: u32, code: u32 },
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    Timepoint(u64),
    Duration(u64),
    U128(u128),
    I128(i128),
    /// Big-endian 256-bit unsigned integer.
    U256([u8; 32]),
    /// Big-endian two's-complement 256-bit integer.
    I256([u8; 32]),
    Bytes(Vec<u8>),
    String(String),
    Symbol(String),
    Vec(Option<Vec<ScVal>>),
    Map(Option<Vec<(ScVal, ScVal)>>),
    Address(ScAddress),
    LedgerKeyContractInstance,
    LedgerKeyNonce(i64),
}

/// Declared kind of a [`ScVal`], without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScValKind {
    Bool,
    Void,
    Error,
    U32,
    I32,
    U64,
    I64,
    Timepoint,
    Duration,
    U128,
    I128,
    U256,
    I256,
    Bytes,
    String,
    Symbol,
    Vec,
    Map,
    Address,
    LedgerKeyContractInstance,
    LedgerKeyNonce,
}

impl ScVal {
    pub fn kind(&self) -> ScValKind {
        match self {
            Self::Bool(_) => ScValKind::Bool,
            Self::Void => ScValKind::Void,
            Self::Error { .. } => ScValKind::Error,
            Self::U32(_) => ScValKind::U32,
            Self::I32(_) => ScValKind::I32,
            Self::U64(_) => ScValKind::U64,
            Self::I64(_) => ScValKind::I64,
            Self::Timepoint(_) => ScValKind::Timepoint,
            Self::Duration(_) => ScValKind::Duration,
            Self::U128(_) => ScValKind::U128,
            Self::I128(_) => ScValKind::I128,
            Self::U256(_) => ScValKind::U256,
            Self::I256(_) => ScValKind::I256,
            Self::Bytes(_) => ScValKind::Bytes,
            Self::String(_) => ScValKind::String,
            Self::Symbol(_) => ScValKind::Symbol,
            Self::Vec(_) => ScValKind::Vec,
            Self::Map(_) => ScValKind::Map,
            Self::Address(_) => ScValKind::Address,
            Self::LedgerKeyContractInstance => ScValKind::LedgerKeyContractInstance,
            Self::LedgerKeyNonce(_) => ScValKind::LedgerKeyNonce,
        }
    }

    pub fn as_address(&self) -> Option<&ScAddress> {
        match self {
            Self::Address(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Self::I128(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::U32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Self::Symbol(s) => Some(s),
            _ => None,
        }
    }
}

impl ScValKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Void => "void",
            Self::Error => "error",
            Self::U32 => "u32",
            Self::I32 => "i32",
            Self::U64 => "u64",
            Self::I64 => "i64",
            Self::Timepoint => "timepoint",
            Self::Duration => "duration",
            Self::U128 => "u128",
            Self::I128 => "i128",
            Self::U256 => "u256",
            Self::I256 => "i256",
            Self::Bytes => "bytes",
            Self::String => "string",
            Self::Symbol => "symbol",
            Self::Vec => "vec",
            Self::Map => "map",
            Self::Address => "address",
            Self::LedgerKeyContractInstance => "ledger_key_contract_instance",
            Self::LedgerKeyNonce => "ledger_key_nonce",
        }
    }
}
