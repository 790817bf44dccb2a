//! Authorized contract invocation trees.
//!
//! A Soroban authorization entry signs a root call plus every nested call it
//! makes on the signer's behalf. Wallets show the whole tree before signing.

use serde::{Deserialize, Serialize};

use crate::scval::{ScAddress, ScVal};

/// How a new contract's code is supplied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractExecutable {
    /// Uploaded WASM, identified by its SHA-256 hash.
    Wasm([u8; 32]),
    /// The built-in Stellar Asset Contract.
    StellarAsset,
}

/// What the new contract's id is derived from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractIdPreimage {
    FromAddress { address: ScAddress, salt: [u8; 32] },
    /// Canonical asset name (`"native"` or `"CODE:ISSUER"`).
    FromAsset(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthorizedFunction {
    ContractFn {
        contract: ScAddress,
        function_name: String,
        args: Vec<ScVal>,
    },
    CreateContract {
        executable: ContractExecutable,
        preimage: ContractIdPreimage,
    },
    CreateContractV2 {
        executable: ContractExecutable,
        preimage: ContractIdPreimage,
        constructor_args: Vec<ScVal>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizedInvocation {
    pub function: AuthorizedFunction,
    #[serde(default)]
    pub sub_invocations: Vec<AuthorizedInvocation>,
}

impl AuthorizedInvocation {
    pub fn new(function: AuthorizedFunction) -> Self {
        Self {
            function,
            sub_invocations: Vec::new(),
        }
    }

    pub fn with_sub(mut self, sub: AuthorizedInvocation) -> Self {
        self.sub_invocations.push(sub);
        self
    }

    /// Visit this node and all descendants, parents before children.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a AuthorizedInvocation)) {
        visit(self);
        for sub in &self.sub_invocations {
            sub.walk(visit);
        }
    }
}
