//! Contract-invocation decoding.
//!
//! Token contracts expose `transfer(from, to, x)` for both fungible tokens and
//! collectibles; only the declared kind of `x` tells them apart (`i128`
//! amount vs `u32` token id). Nothing here guesses: a third argument of any
//! other kind leaves both fields unset.

use serde_json::{json, Map, Value};
use strand_types::{
    AuthorizedFunction, AuthorizedInvocation, ContractExecutable, ContractIdPreimage,
    OperationKind, RawOperation, ScVal,
};
use tracing::debug;

use crate::codec::AddressCodec;
use crate::error::InvocationError;

/// Function names of the token interface the history engine understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenFunction {
    Transfer,
    Mint,
}

impl TokenFunction {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "transfer" => Some(Self::Transfer),
            "mint" => Some(Self::Mint),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transfer => "transfer",
            Self::Mint => "mint",
        }
    }
}

/// Fields extracted from a token call.
///
/// For a `transfer`, at most one of `amount` / `token_id` is set. For a
/// function outside the token interface the result is
/// [`TokenInvocationResult::unrecognized`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenInvocationResult {
    pub from: String,
    pub to: String,
    pub amount: Option<i128>,
    pub token_id: Option<u32>,
}

impl TokenInvocationResult {
    /// Result for a function name outside the token interface: empty
    /// addresses and a zero amount.
    pub fn unrecognized() -> Self {
        Self {
            from: String::new(),
            to: String::new(),
            amount: Some(0),
            token_id: None,
        }
    }

    pub fn is_collectible(&self) -> bool {
        self.token_id.is_some()
    }
}

fn address_arg(
    function: TokenFunction,
    args: &[ScVal],
    index: usize,
    codec: &dyn AddressCodec,
) -> Result<String, InvocationError> {
    let value = args.get(index).ok_or(InvocationError::MissingArgument {
        function: function.as_str(),
        index,
    })?;
    value
        .as_address()
        .map(|a| codec.sc_address_to_text(a))
        .ok_or(InvocationError::NotAnAddress {
            function: function.as_str(),
            index,
            found: value.kind().as_str(),
        })
}

/// Decode the arguments of a token call by name and argument shape.
pub fn decode_token_call(
    fn_name: &str,
    args: &[ScVal],
    codec: &dyn AddressCodec,
) -> Result<TokenInvocationResult, InvocationError> {
    let Some(function) = TokenFunction::from_name(fn_name) else {
        return Ok(TokenInvocationResult::unrecognized());
    };

    match function {
        TokenFunction::Transfer => {
            let from = address_arg(function, args, 0, codec)?;
            let to = address_arg(function, args, 1, codec)?;
            let third = args.get(2).ok_or(InvocationError::MissingArgument {
                function: function.as_str(),
                index: 2,
            })?;
            let (amount, token_id) = match third {
                ScVal::I128(amount) => (Some(*amount), None),
                ScVal::U32(id) => (None, Some(*id)),
                _ => (None, None),
            };
            Ok(TokenInvocationResult {
                from,
                to,
                amount,
                token_id,
            })
        }
        TokenFunction::Mint => {
            // Any trailing argument is accepted and ignored.
            let to = address_arg(function, args, 0, codec)?;
            let amount = args
                .get(1)
                .ok_or(InvocationError::MissingArgument {
                    function: function.as_str(),
                    index: 1,
                })?
                .as_i128();
            Ok(TokenInvocationResult {
                from: String::new(),
                to,
                amount,
                token_id: None,
            })
        }
    }
}

/// A token-interface call found in an operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenInvocation {
    pub contract_id: String,
    pub function: TokenFunction,
    pub result: TokenInvocationResult,
}

/// Host function type as reported by Horizon's `function` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostFunctionType {
    InvokeContract,
    CreateContract,
    CreateContractV2,
    UploadWasm,
    Unknown,
}

impl HostFunctionType {
    pub fn parse(function: &str) -> Self {
        // Horizon doubles the prefix: "HostFunctionTypeHostFunctionTypeInvokeContract".
        if function.ends_with("InvokeContract") {
            Self::InvokeContract
        } else if function.ends_with("CreateContractV2") {
            Self::CreateContractV2
        } else if function.ends_with("CreateContract") {
            Self::CreateContract
        } else if function.ends_with("UploadContractWasm") {
            Self::UploadWasm
        } else {
            Self::Unknown
        }
    }
}

/// Contract id, function name and arguments of an invoke-contract record.
///
/// Horizon lists the parameters as `[contract address, function symbol, args...]`.
pub fn decode_invoke_parameters(
    op: &RawOperation,
    codec: &dyn AddressCodec,
) -> Result<Option<(String, String, Vec<ScVal>)>, InvocationError> {
    if op.effective_kind() != OperationKind::InvokeHostFunction {
        return Ok(None);
    }
    let function = op.function.as_deref().map(HostFunctionType::parse);
    if function != Some(HostFunctionType::InvokeContract) {
        return Ok(None);
    }

    let mut values = Vec::with_capacity(op.parameters.len());
    for (index, param) in op.parameters.iter().enumerate() {
        let value = strand_types::xdr::decode_sc_val_base64(&param.value).map_err(|e| {
            InvocationError::Undecodable {
                index,
                reason: e.to_string(),
            }
        })?;
        values.push(value);
    }

    let mut values = values.into_iter();
    let contract = match values.next() {
        Some(ScVal::Address(address)) => codec.sc_address_to_text(&address),
        _ => return Ok(None),
    };
    let fn_name = match values.next() {
        Some(ScVal::Symbol(name)) => name,
        _ => return Ok(None),
    };
    Ok(Some((contract, fn_name, values.collect())))
}

/// Extract the token call carried by an operation, if any.
///
/// Indexer-supplied attributes are preferred; otherwise the base64
/// parameters are decoded. Calls outside the token interface and malformed
/// token calls yield `None`.
pub fn token_invocation(op: &RawOperation, codec: &dyn AddressCodec) -> Option<TokenInvocation> {
    if op.effective_kind() != OperationKind::InvokeHostFunction {
        return None;
    }

    let attr = &op.transaction_attr;
    if let (Some(contract_id), Some(fn_name)) = (&attr.contract_id, &attr.fn_name) {
        let function = TokenFunction::from_name(fn_name)?;
        let result = match &attr.args {
            Some(args) => TokenInvocationResult {
                from: args.from.clone(),
                to: args.to.clone(),
                amount: args.amount.as_deref().and_then(|a| a.parse().ok()),
                token_id: args.token_id,
            },
            None => decode_invoke_parameters(op, codec)
                .ok()
                .flatten()
                .and_then(|(_, _, args)| decode_token_call(fn_name, &args, codec).ok())
                .unwrap_or_default(),
        };
        return Some(TokenInvocation {
            contract_id: contract_id.clone(),
            function,
            result,
        });
    }

    let (contract_id, fn_name, args) = match decode_invoke_parameters(op, codec) {
        Ok(Some(decoded)) => decoded,
        Ok(None) => return None,
        Err(e) => {
            debug!(operation = %op.id, error = %e, "skipping undecodable contract call");
            return None;
        }
    };
    let function = TokenFunction::from_name(&fn_name)?;
    match decode_token_call(&fn_name, &args, codec) {
        Ok(result) => Some(TokenInvocation {
            contract_id,
            function,
            result,
        }),
        Err(e) => {
            debug!(operation = %op.id, error = %e, "malformed token call");
            None
        }
    }
}

/// Semantic shape of one contract call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvocationArgs {
    Invoke {
        contract_id: String,
        fn_name: String,
        args: Vec<ScVal>,
    },
    SacCreate {
        asset: String,
        constructor_args: Vec<ScVal>,
    },
    WasmCreate {
        address: String,
        hash: String,
        salt: String,
        constructor_args: Vec<ScVal>,
    },
    Unknown,
}

impl InvocationArgs {
    pub fn from_authorized_function(function: &AuthorizedFunction, codec: &dyn AddressCodec) -> Self {
        match function {
            AuthorizedFunction::ContractFn {
                contract,
                function_name,
                args,
            } => Self::Invoke {
                contract_id: codec.sc_address_to_text(contract),
                fn_name: function_name.clone(),
                args: args.clone(),
            },
            AuthorizedFunction::CreateContract {
                executable,
                preimage,
            } => Self::create(executable, preimage, &[], codec),
            AuthorizedFunction::CreateContractV2 {
                executable,
                preimage,
                constructor_args,
            } => Self::create(executable, preimage, constructor_args, codec),
        }
    }

    fn create(
        executable: &ContractExecutable,
        preimage: &ContractIdPreimage,
        constructor_args: &[ScVal],
        codec: &dyn AddressCodec,
    ) -> Self {
        match (executable, preimage) {
            (ContractExecutable::Wasm(hash), ContractIdPreimage::FromAddress { address, salt }) => {
                Self::WasmCreate {
                    address: codec.sc_address_to_text(address),
                    hash: hex::encode(hash),
                    salt: hex::encode(salt),
                    constructor_args: constructor_args.to_vec(),
                }
            }
            (ContractExecutable::StellarAsset, ContractIdPreimage::FromAsset(asset)) => {
                Self::SacCreate {
                    asset: asset.clone(),
                    constructor_args: constructor_args.to_vec(),
                }
            }
            _ => Self::Unknown,
        }
    }

    /// Shape of the host function carried by an operation record.
    pub fn from_operation(op: &RawOperation, codec: &dyn AddressCodec) -> Self {
        if op.effective_kind() != OperationKind::InvokeHostFunction {
            return Self::Unknown;
        }
        match op.function.as_deref().map(HostFunctionType::parse) {
            Some(HostFunctionType::InvokeContract) => match decode_invoke_parameters(op, codec) {
                Ok(Some((contract_id, fn_name, args))) => Self::Invoke {
                    contract_id,
                    fn_name,
                    args,
                },
                _ => Self::Unknown,
            },
            Some(HostFunctionType::CreateContract | HostFunctionType::CreateContractV2) => {
                if let Some(asset) = &op.asset {
                    Self::SacCreate {
                        asset: asset.clone(),
                        constructor_args: Vec::new(),
                    }
                } else if let (Some(address), Some(salt)) = (&op.address, &op.salt) {
                    Self::WasmCreate {
                        address: address.clone(),
                        hash: op.wasm_hash.clone().unwrap_or_default(),
                        salt: salt.clone(),
                        constructor_args: Vec::new(),
                    }
                } else {
                    Self::Unknown
                }
            }
            _ => Self::Unknown,
        }
    }
}

/// Every recognised call in an authorization tree, parents first.
pub fn invocation_details(
    root: &AuthorizedInvocation,
    codec: &dyn AddressCodec,
) -> Vec<InvocationArgs> {
    let mut out = Vec::new();
    root.walk(&mut |inv: &AuthorizedInvocation| {
        let args = InvocationArgs::from_authorized_function(&inv.function, codec);
        if args != InvocationArgs::Unknown {
            out.push(args);
        }
    });
    out
}

/// Render a contract value as display text. `Void` has no text.
pub fn display_value(value: &ScVal, codec: &dyn AddressCodec) -> Option<String> {
    match value {
        ScVal::Void => None,
        ScVal::Vec(_) | ScVal::Map(_) => {
            serde_json::to_string_pretty(&to_json(value, codec)).ok()
        }
        ScVal::String(s) | ScVal::Symbol(s) => Some(s.clone()),
        other => Some(scalar_text(other, codec)),
    }
}

fn scalar_text(value: &ScVal, codec: &dyn AddressCodec) -> String {
    match value {
        ScVal::Bool(b) => b.to_string(),
        ScVal::Void => String::new(),
        ScVal::Error { code, .. } => code.to_string(),
        ScVal::U32(v) => v.to_string(),
        ScVal::I32(v) => v.to_string(),
        ScVal::U64(v) | ScVal::Timepoint(v) | ScVal::Duration(v) => v.to_string(),
        ScVal::I64(v) | ScVal::LedgerKeyNonce(v) => v.to_string(),
        ScVal::U128(v) => v.to_string(),
        ScVal::I128(v) => v.to_string(),
        ScVal::U256(bytes) => u256_to_decimal(bytes),
        ScVal::I256(bytes) => i256_to_decimal(bytes),
        ScVal::Bytes(data) => hex::encode(data),
        ScVal::String(s) | ScVal::Symbol(s) => s.clone(),
        ScVal::Address(address) => codec.sc_address_to_text(address),
        ScVal::LedgerKeyContractInstance => "contract_instance".to_string(),
        ScVal::Vec(_) | ScVal::Map(_) => to_json(value, codec).to_string(),
    }
}

/// JSON form of a value. Integers wider than 32 bits become strings so no
/// precision is lost in consumers that parse numbers as doubles.
fn to_json(value: &ScVal, codec: &dyn AddressCodec) -> Value {
    match value {
        ScVal::Void => Value::Null,
        ScVal::Bool(b) => json!(b),
        ScVal::U32(v) => json!(v),
        ScVal::I32(v) => json!(v),
        ScVal::Vec(None) | ScVal::Map(None) => Value::Null,
        ScVal::Vec(Some(items)) => Value::Array(items.iter().map(|i| to_json(i, codec)).collect()),
        ScVal::Map(Some(entries)) => {
            let keyed = entries.iter().all(|(k, _)| {
                matches!(k, ScVal::Symbol(_) | ScVal::String(_))
            });
            if keyed {
                let mut object = Map::new();
                for (k, v) in entries {
                    object.insert(scalar_text(k, codec), to_json(v, codec));
                }
                Value::Object(object)
            } else {
                Value::Array(
                    entries
                        .iter()
                        .map(|(k, v)| json!([to_json(k, codec), to_json(v, codec)]))
                        .collect(),
                )
            }
        }
        other => Value::String(scalar_text(other, codec)),
    }
}

fn u256_to_decimal(bytes: &[u8; 32]) -> String {
    let mut digits = bytes.to_vec();
    let mut out = Vec::new();
    while digits.iter().any(|d| *d != 0) {
        let mut rem = 0u32;
        for d in digits.iter_mut() {
            let acc = (rem << 8) | *d as u32;
            *d = (acc / 10) as u8;
            rem = acc % 10;
        }
        out.push(b'0' + rem as u8);
    }
    if out.is_empty() {
        return "0".to_string();
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

fn i256_to_decimal(bytes: &[u8; 32]) -> String {
    if bytes[0] & 0x80 == 0 {
        return u256_to_decimal(bytes);
    }
    // Two's complement negation: invert and add one.
    let mut magnitude = [0u8; 32];
    let mut carry = 1u16;
    for i in (0..32).rev() {
        let v = (!bytes[i]) as u16 + carry;
        magnitude[i] = v as u8;
        carry = v >> 8;
    }
    format!("-{}", u256_to_decimal(&magnitude))
}
