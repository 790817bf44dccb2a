//! XDR codec for [`ScVal`].
//!
//! Covers every value kind that can appear as a contract call argument.
//! Muxed account addresses decode to their base account; the mux id is
//! dropped. Contract instances and the claimable-balance / pool address
//! kinds are rejected as unsupported.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::scval::{ScAddress, ScVal};
use crate::TypesError;

/// Maximum nesting of vec/map values accepted by the decoder.
pub const MAX_DEPTH: usize = 32;

const SCV_BOOL: u32 = 0;
const SCV_VOID: u32 = 1;
const SCV_ERROR: u32 = 2;
const SCV_U32: u32 = 3;
const SCV_I32: u32 = 4;
const SCV_U64: u32 = 5;
const SCV_I64: u32 = 6;
const SCV_TIMEPOINT: u32 = 7;
const SCV_DURATION: u32 = 8;
const SCV_U128: u32 = 9;
const SCV_I128: u32 = 10;
const SCV_U256: u32 = 11;
const SCV_I256: u32 = 12;
const SCV_BYTES: u32 = 13;
const SCV_STRING: u32 = 14;
const SCV_SYMBOL: u32 = 15;
const SCV_VEC: u32 = 16;
const SCV_MAP: u32 = 17;
const SCV_ADDRESS: u32 = 18;
const SCV_LEDGER_KEY_CONTRACT_INSTANCE: u32 = 20;
const SCV_LEDGER_KEY_NONCE: u32 = 21;

const SC_ADDRESS_ACCOUNT: u32 = 0;
const SC_ADDRESS_CONTRACT: u32 = 1;
const SC_ADDRESS_MUXED_ACCOUNT: u32 = 2;
const PUBLIC_KEY_ED25519: u32 = 0;

/// Decode one value that must span the whole buffer.
pub fn decode_sc_val(bytes: &[u8]) -> Result<ScVal, TypesError> {
    let mut reader = Reader::new(bytes);
    let value = reader.sc_val(0)?;
    let rest = reader.remaining();
    if rest != 0 {
        return Err(TypesError::TrailingBytes(rest));
    }
    Ok(value)
}

/// Decode a base64 XDR value, as found in Horizon `parameters[].value`.
pub fn decode_sc_val_base64(encoded: &str) -> Result<ScVal, TypesError> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| TypesError::Base64(e.to_string()))?;
    decode_sc_val(&bytes)
}

pub fn encode_sc_val(value: &ScVal) -> Vec<u8> {
    let mut out = Vec::new();
    write_sc_val(&mut out, value);
    out
}

pub fn encode_sc_val_base64(value: &ScVal) -> String {
    STANDARD.encode(encode_sc_val(value))
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], TypesError> {
        if self.remaining() < n {
            return Err(TypesError::UnexpectedEof {
                offset: self.pos,
                needed: n,
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn fixed<const N: usize>(&mut self) -> Result<[u8; N], TypesError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u32(&mut self) -> Result<u32, TypesError> {
        Ok(u32::from_be_bytes(self.fixed()?))
    }

    fn i32(&mut self) -> Result<i32, TypesError> {
        Ok(i32::from_be_bytes(self.fixed()?))
    }

    fn u64(&mut self) -> Result<u64, TypesError> {
        Ok(u64::from_be_bytes(self.fixed()?))
    }

    fn i64(&mut self) -> Result<i64, TypesError> {
        Ok(i64::from_be_bytes(self.fixed()?))
    }

    fn bool(&mut self) -> Result<bool, TypesError> {
        match self.u32()? {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(TypesError::UnsupportedDiscriminant { what: "bool", value }),
        }
    }

    /// Variable-length opaque: u32 length, payload, zero padding to 4 bytes.
    fn var_opaque(&mut self) -> Result<Vec<u8>, TypesError> {
        let len = self.u32()? as usize;
        let data = self.take(len)?.to_vec();
        let pad = (4 - len % 4) % 4;
        if self.take(pad)?.iter().any(|b| *b != 0) {
            return Err(TypesError::NonZeroPadding);
        }
        Ok(data)
    }

    fn string(&mut self) -> Result<String, TypesError> {
        String::from_utf8(self.var_opaque()?).map_err(|_| TypesError::InvalidUtf8)
    }

    fn address(&mut self) -> Result<ScAddress, TypesError> {
        match self.u32()? {
            SC_ADDRESS_ACCOUNT => match self.u32()? {
                PUBLIC_KEY_ED25519 => Ok(ScAddress::Account(self.fixed()?)),
                value => Err(TypesError::UnsupportedDiscriminant {
                    what: "public key",
                    value,
                }),
            },
            SC_ADDRESS_CONTRACT => Ok(ScAddress::Contract(self.fixed()?)),
            SC_ADDRESS_MUXED_ACCOUNT => {
                let _id = self.u64()?;
                Ok(ScAddress::Account(self.fixed()?))
            }
            value => Err(TypesError::UnsupportedDiscriminant {
                what: "address",
                value,
            }),
        }
    }

    fn present(&mut self) -> Result<bool, TypesError> {
        self.bool()
    }

    fn sc_val(&mut self, depth: usize) -> Result<ScVal, TypesError> {
        if depth > MAX_DEPTH {
            return Err(TypesError::TooDeep(MAX_DEPTH));
        }
        let value = match self.u32()? {
            SCV_BOOL => ScVal::Bool(self.bool()?),
            SCV_VOID => ScVal::Void,
            SCV_ERROR => ScVal::Error {
                kind: self.u32()?,
                code: self.u32()?,
            },
            SCV_U32 => ScVal::U32(self.u32()?),
            SCV_I32 => ScVal::I32(self.i32()?),
            SCV_U64 => ScVal::U64(self.u64()?),
            SCV_I64 => ScVal::I64(self.i64()?),
            SCV_TIMEPOINT => ScVal::Timepoint(self.u64()?),
            SCV_DURATION => ScVal::Duration(self.u64()?),
            SCV_U128 => {
                let hi = self.u64()? as u128;
                let lo = self.u64()? as u128;
                ScVal::U128((hi << 64) | lo)
            }
            SCV_I128 => {
                let hi = self.i64()? as i128;
                let lo = self.u64()? as i128;
                ScVal::I128((hi << 64) | lo)
            }
            SCV_U256 => ScVal::U256(self.fixed()?),
            SCV_I256 => ScVal::I256(self.fixed()?),
            SCV_BYTES => ScVal::Bytes(self.var_opaque()?),
            SCV_STRING => ScVal::String(self.string()?),
            SCV_SYMBOL => ScVal::Symbol(self.string()?),
            SCV_VEC => {
                if self.present()? {
                    let len = self.u32()? as usize;
                    let mut items = Vec::with_capacity(len.min(self.remaining() / 4));
                    for _ in 0..len {
                        items.push(self.sc_val(depth + 1)?);
                    }
                    ScVal::Vec(Some(items))
                } else {
                    ScVal::Vec(None)
                }
            }
            SCV_MAP => {
                if self.present()? {
                    let len = self.u32()? as usize;
                    let mut entries = Vec::with_capacity(len.min(self.remaining() / 8));
                    for _ in 0..len {
                        let key = self.sc_val(depth + 1)?;
                        let val = self.sc_val(depth + 1)?;
                        entries.push((key, val));
                    }
                    ScVal::Map(Some(entries))
                } else {
                    ScVal::Map(None)
                }
            }
            SCV_ADDRESS => ScVal::Address(self.address()?),
            SCV_LEDGER_KEY_CONTRACT_INSTANCE => ScVal::LedgerKeyContractInstance,
            SCV_LEDGER_KEY_NONCE => ScVal::LedgerKeyNonce(self.i64()?),
            value => {
                return Err(TypesError::UnsupportedDiscriminant {
                    what: "ScVal",
                    value,
                })
            }
        };
        Ok(value)
    }
}

fn put_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn put_var_opaque(out: &mut Vec<u8>, data: &[u8]) {
    put_u32(out, data.len() as u32);
    out.extend_from_slice(data);
    let pad = (4 - data.len() % 4) % 4;
    out.extend(std::iter::repeat(0u8).take(pad));
}

fn write_address(out: &mut Vec<u8>, address: &ScAddress) {
    match address {
        ScAddress::Account(key) => {
            put_u32(out, SC_ADDRESS_ACCOUNT);
            put_u32(out, PUBLIC_KEY_ED25519);
            out.extend_from_slice(key);
        }
        ScAddress::Contract(hash) => {
            put_u32(out, SC_ADDRESS_CONTRACT);
            out.extend_from_slice(hash);
        }
    }
}

fn write_sc_val(out: &mut Vec<u8>, value: &ScVal) {
    match value {
        ScVal::Bool(b) => {
            put_u32(out, SCV_BOOL);
            put_u32(out, u32::from(*b));
        }
        ScVal::Void => put_u32(out, SCV_VOID),
        ScVal::Error { kind, code } => {
            put_u32(out, SCV_ERROR);
            put_u32(out, *kind);
            put_u32(out, *code);
        }
        ScVal::U32(v) => {
            put_u32(out, SCV_U32);
            put_u32(out, *v);
        }
        ScVal::I32(v) => {
            put_u32(out, SCV_I32);
            out.extend_from_slice(&v.to_be_bytes());
        }
        ScVal::U64(v) => {
            put_u32(out, SCV_U64);
            out.extend_from_slice(&v.to_be_bytes());
        }
        ScVal::I64(v) => {
            put_u32(out, SCV_I64);
            out.extend_from_slice(&v.to_be_bytes());
        }
        ScVal::Timepoint(v) => {
            put_u32(out, SCV_TIMEPOINT);
            out.extend_from_slice(&v.to_be_bytes());
        }
        ScVal::Duration(v) => {
            put_u32(out, SCV_DURATION);
            out.extend_from_slice(&v.to_be_bytes());
        }
        ScVal::U128(v) => {
            put_u32(out, SCV_U128);
            out.extend_from_slice(&((*v >> 64) as u64).to_be_bytes());
            out.extend_from_slice(&(*v as u64).to_be_bytes());
        }
        ScVal::I128(v) => {
            put_u32(out, SCV_I128);
            out.extend_from_slice(&((*v >> 64) as i64).to_be_bytes());
            out.extend_from_slice(&(*v as u64).to_be_bytes());
        }
        ScVal::U256(bytes) => {
            put_u32(out, SCV_U256);
            out.extend_from_slice(bytes);
        }
        ScVal::I256(bytes) => {
            put_u32(out, SCV_I256);
            out.extend_from_slice(bytes);
        }
        ScVal::Bytes(data) => {
            put_u32(out, SCV_BYTES);
            put_var_opaque(out, data);
        }
        ScVal::String(s) => {
            put_u32(out, SCV_STRING);
            put_var_opaque(out, s.as_bytes());
        }
        ScVal::Symbol(s) => {
            put_u32(out, SCV_SYMBOL);
            put_var_opaque(out, s.as_bytes());
        }
        ScVal::Vec(items) => {
            put_u32(out, SCV_VEC);
            match items {
                Some(items) => {
                    put_u32(out, 1);
                    put_u32(out, items.len() as u32);
                    for item in items {
                        write_sc_val(out, item);
                    }
                }
                None => put_u32(out, 0),
            }
        }
        ScVal::Map(entries) => {
            put_u32(out, SCV_MAP);
            match entries {
                Some(entries) => {
                    put_u32(out, 1);
                    put_u32(out, entries.len() as u32);
                    for (k, v) in entries {
                        write_sc_val(out, k);
                        write_sc_val(out, v);
                    }
                }
                None => put_u32(out, 0),
            }
        }
        ScVal::Address(address) => {
            put_u32(out, SCV_ADDRESS);
            write_address(out, address);
        }
        ScVal::LedgerKeyContractInstance => put_u32(out, SCV_LEDGER_KEY_CONTRACT_INSTANCE),
        ScVal::LedgerKeyNonce(n) => {
            put_u32(out, SCV_LEDGER_KEY_NONCE);
            out.extend_from_slice(&n.to_be_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scval::ScValKind;

    #[test]
    fn decodes_i128_amount() {
        let mut bytes = vec![0, 0, 0, 10];
        bytes.extend_from_slice(&0i64.to_be_bytes());
        bytes.extend_from_slice(&1_000_000u64.to_be_bytes());
        assert_eq!(decode_sc_val(&bytes).unwrap(), ScVal::I128(1_000_000));
    }

    #[test]
    fn decodes_negative_i128() {
        let mut bytes = vec![0, 0, 0, 10];
        bytes.extend_from_slice(&(-1i64).to_be_bytes());
        bytes.extend_from_slice(&u64::MAX.to_be_bytes());
        assert_eq!(decode_sc_val(&bytes).unwrap(), ScVal::I128(-1));
    }

    #[test]
    fn decodes_u32_token_id() {
        let bytes = [0, 0, 0, 3, 0, 0, 0x30, 0x39];
        let value = decode_sc_val(&bytes).unwrap();
        assert_eq!(value.kind(), ScValKind::U32);
        assert_eq!(value.as_u32(), Some(12345));
    }

    #[test]
    fn decodes_account_address() {
        let mut bytes = vec![0, 0, 0, 18, 0, 0, 0, 0, 0, 0, 0, 0];
        bytes.extend_from_slice(&[7u8; 32]);
        assert_eq!(
            decode_sc_val(&bytes).unwrap(),
            ScVal::Address(ScAddress::Account([7u8; 32]))
        );
    }

    #[test]
    fn muxed_address_decodes_to_base_account() {
        let mut bytes = vec![0, 0, 0, 18, 0, 0, 0, 2];
        bytes.extend_from_slice(&42u64.to_be_bytes());
        bytes.extend_from_slice(&[7u8; 32]);
        assert_eq!(
            decode_sc_val(&bytes).unwrap(),
            ScVal::Address(ScAddress::Account([7u8; 32]))
        );
    }

    #[test]
    fn truncated_muxed_address_is_rejected() {
        let mut bytes = vec![0, 0, 0, 18, 0, 0, 0, 2];
        bytes.extend_from_slice(&42u64.to_be_bytes());
        bytes.extend_from_slice(&[7u8; 16]);
        assert!(matches!(
            decode_sc_val(&bytes),
            Err(TypesError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn decodes_padded_symbol() {
        // "mint" is 4 bytes (no padding), "transfer" is 8 bytes (no padding),
        // "burn_it" is 7 bytes and needs one zero.
        let mut bytes = vec![0, 0, 0, 15, 0, 0, 0, 7];
        bytes.extend_from_slice(b"burn_it\0");
        assert_eq!(
            decode_sc_val(&bytes).unwrap(),
            ScVal::Symbol("burn_it".into())
        );
    }

    #[test]
    fn rejects_nonzero_padding() {
        let mut bytes = vec![0, 0, 0, 15, 0, 0, 0, 7];
        bytes.extend_from_slice(b"burn_it\x01");
        assert_eq!(decode_sc_val(&bytes), Err(TypesError::NonZeroPadding));
    }

    #[test]
    fn rejects_truncated_input() {
        let bytes = [0, 0, 0, 10, 0, 0];
        assert!(matches!(
            decode_sc_val(&bytes),
            Err(TypesError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn rejects_trailing_bytes() {
        let bytes = [0, 0, 0, 1, 0xff];
        assert_eq!(decode_sc_val(&bytes), Err(TypesError::TrailingBytes(1)));
    }

    #[test]
    fn rejects_contract_instance() {
        let bytes = [0, 0, 0, 19];
        assert_eq!(
            decode_sc_val(&bytes),
            Err(TypesError::UnsupportedDiscriminant {
                what: "ScVal",
                value: 19
            })
        );
    }

    #[test]
    fn rejects_excessive_nesting() {
        let mut value = ScVal::Void;
        for _ in 0..(MAX_DEPTH + 2) {
            value = ScVal::Vec(Some(vec![value]));
        }
        let bytes = encode_sc_val(&value);
        assert_eq!(decode_sc_val(&bytes), Err(TypesError::TooDeep(MAX_DEPTH)));
    }

    #[test]
    fn nested_values_survive_encoding() {
        let value = ScVal::Map(Some(vec![
            (
                ScVal::Symbol("owner".into()),
                ScVal::Address(ScAddress::Contract([9u8; 32])),
            ),
            (
                ScVal::Symbol("ids".into()),
                ScVal::Vec(Some(vec![ScVal::U32(1), ScVal::U32(2)])),
            ),
            (ScVal::String("note".into()), ScVal::Bytes(vec![1, 2, 3])),
        ]));
        let encoded = encode_sc_val_base64(&value);
        assert_eq!(decode_sc_val_base64(&encoded).unwrap(), value);
    }

    #[test]
    fn bad_base64_is_reported() {
        assert!(matches!(
            decode_sc_val_base64("not base64!"),
            Err(TypesError::Base64(_))
        ));
    }
}
