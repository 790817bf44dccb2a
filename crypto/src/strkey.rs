//! StrKey text encoding of account and contract addresses.
//!
//! Format: base32(version_byte || payload[32] || crc16_xmodem_le[2]), RFC 4648
//! alphabet, no padding. 35 bytes encode to exactly 56 characters.
//!
//! The version byte places the first character: `G` for ed25519 account keys,
//! `C` for contract ids.

use strand_types::ScAddress;
use thiserror::Error;

/// RFC 4648 base32 alphabet.
const BASE32_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Reverse lookup table: ASCII byte → 5-bit value (0xFF = invalid).
const BASE32_DECODE: [u8; 128] = {
    let mut table = [0xFFu8; 128];
    let alpha = BASE32_ALPHABET;
    let mut i = 0;
    while i < 32 {
        table[alpha[i] as usize] = i as u8;
        i += 1;
    }
    table
};

/// Length of an encoded 32-byte key.
pub const ENCODED_LEN: usize = 56;
/// version (1) + payload (32) + checksum (2).
const RAW_LEN: usize = 35;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VersionByte {
    /// `G...`
    AccountId,
    /// `C...`
    Contract,
}

impl VersionByte {
    pub const fn byte(self) -> u8 {
        match self {
            Self::AccountId => 6 << 3,
            Self::Contract => 2 << 3,
        }
    }

    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b if b == Self::AccountId.byte() => Some(Self::AccountId),
            b if b == Self::Contract.byte() => Some(Self::Contract),
            _ => None,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StrKeyError {
    #[error("expected {ENCODED_LEN} characters, got {0}")]
    InvalidLength(usize),

    #[error("invalid base32 character {0:?}")]
    InvalidCharacter(char),

    #[error("unknown version byte {0:#04x}")]
    UnknownVersion(u8),

    #[error("expected {expected:?} key, found {found:?}")]
    WrongVersion {
        expected: VersionByte,
        found: VersionByte,
    },

    #[error("checksum mismatch")]
    InvalidChecksum,

    #[error("invalid asset code {0:?}")]
    InvalidAssetCode(String),
}

/// CRC16-XModem (poly 0x1021, init 0).
pub fn crc16_xmodem(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            };
        }
    }
    crc
}

fn encode_base32(bytes: &[u8]) -> String {
    let num_chars = (bytes.len() * 8).div_ceil(5);
    let mut result = String::with_capacity(num_chars);

    let mut buffer: u64 = 0;
    let mut bits_in_buffer = 0;

    for &byte in bytes {
        buffer = (buffer << 8) | byte as u64;
        bits_in_buffer += 8;
        while bits_in_buffer >= 5 {
            bits_in_buffer -= 5;
            let idx = ((buffer >> bits_in_buffer) & 0x1F) as usize;
            result.push(BASE32_ALPHABET[idx] as char);
        }
    }
    if bits_in_buffer > 0 {
        let idx = ((buffer << (5 - bits_in_buffer)) & 0x1F) as usize;
        result.push(BASE32_ALPHABET[idx] as char);
    }

    result
}

fn decode_base32_fixed<const N: usize>(s: &str) -> Result<[u8; N], StrKeyError> {
    let mut buffer: u64 = 0;
    let mut bits_in_buffer = 0;
    let mut result = [0u8; N];
    let mut pos = 0;

    for c in s.chars() {
        let val = if c.is_ascii() {
            BASE32_DECODE[c as usize]
        } else {
            0xFF
        };
        if val == 0xFF {
            return Err(StrKeyError::InvalidCharacter(c));
        }
        buffer = (buffer << 5) | val as u64;
        bits_in_buffer += 5;
        if bits_in_buffer >= 8 {
            bits_in_buffer -= 8;
            if pos < N {
                result[pos] = (buffer >> bits_in_buffer) as u8;
                pos += 1;
            }
        }
    }

    if pos < N {
        return Err(StrKeyError::InvalidLength(s.len()));
    }
    Ok(result)
}

/// Encode a 32-byte payload under the given version.
pub fn encode(version: VersionByte, payload: &[u8; 32]) -> String {
    let mut raw = [0u8; RAW_LEN];
    raw[0] = version.byte();
    raw[1..33].copy_from_slice(payload);
    let checksum = crc16_xmodem(&raw[..33]);
    raw[33..].copy_from_slice(&checksum.to_le_bytes());
    encode_base32(&raw)
}

/// Decode any supported StrKey, returning its version and payload.
pub fn decode_any(text: &str) -> Result<(VersionByte, [u8; 32]), StrKeyError> {
    if text.len() != ENCODED_LEN {
        return Err(StrKeyError::InvalidLength(text.len()));
    }
    let raw: [u8; RAW_LEN] = decode_base32_fixed(text)?;
    let version = VersionByte::from_byte(raw[0]).ok_or(StrKeyError::UnknownVersion(raw[0]))?;

    let expected = crc16_xmodem(&raw[..33]).to_le_bytes();
    if raw[33..] != expected {
        return Err(StrKeyError::InvalidChecksum);
    }

    let mut payload = [0u8; 32];
    payload.copy_from_slice(&raw[1..33]);
    Ok((version, payload))
}

/// Decode a StrKey that must carry the given version.
pub fn decode(expected: VersionByte, text: &str) -> Result<[u8; 32], StrKeyError> {
    let (found, payload) = decode_any(text)?;
    if found != expected {
        return Err(StrKeyError::WrongVersion { expected, found });
    }
    Ok(payload)
}

pub fn encode_account(public_key: &[u8; 32]) -> String {
    encode(VersionByte::AccountId, public_key)
}

pub fn encode_contract(contract_id: &[u8; 32]) -> String {
    encode(VersionByte::Contract, contract_id)
}

pub fn decode_account(text: &str) -> Result<[u8; 32], StrKeyError> {
    decode(VersionByte::AccountId, text)
}

pub fn decode_contract(text: &str) -> Result<[u8; 32], StrKeyError> {
    decode(VersionByte::Contract, text)
}

pub fn is_valid_contract(text: &str) -> bool {
    decode_contract(text).is_ok()
}

pub fn is_valid_account(text: &str) -> bool {
    decode_account(text).is_ok()
}

/// Text form of a contract-value address.
pub fn encode_sc_address(address: &ScAddress) -> String {
    match address {
        ScAddress::Account(key) => encode_account(key),
        ScAddress::Contract(id) => encode_contract(id),
    }
}

/// Parse a `G...` or `C...` address into a contract-value address.
pub fn decode_sc_address(text: &str) -> Result<ScAddress, StrKeyError> {
    match decode_any(text)? {
        (VersionByte::AccountId, key) => Ok(ScAddress::Account(key)),
        (VersionByte::Contract, id) => Ok(ScAddress::Contract(id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZERO_ACCOUNT: &str = "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF";
    const ZERO_CONTRACT: &str = "CAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAABSC4";

    #[test]
    fn crc16_check_value() {
        assert_eq!(crc16_xmodem(b"123456789"), 0x31C3);
    }

    #[test]
    fn encodes_known_vectors() {
        assert_eq!(encode_account(&[0u8; 32]), ZERO_ACCOUNT);
        assert_eq!(encode_contract(&[0u8; 32]), ZERO_CONTRACT);

        let mut ascending = [0u8; 32];
        for (i, b) in ascending.iter_mut().enumerate() {
            *b = i as u8;
        }
        assert_eq!(
            encode_account(&ascending),
            "GAAACAQDAQCQMBYIBEFAWDANBYHRAEISCMKBKFQXDAMRUGY4DUPB7JZX"
        );
        assert_eq!(
            encode_contract(&[0xAB; 32]),
            "CCV2XK5LVOV2XK5LVOV2XK5LVOV2XK5LVOV2XK5LVOV2XK5LVOV2XMCW"
        );
    }

    #[test]
    fn decode_checks_version() {
        assert_eq!(decode_account(ZERO_ACCOUNT).unwrap(), [0u8; 32]);
        assert_eq!(
            decode_account(ZERO_CONTRACT),
            Err(StrKeyError::WrongVersion {
                expected: VersionByte::AccountId,
                found: VersionByte::Contract,
            })
        );
        assert!(is_valid_contract(ZERO_CONTRACT));
        assert!(!is_valid_contract(ZERO_ACCOUNT));
    }

    #[test]
    fn decode_rejects_bad_checksum() {
        let mut bad = ZERO_ACCOUNT.to_string();
        bad.pop();
        bad.push('G');
        assert_eq!(decode_account(&bad), Err(StrKeyError::InvalidChecksum));
    }

    #[test]
    fn decode_rejects_bad_input() {
        assert_eq!(decode_any("GABC"), Err(StrKeyError::InvalidLength(4)));
        let lower = ZERO_ACCOUNT.to_lowercase();
        assert_eq!(decode_any(&lower), Err(StrKeyError::InvalidCharacter('g')));
        let with_digit = format!("1{}", &ZERO_ACCOUNT[1..]);
        assert_eq!(decode_any(&with_digit), Err(StrKeyError::InvalidCharacter('1')));
    }

    #[test]
    fn sc_address_text_forms() {
        let account = ScAddress::Account([0u8; 32]);
        let contract = ScAddress::Contract([0u8; 32]);
        assert_eq!(encode_sc_address(&account), ZERO_ACCOUNT);
        assert_eq!(encode_sc_address(&contract), ZERO_CONTRACT);
        assert_eq!(decode_sc_address(ZERO_CONTRACT).unwrap(), contract);
    }
}
