//! Address codec and contract id derivation for Strand.
//!
//! - **StrKey** text encoding of account (`G...`) and contract (`C...`) addresses
//! - **SHA-256** for network ids and contract id preimages
//! - Stellar Asset Contract address derivation for classic assets

pub mod contract_id;
pub mod hash;
pub mod strkey;

pub use contract_id::{asset_contract_address, asset_contract_id, ClassicAsset};
pub use hash::{network_id, sha256, sha256_multi};
pub use strkey::{
    decode_account, decode_contract, decode_sc_address, encode_account, encode_contract,
    encode_sc_address, is_valid_account, is_valid_contract, StrKeyError, VersionByte,
};
