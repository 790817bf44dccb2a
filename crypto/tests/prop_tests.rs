use proptest::prelude::*;

use strand_crypto::strkey::{decode_any, ENCODED_LEN};
use strand_crypto::{decode_account, decode_contract, encode_account, encode_contract};

proptest! {
    /// Any 32-byte key encodes to 56 characters with the right leading letter.
    #[test]
    fn encoded_shape(bytes in prop::array::uniform32(0u8..)) {
        let account = encode_account(&bytes);
        let contract = encode_contract(&bytes);
        prop_assert_eq!(account.len(), ENCODED_LEN);
        prop_assert!(account.starts_with('G'));
        prop_assert!(contract.starts_with('C'));
        prop_assert_eq!(decode_account(&account).unwrap(), bytes);
        prop_assert_eq!(decode_contract(&contract).unwrap(), bytes);
    }

    /// Changing any single character of a valid key is always detected.
    #[test]
    fn single_character_corruption_detected(
        bytes in prop::array::uniform32(0u8..),
        index in 0usize..ENCODED_LEN,
        replacement in prop::sample::select(b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567".to_vec()),
    ) {
        let mut corrupted = encode_account(&bytes).into_bytes();
        prop_assume!(corrupted[index] != replacement);
        corrupted[index] = replacement;
        let corrupted = String::from_utf8(corrupted).unwrap();
        prop_assert!(decode_any(&corrupted).is_err());
    }
}
