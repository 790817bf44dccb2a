use proptest::prelude::*;

use strand_types::xdr::{decode_sc_val, encode_sc_val};
use strand_types::{ScVal, Stroops};

proptest! {
    /// Display output of any amount parses back to the same stroops.
    #[test]
    fn stroops_display_parses_back(raw in (i64::MIN + 1)..i64::MAX) {
        let amount = Stroops::new(raw);
        prop_assert_eq!(Stroops::parse(&amount.to_string()), Some(amount));
    }

    /// Parsed amounts order the same way as their decimal values.
    #[test]
    fn stroops_ordering_matches_decimal(a in 0u32..1_000_000, b in 0u32..1_000_000) {
        let sa = Stroops::parse(&format!("0.{:07}", a)).unwrap();
        let sb = Stroops::parse(&format!("0.{:07}", b)).unwrap();
        prop_assert_eq!(sa <= sb, a <= b);
    }

    /// i128 amounts keep sign and magnitude through the XDR hi/lo split.
    #[test]
    fn i128_xdr_preserves_value(v in any::<i128>()) {
        let bytes = encode_sc_val(&ScVal::I128(v));
        prop_assert_eq!(bytes.len(), 20);
        prop_assert_eq!(decode_sc_val(&bytes).unwrap(), ScVal::I128(v));
    }

    /// The decoder never panics on arbitrary input.
    #[test]
    fn decoder_is_total(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = decode_sc_val(&bytes);
    }
}
