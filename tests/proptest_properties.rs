use dvpl::container::FOOTER_LEN;
use dvpl::{DvplError, Footer};
use proptest::prelude::*;

fn ext_strategy() -> impl Strategy<Value = Option<&'static str>> {
    prop_oneof![Just(Some(".tex")), Just(Some(".bin")), Just(None)]
}

proptest! {
    #[test]
    fn prop_encode_decode_roundtrip(
        data in proptest::collection::vec(any::<u8>(), 0..8192),
        ext in ext_strategy()
    ) {
        let packed = dvpl::encode_with_extension(&data, ext).unwrap();
        let decoded = dvpl::decode(&packed).unwrap();
        prop_assert_eq!(decoded, data);
    }

    #[test]
    fn prop_footer_describes_container(
        data in proptest::collection::vec(any::<u8>(), 0..4096),
        ext in ext_strategy()
    ) {
        let packed = dvpl::encode_with_extension(&data, ext).unwrap();
        let f = Footer::parse(&packed).unwrap();
        prop_assert_eq!(f.original_size as usize, data.len());
        prop_assert_eq!(f.compressed_size as usize + FOOTER_LEN, packed.len());
        prop_assert_eq!(&packed[packed.len() - 4..], b"DVPL");
    }

    #[test]
    fn prop_wrong_magic_always_rejected(
        data in proptest::collection::vec(any::<u8>(), 20..512),
    ) {
        prop_assume!(&data[data.len() - 4..] != b"DVPL");
        let is_invalid_magic = matches!(
            dvpl::decode(&data),
            Err(DvplError::InvalidMagic { .. })
        );
        prop_assert!(is_invalid_magic);
    }

    #[test]
    fn prop_payload_corruption_detected(
        data in proptest::collection::vec(any::<u8>(), 1..2048),
        pos in any::<prop::sample::Index>(),
        bit in 0u8..8
    ) {
        let mut packed = dvpl::encode(&data).unwrap();
        let payload_len = packed.len() - FOOTER_LEN;
        let at = pos.index(payload_len);
        packed[at] ^= 1 << bit;
        let is_checksum_mismatch = matches!(
            dvpl::decode(&packed),
            Err(DvplError::ChecksumMismatch { .. })
        );
        prop_assert!(is_checksum_mismatch);
    }

    #[test]
    fn prop_decode_never_panics(data in proptest::collection::vec(any::<u8>(), 0..256)) {
        let _ = dvpl::decode(&data);
    }
}
