#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // First byte picks the extension hint.
    let ext = match data[0] % 3 {
        0 => Some(".tex"),
        1 => Some(".sc2"),
        _ => None,
    };
    let payload = &data[1..];

    let packed = dvpl::encode_with_extension(payload, ext).unwrap();
    let decoded = dvpl::decode(&packed).unwrap();
    assert_eq!(decoded, payload);
});
