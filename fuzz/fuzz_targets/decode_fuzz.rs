#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // The decoder must never panic, only return errors.
    let _ = dvpl::decode(data);
    let _ = dvpl::inspect(data);

    // Same bytes behind a well-formed footer, so the type dispatch and the
    // LZ4 path see arbitrary payloads too.
    if data.len() >= 5 {
        let (head, payload) = data.split_at(5);
        let kind = u32::from(head[0] % 4);
        let original = u32::from_le_bytes([head[1], head[2], head[3], head[4]]) % (1 << 20);
        let crc = dvpl::container::integrity::checksum(payload);
        let mut buf = payload.to_vec();
        buf.extend_from_slice(&dvpl::container::footer::build(
            original,
            payload.len() as u32,
            crc,
            kind,
        ));
        let _ = dvpl::decode(&buf);
    }
});
