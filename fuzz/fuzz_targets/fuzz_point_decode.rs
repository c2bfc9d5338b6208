#![no_main]
use gmcore_crypto::sm9::{G1, G2};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Decoders must never panic; valid points must re-encode to the
    // same bytes.
    if let Ok(p) = G1::unmarshal(data) {
        assert_eq!(p.marshal().as_slice(), data);
    }
    let _ = G1::unmarshal_compressed(data);
    if let Ok(q) = G2::unmarshal(data) {
        assert_eq!(q.marshal().as_slice(), data);
    }
    let _ = G2::unmarshal_compressed(data);
});
