#![no_main]
use gmcore_crypto::sm9::Gt;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok((e, rest)) = Gt::unmarshal(data) {
        assert_eq!(rest.len(), data.len() - 384);
        assert_eq!(e.marshal().as_slice(), &data[..384]);
    }
});
