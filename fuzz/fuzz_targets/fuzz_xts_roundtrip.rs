#![no_main]
use gmcore_crypto::modes::xts::{XtsDecrypter, XtsEncrypter};
use gmcore_crypto::sm4::Sm4Key;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 16 {
        return;
    }
    let k1 = [0x13u8; 16];
    let k2 = [0x31u8; 16];
    let sector = data[0] as u64;

    let mut enc = XtsEncrypter::new_with_sector(Sm4Key::new, &k1, &k2, sector).unwrap();
    let mut dec = XtsDecrypter::new_with_sector(Sm4Key::new, &k1, &k2, sector).unwrap();

    let mut ciphertext = vec![0u8; data.len()];
    enc.encrypt(&mut ciphertext, data).unwrap();
    let mut plaintext = vec![0u8; data.len()];
    dec.decrypt(&mut plaintext, &ciphertext).unwrap();
    assert_eq!(plaintext, data);
});
