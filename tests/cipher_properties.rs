//! Property-based tests for the private key cipher
//!
//! Uses proptest to check round-trip, tamper detection and wrong-password
//! behavior across many random keys and passwords.

use ditconfig::crypto::encryption::{decrypt, encrypt};
use ditconfig::error::DitConfigError;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: decrypt(encrypt(p, pw), pw) == p
    #[test]
    fn prop_roundtrip(
        plaintext in proptest::collection::vec(any::<u8>(), 0..128),
        password in proptest::collection::vec(any::<u8>(), 1..64),
    ) {
        let encrypted = encrypt(&plaintext, &password).expect("encrypt");
        let decrypted = decrypt(&encrypted, &password).expect("decrypt");
        prop_assert_eq!(decrypted.as_slice(), plaintext.as_slice());
    }

    /// Property: flipping any single bit is detected
    #[test]
    fn prop_single_bit_flip_detected(
        plaintext in proptest::collection::vec(any::<u8>(), 1..64),
        password in "[a-zA-Z0-9]{1,32}",
        position in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let mut encrypted = encrypt(&plaintext, password.as_bytes()).expect("encrypt");
        let index = position.index(encrypted.len());
        encrypted[index] ^= 1 << bit;

        let result = decrypt(&encrypted, password.as_bytes());
        prop_assert!(matches!(result, Err(DitConfigError::AuthenticationError)));
    }

    /// Property: a different password never decrypts
    #[test]
    fn prop_wrong_password_rejected(
        plaintext in proptest::collection::vec(any::<u8>(), 0..64),
        pw1 in "[a-z]{1,16}",
        pw2 in "[a-z]{1,16}",
    ) {
        prop_assume!(pw1 != pw2);

        let encrypted = encrypt(&plaintext, pw1.as_bytes()).expect("encrypt");
        let result = decrypt(&encrypted, pw2.as_bytes());
        prop_assert!(matches!(result, Err(DitConfigError::AuthenticationError)));
    }

    /// Property: two encryptions of the same input differ
    #[test]
    fn prop_fresh_nonce_per_call(
        plaintext in proptest::collection::vec(any::<u8>(), 0..64),
        password in "[a-z]{1,16}",
    ) {
        let first = encrypt(&plaintext, password.as_bytes()).expect("encrypt");
        let second = encrypt(&plaintext, password.as_bytes()).expect("encrypt");
        prop_assert_ne!(first, second);
    }
}
