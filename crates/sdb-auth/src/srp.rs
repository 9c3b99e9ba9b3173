//! SRP-6 verifier computation, per 3.3.5a convention (§4.8).
//!
//! `x = SHA1(salt ∥ SHA1("USERNAME:PASSWORD"))`, `v = g^x mod N`. All
//! multi-byte values are little-endian on the wire and in the database.

use num_bigint::BigUint;
use num_traits::Zero;
use sha1::{Digest, Sha1};

/// Blizzard's 32-byte SRP-6 safe prime, big-endian (the conventional
/// transcription of the constant; wire/database values are little-endian,
/// but this array itself is not one of them).
pub const N_BYTES_BE: [u8; 32] = [
    0x89, 0x4B, 0x64, 0x5E, 0x89, 0xE1, 0x53, 0x5B, 0xBD, 0xAD, 0x5B, 0x8B, 0x29, 0x06, 0x50, 0x53,
    0x08, 0x01, 0xB1, 0x8E, 0xBF, 0xBF, 0x5E, 0x8F, 0xAB, 0x3C, 0x82, 0x87, 0x2A, 0x3E, 0x9B, 0xB7,
];

/// SRP-6 generator.
pub const G: u64 = 7;

fn modulus() -> BigUint {
    BigUint::from_bytes_be(&N_BYTES_BE)
}

fn to_bytes_le_32(value: &BigUint) -> [u8; 32] {
    let mut bytes = value.to_bytes_le();
    bytes.resize(32, 0);
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes[..32]);
    out
}

/// Derive the SRP-6 private exponent `x` from `username`, `password`, and
/// `salt`. Blizzard's convention uppercases the identity string.
fn private_exponent(username: &str, password: &str, salt: &[u8; 32]) -> BigUint {
    let identity = format!("{}:{}", username.to_uppercase(), password.to_uppercase());
    let identity_hash = Sha1::digest(identity.as_bytes());

    let mut hasher = Sha1::new();
    hasher.update(salt);
    hasher.update(identity_hash);
    let x_digest = hasher.finalize();
    BigUint::from_bytes_le(&x_digest)
}

/// Compute the SRP-6 password verifier `v = g^x mod N`, little-endian.
pub fn compute_verifier(username: &str, password: &str, salt: &[u8; 32]) -> [u8; 32] {
    let n = modulus();
    let g = BigUint::from(G);
    let x = private_exponent(username, password, salt);
    let v = g.modpow(&x, &n);
    to_bytes_le_32(&v)
}

/// Recompute the verifier from `(username, password, salt)` and compare it
/// to `stored_verifier` in constant time.
pub fn verify(username: &str, password: &str, salt: &[u8; 32], stored_verifier: &[u8; 32]) -> bool {
    let computed = compute_verifier(username, password, salt);
    constant_time_eq(&computed, stored_verifier)
}

/// Byte-for-byte comparison that always inspects every byte, regardless of
/// where the first mismatch occurs.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Generate a random 32-byte salt for a new account.
pub fn random_salt() -> [u8; 32] {
    use rand::RngCore;
    let mut salt = [0u8; 32];
    rand::rng().fill_bytes(&mut salt);
    salt
}

#[allow(dead_code)]
fn modulus_is_nonzero() -> bool {
    !modulus().is_zero()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifier_is_deterministic_for_the_same_inputs() {
        let salt = [7u8; 32];
        let a = compute_verifier("Arthas", "hunter2", &salt);
        let b = compute_verifier("ARTHAS", "HUNTER2", &salt);
        assert_eq!(a, b, "identity comparison is case-insensitive per Blizzard convention");
    }

    #[test]
    fn different_passwords_yield_different_verifiers() {
        let salt = [1u8; 32];
        let a = compute_verifier("Jaina", "correcthorse", &salt);
        let b = compute_verifier("Jaina", "wrongpassword", &salt);
        assert_ne!(a, b);
    }

    #[test]
    fn verify_accepts_matching_credentials_and_rejects_wrong_ones() {
        let salt = random_salt();
        let verifier = compute_verifier("Sylvanas", "windrunner", &salt);
        assert!(verify("Sylvanas", "windrunner", &salt, &verifier));
        assert!(!verify("Sylvanas", "wrongpass", &salt, &verifier));
    }

    #[test]
    fn constant_time_eq_flags_length_mismatch() {
        assert!(!constant_time_eq(&[1, 2, 3], &[1, 2]));
    }

    /// Pinned vector: `u="ADMIN"`, password `"Passw0rd"`, salt = 32 bytes of
    /// `0x42`. Catches N/endianness regressions that self-referential
    /// round-trip tests can't, since those pass even against a wrong N.
    #[test]
    fn matches_the_pinned_admin_test_vector() {
        let salt = [0x42u8; 32];
        let verifier = compute_verifier("ADMIN", "Passw0rd", &salt);
        let expected: [u8; 32] = [
            0x39, 0x31, 0x12, 0x37, 0x41, 0x32, 0x65, 0x6b, 0xd1, 0x51, 0xbc, 0xd8, 0xf8, 0xea,
            0xf7, 0x57, 0x2d, 0x61, 0x5e, 0xb8, 0x72, 0x42, 0x0f, 0xb7, 0x72, 0x23, 0xa5, 0xdb,
            0xcb, 0x4d, 0x82, 0x02,
        ];
        assert_eq!(verifier, expected);
        assert!(verify("ADMIN", "Passw0rd", &salt, &expected));
    }
}
