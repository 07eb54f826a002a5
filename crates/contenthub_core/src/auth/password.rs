//! Salted password hashing.
//!
//! Stored form: `pbkdf2:sha256:<iterations>$<salt>$<hex digest>`, the digest
//! being PBKDF2-HMAC-SHA256 over the UTF-8 password and the salt text.
//!
//! # Invariants
//! - Salts are alphanumeric chars from a thread-local CSPRNG.
//! - New hashes fit the 100-char user `password` limit.
//! - Verification compares digests in constant time.
//! - Malformed stored hashes verify as `false`, never as an error.

use pbkdf2::pbkdf2_hmac;
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::Sha256;
use subtle::ConstantTimeEq;

const METHOD: &str = "pbkdf2:sha256";
const SALT_CHARS: usize = 12;
const DIGEST_BYTES: usize = 32;
/// Iteration count for new hashes; stored hashes carry their own count.
pub const DEFAULT_ITERATIONS: u32 = 260_000;
const MAX_ITERATIONS: u32 = 1_000_000;

/// Hashes `password` with a fresh random salt.
pub fn generate_password_hash(password: &str) -> String {
    let salt: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SALT_CHARS)
        .map(char::from)
        .collect();
    let digest = derive(&salt, password, DEFAULT_ITERATIONS);
    format!("{METHOD}:{DEFAULT_ITERATIONS}${salt}${}", hex::encode(digest))
}

/// Checks `password` against a stored `pbkdf2:sha256` hash.
pub fn check_password_hash(stored: &str, password: &str) -> bool {
    let Some((iterations, salt, expected)) = parse_stored(stored) else {
        return false;
    };
    let actual = derive(salt, password, iterations);
    actual.as_slice().ct_eq(expected.as_slice()).into()
}

fn parse_stored(stored: &str) -> Option<(u32, &str, Vec<u8>)> {
    let rest = stored.strip_prefix(METHOD)?.strip_prefix(':')?;
    let mut parts = rest.splitn(3, '$');
    let iterations: u32 = parts.next()?.parse().ok()?;
    let salt = parts.next()?;
    let digest = hex::decode(parts.next()?).ok()?;
    if iterations == 0
        || iterations > MAX_ITERATIONS
        || salt.is_empty()
        || digest.len() != DIGEST_BYTES
    {
        return None;
    }
    Some((iterations, salt, digest))
}

fn derive(salt: &str, password: &str, iterations: u32) -> [u8; DIGEST_BYTES] {
    let mut digest = [0_u8; DIGEST_BYTES];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), iterations, &mut digest);
    digest
}

#[cfg(test)]
mod tests {
    use super::{check_password_hash, generate_password_hash};

    #[test]
    fn generated_hash_verifies_only_the_same_password() {
        let stored = generate_password_hash("123456");
        assert!(stored.starts_with("pbkdf2:sha256:260000$"));
        assert!(check_password_hash(&stored, "123456"));
        assert!(!check_password_hash(&stored, "1234567"));
    }

    #[test]
    fn verifies_hashes_from_other_pbkdf2_sha256_producers() {
        let stored = "pbkdf2:sha256:1000$Zc4vQf1kLs8a$\
                      06816bee5190b148f85d521d2cf2ade68240de302fc3839f7a4d49f748d9371d";
        assert!(check_password_hash(stored, "123456"));
        assert!(!check_password_hash(stored, "654321"));

        let stored = "pbkdf2:sha256:2$abcDEF123456$\
                      456f30e16af72c1458acb6a5155ba8fb92ea653198cd421588453390d0e42c7e";
        assert!(check_password_hash(stored, "东方不败"));
    }

    #[test]
    fn same_password_gets_different_salts() {
        assert_ne!(generate_password_hash("pw"), generate_password_hash("pw"));
    }

    #[test]
    fn hash_fits_user_password_column() {
        assert!(generate_password_hash("a long passphrase of sorts").chars().count() <= 100);
    }

    #[test]
    fn malformed_hashes_never_verify() {
        for stored in [
            "",
            "plain-text",
            "sha256:1$salt$00",
            "pbkdf2:md5:1$salt$00",
            "pbkdf2:sha256:abc$salt$00",
            "pbkdf2:sha256:0$salt$00",
            "pbkdf2:sha256:1$salt$not-hex",
            "pbkdf2:sha256:1$$0000",
            "pbkdf2:sha256:1$salt$0000",
        ] {
            assert!(!check_password_hash(stored, "anything"), "{stored}");
        }
    }
}
