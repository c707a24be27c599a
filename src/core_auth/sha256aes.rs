//! Salted password hashing in the `$5a$<salt>$<digest>` format.
//!
//! The construction comes from a resource-constrained target with no
//! bcrypt or SHA-512 available: the cleartext is zero-padded to the AES
//! block boundary, encrypted in ECB mode with the salt as the key, and the
//! stored digest is the base64 SHA-256 of the ciphertext. It is kept here
//! for interoperability with existing credential entries and is not a
//! recommended password-hashing primitive.

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncrypt, KeyInit};
use aes::{Aes128, Aes256};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::core_auth::error::CredentialError;

/// Tag identifying this scheme in stored records. Made up, not a standard.
pub const METHOD_TOKEN: &str = "5a";

const SALT_ALPHABET: &[u8] =
    b"./0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
const BLOCK_SIZE: usize = 16;

/// Generates a random salt suitable for password hashing. The length must
/// be an AES key size, so 16 is what callers normally want.
pub fn generate_salt(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| SALT_ALPHABET[rng.gen_range(0..SALT_ALPHABET.len())] as char)
        .collect()
}

/// Given a salt and a cleartext password, returns the base64 digest.
///
/// Padding always adds at least one byte: a cleartext already on the block
/// boundary gains a full block of zeros. That quirk is part of the wire
/// format and must not be "fixed".
pub fn create_salted_hash(salt: &str, cleartext: &str) -> Result<String, CredentialError> {
    let key = salt.as_bytes();
    let mut buffer = cleartext.as_bytes().to_vec();
    let padding = BLOCK_SIZE - (buffer.len() % BLOCK_SIZE);
    buffer.extend(std::iter::repeat(0u8).take(padding));

    match key.len() {
        16 => {
            let cipher = Aes128::new(GenericArray::from_slice(key));
            for block in buffer.chunks_mut(BLOCK_SIZE) {
                cipher.encrypt_block(GenericArray::from_mut_slice(block));
            }
        }
        32 => {
            let cipher = Aes256::new(GenericArray::from_slice(key));
            for block in buffer.chunks_mut(BLOCK_SIZE) {
                cipher.encrypt_block(GenericArray::from_mut_slice(block));
            }
        }
        other => return Err(CredentialError::BadSaltLength(other)),
    }

    Ok(BASE64.encode(Sha256::digest(&buffer)))
}

/// Builds a complete `$5a$<salt>$<digest>` credential entry.
pub fn create_passwd_entry(cleartext: &str) -> Result<String, CredentialError> {
    let salt = generate_salt(16);
    let hashed = create_salted_hash(&salt, cleartext)?;
    Ok(format!("${}${}${}", METHOD_TOKEN, salt, hashed))
}

/// Verifies a cleartext password against a stored `$5a$...` entry.
pub fn verify_passwd_entry(hashed: &str, cleartext: &str) -> bool {
    let parts: Vec<&str> = hashed.split('$').collect();
    if parts.len() != 4 || !parts[0].is_empty() {
        log::warn!("Invalid hashed password format.");
        return false;
    }
    if parts[1] != METHOD_TOKEN {
        log::warn!("Unsupported hash algorithm: {}", parts[1]);
        return false;
    }
    match create_salted_hash(parts[2], cleartext) {
        Ok(rehashed) => rehashed == parts[3],
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_verifies() {
        let entry = create_passwd_entry("secret").unwrap();
        assert!(verify_passwd_entry(&entry, "secret"));
        assert!(!verify_passwd_entry(&entry, "Secret"));
        assert!(!verify_passwd_entry(&entry, ""));
    }

    #[test]
    fn entry_has_the_expected_shape() {
        let entry = create_passwd_entry("friday").unwrap();
        let parts: Vec<&str> = entry.split('$').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[1], METHOD_TOKEN);
        assert_eq!(parts[2].len(), 16);
        assert!(!parts[3].ends_with('\n'));
    }

    #[test]
    fn digest_mutation_is_rejected() {
        let entry = create_passwd_entry("secret").unwrap();
        let digest_start = entry.rfind('$').unwrap() + 1;
        let mut mutated = entry.clone().into_bytes();
        // Flip one digest character to a different valid base64 character.
        mutated[digest_start] = if mutated[digest_start] == b'A' { b'B' } else { b'A' };
        let mutated = String::from_utf8(mutated).unwrap();
        assert_ne!(entry, mutated);
        assert!(!verify_passwd_entry(&mutated, "secret"));
    }

    #[test]
    fn fixed_salt_is_deterministic() {
        let salt = "0123456789abcdef";
        let first = create_salted_hash(salt, "friday").unwrap();
        let second = create_salted_hash(salt, "friday").unwrap();
        assert_eq!(first, second);
        assert_ne!(first, create_salted_hash(salt, "saturday").unwrap());
    }

    #[test]
    fn block_aligned_cleartext_still_gets_padding() {
        // 16 bytes of cleartext pads to 32, not 16. Interop quirk.
        let salt = "0123456789abcdef";
        let aligned = create_salted_hash(salt, "0123456789abcdef").unwrap();
        let shorter = create_salted_hash(salt, "0123456789abcde").unwrap();
        assert_ne!(aligned, shorter);
    }

    #[test]
    fn bad_salt_lengths_are_refused() {
        assert!(matches!(
            create_salted_hash("shortsalt", "pw"),
            Err(CredentialError::BadSaltLength(9))
        ));
    }

    #[test]
    fn thirty_two_byte_salt_selects_aes256() {
        let salt = generate_salt(32);
        let hashed = create_salted_hash(&salt, "pw").unwrap();
        let entry = format!("${}${}${}", METHOD_TOKEN, salt, hashed);
        assert!(verify_passwd_entry(&entry, "pw"));
    }

    #[test]
    fn malformed_entries_are_rejected() {
        assert!(!verify_passwd_entry("not-a-hash", "pw"));
        assert!(!verify_passwd_entry("$5a$salt", "pw"));
        assert!(!verify_passwd_entry("$6b$0123456789abcdef$abc", "pw"));
    }

    #[test]
    fn salt_uses_only_the_documented_alphabet() {
        let salt = generate_salt(64);
        assert_eq!(salt.len(), 64);
        assert!(salt.bytes().all(|b| SALT_ALPHABET.contains(&b)));
    }
}
