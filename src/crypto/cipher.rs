//! AES-256-GCM field-level encryption
//!
//! Authenticated encryption of a single numeric value at a time. Each call
//! generates a fresh random nonce, so encrypting the same value twice
//! yields different envelopes. The envelope is self-contained:
//! `base64(IV || ciphertext || tag)` stored as one opaque string in place
//! of the plaintext number.

use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use aes_gcm::aead::rand_core::RngCore;
use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::{GuardError, GuardResult};

use super::EncryptionKey;

/// Size of the AES-GCM nonce in bytes (96 bits)
pub const NONCE_SIZE: usize = 12;

/// Size of the GCM authentication tag in bytes (128 bits)
pub const TAG_SIZE: usize = 16;

/// Encrypt a single numeric value.
///
/// `None` maps to `None`: absent data produces no envelope, and this is a
/// pass-through rather than an error. The value is serialized as its
/// shortest round-trip decimal representation before encryption, so
/// `decrypt_value` recovers it exactly.
///
/// Neither the plaintext nor the key is ever logged here.
pub fn encrypt_value(key: &EncryptionKey, value: Option<f64>) -> GuardResult<Option<String>> {
    let value = match value {
        Some(v) => v,
        None => return Ok(None),
    };

    if !value.is_finite() {
        // NaN and infinities have no canonical decimal form
        return Err(GuardError::Encryption);
    }

    let plaintext = value.to_string();

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| GuardError::Encryption)?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    // aes-gcm appends the 16-byte tag to the ciphertext
    let ciphertext = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|_| GuardError::Encryption)?;

    let mut envelope = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    envelope.extend_from_slice(&nonce_bytes);
    envelope.extend_from_slice(&ciphertext);

    Ok(Some(STANDARD.encode(envelope)))
}

/// Decrypt a single envelope back to its numeric value.
///
/// `None` or an empty string maps to `None`. Every failure cause (tag
/// verification, malformed base64, short envelope, invalid UTF-8,
/// non-numeric payload) collapses into the same opaque
/// [`GuardError::Decryption`] so callers cannot be used as a padding or
/// format oracle. The distinction is logged at debug level with static
/// strings only.
pub fn decrypt_value(key: &EncryptionKey, envelope: Option<&str>) -> GuardResult<Option<f64>> {
    let envelope = match envelope {
        Some(e) if !e.is_empty() => e,
        _ => return Ok(None),
    };

    let bytes = STANDARD.decode(envelope).map_err(|_| {
        tracing::debug!(cause = "encoding", "field decrypt failed");
        GuardError::Decryption
    })?;

    if bytes.len() < NONCE_SIZE + TAG_SIZE {
        tracing::debug!(cause = "truncated", "field decrypt failed");
        return Err(GuardError::Decryption);
    }

    let (nonce_bytes, ciphertext) = bytes.split_at(NONCE_SIZE);
    let nonce = Nonce::from_slice(nonce_bytes);

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| GuardError::Decryption)?;

    // GCM verifies the tag as part of decryption
    let plaintext = cipher.decrypt(nonce, ciphertext).map_err(|_| {
        tracing::debug!(cause = "authentication", "field decrypt failed");
        GuardError::Decryption
    })?;

    let text = String::from_utf8(plaintext).map_err(|_| {
        tracing::debug!(cause = "utf8", "field decrypt failed");
        GuardError::Decryption
    })?;

    let value: f64 = text.parse().map_err(|_| {
        tracing::debug!(cause = "parse", "field decrypt failed");
        GuardError::Decryption
    })?;

    if !value.is_finite() {
        tracing::debug!(cause = "non-finite", "field decrypt failed");
        return Err(GuardError::Decryption);
    }

    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> EncryptionKey {
        EncryptionKey::from_bytes(&[0x42; 32]).unwrap()
    }

    fn other_key() -> EncryptionKey {
        EncryptionKey::from_bytes(&[0x43; 32]).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let key = test_key();
        for value in [0.0, 5000.0, -123.45, 0.01, 9_007_199_254_740_991.0, 1234.5678] {
            let envelope = encrypt_value(&key, Some(value)).unwrap().unwrap();
            let decrypted = decrypt_value(&key, Some(&envelope)).unwrap().unwrap();
            assert_eq!(decrypted, value);
        }
    }

    #[test]
    fn test_null_passthrough() {
        let key = test_key();
        assert_eq!(encrypt_value(&key, None).unwrap(), None);
        assert_eq!(decrypt_value(&key, None).unwrap(), None);
        assert_eq!(decrypt_value(&key, Some("")).unwrap(), None);
    }

    #[test]
    fn test_fresh_nonce_per_call() {
        let key = test_key();
        let a = encrypt_value(&key, Some(5000.0)).unwrap().unwrap();
        let b = encrypt_value(&key, Some(5000.0)).unwrap().unwrap();
        assert_ne!(a, b);
        assert_eq!(decrypt_value(&key, Some(&a)).unwrap(), Some(5000.0));
        assert_eq!(decrypt_value(&key, Some(&b)).unwrap(), Some(5000.0));
    }

    #[test]
    fn test_tamper_detection_every_byte() {
        let key = test_key();
        let envelope = encrypt_value(&key, Some(5000.0)).unwrap().unwrap();
        let bytes = STANDARD.decode(&envelope).unwrap();

        // Flip one byte at every position in the ciphertext+tag region
        for i in NONCE_SIZE..bytes.len() {
            let mut tampered = bytes.clone();
            tampered[i] ^= 0x01;
            let tampered_envelope = STANDARD.encode(&tampered);
            let result = decrypt_value(&key, Some(&tampered_envelope));
            assert!(
                matches!(result, Err(GuardError::Decryption)),
                "byte {} flip was not detected",
                i
            );
        }
    }

    #[test]
    fn test_wrong_key_rejected() {
        let envelope = encrypt_value(&test_key(), Some(5000.0)).unwrap().unwrap();
        let result = decrypt_value(&other_key(), Some(&envelope));
        assert!(matches!(result, Err(GuardError::Decryption)));
    }

    #[test]
    fn test_malformed_envelope_rejected() {
        let key = test_key();
        // Not base64
        assert!(decrypt_value(&key, Some("!!not-base64!!")).is_err());
        // Too short to hold nonce + tag
        let short = STANDARD.encode([0u8; 8]);
        assert!(decrypt_value(&key, Some(&short)).is_err());
    }

    #[test]
    fn test_non_numeric_payload_rejected() {
        // Build a valid envelope whose payload is not a number
        let key = test_key();
        let cipher = Aes256Gcm::new_from_slice(key.as_bytes()).unwrap();
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);
        let ciphertext = cipher.encrypt(nonce, b"not a number".as_ref()).unwrap();

        let mut envelope = nonce_bytes.to_vec();
        envelope.extend_from_slice(&ciphertext);
        let encoded = STANDARD.encode(envelope);

        let result = decrypt_value(&key, Some(&encoded));
        assert!(matches!(result, Err(GuardError::Decryption)));
    }

    #[test]
    fn test_non_finite_input_rejected() {
        let key = test_key();
        assert!(encrypt_value(&key, Some(f64::NAN)).is_err());
        assert!(encrypt_value(&key, Some(f64::INFINITY)).is_err());
    }
}
