//! ECIES-style masking of 256-bit values over alt_bn128.
//!
//! # Encryption
//!
//! To encrypt a word `m` to public key `P` with scalar `k` and salt `s`:
//! 1. Compute the shared point `S = k·P`
//! 2. Derive the mask `keccak256(S.x || s)`
//! 3. Output `m XOR mask` together with the ephemeral key `E = k·G`
//!
//! # Decryption
//!
//! Given the private key `d` of `P`, recompute `S = d·E` and unmask.

use sale_types::{keccak256, xor_words, CurvePoint, Word};

use crate::curve::{public_key_from_private, shared_secret};
use crate::error::CryptoError;

/// Encrypt `message` to `public_key` using `private_scalar`.
///
/// # Returns
/// A tuple of (ciphertext, ephemeral public key)
pub fn encrypt(
    message: &Word,
    public_key: &CurvePoint,
    private_scalar: &Word,
    salt: &Word,
) -> Result<(Word, CurvePoint), CryptoError> {
    let shared = shared_secret(public_key, private_scalar)?;
    let ephemeral_public_key = public_key_from_private(private_scalar)?;
    Ok((xor_words(message, &mask(&shared, salt)), ephemeral_public_key))
}

/// Decrypt `ciphertext` produced against `ephemeral_public_key`.
pub fn decrypt(
    ciphertext: &Word,
    ephemeral_public_key: &CurvePoint,
    private_key: &Word,
    salt: &Word,
) -> Result<Word, CryptoError> {
    let shared = shared_secret(ephemeral_public_key, private_key)?;
    Ok(xor_words(ciphertext, &mask(&shared, salt)))
}

/// Keystream word bound to the shared point and the salt.
fn mask(shared: &CurvePoint, salt: &Word) -> Word {
    let mut preimage = [0u8; 64];
    preimage[..32].copy_from_slice(&shared.x);
    preimage[32..].copy_from_slice(salt);
    keccak256(&preimage)
}
