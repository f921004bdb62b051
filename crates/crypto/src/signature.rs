//! Investment authorization signatures (secp256k1, Ethereum conventions).
//!
//! The signer authorizes an investor for one sale on one chain by signing
//! `keccak256(investor || sale || chainId)` as an Ethereum signed message.
//! Signatures are 65 bytes `r || s || v` and must be low-s.

use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, SigningKey, VerifyingKey};

use sale_types::{keccak256, Address, Signature, Word};

use crate::error::CryptoError;

/// Digest binding an investor to a sale deployment and chain.
pub fn investment_authorization_digest(investor: &Address, sale: &Address, chain_id: u64) -> Word {
    let mut packed = [0u8; 72];
    packed[..20].copy_from_slice(investor);
    packed[20..40].copy_from_slice(sale);
    packed[64..].copy_from_slice(&chain_id.to_be_bytes());
    keccak256(&packed)
}

/// `keccak256("\x19Ethereum Signed Message:\n32" || hash)`.
pub fn eth_signed_message_hash(hash: &Word) -> Word {
    let mut preimage = Vec::with_capacity(60);
    preimage.extend_from_slice(b"\x19Ethereum Signed Message:\n32");
    preimage.extend_from_slice(hash);
    keccak256(&preimage)
}

/// Recover the signer address of `digest`.
pub fn recover_signer(digest: &Word, signature: &Signature) -> Result<Address, CryptoError> {
    let bytes = &signature.0;
    let v = match bytes[64] {
        27 | 28 => bytes[64] - 27,
        0 | 1 => bytes[64],
        _ => return Err(CryptoError::InvalidSignatureEncoding),
    };

    let sig = EcdsaSignature::from_slice(&bytes[..64]).map_err(|_| CryptoError::InvalidSignatureEncoding)?;
    // Reject high-s signatures to prevent malleability
    if sig.normalize_s().is_some() {
        return Err(CryptoError::InvalidSignatureEncoding);
    }

    let recovery_id = RecoveryId::from_byte(v).ok_or(CryptoError::InvalidSignatureEncoding)?;
    let key = VerifyingKey::recover_from_prehash(digest, &sig, recovery_id)
        .map_err(|_| CryptoError::SignatureRecoveryFailed)?;
    Ok(address_from_verifying_key(&key))
}

/// Sign `digest` with `signing_key`, returning `r || s || v` with `v ∈ {27, 28}`.
pub fn sign_digest(signing_key: &SigningKey, digest: &Word) -> Result<Signature, CryptoError> {
    let (sig, recovery_id) = signing_key
        .sign_prehash_recoverable(digest)
        .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;

    let mut out = [0u8; 65];
    out[..64].copy_from_slice(&sig.to_bytes());
    out[64] = recovery_id.to_byte() + 27;
    Ok(Signature(out))
}

/// Ethereum address of a verifying key.
pub fn address_from_verifying_key(key: &VerifyingKey) -> Address {
    let uncompressed = key.to_encoded_point(false);
    let hash = keccak256(&uncompressed.as_bytes()[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

/// Ethereum address of a signing key.
pub fn signer_address(signing_key: &SigningKey) -> Address {
    address_from_verifying_key(signing_key.verifying_key())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn test_sign_and_recover() {
        let signer = SigningKey::random(&mut OsRng);
        let digest = eth_signed_message_hash(&investment_authorization_digest(&[1u8; 20], &[2u8; 20], 1));

        let signature = sign_digest(&signer, &digest).unwrap();
        assert!(signature.0[64] == 27 || signature.0[64] == 28);
        assert_eq!(recover_signer(&digest, &signature).unwrap(), signer_address(&signer));
    }

    #[test]
    fn test_digest_binds_chain_and_sale() {
        let base = investment_authorization_digest(&[1u8; 20], &[2u8; 20], 1);
        assert_ne!(base, investment_authorization_digest(&[1u8; 20], &[2u8; 20], 5));
        assert_ne!(base, investment_authorization_digest(&[1u8; 20], &[3u8; 20], 1));
        assert_ne!(base, investment_authorization_digest(&[4u8; 20], &[2u8; 20], 1));
    }

    #[test]
    fn test_signature_for_other_digest_recovers_other_address() {
        let signer = SigningKey::random(&mut OsRng);
        let digest = eth_signed_message_hash(&investment_authorization_digest(&[1u8; 20], &[2u8; 20], 1));
        let replayed = eth_signed_message_hash(&investment_authorization_digest(&[1u8; 20], &[9u8; 20], 1));

        let signature = sign_digest(&signer, &digest).unwrap();
        let recovered = recover_signer(&replayed, &signature);
        assert!(recovered.map(|a| a != signer_address(&signer)).unwrap_or(true));
    }

    #[test]
    fn test_invalid_v_is_rejected() {
        let signer = SigningKey::random(&mut OsRng);
        let digest = [5u8; 32];
        let mut signature = sign_digest(&signer, &digest).unwrap();
        signature.0[64] = 30;
        assert_eq!(
            recover_signer(&digest, &signature),
            Err(CryptoError::InvalidSignatureEncoding)
        );
    }

    #[test]
    fn test_high_s_twin_is_rejected() {
        let signer = SigningKey::random(&mut OsRng);
        let digest = [5u8; 32];
        let signature = sign_digest(&signer, &digest).unwrap();

        let low = EcdsaSignature::from_slice(&signature.0[..64]).unwrap();
        let (r, s) = low.split_scalars();
        let high = EcdsaSignature::from_scalars(r, -s).unwrap();
        assert!(high.normalize_s().is_some());

        let mut twin = [0u8; 65];
        twin[..64].copy_from_slice(&high.to_bytes());
        // Negating s flips the recovery parity
        twin[64] = if signature.0[64] == 27 { 28 } else { 27 };
        assert_eq!(
            recover_signer(&digest, &Signature(twin)),
            Err(CryptoError::InvalidSignatureEncoding)
        );
    }

    #[test]
    fn test_zero_signature_is_rejected() {
        assert!(recover_signer(&[5u8; 32], &Signature([0u8; 65])).is_err());
    }
}
