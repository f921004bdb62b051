//! Error types for cryptographic operations.

use thiserror::Error;

/// Errors that can occur during cryptographic operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("Point not on curve")]
    PointNotOnCurve,

    #[error("Point at infinity is not a valid key")]
    PointAtInfinity,

    #[error("Invalid scalar encoding")]
    InvalidScalar,

    #[error("Invalid sealed bid encoding: expected {expected} bytes, got {got}")]
    InvalidSealedBidEncoding { expected: usize, got: usize },

    #[error("Sealed bid public key does not match the auction key")]
    PublicKeyMismatch,

    #[error("Sealed bid salt does not match the investor")]
    SaltMismatch,

    #[error("Decrypted amount does not fit in 128 bits")]
    DecryptedAmountOutOfRange,

    #[error("Invalid signature encoding")]
    InvalidSignatureEncoding,

    #[error("Signature recovery failed")]
    SignatureRecoveryFailed,

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Merkle tree has no leaves")]
    EmptyMerkleTree,
}
