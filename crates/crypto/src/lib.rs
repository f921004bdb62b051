//! Cryptographic primitives for sealed-bid token sales.
//!
//! This crate implements the commit-reveal encryption of bid amounts on the
//! alt_bn128 curve, plus the supporting primitives the sale engine consumes.
//!
//! # Overview
//!
//! 1. **Curve arithmetic** (`curve`): point validation, scalar multiplication
//!    and the deterministic public/private keypair check.
//!
//! 2. **Encryption** (`ecies`): a bid amount is masked with
//!    `keccak256((k·P).x || salt)`. Only the holder of the auction private key
//!    can recompute the mask.
//!
//! 3. **Sealed bids** (`sealed_bid`): the ABI codec for
//!    `(encryptedAmountOut, salt, publicKey)` and its salt/key binding checks.
//!
//! 4. **Settlement proofs** (`merkle`): sorted-pair keccak merkle trees over
//!    `(investor, amount)` leaves.
//!
//! 5. **Authorization** (`signature`): secp256k1 signer recovery for
//!    investment permits.

pub mod curve;
pub mod ecies;
pub mod error;
pub mod merkle;
pub mod sealed_bid;
pub mod signature;

pub use curve::{
    is_private_key_valid, is_valid, public_key_from_private, scalar_multiply, shared_secret,
    AuctionKeypair,
};
pub use error::CryptoError;
pub use merkle::{investor_leaf, MerkleTree};
pub use sealed_bid::{decode_sealed_bid, encode_sealed_bid, open_sealed_bid, seal_bid, verify_sealed_bid};
pub use signature::{eth_signed_message_hash, investment_authorization_digest, recover_signer, sign_digest};
