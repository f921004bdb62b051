//! Sealed-bid codec.
//!
//! A sealed bid travels as the ABI encoding of
//! `(uint256 encryptedAmountOut, uint256 salt, (uint256 x, uint256 y) publicKey)`,
//! i.e. four consecutive 32-byte words. The embedded public key doubles as
//! the ephemeral key of the encryption, so a bid is only decryptable with the
//! auction private key when it equals the auction public key.

use sale_types::{investor_salt, word_from_u128, word_to_u128, Address, CurvePoint, SealedBid, Word};

use crate::curve::AuctionKeypair;
use crate::ecies;
use crate::error::CryptoError;

/// Encoded length of a sealed bid.
pub const SEALED_BID_LEN: usize = 128;

/// ABI-encode a sealed bid.
pub fn encode_sealed_bid(bid: &SealedBid) -> Vec<u8> {
    let mut out = Vec::with_capacity(SEALED_BID_LEN);
    out.extend_from_slice(&bid.encrypted_amount_out);
    out.extend_from_slice(&bid.salt);
    out.extend_from_slice(&bid.public_key.x);
    out.extend_from_slice(&bid.public_key.y);
    out
}

/// Decode an ABI-encoded sealed bid.
pub fn decode_sealed_bid(bytes: &[u8]) -> Result<SealedBid, CryptoError> {
    if bytes.len() != SEALED_BID_LEN {
        return Err(CryptoError::InvalidSealedBidEncoding {
            expected: SEALED_BID_LEN,
            got: bytes.len(),
        });
    }
    let word = |i: usize| -> Word {
        let mut w = [0u8; 32];
        w.copy_from_slice(&bytes[i * 32..(i + 1) * 32]);
        w
    };
    Ok(SealedBid {
        encrypted_amount_out: word(0),
        salt: word(1),
        public_key: CurvePoint::new(word(2), word(3)),
    })
}

/// Check a bid against the auction key and the submitting investor.
pub fn verify_sealed_bid(
    bid: &SealedBid,
    auction_public_key: &CurvePoint,
    investor: &Address,
) -> Result<(), CryptoError> {
    if bid.public_key != *auction_public_key {
        return Err(CryptoError::PublicKeyMismatch);
    }
    if bid.salt != investor_salt(investor) {
        return Err(CryptoError::SaltMismatch);
    }
    Ok(())
}

/// Seal `amount` for `investor` under the auction keypair.
///
/// Sealing requires the auction private key and is performed by the
/// keyholder on the investor's behalf before publication.
pub fn seal_bid(amount: u128, investor: &Address, keypair: &AuctionKeypair) -> Result<SealedBid, CryptoError> {
    let salt = investor_salt(investor);
    let (encrypted_amount_out, ephemeral) =
        ecies::encrypt(&word_from_u128(amount), &keypair.public_key, &keypair.private_key, &salt)?;
    Ok(SealedBid {
        encrypted_amount_out,
        salt,
        public_key: ephemeral,
    })
}

/// Recover the bid amount once the private key is known.
pub fn open_sealed_bid(
    encrypted_amount_out: &Word,
    salt: &Word,
    public_key: &CurvePoint,
    private_key: &Word,
) -> Result<u128, CryptoError> {
    let amount = ecies::decrypt(encrypted_amount_out, public_key, private_key, salt)?;
    word_to_u128(&amount).ok_or(CryptoError::DecryptedAmountOutOfRange)
}
