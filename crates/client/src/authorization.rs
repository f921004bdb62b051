//! Investment authorization signing.

use k256::ecdsa::SigningKey;

use sale_crypto::signature::signer_address;
use sale_crypto::{eth_signed_message_hash, investment_authorization_digest, sign_digest};
use sale_types::{Address, Signature};

use crate::bid::SealError;
use crate::encoding::parse_word;

/// Signs investment permits for one chain.
pub struct InvestmentAuthorizer {
    signing_key: SigningKey,
    chain_id: u64,
}

impl InvestmentAuthorizer {
    pub fn new(signing_key: SigningKey, chain_id: u64) -> Self {
        Self { signing_key, chain_id }
    }

    /// Load a signer from a hex-encoded 32-byte secret.
    pub fn from_hex(secret: &str, chain_id: u64) -> Result<Self, SealError> {
        let bytes = parse_word(secret)?;
        let signing_key = SigningKey::from_slice(&bytes)
            .map_err(|_| SealError::InvalidHex("not a valid secp256k1 secret".to_string()))?;
        Ok(Self::new(signing_key, chain_id))
    }

    /// Address the sale must have registered as signer.
    pub fn address(&self) -> Address {
        signer_address(&self.signing_key)
    }

    /// Authorize `investor` to invest in `sale`.
    pub fn authorize(&self, investor: &Address, sale: &Address) -> Result<Signature, SealError> {
        let digest = eth_signed_message_hash(&investment_authorization_digest(investor, sale, self.chain_id));
        Ok(sign_digest(&self.signing_key, &digest)?)
    }
}
