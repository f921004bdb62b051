//! Sealed bid creation.
//!
//! A bid embeds the auction public key as its ephemeral key, so sealing is
//! done by whoever holds the auction keypair on the investor's behalf.

use thiserror::Error;

use sale_crypto::{encode_sealed_bid, seal_bid, AuctionKeypair, CryptoError};
use sale_module::SaleCall;
use sale_types::{Address, SealedBid, Signature, ZERO_ADDRESS};

/// Errors that can occur while preparing client payloads.
#[derive(Debug, Error)]
pub enum SealError {
    #[error("Investor address not set")]
    MissingInvestor,

    #[error("Zero investor address")]
    ZeroInvestor,

    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    #[error("Invalid length: expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("Investor {0} listed twice")]
    DuplicateInvestor(String),

    #[error("Accepted capital exceeds invested capital for {0}")]
    AcceptedExceedsInvested(String),

    #[error("No allocations")]
    NoAllocations,

    #[error("Amount overflow")]
    AmountOverflow,

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

/// A sealed bid ready for submission.
#[derive(Debug, Clone)]
pub struct PreparedBid {
    pub investor: Address,
    /// Bid amount (secret until the private key is published)
    pub amount_out: u128,
    pub sealed_bid: SealedBid,
    /// ABI encoding submitted with the investment
    pub encoded: Vec<u8>,
}

impl PreparedBid {
    /// The investment call carrying this bid.
    pub fn into_invest_call(self, amount: u128, signature: Signature) -> SaleCall {
        SaleCall::Invest {
            amount,
            sealed_bid: self.encoded,
            signature,
        }
    }
}

/// Seal `amount_out` for `investor`.
pub fn create_sealed_bid(
    keypair: &AuctionKeypair,
    investor: &Address,
    amount_out: u128,
) -> Result<PreparedBid, SealError> {
    if *investor == ZERO_ADDRESS {
        return Err(SealError::ZeroInvestor);
    }
    let sealed_bid = seal_bid(amount_out, investor, keypair)?;
    Ok(PreparedBid {
        investor: *investor,
        amount_out,
        encoded: encode_sealed_bid(&sealed_bid),
        sealed_bid,
    })
}

/// Builder for sealed bids.
pub struct SealedBidBuilder {
    keypair: AuctionKeypair,
    investor: Option<Address>,
    amount_out: u128,
}

impl SealedBidBuilder {
    pub fn new(keypair: AuctionKeypair) -> Self {
        Self {
            keypair,
            investor: None,
            amount_out: 0,
        }
    }

    pub fn investor(mut self, investor: Address) -> Self {
        self.investor = Some(investor);
        self
    }

    pub fn amount_out(mut self, amount_out: u128) -> Self {
        self.amount_out = amount_out;
        self
    }

    pub fn build(self) -> Result<PreparedBid, SealError> {
        let investor = self.investor.ok_or(SealError::MissingInvestor)?;
        create_sealed_bid(&self.keypair, &investor, self.amount_out)
    }
}
