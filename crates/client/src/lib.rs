//! Client SDK for sealed-bid token sales.
//!
//! This crate provides a high-level API for:
//! - Sealing bid amounts under the auction key
//! - Signing investment authorizations
//! - Decrypting logged bids and building the published results with proofs
//! - Parsing the hex encodings used on the wire

pub mod authorization;
pub mod bid;
pub mod encoding;
pub mod results;

pub use authorization::InvestmentAuthorizer;
pub use bid::{create_sealed_bid, PreparedBid, SealError, SealedBidBuilder};
pub use results::{collect_bids, Allocation, OpenedBid, ResultsBuilder, SaleResultsBundle};
