//! Query handlers for the sale module.
//!
//! These functions provide read-only access to sale state.

use serde::{Deserialize, Serialize};

use sale_types::{
    Address, InvestorPosition, SaleConfiguration, SaleEvent, SalePhase, SaleSchedule, SaleStatus,
    SealedBidAuctionState, VestingConfiguration, Word,
};

use crate::handlers::HandlerResult;
use crate::lifecycle::SaleLifecycle;
use crate::sealed_bid::SealedBidAuctionSale;

/// Query request types.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaleQuery {
    SaleConfiguration,
    VestingConfiguration,
    Schedule,
    Status,
    /// Auction key material; the private key is only present once published
    AuctionState,
    InvestorPosition { investor: Address },
    /// Phase at the current block time
    Phase,
    DecryptSealedBid { encrypted_amount_out: Word, salt: Word },
    /// Events in emission order (paginated)
    Events { offset: u64, limit: u64 },
}

/// Query response types.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaleQueryResponse {
    SaleConfiguration(SaleConfiguration),
    VestingConfiguration(VestingConfiguration),
    Schedule(SaleSchedule),
    Status(SaleStatus),
    AuctionState(SealedBidAuctionState),
    InvestorPosition(InvestorPosition),
    Phase(SalePhase),
    DecryptedAmount(u128),
    Events(Vec<SaleEvent>),
}

/// Handle a query at block time `now`.
pub fn handle_query(sale: &SealedBidAuctionSale, query: SaleQuery, now: u64) -> HandlerResult<SaleQueryResponse> {
    let state = &sale.state;
    let response = match query {
        SaleQuery::SaleConfiguration => SaleQueryResponse::SaleConfiguration(state.config.clone()),
        SaleQuery::VestingConfiguration => SaleQueryResponse::VestingConfiguration(state.vesting.clone()),
        SaleQuery::Schedule => SaleQueryResponse::Schedule(state.schedule.clone()),
        SaleQuery::Status => SaleQueryResponse::Status(state.status.clone()),
        SaleQuery::AuctionState => SaleQueryResponse::AuctionState(sale.auction.clone()),
        SaleQuery::InvestorPosition { investor } => SaleQueryResponse::InvestorPosition(state.position(&investor)),
        SaleQuery::Phase => SaleQueryResponse::Phase(sale.phase(now)),
        SaleQuery::DecryptSealedBid {
            encrypted_amount_out,
            salt,
        } => SaleQueryResponse::DecryptedAmount(sale.decrypt_sealed_bid(&encrypted_amount_out, &salt)?),
        SaleQuery::Events { offset, limit } => SaleQueryResponse::Events(
            state
                .events
                .iter()
                .skip(offset as usize)
                .take(limit as usize)
                .cloned()
                .collect(),
        ),
    };
    Ok(response)
}
