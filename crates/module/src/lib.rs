//! Sealed-bid token sale engine.
//!
//! This module implements the on-chain side of a sealed-bid sale:
//!
//! - Investment with encrypted bid amounts and signed authorization
//! - Refunds during the refund window and after cancellation
//! - Two-step result publication that reveals the auction private key
//! - Merkle-gated token claims and excess-capital withdrawals
//! - Fee-split withdrawal of raised capital
//!
//! # Architecture
//!
//! - `call`: Message types for state-changing operations
//! - `handlers`: Call dispatch and the per-call context
//! - `lifecycle`: Operations shared by every sale variant
//! - `sealed_bid`: The sealed-bid variant
//! - `settlement`: Merkle-gated settlement and fee math
//! - `ledger`, `guards`: Position accounting and preconditions on `SaleState`
//! - `queries`: Read-only state access
//! - `params`: Initialization parameters
//! - `host`, `memory`: Collaborator traits and in-memory implementations
//! - `runtime`: Atomic execution around a single sale
//!
//! # Example
//!
//! ```ignore
//! use sale_module::{SaleCall, SaleRuntime};
//!
//! let mut runtime = SaleRuntime::new(chain_id, now, registry);
//! runtime.initialize_sale(sale_address, params)?;
//!
//! // Invest with a sealed bid
//! runtime.execute(investor, SaleCall::Invest { amount, sealed_bid, signature })?;
//! ```

pub mod call;
pub mod error;
pub mod guards;
pub mod handlers;
pub mod host;
pub mod ledger;
pub mod lifecycle;
pub mod memory;
pub mod params;
pub mod queries;
pub mod runtime;
pub mod sealed_bid;
pub mod settlement;
pub mod state;

#[cfg(test)]
mod testing;

pub use call::SaleCall;
pub use error::SaleError;
pub use handlers::{handle_call, CallContext, HandlerResult};
pub use host::{AddressRegistry, Env, TokenError, TokenLedger, VestingError, VestingFactory};
pub use lifecycle::SaleLifecycle;
pub use memory::{InMemoryRegistry, InMemoryTokenLedger, InMemoryVestingFactory};
pub use params::{ParamsValidationError, PeriodLimits, SaleInitParams};
pub use queries::{handle_query, SaleQuery, SaleQueryResponse};
pub use runtime::SaleRuntime;
pub use sealed_bid::{SaleResults, SealedBidAuctionSale};
pub use settlement::CapitalSplit;
pub use state::SaleState;
