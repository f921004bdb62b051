//! Call dispatch for the sale module.

use tracing::debug;

use sale_types::Address;

use crate::call::SaleCall;
use crate::error::SaleError;
use crate::host::Env;
use crate::lifecycle::SaleLifecycle;
use crate::sealed_bid::{SaleResults, SealedBidAuctionSale};

/// Context provided by the runtime for each call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallContext {
    /// Sender of the transaction
    pub sender: Address,
    /// Current block timestamp
    pub timestamp: u64,
    /// Chain the sale is deployed on
    pub chain_id: u64,
}

/// Result type for handlers.
pub type HandlerResult<T> = Result<T, SaleError>;

/// Dispatch a call against a sealed-bid sale.
///
/// A failed call may leave partial writes behind; callers that need
/// atomicity run this inside [`crate::runtime::SaleRuntime::execute`].
pub fn handle_call(
    sale: &mut SealedBidAuctionSale,
    ctx: &CallContext,
    env: &mut Env<'_>,
    call: SaleCall,
) -> HandlerResult<()> {
    debug!(call = call.name(), sender = ?ctx.sender, timestamp = ctx.timestamp, "handling sale call");

    match call {
        SaleCall::Invest {
            amount,
            sealed_bid,
            signature,
        } => sale.invest(ctx, env, amount, &sealed_bid, &signature),
        SaleCall::Refund => sale.refund(ctx, env).map(|_| ()),
        SaleCall::InitializePublishSaleResults => sale.initialize_publish_sale_results(ctx),
        SaleCall::PublishSaleResults {
            claim_merkle_root,
            accepted_merkle_root,
            tokens_allocated,
            capital_raised,
            private_key,
        } => sale.publish_sale_results(
            ctx,
            SaleResults {
                claim_merkle_root,
                accepted_merkle_root,
                tokens_allocated,
                capital_raised,
                private_key,
            },
        ),
        SaleCall::CancelSale => sale.cancel_sale(ctx, env),
        SaleCall::CancelExpiredSale => sale.cancel_expired_sale(ctx),
        SaleCall::WithdrawInvestedCapitalIfCanceled => sale.withdraw_invested_capital_if_canceled(ctx, env).map(|_| ()),
        SaleCall::SupplyTokens {
            amount,
            legion_fee,
            referrer_fee,
        } => sale.supply_tokens(ctx, env, amount, legion_fee, referrer_fee),
        SaleCall::WithdrawRaisedCapital => sale.withdraw_raised_capital(ctx, env).map(|_| ()),
        SaleCall::ClaimTokenAllocation { amount, proof } => {
            sale.claim_token_allocation(ctx, env, amount, &proof).map(|_| ())
        }
        SaleCall::WithdrawExcessInvestedCapital { amount, proof } => {
            sale.withdraw_excess_invested_capital(ctx, env, amount, &proof)
        }
        SaleCall::ReleaseVestedTokens => sale.release_vested_tokens(ctx, env).map(|_| ()),
        SaleCall::EmergencyWithdraw {
            receiver,
            token,
            amount,
        } => sale.emergency_withdraw(ctx, env, receiver, token, amount),
        SaleCall::PauseSale => sale.pause_sale(ctx),
        SaleCall::UnpauseSale => sale.unpause_sale(ctx),
        SaleCall::SyncAddresses => sale.sync_addresses(ctx, env.registry),
    }
}
