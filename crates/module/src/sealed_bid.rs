//! The sealed-bid auction sale.
//!
//! Investors commit capital together with a bid amount encrypted under the
//! auction public key. After the refund window the operator locks
//! cancellation, then publishes the results along with the private key,
//! which makes every bid decryptable by anyone.

use tracing::{info, warn};

use sale_crypto::{
    decode_sealed_bid, eth_signed_message_hash, investment_authorization_digest, is_private_key_valid,
    open_sealed_bid, recover_signer, verify_sealed_bid, CryptoError,
};
use sale_types::{Address, SaleEvent, SalePhase, SealedBidAuctionState, Signature, Word, ZERO_ADDRESS};

use crate::error::SaleError;
use crate::handlers::{CallContext, HandlerResult};
use crate::host::{AddressRegistry, Env};
use crate::lifecycle::{resolve_roles, SaleLifecycle};
use crate::params::{PeriodLimits, SaleInitParams};
use crate::state::SaleState;

/// Results the operator publishes in one step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaleResults {
    pub claim_merkle_root: Word,
    pub accepted_merkle_root: Word,
    pub tokens_allocated: u128,
    pub capital_raised: u128,
    pub private_key: Word,
}

/// A sealed-bid sale instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SealedBidAuctionSale {
    pub state: SaleState,
    pub auction: SealedBidAuctionState,
}

impl SealedBidAuctionSale {
    /// Validate `params` and create a sale starting at `now`.
    pub fn initialize(
        params: SaleInitParams,
        limits: &PeriodLimits,
        sale_address: Address,
        now: u64,
        registry: &dyn AddressRegistry,
    ) -> HandlerResult<Self> {
        params.validate(limits)?;
        let schedule = params.schedule(now)?;

        let roles = resolve_roles(registry);
        if roles.operator == ZERO_ADDRESS || roles.signer == ZERO_ADDRESS || roles.fee_receiver == ZERO_ADDRESS {
            return Err(SaleError::ZeroAddressProvided);
        }

        info!(
            sale = ?sale_address,
            start_time = schedule.start_time,
            end_time = schedule.end_time,
            refund_end_time = schedule.refund_end_time,
            lockup_end_time = schedule.lockup_end_time,
            "sealed bid sale initialized"
        );

        Ok(Self {
            state: SaleState::new(sale_address, params.configuration(), params.vesting.clone(), schedule, roles),
            auction: SealedBidAuctionState {
                public_key: params.public_key,
                private_key: None,
                cancel_locked: false,
            },
        })
    }

    /// Invest `amount` of the bid token with an encrypted bid.
    pub fn invest(
        &mut self,
        ctx: &CallContext,
        env: &mut Env<'_>,
        amount: u128,
        sealed_bid: &[u8],
        signature: &Signature,
    ) -> HandlerResult<()> {
        let investor = ctx.sender;
        let state = &mut self.state;
        state.verify_not_paused()?;

        let digest = eth_signed_message_hash(&investment_authorization_digest(&investor, &state.address, ctx.chain_id));
        let signer = recover_signer(&digest, signature).map_err(|_| SaleError::InvalidSignature)?;
        if signer != state.roles.signer {
            return Err(SaleError::InvalidSignature);
        }

        state.verify_sale_not_ended(ctx.timestamp)?;
        state.verify_not_canceled()?;
        if amount < state.config.minimum_invest_amount {
            return Err(SaleError::InvestmentBelowMinimum {
                minimum: state.config.minimum_invest_amount,
                got: amount,
            });
        }
        state.verify_has_not_refunded(&investor)?;

        let bid = decode_sealed_bid(sealed_bid).map_err(|_| SaleError::InvalidSealedBidEncoding)?;
        verify_sealed_bid(&bid, &self.auction.public_key, &investor).map_err(|e| match e {
            CryptoError::PublicKeyMismatch => SaleError::InvalidBidPublicKey,
            _ => SaleError::InvalidSalt,
        })?;

        state.credit(&investor, amount)?;
        state.emit(SaleEvent::CapitalInvested {
            amount,
            encrypted_amount_out: bid.encrypted_amount_out,
            salt: bid.salt,
            investor,
            invested_at: ctx.timestamp,
        });
        info!(investor = ?investor, amount, "capital invested");

        let sale = state.address;
        env.tokens
            .transfer_from(&state.config.bid_token, &sale, &investor, &sale, amount)?;
        Ok(())
    }

    /// Lock cancellation ahead of publishing the private key.
    pub fn initialize_publish_sale_results(&mut self, ctx: &CallContext) -> HandlerResult<()> {
        let results_published = self.results_published();
        self.state.verify_operator(&ctx.sender)?;
        self.state.verify_not_canceled()?;
        if self.auction.cancel_locked {
            return Err(SaleError::CancelLocked);
        }
        self.state.verify_refund_period_over(ctx.timestamp)?;
        if results_published {
            return Err(SaleError::SaleResultsAlreadyPublished);
        }

        self.auction.cancel_locked = true;
        self.state.emit(SaleEvent::PublishSaleResultsInitialized);
        info!("cancellation locked for result publication");
        Ok(())
    }

    /// Publish results and the auction private key.
    pub fn publish_sale_results(&mut self, ctx: &CallContext, results: SaleResults) -> HandlerResult<()> {
        self.state.verify_operator(&ctx.sender)?;
        if !self.auction.cancel_locked {
            return Err(SaleError::CancelNotLocked);
        }
        self.state.verify_not_canceled()?;
        self.state.verify_refund_period_over(ctx.timestamp)?;
        if self.auction.private_key.is_some() {
            return Err(SaleError::PrivateKeyAlreadyPublished);
        }
        if self.state.status.results_published() {
            return Err(SaleError::SaleResultsAlreadyPublished);
        }
        if !is_private_key_valid(&results.private_key, &self.auction.public_key) {
            warn!("published private key does not match the auction public key");
            return Err(SaleError::InvalidBidPrivateKey);
        }

        let status = &mut self.state.status;
        status.claim_tokens_merkle_root = results.claim_merkle_root;
        status.accepted_capital_merkle_root = results.accepted_merkle_root;
        status.total_tokens_allocated = results.tokens_allocated;
        status.total_capital_raised = results.capital_raised;
        self.auction.private_key = Some(results.private_key);

        self.state.emit(SaleEvent::SaleResultsPublished {
            claim_merkle_root: results.claim_merkle_root,
            accepted_merkle_root: results.accepted_merkle_root,
            tokens_allocated: results.tokens_allocated,
            capital_raised: results.capital_raised,
            private_key: results.private_key,
        });
        info!(
            tokens_allocated = results.tokens_allocated,
            capital_raised = results.capital_raised,
            "sale results published"
        );
        Ok(())
    }

    /// Decrypt a bid once the private key is public.
    pub fn decrypt_sealed_bid(&self, encrypted_amount_out: &Word, salt: &Word) -> HandlerResult<u128> {
        let private_key = self.auction.private_key.ok_or(SaleError::PrivateKeyNotPublished)?;
        open_sealed_bid(encrypted_amount_out, salt, &self.auction.public_key, &private_key).map_err(|e| match e {
            CryptoError::DecryptedAmountOutOfRange => SaleError::InvalidDecryptedAmount,
            _ => SaleError::InvalidBidPrivateKey,
        })
    }
}

impl SaleLifecycle for SealedBidAuctionSale {
    fn state(&self) -> &SaleState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut SaleState {
        &mut self.state
    }

    fn results_published(&self) -> bool {
        self.state.status.results_published() || self.auction.private_key.is_some()
    }

    fn verify_can_cancel(&self) -> HandlerResult<()> {
        if self.auction.cancel_locked {
            return Err(SaleError::CancelLocked);
        }
        self.state.verify_not_canceled()?;
        self.verify_results_not_published()
    }

    fn phase(&self, now: u64) -> SalePhase {
        let status = &self.state.status;
        if status.is_canceled {
            SalePhase::Canceled
        } else if status.capital_withdrawn {
            SalePhase::Settled
        } else if self.results_published() {
            SalePhase::ResultsPublished
        } else if self.auction.cancel_locked {
            SalePhase::PublishInitialized
        } else if now < self.state.schedule.end_time {
            SalePhase::Open
        } else {
            SalePhase::Ended
        }
    }
}
