//! Operations common to every sale variant.
//!
//! A variant owns a [`SaleState`] and supplies its own investment and
//! publication steps. Everything else, from refunds and cancellation to
//! settlement and administration, is provided here and may be narrowed by
//! overriding [`SaleLifecycle::verify_can_cancel`] or
//! [`SaleLifecycle::results_published`].

use tracing::{info, warn};

use sale_types::{
    Address, RoleAddresses, SaleEvent, SalePhase, Word, LEGION_BOUNCER_ID, LEGION_FEE_RECEIVER_ID,
    LEGION_SIGNER_ID, LEGION_VESTING_FACTORY_ID,
};

use crate::error::SaleError;
use crate::handlers::{CallContext, HandlerResult};
use crate::host::{AddressRegistry, Env};
use crate::settlement::{self, CapitalSplit};
use crate::state::SaleState;

/// Resolve the role addresses from a registry.
pub fn resolve_roles(registry: &dyn AddressRegistry) -> RoleAddresses {
    RoleAddresses {
        operator: registry.get_address(&LEGION_BOUNCER_ID),
        fee_receiver: registry.get_address(&LEGION_FEE_RECEIVER_ID),
        signer: registry.get_address(&LEGION_SIGNER_ID),
        vesting_factory: registry.get_address(&LEGION_VESTING_FACTORY_ID),
    }
}

pub trait SaleLifecycle {
    fn state(&self) -> &SaleState;

    fn state_mut(&mut self) -> &mut SaleState;

    /// Whether the operator has published results.
    fn results_published(&self) -> bool {
        self.state().status.results_published()
    }

    /// Preconditions for a project-initiated cancel, beyond authorization.
    fn verify_can_cancel(&self) -> HandlerResult<()> {
        self.state().verify_not_canceled()?;
        if self.results_published() {
            return Err(SaleError::SaleResultsAlreadyPublished);
        }
        Ok(())
    }

    fn verify_results_not_published(&self) -> HandlerResult<()> {
        if self.results_published() {
            return Err(SaleError::SaleResultsAlreadyPublished);
        }
        Ok(())
    }

    /// Current phase at time `now`.
    fn phase(&self, now: u64) -> SalePhase {
        let status = &self.state().status;
        if status.is_canceled {
            SalePhase::Canceled
        } else if status.capital_withdrawn {
            SalePhase::Settled
        } else if self.results_published() {
            SalePhase::ResultsPublished
        } else if now < self.state().schedule.end_time {
            SalePhase::Open
        } else {
            SalePhase::Ended
        }
    }

    /// Return the caller's full position during the refund window.
    fn refund(&mut self, ctx: &CallContext, env: &mut Env<'_>) -> HandlerResult<u128> {
        let investor = ctx.sender;
        let state = self.state_mut();
        state.verify_not_paused()?;
        state.verify_not_canceled()?;
        state.verify_refund_period_not_over(ctx.timestamp)?;
        state.verify_has_not_refunded(&investor)?;

        let amount = state.position(&investor).invested_capital;
        if amount == 0 {
            return Err(SaleError::InvalidRefundAmount);
        }

        state.mark_refunded(&investor);
        state.debit(&investor, amount)?;
        state.emit(SaleEvent::CapitalRefunded { amount, investor });
        info!(investor = ?investor, amount, "capital refunded");

        env.tokens
            .transfer(&state.config.bid_token, &state.address, &investor, amount)?;
        Ok(amount)
    }

    /// Project cancels the sale before results are published.
    fn cancel_sale(&mut self, ctx: &CallContext, env: &mut Env<'_>) -> HandlerResult<()> {
        self.state().verify_project(&ctx.sender)?;
        self.verify_can_cancel()?;

        let state = self.state_mut();
        state.status.is_canceled = true;
        state.emit(SaleEvent::SaleCanceled);
        info!("sale canceled by project");

        // Return supplied tokens to the project
        if state.status.tokens_supplied {
            if let Some(ask_token) = state.config.ask_token {
                let balance = env.tokens.balance_of(&ask_token, &state.address);
                if balance != 0 {
                    env.tokens.transfer(&ask_token, &state.address, &ctx.sender, balance)?;
                }
            }
        }
        Ok(())
    }

    /// Anyone cancels a sale the project abandoned after lockup.
    fn cancel_expired_sale(&mut self, ctx: &CallContext) -> HandlerResult<()> {
        let results_published = self.results_published();
        let state = self.state_mut();
        state.verify_not_canceled()?;
        state.verify_lockup_period_over(ctx.timestamp)?;
        if state.config.ask_token.is_some() {
            state.verify_tokens_not_supplied()?;
        } else if results_published {
            return Err(SaleError::SaleResultsAlreadyPublished);
        }

        state.status.is_canceled = true;
        state.emit(SaleEvent::SaleCanceled);
        warn!(caller = ?ctx.sender, "expired sale canceled");
        Ok(())
    }

    /// Return the caller's full position after cancellation.
    fn withdraw_invested_capital_if_canceled(&mut self, ctx: &CallContext, env: &mut Env<'_>) -> HandlerResult<u128> {
        let investor = ctx.sender;
        let state = self.state_mut();
        state.verify_not_paused()?;
        state.verify_canceled()?;

        let amount = state.position(&investor).invested_capital;
        if amount == 0 {
            return Err(SaleError::InvalidWithdrawAmount);
        }

        state.mark_refunded(&investor);
        state.debit(&investor, amount)?;
        state.emit(SaleEvent::CapitalRefundedAfterCancel { amount, investor });
        info!(investor = ?investor, amount, "capital returned after cancel");

        env.tokens
            .transfer(&state.config.bid_token, &state.address, &investor, amount)?;
        Ok(amount)
    }

    fn supply_tokens(
        &mut self,
        ctx: &CallContext,
        env: &mut Env<'_>,
        amount: u128,
        legion_fee: u128,
        referrer_fee: u128,
    ) -> HandlerResult<()> {
        let results_published = self.results_published();
        settlement::supply_tokens(self.state_mut(), results_published, ctx, env, amount, legion_fee, referrer_fee)
    }

    fn withdraw_raised_capital(&mut self, ctx: &CallContext, env: &mut Env<'_>) -> HandlerResult<CapitalSplit> {
        let results_published = self.results_published();
        settlement::withdraw_raised_capital(self.state_mut(), results_published, ctx, env)
    }

    fn claim_token_allocation(
        &mut self,
        ctx: &CallContext,
        env: &mut Env<'_>,
        amount: u128,
        proof: &[Word],
    ) -> HandlerResult<Option<Address>> {
        let results_published = self.results_published();
        settlement::claim_token_allocation(self.state_mut(), results_published, ctx, env, amount, proof)
    }

    fn withdraw_excess_invested_capital(
        &mut self,
        ctx: &CallContext,
        env: &mut Env<'_>,
        amount: u128,
        proof: &[Word],
    ) -> HandlerResult<()> {
        let results_published = self.results_published();
        settlement::withdraw_excess_invested_capital(self.state_mut(), results_published, ctx, env, amount, proof)
    }

    fn release_vested_tokens(&mut self, ctx: &CallContext, env: &mut Env<'_>) -> HandlerResult<u128> {
        settlement::release_vested_tokens(self.state(), ctx, env)
    }

    /// Operator moves arbitrary funds out of the sale.
    fn emergency_withdraw(
        &mut self,
        ctx: &CallContext,
        env: &mut Env<'_>,
        receiver: Address,
        token: Address,
        amount: u128,
    ) -> HandlerResult<()> {
        let state = self.state_mut();
        state.verify_operator(&ctx.sender)?;

        state.emit(SaleEvent::EmergencyWithdraw {
            receiver,
            token,
            amount,
        });
        warn!(receiver = ?receiver, token = ?token, amount, "emergency withdrawal");

        env.tokens.transfer(&token, &state.address, &receiver, amount)?;
        Ok(())
    }

    fn pause_sale(&mut self, ctx: &CallContext) -> HandlerResult<()> {
        let state = self.state_mut();
        state.verify_operator(&ctx.sender)?;
        state.verify_not_paused()?;
        state.paused = true;
        state.emit(SaleEvent::SalePaused);
        info!("sale paused");
        Ok(())
    }

    fn unpause_sale(&mut self, ctx: &CallContext) -> HandlerResult<()> {
        let state = self.state_mut();
        state.verify_operator(&ctx.sender)?;
        if !state.paused {
            return Err(SaleError::SaleNotPaused);
        }
        state.paused = false;
        state.emit(SaleEvent::SaleUnpaused);
        info!("sale unpaused");
        Ok(())
    }

    /// Re-read role addresses from the registry.
    fn sync_addresses(&mut self, ctx: &CallContext, registry: &dyn AddressRegistry) -> HandlerResult<()> {
        let state = self.state_mut();
        state.verify_operator(&ctx.sender)?;

        let roles = resolve_roles(registry);
        state.emit(SaleEvent::LegionAddressesSynced {
            operator: roles.operator,
            fee_receiver: roles.fee_receiver,
            signer: roles.signer,
            vesting_factory: roles.vesting_factory,
        });
        info!(operator = ?roles.operator, signer = ?roles.signer, "role addresses synced");
        state.roles = roles;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call::SaleCall;
    use crate::testing::*;
    use sale_crypto::MerkleTree;

    /// Alice invests 6,000 and 4,000 is accepted; Bob invests 6,000, all accepted.
    fn published_sale() -> (Fixture, MerkleTree, MerkleTree) {
        let mut fx = Fixture::new();
        fx.invest(ALICE, 6_000).unwrap();
        fx.invest(BOB, 6_000).unwrap();
        let (claims, accepted) = fx.publish(
            &[(ALICE, 400_000), (BOB, 600_000)],
            &[(ALICE, 4_000), (BOB, 6_000)],
            10_000,
        );
        (fx, claims, accepted)
    }

    #[test]
    fn test_withdraw_raised_capital_once() {
        let (mut fx, _, _) = published_sale();
        let project = fx.project();
        assert_eq!(
            fx.execute(project, SaleCall::WithdrawRaisedCapital),
            Err(SaleError::TokensNotSupplied)
        );

        fx.supply_tokens().unwrap();
        let events = fx.execute(project, SaleCall::WithdrawRaisedCapital).unwrap();
        assert_eq!(
            events,
            vec![SaleEvent::CapitalWithdrawn {
                amount: 10_000,
                owner: project
            }]
        );

        let bid_token = fx.bid_token();
        assert_eq!(fx.balance(&bid_token, &project), 9_650);
        assert_eq!(fx.balance(&bid_token, &FEE_RECEIVER), 250);
        assert_eq!(fx.balance(&bid_token, &fx.params.referrer_fee_receiver), 100);
        assert_eq!(fx.sale().phase(fx.runtime.timestamp), SalePhase::Settled);

        assert_eq!(
            fx.execute(project, SaleCall::WithdrawRaisedCapital),
            Err(SaleError::CapitalAlreadyWithdrawn)
        );
    }

    #[test]
    fn test_zero_fee_skips_transfer() {
        let mut fx = Fixture::with_params(|p| {
            p.referrer_fee_on_capital_raised_bps = 0;
            p.referrer_fee_on_tokens_sold_bps = 0;
            p.ask_token = None;
        });
        fx.invest(ALICE, 10_000).unwrap();
        fx.publish(&[(ALICE, 1)], &[(ALICE, 10_000)], 10_000);

        let project = fx.project();
        fx.execute(project, SaleCall::WithdrawRaisedCapital).unwrap();
        let bid_token = fx.bid_token();
        assert_eq!(fx.balance(&bid_token, &project), 9_750);
        assert_eq!(fx.balance(&bid_token, &FEE_RECEIVER), 250);
        assert_eq!(fx.balance(&bid_token, &fx.params.referrer_fee_receiver), 0);
    }

    #[test]
    fn test_supply_tokens_validation() {
        let (mut fx, _, _) = published_sale();
        let project = fx.project();
        assert_eq!(
            fx.execute(
                project,
                SaleCall::SupplyTokens {
                    amount: 999_999,
                    legion_fee: 0,
                    referrer_fee: 0
                }
            ),
            Err(SaleError::InvalidTokenAmountSupplied {
                expected: 1_000_000,
                got: 999_999
            })
        );
        assert_eq!(
            fx.execute(
                project,
                SaleCall::SupplyTokens {
                    amount: 1_000_000,
                    legion_fee: 1,
                    referrer_fee: 10_000
                }
            ),
            Err(SaleError::InvalidFeeAmount {
                expected: 25_000,
                got: 1
            })
        );

        fx.supply_tokens().unwrap();
        assert!(fx.sale().state.status.tokens_supplied);
        assert_eq!(fx.balance(&fx.ask_token(), &SALE), 1_000_000);
        assert_eq!(fx.balance(&fx.ask_token(), &FEE_RECEIVER), 25_000);
        assert_eq!(fx.supply_tokens(), Err(SaleError::TokensAlreadySupplied));
    }

    #[test]
    fn test_supply_tokens_before_publication() {
        let mut fx = Fixture::new();
        let project = fx.project();
        assert_eq!(
            fx.execute(
                project,
                SaleCall::SupplyTokens {
                    amount: 0,
                    legion_fee: 0,
                    referrer_fee: 0
                }
            ),
            Err(SaleError::SaleResultsNotPublished)
        );
    }

    #[test]
    fn test_claim_token_allocation() {
        let (mut fx, claims, _) = published_sale();
        fx.supply_tokens().unwrap();
        let proof = claims.proof(0).unwrap();

        let call = SaleCall::ClaimTokenAllocation {
            amount: 400_000,
            proof: proof.clone(),
        };
        assert_eq!(fx.execute(ALICE, call.clone()), Err(SaleError::LockupPeriodIsNotOver));

        fx.warp_past_lockup();
        // Proof for Alice does not hold for Bob or for another amount
        assert_eq!(
            fx.execute(
                ALICE,
                SaleCall::ClaimTokenAllocation {
                    amount: 400_001,
                    proof: proof.clone()
                }
            ),
            Err(SaleError::CannotClaimTokens)
        );
        assert_eq!(fx.execute(BOB, call.clone()), Err(SaleError::CannotClaimTokens));

        let events = fx.execute(ALICE, call.clone()).unwrap();
        let wallet = fx.sale().state.position(&ALICE).vesting_address.unwrap();
        assert_eq!(
            events,
            vec![SaleEvent::TokenAllocationClaimed {
                amount: 400_000,
                investor: ALICE,
                vesting_address: Some(wallet)
            }]
        );

        let ask_token = fx.ask_token();
        // 10% at TGE
        assert_eq!(fx.balance(&ask_token, &ALICE), 40_000);
        assert_eq!(fx.balance(&ask_token, &wallet), 360_000);
        let vesting = fx.runtime.vesting.wallet(&wallet).unwrap();
        assert_eq!(vesting.start_time, fx.schedule().lockup_end_time);
        assert_eq!(vesting.beneficiary, ALICE);

        assert_eq!(fx.execute(ALICE, call), Err(SaleError::AlreadySettled));
    }

    #[test]
    fn test_release_vested_tokens() {
        let (mut fx, claims, _) = published_sale();
        fx.supply_tokens().unwrap();
        fx.warp_past_lockup();

        assert_eq!(
            fx.execute(BOB, SaleCall::ReleaseVestedTokens),
            Err(SaleError::NoVestingAddress)
        );

        fx.execute(
            BOB,
            SaleCall::ClaimTokenAllocation {
                amount: 600_000,
                proof: claims.proof(1).unwrap(),
            },
        )
        .unwrap();

        let lockup_end = fx.schedule().lockup_end_time;
        fx.warp_to(lockup_end + fx.params.vesting.vesting_duration_seconds);
        fx.execute(BOB, SaleCall::ReleaseVestedTokens).unwrap();
        assert_eq!(fx.balance(&fx.ask_token(), &BOB), 600_000);
    }

    #[test]
    fn test_withdraw_excess_invested_capital() {
        let (mut fx, _, accepted) = published_sale();
        let proof = accepted.proof(0).unwrap();

        assert_eq!(
            fx.execute(
                ALICE,
                SaleCall::WithdrawExcessInvestedCapital {
                    amount: 3_000,
                    proof: proof.clone()
                }
            ),
            Err(SaleError::CannotWithdrawExcessCapital)
        );
        assert_eq!(
            fx.execute(
                ALICE,
                SaleCall::WithdrawExcessInvestedCapital {
                    amount: 7_000,
                    proof: proof.clone()
                }
            ),
            Err(SaleError::CannotWithdrawExcessCapital)
        );

        let call = SaleCall::WithdrawExcessInvestedCapital {
            amount: 2_000,
            proof,
        };
        let events = fx.execute(ALICE, call.clone()).unwrap();
        assert_eq!(
            events,
            vec![SaleEvent::ExcessCapitalWithdrawn {
                amount: 2_000,
                investor: ALICE
            }]
        );
        assert_eq!(fx.balance(&fx.bid_token(), &ALICE), 2_000);
        assert_eq!(fx.sale().state.position(&ALICE).invested_capital, 4_000);
        assert_eq!(fx.sale().state.status.total_capital_invested, 10_000);

        assert_eq!(fx.execute(ALICE, call), Err(SaleError::AlreadyClaimedExcess));
    }

    #[test]
    fn test_ledger_total_matches_positions() {
        let (mut fx, _, accepted) = published_sale();
        fx.execute(
            ALICE,
            SaleCall::WithdrawExcessInvestedCapital {
                amount: 2_000,
                proof: accepted.proof(0).unwrap(),
            },
        )
        .unwrap();

        let state = &fx.sale().state;
        let sum: u128 = state.positions.values().map(|p| p.invested_capital).sum();
        assert_eq!(sum, state.status.total_capital_invested);
    }

    /// A variant that keeps every default, so cancellation is only gated on publication.
    struct BaseSale {
        state: SaleState,
    }

    impl SaleLifecycle for BaseSale {
        fn state(&self) -> &SaleState {
            &self.state
        }

        fn state_mut(&mut self) -> &mut SaleState {
            &mut self.state
        }
    }

    #[test]
    fn test_cancel_returns_supplied_tokens() {
        let mut fx = Fixture::new();
        let project = fx.project();
        let ask_token = fx.ask_token();
        let mut sale = BaseSale {
            state: fx.sale().state.clone(),
        };
        sale.state.status.tokens_supplied = true;
        fx.runtime.tokens.mint(&ask_token, &SALE, 50_000).unwrap();

        let ctx = CallContext {
            sender: project,
            timestamp: fx.runtime.timestamp,
            chain_id: CHAIN_ID,
        };
        let mut env = Env {
            tokens: &mut fx.runtime.tokens,
            vesting: &mut fx.runtime.vesting,
            registry: &fx.runtime.registry,
        };
        sale.cancel_sale(&ctx, &mut env).unwrap();

        assert!(sale.state.status.is_canceled);
        assert_eq!(fx.balance(&ask_token, &SALE), 0);
        assert_eq!(fx.balance(&ask_token, &project), 50_000);
    }

    #[test]
    fn test_cancel_and_withdraw() {
        let mut fx = Fixture::new();
        fx.invest(ALICE, 5_000).unwrap();
        fx.invest(BOB, 1_000).unwrap();
        fx.execute(BOB, SaleCall::Refund).unwrap();

        assert_eq!(
            fx.execute(ALICE, SaleCall::WithdrawInvestedCapitalIfCanceled),
            Err(SaleError::SaleIsNotCanceled)
        );
        assert_eq!(fx.execute(ALICE, SaleCall::CancelSale), Err(SaleError::NotCalledByProject));

        let project = fx.project();
        let events = fx.execute(project, SaleCall::CancelSale).unwrap();
        assert_eq!(events, vec![SaleEvent::SaleCanceled]);
        assert_eq!(fx.sale().phase(fx.runtime.timestamp), SalePhase::Canceled);
        assert_eq!(fx.execute(project, SaleCall::CancelSale), Err(SaleError::SaleIsCanceled));
        assert_eq!(fx.invest(CAROL, 1_000), Err(SaleError::SaleIsCanceled));

        fx.execute(ALICE, SaleCall::WithdrawInvestedCapitalIfCanceled).unwrap();
        assert_eq!(fx.balance(&fx.bid_token(), &ALICE), 5_000);
        assert!(fx.sale().state.position(&ALICE).has_refunded);
        assert_eq!(
            fx.execute(ALICE, SaleCall::WithdrawInvestedCapitalIfCanceled),
            Err(SaleError::InvalidWithdrawAmount)
        );
        // Bob already refunded
        assert_eq!(
            fx.execute(BOB, SaleCall::WithdrawInvestedCapitalIfCanceled),
            Err(SaleError::InvalidWithdrawAmount)
        );
        assert_eq!(fx.sale().state.status.total_capital_invested, 0);
    }

    #[test]
    fn test_cancel_after_publication_is_rejected() {
        let mut fx = Fixture::with_params(|p| p.ask_token = None);
        fx.publish(&[(ALICE, 1)], &[(ALICE, 1)], 0);
        let project = fx.project();
        // The lock set before publication is reported first
        assert_eq!(fx.execute(project, SaleCall::CancelSale), Err(SaleError::CancelLocked));
    }

    #[test]
    fn test_cancel_expired_sale() {
        let (mut fx, _, _) = published_sale();
        assert_eq!(
            fx.execute(CAROL, SaleCall::CancelExpiredSale),
            Err(SaleError::LockupPeriodIsNotOver)
        );

        fx.warp_past_lockup();
        fx.execute(CAROL, SaleCall::CancelExpiredSale).unwrap();
        assert!(fx.sale().state.status.is_canceled);

        fx.execute(BOB, SaleCall::WithdrawInvestedCapitalIfCanceled).unwrap();
        assert_eq!(fx.balance(&fx.bid_token(), &BOB), 6_000);
    }

    #[test]
    fn test_cancel_expired_sale_after_supply() {
        let (mut fx, _, _) = published_sale();
        fx.supply_tokens().unwrap();
        fx.warp_past_lockup();
        assert_eq!(
            fx.execute(CAROL, SaleCall::CancelExpiredSale),
            Err(SaleError::TokensAlreadySupplied)
        );
    }

    #[test]
    fn test_cancel_expired_sale_without_ask_token() {
        let mut fx = Fixture::with_params(|p| p.ask_token = None);
        fx.publish(&[(ALICE, 1)], &[(ALICE, 1)], 0);
        fx.warp_past_lockup();
        assert_eq!(
            fx.execute(CAROL, SaleCall::CancelExpiredSale),
            Err(SaleError::SaleResultsAlreadyPublished)
        );
    }

    #[test]
    fn test_pause_blocks_investor_calls() {
        let mut fx = Fixture::new();
        fx.invest(ALICE, 1_000).unwrap();

        assert_eq!(fx.execute(ALICE, SaleCall::PauseSale), Err(SaleError::NotCalledByOperator));
        fx.execute(OPERATOR, SaleCall::PauseSale).unwrap();
        assert_eq!(fx.execute(OPERATOR, SaleCall::PauseSale), Err(SaleError::SalePaused));
        assert_eq!(fx.execute(ALICE, SaleCall::Refund), Err(SaleError::SalePaused));
        assert_eq!(fx.invest(BOB, 1_000), Err(SaleError::SalePaused));

        fx.execute(OPERATOR, SaleCall::UnpauseSale).unwrap();
        assert_eq!(fx.execute(OPERATOR, SaleCall::UnpauseSale), Err(SaleError::SaleNotPaused));
        fx.execute(ALICE, SaleCall::Refund).unwrap();
    }

    #[test]
    fn test_emergency_withdraw() {
        let mut fx = Fixture::new();
        fx.invest(ALICE, 1_000).unwrap();
        let token = fx.bid_token();
        let call = SaleCall::EmergencyWithdraw {
            receiver: CAROL,
            token,
            amount: 400,
        };
        assert_eq!(fx.execute(ALICE, call.clone()), Err(SaleError::NotCalledByOperator));
        fx.execute(OPERATOR, call).unwrap();
        assert_eq!(fx.balance(&token, &CAROL), 400);
        assert_eq!(fx.balance(&token, &SALE), 600);
    }

    #[test]
    fn test_sync_addresses() {
        let mut fx = Fixture::new();
        let new_operator = [0x77; 20];
        fx.runtime.registry.set(LEGION_BOUNCER_ID, new_operator);

        // Roles are cached until synced
        assert_eq!(
            fx.execute(new_operator, SaleCall::PauseSale),
            Err(SaleError::NotCalledByOperator)
        );
        fx.execute(OPERATOR, SaleCall::SyncAddresses).unwrap();
        assert_eq!(fx.sale().state.roles.operator, new_operator);
        fx.execute(new_operator, SaleCall::PauseSale).unwrap();
        assert_eq!(fx.sale().state.roles.vesting_factory, VESTING_FACTORY);

        let new_factory = [0x78; 20];
        fx.runtime.registry.set(LEGION_VESTING_FACTORY_ID, new_factory);
        fx.execute(OPERATOR, SaleCall::SyncAddresses).unwrap_err();
        fx.execute(new_operator, SaleCall::SyncAddresses).unwrap();
        assert_eq!(fx.sale().state.roles.vesting_factory, new_factory);
    }
}
