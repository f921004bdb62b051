//! Merkle-gated settlement and fee distribution.
//!
//! Both directions of settlement, tokens out via the claim root and excess
//! capital back via the accepted-capital root, share the same leaf
//! encoding `keccak256(keccak256(abi.encode(investor, amount)))`. Fees use
//! floor division, so rounding dust always stays with the project.

use tracing::info;

use sale_crypto::merkle;
use sale_types::{mul_div_floor, Address, SaleConfiguration, SaleEvent, Word, BPS_DENOMINATOR, RATE_DENOMINATOR};

use crate::error::SaleError;
use crate::handlers::{CallContext, HandlerResult};
use crate::host::Env;
use crate::state::SaleState;

/// How raised capital is divided at withdrawal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CapitalSplit {
    pub legion_fee: u128,
    pub referrer_fee: u128,
    pub project_amount: u128,
}

/// `floor(amount * bps / 10_000)`.
pub fn apply_bps(amount: u128, bps: u16) -> HandlerResult<u128> {
    mul_div_floor(amount, u128::from(bps), BPS_DENOMINATOR).ok_or(SaleError::ArithmeticOverflow)
}

/// Split `capital_raised` between the fee receivers and the project.
pub fn split_capital(capital_raised: u128, config: &SaleConfiguration) -> HandlerResult<CapitalSplit> {
    let legion_fee = apply_bps(capital_raised, config.legion_fee_on_capital_raised_bps)?;
    let referrer_fee = apply_bps(capital_raised, config.referrer_fee_on_capital_raised_bps)?;
    let project_amount = capital_raised
        .checked_sub(legion_fee)
        .and_then(|rest| rest.checked_sub(referrer_fee))
        .ok_or(SaleError::ArithmeticOverflow)?;
    Ok(CapitalSplit {
        legion_fee,
        referrer_fee,
        project_amount,
    })
}

/// Fees owed on `tokens_allocated`, as `(legion_fee, referrer_fee)`.
pub fn token_fees(tokens_allocated: u128, config: &SaleConfiguration) -> HandlerResult<(u128, u128)> {
    Ok((
        apply_bps(tokens_allocated, config.legion_fee_on_tokens_sold_bps)?,
        apply_bps(tokens_allocated, config.referrer_fee_on_tokens_sold_bps)?,
    ))
}

/// Portion of a claim released at TGE.
pub fn tge_amount(amount: u128, rate: u128) -> HandlerResult<u128> {
    mul_div_floor(amount, rate, RATE_DENOMINATOR).ok_or(SaleError::ArithmeticOverflow)
}

/// Transfer from the sale, skipping zero amounts.
fn pay_out(env: &mut Env<'_>, token: &Address, sale: &Address, to: &Address, amount: u128) -> HandlerResult<()> {
    if amount != 0 {
        env.tokens.transfer(token, sale, to, amount)?;
    }
    Ok(())
}

/// Pull into `to` against the sale's allowance, skipping zero amounts.
fn pull(
    env: &mut Env<'_>,
    token: &Address,
    sale: &Address,
    from: &Address,
    to: &Address,
    amount: u128,
) -> HandlerResult<()> {
    if amount != 0 {
        env.tokens.transfer_from(token, sale, from, to, amount)?;
    }
    Ok(())
}

fn verify_results_published(results_published: bool) -> HandlerResult<()> {
    if !results_published {
        return Err(SaleError::SaleResultsNotPublished);
    }
    Ok(())
}

/// Project deposits the allocated tokens plus token fees.
pub fn supply_tokens(
    state: &mut SaleState,
    results_published: bool,
    ctx: &CallContext,
    env: &mut Env<'_>,
    amount: u128,
    legion_fee: u128,
    referrer_fee: u128,
) -> HandlerResult<()> {
    state.verify_project(&ctx.sender)?;
    let ask_token = state.verify_ask_token()?;
    state.verify_not_canceled()?;
    verify_results_published(results_published)?;
    state.verify_tokens_not_supplied()?;

    if amount != state.status.total_tokens_allocated {
        return Err(SaleError::InvalidTokenAmountSupplied {
            expected: state.status.total_tokens_allocated,
            got: amount,
        });
    }
    let (expected_legion_fee, expected_referrer_fee) = token_fees(amount, &state.config)?;
    if legion_fee != expected_legion_fee {
        return Err(SaleError::InvalidFeeAmount {
            expected: expected_legion_fee,
            got: legion_fee,
        });
    }
    if referrer_fee != expected_referrer_fee {
        return Err(SaleError::InvalidFeeAmount {
            expected: expected_referrer_fee,
            got: referrer_fee,
        });
    }

    state.status.tokens_supplied = true;
    state.emit(SaleEvent::TokensSuppliedForDistribution {
        amount,
        legion_fee,
        referrer_fee,
    });
    info!(amount, legion_fee, referrer_fee, "tokens supplied for distribution");

    let sale = state.address;
    pull(env, &ask_token, &sale, &ctx.sender, &sale, amount)?;
    pull(env, &ask_token, &sale, &ctx.sender, &state.roles.fee_receiver, legion_fee)?;
    pull(env, &ask_token, &sale, &ctx.sender, &state.config.referrer_fee_receiver, referrer_fee)?;
    Ok(())
}

/// Project withdraws raised capital net of fees.
pub fn withdraw_raised_capital(
    state: &mut SaleState,
    results_published: bool,
    ctx: &CallContext,
    env: &mut Env<'_>,
) -> HandlerResult<CapitalSplit> {
    state.verify_project(&ctx.sender)?;
    verify_results_published(results_published)?;
    state.verify_refund_period_over(ctx.timestamp)?;
    state.verify_not_canceled()?;
    state.verify_capital_not_withdrawn()?;
    if state.config.ask_token.is_some() {
        state.verify_tokens_supplied()?;
    }

    let capital_raised = state.status.total_capital_raised;
    let split = split_capital(capital_raised, &state.config)?;

    state.status.capital_withdrawn = true;
    state.emit(SaleEvent::CapitalWithdrawn {
        amount: capital_raised,
        owner: ctx.sender,
    });
    info!(
        capital_raised,
        project_amount = split.project_amount,
        legion_fee = split.legion_fee,
        referrer_fee = split.referrer_fee,
        "raised capital withdrawn"
    );

    let sale = state.address;
    let bid_token = state.config.bid_token;
    pay_out(env, &bid_token, &sale, &ctx.sender, split.project_amount)?;
    pay_out(env, &bid_token, &sale, &state.roles.fee_receiver, split.legion_fee)?;
    pay_out(env, &bid_token, &sale, &state.config.referrer_fee_receiver, split.referrer_fee)?;
    Ok(split)
}

/// Investor claims a token allocation proven against the claim root.
///
/// The TGE share goes straight to the investor; the rest is locked in a
/// vesting wallet that starts at the end of the lockup period.
pub fn claim_token_allocation(
    state: &mut SaleState,
    results_published: bool,
    ctx: &CallContext,
    env: &mut Env<'_>,
    amount: u128,
    proof: &[Word],
) -> HandlerResult<Option<Address>> {
    let investor = ctx.sender;
    state.verify_not_paused()?;
    let ask_token = state.verify_ask_token()?;
    state.verify_not_canceled()?;
    verify_results_published(results_published)?;
    state.verify_lockup_period_over(ctx.timestamp)?;
    state.verify_tokens_supplied()?;

    if state.position(&investor).has_settled {
        return Err(SaleError::AlreadySettled);
    }
    if amount == 0 {
        return Err(SaleError::InvalidClaimAmount);
    }
    let leaf = merkle::investor_leaf(&investor, amount);
    if !merkle::verify(proof, &state.status.claim_tokens_merkle_root, &leaf) {
        return Err(SaleError::CannotClaimTokens);
    }

    let released_at_tge = tge_amount(amount, state.vesting.token_allocation_on_tge_rate)?;
    let vested = amount
        .checked_sub(released_at_tge)
        .ok_or(SaleError::ArithmeticOverflow)?;

    state.mark_settled(&investor);

    let vesting_address = if vested != 0 {
        let wallet = env.vesting.create_vesting(
            &investor,
            state.schedule.lockup_end_time,
            state.vesting.vesting_duration_seconds,
            state.vesting.vesting_cliff_duration_seconds,
        )?;
        state.set_vesting_address(&investor, wallet);
        Some(wallet)
    } else {
        None
    };

    state.emit(SaleEvent::TokenAllocationClaimed {
        amount,
        investor,
        vesting_address,
    });
    info!(investor = ?investor, amount, released_at_tge, "token allocation claimed");

    let sale = state.address;
    if let Some(wallet) = vesting_address {
        pay_out(env, &ask_token, &sale, &wallet, vested)?;
    }
    pay_out(env, &ask_token, &sale, &investor, released_at_tge)?;
    Ok(vesting_address)
}

/// Investor withdraws the part of their capital that was not accepted.
///
/// The accepted-capital leaf commits to `invested_capital - amount`, so
/// the proof binds the withdrawal to the investor's current balance.
pub fn withdraw_excess_invested_capital(
    state: &mut SaleState,
    results_published: bool,
    ctx: &CallContext,
    env: &mut Env<'_>,
    amount: u128,
    proof: &[Word],
) -> HandlerResult<()> {
    let investor = ctx.sender;
    state.verify_not_paused()?;
    state.verify_not_canceled()?;
    verify_results_published(results_published)?;

    let position = state.position(&investor);
    if position.has_claimed_excess {
        return Err(SaleError::AlreadyClaimedExcess);
    }
    if amount == 0 {
        return Err(SaleError::InvalidWithdrawAmount);
    }
    let accepted = position
        .invested_capital
        .checked_sub(amount)
        .ok_or(SaleError::CannotWithdrawExcessCapital)?;
    let leaf = merkle::investor_leaf(&investor, accepted);
    if !merkle::verify(proof, &state.status.accepted_capital_merkle_root, &leaf) {
        return Err(SaleError::CannotWithdrawExcessCapital);
    }

    state.mark_claimed_excess(&investor);
    state.debit(&investor, amount)?;
    state.emit(SaleEvent::ExcessCapitalWithdrawn { amount, investor });
    info!(investor = ?investor, amount, accepted, "excess capital withdrawn");

    let sale = state.address;
    let bid_token = state.config.bid_token;
    pay_out(env, &bid_token, &sale, &investor, amount)
}

/// Release whatever the caller's vesting wallet has vested so far.
pub fn release_vested_tokens(state: &SaleState, ctx: &CallContext, env: &mut Env<'_>) -> HandlerResult<u128> {
    state.verify_not_paused()?;
    let ask_token = state.verify_ask_token()?;
    let wallet = state
        .position(&ctx.sender)
        .vesting_address
        .ok_or(SaleError::NoVestingAddress)?;

    let released = env.vesting.release(&wallet, &ask_token, ctx.timestamp, &mut *env.tokens)?;
    info!(investor = ?ctx.sender, released, "vested tokens released");
    Ok(released)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(capital_bps: (u16, u16), token_bps: (u16, u16)) -> SaleConfiguration {
        let mut config = crate::params::tests::sample_params().configuration();
        config.legion_fee_on_capital_raised_bps = capital_bps.0;
        config.referrer_fee_on_capital_raised_bps = capital_bps.1;
        config.legion_fee_on_tokens_sold_bps = token_bps.0;
        config.referrer_fee_on_tokens_sold_bps = token_bps.1;
        config
    }

    #[test]
    fn test_capital_split_sums_to_raised() {
        let config = config((250, 100), (0, 0));
        for raised in [0u128, 1, 9_999, 10_000, 1_234_567, u128::MAX] {
            let split = split_capital(raised, &config).unwrap();
            assert_eq!(split.legion_fee + split.referrer_fee + split.project_amount, raised);
        }
    }

    #[test]
    fn test_capital_split_rounds_down_fees() {
        let split = split_capital(9_999, &config((250, 100), (0, 0))).unwrap();
        assert_eq!(split.legion_fee, 249);
        assert_eq!(split.referrer_fee, 99);
        assert_eq!(split.project_amount, 9_651);
    }

    #[test]
    fn test_token_fees() {
        let config = config((0, 0), (250, 100));
        assert_eq!(token_fees(1_000_000, &config).unwrap(), (25_000, 10_000));
        assert_eq!(token_fees(0, &config).unwrap(), (0, 0));
    }

    #[test]
    fn test_tge_amount() {
        assert_eq!(tge_amount(1_000, RATE_DENOMINATOR / 10).unwrap(), 100);
        assert_eq!(tge_amount(1_000, 0).unwrap(), 0);
        assert_eq!(tge_amount(1_000, RATE_DENOMINATOR).unwrap(), 1_000);
        assert_eq!(tge_amount(u128::MAX, RATE_DENOMINATOR).unwrap(), u128::MAX);
    }
}
