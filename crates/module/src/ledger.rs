//! Investor position ledger.
//!
//! `total_capital_invested` always equals the sum of `invested_capital`
//! over all positions. Credits and debits keep both sides in step.

use sale_types::{Address, InvestorPosition};

use crate::error::SaleError;
use crate::handlers::HandlerResult;
use crate::state::SaleState;

impl SaleState {
    /// Position of `investor`; the zero position if none exists.
    pub fn position(&self, investor: &Address) -> InvestorPosition {
        self.positions.get(investor).cloned().unwrap_or_default()
    }

    fn position_mut(&mut self, investor: &Address) -> &mut InvestorPosition {
        self.positions.entry(*investor).or_default()
    }

    /// Add `amount` to the investor's capital. Returns the new balance.
    pub fn credit(&mut self, investor: &Address, amount: u128) -> HandlerResult<u128> {
        let total = self
            .status
            .total_capital_invested
            .checked_add(amount)
            .ok_or(SaleError::ArithmeticOverflow)?;
        let balance = self
            .position(investor)
            .invested_capital
            .checked_add(amount)
            .ok_or(SaleError::ArithmeticOverflow)?;

        self.status.total_capital_invested = total;
        self.position_mut(investor).invested_capital = balance;
        Ok(balance)
    }

    /// Remove `amount` from the investor's capital.
    pub fn debit(&mut self, investor: &Address, amount: u128) -> HandlerResult<u128> {
        let available = self.position(investor).invested_capital;
        let balance = available.checked_sub(amount).ok_or(SaleError::LedgerUnderflow {
            investor: *investor,
            requested: amount,
            available,
        })?;
        let total = self
            .status
            .total_capital_invested
            .checked_sub(amount)
            .ok_or(SaleError::ArithmeticOverflow)?;

        self.status.total_capital_invested = total;
        self.position_mut(investor).invested_capital = balance;
        Ok(balance)
    }

    pub fn mark_refunded(&mut self, investor: &Address) {
        self.position_mut(investor).has_refunded = true;
    }

    pub fn mark_claimed_excess(&mut self, investor: &Address) {
        self.position_mut(investor).has_claimed_excess = true;
    }

    pub fn mark_settled(&mut self, investor: &Address) {
        self.position_mut(investor).has_settled = true;
    }

    pub fn set_vesting_address(&mut self, investor: &Address, vesting: Address) {
        self.position_mut(investor).vesting_address = Some(vesting);
    }
}
