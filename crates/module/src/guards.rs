//! Precondition checks shared by the sale operations.

use sale_types::Address;

use crate::error::SaleError;
use crate::handlers::HandlerResult;
use crate::state::SaleState;

impl SaleState {
    pub fn verify_operator(&self, sender: &Address) -> HandlerResult<()> {
        if *sender != self.roles.operator {
            return Err(SaleError::NotCalledByOperator);
        }
        Ok(())
    }

    pub fn verify_project(&self, sender: &Address) -> HandlerResult<()> {
        if *sender != self.config.project_admin {
            return Err(SaleError::NotCalledByProject);
        }
        Ok(())
    }

    pub fn verify_not_paused(&self) -> HandlerResult<()> {
        if self.paused {
            return Err(SaleError::SalePaused);
        }
        Ok(())
    }

    pub fn verify_not_canceled(&self) -> HandlerResult<()> {
        if self.status.is_canceled {
            return Err(SaleError::SaleIsCanceled);
        }
        Ok(())
    }

    pub fn verify_canceled(&self) -> HandlerResult<()> {
        if !self.status.is_canceled {
            return Err(SaleError::SaleIsNotCanceled);
        }
        Ok(())
    }

    pub fn verify_sale_not_ended(&self, now: u64) -> HandlerResult<()> {
        if now >= self.schedule.end_time {
            return Err(SaleError::SaleHasEnded);
        }
        Ok(())
    }

    pub fn verify_refund_period_not_over(&self, now: u64) -> HandlerResult<()> {
        if now >= self.schedule.refund_end_time {
            return Err(SaleError::RefundPeriodIsOver);
        }
        Ok(())
    }

    pub fn verify_refund_period_over(&self, now: u64) -> HandlerResult<()> {
        if now < self.schedule.refund_end_time {
            return Err(SaleError::RefundPeriodIsNotOver);
        }
        Ok(())
    }

    pub fn verify_lockup_period_over(&self, now: u64) -> HandlerResult<()> {
        if now < self.schedule.lockup_end_time {
            return Err(SaleError::LockupPeriodIsNotOver);
        }
        Ok(())
    }

    /// The ask token, if the sale distributes one.
    pub fn verify_ask_token(&self) -> HandlerResult<Address> {
        self.config.ask_token.ok_or(SaleError::AskTokenUnavailable)
    }

    pub fn verify_tokens_supplied(&self) -> HandlerResult<()> {
        if !self.status.tokens_supplied {
            return Err(SaleError::TokensNotSupplied);
        }
        Ok(())
    }

    pub fn verify_tokens_not_supplied(&self) -> HandlerResult<()> {
        if self.status.tokens_supplied {
            return Err(SaleError::TokensAlreadySupplied);
        }
        Ok(())
    }

    pub fn verify_capital_not_withdrawn(&self) -> HandlerResult<()> {
        if self.status.capital_withdrawn {
            return Err(SaleError::CapitalAlreadyWithdrawn);
        }
        Ok(())
    }

    pub fn verify_has_not_refunded(&self, investor: &Address) -> HandlerResult<()> {
        if self.position(investor).has_refunded {
            return Err(SaleError::AlreadyRefunded);
        }
        Ok(())
    }
}
