//! Sale initialization parameters.
//!
//! Parameters are validated once, before any state is written. A sale that
//! passes validation has a well-formed schedule, sane fee rates and a usable
//! auction public key.

use serde::{Deserialize, Serialize};
use borsh::{BorshDeserialize, BorshSerialize};
use thiserror::Error;

use sale_types::{
    Address, CurvePoint, SaleConfiguration, SaleSchedule, VestingConfiguration, BPS_DENOMINATOR,
    RATE_DENOMINATOR, ZERO_ADDRESS,
};

/// One hour.
pub const MIN_PERIOD_SECONDS: u64 = 3_600;
/// Twelve weeks.
pub const MAX_PERIOD_SECONDS: u64 = 12 * 7 * 24 * 3_600;
/// Ten years.
pub const MAX_VESTING_DURATION_SECONDS: u64 = 520 * 7 * 24 * 3_600;

/// Everything a sale is configured with at creation.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct SaleInitParams {
    pub sale_period_seconds: u64,
    pub refund_period_seconds: u64,
    pub lockup_period_seconds: u64,
    pub legion_fee_on_capital_raised_bps: u16,
    pub legion_fee_on_tokens_sold_bps: u16,
    pub referrer_fee_on_capital_raised_bps: u16,
    pub referrer_fee_on_tokens_sold_bps: u16,
    pub minimum_invest_amount: u128,
    pub bid_token: Address,
    pub ask_token: Option<Address>,
    pub project_admin: Address,
    pub address_registry: Address,
    pub referrer_fee_receiver: Address,
    pub vesting: VestingConfiguration,
    /// Auction public key investors seal bids against
    pub public_key: CurvePoint,
}

/// Accepted range for the sale, refund and lockup periods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodLimits {
    pub min_period_seconds: u64,
    pub max_period_seconds: u64,
}

impl Default for PeriodLimits {
    fn default() -> Self {
        Self {
            min_period_seconds: MIN_PERIOD_SECONDS,
            max_period_seconds: MAX_PERIOD_SECONDS,
        }
    }
}

impl PeriodLimits {
    fn contains(&self, period: u64) -> bool {
        (self.min_period_seconds..=self.max_period_seconds).contains(&period)
    }
}

impl SaleInitParams {
    /// Validate the parameters.
    pub fn validate(&self, limits: &PeriodLimits) -> Result<(), ParamsValidationError> {
        let mut addresses = vec![self.bid_token, self.project_admin, self.address_registry];
        if let Some(ask_token) = self.ask_token {
            addresses.push(ask_token);
        }
        if self.referrer_fee_on_capital_raised_bps != 0 || self.referrer_fee_on_tokens_sold_bps != 0 {
            addresses.push(self.referrer_fee_receiver);
        }
        if addresses.iter().any(|a| *a == ZERO_ADDRESS) {
            return Err(ParamsValidationError::ZeroAddressProvided);
        }

        if self.sale_period_seconds == 0
            || self.refund_period_seconds == 0
            || self.lockup_period_seconds == 0
            || self.minimum_invest_amount == 0
        {
            return Err(ParamsValidationError::ZeroValueProvided);
        }

        for period in [self.sale_period_seconds, self.refund_period_seconds, self.lockup_period_seconds] {
            if !limits.contains(period) {
                return Err(ParamsValidationError::InvalidPeriodConfig);
            }
        }
        if self.vesting.vesting_cliff_duration_seconds > self.vesting.vesting_duration_seconds
            || self.vesting.vesting_duration_seconds > MAX_VESTING_DURATION_SECONDS
        {
            return Err(ParamsValidationError::InvalidPeriodConfig);
        }

        let capital_bps =
            u128::from(self.legion_fee_on_capital_raised_bps) + u128::from(self.referrer_fee_on_capital_raised_bps);
        let tokens_bps =
            u128::from(self.legion_fee_on_tokens_sold_bps) + u128::from(self.referrer_fee_on_tokens_sold_bps);
        if capital_bps > BPS_DENOMINATOR || tokens_bps > BPS_DENOMINATOR {
            return Err(ParamsValidationError::InvalidFeeConfig);
        }

        if self.vesting.token_allocation_on_tge_rate > RATE_DENOMINATOR {
            return Err(ParamsValidationError::InvalidTokenAllocationRate);
        }

        if !sale_crypto::is_valid(&self.public_key) {
            return Err(ParamsValidationError::InvalidBidPublicKey);
        }

        Ok(())
    }

    /// Derive the sale windows from the start time.
    pub fn schedule(&self, start_time: u64) -> Result<SaleSchedule, ParamsValidationError> {
        SaleSchedule::derive(
            start_time,
            self.sale_period_seconds,
            self.refund_period_seconds,
            self.lockup_period_seconds,
        )
        .ok_or(ParamsValidationError::InvalidPeriodConfig)
    }

    pub fn configuration(&self) -> SaleConfiguration {
        SaleConfiguration {
            legion_fee_on_capital_raised_bps: self.legion_fee_on_capital_raised_bps,
            legion_fee_on_tokens_sold_bps: self.legion_fee_on_tokens_sold_bps,
            referrer_fee_on_capital_raised_bps: self.referrer_fee_on_capital_raised_bps,
            referrer_fee_on_tokens_sold_bps: self.referrer_fee_on_tokens_sold_bps,
            minimum_invest_amount: self.minimum_invest_amount,
            bid_token: self.bid_token,
            ask_token: self.ask_token,
            project_admin: self.project_admin,
            address_registry: self.address_registry,
            referrer_fee_receiver: self.referrer_fee_receiver,
        }
    }
}

/// Parameter validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamsValidationError {
    #[error("Zero address provided")]
    ZeroAddressProvided,

    #[error("Zero value provided")]
    ZeroValueProvided,

    #[error("Invalid period configuration")]
    InvalidPeriodConfig,

    #[error("Invalid fee configuration")]
    InvalidFeeConfig,

    #[error("Invalid token allocation rate")]
    InvalidTokenAllocationRate,

    #[error("Invalid bid public key")]
    InvalidBidPublicKey,
}
