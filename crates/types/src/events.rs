//! Events emitted by the sale engine.
//!
//! Each event carries enough amounts and identities to rebuild the ledger
//! from history alone.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::{Address, Word};

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub enum SaleEvent {
    CapitalInvested {
        amount: u128,
        encrypted_amount_out: Word,
        salt: Word,
        investor: Address,
        invested_at: u64,
    },
    CapitalRefunded {
        amount: u128,
        investor: Address,
    },
    CapitalRefundedAfterCancel {
        amount: u128,
        investor: Address,
    },
    ExcessCapitalWithdrawn {
        amount: u128,
        investor: Address,
    },
    TokenAllocationClaimed {
        amount: u128,
        investor: Address,
        vesting_address: Option<Address>,
    },
    CapitalWithdrawn {
        amount: u128,
        owner: Address,
    },
    TokensSuppliedForDistribution {
        amount: u128,
        legion_fee: u128,
        referrer_fee: u128,
    },
    PublishSaleResultsInitialized,
    SaleResultsPublished {
        claim_merkle_root: Word,
        accepted_merkle_root: Word,
        tokens_allocated: u128,
        capital_raised: u128,
        private_key: Word,
    },
    SaleCanceled,
    SalePaused,
    SaleUnpaused,
    EmergencyWithdraw {
        receiver: Address,
        token: Address,
        amount: u128,
    },
    LegionAddressesSynced {
        operator: Address,
        fee_receiver: Address,
        signer: Address,
        vesting_factory: Address,
    },
}

impl SaleEvent {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CapitalInvested { .. } => "CapitalInvested",
            Self::CapitalRefunded { .. } => "CapitalRefunded",
            Self::CapitalRefundedAfterCancel { .. } => "CapitalRefundedAfterCancel",
            Self::ExcessCapitalWithdrawn { .. } => "ExcessCapitalWithdrawn",
            Self::TokenAllocationClaimed { .. } => "TokenAllocationClaimed",
            Self::CapitalWithdrawn { .. } => "CapitalWithdrawn",
            Self::TokensSuppliedForDistribution { .. } => "TokensSuppliedForDistribution",
            Self::PublishSaleResultsInitialized => "PublishSaleResultsInitialized",
            Self::SaleResultsPublished { .. } => "SaleResultsPublished",
            Self::SaleCanceled => "SaleCanceled",
            Self::SalePaused => "SalePaused",
            Self::SaleUnpaused => "SaleUnpaused",
            Self::EmergencyWithdraw { .. } => "EmergencyWithdraw",
            Self::LegionAddressesSynced { .. } => "LegionAddressesSynced",
        }
    }
}
