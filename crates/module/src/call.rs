//! Call message types for the sale module.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use sale_types::{Address, Signature, Word};

/// Call messages for the sale module.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub enum SaleCall {
    // === Investment ===
    /// Invest with an ABI-encoded sealed bid and an authorization signature.
    Invest {
        amount: u128,
        sealed_bid: Vec<u8>,
        signature: Signature,
    },

    /// Take back the full position during the refund window.
    Refund,

    // === Publication (operator) ===
    InitializePublishSaleResults,

    PublishSaleResults {
        claim_merkle_root: Word,
        accepted_merkle_root: Word,
        tokens_allocated: u128,
        capital_raised: u128,
        private_key: Word,
    },

    // === Cancellation ===
    /// Project cancels before results are published.
    CancelSale,

    /// Anyone cancels after lockup if the project never delivered.
    CancelExpiredSale,

    WithdrawInvestedCapitalIfCanceled,

    // === Settlement ===
    SupplyTokens {
        amount: u128,
        legion_fee: u128,
        referrer_fee: u128,
    },

    WithdrawRaisedCapital,

    ClaimTokenAllocation { amount: u128, proof: Vec<Word> },

    WithdrawExcessInvestedCapital { amount: u128, proof: Vec<Word> },

    ReleaseVestedTokens,

    // === Admin (operator) ===
    EmergencyWithdraw {
        receiver: Address,
        token: Address,
        amount: u128,
    },

    PauseSale,

    UnpauseSale,

    SyncAddresses,
}

impl SaleCall {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Invest { .. } => "invest",
            Self::Refund => "refund",
            Self::InitializePublishSaleResults => "initialize_publish_sale_results",
            Self::PublishSaleResults { .. } => "publish_sale_results",
            Self::CancelSale => "cancel_sale",
            Self::CancelExpiredSale => "cancel_expired_sale",
            Self::WithdrawInvestedCapitalIfCanceled => "withdraw_invested_capital_if_canceled",
            Self::SupplyTokens { .. } => "supply_tokens",
            Self::WithdrawRaisedCapital => "withdraw_raised_capital",
            Self::ClaimTokenAllocation { .. } => "claim_token_allocation",
            Self::WithdrawExcessInvestedCapital { .. } => "withdraw_excess_invested_capital",
            Self::ReleaseVestedTokens => "release_vested_tokens",
            Self::EmergencyWithdraw { .. } => "emergency_withdraw",
            Self::PauseSale => "pause_sale",
            Self::UnpauseSale => "unpause_sale",
            Self::SyncAddresses => "sync_addresses",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_borsh_roundtrip() {
        let call = SaleCall::ClaimTokenAllocation {
            amount: 42,
            proof: vec![[1u8; 32], [2u8; 32]],
        };
        let bytes = borsh::to_vec(&call).unwrap();
        assert_eq!(borsh::from_slice::<SaleCall>(&bytes).unwrap(), call);
    }
}
