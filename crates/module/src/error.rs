//! Sale module error types.
//!
//! Every variant aborts the whole call. Variants are grouped the way callers
//! branch on them: validation, authorization, sequence and financial.

use thiserror::Error;

use sale_types::Address;

use crate::host::{TokenError, VestingError};
use crate::params::ParamsValidationError;

/// Errors that can occur in the sale module.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaleError {
    // === Validation ===
    #[error("Invalid sale parameters: {0}")]
    InvalidParams(#[from] ParamsValidationError),

    #[error("Zero address provided")]
    ZeroAddressProvided,

    #[error("Invalid sealed bid encoding")]
    InvalidSealedBidEncoding,

    #[error("Invalid bid public key")]
    InvalidBidPublicKey,

    #[error("Invalid bid private key")]
    InvalidBidPrivateKey,

    #[error("Invalid salt")]
    InvalidSalt,

    #[error("Invalid investment signature")]
    InvalidSignature,

    #[error("Decrypted amount out of range")]
    InvalidDecryptedAmount,

    // === Authorization ===
    #[error("Not called by the operator")]
    NotCalledByOperator,

    #[error("Not called by the project")]
    NotCalledByProject,

    // === State / sequence ===
    #[error("Sale already initialized")]
    SaleAlreadyInitialized,

    #[error("Sale not initialized")]
    SaleNotInitialized,

    #[error("Sale is canceled")]
    SaleIsCanceled,

    #[error("Sale is not canceled")]
    SaleIsNotCanceled,

    #[error("Sale has ended")]
    SaleHasEnded,

    #[error("Sale is paused")]
    SalePaused,

    #[error("Sale is not paused")]
    SaleNotPaused,

    #[error("Refund period is over")]
    RefundPeriodIsOver,

    #[error("Refund period is not over")]
    RefundPeriodIsNotOver,

    #[error("Lockup period is not over")]
    LockupPeriodIsNotOver,

    #[error("Sale results already published")]
    SaleResultsAlreadyPublished,

    #[error("Sale results not published")]
    SaleResultsNotPublished,

    #[error("Cancel locked")]
    CancelLocked,

    #[error("Cancel not locked")]
    CancelNotLocked,

    #[error("Private key already published")]
    PrivateKeyAlreadyPublished,

    #[error("Private key not published")]
    PrivateKeyNotPublished,

    #[error("Tokens already supplied")]
    TokensAlreadySupplied,

    #[error("Tokens not supplied")]
    TokensNotSupplied,

    #[error("Ask token unavailable")]
    AskTokenUnavailable,

    #[error("Capital already withdrawn")]
    CapitalAlreadyWithdrawn,

    #[error("Investor has refunded")]
    AlreadyRefunded,

    #[error("Investor has claimed excess capital")]
    AlreadyClaimedExcess,

    #[error("Investor has settled")]
    AlreadySettled,

    #[error("No vesting wallet for investor")]
    NoVestingAddress,

    // === Financial ===
    #[error("Investment below minimum: need {minimum}, got {got}")]
    InvestmentBelowMinimum { minimum: u128, got: u128 },

    #[error("Invalid fee amount: expected {expected}, got {got}")]
    InvalidFeeAmount { expected: u128, got: u128 },

    #[error("Invalid token amount supplied: expected {expected}, got {got}")]
    InvalidTokenAmountSupplied { expected: u128, got: u128 },

    #[error("Invalid refund amount")]
    InvalidRefundAmount,

    #[error("Invalid withdraw amount")]
    InvalidWithdrawAmount,

    #[error("Invalid claim amount")]
    InvalidClaimAmount,

    #[error("Cannot claim tokens: proof rejected")]
    CannotClaimTokens,

    #[error("Cannot withdraw excess capital: proof rejected")]
    CannotWithdrawExcessCapital,

    #[error("Ledger underflow for investor {investor:?}: requested {requested}, available {available}")]
    LedgerUnderflow {
        investor: Address,
        requested: u128,
        available: u128,
    },

    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    // === Collaborators ===
    #[error("Token transfer failed: {0}")]
    TransferFailed(#[from] TokenError),

    #[error("Vesting operation failed: {0}")]
    VestingFailed(#[from] VestingError),
}
