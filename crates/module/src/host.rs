//! Collaborators the sale calls out to.
//!
//! The engine never holds balances itself. Token movement, vesting wallets
//! and role lookup go through these traits so the same sale logic runs
//! against the in-memory implementations in [`crate::memory`] or anything
//! else that honors the contracts.

use thiserror::Error;

use sale_types::{Address, Word};

/// Errors raised by a token ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    #[error("Insufficient allowance: need {needed}, have {available}")]
    InsufficientAllowance { needed: u128, available: u128 },

    #[error("Balance overflow")]
    Overflow,
}

/// Errors raised by a vesting factory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VestingError {
    #[error("Unknown vesting wallet")]
    UnknownWallet,

    #[error("Invalid vesting schedule")]
    InvalidSchedule,

    #[error("Token error: {0}")]
    Token(#[from] TokenError),
}

/// Fungible token balances, keyed by token address.
pub trait TokenLedger {
    /// Move `amount` of `token` from `from` to `to`.
    fn transfer(&mut self, token: &Address, from: &Address, to: &Address, amount: u128) -> Result<(), TokenError>;

    /// Move `amount` of `token` from `from` to `to` against the allowance
    /// `from` granted to `spender`.
    fn transfer_from(
        &mut self,
        token: &Address,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), TokenError>;

    fn balance_of(&self, token: &Address, holder: &Address) -> u128;
}

/// Creates and releases linear vesting wallets.
pub trait VestingFactory {
    /// Deploy a wallet for `beneficiary` vesting from `start_time`.
    fn create_vesting(
        &mut self,
        beneficiary: &Address,
        start_time: u64,
        duration_seconds: u64,
        cliff_duration_seconds: u64,
    ) -> Result<Address, VestingError>;

    /// Release whatever `wallet` has vested in `token` at `now`.
    ///
    /// Returns the amount moved to the beneficiary.
    fn release(
        &mut self,
        wallet: &Address,
        token: &Address,
        now: u64,
        tokens: &mut dyn TokenLedger,
    ) -> Result<u128, VestingError>;
}

/// Keyed lookup of well-known role addresses.
pub trait AddressRegistry {
    /// Address registered under `id`, or the zero address.
    fn get_address(&self, id: &Word) -> Address;
}

/// Collaborators available to a single call.
pub struct Env<'a> {
    pub tokens: &'a mut dyn TokenLedger,
    /// The factory registered under `LEGION_VESTING_FACTORY_ID`; the host binds it
    /// to the address in `RoleAddresses::vesting_factory`.
    pub vesting: &'a mut dyn VestingFactory,
    pub registry: &'a dyn AddressRegistry,
}
