//! In-memory collaborators.
//!
//! Used by the runtime, the mock chain and tests. All three are plain
//! `Clone` values so a runtime can snapshot them around a call.

use std::collections::HashMap;

use sale_types::{keccak256, mul_div_floor, Address, Word, ZERO_ADDRESS};

use crate::host::{AddressRegistry, TokenError, TokenLedger, VestingError, VestingFactory};

/// Balances and allowances for any number of tokens.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InMemoryTokenLedger {
    balances: HashMap<(Address, Address), u128>,
    allowances: HashMap<(Address, Address, Address), u128>,
}

impl InMemoryTokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `amount` of `token` out of thin air for `holder`.
    pub fn mint(&mut self, token: &Address, holder: &Address, amount: u128) -> Result<(), TokenError> {
        let balance = self.balances.entry((*token, *holder)).or_default();
        *balance = balance.checked_add(amount).ok_or(TokenError::Overflow)?;
        Ok(())
    }

    /// Set the allowance `owner` grants `spender`.
    pub fn approve(&mut self, token: &Address, owner: &Address, spender: &Address, amount: u128) {
        self.allowances.insert((*token, *owner, *spender), amount);
    }

    pub fn allowance(&self, token: &Address, owner: &Address, spender: &Address) -> u128 {
        self.allowances
            .get(&(*token, *owner, *spender))
            .copied()
            .unwrap_or_default()
    }

    fn move_balance(&mut self, token: &Address, from: &Address, to: &Address, amount: u128) -> Result<(), TokenError> {
        let available = self.balance_of(token, from);
        if available < amount {
            return Err(TokenError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        let receiving = self.balance_of(token, to);
        if from != to {
            receiving.checked_add(amount).ok_or(TokenError::Overflow)?;
        }
        *self.balances.entry((*token, *from)).or_default() -= amount;
        *self.balances.entry((*token, *to)).or_default() += amount;
        Ok(())
    }
}

impl TokenLedger for InMemoryTokenLedger {
    fn transfer(&mut self, token: &Address, from: &Address, to: &Address, amount: u128) -> Result<(), TokenError> {
        self.move_balance(token, from, to, amount)
    }

    fn transfer_from(
        &mut self,
        token: &Address,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), TokenError> {
        let allowed = self.allowance(token, from, spender);
        if allowed < amount {
            return Err(TokenError::InsufficientAllowance {
                needed: amount,
                available: allowed,
            });
        }
        self.move_balance(token, from, to, amount)?;
        self.allowances.insert((*token, *from, *spender), allowed - amount);
        Ok(())
    }

    fn balance_of(&self, token: &Address, holder: &Address) -> u128 {
        self.balances.get(&(*token, *holder)).copied().unwrap_or_default()
    }
}

/// A linear vesting wallet with a cliff.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VestingWallet {
    pub beneficiary: Address,
    pub start_time: u64,
    pub duration_seconds: u64,
    pub cliff_duration_seconds: u64,
    /// Amount already released, per token
    pub released: HashMap<Address, u128>,
}

impl VestingWallet {
    /// Amount of `total_allocation` vested at `now`.
    pub fn vested_amount(&self, total_allocation: u128, now: u64) -> u128 {
        let cliff_end = self.start_time.saturating_add(self.cliff_duration_seconds);
        if now < cliff_end {
            return 0;
        }
        let elapsed = now - self.start_time;
        if elapsed >= self.duration_seconds {
            return total_allocation;
        }
        mul_div_floor(
            total_allocation,
            u128::from(elapsed),
            u128::from(self.duration_seconds),
        )
        .unwrap_or(total_allocation)
    }
}

/// Factory that hands out deterministic wallet addresses.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InMemoryVestingFactory {
    nonce: u64,
    wallets: HashMap<Address, VestingWallet>,
}

impl InMemoryVestingFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wallet(&self, address: &Address) -> Option<&VestingWallet> {
        self.wallets.get(address)
    }

    fn next_address(&mut self, beneficiary: &Address) -> Address {
        self.nonce += 1;
        let mut preimage = Vec::with_capacity(28);
        preimage.extend_from_slice(beneficiary);
        preimage.extend_from_slice(&self.nonce.to_be_bytes());
        let hash = keccak256(&preimage);
        let mut address = [0u8; 20];
        address.copy_from_slice(&hash[12..]);
        address
    }
}

impl VestingFactory for InMemoryVestingFactory {
    fn create_vesting(
        &mut self,
        beneficiary: &Address,
        start_time: u64,
        duration_seconds: u64,
        cliff_duration_seconds: u64,
    ) -> Result<Address, VestingError> {
        if *beneficiary == ZERO_ADDRESS || cliff_duration_seconds > duration_seconds {
            return Err(VestingError::InvalidSchedule);
        }
        let address = self.next_address(beneficiary);
        self.wallets.insert(
            address,
            VestingWallet {
                beneficiary: *beneficiary,
                start_time,
                duration_seconds,
                cliff_duration_seconds,
                released: HashMap::new(),
            },
        );
        Ok(address)
    }

    fn release(
        &mut self,
        wallet: &Address,
        token: &Address,
        now: u64,
        tokens: &mut dyn TokenLedger,
    ) -> Result<u128, VestingError> {
        let vesting = self.wallets.get_mut(wallet).ok_or(VestingError::UnknownWallet)?;
        let released = vesting.released.get(token).copied().unwrap_or_default();
        let total = tokens
            .balance_of(token, wallet)
            .checked_add(released)
            .ok_or(TokenError::Overflow)?;
        let releasable = vesting.vested_amount(total, now).saturating_sub(released);
        if releasable != 0 {
            tokens.transfer(token, wallet, &vesting.beneficiary, releasable)?;
            vesting.released.insert(*token, released + releasable);
        }
        Ok(releasable)
    }
}

/// Static role registry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InMemoryRegistry {
    addresses: HashMap<Word, Address>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, id: Word, address: Address) {
        self.addresses.insert(id, address);
    }
}

impl AddressRegistry for InMemoryRegistry {
    fn get_address(&self, id: &Word) -> Address {
        self.addresses.get(id).copied().unwrap_or(ZERO_ADDRESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: Address = [0x70; 20];
    const ALICE: Address = [0x01; 20];
    const BOB: Address = [0x02; 20];
    const SALE: Address = [0x5a; 20];

    #[test]
    fn test_transfer_moves_balance() {
        let mut ledger = InMemoryTokenLedger::new();
        ledger.mint(&TOKEN, &ALICE, 100).unwrap();
        ledger.transfer(&TOKEN, &ALICE, &BOB, 40).unwrap();
        assert_eq!(ledger.balance_of(&TOKEN, &ALICE), 60);
        assert_eq!(ledger.balance_of(&TOKEN, &BOB), 40);
    }

    #[test]
    fn test_transfer_insufficient_balance() {
        let mut ledger = InMemoryTokenLedger::new();
        ledger.mint(&TOKEN, &ALICE, 10).unwrap();
        assert_eq!(
            ledger.transfer(&TOKEN, &ALICE, &BOB, 11),
            Err(TokenError::InsufficientBalance {
                needed: 11,
                available: 10
            })
        );
        assert_eq!(ledger.balance_of(&TOKEN, &ALICE), 10);
    }

    #[test]
    fn test_transfer_from_consumes_allowance() {
        let mut ledger = InMemoryTokenLedger::new();
        ledger.mint(&TOKEN, &ALICE, 100).unwrap();
        ledger.approve(&TOKEN, &ALICE, &SALE, 50);

        ledger.transfer_from(&TOKEN, &SALE, &ALICE, &SALE, 30).unwrap();
        assert_eq!(ledger.allowance(&TOKEN, &ALICE, &SALE), 20);
        assert_eq!(ledger.balance_of(&TOKEN, &SALE), 30);

        assert_eq!(
            ledger.transfer_from(&TOKEN, &SALE, &ALICE, &SALE, 21),
            Err(TokenError::InsufficientAllowance {
                needed: 21,
                available: 20
            })
        );
    }

    #[test]
    fn test_vesting_release_schedule() {
        let mut ledger = InMemoryTokenLedger::new();
        let mut factory = InMemoryVestingFactory::new();
        let wallet = factory.create_vesting(&ALICE, 1_000, 100, 10).unwrap();
        ledger.mint(&TOKEN, &wallet, 1_000).unwrap();

        // Before the cliff
        assert_eq!(factory.release(&wallet, &TOKEN, 1_005, &mut ledger).unwrap(), 0);
        // Halfway
        assert_eq!(factory.release(&wallet, &TOKEN, 1_050, &mut ledger).unwrap(), 500);
        assert_eq!(factory.release(&wallet, &TOKEN, 1_050, &mut ledger).unwrap(), 0);
        // Fully vested
        assert_eq!(factory.release(&wallet, &TOKEN, 2_000, &mut ledger).unwrap(), 500);
        assert_eq!(ledger.balance_of(&TOKEN, &ALICE), 1_000);
        assert_eq!(ledger.balance_of(&TOKEN, &wallet), 0);
    }

    #[test]
    fn test_vesting_addresses_are_unique() {
        let mut factory = InMemoryVestingFactory::new();
        let a = factory.create_vesting(&ALICE, 0, 10, 0).unwrap();
        let b = factory.create_vesting(&ALICE, 0, 10, 0).unwrap();
        assert_ne!(a, b);
        assert_eq!(factory.wallet(&a).unwrap().beneficiary, ALICE);
    }

    #[test]
    fn test_unknown_wallet() {
        let mut ledger = InMemoryTokenLedger::new();
        let mut factory = InMemoryVestingFactory::new();
        assert_eq!(
            factory.release(&BOB, &TOKEN, 0, &mut ledger),
            Err(VestingError::UnknownWallet)
        );
    }

    #[test]
    fn test_registry_defaults_to_zero() {
        let mut registry = InMemoryRegistry::new();
        let id = sale_types::LEGION_SIGNER_ID;
        assert_eq!(registry.get_address(&id), ZERO_ADDRESS);
        registry.set(id, ALICE);
        assert_eq!(registry.get_address(&id), ALICE);
    }
}
