//! Core type definitions for sealed-bid token sales.
//!
//! This crate provides the shared data structures used across the sale system:
//! addresses and 256-bit words, curve points for bid encryption, the per-sale
//! configuration and status records, investor positions, and the event log.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

pub mod events;

pub use events::SaleEvent;

// =========================
// PRIMITIVES
// =========================

/// 20-byte account or token address.
pub type Address = [u8; 20];

/// 256-bit big-endian word (EVM `uint256` / `bytes32`).
pub type Word = [u8; 32];

/// The all-zero address.
pub const ZERO_ADDRESS: Address = [0u8; 20];

/// The all-zero word.
pub const ZERO_WORD: Word = [0u8; 32];

/// Denominator for basis-point fee rates.
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Denominator for the TGE allocation rate (1e18 = 100%).
pub const RATE_DENOMINATOR: u128 = 1_000_000_000_000_000_000;

/// Affine point on the alt_bn128 G1 curve, coordinates big-endian.
///
/// The point at infinity is encoded as `(0, 0)`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct CurvePoint {
    pub x: Word,
    pub y: Word,
}

impl CurvePoint {
    pub const fn new(x: Word, y: Word) -> Self {
        Self { x, y }
    }

    /// Whether this is the `(0, 0)` encoding of the point at infinity.
    pub fn is_identity(&self) -> bool {
        self.x == ZERO_WORD && self.y == ZERO_WORD
    }
}

/// Recoverable secp256k1 signature `r || s || v` (65 bytes).
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Signature(#[serde_as(as = "[_; 65]")] pub [u8; 65]);

impl Default for Signature {
    fn default() -> Self {
        Self([0u8; 65])
    }
}

// =========================
// SALE CONFIGURATION
// =========================

/// Fee rates, limits and addresses fixed at initialization.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct SaleConfiguration {
    /// Operator fee on raised capital (bps)
    pub legion_fee_on_capital_raised_bps: u16,
    /// Operator fee on tokens sold (bps)
    pub legion_fee_on_tokens_sold_bps: u16,
    /// Referrer fee on raised capital (bps)
    pub referrer_fee_on_capital_raised_bps: u16,
    /// Referrer fee on tokens sold (bps)
    pub referrer_fee_on_tokens_sold_bps: u16,
    pub minimum_invest_amount: u128,
    /// Token investors pay with
    pub bid_token: Address,
    /// Token being sold, `None` when distributed outside the engine
    pub ask_token: Option<Address>,
    pub project_admin: Address,
    pub address_registry: Address,
    pub referrer_fee_receiver: Address,
}

/// Vesting parameters applied to claimed token allocations.
#[derive(Clone, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct VestingConfiguration {
    pub vesting_duration_seconds: u64,
    pub vesting_cliff_duration_seconds: u64,
    /// Share released immediately at claim time, 1e18 = 100%
    pub token_allocation_on_tge_rate: u128,
}

/// Sale time windows, derived once at initialization.
#[derive(Clone, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct SaleSchedule {
    pub start_time: u64,
    pub end_time: u64,
    pub refund_end_time: u64,
    pub lockup_end_time: u64,
}

impl SaleSchedule {
    /// Derive the schedule from a start time and the three periods.
    ///
    /// Returns `None` if any bound overflows.
    pub fn derive(start_time: u64, sale_period: u64, refund_period: u64, lockup_period: u64) -> Option<Self> {
        let end_time = start_time.checked_add(sale_period)?;
        let refund_end_time = end_time.checked_add(refund_period)?;
        let lockup_end_time = refund_end_time.max(end_time.checked_add(lockup_period)?);
        Some(Self {
            start_time,
            end_time,
            refund_end_time,
            lockup_end_time,
        })
    }
}

/// Well-known collaborator addresses resolved from the registry.
#[derive(Clone, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct RoleAddresses {
    pub operator: Address,
    pub fee_receiver: Address,
    pub signer: Address,
    pub vesting_factory: Address,
}

// =========================
// SALE STATE
// =========================

/// Mutable sale totals and publication results.
#[derive(Clone, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct SaleStatus {
    pub total_capital_invested: u128,
    pub total_tokens_allocated: u128,
    pub total_capital_raised: u128,
    pub claim_tokens_merkle_root: Word,
    pub accepted_capital_merkle_root: Word,
    pub is_canceled: bool,
    pub tokens_supplied: bool,
    pub capital_withdrawn: bool,
}

impl SaleStatus {
    /// Results are considered published once any result field is written.
    pub fn results_published(&self) -> bool {
        self.total_capital_raised != 0
            || self.total_tokens_allocated != 0
            || self.claim_tokens_merkle_root != ZERO_WORD
            || self.accepted_capital_merkle_root != ZERO_WORD
    }
}

/// Commit-reveal key material for a sealed-bid sale.
#[derive(Clone, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct SealedBidAuctionState {
    /// Auction public key, immutable after initialization
    pub public_key: CurvePoint,
    /// Published private key, written once
    pub private_key: Option<Word>,
    /// One-way lock set by the publish initialization step
    pub cancel_locked: bool,
}

/// Per-investor accounting record.
#[derive(Clone, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct InvestorPosition {
    pub invested_capital: u128,
    pub has_refunded: bool,
    pub has_claimed_excess: bool,
    pub has_settled: bool,
    pub vesting_address: Option<Address>,
}

/// A sealed bid as submitted with an investment.
///
/// Only `encrypted_amount_out` and `salt` are recorded in events.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct SealedBid {
    pub encrypted_amount_out: Word,
    pub salt: Word,
    pub public_key: CurvePoint,
}

/// Sale lifecycle phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub enum SalePhase {
    /// Before `end_time`, accepting investments
    Open,
    /// After `end_time`, awaiting publication
    Ended,
    /// Cancellation locked, awaiting private key publication
    PublishInitialized,
    /// Results and private key published
    ResultsPublished,
    /// Raised capital withdrawn by the project
    Settled,
    /// Canceled by the project or after expiry
    Canceled,
}

// =========================
// REGISTRY IDENTIFIERS
// =========================

/// Registry key for the operator ("bouncer") address.
pub const LEGION_BOUNCER_ID: Word = registry_id(b"LEGION_BOUNCER");
/// Registry key for the operator fee receiver.
pub const LEGION_FEE_RECEIVER_ID: Word = registry_id(b"LEGION_FEE_RECEIVER");
/// Registry key for the investment authorization signer.
pub const LEGION_SIGNER_ID: Word = registry_id(b"LEGION_SIGNER");
/// Registry key for the vesting factory.
pub const LEGION_VESTING_FACTORY_ID: Word = registry_id(b"LEGION_VESTING_FACTORY");

/// Left-aligned, zero-padded `bytes32` of a short ASCII label.
pub const fn registry_id(label: &[u8]) -> Word {
    let mut out = [0u8; 32];
    let mut i = 0;
    while i < label.len() && i < 32 {
        out[i] = label[i];
        i += 1;
    }
    out
}

// =========================
// HELPER FUNCTIONS
// =========================

/// Compute Keccak-256 hash.
pub fn keccak256(data: &[u8]) -> Word {
    use sha3::{Digest, Keccak256};
    Keccak256::digest(data).into()
}

/// Salt a sealed bid must carry for `investor`: `uint256(uint160(investor))`.
pub fn investor_salt(investor: &Address) -> Word {
    address_to_word(investor)
}

/// Left-pad an address to a 32-byte word.
pub fn address_to_word(address: &Address) -> Word {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address);
    word
}

/// Encode a `u128` as a big-endian 256-bit word.
pub fn word_from_u128(value: u128) -> Word {
    let mut word = [0u8; 32];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Decode a big-endian 256-bit word into a `u128`, if it fits.
pub fn word_to_u128(word: &Word) -> Option<u128> {
    if word[..16].iter().any(|b| *b != 0) {
        return None;
    }
    let mut low = [0u8; 16];
    low.copy_from_slice(&word[16..]);
    Some(u128::from_be_bytes(low))
}

/// `floor(amount * numerator / denominator)` without a 256-bit intermediate.
///
/// Exact as long as `numerator <= denominator`. Returns `None` on a zero
/// denominator or overflow.
pub fn mul_div_floor(amount: u128, numerator: u128, denominator: u128) -> Option<u128> {
    if denominator == 0 {
        return None;
    }
    let whole = (amount / denominator).checked_mul(numerator)?;
    let part = (amount % denominator).checked_mul(numerator)? / denominator;
    whole.checked_add(part)
}

/// Bitwise XOR of two words.
pub fn xor_words(a: &Word, b: &Word) -> Word {
    let mut out = [0u8; 32];
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = a[i] ^ b[i];
    }
    out
}
