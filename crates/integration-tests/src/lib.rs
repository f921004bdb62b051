//! End-to-end integration tests for sealed-bid token sales.
//!
//! These tests exercise the full sale lifecycle:
//! 1. Key generation and sale creation
//! 2. Authorized investments carrying sealed bids
//! 3. Refunds and cancellation
//! 4. Bid decryption and result publication
//! 5. Token supply, claims, excess withdrawals and vesting
