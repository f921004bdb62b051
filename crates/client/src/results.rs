//! Sale result publication.
//!
//! After the sale closes the keyholder decrypts every logged bid, decides the
//! accepted capital and token allocation per investor, and publishes two
//! merkle roots plus the private key. Each investor later needs a proof
//! against one of those roots to claim tokens or withdraw excess capital.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as, DisplayFromStr};

use sale_crypto::{open_sealed_bid, AuctionKeypair, MerkleTree};
use sale_module::SaleCall;
use sale_types::{Address, SaleEvent, Word, ZERO_ADDRESS};

use crate::bid::SealError;

/// A decrypted bid, net of refunds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedBid {
    pub investor: Address,
    pub invested_capital: u128,
    pub amount_out: u128,
}

/// Decrypt every live bid from the sale's event log.
///
/// A refund removes the investor entirely, matching the on-chain latch.
pub fn collect_bids(events: &[SaleEvent], keypair: &AuctionKeypair) -> Result<Vec<OpenedBid>, SealError> {
    let mut bids: Vec<OpenedBid> = Vec::new();

    for event in events {
        match event {
            SaleEvent::CapitalInvested {
                amount,
                encrypted_amount_out,
                salt,
                investor,
                ..
            } => {
                let amount_out =
                    open_sealed_bid(encrypted_amount_out, salt, &keypair.public_key, &keypair.private_key)?;
                match bids.iter_mut().find(|bid| bid.investor == *investor) {
                    Some(bid) => {
                        bid.invested_capital = bid
                            .invested_capital
                            .checked_add(*amount)
                            .ok_or(SealError::AmountOverflow)?;
                        // Latest bid wins
                        bid.amount_out = amount_out;
                    }
                    None => bids.push(OpenedBid {
                        investor: *investor,
                        invested_capital: *amount,
                        amount_out,
                    }),
                }
            }
            SaleEvent::CapitalRefunded { investor, .. } => {
                bids.retain(|bid| bid.investor != *investor);
            }
            _ => {}
        }
    }

    Ok(bids)
}

/// Final outcome for one investor.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    #[serde_as(as = "Hex")]
    pub investor: Address,
    #[serde_as(as = "DisplayFromStr")]
    pub invested_capital: u128,
    #[serde_as(as = "DisplayFromStr")]
    pub accepted_capital: u128,
    #[serde_as(as = "DisplayFromStr")]
    pub tokens: u128,
}

impl Allocation {
    pub fn excess_capital(&self) -> u128 {
        self.invested_capital.saturating_sub(self.accepted_capital)
    }
}

/// Allocation together with its inclusion proofs.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationEntry {
    pub allocation: Allocation,
    #[serde_as(as = "Vec<Hex>")]
    pub claim_proof: Vec<Word>,
    #[serde_as(as = "Vec<Hex>")]
    pub accepted_proof: Vec<Word>,
}

/// Everything needed to publish results and settle every investor.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleResultsBundle {
    #[serde_as(as = "Hex")]
    pub claim_merkle_root: Word,
    #[serde_as(as = "Hex")]
    pub accepted_merkle_root: Word,
    #[serde_as(as = "DisplayFromStr")]
    pub tokens_allocated: u128,
    #[serde_as(as = "DisplayFromStr")]
    pub capital_raised: u128,
    #[serde_as(as = "Hex")]
    pub private_key: Word,
    pub entries: Vec<AllocationEntry>,
}

impl SaleResultsBundle {
    pub fn publish_call(&self) -> SaleCall {
        SaleCall::PublishSaleResults {
            claim_merkle_root: self.claim_merkle_root,
            accepted_merkle_root: self.accepted_merkle_root,
            tokens_allocated: self.tokens_allocated,
            capital_raised: self.capital_raised,
            private_key: self.private_key,
        }
    }

    pub fn entry(&self, investor: &Address) -> Option<&AllocationEntry> {
        self.entries.iter().find(|entry| entry.allocation.investor == *investor)
    }

    /// Claim call for `investor`, if they were allocated any tokens.
    pub fn claim_call(&self, investor: &Address) -> Option<SaleCall> {
        let entry = self.entry(investor)?;
        if entry.allocation.tokens == 0 {
            return None;
        }
        Some(SaleCall::ClaimTokenAllocation {
            amount: entry.allocation.tokens,
            proof: entry.claim_proof.clone(),
        })
    }

    /// Excess withdrawal call for `investor`, if part of their capital was not accepted.
    pub fn withdraw_excess_call(&self, investor: &Address) -> Option<SaleCall> {
        let entry = self.entry(investor)?;
        let amount = entry.allocation.excess_capital();
        if amount == 0 {
            return None;
        }
        Some(SaleCall::WithdrawExcessInvestedCapital {
            amount,
            proof: entry.accepted_proof.clone(),
        })
    }
}

/// Assembles allocations into a [`SaleResultsBundle`].
pub struct ResultsBuilder {
    private_key: Word,
    allocations: Vec<Allocation>,
    seen: HashSet<Address>,
}

impl ResultsBuilder {
    pub fn new(keypair: &AuctionKeypair) -> Self {
        Self {
            private_key: keypair.private_key,
            allocations: Vec::new(),
            seen: HashSet::new(),
        }
    }

    pub fn allocation(mut self, allocation: Allocation) -> Result<Self, SealError> {
        if allocation.investor == ZERO_ADDRESS {
            return Err(SealError::ZeroInvestor);
        }
        if allocation.accepted_capital > allocation.invested_capital {
            return Err(SealError::AcceptedExceedsInvested(hex::encode(allocation.investor)));
        }
        if !self.seen.insert(allocation.investor) {
            return Err(SealError::DuplicateInvestor(hex::encode(allocation.investor)));
        }
        self.allocations.push(allocation);
        Ok(self)
    }

    pub fn allocations(self, allocations: impl IntoIterator<Item = Allocation>) -> Result<Self, SealError> {
        allocations.into_iter().try_fold(self, |builder, allocation| builder.allocation(allocation))
    }

    pub fn build(self) -> Result<SaleResultsBundle, SealError> {
        if self.allocations.is_empty() {
            return Err(SealError::NoAllocations);
        }

        let claims: Vec<(Address, u128)> = self.allocations.iter().map(|a| (a.investor, a.tokens)).collect();
        let accepted: Vec<(Address, u128)> = self
            .allocations
            .iter()
            .map(|a| (a.investor, a.accepted_capital))
            .collect();
        let claim_tree = MerkleTree::from_allocations(&claims)?;
        let accepted_tree = MerkleTree::from_allocations(&accepted)?;

        let mut tokens_allocated: u128 = 0;
        let mut capital_raised: u128 = 0;
        let mut entries = Vec::with_capacity(self.allocations.len());
        for (index, allocation) in self.allocations.into_iter().enumerate() {
            tokens_allocated = tokens_allocated
                .checked_add(allocation.tokens)
                .ok_or(SealError::AmountOverflow)?;
            capital_raised = capital_raised
                .checked_add(allocation.accepted_capital)
                .ok_or(SealError::AmountOverflow)?;
            entries.push(AllocationEntry {
                claim_proof: claim_tree.proof(index).unwrap_or_default(),
                accepted_proof: accepted_tree.proof(index).unwrap_or_default(),
                allocation,
            });
        }

        Ok(SaleResultsBundle {
            claim_merkle_root: claim_tree.root(),
            accepted_merkle_root: accepted_tree.root(),
            tokens_allocated,
            capital_raised,
            private_key: self.private_key,
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bid::create_sealed_bid;
    use rand::rngs::OsRng;
    use sale_crypto::{investor_leaf, merkle};

    const ALICE: Address = [1u8; 20];
    const BOB: Address = [2u8; 20];
    const CAROL: Address = [3u8; 20];

    fn invested(keypair: &AuctionKeypair, investor: Address, amount: u128, amount_out: u128) -> SaleEvent {
        let bid = create_sealed_bid(keypair, &investor, amount_out).unwrap();
        SaleEvent::CapitalInvested {
            amount,
            encrypted_amount_out: bid.sealed_bid.encrypted_amount_out,
            salt: bid.sealed_bid.salt,
            investor,
            invested_at: 1,
        }
    }

    fn allocation(investor: Address, invested: u128, accepted: u128, tokens: u128) -> Allocation {
        Allocation {
            investor,
            invested_capital: invested,
            accepted_capital: accepted,
            tokens,
        }
    }

    #[test]
    fn test_collect_bids_nets_refunds() {
        let keypair = AuctionKeypair::generate(&mut OsRng);
        let events = vec![
            invested(&keypair, ALICE, 6_000, 400_000),
            invested(&keypair, BOB, 6_000, 600_000),
            invested(&keypair, CAROL, 2_000, 1),
            SaleEvent::CapitalRefunded {
                amount: 2_000,
                investor: CAROL,
            },
            SaleEvent::SalePaused,
        ];

        let bids = collect_bids(&events, &keypair).unwrap();
        assert_eq!(
            bids,
            vec![
                OpenedBid {
                    investor: ALICE,
                    invested_capital: 6_000,
                    amount_out: 400_000
                },
                OpenedBid {
                    investor: BOB,
                    invested_capital: 6_000,
                    amount_out: 600_000
                },
            ]
        );
    }

    #[test]
    fn test_collect_bids_wrong_key_fails_or_garbles() {
        let keypair = AuctionKeypair::generate(&mut OsRng);
        let other = AuctionKeypair::generate(&mut OsRng);
        let events = vec![invested(&keypair, ALICE, 1_000, 7)];

        // A foreign key yields a random 256-bit value, which almost never fits u128
        match collect_bids(&events, &other) {
            Ok(bids) => assert_ne!(bids[0].amount_out, 7),
            Err(err) => assert!(matches!(err, SealError::Crypto(_))),
        }
    }

    #[test]
    fn test_bundle_proofs_verify() {
        let keypair = AuctionKeypair::generate(&mut OsRng);
        let bundle = ResultsBuilder::new(&keypair)
            .allocations([
                allocation(ALICE, 6_000, 4_000, 400_000),
                allocation(BOB, 6_000, 6_000, 600_000),
                allocation(CAROL, 500, 0, 0),
            ])
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(bundle.tokens_allocated, 1_000_000);
        assert_eq!(bundle.capital_raised, 10_000);
        assert_eq!(bundle.private_key, keypair.private_key);

        for entry in &bundle.entries {
            let a = &entry.allocation;
            assert!(merkle::verify(
                &entry.claim_proof,
                &bundle.claim_merkle_root,
                &investor_leaf(&a.investor, a.tokens)
            ));
            assert!(merkle::verify(
                &entry.accepted_proof,
                &bundle.accepted_merkle_root,
                &investor_leaf(&a.investor, a.accepted_capital)
            ));
        }
    }

    #[test]
    fn test_bundle_calls() {
        let keypair = AuctionKeypair::generate(&mut OsRng);
        let bundle = ResultsBuilder::new(&keypair)
            .allocation(allocation(ALICE, 6_000, 4_000, 400_000))
            .unwrap()
            .allocation(allocation(BOB, 6_000, 6_000, 600_000))
            .unwrap()
            .build()
            .unwrap();

        assert!(matches!(
            bundle.claim_call(&ALICE),
            Some(SaleCall::ClaimTokenAllocation { amount: 400_000, .. })
        ));
        assert!(matches!(
            bundle.withdraw_excess_call(&ALICE),
            Some(SaleCall::WithdrawExcessInvestedCapital { amount: 2_000, .. })
        ));
        assert!(bundle.withdraw_excess_call(&BOB).is_none());
        assert!(bundle.claim_call(&CAROL).is_none());
        assert!(matches!(
            bundle.publish_call(),
            SaleCall::PublishSaleResults {
                tokens_allocated: 1_000_000,
                capital_raised: 10_000,
                ..
            }
        ));
    }

    #[test]
    fn test_builder_rejects_bad_allocations() {
        let keypair = AuctionKeypair::generate(&mut OsRng);
        assert!(matches!(
            ResultsBuilder::new(&keypair).build(),
            Err(SealError::NoAllocations)
        ));
        assert!(matches!(
            ResultsBuilder::new(&keypair).allocation(allocation(ALICE, 1, 2, 0)),
            Err(SealError::AcceptedExceedsInvested(_))
        ));
        assert!(matches!(
            ResultsBuilder::new(&keypair).allocation(allocation(ZERO_ADDRESS, 1, 1, 0)),
            Err(SealError::ZeroInvestor)
        ));
        let builder = ResultsBuilder::new(&keypair)
            .allocation(allocation(ALICE, 1, 1, 1))
            .unwrap();
        assert!(matches!(
            builder.allocation(allocation(ALICE, 2, 2, 2)),
            Err(SealError::DuplicateInvestor(_))
        ));
    }

    #[test]
    fn test_bundle_json_roundtrip() {
        let keypair = AuctionKeypair::generate(&mut OsRng);
        let bundle = ResultsBuilder::new(&keypair)
            .allocation(allocation(ALICE, 6_000, 4_000, 400_000))
            .unwrap()
            .build()
            .unwrap();

        let json = serde_json::to_string(&bundle).unwrap();
        assert!(json.contains("\"400000\""));
        let parsed: SaleResultsBundle = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, bundle);
    }
}
