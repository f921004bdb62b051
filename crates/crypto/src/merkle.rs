//! Merkle inclusion proofs over investor allocations.
//!
//! Leaves are double-hashed `keccak256(keccak256(abi.encode(investor, amount)))`
//! and internal nodes hash their children in sorted order, so a proof is just
//! the list of sibling hashes from leaf to root.

use sale_types::{address_to_word, keccak256, word_from_u128, Address, Word};

use crate::error::CryptoError;

/// Leaf committing to `amount` for `investor`.
pub fn investor_leaf(investor: &Address, amount: u128) -> Word {
    let mut encoded = [0u8; 64];
    encoded[..32].copy_from_slice(&address_to_word(investor));
    encoded[32..].copy_from_slice(&word_from_u128(amount));
    keccak256(&keccak256(&encoded))
}

/// Hash two nodes in sorted order.
pub fn hash_pair(a: &Word, b: &Word) -> Word {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut preimage = [0u8; 64];
    preimage[..32].copy_from_slice(lo);
    preimage[32..].copy_from_slice(hi);
    keccak256(&preimage)
}

/// Fold `proof` onto `leaf` and compare with `root`.
pub fn verify(proof: &[Word], root: &Word, leaf: &Word) -> bool {
    process_proof(proof, leaf) == *root
}

/// Root implied by `leaf` and its sibling path.
pub fn process_proof(proof: &[Word], leaf: &Word) -> Word {
    proof.iter().fold(*leaf, |node, sibling| hash_pair(&node, sibling))
}

/// Binary merkle tree built bottom-up from ordered leaves.
///
/// An odd node at the end of a level is promoted unchanged.
#[derive(Clone, Debug)]
pub struct MerkleTree {
    layers: Vec<Vec<Word>>,
}

impl MerkleTree {
    /// Build a tree over `leaves`.
    pub fn new(leaves: Vec<Word>) -> Result<Self, CryptoError> {
        if leaves.is_empty() {
            return Err(CryptoError::EmptyMerkleTree);
        }

        let mut layers = vec![leaves];
        while layers[layers.len() - 1].len() > 1 {
            let level = &layers[layers.len() - 1];
            let next: Vec<Word> = level
                .chunks(2)
                .map(|pair| match pair {
                    [a, b] => hash_pair(a, b),
                    [single] => *single,
                    _ => unreachable!("chunks(2) yields one or two nodes"),
                })
                .collect();
            layers.push(next);
        }

        Ok(Self { layers })
    }

    /// Build a tree over `(investor, amount)` allocations.
    pub fn from_allocations(allocations: &[(Address, u128)]) -> Result<Self, CryptoError> {
        Self::new(
            allocations
                .iter()
                .map(|(investor, amount)| investor_leaf(investor, *amount))
                .collect(),
        )
    }

    /// The tree root.
    pub fn root(&self) -> Word {
        self.layers[self.layers.len() - 1][0]
    }

    /// Number of leaves.
    pub fn len(&self) -> usize {
        self.layers[0].len()
    }

    /// Whether the tree has no leaves (never true for a built tree).
    pub fn is_empty(&self) -> bool {
        self.layers[0].is_empty()
    }

    /// Sibling path for the leaf at `index`.
    pub fn proof(&self, index: usize) -> Option<Vec<Word>> {
        if index >= self.len() {
            return None;
        }

        let mut proof = Vec::new();
        let mut idx = index;
        for level in &self.layers[..self.layers.len() - 1] {
            let sibling = idx ^ 1;
            if sibling < level.len() {
                proof.push(level[sibling]);
            }
            idx /= 2;
        }
        Some(proof)
    }
}
