//! Property-based tests for tree construction, proofs and verification.

use proptest::prelude::*;

use crate::{proof, verify_proof, DigestProvider, Keccak256, MerkleTree, Sha3_256};

/// Generate arbitrary data blocks of varying size
fn arb_blocks(max_count: usize) -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(prop::collection::vec(any::<u8>(), 0..64), 1..max_count)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Rebuilding from the same blocks yields the same root
    #[test]
    fn prop_root_deterministic(blocks in arb_blocks(40)) {
        let first = MerkleTree::<Keccak256>::build(&blocks).expect("build should succeed");
        let second = MerkleTree::<Keccak256>::build(&blocks).expect("build should succeed");
        prop_assert_eq!(first.root_hash(), second.root_hash());
    }

    /// Every leaf's proof verifies against the root
    #[test]
    fn prop_all_leaves_provable(blocks in arb_blocks(40)) {
        let tree = MerkleTree::<Sha3_256>::build(&blocks).expect("build should succeed");
        for (i, id) in tree.leaves().enumerate() {
            let proof = proof(&tree, id).expect("proof should succeed");
            let leaf = Sha3_256::hash(&blocks[i]);
            prop_assert_eq!(proof.len(), tree.depth());
            prop_assert!(proof.verify(&leaf, tree.root_hash()).expect("verify should not error"));
        }
    }

    /// Flipping one bit anywhere in the inputs makes verification fail
    #[test]
    fn prop_tamper_sensitivity(
        blocks in arb_blocks(24),
        pick in any::<prop::sample::Index>(),
        byte in 0usize..32,
        bit in 0u8..8,
    ) {
        prop_assume!(blocks.len() >= 2);
        let tree = MerkleTree::<Keccak256>::build(&blocks).expect("build should succeed");
        let index = pick.index(blocks.len());
        let leaf = Keccak256::hash(&blocks[index]);
        let root = *tree.root_hash();
        let steps = tree.proof_for_index(index).expect("proof should succeed").steps().to_vec();

        let mut bad_leaf = leaf;
        bad_leaf.0[byte] ^= 1 << bit;
        prop_assert!(!verify_proof::<Keccak256>(&bad_leaf, &root, &steps).expect("well formed"));

        let mut bad_root = root;
        bad_root.0[byte] ^= 1 << bit;
        prop_assert!(!verify_proof::<Keccak256>(&leaf, &bad_root, &steps).expect("well formed"));

        let level = pick.index(steps.len());
        let mut bad_steps = steps.clone();
        bad_steps[level].sibling[byte] ^= 1 << bit;
        prop_assert!(!verify_proof::<Keccak256>(&leaf, &root, &bad_steps).expect("well formed"));
    }

    /// The last leaf of an odd-sized input still proves against the root
    #[test]
    fn prop_odd_last_leaf_provable(half in 1usize..30) {
        let n = 2 * half + 1;
        let blocks: Vec<Vec<u8>> = (0..n).map(|i| format!("leaf{i}").into_bytes()).collect();
        let tree = MerkleTree::<Keccak256>::build(&blocks).expect("build should succeed");
        let proof = tree.proof_for_index(n - 1).expect("proof should succeed");
        let leaf = Keccak256::hash(&blocks[n - 1]);

        prop_assert_eq!(proof.steps()[0].sibling.as_slice(), &leaf[..]);
        prop_assert!(proof.verify(&leaf, tree.root_hash()).expect("verify should not error"));
    }

    /// Proof length is the ceiling of log2 of the leaf count
    #[test]
    fn prop_proof_length_logarithmic(n in 1usize..300) {
        let blocks: Vec<Vec<u8>> = (0..n).map(|i| i.to_be_bytes().to_vec()).collect();
        let tree = MerkleTree::<Keccak256>::build(&blocks).expect("build should succeed");
        let expected = n.next_power_of_two().trailing_zeros() as usize;
        prop_assert_eq!(tree.depth(), expected);
        prop_assert_eq!(tree.proof_for_index(n / 2).expect("proof should succeed").len(), expected);
    }
}
