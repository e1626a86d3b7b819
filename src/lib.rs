//! Binary Merkle tree with single-leaf inclusion proofs
//!
//! ```rust
//! use merkle_inclusion::{verify_proof, DigestProvider, Keccak256, MerkleTree};
//!
//! let blocks = ["hello1", "hello2", "hello3"];
//! let tree = MerkleTree::<Keccak256>::build(&blocks).unwrap();
//! let proof = tree.proof_for_index(2).unwrap();
//!
//! let leaf = Keccak256::hash(b"hello3");
//! assert!(verify_proof::<Keccak256>(&leaf, tree.root_hash(), proof.steps()).unwrap());
//! ```

mod error;
mod hash;
mod node;
mod proof;
mod tree;

#[cfg(test)]
mod proptest;

pub use blake2::Blake2s256;
pub use sha3::{Keccak256, Sha3_256};

pub use crate::{
    error::Error,
    hash::{DigestProvider, MerkleHash, HASH_SIZE},
    node::{make_leaves, Leaf, Node, NodeId},
    proof::{proof, verify_proof, MerkleProof, Position, ProofStep},
    tree::MerkleTree,
};
