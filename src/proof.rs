//! Merkle Proof generation and verification.

use crate::{
    error::Error,
    hash::{DigestProvider, MerkleHash},
    node::NodeId,
    tree::MerkleTree,
};
use log::trace;
use sha3::Keccak256;
use std::marker::PhantomData;

/// Side of the running hash on which a proof step's sibling is concatenated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Position {
    /// Sibling goes first: `H(sibling ++ running)`
    Left,
    /// Sibling goes last: `H(running ++ sibling)`
    Right,
}

impl Position {
    /// Side of the sibling for a node at `position` within its level.
    /// Pairs are always (even, odd), so an even node is the left element.
    pub fn of_sibling(position: usize) -> Self {
        if position & 1 == 0 {
            Position::Right
        } else {
            Position::Left
        }
    }
}

/// Individual proof element: one sibling digest per level
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProofStep {
    /// Digest of the sibling, kept as raw bytes so that proofs received
    /// from elsewhere can be checked for length
    pub sibling: Vec<u8>,
    pub position: Position,
}

impl ProofStep {
    /// Create new proof step
    pub fn new(sibling: impl Into<Vec<u8>>, position: Position) -> Self {
        Self {
            sibling: sibling.into(),
            position,
        }
    }
}

/// Merkle Proof for an individual leaf
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = ""))]
pub struct MerkleProof<HF: DigestProvider = Keccak256> {
    _hasher: PhantomData<HF>,
    /// Path through the tree to the root node, leaf level first
    pub(crate) path: Vec<ProofStep>,
}

impl<HF: DigestProvider> MerkleProof<HF> {
    /// Wrap proof steps obtained outside of a tree
    pub fn from_steps(path: Vec<ProofStep>) -> Self {
        Self {
            _hasher: PhantomData,
            path,
        }
    }

    pub fn steps(&self) -> &[ProofStep] {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Compute the implied Merkle Root Hash from the pre-calculated path
    pub fn compute_implied_root(&self, leaf: &[u8]) -> Result<MerkleHash, Error> {
        compute_implied_root::<HF>(leaf, &self.path)
    }

    /// Check the proof of `leaf` against a trusted root
    pub fn verify(&self, leaf: &[u8], root: &[u8]) -> Result<bool, Error> {
        verify_proof::<HF>(leaf, root, &self.path)
    }
}

impl<HF: DigestProvider> PartialEq for MerkleProof<HF> {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl<HF: DigestProvider> Eq for MerkleProof<HF> {}

impl<HF: DigestProvider> From<MerkleProof<HF>> for Vec<ProofStep> {
    fn from(proof: MerkleProof<HF>) -> Self {
        proof.path
    }
}

/// Calculate a Merkle Proof for a node of a built tree.
///
/// Walks the parent chain from `leaf` to the root, collecting the sibling
/// digest of every node on the way.
pub fn proof<HF: DigestProvider>(
    tree: &MerkleTree<HF>,
    leaf: NodeId,
) -> Result<MerkleProof<HF>, Error> {
    let mut node = tree.node(leaf)?;
    if node.parent().is_none() && leaf != tree.root_id() {
        return Err(Error::DetachedNode);
    }

    let mut path = Vec::with_capacity(tree.depth());
    while let Some(parent) = node.parent() {
        let sibling = node.sibling().ok_or(Error::DetachedNode)?;
        path.push(ProofStep::new(
            sibling.to_vec(),
            Position::of_sibling(node.position()),
        ));
        node = tree.node(parent)?;
    }
    Ok(MerkleProof::from_steps(path))
}

/// Decide whether `leaf` is included under `root` according to `proof`.
///
/// Returns `Ok(false)` for a well formed proof that does not lead to the
/// root, and [`Error::InvalidProof`] if any digest has the wrong length.
pub fn verify_proof<HF: DigestProvider>(
    leaf: &[u8],
    root: &[u8],
    proof: &[ProofStep],
) -> Result<bool, Error> {
    let root = MerkleHash::try_from(root)?;
    let implied = compute_implied_root::<HF>(leaf, proof)?;
    if implied != root {
        trace!(
            "proof of {} steps implies root {}, expected {}",
            proof.len(),
            implied,
            root
        );
        return Ok(false);
    }
    Ok(true)
}

fn compute_implied_root<HF: DigestProvider>(
    leaf: &[u8],
    proof: &[ProofStep],
) -> Result<MerkleHash, Error> {
    let mut last_hash = MerkleHash::try_from(leaf)?;
    for step in proof {
        let sibling = MerkleHash::try_from(step.sibling.as_slice())?;
        last_hash = match step.position {
            Position::Right => HF::hash_pair(&last_hash, &sibling),
            Position::Left => HF::hash_pair(&sibling, &last_hash),
        };
    }
    Ok(last_hash)
}
