//! Leaf and node records stored in a tree arena.

use crate::{
    error::Error,
    hash::{DigestProvider, MerkleHash},
};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// A hashed data block that has not been linked into a tree yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Leaf {
    /// Digest of the data block
    pub digest: MerkleHash,
    /// Index of the block in the input sequence
    pub position: usize,
}

/// Hash every block into a leaf, preserving the input order.
pub fn make_leaves<HF, B>(blocks: &[B]) -> Result<Vec<Leaf>, Error>
where
    HF: DigestProvider,
    B: AsRef<[u8]> + Sync,
{
    if blocks.is_empty() {
        return Err(Error::EmptyInput);
    }

    #[cfg(feature = "rayon")]
    let iter = blocks.par_iter();
    #[cfg(not(feature = "rayon"))]
    let iter = blocks.iter();

    Ok(iter
        .enumerate()
        .map(|(position, block)| Leaf {
            digest: HF::hash(block.as_ref()),
            position,
        })
        .collect())
}

/// Handle to a node inside a specific [`MerkleTree`](crate::MerkleTree)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId {
    pub(crate) tree: u64,
    pub(crate) index: usize,
}

impl NodeId {
    pub(crate) fn new(tree: u64, index: usize) -> Self {
        Self { tree, index }
    }

    /// Index of the node in its tree's arena
    pub fn index(&self) -> usize {
        self.index
    }
}

/// A node at any level of the tree, leaves included.
///
/// The digest and position are fixed when the node is created. The sibling
/// digest and parent are assigned once, when the node's level is folded
/// into the next one, and stay empty for the root.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    pub(crate) digest: MerkleHash,
    pub(crate) sibling: Option<MerkleHash>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) position: usize,
}

impl Node {
    pub(crate) fn new(digest: MerkleHash, position: usize) -> Self {
        Self {
            digest,
            sibling: None,
            parent: None,
            position,
        }
    }

    pub(crate) fn link(&mut self, sibling: MerkleHash, parent: NodeId) {
        debug_assert!(self.parent.is_none(), "node linked twice");
        self.sibling = Some(sibling);
        self.parent = Some(parent);
    }

    pub fn digest(&self) -> &MerkleHash {
        &self.digest
    }

    /// Digest of the pair partner, `None` for the root
    pub fn sibling(&self) -> Option<&MerkleHash> {
        self.sibling.as_ref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Index of the node within its own level
    pub fn position(&self) -> usize {
        self.position
    }

    /// Whether this node is the left element of its pair
    pub fn is_left(&self) -> bool {
        self.position & 1 == 0
    }
}
