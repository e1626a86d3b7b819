//! Merkle Tree construction over an arena of nodes.

use crate::{
    error::Error,
    hash::{DigestProvider, MerkleHash},
    node::{make_leaves, Leaf, Node, NodeId},
    proof::{proof, MerkleProof},
};
use log::{debug, trace};
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use sha3::Keccak256;
use std::{
    marker::PhantomData,
    ops::Range,
    sync::atomic::{AtomicU64, Ordering},
};

/// Source of the ids that tie a [`NodeId`] to the tree that minted it
static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(0);

/// Merkle Tree data structure
///
/// Nodes live in one flat vector, level by level: the leaves first, then
/// the padding node of a level (if its size was odd), then the parents of
/// that level, and so on up to the root which is always the last node.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "", try_from = "RawMerkleTree"))]
pub struct MerkleTree<HF: DigestProvider = Keccak256> {
    #[cfg_attr(feature = "serde", serde(skip))]
    _hasher: PhantomData<HF>,
    id: u64,
    pub(crate) nodes: Vec<Node>,
    num_leaves: usize,
    depth: usize,
}

impl<HF: DigestProvider> MerkleTree<HF> {
    /// Hash the data blocks into leaves and build the tree above them
    pub fn build<B: AsRef<[u8]> + Sync>(blocks: &[B]) -> Result<Self, Error> {
        Self::from_leaves(make_leaves::<HF, B>(blocks)?)
    }

    /// Build the tree above an ordered sequence of leaves.
    ///
    /// Levels are folded pairwise until a single node remains. A level of
    /// odd size is padded with a fresh copy of its last node so that the
    /// original keeps its own sibling and parent links.
    pub fn from_leaves(leaves: Vec<Leaf>) -> Result<Self, Error> {
        if leaves.is_empty() {
            return Err(Error::EmptyInput);
        }
        let id = NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed);
        let num_leaves = leaves.len();

        let mut nodes = Vec::with_capacity(2 * num_leaves + usize::BITS as usize);
        nodes.extend(
            leaves
                .into_iter()
                .enumerate()
                .map(|(position, leaf)| Node::new(leaf.digest, position)),
        );

        let mut level: Range<usize> = 0..num_leaves;
        let mut depth = 0usize;
        while level.len() > 1 {
            if level.len() & 1 == 1 {
                let padding = Node::new(nodes[level.end - 1].digest, level.len());
                trace!("padding level {} of {} nodes", depth, level.len());
                nodes.push(padding);
                level.end += 1;
            }

            let parents = hash_pairs::<HF>(&nodes[level.clone()]);
            let next_start = nodes.len();
            nodes.extend(
                parents
                    .into_iter()
                    .enumerate()
                    .map(|(position, digest)| Node::new(digest, position)),
            );

            for k in 0..level.len() / 2 {
                let (left, right) = (level.start + 2 * k, level.start + 2 * k + 1);
                let parent = NodeId::new(id, next_start + k);
                let (left_digest, right_digest) = (nodes[left].digest, nodes[right].digest);
                nodes[left].link(right_digest, parent);
                nodes[right].link(left_digest, parent);
            }

            trace!(
                "reduced level {} of {} nodes to {}",
                depth,
                level.len(),
                nodes.len() - next_start
            );
            level = next_start..nodes.len();
            depth += 1;
        }

        let tree = Self {
            _hasher: PhantomData,
            id,
            nodes,
            num_leaves,
            depth,
        };
        debug!(
            "built merkle tree with {} leaves, depth {}, root {}",
            num_leaves,
            depth,
            tree.root_hash()
        );
        Ok(tree)
    }

    /// Get the root node of the tree
    pub fn root(&self) -> &Node {
        &self.nodes[self.root_index()]
    }

    /// Get the merkle root of the tree
    pub fn root_hash(&self) -> &MerkleHash {
        self.root().digest()
    }

    pub fn root_id(&self) -> NodeId {
        NodeId::new(self.id, self.root_index())
    }

    /// Handles to the leaves, in input order
    pub fn leaves(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.num_leaves).map(move |index| NodeId::new(self.id, index))
    }

    /// Get the handle of a leaf by its position in the input
    pub fn leaf(&self, leaf_index: usize) -> Result<NodeId, Error> {
        if leaf_index >= self.num_leaves {
            return Err(Error::ExceededMaxIndex(leaf_index, self.num_leaves));
        }
        Ok(NodeId::new(self.id, leaf_index))
    }

    /// Look up a node, failing if the handle was minted by another tree
    pub fn node(&self, id: NodeId) -> Result<&Node, Error> {
        if !self.contains(id) {
            return Err(Error::DetachedNode);
        }
        Ok(&self.nodes[id.index])
    }

    /// Whether the handle refers to a node of this tree
    pub fn contains(&self, id: NodeId) -> bool {
        id.tree == self.id && id.index < self.nodes.len()
    }

    /// Get the number of leaves in the tree
    pub fn num_leaves(&self) -> usize {
        self.num_leaves
    }

    /// Get the number of nodes in the arena, padding nodes included
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of levels above the leaves, equal to the length of every proof
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Calculate the inclusion proof of the leaf at `leaf_index`
    pub fn proof_for_index(&self, leaf_index: usize) -> Result<MerkleProof<HF>, Error> {
        proof(self, self.leaf(leaf_index)?)
    }

    fn root_index(&self) -> usize {
        self.nodes.len() - 1
    }
}

/// Serialized form of a [`MerkleTree`], checked before it becomes one
#[cfg(feature = "serde")]
#[derive(Debug, serde::Deserialize)]
pub struct RawMerkleTree {
    id: u64,
    nodes: Vec<Node>,
    num_leaves: usize,
    depth: usize,
}

/// Every parent sits after its children in the arena and the root is the
/// only parentless node, so parent chains are finite and end at the root.
#[cfg(feature = "serde")]
impl<HF: DigestProvider> TryFrom<RawMerkleTree> for MerkleTree<HF> {
    type Error = Error;

    fn try_from(raw: RawMerkleTree) -> Result<Self, Self::Error> {
        let RawMerkleTree {
            id,
            nodes,
            num_leaves,
            depth,
        } = raw;
        let root = nodes
            .len()
            .checked_sub(1)
            .ok_or(Error::MalformedTree("no nodes"))?;
        if num_leaves == 0 || num_leaves > nodes.len() {
            return Err(Error::MalformedTree("leaf count out of range"));
        }

        for (index, node) in nodes.iter().enumerate() {
            match node.parent {
                None if index == root => {}
                None => return Err(Error::MalformedTree("non-root node has no parent")),
                Some(parent) => {
                    if parent.tree != id {
                        return Err(Error::MalformedTree("parent belongs to another tree"));
                    }
                    if parent.index <= index || parent.index > root {
                        return Err(Error::MalformedTree("parent does not follow its child"));
                    }
                    if node.sibling.is_none() {
                        return Err(Error::MalformedTree("linked node has no sibling"));
                    }
                }
            }
        }

        let mut leaf_depth = 0usize;
        let mut index = 0usize;
        while let Some(parent) = nodes[index].parent {
            index = parent.index;
            leaf_depth += 1;
        }
        if leaf_depth != depth {
            return Err(Error::MalformedTree("depth does not match the leaf path"));
        }

        Ok(Self {
            _hasher: PhantomData,
            id,
            nodes,
            num_leaves,
            depth,
        })
    }
}

/// Combine consecutive (left, right) pairs of an even-sized level
fn hash_pairs<HF: DigestProvider>(level: &[Node]) -> Vec<MerkleHash> {
    #[cfg(feature = "rayon")]
    let pairs = level.par_chunks_exact(2);
    #[cfg(not(feature = "rayon"))]
    let pairs = level.chunks_exact(2);

    pairs
        .map(|pair| HF::hash_pair(&pair[0].digest, &pair[1].digest))
        .collect()
}
