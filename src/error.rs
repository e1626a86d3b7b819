//! Merkle Tree Errors

use displaydoc::Display;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Cannot build a Merkle tree from an empty sequence of blocks
    EmptyInput,
    /// Node is not linked into this tree
    DetachedNode,
    /// Malformed proof: expected a {expected} byte digest, found {found} bytes
    InvalidProof { expected: usize, found: usize },
    /// Requested index: {0} exceeds number of nodes or leaves: {1}
    ExceededMaxIndex(usize, usize),
    /// Malformed tree: {0}
    MalformedTree(&'static str),
}

impl std::error::Error for Error {}
