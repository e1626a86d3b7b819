//! Digest providers and the fixed width Merkle hash

use crate::error::Error;
use sha3::digest::{consts::U32, Digest, OutputSizeUser};
use std::{fmt, ops::Deref};

/// Width in bytes of every digest stored in a tree or proof
pub const HASH_SIZE: usize = 32;

/// One-way function used to hash data blocks and combine sibling nodes.
///
/// Implemented for every RustCrypto [`Digest`] with a 256-bit output, so
/// `Keccak256`, `Sha3_256` and `Blake2s256` can be swapped in without
/// touching the tree, proof or verifier code.
pub trait DigestProvider {
    /// Hash a single block of data
    fn hash(data: &[u8]) -> MerkleHash;

    /// Hash two nodes on a merkle tree by concatenating the left and
    /// right digests, left first, and hashing the result. No prefix or
    /// domain tag is mixed in.
    fn hash_pair(left: &[u8], right: &[u8]) -> MerkleHash {
        Self::hash(&[left, right].concat())
    }
}

impl<D> DigestProvider for D
where
    D: Digest + OutputSizeUser<OutputSize = U32>,
{
    fn hash(data: &[u8]) -> MerkleHash {
        let mut result = [0u8; HASH_SIZE];
        result.copy_from_slice(<D as Digest>::digest(data).as_slice());
        MerkleHash(result)
    }

    fn hash_pair(left: &[u8], right: &[u8]) -> MerkleHash {
        let mut hasher = <D as Digest>::new();
        let mut result = [0u8; HASH_SIZE];

        Digest::update(&mut hasher, left);
        Digest::update(&mut hasher, right);
        result.copy_from_slice(hasher.finalize().as_slice());
        MerkleHash(result)
    }
}

/// Container for Merkle Hashes
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MerkleHash(pub [u8; HASH_SIZE]);

impl MerkleHash {
    /// Copy the digest out as an owned byte buffer
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

impl Deref for MerkleHash {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<[u8]> for MerkleHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl PartialEq<[u8; HASH_SIZE]> for MerkleHash {
    fn eq(&self, other: &[u8; HASH_SIZE]) -> bool {
        &self.0 == other
    }
}

impl From<[u8; HASH_SIZE]> for MerkleHash {
    fn from(value: [u8; HASH_SIZE]) -> Self {
        MerkleHash(value)
    }
}

/// Digests arriving as raw bytes must be exactly [`HASH_SIZE`] long
impl TryFrom<&[u8]> for MerkleHash {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let bytes: [u8; HASH_SIZE] = value.try_into().map_err(|_| Error::InvalidProof {
            expected: HASH_SIZE,
            found: value.len(),
        })?;
        Ok(MerkleHash(bytes))
    }
}

impl fmt::Display for MerkleHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ::hex_literal::hex;
    use blake2::Blake2s256;
    use sha3::{Keccak256, Sha3_256};

    #[test]
    fn test_hash_blocks() {
        assert_eq!(
            Keccak256::hash(b""),
            hex!("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470")
        );
        assert_eq!(
            Keccak256::hash(b"hello7"),
            hex!("fce524a74f0e97a3cf5f27c47e5514218431245cc876a80829ac4384cd619610")
        );
        assert_eq!(
            Sha3_256::hash(b"hello7"),
            hex!("40f71d4e3bfe0a56d18a883b16a819afde0f41a72f9ba81910e98605e7a1756d")
        );
        assert_eq!(
            Blake2s256::hash(b"hello7"),
            hex!("119311616efeb3b7de2b69dd35b4f2e43406411225ec186c341d957808e431c0")
        );
    }

    #[test]
    fn test_hash_pair_is_hash_of_concatenation() {
        let left = Keccak256::hash(b"hello1");
        let right = Keccak256::hash(b"hello2");
        assert_eq!(
            left,
            hex!("57c65f1718e8297f4048beff2419e134656b7a856872b27ad77846e395f13ffe")
        );
        assert_eq!(
            Keccak256::hash_pair(&left, &right),
            hex!("286e4ebd5d91c6b71608714d64e8eaab4e49d85a85ea7dad02620aec5ccf0159")
        );
        assert_eq!(
            Keccak256::hash_pair(&left, &right),
            Keccak256::hash(&[left.0, right.0].concat())
        );
        // Order of the pair is significant
        assert_ne!(
            Keccak256::hash_pair(&left, &right),
            Keccak256::hash_pair(&right, &left)
        );
    }

    #[test]
    fn test_try_from_rejects_wrong_length() {
        assert_eq!(
            MerkleHash::try_from(&[0u8; 31][..]),
            Err(Error::InvalidProof {
                expected: 32,
                found: 31
            })
        );
        assert_eq!(
            MerkleHash::try_from(&[7u8; 32][..]),
            Ok(MerkleHash([7u8; 32]))
        );
    }

    #[test]
    fn test_display_renders_prefixed_hex() {
        let hash = MerkleHash(hex!(
            "286e4ebd5d91c6b71608714d64e8eaab4e49d85a85ea7dad02620aec5ccf0159"
        ));
        assert_eq!(
            hash.to_string(),
            "0x286e4ebd5d91c6b71608714d64e8eaab4e49d85a85ea7dad02620aec5ccf0159"
        );
    }
}
