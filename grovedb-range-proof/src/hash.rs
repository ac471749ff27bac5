//! Domain-separated hashing for leaves and internal nodes.
//!
//! - Leaves:         `H(0x00 || leaf_bytes)`
//! - Internal nodes: `H(0x01 || left_hash || right_hash)`
//!
//! The 0x00/0x01 domain tags prevent a leaf hash from being replayed as an
//! internal node and vice versa.

/// Size in bytes of every digest handled by this crate.
pub const HASH_SIZE: usize = 32;

/// A digest produced by a [`HashPrimitive`].
pub type Hash = [u8; HASH_SIZE];

/// Domain tag prepended to leaf hash inputs.
pub const LEAF_TAG: u8 = 0x00;
/// Domain tag prepended to internal node hash inputs.
pub const NODE_TAG: u8 = 0x01;

/// A fixed-size cryptographic hash function.
///
/// Implementors only supply [`hash_parts`](HashPrimitive::hash_parts); the
/// tagged leaf and node hashes are derived from it so that domain separation
/// cannot be skipped.
pub trait HashPrimitive: Clone {
    /// Hash the concatenation of `parts`.
    fn hash_parts(&self, parts: &[&[u8]]) -> Hash;

    /// `H(0x00 || leaf)`.
    fn leaf_hash(&self, leaf: &[u8]) -> Hash {
        self.hash_parts(&[&[LEAF_TAG], leaf])
    }

    /// `H(0x01 || left || right)`.
    fn node_hash(&self, left: &Hash, right: &Hash) -> Hash {
        self.hash_parts(&[&[NODE_TAG], left, right])
    }
}

/// The default primitive: unkeyed Blake3.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Blake3Hasher;

impl HashPrimitive for Blake3Hasher {
    fn hash_parts(&self, parts: &[&[u8]]) -> Hash {
        let mut hasher = blake3::Hasher::new();
        for part in parts {
            hasher.update(part);
        }
        *hasher.finalize().as_bytes()
    }

    fn node_hash(&self, left: &Hash, right: &Hash) -> Hash {
        let mut input = [0u8; 1 + 2 * HASH_SIZE];
        input[0] = NODE_TAG;
        input[1..33].copy_from_slice(left);
        input[33..65].copy_from_slice(right);
        *blake3::hash(&input).as_bytes()
    }
}

/// Compute the Blake3 leaf hash: `blake3(0x00 || leaf)`.
pub fn leaf_hash(leaf: &[u8]) -> Hash {
    Blake3Hasher.leaf_hash(leaf)
}

/// Compute the Blake3 node hash: `blake3(0x01 || left || right)`.
pub fn node_hash(left: &Hash, right: &Hash) -> Hash {
    Blake3Hasher.node_hash(left, right)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_hash_uses_domain_tag() {
        let value = b"test value";

        let mut hasher = blake3::Hasher::new();
        hasher.update(&[0x00]);
        hasher.update(value);
        let expected = *hasher.finalize().as_bytes();

        assert_eq!(leaf_hash(value), expected, "leaf hash should use 0x00 tag");
        assert_ne!(
            leaf_hash(value),
            *blake3::hash(value).as_bytes(),
            "leaf hash must differ from plain blake3(value)"
        );
    }

    #[test]
    fn test_node_hash_uses_domain_tag() {
        let left = [0xAAu8; 32];
        let right = [0xBBu8; 32];

        let mut input = [0u8; 65];
        input[0] = 0x01;
        input[1..33].copy_from_slice(&left);
        input[33..65].copy_from_slice(&right);
        let expected = *blake3::hash(&input).as_bytes();

        assert_eq!(node_hash(&left, &right), expected);
    }

    #[test]
    fn test_node_hash_fast_path_matches_parts() {
        let left = leaf_hash(b"left");
        let right = leaf_hash(b"right");
        assert_eq!(
            node_hash(&left, &right),
            Blake3Hasher.hash_parts(&[&[NODE_TAG], &left, &right])
        );
    }

    #[test]
    fn test_node_hash_is_ordered() {
        let left = leaf_hash(b"left");
        let right = leaf_hash(b"right");
        assert_ne!(node_hash(&left, &right), node_hash(&right, &left));
    }

    #[test]
    fn test_leaf_cannot_pose_as_node() {
        // A 64-byte leaf holding two child hashes must not collide with their
        // parent node.
        let left = leaf_hash(b"a");
        let right = leaf_hash(b"b");
        let mut leaf = Vec::with_capacity(64);
        leaf.extend_from_slice(&left);
        leaf.extend_from_slice(&right);
        assert_ne!(leaf_hash(&leaf), node_hash(&left, &right));
    }
}
