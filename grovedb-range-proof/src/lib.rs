//! Merkle roots and contiguous range proofs over fixed-size leaves.
//!
//! Leaves are hashed with domain separation and folded into a root by a
//! stack-based [`TreeBuilder`] in `O(log n)` memory. A range proof for
//! `[start, end)` lists the roots of the complete subtrees on either side of
//! the range; together with the leaves of the range it rebuilds the root,
//! without touching any leaf outside it.
//!
//! # Core types
//!
//! - [`TreeBuilder`]: push leaves or subtree roots, read the root.
//! - [`build_range_proof`] / [`verify_range_proof`]: the proof protocol.
//! - [`RangeProof`]: the ordered proof hashes and their wire encodings.
//! - [`PrecalculatedSubtreeHasher`]: reuses known block roots while proving.
//!
//! # Cursors
//!
//! - [`SubtreeHasher`]: [`ReaderSubtreeHasher`] (raw bytes) and
//!   [`CachedSubtreeHasher`] (precomputed leaf hashes).
//! - [`LeafHasher`]: [`ReaderLeafHasher`] and [`CachedLeafHasher`].
//!
//! The leaf size is agreed out of band and is not part of the proof.

#![warn(missing_docs)]

mod cursor;
mod error;
mod hash;
mod precalculated;
mod proof;
mod tree;
mod verify;

#[cfg(test)]
mod tests;

pub use cursor::{
    CachedLeafHasher, CachedSubtreeHasher, LeafHasher, ReaderLeafHasher, ReaderSubtreeHasher,
    SubtreeHasher,
};
pub use error::{Error, Result};
pub use hash::{
    Blake3Hasher, HASH_SIZE, Hash, HashPrimitive, LEAF_TAG, NODE_TAG, leaf_hash, node_hash,
};
pub use precalculated::PrecalculatedSubtreeHasher;
pub use proof::{MAX_PROOF_HASHES, RangeProof, build_range_proof, range_proof_len};
pub use tree::{PendingSubtree, TreeBuilder, cached_root, reader_root};
pub use verify::verify_range_proof;

/// Leaf size, in bytes, used when none is agreed otherwise.
pub const DEFAULT_LEAF_SIZE: usize = 64;
