//! Stack-based Merkle root construction.

use std::io::Read;

use crate::{
    Error, Result,
    cursor::{ReaderSubtreeHasher, SubtreeHasher},
    hash::{Blake3Hasher, Hash, HashPrimitive},
};

/// Subtree heights must stay addressable by a `u64` leaf index.
const MAX_HEIGHT: u32 = 64;

/// A completed subtree of exactly `2^height` leaves that has not yet been
/// merged with its sibling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingSubtree {
    /// `log2` of the number of leaves under `hash`.
    pub height: u32,
    /// Root of the subtree.
    pub hash: Hash,
}

/// Folds a left-to-right sequence of leaves and subtree roots into a single
/// Merkle root using `O(log n)` memory.
///
/// Pending subtrees are kept on a stack whose heights strictly decrease from
/// bottom to top. Inserting works like incrementing a binary counter: two
/// pending subtrees of equal height are merged into their parent until the
/// top of the stack is unique again.
///
/// ```text
///          ┌──────┴──────┐
///       ┌──┴──┐       ┌──┴──┐     pending after 11 leaves:
///     ┌─┴─┐ ┌─┴─┐   ┌─┴─┐ ┌─┴─┐   height 3 (leaves 0..8)
///     0   1 2   3   4   5 6   7   height 1 (leaves 8..10)
///                                 height 0 (leaf 10)
/// ```
#[derive(Clone, Debug)]
pub struct TreeBuilder<H = Blake3Hasher> {
    hasher: H,
    stack: Vec<PendingSubtree>,
}

impl TreeBuilder<Blake3Hasher> {
    /// Create an empty builder using Blake3.
    pub fn new() -> Self {
        Self::with_hasher(Blake3Hasher)
    }
}

impl Default for TreeBuilder<Blake3Hasher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: HashPrimitive> TreeBuilder<H> {
    /// Create an empty builder using the given hash primitive.
    pub fn with_hasher(hasher: H) -> Self {
        TreeBuilder {
            hasher,
            stack: Vec::new(),
        }
    }

    /// The hash primitive used for leaf and node hashes.
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Returns `true` if nothing has been pushed yet.
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Pending subtrees, from the earliest (largest) to the most recent
    /// (smallest).
    pub fn pending(&self) -> &[PendingSubtree] {
        &self.stack
    }

    /// Hash `leaf` and insert it as a height-0 subtree.
    pub fn push(&mut self, leaf: &[u8]) {
        let hash = self.hasher.leaf_hash(leaf);
        self.insert(0, hash);
    }

    /// Insert `hash` as the root of exactly `2^height` leaves.
    ///
    /// Fails with [`Error::InvalidHeight`] when `height` is larger than the
    /// smallest pending subtree, since the new leaves could then not follow
    /// the pending ones in left-to-right order.
    pub fn push_subtree(&mut self, height: u32, hash: Hash) -> Result<()> {
        if height >= MAX_HEIGHT {
            return Err(Error::InvalidHeight {
                height,
                top: MAX_HEIGHT,
            });
        }
        match self.stack.last() {
            Some(top) if height > top.height => {
                return Err(Error::InvalidHeight {
                    height,
                    top: top.height,
                });
            }
            _ => {}
        }
        self.insert(height, hash);
        Ok(())
    }

    fn insert(&mut self, height: u32, hash: Hash) {
        self.stack.push(PendingSubtree { height, hash });
        while let [.., left, right] = self.stack.as_slice() {
            if left.height != right.height {
                break;
            }
            let parent = PendingSubtree {
                height: left.height + 1,
                hash: self.hasher.node_hash(&left.hash, &right.hash),
            };
            self.stack.truncate(self.stack.len() - 2);
            self.stack.push(parent);
        }
    }

    /// Combine the pending subtrees into the root.
    ///
    /// Starting from the smallest subtree, each larger (earlier) subtree is
    /// merged in as the left operand. Returns `None` for an empty tree.
    pub fn root(&self) -> Option<Hash> {
        let mut pending = self.stack.iter().rev();
        let mut root = pending.next()?.hash;
        for subtree in pending {
            root = self.hasher.node_hash(&subtree.hash, &root);
        }
        Some(root)
    }
}

/// Compute the root of every leaf read from `reader`.
///
/// The final leaf may be shorter than `leaf_size`. Returns `None` for an
/// empty stream.
pub fn reader_root<R: Read, H: HashPrimitive>(
    reader: R,
    leaf_size: usize,
    hasher: H,
) -> Result<Option<Hash>> {
    ReaderSubtreeHasher::with_hasher(reader, leaf_size, hasher).next_subtree_root(u64::MAX)
}

/// Compute the root of a list of precomputed leaf hashes.
pub fn cached_root<H: HashPrimitive>(leaf_hashes: &[Hash], hasher: H) -> Option<Hash> {
    let mut tree = TreeBuilder::with_hasher(hasher);
    for hash in leaf_hashes {
        tree.insert(0, *hash);
    }
    tree.root()
}
