//! A [`SubtreeHasher`] decorator that reuses known block roots.

use std::collections::VecDeque;

use crate::{
    Error, Result,
    cursor::SubtreeHasher,
    hash::{Blake3Hasher, Hash, HashPrimitive},
    tree::TreeBuilder,
};

/// Wraps a base [`SubtreeHasher`] with the roots of consecutive blocks of
/// `block_size` leaves, starting at leaf 0.
///
/// Requests that start on a block boundary and span whole blocks are answered
/// by merging the stored block roots; the base cursor is skipped forward to
/// stay in step. Any other request is passed through to the base cursor, and
/// blocks it moves into are discarded.
pub struct PrecalculatedSubtreeHasher<S, H = Blake3Hasher> {
    base: S,
    hasher: H,
    block_roots: VecDeque<Hash>,
    block_size: u64,
    block_height: u32,
    // leaf index where the front of `block_roots` begins
    next_block_start: u64,
    position: u64,
}

impl<S: SubtreeHasher, H: HashPrimitive> PrecalculatedSubtreeHasher<S, H> {
    /// Decorate `base` with `block_roots`, each covering `block_size` leaves.
    ///
    /// `block_size` must be a non-zero power of two.
    pub fn new(base: S, block_roots: Vec<Hash>, block_size: u64, hasher: H) -> Result<Self> {
        if !block_size.is_power_of_two() {
            return Err(Error::InvalidInput(format!(
                "block size must be a power of two, got {}",
                block_size
            )));
        }
        Ok(PrecalculatedSubtreeHasher {
            base,
            hasher,
            block_roots: block_roots.into(),
            block_size,
            block_height: block_size.trailing_zeros(),
            next_block_start: 0,
            position: 0,
        })
    }

    /// Number of stored block roots not yet used or passed.
    pub fn remaining_blocks(&self) -> usize {
        self.block_roots.len()
    }

    /// Consume the decorator and return the base cursor.
    pub fn into_inner(self) -> S {
        self.base
    }

    fn advance(&mut self, leaves: u64) {
        self.position = self.position.saturating_add(leaves);
        while self.next_block_start < self.position && self.block_roots.pop_front().is_some() {
            self.next_block_start = self.next_block_start.saturating_add(self.block_size);
        }
    }
}

impl<S: SubtreeHasher, H: HashPrimitive> SubtreeHasher for PrecalculatedSubtreeHasher<S, H> {
    fn next_subtree_root(&mut self, leaves: u64) -> Result<Option<Hash>> {
        let blocks = leaves / self.block_size;
        let usable = self.position == self.next_block_start
            && blocks > 0
            && leaves % self.block_size == 0
            && blocks <= self.block_roots.len() as u64;
        if !usable {
            let root = self.base.next_subtree_root(leaves)?;
            self.advance(leaves);
            return Ok(root);
        }

        let mut tree = TreeBuilder::with_hasher(self.hasher.clone());
        for root in self.block_roots.drain(..blocks as usize) {
            tree.push_subtree(self.block_height, root)?;
        }
        self.next_block_start += leaves;
        self.base.skip(leaves)?;
        self.advance(leaves);
        Ok(tree.root())
    }

    fn skip(&mut self, leaves: u64) -> Result<()> {
        self.base.skip(leaves)?;
        self.advance(leaves);
        Ok(())
    }
}
