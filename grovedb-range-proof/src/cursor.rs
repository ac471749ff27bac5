//! Forward-only cursors that feed leaves to the proof builder and verifier.
//!
//! [`SubtreeHasher`] yields roots of consecutive leaf runs and is consumed by
//! [`build_range_proof`](crate::build_range_proof). [`LeafHasher`] yields
//! single leaf hashes and is consumed by
//! [`verify_range_proof`](crate::verify_range_proof). Both come in a
//! stream-backed flavor that hashes raw bytes and a cache-backed flavor that
//! serves precomputed leaf hashes.

use std::io::{self, Read};

use crate::{
    Error, Result,
    hash::{Blake3Hasher, Hash, HashPrimitive},
    tree::{TreeBuilder, cached_root},
};

/// Sequential source of subtree roots.
pub trait SubtreeHasher {
    /// Return the root of the next `leaves` leaves.
    ///
    /// If fewer leaves remain, returns the root of those that do. Returns
    /// `Ok(None)` once no leaves are left.
    fn next_subtree_root(&mut self, leaves: u64) -> Result<Option<Hash>>;

    /// Advance past exactly `leaves` leaves.
    ///
    /// Fails with [`Error::UnexpectedEndOfStream`] if fewer remain. Skipping
    /// every remaining leaf succeeds and leaves the cursor at the end.
    fn skip(&mut self, leaves: u64) -> Result<()>;
}

/// Sequential source of leaf hashes.
pub trait LeafHasher {
    /// Return the hash of the next leaf, or `Ok(None)` once no leaves are
    /// left.
    fn next_leaf_hash(&mut self) -> Result<Option<Hash>>;
}

impl<T: SubtreeHasher + ?Sized> SubtreeHasher for &mut T {
    fn next_subtree_root(&mut self, leaves: u64) -> Result<Option<Hash>> {
        (**self).next_subtree_root(leaves)
    }

    fn skip(&mut self, leaves: u64) -> Result<()> {
        (**self).skip(leaves)
    }
}

impl<T: SubtreeHasher + ?Sized> SubtreeHasher for Box<T> {
    fn next_subtree_root(&mut self, leaves: u64) -> Result<Option<Hash>> {
        (**self).next_subtree_root(leaves)
    }

    fn skip(&mut self, leaves: u64) -> Result<()> {
        (**self).skip(leaves)
    }
}

impl<T: LeafHasher + ?Sized> LeafHasher for &mut T {
    fn next_leaf_hash(&mut self) -> Result<Option<Hash>> {
        (**self).next_leaf_hash()
    }
}

impl<T: LeafHasher + ?Sized> LeafHasher for Box<T> {
    fn next_leaf_hash(&mut self) -> Result<Option<Hash>> {
        (**self).next_leaf_hash()
    }
}

// Fill `buf` from `reader`, stopping early only at end of stream.
fn read_leaf<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

// Number of slice entries covered by a request for `leaves` leaves.
fn clamp_to_len(leaves: u64, len: usize) -> usize {
    usize::try_from(leaves).map_or(len, |leaves| leaves.min(len))
}

/// [`SubtreeHasher`] that reads leaf data from a byte stream and hashes it.
///
/// The final leaf of the stream may be shorter than `leaf_size`.
pub struct ReaderSubtreeHasher<R, H = Blake3Hasher> {
    reader: R,
    hasher: H,
    leaf: Vec<u8>,
}

impl<R: Read> ReaderSubtreeHasher<R, Blake3Hasher> {
    /// Read `leaf_size`-byte leaves from `reader`, hashing with Blake3.
    ///
    /// # Panics
    ///
    /// If `leaf_size` is zero.
    pub fn new(reader: R, leaf_size: usize) -> Self {
        Self::with_hasher(reader, leaf_size, Blake3Hasher)
    }
}

impl<R: Read, H: HashPrimitive> ReaderSubtreeHasher<R, H> {
    /// Read `leaf_size`-byte leaves from `reader`, hashing with `hasher`.
    ///
    /// # Panics
    ///
    /// If `leaf_size` is zero.
    pub fn with_hasher(reader: R, leaf_size: usize, hasher: H) -> Self {
        assert!(leaf_size > 0, "leaf size must be non-zero");
        ReaderSubtreeHasher {
            reader,
            hasher,
            leaf: vec![0; leaf_size],
        }
    }
}

impl<R: Read, H: HashPrimitive> SubtreeHasher for ReaderSubtreeHasher<R, H> {
    fn next_subtree_root(&mut self, leaves: u64) -> Result<Option<Hash>> {
        let mut tree = TreeBuilder::with_hasher(self.hasher.clone());
        for _ in 0..leaves {
            let read = read_leaf(&mut self.reader, &mut self.leaf)?;
            if read == 0 {
                break;
            }
            tree.push(&self.leaf[..read]);
            if read < self.leaf.len() {
                // a short leaf can only be the last one
                break;
            }
        }
        Ok(tree.root())
    }

    fn skip(&mut self, leaves: u64) -> Result<()> {
        if leaves == 0 {
            return Ok(());
        }
        let leaf_size = self.leaf.len() as u64;
        let wanted = leaves.saturating_mul(leaf_size);
        let skipped = io::copy(&mut (&mut self.reader).take(wanted), &mut io::sink())?;
        // The last skipped leaf may be partial, but it has to exist.
        if skipped <= (leaves - 1).saturating_mul(leaf_size) {
            return Err(Error::UnexpectedEndOfStream);
        }
        Ok(())
    }
}

/// [`SubtreeHasher`] over precomputed leaf hashes.
#[derive(Clone, Debug)]
pub struct CachedSubtreeHasher<'a, H = Blake3Hasher> {
    leaf_hashes: &'a [Hash],
    hasher: H,
}

impl<'a> CachedSubtreeHasher<'a, Blake3Hasher> {
    /// Serve `leaf_hashes` in order, merging them with Blake3.
    pub fn new(leaf_hashes: &'a [Hash]) -> Self {
        Self::with_hasher(leaf_hashes, Blake3Hasher)
    }
}

impl<'a, H: HashPrimitive> CachedSubtreeHasher<'a, H> {
    /// Serve `leaf_hashes` in order, merging them with `hasher`.
    pub fn with_hasher(leaf_hashes: &'a [Hash], hasher: H) -> Self {
        CachedSubtreeHasher {
            leaf_hashes,
            hasher,
        }
    }
}

impl<H: HashPrimitive> SubtreeHasher for CachedSubtreeHasher<'_, H> {
    fn next_subtree_root(&mut self, leaves: u64) -> Result<Option<Hash>> {
        if self.leaf_hashes.is_empty() {
            return Ok(None);
        }
        let (subtree, rest) = self
            .leaf_hashes
            .split_at(clamp_to_len(leaves, self.leaf_hashes.len()));
        self.leaf_hashes = rest;
        Ok(cached_root(subtree, self.hasher.clone()))
    }

    fn skip(&mut self, leaves: u64) -> Result<()> {
        match usize::try_from(leaves) {
            Ok(n) if n <= self.leaf_hashes.len() => {
                self.leaf_hashes = &self.leaf_hashes[n..];
                Ok(())
            }
            _ => Err(Error::UnexpectedEndOfStream),
        }
    }
}

/// [`LeafHasher`] that reads leaf data from a byte stream and hashes it.
pub struct ReaderLeafHasher<R, H = Blake3Hasher> {
    reader: R,
    hasher: H,
    leaf: Vec<u8>,
}

impl<R: Read> ReaderLeafHasher<R, Blake3Hasher> {
    /// Read `leaf_size`-byte leaves from `reader`, hashing with Blake3.
    ///
    /// # Panics
    ///
    /// If `leaf_size` is zero.
    pub fn new(reader: R, leaf_size: usize) -> Self {
        Self::with_hasher(reader, leaf_size, Blake3Hasher)
    }
}

impl<R: Read, H: HashPrimitive> ReaderLeafHasher<R, H> {
    /// Read `leaf_size`-byte leaves from `reader`, hashing with `hasher`.
    ///
    /// # Panics
    ///
    /// If `leaf_size` is zero.
    pub fn with_hasher(reader: R, leaf_size: usize, hasher: H) -> Self {
        assert!(leaf_size > 0, "leaf size must be non-zero");
        ReaderLeafHasher {
            reader,
            hasher,
            leaf: vec![0; leaf_size],
        }
    }
}

impl<R: Read, H: HashPrimitive> LeafHasher for ReaderLeafHasher<R, H> {
    fn next_leaf_hash(&mut self) -> Result<Option<Hash>> {
        let read = read_leaf(&mut self.reader, &mut self.leaf)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(self.hasher.leaf_hash(&self.leaf[..read])))
    }
}

/// [`LeafHasher`] over precomputed leaf hashes.
#[derive(Clone, Debug)]
pub struct CachedLeafHasher<'a> {
    leaf_hashes: &'a [Hash],
}

impl<'a> CachedLeafHasher<'a> {
    /// Serve `leaf_hashes` in order.
    pub fn new(leaf_hashes: &'a [Hash]) -> Self {
        CachedLeafHasher { leaf_hashes }
    }
}

impl LeafHasher for CachedLeafHasher<'_> {
    fn next_leaf_hash(&mut self) -> Result<Option<Hash>> {
        match self.leaf_hashes.split_first() {
            Some((hash, rest)) => {
                self.leaf_hashes = rest;
                Ok(Some(*hash))
            }
            None => Ok(None),
        }
    }
}
