
use std::io::{self, Read};

use crate::{
    Blake3Hasher, CachedLeafHasher, CachedSubtreeHasher, DEFAULT_LEAF_SIZE, Hash, HashPrimitive,
    RangeProof, ReaderLeafHasher, ReaderSubtreeHasher, build_range_proof, leaf_hash, reader_root,
    verify_range_proof,
};

pub(crate) const LEAF_SIZE: usize = DEFAULT_LEAF_SIZE;

/// `num_leaves` full leaves of pseudo-random, pairwise distinct bytes.
pub(crate) fn leaf_data(num_leaves: usize) -> Vec<u8> {
    let mut data = vec![0u8; num_leaves * LEAF_SIZE];
    for (i, leaf) in data.chunks_mut(LEAF_SIZE).enumerate() {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(i as u64).to_le_bytes());
        hasher.finalize_xof().fill(leaf);
    }
    data
}

pub(crate) fn leaf_hashes(data: &[u8]) -> Vec<Hash> {
    data.chunks(LEAF_SIZE).map(leaf_hash).collect()
}

pub(crate) fn root_of(data: &[u8]) -> Hash {
    reader_root(data, LEAF_SIZE, Blake3Hasher)
        .expect("read from slice")
        .expect("non-empty data")
}

/// Leaf data and leaf hashes of a tree, so proofs can be built and verified
/// from either source.
pub(crate) struct Fixture {
    pub data: Vec<u8>,
    pub hashes: Vec<Hash>,
    pub root: Hash,
}

impl Fixture {
    pub fn new(num_leaves: usize) -> Self {
        Self::from_data(leaf_data(num_leaves))
    }

    pub fn from_data(data: Vec<u8>) -> Self {
        let hashes = leaf_hashes(&data);
        let root = root_of(&data);
        Fixture { data, hashes, root }
    }

    pub fn num_leaves(&self) -> u64 {
        self.hashes.len() as u64
    }

    pub fn leaf(&self, index: u64) -> &[u8] {
        let start = index as usize * LEAF_SIZE;
        &self.data[start..(start + LEAF_SIZE).min(self.data.len())]
    }

    pub fn build(&self, start: u64, end: u64, from_reader: bool) -> RangeProof {
        let result = if from_reader {
            build_range_proof(
                start,
                end,
                ReaderSubtreeHasher::new(self.data.as_slice(), LEAF_SIZE),
            )
        } else {
            build_range_proof(start, end, CachedSubtreeHasher::new(&self.hashes))
        };
        result.expect("build range proof")
    }

    pub fn verify(&self, start: u64, end: u64, proof: &RangeProof, from_reader: bool) -> bool {
        let result = if from_reader {
            let begin = start as usize * LEAF_SIZE;
            let finish = (end as usize * LEAF_SIZE).min(self.data.len());
            verify_range_proof(
                ReaderLeafHasher::new(&self.data[begin..finish], LEAF_SIZE),
                &Blake3Hasher,
                start,
                end,
                proof,
                &self.root,
            )
        } else {
            verify_range_proof(
                CachedLeafHasher::new(&self.hashes[start as usize..end as usize]),
                &Blake3Hasher,
                start,
                end,
                proof,
                &self.root,
            )
        };
        result.expect("verify range proof")
    }
}

/// Keyed Blake3, standing in for any other hash primitive.
#[derive(Clone, Debug)]
pub(crate) struct KeyedHasher([u8; 32]);

impl KeyedHasher {
    pub fn new() -> Self {
        KeyedHasher([7u8; 32])
    }
}

impl HashPrimitive for KeyedHasher {
    fn hash_parts(&self, parts: &[&[u8]]) -> Hash {
        let mut hasher = blake3::Hasher::new_keyed(&self.0);
        for part in parts {
            hasher.update(part);
        }
        *hasher.finalize().as_bytes()
    }
}

/// Reader that serves `ok_bytes` bytes and then fails.
pub(crate) struct FailingReader {
    pub ok_bytes: usize,
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.ok_bytes == 0 {
            return Err(io::Error::other("disk on fire"));
        }
        let n = buf.len().min(self.ok_bytes);
        buf[..n].fill(0xAB);
        self.ok_bytes -= n;
        Ok(n)
    }
}

/// Reader that returns at most `chunk` bytes per call and is interrupted
/// before every successful read.
pub(crate) struct ChoppyReader<'a> {
    pub data: &'a [u8],
    pub chunk: usize,
    pub interrupt: bool,
}

impl Read for ChoppyReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.interrupt = !self.interrupt;
        if self.interrupt {
            return Err(io::ErrorKind::Interrupted.into());
        }
        let n = buf.len().min(self.chunk).min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}
