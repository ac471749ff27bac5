//! Range proof construction.
//!
//! The bits of a leaf index spell the path from the root down to that leaf.
//! For a range `[start, end)`, every set bit of `start` marks a complete
//! subtree to the left of the range, and every clear bit of `end - 1` marks a
//! subtree to its right. For 12 leaves and the range `[3, 5)`:
//!
//! ```text
//!               ┌────────┴────────*
//!         ┌─────┴─────┐           │
//!      *──┴──┐     ┌──┴──*     ┌──┴──┐
//!    ┌─┴─┐ *─┴─┐ ┌─┴─* ┌─┴─┐ ┌─┴─┐ ┌─┴─┐
//!    0   1 2   3 4   5 6   7 8   9 10  11
//!              ^^^
//! ```
//!
//! `3 = 0b0011` yields the left subtrees `[0, 2)` and `[2, 3)`, largest first.
//! `4 = 0b0100` yields the right subtrees `[5, 6)`, `[6, 8)` and `[8, 12)`,
//! smallest first, stopping once the leaves run out.

use bincode::{Decode, Encode};
use tracing::{debug, trace};

use crate::{
    Error, Result,
    cursor::SubtreeHasher,
    hash::{HASH_SIZE, Hash},
};

/// Upper bound on the number of hashes in any range proof: one per set bit of
/// `start` plus one per clear bit of `end - 1`.
pub const MAX_PROOF_HASHES: usize = 128;

/// Byte limit applied when decoding a bincode-encoded proof.
const MAX_ENCODED_PROOF_BYTES: usize = MAX_PROOF_HASHES * HASH_SIZE + 16;

/// Ordered subtree roots that, combined with the leaves of a range, rebuild
/// the root of the whole tree.
#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct RangeProof {
    hashes: Vec<Hash>,
}

impl RangeProof {
    /// Wrap an ordered list of proof hashes.
    pub fn new(hashes: Vec<Hash>) -> Self {
        RangeProof { hashes }
    }

    /// The proof hashes in protocol order.
    pub fn hashes(&self) -> &[Hash] {
        &self.hashes
    }

    /// Consume the proof and return its hashes.
    pub fn into_hashes(self) -> Vec<Hash> {
        self.hashes
    }

    /// Number of hashes in the proof.
    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    /// Returns `true` for the proof of a whole tree.
    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    /// Parse a bare concatenation of 32-byte digests.
    pub fn from_concatenated(bytes: &[u8]) -> Result<Self> {
        if bytes.len() % HASH_SIZE != 0 {
            return Err(Error::InvalidData(format!(
                "proof length {} is not a multiple of {}",
                bytes.len(),
                HASH_SIZE
            )));
        }
        let hashes: Vec<Hash> = bytes
            .chunks_exact(HASH_SIZE)
            .map(|chunk| {
                let mut hash = [0u8; HASH_SIZE];
                hash.copy_from_slice(chunk);
                hash
            })
            .collect();
        Self::checked(hashes)
    }

    /// The proof hashes concatenated in order.
    pub fn to_concatenated(&self) -> Vec<u8> {
        self.hashes.concat()
    }

    /// Serialize this proof to bytes using bincode.
    pub fn encode_to_vec(&self) -> Result<Vec<u8>> {
        let config = bincode::config::standard()
            .with_big_endian()
            .with_no_limit();
        bincode::encode_to_vec(self, config)
            .map_err(|e| Error::InvalidData(format!("failed to encode RangeProof: {}", e)))
    }

    /// Deserialize a proof from bytes.
    pub fn decode_from_slice(bytes: &[u8]) -> Result<Self> {
        let config = bincode::config::standard()
            .with_big_endian()
            .with_limit::<MAX_ENCODED_PROOF_BYTES>();
        let (proof, read): (Self, usize) = bincode::decode_from_slice(bytes, config)
            .map_err(|e| Error::InvalidData(format!("failed to decode RangeProof: {}", e)))?;
        if read != bytes.len() {
            return Err(Error::InvalidData(format!(
                "{} trailing bytes after RangeProof",
                bytes.len() - read
            )));
        }
        Self::checked(proof.hashes)
    }

    fn checked(hashes: Vec<Hash>) -> Result<Self> {
        if hashes.len() > MAX_PROOF_HASHES {
            return Err(Error::InvalidData(format!(
                "proof has {} hashes, at most {} allowed",
                hashes.len(),
                MAX_PROOF_HASHES
            )));
        }
        Ok(RangeProof { hashes })
    }
}

impl From<Vec<Hash>> for RangeProof {
    fn from(hashes: Vec<Hash>) -> Self {
        RangeProof::new(hashes)
    }
}

impl AsRef<[Hash]> for RangeProof {
    fn as_ref(&self) -> &[Hash] {
        &self.hashes
    }
}

/// Build a proof for the leaf range `[start, end)`.
///
/// `subtree_hasher` must be positioned at leaf 0 and is consumed from left to
/// right exactly once. The leaves inside the range are skipped without being
/// hashed; the verifier supplies them itself.
///
/// # Panics
///
/// If `start >= end`.
pub fn build_range_proof<S: SubtreeHasher>(
    start: u64,
    end: u64,
    mut subtree_hasher: S,
) -> Result<RangeProof> {
    assert!(start < end, "illegal proof range [{}, {})", start, end);
    trace!(start, end, "building range proof");

    let mut hashes = Vec::new();

    // subtrees covering [0, start), largest first
    for i in (0..u64::BITS).rev() {
        let size = 1u64 << i;
        if start & size != 0 {
            match subtree_hasher.next_subtree_root(size)? {
                Some(root) => hashes.push(root),
                None => {
                    debug!(start, end, "leaves ran out before range start");
                    return Err(Error::UnexpectedEndOfStream);
                }
            }
        }
    }

    if let Err(e) = subtree_hasher.skip(end - start) {
        debug!(start, end, error = %e, "failed to skip proof range");
        return Err(e);
    }

    // subtrees from end onward, smallest first, until the tree is exhausted
    let end_mask = end - 1;
    for i in 0..u64::BITS {
        let size = 1u64 << i;
        if end_mask & size == 0 {
            match subtree_hasher.next_subtree_root(size)? {
                Some(root) => hashes.push(root),
                None => break,
            }
        }
    }

    trace!(start, end, len = hashes.len(), "built range proof");
    Ok(RangeProof::new(hashes))
}

/// Number of hashes [`build_range_proof`] emits for `[start, end)` in a tree
/// of `num_leaves` leaves.
///
/// # Panics
///
/// If `start >= end` or `end > num_leaves`.
pub fn range_proof_len(start: u64, end: u64, num_leaves: u64) -> usize {
    assert!(start < end, "illegal proof range [{}, {})", start, end);
    assert!(
        end <= num_leaves,
        "proof range end {} exceeds leaf count {}",
        end,
        num_leaves
    );

    let mut len = start.count_ones() as usize;
    let end_mask = end - 1;
    let mut position = end;
    for i in 0..u64::BITS {
        if position >= num_leaves {
            break;
        }
        let size = 1u64 << i;
        if end_mask & size == 0 {
            len += 1;
            position = position.saturating_add(size);
        }
    }
    len
}
