//! Range proof verification.
//!
//! Pure replay: the proof hashes and the supplied leaves are pushed into a
//! fresh [`TreeBuilder`] in the same order the builder consumed them, and the
//! resulting root is compared to the expected one. The proof is untrusted, so
//! every structural inconsistency is reported as a failed verification
//! rather than an error or a panic.

use tracing::{debug, trace};

use crate::{
    Result,
    cursor::LeafHasher,
    hash::{Hash, HashPrimitive},
    proof::RangeProof,
    tree::TreeBuilder,
};

/// Verify that the leaves produced by `leaf_hasher` occupy `[start, end)` in
/// the tree with root `root`.
///
/// `leaf_hasher` must yield exactly the leaves of the range. Returns
/// `Ok(false)` for any mismatch, including malformed proofs; an `Err` is only
/// returned when the leaf source itself fails.
///
/// # Panics
///
/// If `start >= end`.
pub fn verify_range_proof<L: LeafHasher, H: HashPrimitive>(
    mut leaf_hasher: L,
    hasher: &H,
    start: u64,
    end: u64,
    proof: &RangeProof,
    root: &Hash,
) -> Result<bool> {
    assert!(start < end, "illegal proof range [{}, {})", start, end);
    trace!(start, end, len = proof.len(), "verifying range proof");

    let mut tree = TreeBuilder::with_hasher(hasher.clone());
    let mut proof_hashes = proof.hashes().iter();

    for i in (0..u64::BITS).rev() {
        if start & (1u64 << i) != 0 {
            let Some(hash) = proof_hashes.next() else {
                debug!(start, end, height = i, "proof too short for range start");
                return Ok(false);
            };
            if let Err(e) = tree.push_subtree(i, *hash) {
                debug!(start, end, error = %e, "malformed proof prefix");
                return Ok(false);
            }
        }
    }

    let mut leaves = 0u64;
    while let Some(leaf_hash) = leaf_hasher.next_leaf_hash()? {
        if leaves == end - start {
            debug!(start, end, "more leaves supplied than the range holds");
            return Ok(false);
        }
        if let Err(e) = tree.push_subtree(0, leaf_hash) {
            debug!(start, end, error = %e, "leaf rejected");
            return Ok(false);
        }
        leaves += 1;
    }
    if leaves != end - start {
        debug!(start, end, leaves, "leaf count does not match range");
        return Ok(false);
    }

    let end_mask = end - 1;
    for i in 0..u64::BITS {
        if end_mask & (1u64 << i) == 0 {
            let Some(hash) = proof_hashes.next() else {
                break;
            };
            if let Err(e) = tree.push_subtree(i, *hash) {
                debug!(start, end, error = %e, "malformed proof suffix");
                return Ok(false);
            }
        }
    }

    if proof_hashes.next().is_some() {
        debug!(start, end, "proof has leftover hashes");
        return Ok(false);
    }

    let verified = tree.root().as_ref() == Some(root);
    if !verified {
        debug!(start, end, "root mismatch");
    }
    Ok(verified)
}
