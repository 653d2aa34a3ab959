use crate::sphincs::address::Adrs;
use crate::sphincs::hashes::thash;
use alloc::vec;

// Merkle tree plumbing shared by FORS and the hypertree: the classic
// TreeHash stack algorithm for roots plus auth paths, and its verifier-side
// companion that folds a leaf up an auth path.


/// Computes the root of the 2^height subtree starting at `idx_offset`, and
/// the auth path for `leaf_idx`. `gen_leaf(out, addr_idx, adrs)` produces
/// the leaf at absolute index `addr_idx`; the addr carries the tree type.
pub(crate) fn treehash<F>(
    root: &mut [u8], auth_path: &mut [u8], leaf_idx: u32, idx_offset: u32, height: u32,
    mut gen_leaf: F, pub_seed: &[u8], tree_adrs: &mut Adrs, n: usize,
) where
    F: FnMut(&mut [u8], u32, &mut Adrs),
{
    let mut stack = vec![0u8; (height as usize + 1) * n];
    let mut heights = vec![0u32; height as usize + 1];
    let mut offset = 0usize;

    for idx in 0..(1u32 << height) {
        gen_leaf(&mut stack[offset * n..(offset + 1) * n], idx + idx_offset, tree_adrs);
        offset += 1;
        heights[offset - 1] = 0;

        // the leaf's sibling starts the auth path
        if leaf_idx ^ 1 == idx {
            auth_path[..n].copy_from_slice(&stack[(offset - 1) * n..offset * n]);
        }

        while offset >= 2 && heights[offset - 1] == heights[offset - 2] {
            let tree_idx = idx >> (heights[offset - 1] + 1);
            tree_adrs.set_tree_height(heights[offset - 1] + 1);
            tree_adrs.set_tree_index(tree_idx + (idx_offset >> (heights[offset - 1] + 1)));
            let (lo, hi) = stack.split_at_mut((offset - 1) * n);
            let pair_start = (offset - 2) * n;
            let mut node = [0u8; 64];
            node[..n].copy_from_slice(&lo[pair_start..pair_start + n]);
            node[n..2 * n].copy_from_slice(&hi[..n]);
            thash(&mut lo[pair_start..pair_start + n], pub_seed, tree_adrs, &node[..2 * n]);
            offset -= 1;
            heights[offset - 1] += 1;

            if (leaf_idx >> heights[offset - 1]) ^ 1 == tree_idx {
                let h = heights[offset - 1] as usize;
                auth_path[h * n..(h + 1) * n]
                    .copy_from_slice(&stack[(offset - 1) * n..offset * n]);
            }
        }
    }
    root.copy_from_slice(&stack[..n]);
}


/// Folds a leaf up its auth path to the root the signer committed to.
pub(crate) fn compute_root(
    root: &mut [u8], leaf: &[u8], mut leaf_idx: u32, mut idx_offset: u32, auth_path: &[u8],
    height: u32, pub_seed: &[u8], adrs: &mut Adrs,
) {
    let n = leaf.len();
    let mut buffer = vec![0u8; 2 * n];
    if leaf_idx & 1 == 1 {
        buffer[n..].copy_from_slice(leaf);
        buffer[..n].copy_from_slice(&auth_path[..n]);
    } else {
        buffer[..n].copy_from_slice(leaf);
        buffer[n..].copy_from_slice(&auth_path[..n]);
    }
    let mut auth = &auth_path[n..];

    for i in 0..height - 1 {
        leaf_idx >>= 1;
        idx_offset >>= 1;
        adrs.set_tree_height(i + 1);
        adrs.set_tree_index(leaf_idx + idx_offset);
        let node = buffer.clone();
        if leaf_idx & 1 == 1 {
            thash(&mut buffer[n..], pub_seed, adrs, &node);
            buffer[..n].copy_from_slice(&auth[..n]);
        } else {
            thash(&mut buffer[..n], pub_seed, adrs, &node);
            buffer[n..].copy_from_slice(&auth[..n]);
        }
        auth = &auth[n..];
    }

    leaf_idx >>= 1;
    idx_offset >>= 1;
    adrs.set_tree_height(height);
    adrs.set_tree_index(leaf_idx + idx_offset);
    thash(root, pub_seed, adrs, &buffer);
}
