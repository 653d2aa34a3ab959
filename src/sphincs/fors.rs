use crate::sphincs::address::{Adrs, ADDR_TYPE_FORSPK, ADDR_TYPE_FORSTREE};
use crate::sphincs::hashes::{prf_addr, thash};
use crate::sphincs::merkle::{compute_root, treehash};
use crate::sphincs::SpxParams;
use alloc::vec;
use alloc::vec::Vec;

// FORS: k Merkle trees of height a over few-time secret leaves; a signature
// reveals one secret leaf per tree plus its auth path, and the roots
// compress into the public key signed by the bottom WOTS layer.


/// Interprets the message digest as k indices of a bits each (LSB first
/// within each group).
fn message_to_indices(m: &[u8], params: &SpxParams) -> Vec<u32> {
    let mut indices = vec![0u32; params.fors_trees];
    let mut offset = 0;
    for index in indices.iter_mut() {
        for j in 0..params.fors_height {
            *index ^= u32::from((m[offset >> 3] >> (offset & 0x7)) & 0x1) << j;
            offset += 1;
        }
    }
    indices
}


fn fors_gen_leaf(
    leaf: &mut [u8], sk_seed: &[u8], pub_seed: &[u8], addr_idx: u32, tree_adrs: &Adrs,
) {
    let mut leaf_adrs = *tree_adrs;
    leaf_adrs.set_tree_height(0);
    leaf_adrs.set_tree_index(addr_idx);
    prf_addr(leaf, sk_seed, &leaf_adrs);
    let sk = leaf.to_vec();
    thash(leaf, pub_seed, &leaf_adrs, &sk);
}


/// Signs the message digest and returns the FORS public key that the
/// hypertree in turn signs.
pub(crate) fn fors_sign(
    sig: &mut [u8], pk: &mut [u8], m: &[u8], sk_seed: &[u8], pub_seed: &[u8], fors_adrs: &Adrs,
    params: &SpxParams,
) {
    let n = params.n;
    let a = u32::try_from(params.fors_height).expect("tree height");
    let mut tree_adrs = Adrs::default();
    tree_adrs.copy_keypair(fors_adrs);
    tree_adrs.set_type(ADDR_TYPE_FORSTREE);
    let mut pk_adrs = Adrs::default();
    pk_adrs.copy_keypair(fors_adrs);
    pk_adrs.set_type(ADDR_TYPE_FORSPK);

    let indices = message_to_indices(m, params);
    let mut roots = vec![0u8; params.fors_trees * n];
    let mut off = 0;
    for (i, &index) in indices.iter().enumerate() {
        let idx_offset = u32::try_from(i).expect("tree count") << a;

        // reveal the secret leaf
        tree_adrs.set_tree_height(0);
        tree_adrs.set_tree_index(index + idx_offset);
        prf_addr(&mut sig[off..off + n], sk_seed, &tree_adrs);
        off += n;

        // auth path and root
        let gen = |out: &mut [u8], addr_idx: u32, adrs: &mut Adrs| {
            fors_gen_leaf(out, sk_seed, pub_seed, addr_idx, adrs);
        };
        treehash(
            &mut roots[i * n..(i + 1) * n],
            &mut sig[off..off + params.fors_height * n],
            index,
            idx_offset,
            a,
            gen,
            pub_seed,
            &mut tree_adrs,
            n,
        );
        off += params.fors_height * n;
    }
    thash(pk, pub_seed, &pk_adrs, &roots);
}


/// Recomputes the FORS public key a signature commits to.
pub(crate) fn fors_pk_from_sig(
    pk: &mut [u8], sig: &[u8], m: &[u8], pub_seed: &[u8], fors_adrs: &Adrs, params: &SpxParams,
) {
    let n = params.n;
    let a = u32::try_from(params.fors_height).expect("tree height");
    let mut tree_adrs = Adrs::default();
    tree_adrs.copy_keypair(fors_adrs);
    tree_adrs.set_type(ADDR_TYPE_FORSTREE);
    let mut pk_adrs = Adrs::default();
    pk_adrs.copy_keypair(fors_adrs);
    pk_adrs.set_type(ADDR_TYPE_FORSPK);

    let indices = message_to_indices(m, params);
    let mut roots = vec![0u8; params.fors_trees * n];
    let mut off = 0;
    for (i, &index) in indices.iter().enumerate() {
        let idx_offset = u32::try_from(i).expect("tree count") << a;

        // the revealed secret maps to its leaf
        tree_adrs.set_tree_height(0);
        tree_adrs.set_tree_index(index + idx_offset);
        let mut leaf = vec![0u8; n];
        thash(&mut leaf, pub_seed, &tree_adrs, &sig[off..off + n]);
        off += n;

        compute_root(
            &mut roots[i * n..(i + 1) * n],
            &leaf,
            index,
            idx_offset,
            &sig[off..off + params.fors_height * n],
            a,
            pub_seed,
            &mut tree_adrs,
        );
        off += params.fors_height * n;
    }
    thash(pk, pub_seed, &pk_adrs, &roots);
}


#[cfg(all(test, feature = "sphincs-shake-128s"))]
mod tests {
    use super::*;
    use crate::sphincs::PARAMS_128S;

    #[test]
    fn test_sign_then_recover_pk() {
        let params = &PARAMS_128S;
        let sk_seed = [7u8; 16];
        let pub_seed = [9u8; 16];
        let m = [0x3Cu8; 19]; // fors_msg_bytes for 128s

        let mut fors_adrs = Adrs::default();
        fors_adrs.set_tree(5);
        fors_adrs.set_keypair(11);

        let mut sig = vec![0u8; params.fors_bytes()];
        let mut pk = vec![0u8; params.n];
        fors_sign(&mut sig, &mut pk, &m, &sk_seed, &pub_seed, &fors_adrs, params);

        let mut recovered = vec![0u8; params.n];
        fors_pk_from_sig(&mut recovered, &sig, &m, &pub_seed, &fors_adrs, params);
        assert_eq!(pk, recovered);

        // flipping any digest bit moves at least one revealed leaf
        let mut m2 = m;
        m2[0] ^= 1;
        let mut other = vec![0u8; params.n];
        fors_pk_from_sig(&mut other, &sig, &m2, &pub_seed, &fors_adrs, params);
        assert_ne!(pk, other);
    }
}
