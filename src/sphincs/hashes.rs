use crate::helpers::{shake256_into, shake256_xof};
use crate::sphincs::address::Adrs;
use crate::sphincs::SpxParams;
use alloc::vec;
use alloc::vec::Vec;
use sha3::digest::XofReader;

// The simple SHAKE-256 tweakable hash family: every construction is
// SHAKE256 over (key-or-seed ‖ address ‖ input), truncated to n bytes.


/// PRF(key, adrs): derives one secret chain start or FORS leaf secret.
pub(crate) fn prf_addr(out: &mut [u8], key: &[u8], adrs: &Adrs) {
    shake256_into(out, &[key, &adrs.to_bytes()]);
}


/// T_l(pub_seed, adrs, blocks): the tweaked compression for chains, tree
/// nodes, and the WOTS/FORS public-key roots.
pub(crate) fn thash(out: &mut [u8], pub_seed: &[u8], adrs: &Adrs, blocks: &[u8]) {
    shake256_into(out, &[pub_seed, &adrs.to_bytes(), blocks]);
}


/// The message randomizer R = PRF(sk_prf, opt, m); opt is pinned to zero
/// for deterministic signing.
pub(crate) fn gen_message_random(out: &mut [u8], sk_prf: &[u8], opt: &[u8], m: &[u8]) {
    shake256_into(out, &[sk_prf, opt, m]);
}


/// H_msg: digests (R ‖ pk ‖ m) and splits the stream into the FORS message
/// bits, the hypertree index and the bottom-layer leaf index.
pub(crate) fn hash_message(
    r: &[u8], pk: &[u8], m: &[u8], params: &SpxParams,
) -> (Vec<u8>, u64, u32) {
    let tree_bytes = (params.tree_bits() + 7) / 8;
    let leaf_bytes = (params.leaf_bits() + 7) / 8;

    let mut xof = shake256_xof(&[r, pk, m]);
    let mut digest = vec![0u8; params.fors_msg_bytes()];
    xof.read(&mut digest);
    let mut buf = vec![0u8; tree_bytes + leaf_bytes];
    xof.read(&mut buf);

    let tree = bytes_to_ull(&buf[..tree_bytes]) & (u64::MAX >> (64 - params.tree_bits()));
    #[allow(clippy::cast_possible_truncation)] // masked below 2^leaf_bits
    let leaf = (bytes_to_ull(&buf[tree_bytes..]) & ((1 << params.leaf_bits()) - 1)) as u32;
    (digest, tree, leaf)
}


/// Big-endian bytes to integer.
fn bytes_to_ull(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
}


#[cfg(all(test, feature = "sphincs-shake-128s"))]
mod tests {
    use super::*;
    use crate::sphincs::PARAMS_128S;

    #[test]
    fn test_hash_message_ranges() {
        let params = &PARAMS_128S;
        let r = [1u8; 16];
        let pk = [2u8; 32];
        let (digest, tree, leaf) = hash_message(&r, &pk, b"msg", params);
        assert_eq!(digest.len(), params.fors_msg_bytes());
        assert!(tree < 1 << params.tree_bits());
        assert!(leaf < 1 << params.leaf_bits());

        // deterministic and input-sensitive
        let again = hash_message(&r, &pk, b"msg", params);
        assert_eq!((digest, tree, leaf), again);
        let other = hash_message(&r, &pk, b"msh", params);
        assert_ne!(again, other);
    }
}
