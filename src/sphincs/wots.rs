use crate::sphincs::address::Adrs;
use crate::sphincs::hashes::{prf_addr, thash};
use crate::sphincs::SpxParams;
use alloc::vec;
use alloc::vec::Vec;

// WOTS+ over w = 16: len1 = 2n message nibbles plus a len2 = 3 nibble
// checksum, one hash chain per digit.


/// Splits a byte string into base-16 digits, high nibble first.
fn base_w(digits: &mut [u32], input: &[u8]) {
    let mut in_idx = 0;
    let mut total = 0u8;
    let mut bits = 0;
    for digit in digits.iter_mut() {
        if bits == 0 {
            total = input[in_idx];
            in_idx += 1;
            bits = 8;
        }
        bits -= 4;
        *digit = u32::from(total >> bits) & 0x0F;
    }
}


/// The chain lengths for a message: its digits plus the checksum digits.
pub(crate) fn chain_lengths(msg: &[u8], params: &SpxParams) -> Vec<u32> {
    let len1 = params.wots_len1();
    let len2 = params.wots_len2();
    let mut lengths = vec![0u32; len1 + len2];
    base_w(&mut lengths[..len1], msg);

    // checksum over the inverted digits, left-aligned to the nibble grid
    let mut csum: u32 = lengths[..len1].iter().map(|&d| 15 - d).sum();
    csum <<= (8 - (len2 * 4) % 8) % 8;
    let csum_bytes = csum.to_be_bytes();
    let needed = (len2 * 4 + 7) / 8;
    base_w(&mut lengths[len1..], &csum_bytes[4 - needed..]);
    lengths
}


/// Walks one chain from value `start` for `steps` applications of F.
fn gen_chain(
    out: &mut [u8], start: u32, steps: u32, pub_seed: &[u8], adrs: &mut Adrs,
) {
    let mut i = start;
    while i < start + steps && i < 16 {
        adrs.set_hash(i);
        let input = out.to_vec();
        thash(out, pub_seed, adrs, &input);
        i += 1;
    }
}


/// Expands the secret seed into chain starts and walks every chain to the
/// end; the caller compresses the concatenated ends into the leaf.
pub(crate) fn wots_gen_pk(
    pk: &mut [u8], sk_seed: &[u8], pub_seed: &[u8], adrs: &mut Adrs, params: &SpxParams,
) {
    let n = params.n;
    for i in 0..params.wots_len() {
        adrs.set_chain(u32::try_from(i).expect("chain index"));
        adrs.set_hash(0);
        let slot = &mut pk[i * n..(i + 1) * n];
        prf_addr(slot, sk_seed, adrs);
        gen_chain(slot, 0, 15, pub_seed, adrs);
    }
}


/// Signs an n-byte digest: each chain stops at its digit.
pub(crate) fn wots_sign(
    sig: &mut [u8], msg: &[u8], sk_seed: &[u8], pub_seed: &[u8], adrs: &mut Adrs,
    params: &SpxParams,
) {
    let n = params.n;
    let lengths = chain_lengths(msg, params);
    for (i, &steps) in lengths.iter().enumerate() {
        adrs.set_chain(u32::try_from(i).expect("chain index"));
        adrs.set_hash(0);
        let slot = &mut sig[i * n..(i + 1) * n];
        prf_addr(slot, sk_seed, adrs);
        gen_chain(slot, 0, steps, pub_seed, adrs);
    }
}


/// Completes the chains from a signature; matches `wots_gen_pk` output for
/// a genuine signature over `msg`.
pub(crate) fn wots_pk_from_sig(
    pk: &mut [u8], sig: &[u8], msg: &[u8], pub_seed: &[u8], adrs: &mut Adrs, params: &SpxParams,
) {
    let n = params.n;
    let lengths = chain_lengths(msg, params);
    pk.copy_from_slice(sig);
    for (i, &start) in lengths.iter().enumerate() {
        adrs.set_chain(u32::try_from(i).expect("chain index"));
        gen_chain(&mut pk[i * n..(i + 1) * n], start, 15 - start, pub_seed, adrs);
    }
}


#[cfg(all(test, feature = "sphincs-shake-128s"))]
mod tests {
    use super::*;
    use crate::sphincs::PARAMS_128S;

    #[test]
    fn test_chain_lengths_checksum() {
        let params = &PARAMS_128S;
        let msg = [0xFFu8; 16];
        let lengths = chain_lengths(&msg, params);
        assert_eq!(lengths.len(), params.wots_len());
        assert!(lengths[..params.wots_len1()].iter().all(|&d| d == 15));
        // all-max digits give a zero checksum
        assert!(lengths[params.wots_len1()..].iter().all(|&d| d == 0));

        let zero_lengths = chain_lengths(&[0u8; 16], params);
        // 32 digits * 15 = 480 = 0x1E0, left-shifted one nibble: 0x1E00
        assert_eq!(&zero_lengths[params.wots_len1()..], &[1, 14, 0]);
    }

    #[test]
    fn test_sign_then_recover_pk() {
        let params = &PARAMS_128S;
        let sk_seed = [3u8; 16];
        let pub_seed = [4u8; 16];
        let msg = [0x5Au8; 16];

        let adrs = Adrs::default();
        let mut pk = vec![0u8; params.wots_bytes()];
        let mut a = adrs;
        wots_gen_pk(&mut pk, &sk_seed, &pub_seed, &mut a, params);

        let mut sig = vec![0u8; params.wots_bytes()];
        let mut a = adrs;
        wots_sign(&mut sig, &msg, &sk_seed, &pub_seed, &mut a, params);

        let mut recovered = vec![0u8; params.wots_bytes()];
        let mut a = adrs;
        wots_pk_from_sig(&mut recovered, &sig, &msg, &pub_seed, &mut a, params);
        assert_eq!(pk, recovered);
    }
}
