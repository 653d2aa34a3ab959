use crate::mceliece::{Params, GFMASK};
use alloc::vec;
use alloc::vec::Vec;
use rand_core::CryptoRngCore;

// Niederreiter encryption: a fixed-weight-t error vector and its syndrome
// under the systematic public key.

/// Distinctness failures are vanishingly rare; the budget turns a broken
/// RNG into an error instead of a spin.
const MAX_GEN_E_ATTEMPTS: usize = 256;


/// Moves in-range candidate indices to the front; returns false when fewer
/// than t of the 2t candidates are usable.
fn mov_forward(ind: &mut [u16], n: usize, t: usize) -> bool {
    for i in 0..t {
        let mut found = false;
        for j in i..2 * t {
            if usize::from(ind[j]) < n {
                ind.swap(i, j);
                found = true;
                break;
            }
        }
        if !found {
            return false;
        }
    }
    true
}


/// Samples a uniform weight-t error vector of n bits by rejection, then
/// scatters the accepted indices with masked writes (the scatter itself is
/// index-independent).
pub(crate) fn gen_e(
    rng: &mut impl CryptoRngCore, params: &Params,
) -> Result<Vec<u8>, &'static str> {
    let (n, t) = (params.n, params.t);
    let mut ind = vec![0u16; 2 * t];

    let mut accepted = false;
    'attempts: for _attempt in 0..MAX_GEN_E_ATTEMPTS {
        let mut buf = vec![0u8; 4 * t];
        rng.try_fill_bytes(&mut buf).map_err(|_| "Encaps: random number generator failed")?;
        for (i, chunk) in buf.chunks_exact(2).enumerate() {
            ind[i] = u16::from_le_bytes(chunk.try_into().expect("two bytes")) & GFMASK;
        }

        if !mov_forward(&mut ind, n, t) {
            continue;
        }
        // restart on any repetition
        for i in 1..t {
            for j in 0..i {
                if ind[i] == ind[j] {
                    continue 'attempts;
                }
            }
        }
        accepted = true;
        break;
    }
    if !accepted {
        return Err("Encaps: exhausted retries for the error vector");
    }

    let words = (n + 63) / 64;
    let val: Vec<u64> = ind[..t].iter().map(|&pos| 1u64 << (pos & 63)).collect();
    let mut e_int = vec![0u64; words];
    for (i, word) in e_int.iter_mut().enumerate() {
        for (j, &v) in val.iter().enumerate() {
            let mask = (u64::try_from(i).expect("word index") ^ u64::from(ind[j] >> 6))
                .wrapping_sub(1)
                >> 63;
            *word |= v & mask.wrapping_neg();
        }
    }

    let mut e = vec![0u8; n / 8];
    for (i, word) in e_int.iter().enumerate() {
        let bytes = word.to_le_bytes();
        let start = i * 8;
        let len = core::cmp::min(8, n / 8 - start);
        e[start..start + len].copy_from_slice(&bytes[..len]);
    }
    Ok(e)
}


/// Computes the syndrome of e under the public key, reconstructing each
/// full parity-check row from the identity block and the packed right-hand
/// block (tail-realigned when mt is not byte-aligned).
pub(crate) fn syndrome(pk: &[u8], e: &[u8], params: &Params) -> Vec<u8> {
    let n = params.n;
    let rows = params.pk_nrows();
    let row_bytes = params.pk_row_bytes();
    let tail = rows % 8;
    debug_assert_eq!(pk.len(), rows * row_bytes);
    debug_assert_eq!(e.len(), n / 8);

    let mut s = vec![0u8; params.synd_bytes()];
    let mut row = vec![0u8; n / 8];
    for i in 0..rows {
        row.iter_mut().for_each(|b| *b = 0);
        row[n / 8 - row_bytes..].copy_from_slice(&pk[i * row_bytes..(i + 1) * row_bytes]);
        if tail != 0 {
            for j in ((n / 8 - row_bytes)..n / 8).rev() {
                row[j] = (row[j] << tail) | (row[j - 1] >> (8 - tail));
            }
        }
        row[i / 8] |= 1 << (i % 8);

        let mut b = 0u8;
        for (r, ee) in row.iter().zip(e.iter()) {
            b ^= r & ee;
        }
        b ^= b >> 4;
        b ^= b >> 2;
        b ^= b >> 1;
        b &= 1;
        s[i / 8] |= b << (i % 8);
    }
    s
}


#[cfg(all(test, feature = "mceliece-6960-119"))]
mod tests {
    use super::*;
    use crate::mceliece::PARAMS_6960_119;
    use rand_chacha::rand_core::SeedableRng;

    #[test]
    fn test_gen_e_weight() {
        let params = &PARAMS_6960_119;
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
        for _i in 0..5 {
            let e = gen_e(&mut rng, params).unwrap();
            assert_eq!(e.len(), params.n / 8);
            let weight: u32 = e.iter().map(|b| b.count_ones()).sum();
            assert_eq!(weight as usize, params.t);
        }
    }
}
