use crate::mceliece::benes::support_gen;
use crate::mceliece::decode::root;
use crate::mceliece::gf::{gf_inv, gf_mul, Gf};
use crate::mceliece::{Params, GFBITS};
use alloc::vec;
use alloc::vec::Vec;
use zeroize::Zeroize;

// Systematic-form public key generation: build the (mt) x n binary
// parity-check matrix from the Goppa polynomial and support, Gaussian
// eliminate the left mt columns, and export the right block row-packed.
// This dominates keygen cost and holds about a megabyte of secret-derived
// state, heap-allocated and wiped before return.


/// Returns false when the matrix is not invertible on its left block, in
/// which case the caller retries keygen with fresh randomness.
pub(crate) fn pk_gen(pk: &mut [u8], goppa: &[Gf], cond: &[u8], params: &Params) -> bool {
    let (n, t) = (params.n, params.t);
    let rows = params.pk_nrows();
    let row_bytes = n / 8;
    debug_assert_eq!(pk.len(), rows * params.pk_row_bytes());

    let mut g = vec![Gf::default(); t + 1];
    g[..t].copy_from_slice(goppa);
    g[t] = 1;

    let support = support_gen(cond);
    let l = &support[..n];

    // inv starts as 1/g(L_j) and picks up another factor L_j per row block
    let mut inv: Vec<Gf> = root(&g, l).iter().map(|&e| gf_inv(e)).collect();

    let mut mat = vec![vec![0u8; row_bytes]; rows];
    for i in 0..t {
        for j in (0..n).step_by(8) {
            for k in 0..GFBITS {
                let mut b = 0u8;
                for e in (0..8).rev() {
                    b <<= 1;
                    b |= u8::try_from((inv[j + e] >> k) & 1).expect("single bit");
                }
                mat[i * GFBITS + k][j / 8] = b;
            }
        }
        for j in 0..n {
            inv[j] = gf_mul(inv[j], l[j]);
        }
    }

    // column-major elimination restricted to the first mt columns
    let mut systematic = true;
    'outer: for i in 0..(rows + 7) / 8 {
        for j in 0..8 {
            let row = i * 8 + j;
            if row >= rows {
                break;
            }

            for k in (row + 1)..rows {
                let mask = ((mat[row][i] ^ mat[k][i]) >> j) & 1;
                let mask = mask.wrapping_neg();
                let (head, tail) = mat.split_at_mut(k);
                for (a, b) in head[row].iter_mut().zip(tail[0].iter()) {
                    *a ^= b & mask;
                }
            }

            if (mat[row][i] >> j) & 1 == 0 {
                // not systematic
                systematic = false;
                break 'outer;
            }

            for k in 0..rows {
                if k != row {
                    let mask = ((mat[k][i] >> j) & 1).wrapping_neg();
                    let (head, tail) = mat.split_at_mut(core::cmp::max(row, k));
                    let (target, pivot) = if k < row {
                        let (h, t) = (&mut head[k], &tail[0]);
                        (h, t)
                    } else {
                        (&mut tail[0], &head[row])
                    };
                    for (a, b) in target.iter_mut().zip(pivot.iter()) {
                        *a ^= b & mask;
                    }
                }
            }
        }
    }

    if systematic {
        let tail = rows % 8;
        let mut k = 0;
        for i in 0..rows {
            if tail == 0 {
                let start = rows / 8;
                pk[k..k + (row_bytes - start)].copy_from_slice(&mat[i][start..]);
                k += row_bytes - start;
            } else {
                let start = (rows - 1) / 8;
                for j in start..row_bytes - 1 {
                    pk[k] = (mat[i][j] >> tail) | (mat[i][j + 1] << (8 - tail));
                    k += 1;
                }
                pk[k] = mat[i][row_bytes - 1] >> tail;
                k += 1;
            }
        }
    }

    for row in &mut mat {
        row.zeroize();
    }
    inv.zeroize();
    g.zeroize();
    systematic
}


#[cfg(all(test, feature = "mceliece-6960-119"))]
mod tests {
    use super::*;
    use crate::mceliece::benes::controlbits;
    use crate::mceliece::gfpoly::irr_gen;
    use crate::mceliece::{GFMASK, GF_N, PARAMS_6960_119};
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    /// A full systematic-form generation against the support and polynomial,
    /// then a parity check: H e^T must be reproducible from the exported
    /// block plus the identity. This is covered end-to-end by the KEM tests;
    /// here we only assert generation succeeds on a random well-formed key.
    #[test]
    #[ignore] // several seconds in debug builds
    fn test_pk_gen_succeeds() {
        let params = &PARAMS_6960_119;
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
        let mut g = vec![Gf::default(); params.t];
        loop {
            let f: Vec<Gf> = (0..params.t).map(|_| rng.gen::<u16>() & GFMASK).collect();
            if irr_gen(&mut g, &f, params.reduction) {
                break;
            }
        }
        let mut pi: [u16; GF_N] = core::array::from_fn(|i| u16::try_from(i).unwrap());
        pi.shuffle(&mut rng);
        let cond = controlbits(&pi);
        let mut pk = vec![0u8; params.pk_len()];
        assert!(pk_gen(&mut pk, &g, &cond, params));
        assert!(pk.iter().any(|&b| b != 0));
    }
}
