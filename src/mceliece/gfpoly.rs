use crate::mceliece::gf::{gf_inv, gf_iszero, gf_mul, Gf};
use alloc::vec;
use alloc::vec::Vec;

// Arithmetic in GF((2^13)^t): degree-(t-1) polynomials over the base field,
// reduced modulo the parameter set's irreducible f(y). Only the nonzero
// tail terms of f(y) vary between sets, so they travel as data.


/// `out = in0 * in1 mod f(y)`; `reduction` lists the (degree, coefficient)
/// pairs of `f(y) - y^t`.
pub(crate) fn gf_poly_mul(out: &mut [Gf], in0: &[Gf], in1: &[Gf], reduction: &[(usize, Gf)]) {
    let t = out.len();
    debug_assert_eq!(in0.len(), t);
    debug_assert_eq!(in1.len(), t);

    let mut prod = vec![Gf::default(); 2 * t - 1];
    for i in 0..t {
        for j in 0..t {
            prod[i + j] ^= gf_mul(in0[i], in1[j]);
        }
    }
    for i in (t..=2 * t - 2).rev() {
        for &(degree, coeff) in reduction {
            let folded = gf_mul(prod[i], coeff);
            prod[i - t + degree] ^= folded;
        }
    }
    out.copy_from_slice(&prod[..t]);
}


/// Computes the minimal polynomial of a random field element `f` (its first
/// t coefficients; the leading 1 is implicit) by Gaussian elimination over
/// the powers 1, f, f^2, ..., f^t. Returns false when the power matrix is
/// singular, in which case the caller retries with fresh randomness.
pub(crate) fn irr_gen(out: &mut [Gf], f: &[Gf], reduction: &[(usize, Gf)]) -> bool {
    let t = out.len();
    debug_assert_eq!(f.len(), t);

    // mat[j] holds f^j; columns are base-field coordinates
    let mut mat: Vec<Vec<Gf>> = vec![vec![Gf::default(); t]; t + 1];
    mat[0][0] = 1;
    mat[1].copy_from_slice(f);
    for j in 2..=t {
        let (lo, hi) = mat.split_at_mut(j);
        gf_poly_mul(&mut hi[0], &lo[j - 1], f, reduction);
    }

    for j in 0..t {
        for k in (j + 1)..t {
            let mask = gf_iszero(mat[j][j]);
            for c in j..=t {
                let donor = mat[c][k] & mask;
                mat[c][j] ^= donor;
            }
        }

        // a zero pivot means the powers are linearly dependent
        if mat[j][j] == 0 {
            return false;
        }

        let inv = gf_inv(mat[j][j]);
        for c in j..=t {
            mat[c][j] = gf_mul(mat[c][j], inv);
        }
        for k in 0..t {
            if k != j {
                let tmp = mat[j][k];
                for c in j..=t {
                    let scaled = gf_mul(mat[c][j], tmp);
                    mat[c][k] ^= scaled;
                }
            }
        }
    }

    out.copy_from_slice(&mat[t][..t]);
    true
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::mceliece::GFMASK;
    use rand::{Rng, SeedableRng};

    const T: usize = 119;
    const REDUCTION: &[(usize, Gf)] = &[(2, 6400), (0, 3134)];

    #[test]
    fn test_poly_mul_by_one() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
        let a: Vec<Gf> = (0..T).map(|_| rng.gen::<u16>() & GFMASK).collect();
        let mut one = vec![Gf::default(); T];
        one[0] = 1;
        let mut out = vec![Gf::default(); T];
        gf_poly_mul(&mut out, &a, &one, REDUCTION);
        assert_eq!(out, a);
    }

    #[test]
    fn test_poly_mul_commutes() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(456);
        let a: Vec<Gf> = (0..T).map(|_| rng.gen::<u16>() & GFMASK).collect();
        let b: Vec<Gf> = (0..T).map(|_| rng.gen::<u16>() & GFMASK).collect();
        let mut ab = vec![Gf::default(); T];
        let mut ba = vec![Gf::default(); T];
        gf_poly_mul(&mut ab, &a, &b, REDUCTION);
        gf_poly_mul(&mut ba, &b, &a, REDUCTION);
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_irr_gen_annihilates_its_element() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(789);
        let f: Vec<Gf> = (0..T).map(|_| rng.gen::<u16>() & GFMASK).collect();
        let mut g = vec![Gf::default(); T];
        assert!(irr_gen(&mut g, &f, REDUCTION));
        // g(f) = 0: evaluate the minimal polynomial at its element by Horner
        // over GF((2^m)^t), with the implicit leading coefficient 1
        let mut acc = vec![Gf::default(); T];
        acc[0] = 1; // start from the leading 1
        for coeff in g.iter().rev() {
            let mut next = vec![Gf::default(); T];
            gf_poly_mul(&mut next, &acc, &f, REDUCTION);
            next[0] ^= coeff;
            acc = next;
        }
        assert!(acc.iter().all(|&c| c == 0));
    }
}
