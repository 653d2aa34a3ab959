use crate::mceliece::benes::support_gen;
use crate::mceliece::gf::{gf_add, gf_frac, gf_inv, gf_iszero, gf_mul, Gf};
use crate::mceliece::{Params, GFMASK};
use alloc::vec;
use alloc::vec::Vec;

// Niederreiter decryption: syndrome, Berlekamp-Massey locator, root scan,
// and a recomputed-syndrome validity check, all branchless over secrets.


/// Horner evaluation of f (degree = len - 1, coefficients low-to-high).
pub(crate) fn root_eval(f: &[Gf], a: Gf) -> Gf {
    let mut r = f[f.len() - 1];
    for &coeff in f.iter().rev().skip(1) {
        r = gf_mul(r, a);
        r = gf_add(r, coeff);
    }
    r
}


/// Evaluates f at every support point.
pub(crate) fn root(f: &[Gf], support: &[Gf]) -> Vec<Gf> {
    support.iter().map(|&a| root_eval(f, a)).collect()
}


/// Double-length syndrome of the received word r with the weights
/// 1 / g(L_i)^2: s_j = sum_i r_i L_i^j / g(L_i)^2 for j = 0 .. 2t-1.
fn synd(g: &[Gf], support: &[Gf], r: &[u8], t: usize) -> Vec<Gf> {
    let mut out = vec![Gf::default(); 2 * t];
    for (i, &li) in support.iter().enumerate() {
        let c = u16::from((r[i / 8] >> (i % 8)) & 1);
        let e = root_eval(g, li);
        let mut e_inv = gf_inv(gf_mul(e, e));
        for slot in &mut out {
            *slot = gf_add(*slot, gf_mul(e_inv, c));
            e_inv = gf_mul(e_inv, li);
        }
    }
    out
}


/// Berlekamp-Massey: derives the error-locator polynomial from the 2t
/// syndromes with branchless discrepancy and length updates.
fn bm(s: &[Gf], t: usize) -> Vec<Gf> {
    let mut big_t = vec![Gf::default(); t + 1];
    let mut c = vec![Gf::default(); t + 1];
    let mut b = vec![Gf::default(); t + 1];
    let mut len = 0u16;
    let mut bb: Gf = 1;

    b[1] = 1;
    c[0] = 1;

    for n in 0..2 * t {
        let mut d: Gf = 0;
        for i in 0..=core::cmp::min(n, t) {
            d ^= gf_mul(c[i], s[n - i]);
        }

        // mne: all-ones iff d != 0; mle: all-ones iff d != 0 and n >= 2*len
        let mut mne = d;
        mne = mne.wrapping_sub(1);
        mne >>= 15;
        mne = mne.wrapping_sub(1);
        let mut mle = u16::try_from(n).expect("iteration index");
        mle = mle.wrapping_sub(2 * len);
        mle >>= 15;
        mle = mle.wrapping_sub(1);
        mle &= mne;

        big_t.copy_from_slice(&c);

        let f = gf_frac(bb, d);
        for i in 0..=t {
            c[i] ^= gf_mul(f, b[i]) & mne;
        }
        len = (len & !mle) | (u16::try_from(n + 1).expect("iteration index").wrapping_sub(len) & mle);
        for i in 0..=t {
            b[i] = (b[i] & !mle) | (big_t[i] & mle);
        }
        bb = (bb & !mle) | (d & mle);

        for i in (1..=t).rev() {
            b[i] = b[i - 1];
        }
        b[0] = 0;
    }

    let mut out = vec![Gf::default(); t + 1];
    for i in 0..=t {
        out[i] = c[t - i];
    }
    out
}


/// Decodes the ciphertext syndrome into the error vector e. Returns 0 on a
/// valid decode (weight exactly t and matching syndromes), 1 otherwise; the
/// error vector is produced either way.
pub(crate) fn decrypt(e: &mut [u8], sk_gc: &[u8], c: &[u8], params: &Params) -> u16 {
    let (n, t) = (params.n, params.t);
    debug_assert_eq!(e.len(), n / 8);
    debug_assert_eq!(c.len(), params.synd_bytes());

    // widen the syndrome to an n-bit received word
    let mut r = vec![0u8; n / 8];
    r[..c.len()].copy_from_slice(c);
    let tail = params.pk_nrows() % 8;
    if tail != 0 {
        r[c.len() - 1] &= (1 << tail) - 1;
    }

    let mut g = vec![Gf::default(); t + 1];
    for i in 0..t {
        g[i] = u16::from_le_bytes(sk_gc[2 * i..2 * i + 2].try_into().expect("two bytes")) & GFMASK;
    }
    g[t] = 1;
    let support_full = support_gen(&sk_gc[2 * t..]);
    let support = &support_full[..n];

    let s = synd(&g, support, &r, t);
    let locator = bm(&s, t);
    let images = root(&locator, support);

    e.iter_mut().for_each(|b| *b = 0);
    let mut weight = 0u16;
    #[allow(clippy::cast_possible_truncation)] // bit is 0 or 1
    for (i, &img) in images.iter().enumerate() {
        let bit = gf_iszero(img) & 1;
        e[i / 8] |= (bit as u8) << (i % 8);
        weight += bit;
    }

    // validation: the flipped positions must regenerate the syndrome and
    // the error weight must be exactly t
    let s_cmp = synd(&g, support, e, t);
    let mut check = weight;
    check ^= u16::try_from(t).expect("t fits u16");
    for i in 0..2 * t {
        check |= s[i] ^ s_cmp[i];
    }
    check = check.wrapping_sub(1);
    check >>= 15;
    check ^ 1
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::mceliece::gf::gf_mul;

    #[test]
    fn test_root_eval() {
        // f(x) = x^2 + 3x + 5 at a: a*a ^ 3a ^ 5
        let f = [5u16, 3, 1];
        for a in [0u16, 1, 2, 1000, 8191] {
            let expect = gf_add(gf_add(gf_mul(a, a), gf_mul(3, a)), 5);
            assert_eq!(root_eval(&f, a), expect);
        }
    }

    #[test]
    fn test_bm_locates_known_roots() {
        // construct syndromes of a weight-2 error over a toy support and
        // check the locator vanishes exactly at the error positions
        const T: usize = 4;
        let support: Vec<Gf> = (1..=40).collect();
        let errors = [7usize, 23];

        // s_j = sum over error positions of L_i^j (unit weights)
        let mut s = alloc::vec![Gf::default(); 2 * T];
        for &pos in &errors {
            let mut power: Gf = 1;
            for slot in &mut s {
                *slot = gf_add(*slot, power);
                power = gf_mul(power, support[pos]);
            }
        }
        let locator = bm(&s, T);
        for (i, &li) in support.iter().enumerate() {
            let is_root = root_eval(&locator, li) == 0;
            assert_eq!(is_root, errors.contains(&i));
        }
    }
}
