use crate::dilithium::reduce::montgomery_reduce;
use crate::dilithium::{N, Q};

// The zeta tables are generated at compile time from the primitive 512-th
// root of unity 1753 mod Q, stored in Montgomery form and bit-reversed
// order. Thus, not particularly optimal or CT -- but const.

const ROOT_OF_UNITY: u64 = 1753;


const fn pow_mod_q(base: u64, mut exp: u64) -> u64 {
    let mut acc = 1u64;
    let mut b = base % Q as u64;
    while exp > 0 {
        if exp & 1 == 1 {
            acc = (acc * b) % Q as u64;
        }
        b = (b * b) % Q as u64;
        exp >>= 1;
    }
    acc
}


/// Lift a standard-domain value into Montgomery form: `x * 2^32 mod Q`.
const fn to_mont(x: u64) -> u32 {
    (((x % Q as u64) << 32) % Q as u64) as u32
}


#[allow(clippy::cast_possible_truncation)] // bit-reversal of an 8-bit index
const fn gen_zetas() -> [u32; N] {
    let mut out = [0u32; N];
    let mut k = 0;
    while k < N {
        let br = (k as u8).reverse_bits();
        out[k] = to_mont(pow_mod_q(ROOT_OF_UNITY, br as u64));
        k += 1;
    }
    out
}

pub(crate) static ZETAS: [u32; N] = gen_zetas();


/// Inverse-butterfly twiddles: the negations of the forward table read
/// backwards. Index 255 is never consumed by the Gentleman-Sande loops.
const fn gen_zetas_inv() -> [u32; N] {
    let zetas = gen_zetas();
    let mut out = [0u32; N];
    let mut i = 0;
    while i < N - 1 {
        out[i] = Q - zetas[N - 1 - i];
        i += 1;
    }
    out
}

static ZETAS_INV: [u32; N] = gen_zetas_inv();

/// `256^{-1} * 2^64 mod Q`: folding this into the last inverse-NTT stage
/// leaves the output carrying one Montgomery factor, which cancels the
/// `2^{-32}` the pointwise multiplications introduce.
static MONT_F: u32 = to_mont((to_mont(pow_mod_q(N as u64, Q as u64 - 2)) as u64) % Q as u64);


/// Forward NTT, in-place. No modular reduction is performed after additions
/// or subtractions, so output coefficients can be up to 16Q larger than the
/// input coefficients (which must be < 2Q). Output is in bit-reversed order.
pub(crate) fn ntt(p: &mut [u32; N]) {
    let mut k = 1;
    let mut len = 128;
    while len > 0 {
        let mut start = 0;
        while start < N {
            let zeta = u64::from(ZETAS[k]);
            k += 1;
            for j in start..(start + len) {
                let t = montgomery_reduce(zeta * u64::from(p[j + len]));
                p[j + len] = p[j] + 2 * Q - t;
                p[j] += t;
            }
            start += 2 * len;
        }
        len >>= 1;
    }
}


/// Inverse NTT and multiplication by the Montgomery factor 2^32, in-place.
/// Input coefficients must be < 2Q; output coefficients are < 2Q.
pub(crate) fn invntt_frominvmont(p: &mut [u32; N]) {
    let mut k = 0;
    let mut len = 1;
    while len < N {
        let mut start = 0;
        while start < N {
            let zeta = u64::from(ZETAS_INV[k]);
            k += 1;
            for j in start..(start + len) {
                let t = p[j];
                // coefficients grow to at most 512Q here, just inside u32
                p[j] = t + p[j + len];
                p[j + len] = montgomery_reduce(zeta * u64::from(t + 256 * Q - p[j + len]));
            }
            start += 2 * len;
        }
        len <<= 1;
    }
    for c in p.iter_mut() {
        *c = montgomery_reduce(u64::from(MONT_F) * u64::from(*c));
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::dilithium::reduce::freeze;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_zeta_tables() {
        // zetas[0] is the Montgomery form of 1
        assert_eq!(ZETAS[0], to_mont(1));
        // every entry is a valid residue and matches its negated twin
        for i in 0..N - 1 {
            assert!(ZETAS[i] < Q);
            assert_eq!(ZETAS_INV[i], Q - ZETAS[N - 1 - i]);
        }
    }

    #[test]
    fn test_ntt_invntt_round_trip() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
        for _i in 0..50 {
            let original: [u32; N] = core::array::from_fn(|_| rng.gen_range(0..Q));
            let mut p = original;
            ntt(&mut p);
            // the inverse transform expects coefficients below 2Q
            p.iter_mut().for_each(|c| *c = crate::dilithium::reduce::reduce32(*c));
            invntt_frominvmont(&mut p);
            // invntt leaves a spare Montgomery factor; strip it and compare
            for (a, b) in p.iter().zip(original.iter()) {
                assert_eq!(freeze(montgomery_reduce(u64::from(*a))), *b);
            }
        }
    }

    #[test]
    fn test_ntt_multiplies_polynomials() {
        // x^5 * x^7 = x^12 in Z_Q[x]/(x^256 + 1), via pointwise Montgomery products
        let mut a = [0u32; N];
        let mut b = [0u32; N];
        a[5] = 3;
        b[7] = 11;
        ntt(&mut a);
        ntt(&mut b);
        let mut c: [u32; N] =
            core::array::from_fn(|i| montgomery_reduce(u64::from(a[i]) * u64::from(b[i])));
        invntt_frominvmont(&mut c);
        for (i, coeff) in c.iter().enumerate() {
            assert_eq!(freeze(*coeff), if i == 12 { 33 } else { 0 });
        }
    }
}
