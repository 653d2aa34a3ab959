use crate::dilithium::ntt::{invntt_frominvmont, ntt};
use crate::dilithium::reduce::{csubq, freeze, montgomery_reduce, reduce32};
use crate::dilithium::rounding;
use crate::dilithium::{ETA, GAMMA1, N, Q};
use crate::helpers::{shake128_xof, shake256_xof};
use sha3::digest::XofReader;


/// One ring element of `Z_Q[x]/(x^256 + 1)`. The coefficient domain at any
/// moment (standard, < 2Q, or the unreduced post-NTT growth) is a contract
/// of the preceding operation, not a stored property.
#[derive(Clone, Copy)]
pub(crate) struct Poly {
    pub(crate) coeffs: [u32; N],
}


impl Default for Poly {
    fn default() -> Self { Poly { coeffs: [0u32; N] } }
}


impl Poly {
    /// Reduce all coefficients to [0, 2Q).
    pub(crate) fn reduce(&mut self) { self.coeffs.iter_mut().for_each(|c| *c = reduce32(*c)); }

    /// Conditionally subtract Q from all coefficients: [0, 2Q) -> [0, Q).
    pub(crate) fn csubq(&mut self) { self.coeffs.iter_mut().for_each(|c| *c = csubq(*c)); }

    /// Reduce all coefficients to standard representatives.
    pub(crate) fn freeze(&mut self) { self.coeffs.iter_mut().for_each(|c| *c = freeze(*c)); }

    /// Coefficient-wise sum; no modular reduction is performed.
    #[must_use]
    pub(crate) fn add(&self, other: &Self) -> Self {
        let mut c = Poly::default();
        for i in 0..N {
            c.coeffs[i] = self.coeffs[i] + other.coeffs[i];
        }
        c
    }

    /// Coefficient-wise difference, computed as `a + 2Q - b`; both inputs
    /// must be below 2Q.
    #[must_use]
    pub(crate) fn sub(&self, other: &Self) -> Self {
        let mut c = Poly::default();
        for i in 0..N {
            c.coeffs[i] = self.coeffs[i] + 2 * Q - other.coeffs[i];
        }
        c
    }

    /// Multiply all coefficients by `2^D`; no reduction.
    pub(crate) fn shiftl(&mut self) {
        self.coeffs.iter_mut().for_each(|c| *c <<= crate::dilithium::D);
    }

    /// In-place forward NTT; see `ntt` for the growth contract.
    pub(crate) fn ntt(&mut self) { ntt(&mut self.coeffs); }

    /// In-place inverse NTT, output multiplied by the Montgomery factor.
    pub(crate) fn invntt_montgomery(&mut self) { invntt_frominvmont(&mut self.coeffs); }

    /// Pointwise product divided by the Montgomery factor (the companion of
    /// `invntt_montgomery`, which restores it).
    #[must_use]
    pub(crate) fn pointwise_invmontgomery(a: &Self, b: &Self) -> Self {
        let mut c = Poly::default();
        for i in 0..N {
            c.coeffs[i] = montgomery_reduce(u64::from(a.coeffs[i]) * u64::from(b.coeffs[i]));
        }
        c
    }

    /// Coefficient-wise `power2round`; input must hold standard representatives.
    #[must_use]
    pub(crate) fn power2round(&self) -> (Self, Self) {
        let (mut a1, mut a0) = (Poly::default(), Poly::default());
        for i in 0..N {
            let (hi, lo) = rounding::power2round(self.coeffs[i]);
            a1.coeffs[i] = hi;
            a0.coeffs[i] = lo;
        }
        (a1, a0)
    }

    /// Coefficient-wise `decompose`; input must hold standard representatives.
    #[must_use]
    pub(crate) fn decompose(&self) -> (Self, Self) {
        let (mut a1, mut a0) = (Poly::default(), Poly::default());
        for i in 0..N {
            let (hi, lo) = rounding::decompose(self.coeffs[i]);
            a1.coeffs[i] = hi;
            a0.coeffs[i] = lo;
        }
        (a1, a0)
    }

    /// Coefficient-wise hint bits plus their population count.
    pub(crate) fn make_hint(a0: &Self, a1: &Self) -> (Self, u32) {
        let mut h = Poly::default();
        let mut s = 0;
        for i in 0..N {
            h.coeffs[i] = rounding::make_hint(a0.coeffs[i], a1.coeffs[i]);
            s += h.coeffs[i];
        }
        (h, s)
    }

    /// Coefficient-wise `use_hint`; input must hold standard representatives.
    #[must_use]
    pub(crate) fn use_hint(&self, hint: &Self) -> Self {
        let mut a = Poly::default();
        for i in 0..N {
            a.coeffs[i] = rounding::use_hint(self.coeffs[i], hint.coeffs[i]);
        }
        a
    }

    /// Infinity-norm check against `bound`; expects standard representatives.
    /// Returns true if any centralized coefficient reaches the bound.
    ///
    /// It is ok to leak which coefficient violates the bound since the
    /// probability for each coefficient is independent of secret data, but
    /// the sign of the centralized representative must not leak.
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_wrap)] // mask arithmetic
    pub(crate) fn chknorm(&self, bound: u32) -> bool {
        for c in &self.coeffs {
            // absolute value of the centralized representative
            let mut t = ((Q - 1) / 2) as i32 - *c as i32;
            t ^= t >> 31;
            let t = ((Q - 1) / 2) as i32 - t;
            if t as u32 >= bound {
                return true;
            }
        }
        false
    }

    /// Uniform sampling in [0, Q) by 23-bit rejection from SHAKE128(seed ‖ nonce).
    /// Solely dependent on public seed material, so not constant time.
    #[must_use]
    pub(crate) fn uniform(seed: &[u8; 32], nonce: u16) -> Self {
        let mut xof = shake128_xof(&[seed, &nonce.to_le_bytes()]);
        let mut a = Poly::default();
        let mut bbb = [0u8; 3];
        let mut j = 0;
        while j < N {
            xof.read(&mut bbb);
            let t =
                u32::from(bbb[0]) | (u32::from(bbb[1]) << 8) | ((u32::from(bbb[2]) & 0x7F) << 16);
            if t < Q {
                a.coeffs[j] = t;
                j += 1;
            }
        }
        a
    }

    /// Sampling in [-η, η] by nibble rejection from SHAKE128(seed ‖ nonce),
    /// stored as the compact representative `Q + η - t`.
    #[must_use]
    pub(crate) fn uniform_eta(seed: &[u8; 32], nonce: u16) -> Self {
        debug_assert!(ETA == 5, "nibble sampler assumes 3 < eta <= 7");
        let mut xof = shake128_xof(&[seed, &nonce.to_le_bytes()]);
        let mut a = Poly::default();
        let mut b = [0u8; 1];
        let mut j = 0;
        while j < N {
            xof.read(&mut b);
            let t0 = u32::from(b[0]) & 0x0F;
            let t1 = u32::from(b[0]) >> 4;
            if t0 <= 2 * ETA {
                a.coeffs[j] = Q + ETA - t0;
                j += 1;
            }
            if t1 <= 2 * ETA && j < N {
                a.coeffs[j] = Q + ETA - t1;
                j += 1;
            }
        }
        a
    }

    /// Sampling in [-(γ1-1), γ1-1] by 20-bit rejection from
    /// SHAKE256(seed ‖ nonce), two candidates per five bytes.
    #[must_use]
    pub(crate) fn uniform_gamma1m1(seed: &[u8; 48], nonce: u16) -> Self {
        debug_assert!(GAMMA1 <= 1 << 19, "sampler assumes gamma1 - 1 fits in 20 bits");
        let mut xof = shake256_xof(&[seed, &nonce.to_le_bytes()]);
        let mut a = Poly::default();
        let mut bbbbb = [0u8; 5];
        let mut j = 0;
        while j < N {
            xof.read(&mut bbbbb);
            let t0 = u32::from(bbbbb[0])
                | (u32::from(bbbbb[1]) << 8)
                | ((u32::from(bbbbb[2]) & 0x0F) << 16);
            let t1 =
                (u32::from(bbbbb[2]) >> 4) | (u32::from(bbbbb[3]) << 4) | (u32::from(bbbbb[4]) << 12);
            if t0 <= 2 * GAMMA1 - 2 {
                a.coeffs[j] = Q + GAMMA1 - 1 - t0;
                j += 1;
            }
            if t1 <= 2 * GAMMA1 - 2 && j < N {
                a.coeffs[j] = Q + GAMMA1 - 1 - t1;
                j += 1;
            }
        }
        a
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_in_range_and_deterministic() {
        let seed = [7u8; 32];
        let a = Poly::uniform(&seed, 3);
        let b = Poly::uniform(&seed, 3);
        let c = Poly::uniform(&seed, 4);
        assert!(a.coeffs.iter().all(|&x| x < Q));
        assert_eq!(a.coeffs, b.coeffs);
        assert_ne!(a.coeffs, c.coeffs);
    }

    #[test]
    fn test_eta_bounds() {
        let a = Poly::uniform_eta(&[9u8; 32], 0);
        assert!(a.coeffs.iter().all(|&x| x >= Q - ETA && x <= Q + ETA));
    }

    #[test]
    fn test_gamma1m1_bounds_and_norm() {
        let mut a = Poly::uniform_gamma1m1(&[1u8; 48], 7);
        assert!(a
            .coeffs
            .iter()
            .all(|&x| x >= Q - (GAMMA1 - 1) && x <= Q + GAMMA1 - 1));
        a.freeze();
        assert!(!a.chknorm(GAMMA1));
    }
}
