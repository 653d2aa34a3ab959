use crate::kyber::Q;

// Stored as u16 for space, arithmetic widened to u32/u64 for correctness.
// Every operation is branchless; the wrapping tricks below fold the
// conditional subtraction into mask arithmetic.

/// One coefficient of `Z_3329`.
#[derive(Clone, Copy, Default)]
pub(crate) struct Fq(u16);


#[allow(clippy::inline_always)]
impl Fq {
    pub(crate) fn get(self) -> u16 { self.0 }

    pub(crate) fn get_u32(self) -> u32 { u32::from(self.0) }

    pub(crate) fn set(&mut self, a: u16) { self.0 = a }

    #[inline(always)]
    #[allow(clippy::cast_possible_truncation)] // res as u16; for perf
    pub(crate) fn add(self, other: Self) -> Self {
        debug_assert!(self.0 < Q);
        debug_assert!(other.0 < Q);
        let res = u32::from(self.0) + u32::from(other.0);
        let res = res.wrapping_sub(u32::from(Q));
        let res = res.wrapping_add((res >> 16) & u32::from(Q));
        debug_assert!(res < u32::from(Q));
        Self(res as u16)
    }

    #[inline(always)]
    #[allow(clippy::cast_possible_truncation)] // res as u16; for perf
    pub(crate) fn sub(self, other: Self) -> Self {
        debug_assert!(self.0 < Q);
        debug_assert!(other.0 < Q);
        let res = u32::from(self.0).wrapping_sub(u32::from(other.0));
        let res = res.wrapping_add((res >> 16) & u32::from(Q));
        debug_assert!(res < u32::from(Q));
        Self(res as u16)
    }

    /// Barrett multiplication; the constant M over-approximates 2^36 / Q so
    /// a single correction suffices for products below Q^2.
    #[inline(always)]
    #[allow(clippy::items_after_statements, clippy::cast_possible_truncation)]
    pub(crate) fn mul(self, other: Self) -> Self {
        debug_assert!(self.0 < Q);
        debug_assert!(other.0 < Q);
        const M: u64 = ((1u64 << 36) + Q as u64 - 1) / Q as u64;
        let prod = u32::from(self.0) * u32::from(other.0);
        let quot = ((u64::from(prod) * M) >> 36) as u32;
        let rem = prod - quot * u32::from(Q);
        debug_assert!(rem < u32::from(Q));
        Self(rem as u16)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_ops_match_wide_arithmetic() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
        for _i in 0..10_000 {
            let (a, b) = (rng.gen_range(0..Q), rng.gen_range(0..Q));
            let (fa, fb) = (Fq(a), Fq(b));
            assert_eq!(u32::from(fa.add(fb).get()), (u32::from(a) + u32::from(b)) % u32::from(Q));
            assert_eq!(
                u32::from(fa.sub(fb).get()),
                (u32::from(a) + u32::from(Q) - u32::from(b)) % u32::from(Q)
            );
            assert_eq!(u32::from(fa.mul(fb).get()), (u32::from(a) * u32::from(b)) % u32::from(Q));
        }
    }
}
