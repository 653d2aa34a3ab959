use crate::dilithium::Q;


/// `Q^{-1} mod 2^32`, derived from Q at compile time rather than hard-coded.
#[must_use]
const fn gen_qinv() -> u32 {
    // Newton iteration doubles the number of correct low bits each round;
    // odd Q seeds three correct bits, so five rounds cover 32.
    let mut x = Q;
    let mut i = 0;
    while i < 5 {
        x = x.wrapping_mul(2u32.wrapping_sub(Q.wrapping_mul(x)));
        i += 1;
    }
    x
}

pub(crate) const QINV: u32 = gen_qinv();


/// Montgomery reduction: for `a < Q * 2^32`, computes `a * 2^{-32} mod Q`
/// with the result in [0, 2Q).
#[inline(always)]
#[allow(clippy::cast_possible_truncation)] // a as u32 takes the low word
pub(crate) fn montgomery_reduce(a: u64) -> u32 {
    let t = (a as u32).wrapping_mul(QINV);
    ((a + u64::from(t) * u64::from(Q)) >> 32) as u32
}


/// Barrett-style reduction exploiting `2^23 ≡ 2^13 - 1 mod Q`; for any u32
/// input the result is in [0, 2Q).
#[inline(always)]
pub(crate) fn reduce32(a: u32) -> u32 {
    let t = a & 0x007F_FFFF;
    let a = a >> 23;
    t + (a << 13) - a
}


/// Conditional subtraction of Q, branchless: [0, 2Q) -> [0, Q).
#[inline(always)]
#[allow(clippy::cast_sign_loss)] // mask arithmetic
pub(crate) fn csubq(a: u32) -> u32 {
    let a = a.wrapping_sub(Q);
    a.wrapping_add(((a as i32) >> 31) as u32 & Q)
}


/// Full reduction of any u32 to the standard representative in [0, Q).
#[inline(always)]
pub(crate) fn freeze(a: u32) -> u32 { csubq(reduce32(a)) }


#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_qinv_derivation() {
        assert_eq!(Q.wrapping_mul(QINV), 1);
    }

    #[test]
    fn test_montgomery_strips_r() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
        for _i in 0..1000 {
            let a = u64::from(rng.gen::<u32>()) * u64::from(rng.gen_range(0..Q));
            let r = montgomery_reduce(a);
            assert!(r < 2 * Q);
            // r * 2^32 ≡ a mod Q
            assert_eq!((u128::from(r) << 32) % u128::from(Q), u128::from(a) % u128::from(Q));
        }
    }

    #[test]
    fn test_freeze_range_and_idempotence() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(456);
        for _i in 0..1000 {
            let a = rng.gen::<u32>();
            let f = freeze(a);
            assert!(f < Q);
            assert_eq!(f, u32::try_from(u64::from(a) % u64::from(Q)).unwrap());
            assert_eq!(freeze(f), f);
        }
    }
}
