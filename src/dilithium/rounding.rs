use crate::dilithium::{ALPHA, D, GAMMA2, Q};

// All four routines take standard representatives in [0, Q) and keep the
// "low part" in the shifted form Q + t so that callers stay in unsigned
// arithmetic throughout.


/// Splits `a` into `a1 * 2^D + a0` with the centralized remainder
/// `a0 ∈ (-2^{D-1}, 2^{D-1}]` returned as `Q + a0`.
#[allow(clippy::cast_sign_loss, clippy::cast_possible_wrap)] // mask arithmetic
pub(crate) fn power2round(a: u32) -> (u32, u32) {
    let mut t = (a & ((1 << D) - 1)) as i32;
    t -= (1 << (D - 1)) + 1;
    t += (t >> 31) & (1 << D);
    t -= (1 << (D - 1)) - 1;
    let a0 = (Q as i32 + t) as u32;
    let a1 = ((a as i32 - t) as u32) >> D;
    (a1, a0)
}


/// Splits `a` into `a1 * ALPHA + a0` with `|a0| <= ALPHA/2` (returned as
/// `Q + a0`), forcing `a1 = 0` in the wrap-around border case.
#[allow(clippy::cast_sign_loss, clippy::cast_possible_wrap)] // mask arithmetic
pub(crate) fn decompose(a: u32) -> (u32, u32) {
    // centralized remainder mod ALPHA, exploiting ALPHA = (Q-1)/16 = 2^19 - 2^9
    let mut t = (a & 0x0007_FFFF) as i32;
    t += ((a >> 19) << 9) as i32;
    t -= (ALPHA / 2 + 1) as i32;
    t += (t >> 31) & ALPHA as i32;
    t -= (ALPHA / 2 - 1) as i32;
    let a = a.wrapping_sub(t as u32);

    // divide by ALPHA
    let u = ((a as i32 - 1) >> 31) as u32;
    let mut a1 = (a >> 19) + 1;
    a1 -= u & 1;

    // border case: a1 = 16 wraps to 0 and pulls a0 down by one
    let a0 = (Q as i32 + t - (a1 >> 4) as i32) as u32;
    (a1 & 0x0F, a0)
}


/// One hint bit: does adding the low part `a0` change the high part `a1`?
pub(crate) fn make_hint(a0: u32, a1: u32) -> u32 {
    if a0 <= GAMMA2 || a0 > Q - GAMMA2 || (a0 == Q - GAMMA2 && a1 == 0) {
        0
    } else {
        1
    }
}


/// Recovers the high part of `a` with the help of the hint bit.
pub(crate) fn use_hint(a: u32, hint: u32) -> u32 {
    let (a1, a0) = decompose(a);
    if hint == 0 {
        a1
    } else if a0 > Q {
        (a1 + 1) & 0x0F
    } else {
        (a1.wrapping_sub(1)) & 0x0F
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::dilithium::reduce::freeze;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_power2round_reconstructs() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
        for _i in 0..10_000 {
            let a = rng.gen_range(0..Q);
            let (a1, a0) = power2round(a);
            // a == a1 * 2^D + (a0 - Q) mod Q, with the low part centralized
            let recon = freeze((a1 << D) + a0); // a0 carries +Q which freeze removes
            assert_eq!(recon, a);
            let centered = i64::from(a0) - i64::from(Q);
            assert!(centered > -(1 << (D - 1)) && centered <= 1 << (D - 1));
        }
    }

    #[test]
    fn test_decompose_reconstructs() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(456);
        for _i in 0..10_000 {
            let a = rng.gen_range(0..Q);
            let (a1, a0) = decompose(a);
            assert!(a1 < 16);
            let recon = freeze(a1 * ALPHA + a0);
            assert_eq!(recon, a);
        }
    }

    #[test]
    fn test_hint_law() {
        // The signer knows w and a small perturbation p (c*s2 - c*t0 terms);
        // the verifier only sees u = w - p. The hint built from the perturbed
        // low part must let the verifier recover the high part of w.
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(789);
        for _i in 0..10_000 {
            let w = rng.gen_range(0..Q);
            let (w1, w0) = decompose(w);
            let p = rng.gen_range(0..GAMMA2);
            let sign: bool = rng.gen();
            let (u, a0) = if sign {
                (freeze(w + Q - p), freeze(w0 + Q - p))
            } else {
                (freeze(w + p), freeze(w0 + p))
            };
            let h = make_hint(a0, w1);
            assert_eq!(use_hint(u, h), w1);
        }
    }
}
