use crate::ntruprime::{mod3, modq, P};

// Constant-time polynomial inversion in R/q and R/3 by the swap-based
// almost-inverse iteration: 2p + 1 rounds of eliminate-and-shift with
// masked role swaps, no data-dependent branches or indices. The quotient
// x^p - x - 1 is irreducible mod q, so inversion in R/q cannot fail on a
// nonzero input; mod 3 it can, and the caller retries with fresh
// randomness.

const LOOPS: usize = 2 * P + 1;


#[allow(clippy::cast_possible_truncation)] // i32 -> i16 mask narrowing
fn smaller_mask(x: i32, y: i32) -> i16 {
    (((x - y) >> 31) & 0xFFFF) as i16
}


fn swap_i32(a: &mut i32, b: &mut i32, mask: i16) {
    let t = i32::from(mask) & (*a ^ *b);
    *a ^= t;
    *b ^= t;
}


/// `r = (3 s)^{-1}` in `Z_q[x]/(x^p - x - 1)`. Returns false only if the
/// iteration failed to reach a unit, which cannot happen for nonzero s.
pub(crate) fn rq_recip3(r: &mut [i16; P], s: &[i8; P]) -> bool {
    let mut f = [0i16; P + 1];
    let mut g = [0i16; P + 1];
    let mut u = [0i16; LOOPS + 1];
    let mut v = [0i16; LOOPS + 1];
    let mut d = i32::try_from(P).expect("p fits i32");
    let mut e = d;

    // f is the ring quotient x^p - x - 1
    f[0] = -1;
    f[1] = -1;
    f[P] = 1;
    for i in 0..P {
        g[i] = modq::freeze(3 * i32::from(s[i]));
    }
    v[0] = 1;

    for _loop in 0..LOOPS {
        // invariant: f has degree exactly p, g degree at most p
        let c = modq::quotient(g[P], f[P]);
        for i in 0..=P {
            g[i] = modq::minus_product(g[i], c, f[i]);
        }
        for i in (1..=P).rev() {
            g[i] = g[i - 1];
        }
        g[0] = 0;
        for i in 0..=LOOPS {
            v[i] = modq::minus_product(v[i], c, u[i]);
        }
        for i in (1..=LOOPS).rev() {
            v[i] = v[i - 1];
        }
        v[0] = 0;

        e -= 1;
        let swapmask = smaller_mask(e, d) & modq::nonzero_mask(g[P]);
        swap_i32(&mut e, &mut d, swapmask);
        for i in 0..=P {
            let t = swapmask & (f[i] ^ g[i]);
            f[i] ^= t;
            g[i] ^= t;
        }
        for i in 0..=LOOPS {
            let t = swapmask & (u[i] ^ v[i]);
            u[i] ^= t;
            v[i] ^= t;
        }
    }

    let c = modq::reciprocal(f[P]);
    for i in 0..P {
        r[i] = modq::freeze(i32::from(c) * i32::from(u[P + i]));
    }
    d == 0
}


/// `r = s^{-1}` in `Z_3[x]/(x^p - x - 1)`; returns false when s is not
/// invertible mod 3.
pub(crate) fn r3_recip(r: &mut [i8; P], s: &[i8; P]) -> bool {
    let mut f = [0i8; P + 1];
    let mut g = [0i8; P + 1];
    let mut u = [0i8; LOOPS + 1];
    let mut v = [0i8; LOOPS + 1];
    let mut d = i32::try_from(P).expect("p fits i32");
    let mut e = d;

    f[0] = -1;
    f[1] = -1;
    f[P] = 1;
    g[..P].copy_from_slice(s);
    v[0] = 1;

    for _loop in 0..LOOPS {
        let c = mod3::quotient(g[P], f[P]);
        for i in 0..=P {
            g[i] = mod3::minus_product(g[i], c, f[i]);
        }
        for i in (1..=P).rev() {
            g[i] = g[i - 1];
        }
        g[0] = 0;
        for i in 0..=LOOPS {
            v[i] = mod3::minus_product(v[i], c, u[i]);
        }
        for i in (1..=LOOPS).rev() {
            v[i] = v[i - 1];
        }
        v[0] = 0;

        e -= 1;
        #[allow(clippy::cast_possible_truncation)] // an all-ones or all-zeros mask
        let swapmask8 = (smaller_mask(e, d) & i16::from(mod3::nonzero_mask(g[P]))) as i8;
        swap_i32(&mut e, &mut d, i16::from(swapmask8));
        for i in 0..=P {
            let t = swapmask8 & (f[i] ^ g[i]);
            f[i] ^= t;
            g[i] ^= t;
        }
        for i in 0..=LOOPS {
            let t = swapmask8 & (u[i] ^ v[i]);
            u[i] ^= t;
            v[i] ^= t;
        }
    }

    // f[P] is ±1 on success and is its own inverse mod 3
    let c = f[P];
    for i in 0..P {
        r[i] = mod3::freeze(i32::from(c) * i32::from(u[P + i]));
    }
    d == 0
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::ntruprime::weight::small_random;
    use crate::ntruprime::{r3, rq};
    use rand_chacha::rand_core::SeedableRng;

    #[test]
    fn test_rq_recip3_inverts() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
        for _i in 0..3 {
            let s = crate::ntruprime::weight::small_random_weightw(&mut rng).unwrap();
            let mut r = [0i16; P];
            assert!(rq_recip3(&mut r, &s));
            // r * (3 s) must be the constant polynomial 1
            let prod = rq::mult(&r, &s);
            let three: [i16; P] = core::array::from_fn(|i| modq::freeze(3 * i32::from(prod[i])));
            assert_eq!(three[0], 1);
            assert!(three[1..].iter().all(|&c| c == 0));
        }
    }

    #[test]
    fn test_r3_recip_inverts() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(456);
        let mut found = 0;
        for _i in 0..8 {
            let s = small_random(&mut rng).unwrap();
            let mut r = [0i8; P];
            if r3_recip(&mut r, &s) {
                found += 1;
                let prod = r3::mult(&s, &r);
                assert_eq!(prod[0], 1);
                assert!(prod[1..].iter().all(|&c| c == 0));
            }
        }
        // non-invertible g is rare; most draws succeed
        assert!(found > 0);
    }
}
