use crate::ntruprime::{modq, P, QSHIFT, RQ_LEN, RQ_ROUNDED_LEN};

// Ring elements of R/q = Z_q[x]/(x^p - x - 1) as length-p arrays of centered
// i16 coefficients. The quotient relation folds with two taps: x^p = x + 1.


/// Product of a mod-q element and a small (trit) element.
pub(crate) fn mult(f: &[i16; P], g: &[i8; P]) -> [i16; P] {
    let mut fg = [0i16; 2 * P - 1];
    for (i, slot) in fg.iter_mut().enumerate().take(P) {
        let mut result = 0i16;
        for j in 0..=i {
            result = modq::plus_product(result, f[j], i16::from(g[i - j]));
        }
        *slot = result;
    }
    for (i, slot) in fg.iter_mut().enumerate().skip(P) {
        let mut result = 0i16;
        for j in (i - P + 1)..P {
            result = modq::plus_product(result, f[j], i16::from(g[i - j]));
        }
        *slot = result;
    }
    for i in (P..=2 * P - 2).rev() {
        fg[i - P] = modq::sum(fg[i - P], fg[i]);
        fg[i - P + 1] = modq::sum(fg[i - P + 1], fg[i]);
    }
    let mut h = [0i16; P];
    h.copy_from_slice(&fg[..P]);
    h
}


/// Rounds every coefficient to the nearest multiple of 3 (staying centered).
pub(crate) fn round3(f: &[i16; P]) -> [i16; P] {
    let mut h = [0i16; P];
    for i in 0..P {
        h[i] = ((21846 * (i32::from(f[i]) + 2295) + 32768) >> 16) as i16 * 3 - 2295;
    }
    h
}


/// Full encoding: five coefficients (shifted into [0, 4590]) per eight bytes
/// as base-6144 digits, with the lone trailing coefficient in two bytes.
pub(crate) fn encode(f: &[i16; P]) -> [u8; RQ_LEN] {
    let mut c = [0u8; RQ_LEN];
    let mut off = 0;
    for chunk in f.chunks_exact(5) {
        let mut v = 0u64;
        for coeff in chunk.iter().rev() {
            let digit = u64::from(u16::try_from(coeff + QSHIFT).expect("shifted coefficient"));
            v = v * 6144 + digit;
        }
        c[off..off + 8].copy_from_slice(&v.to_le_bytes());
        off += 8;
    }
    // p mod 5 = 1
    let last = u16::try_from(f[P - 1] + QSHIFT).expect("shifted coefficient");
    c[off..off + 2].copy_from_slice(&last.to_le_bytes());
    c
}


/// Inverse of `encode`; out-of-range digits reduce mod q rather than being
/// rejected, matching the original wire behavior (public-key bytes only).
#[allow(clippy::cast_possible_truncation)] // base-6144 digits fit i32
pub(crate) fn decode(c: &[u8; RQ_LEN]) -> [i16; P] {
    let mut f = [0i16; P];
    for (chunk, out) in c[..8 * (P / 5)].chunks_exact(8).zip(f.chunks_exact_mut(5)) {
        let mut v = u64::from_le_bytes(chunk.try_into().expect("eight bytes"));
        for coeff in out.iter_mut() {
            *coeff = modq::freeze((v % 6144) as i32 - i32::from(QSHIFT));
            v /= 6144;
        }
    }
    let last = u16::from_le_bytes(c[RQ_LEN - 2..].try_into().expect("two bytes"));
    f[P - 1] = modq::freeze(i32::from(last) - i32::from(QSHIFT));
    f
}


/// Rounded encoding: coefficients are multiples of 3 in [-2295, 2295], so
/// `(c + 2295) / 3` lies in [0, 1530] and three of them fit four bytes as
/// base-1536 digits. The final two coefficients take three bytes.
#[allow(clippy::cast_sign_loss)] // digits are non-negative by construction
pub(crate) fn encode_rounded(f: &[i16; P]) -> [u8; RQ_ROUNDED_LEN] {
    let mut c = [0u8; RQ_ROUNDED_LEN];
    let mut off = 0;
    let third = |x: i16| ((21846 * (i32::from(x) + i32::from(QSHIFT))) >> 16) as u32;
    for chunk in f.chunks_exact(3) {
        let (f0, f1, f2) = (third(chunk[0]), third(chunk[1]), third(chunk[2]));
        let v = f0 + f1 * 1536 + f2 * 1536 * 1536;
        c[off..off + 4].copy_from_slice(&v.to_le_bytes());
        off += 4;
    }
    // p mod 3 = 2
    let (f0, f1) = (third(f[P - 2]), third(f[P - 1]));
    let v = f0 + f1 * 1536;
    c[off] = v.to_le_bytes()[0];
    c[off + 1] = v.to_le_bytes()[1];
    c[off + 2] = v.to_le_bytes()[2];
    c
}


/// Division-free inverse of `encode_rounded`, reconstructing base-1536
/// digits with proven fixed-point approximations.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)] // wrapping digit arithmetic
pub(crate) fn decode_rounded(c: &[u8; RQ_ROUNDED_LEN]) -> [i16; P] {
    let mut f = [0i16; P];
    // Malformed bytes wrap instead of being rejected (ciphertext decoding
    // must stay total for implicit rejection); the 11-bit digit mask keeps
    // the wrapped garbage inside freeze's proven input window.
    let unshift =
        |d: u32| modq::freeze(((d & 0x7FF) * 3) as i32 + i32::from(crate::ntruprime::Q) - i32::from(QSHIFT));
    for (chunk, out) in c[..4 * (P / 3)].chunks_exact(4).zip(f.chunks_exact_mut(3)) {
        let (c0, c1, c2, c3) =
            (u32::from(chunk[0]), u32::from(chunk[1]), u32::from(chunk[2]), u32::from(chunk[3]));

        // f0 + f1*1536 + f2*1536^2 = c0 + c1*256 + c2*256^2 + c3*256^3
        // with each f between 0 and 1530; the magic multipliers bound the
        // quotient within 2^21 of the true digit
        let f2 = (14_913_081u32.wrapping_mul(c3))
            .wrapping_add(58254 * c2)
            .wrapping_add(228 * (c1 + 2))
            >> 21;
        let c2 = (c2 + (c3 << 8)).wrapping_sub((f2 * 9) << 2);

        let f1 = (89_478_485u32.wrapping_mul(c2))
            .wrapping_add(349_525 * c1)
            .wrapping_add(1365 * (c0 + 1))
            >> 21;
        let c1 = (c1 + (c2 << 8)).wrapping_sub(f1.wrapping_mul(3) << 1);

        let f0 = c0.wrapping_add(c1 << 8);
        out[0] = unshift(f0);
        out[1] = unshift(f1);
        out[2] = unshift(f2);
    }
    let (c0, c1, c2) = (
        u32::from(c[RQ_ROUNDED_LEN - 3]),
        u32::from(c[RQ_ROUNDED_LEN - 2]),
        u32::from(c[RQ_ROUNDED_LEN - 1]),
    );
    let f1 = (89_478_485u32.wrapping_mul(c2))
        .wrapping_add(349_525 * c1)
        .wrapping_add(1365 * (c0 + 1))
        >> 21;
    let c1 = (c1 + (c2 << 8)).wrapping_sub(f1.wrapping_mul(3) << 1);
    let f0 = c0.wrapping_add(c1 << 8);
    f[P - 2] = unshift(f0);
    f[P - 1] = unshift(f1);
    f
}


#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};

    fn random_rq(rng: &mut impl Rng) -> [i16; P] {
        core::array::from_fn(|_| modq::freeze(rng.gen_range(-2295..=2295)))
    }

    #[test]
    fn test_encode_round_trip() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
        for _i in 0..20 {
            let f = random_rq(&mut rng);
            assert_eq!(decode(&encode(&f)), f);
        }
    }

    #[test]
    fn test_rounded_round_trip() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(456);
        for _i in 0..20 {
            let f = round3(&random_rq(&mut rng));
            assert_eq!(decode_rounded(&encode_rounded(&f)), f);
        }
    }

    #[test]
    fn test_round3_properties() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(789);
        let f = random_rq(&mut rng);
        for (r, orig) in round3(&f).iter().zip(f.iter()) {
            assert_eq!(r % 3, 0);
            assert!((r - orig).abs() <= 1);
            assert!((-2295..=2295).contains(r));
        }
    }

    #[test]
    fn test_mult_identity_and_x() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(321);
        let f = random_rq(&mut rng);
        let mut one = [0i8; P];
        one[0] = 1;
        assert_eq!(mult(&f, &one), f);

        // multiplying by x rotates with the two-tap feedback x^p = x + 1
        let mut x = [0i8; P];
        x[1] = 1;
        let fx = mult(&f, &x);
        assert_eq!(fx[0], f[P - 1]);
        assert_eq!(fx[1], modq::sum(f[0], f[P - 1]));
        for i in 2..P {
            assert_eq!(fx[i], f[i - 1]);
        }
    }
}
