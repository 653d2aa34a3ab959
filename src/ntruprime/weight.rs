use crate::ntruprime::{P, SMALL_LEN, W};
use rand_core::CryptoRngCore;


/// Constant-time compare-exchange from the sorting network.
#[allow(clippy::cast_sign_loss, clippy::cast_possible_wrap)] // mask arithmetic
fn minmax(x: &mut i32, y: &mut i32) {
    let xi = *x as u32;
    let yi = *y as u32;
    let xy = xi ^ yi;
    let mut c = yi.wrapping_sub(xi);
    c ^= xy & (c ^ yi);
    c >>= 31;
    c = c.wrapping_neg();
    c &= xy;
    *x = (xi ^ c) as i32;
    *y = (yi ^ c) as i32;
}


/// Batcher-style sorting network over the full array; the comparison
/// pattern depends only on the length.
fn sort(x: &mut [i32]) {
    let n = x.len();
    if n < 2 {
        return;
    }
    let mut top = 1;
    while top < n - top {
        top += top;
    }
    let mut p = top;
    while p > 0 {
        for i in 0..n - p {
            if i & p == 0 {
                let (lo, hi) = x.split_at_mut(i + p);
                minmax(&mut lo[i], &mut hi[0]);
            }
        }
        let mut q = top;
        while q > p {
            for i in 0..n - q {
                if i & p == 0 {
                    let (lo, hi) = x.split_at_mut(i + q);
                    minmax(&mut lo[i + p], &mut hi[0]);
                }
            }
            q >>= 1;
        }
        p >>= 1;
    }
}


/// Uniform trit vector (for the generator polynomial g).
pub(crate) fn small_random(rng: &mut impl CryptoRngCore) -> Result<[i8; P], &'static str> {
    let mut buf = [0u8; 4 * P];
    rng.try_fill_bytes(&mut buf).map_err(|_| "Keygen: random number generator failed")?;
    let mut f = [0i8; P];
    for (i, chunk) in buf.chunks_exact(4).enumerate() {
        let r = u32::from_le_bytes(chunk.try_into().expect("four bytes"));
        f[i] = i8::try_from((r % 3) as i16 - 1).expect("trit");
    }
    Ok(f)
}


/// Fixed-weight trit vector: exactly w nonzero entries with random signs,
/// produced by tagging random words and sorting them in constant time.
#[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn small_random_weightw(
    rng: &mut impl CryptoRngCore,
) -> Result<[i8; P], &'static str> {
    let mut buf = [0u8; 4 * P];
    rng.try_fill_bytes(&mut buf).map_err(|_| "random number generator failed")?;
    let mut r = [0i32; P];
    for (i, chunk) in buf.chunks_exact(4).enumerate() {
        r[i] = (u32::from_le_bytes(chunk.try_into().expect("four bytes")) ^ 0x8000_0000) as i32;
    }
    // low bits select the bucket: the w smallest tags keep two random-ish
    // low bits (sign), the rest are pinned to the zero marker
    for slot in r.iter_mut().take(W) {
        *slot &= -2;
    }
    for slot in r.iter_mut().skip(W) {
        *slot = (*slot & -3) | 1;
    }
    sort(&mut r);
    let mut f = [0i8; P];
    for i in 0..P {
        f[i] = ((r[i] & 3) as u8).wrapping_sub(1) as i8;
    }
    Ok(f)
}


/// Four trits per byte (p mod 4 = 1, so one trailing trit).
#[allow(clippy::cast_sign_loss)] // trits shifted to 0..=2
pub(crate) fn small_encode(f: &[i8; P]) -> [u8; SMALL_LEN] {
    let mut c = [0u8; SMALL_LEN];
    for (i, chunk) in f.chunks_exact(4).enumerate() {
        let mut c0 = (chunk[0] + 1) as u8;
        c0 += ((chunk[1] + 1) as u8) << 2;
        c0 += ((chunk[2] + 1) as u8) << 4;
        c0 += ((chunk[3] + 1) as u8) << 6;
        c[i] = c0;
    }
    c[SMALL_LEN - 1] = (f[P - 1] + 1) as u8;
    c
}


#[allow(clippy::cast_possible_wrap)] // trits shifted back to -1..=1
pub(crate) fn small_decode(c: &[u8]) -> [i8; P] {
    debug_assert_eq!(c.len(), SMALL_LEN);
    let mut f = [0i8; P];
    for (i, byte) in c[..P / 4].iter().enumerate() {
        let mut c0 = *byte;
        for j in 0..4 {
            f[4 * i + j] = ((c0 & 3) as i8).wrapping_sub(1);
            c0 >>= 2;
        }
    }
    f[P - 1] = ((c[SMALL_LEN - 1] & 3) as i8).wrapping_sub(1);
    f
}


#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::rand_core::SeedableRng;

    #[test]
    fn test_weightw_has_weight_w() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
        for _i in 0..5 {
            let f = small_random_weightw(&mut rng).unwrap();
            let weight = f.iter().filter(|&&x| x != 0).count();
            assert_eq!(weight, W);
            assert!(f.iter().all(|&x| (-1..=1).contains(&x)));
        }
    }

    #[test]
    fn test_small_codec_round_trip() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(456);
        for _i in 0..10 {
            let f = small_random(&mut rng).unwrap();
            assert_eq!(small_decode(&small_encode(&f)), f);
        }
    }
}
