use crate::kyber::field::Fq;
use crate::kyber::{N, Q, ZETA};

// The 256-point ring splits into 128 quadratic factors; the forward
// transform runs seven layers and pointwise products finish with a
// base-case multiply against the odd zeta powers.


/// Zeta powers in bit-reversed order, generated at compile time.
#[allow(clippy::cast_possible_truncation)] // const fns cannot use u32::from() etc...
const fn gen_zeta_table() -> [u16; N] {
    let mut result = [0u16; N];
    let mut x = 1u32;
    let mut i = 0u32;
    while i < 256 {
        result[(i as u8).reverse_bits() as usize] = x as u16;
        x = (x * (ZETA as u32)) % (Q as u32);
        i += 1;
    }
    result
}

pub(crate) static ZETA_TABLE: [u16; N] = gen_zeta_table();


/// Forward NTT over a copy of the input coefficients.
#[must_use]
#[allow(clippy::module_name_repetitions)]
pub(crate) fn ntt(f: &[Fq; N]) -> [Fq; N] {
    let mut f_hat: [Fq; N] = *f;
    let mut k = 1;
    for len in [128, 64, 32, 16, 8, 4, 2] {
        for start in (0..N).step_by(2 * len) {
            let mut zeta = Fq::default();
            zeta.set(ZETA_TABLE[k << 1]);
            k += 1;
            for j in start..(start + len) {
                let t = f_hat[j + len].mul(zeta);
                f_hat[j + len] = f_hat[j].sub(t);
                f_hat[j] = f_hat[j].add(t);
            }
        }
    }
    f_hat
}


/// Inverse NTT over a copy of the input, including the final scaling by
/// `128^{-1} = 3303 mod Q`.
#[must_use]
pub(crate) fn ntt_inv(f_hat: &[Fq; N]) -> [Fq; N] {
    let mut f: [Fq; N] = *f_hat;
    let mut k = 127;
    for len in [2, 4, 8, 16, 32, 64, 128] {
        for start in (0..N).step_by(2 * len) {
            let mut zeta = Fq::default();
            zeta.set(ZETA_TABLE[k << 1]);
            k -= 1;
            for j in start..(start + len) {
                let t = f[j];
                f[j] = t.add(f[j + len]);
                f[j + len] = zeta.mul(f[j + len].sub(t));
            }
        }
    }
    let mut n_inv = Fq::default();
    n_inv.set(3303);
    f.iter_mut().for_each(|item| *item = item.mul(n_inv));
    f
}


/// Product of two NTT-domain elements: 128 base-case multiplies with the
/// quadratic moduli `X^2 - zeta^{2 BitRev7(i) + 1}`.
#[must_use]
pub(crate) fn multiply_ntts(f_hat: &[Fq; N], g_hat: &[Fq; N]) -> [Fq; N] {
    let mut h_hat: [Fq; N] = [Fq::default(); N];
    for i in 0..128 {
        let mut gamma = Fq::default();
        gamma.set(ZETA_TABLE[i ^ 0x80]);
        let (h0, h1) = base_case_multiply(
            f_hat[2 * i],
            f_hat[2 * i + 1],
            g_hat[2 * i],
            g_hat[2 * i + 1],
            gamma,
        );
        h_hat[2 * i] = h0;
        h_hat[2 * i + 1] = h1;
    }
    h_hat
}


/// Product of `a0 + a1 X` and `b0 + b1 X` modulo `X^2 - gamma`.
#[must_use]
fn base_case_multiply(a0: Fq, a1: Fq, b0: Fq, b1: Fq, gamma: Fq) -> (Fq, Fq) {
    let c0 = a0.mul(b0).add(a1.mul(b1).mul(gamma));
    let c1 = a0.mul(b1).add(a1.mul(b0));
    (c0, c1)
}


#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_zeta_table_entries() {
        let res = gen_zeta_table();
        assert_eq!(res[0], 1);
        assert_eq!(res[4], 2580);
    }

    #[test]
    fn test_ntt_round_trip() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
        for _i in 0..100 {
            let mut f = [Fq::default(); N];
            f.iter_mut().for_each(|c| c.set(rng.gen_range(0..Q)));
            let back = ntt_inv(&ntt(&f));
            for (a, b) in back.iter().zip(f.iter()) {
                assert_eq!(a.get(), b.get());
            }
        }
    }
}
