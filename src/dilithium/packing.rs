use crate::dilithium::poly::Poly;
use crate::dilithium::polyvec::{PolyVecK, PolyVecL};
use crate::dilithium::{
    CRH_LEN, D, ETA, GAMMA1, K, L, N, OMEGA, POLETA_LEN, POLT0_LEN, POLT1_LEN, POLZ_LEN, Q,
    SEED_LEN, SIG_LEN, SK_LEN, VK_LEN,
};
use crate::helpers::ensure;

// All codecs are length-deterministic for their declared domain; the hint
// and challenge codecs additionally validate the canonical-form conditions
// that strong unforgeability rests on.


/// Eight 3-bit... no: with η = 5 the compact representative `Q + η - c`
/// occupies four bits, two coefficients per byte.
#[allow(clippy::cast_possible_truncation)] // nibble values
fn polyeta_pack(r: &mut [u8], a: &Poly) {
    debug_assert!(2 * ETA < 16, "nibble packing assumes 2*eta < 16");
    debug_assert_eq!(r.len(), POLETA_LEN);
    for i in 0..N / 2 {
        let t0 = Q + ETA - a.coeffs[2 * i];
        let t1 = Q + ETA - a.coeffs[2 * i + 1];
        r[i] = (t0 | (t1 << 4)) as u8;
    }
}


fn polyeta_unpack(r: &mut Poly, a: &[u8]) {
    debug_assert_eq!(a.len(), POLETA_LEN);
    for i in 0..N / 2 {
        let t0 = u32::from(a[i]) & 0x0F;
        let t1 = u32::from(a[i]) >> 4;
        r.coeffs[2 * i] = Q + ETA - t0;
        r.coeffs[2 * i + 1] = Q + ETA - t1;
    }
}


/// Eight 9-bit high parts per nine bytes.
#[allow(clippy::cast_possible_truncation)] // byte lanes
fn polyt1_pack(r: &mut [u8], a: &Poly) {
    debug_assert_eq!(r.len(), POLT1_LEN);
    for i in 0..N / 8 {
        let c = &a.coeffs[8 * i..8 * i + 8];
        r[9 * i] = c[0] as u8;
        r[9 * i + 1] = ((c[0] >> 8) | (c[1] << 1)) as u8;
        r[9 * i + 2] = ((c[1] >> 7) | (c[2] << 2)) as u8;
        r[9 * i + 3] = ((c[2] >> 6) | (c[3] << 3)) as u8;
        r[9 * i + 4] = ((c[3] >> 5) | (c[4] << 4)) as u8;
        r[9 * i + 5] = ((c[4] >> 4) | (c[5] << 5)) as u8;
        r[9 * i + 6] = ((c[5] >> 3) | (c[6] << 6)) as u8;
        r[9 * i + 7] = ((c[6] >> 2) | (c[7] << 7)) as u8;
        r[9 * i + 8] = (c[7] >> 1) as u8;
    }
}


fn polyt1_unpack(r: &mut Poly, a: &[u8]) {
    debug_assert_eq!(a.len(), POLT1_LEN);
    for i in 0..N / 8 {
        let b = |k: usize| u32::from(a[9 * i + k]);
        r.coeffs[8 * i] = (b(0) | (b(1) << 8)) & 0x01FF;
        r.coeffs[8 * i + 1] = ((b(1) >> 1) | (b(2) << 7)) & 0x01FF;
        r.coeffs[8 * i + 2] = ((b(2) >> 2) | (b(3) << 6)) & 0x01FF;
        r.coeffs[8 * i + 3] = ((b(3) >> 3) | (b(4) << 5)) & 0x01FF;
        r.coeffs[8 * i + 4] = ((b(4) >> 4) | (b(5) << 4)) & 0x01FF;
        r.coeffs[8 * i + 5] = ((b(5) >> 5) | (b(6) << 3)) & 0x01FF;
        r.coeffs[8 * i + 6] = ((b(6) >> 6) | (b(7) << 2)) & 0x01FF;
        r.coeffs[8 * i + 7] = ((b(7) >> 7) | (b(8) << 1)) & 0x01FF;
    }
}


/// Four D-bit low parts per seven bytes, re-centered to unsigned by
/// `Q + 2^{D-1} - c`.
#[allow(clippy::cast_possible_truncation)] // byte lanes
fn polyt0_pack(r: &mut [u8], a: &Poly) {
    debug_assert_eq!(r.len(), POLT0_LEN);
    for i in 0..N / 4 {
        let t: [u32; 4] = core::array::from_fn(|k| Q + (1 << (D - 1)) - a.coeffs[4 * i + k]);
        r[7 * i] = t[0] as u8;
        r[7 * i + 1] = ((t[0] >> 8) | (t[1] << 6)) as u8;
        r[7 * i + 2] = (t[1] >> 2) as u8;
        r[7 * i + 3] = ((t[1] >> 10) | (t[2] << 4)) as u8;
        r[7 * i + 4] = (t[2] >> 4) as u8;
        r[7 * i + 5] = ((t[2] >> 12) | (t[3] << 2)) as u8;
        r[7 * i + 6] = (t[3] >> 6) as u8;
    }
}


fn polyt0_unpack(r: &mut Poly, a: &[u8]) {
    debug_assert_eq!(a.len(), POLT0_LEN);
    for i in 0..N / 4 {
        let b = |k: usize| u32::from(a[7 * i + k]);
        r.coeffs[4 * i] = b(0) | ((b(1) & 0x3F) << 8);
        r.coeffs[4 * i + 1] = (b(1) >> 6) | (b(2) << 2) | ((b(3) & 0x0F) << 10);
        r.coeffs[4 * i + 2] = (b(3) >> 4) | (b(4) << 4) | ((b(5) & 0x03) << 12);
        r.coeffs[4 * i + 3] = (b(5) >> 2) | (b(6) << 6);
        for k in 0..4 {
            r.coeffs[4 * i + k] = Q + (1 << (D - 1)) - r.coeffs[4 * i + k];
        }
    }
}


/// Two 20-bit response coefficients per five bytes, mapped from standard
/// representatives onto [0, 2γ1 - 2].
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_possible_wrap)]
fn polyz_pack(r: &mut [u8], a: &Poly) {
    debug_assert!(GAMMA1 <= 1 << 19, "packing assumes gamma1 <= 2^19");
    debug_assert_eq!(r.len(), POLZ_LEN);
    for i in 0..N / 2 {
        let mut t0 = (GAMMA1 - 1).wrapping_sub(a.coeffs[2 * i]);
        t0 = t0.wrapping_add(((t0 as i32) >> 31) as u32 & Q);
        let mut t1 = (GAMMA1 - 1).wrapping_sub(a.coeffs[2 * i + 1]);
        t1 = t1.wrapping_add(((t1 as i32) >> 31) as u32 & Q);

        r[5 * i] = t0 as u8;
        r[5 * i + 1] = (t0 >> 8) as u8;
        r[5 * i + 2] = ((t0 >> 16) | (t1 << 4)) as u8;
        r[5 * i + 3] = (t1 >> 4) as u8;
        r[5 * i + 4] = (t1 >> 12) as u8;
    }
}


#[allow(clippy::cast_sign_loss, clippy::cast_possible_wrap)] // mask arithmetic
fn polyz_unpack(r: &mut Poly, a: &[u8]) {
    debug_assert_eq!(a.len(), POLZ_LEN);
    for i in 0..N / 2 {
        let b = |k: usize| u32::from(a[5 * i + k]);
        let t0 = b(0) | (b(1) << 8) | ((b(2) & 0x0F) << 16);
        let t1 = (b(2) >> 4) | (b(3) << 4) | (b(4) << 12);

        let mut c0 = (GAMMA1 - 1).wrapping_sub(t0);
        c0 = c0.wrapping_add(((c0 as i32) >> 31) as u32 & Q);
        let mut c1 = (GAMMA1 - 1).wrapping_sub(t1);
        c1 = c1.wrapping_add(((c1 as i32) >> 31) as u32 & Q);
        r.coeffs[2 * i] = c0;
        r.coeffs[2 * i + 1] = c1;
    }
}


/// Two 4-bit commitment high parts per byte.
#[allow(clippy::cast_possible_truncation)] // nibble values
pub(crate) fn polyw1_pack(r: &mut [u8], a: &Poly) {
    for i in 0..N / 2 {
        r[i] = (a.coeffs[2 * i] | (a.coeffs[2 * i + 1] << 4)) as u8;
    }
}


/// pk = rho ‖ packed(t1)
pub(crate) fn pack_pk(pk: &mut [u8; VK_LEN], rho: &[u8; SEED_LEN], t1: &PolyVecK) {
    pk[..SEED_LEN].copy_from_slice(rho);
    for i in 0..K {
        let off = SEED_LEN + i * POLT1_LEN;
        polyt1_pack(&mut pk[off..off + POLT1_LEN], &t1.vec[i]);
    }
}


pub(crate) fn unpack_pk(pk: &[u8; VK_LEN]) -> ([u8; SEED_LEN], PolyVecK) {
    let mut rho = [0u8; SEED_LEN];
    rho.copy_from_slice(&pk[..SEED_LEN]);
    let mut t1 = PolyVecK::default();
    for i in 0..K {
        let off = SEED_LEN + i * POLT1_LEN;
        polyt1_unpack(&mut t1.vec[i], &pk[off..off + POLT1_LEN]);
    }
    (rho, t1)
}


/// sk = rho ‖ key ‖ tr ‖ packed(s1) ‖ packed(s2) ‖ packed(t0)
pub(crate) fn pack_sk(
    sk: &mut [u8; SK_LEN], rho: &[u8; SEED_LEN], key: &[u8; SEED_LEN], tr: &[u8; CRH_LEN],
    s1: &PolyVecL, s2: &PolyVecK, t0: &PolyVecK,
) {
    sk[..SEED_LEN].copy_from_slice(rho);
    sk[SEED_LEN..2 * SEED_LEN].copy_from_slice(key);
    sk[2 * SEED_LEN..2 * SEED_LEN + CRH_LEN].copy_from_slice(tr);
    let mut off = 2 * SEED_LEN + CRH_LEN;
    for i in 0..L {
        polyeta_pack(&mut sk[off..off + POLETA_LEN], &s1.vec[i]);
        off += POLETA_LEN;
    }
    for i in 0..K {
        polyeta_pack(&mut sk[off..off + POLETA_LEN], &s2.vec[i]);
        off += POLETA_LEN;
    }
    for i in 0..K {
        polyt0_pack(&mut sk[off..off + POLT0_LEN], &t0.vec[i]);
        off += POLT0_LEN;
    }
}


#[allow(clippy::type_complexity)] // the five secret-key components
pub(crate) fn unpack_sk(
    sk: &[u8; SK_LEN],
) -> ([u8; SEED_LEN], [u8; SEED_LEN], [u8; CRH_LEN], PolyVecL, PolyVecK, PolyVecK) {
    let mut rho = [0u8; SEED_LEN];
    let mut key = [0u8; SEED_LEN];
    let mut tr = [0u8; CRH_LEN];
    rho.copy_from_slice(&sk[..SEED_LEN]);
    key.copy_from_slice(&sk[SEED_LEN..2 * SEED_LEN]);
    tr.copy_from_slice(&sk[2 * SEED_LEN..2 * SEED_LEN + CRH_LEN]);
    let mut s1 = PolyVecL::default();
    let mut s2 = PolyVecK::default();
    let mut t0 = PolyVecK::default();
    let mut off = 2 * SEED_LEN + CRH_LEN;
    for i in 0..L {
        polyeta_unpack(&mut s1.vec[i], &sk[off..off + POLETA_LEN]);
        off += POLETA_LEN;
    }
    for i in 0..K {
        polyeta_unpack(&mut s2.vec[i], &sk[off..off + POLETA_LEN]);
        off += POLETA_LEN;
    }
    for i in 0..K {
        polyt0_unpack(&mut t0.vec[i], &sk[off..off + POLT0_LEN]);
        off += POLT0_LEN;
    }
    (rho, key, tr, s1, s2, t0)
}


/// sig = packed(z) ‖ hint vector ‖ packed(c)
#[allow(clippy::cast_possible_truncation)] // position and count bytes
pub(crate) fn pack_sig(sig: &mut [u8; SIG_LEN], z: &PolyVecL, h: &PolyVecK, c: &Poly) {
    for i in 0..L {
        polyz_pack(&mut sig[i * POLZ_LEN..(i + 1) * POLZ_LEN], &z.vec[i]);
    }
    let hint = &mut sig[L * POLZ_LEN..L * POLZ_LEN + OMEGA + K];

    // positions of the set hint bits, slice by slice, then running sums
    let mut k = 0;
    for i in 0..K {
        for j in 0..N {
            if h.vec[i].coeffs[j] != 0 {
                hint[k] = j as u8;
                k += 1;
            }
        }
        hint[OMEGA + i] = k as u8;
    }
    while k < OMEGA {
        hint[k] = 0;
        k += 1;
    }

    let chal = &mut sig[L * POLZ_LEN + OMEGA + K..];
    let mut signs = 0u64;
    let mut mask = 1u64;
    for i in 0..N / 8 {
        chal[i] = 0;
        for j in 0..8 {
            if c.coeffs[8 * i + j] != 0 {
                chal[i] |= 1 << j;
                if c.coeffs[8 * i + j] == Q - 1 {
                    signs |= mask;
                }
                mask <<= 1;
            }
        }
    }
    chal[N / 8..N / 8 + 8].copy_from_slice(&signs.to_le_bytes());
}


/// Decodes a signature, enforcing the canonical-encoding conditions that
/// strong unforgeability requires: per-slice running sums must be
/// non-decreasing and bounded by ω, positions within a slice strictly
/// increasing, trailing hint bytes zero, and unused sign bits zero.
pub(crate) fn unpack_sig(
    sig: &[u8; SIG_LEN],
) -> Result<(PolyVecL, PolyVecK, Poly), &'static str> {
    let mut z = PolyVecL::default();
    for i in 0..L {
        polyz_unpack(&mut z.vec[i], &sig[i * POLZ_LEN..(i + 1) * POLZ_LEN]);
    }

    let hint = &sig[L * POLZ_LEN..L * POLZ_LEN + OMEGA + K];
    let mut h = PolyVecK::default();
    let mut k = 0usize;
    for i in 0..K {
        let sum = usize::from(hint[OMEGA + i]);
        ensure!(sum >= k && sum <= OMEGA, "Sig hint running sum invalid");
        for j in k..sum {
            // coefficients are ordered for strong unforgeability
            ensure!(j == k || hint[j] > hint[j - 1], "Sig hint positions unordered");
            h.vec[i].coeffs[usize::from(hint[j])] = 1;
        }
        k = sum;
    }
    // extra indices are zero for strong unforgeability
    for j in k..OMEGA {
        ensure!(hint[j] == 0, "Sig hint trailing bytes nonzero");
    }

    let chal = &sig[L * POLZ_LEN + OMEGA + K..];
    let mut c = Poly::default();
    let mut signs = u64::from_le_bytes(chal[N / 8..N / 8 + 8].try_into().expect("eight bytes"));
    // extra sign bits are zero for strong unforgeability
    ensure!(signs >> 60 == 0, "Sig challenge sign bits invalid");
    for i in 0..N / 8 {
        for j in 0..8 {
            if (chal[i] >> j) & 1 == 1 {
                c.coeffs[8 * i + j] = if signs & 1 == 1 { Q - 1 } else { 1 };
                signs >>= 1;
            }
        }
    }
    Ok((z, h, c))
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::dilithium::reduce::freeze;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_t1_round_trip() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
        let mut p = Poly::default();
        p.coeffs.iter_mut().for_each(|c| *c = rng.gen_range(0..512));
        let mut bytes = [0u8; POLT1_LEN];
        polyt1_pack(&mut bytes, &p);
        let mut q = Poly::default();
        polyt1_unpack(&mut q, &bytes);
        assert_eq!(p.coeffs, q.coeffs);
    }

    #[test]
    fn test_t0_round_trip() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(456);
        let mut p = Poly::default();
        // low parts lie in (Q - 2^{D-1}, Q + 2^{D-1}]
        p.coeffs
            .iter_mut()
            .for_each(|c| *c = Q - (1 << (D - 1)) + 1 + rng.gen_range(0..(1u32 << D)));
        let mut bytes = [0u8; POLT0_LEN];
        polyt0_pack(&mut bytes, &p);
        let mut q = Poly::default();
        polyt0_unpack(&mut q, &bytes);
        assert_eq!(p.coeffs, q.coeffs);
    }

    #[test]
    fn test_eta_round_trip() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(789);
        let mut p = Poly::default();
        p.coeffs.iter_mut().for_each(|c| *c = Q - ETA + rng.gen_range(0..=2 * ETA));
        let mut bytes = [0u8; POLETA_LEN];
        polyeta_pack(&mut bytes, &p);
        let mut q = Poly::default();
        polyeta_unpack(&mut q, &bytes);
        assert_eq!(p.coeffs, q.coeffs);
    }

    #[test]
    fn test_z_round_trip() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(321);
        let mut p = Poly::default();
        // standard representatives of values in (-(gamma1-1), gamma1-1)
        p.coeffs.iter_mut().for_each(|c| {
            let v = i64::from(rng.gen_range(0..2 * GAMMA1 - 1)) - i64::from(GAMMA1 - 1);
            *c = freeze(u32::try_from(v.rem_euclid(i64::from(Q))).unwrap());
        });
        let mut bytes = [0u8; POLZ_LEN];
        polyz_pack(&mut bytes, &p);
        let mut q = Poly::default();
        polyz_unpack(&mut q, &bytes);
        assert_eq!(p.coeffs, q.coeffs);
    }
}
