use crate::helpers::{ensure, shake128_xof};
use crate::kyber::field::Fq;
use crate::kyber::ntt::{multiply_ntts, ntt, ntt_inv};
use crate::kyber::{ETA, N, Q};
use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::Shake256;


/// One ring element; the NTT domain is a usage contract, not a stored flag.
#[derive(Clone, Copy)]
pub(crate) struct Poly {
    pub(crate) f: [Fq; N],
}


impl Default for Poly {
    fn default() -> Self { Poly { f: [Fq::default(); N] } }
}


impl Poly {
    #[must_use]
    pub(crate) fn add(&self, other: &Self) -> Self {
        let mut c = Poly::default();
        for i in 0..N {
            c.f[i] = self.f[i].add(other.f[i]);
        }
        c
    }

    #[must_use]
    pub(crate) fn sub(&self, other: &Self) -> Self {
        let mut c = Poly::default();
        for i in 0..N {
            c.f[i] = self.f[i].sub(other.f[i]);
        }
        c
    }

    #[must_use]
    pub(crate) fn to_ntt(&self) -> Self { Poly { f: ntt(&self.f) } }

    #[must_use]
    pub(crate) fn from_ntt(&self) -> Self { Poly { f: ntt_inv(&self.f) } }

    #[must_use]
    pub(crate) fn mul_ntt(&self, other: &Self) -> Self {
        Poly { f: multiply_ntts(&self.f, &other.f) }
    }
}


/// Encodes 256 `d`-bit integers into `32 * d` bytes through a shifting
/// bit accumulator, for `1 <= d <= 12`.
#[allow(clippy::cast_possible_truncation)] // dropping the low byte of temp
pub(crate) fn byte_encode(d: u32, poly: &Poly, bytes: &mut [u8]) {
    debug_assert_eq!(bytes.len(), 32 * d as usize, "byte_encode: output is not 32 * d");
    debug_assert!(
        poly.f.iter().all(|c| c.get() <= if d < 12 { 1 << d } else { Q }),
        "byte_encode: coefficient out of range"
    );
    let mut temp = 0u32;
    let mut bit_index = 0;
    let mut byte_index = 0;
    for coeff in &poly.f {
        temp |= (coeff.get_u32() & ((1 << d) - 1)) << bit_index;
        bit_index += d as usize;
        while bit_index > 7 {
            bytes[byte_index] = temp as u8;
            temp >>= 8;
            byte_index += 1;
            bit_index -= 8;
        }
    }
}


/// Decodes `32 * d` bytes into 256 `d`-bit integers, rejecting any value at
/// or above the modulus when `d = 12` (the encapsulation-key modulus check).
pub(crate) fn byte_decode(d: u32, bytes: &[u8]) -> Result<Poly, &'static str> {
    debug_assert_eq!(bytes.len(), 32 * d as usize, "byte_decode: input is not 32 * d");
    let mut poly = Poly::default();
    let mut temp = 0u32;
    let mut bit_index = 0;
    let mut int_index = 0;
    for byte in bytes {
        temp |= u32::from(*byte) << bit_index;
        bit_index += 8;
        #[allow(clippy::cast_possible_truncation)] // intentional d-bit truncation
        while bit_index >= d {
            poly.f[int_index].set((temp & ((1 << d) - 1)) as u16);
            bit_index -= d;
            temp >>= d;
            int_index += 1;
        }
    }
    let m = if d < 12 { 1 << d } else { u32::from(Q) };
    ensure!(poly.f.iter().all(|c| c.get_u32() < m), "byte_decode: integer out of range");
    Ok(poly)
}


/// `x -> round(2^d / q * x)`; valid for d up to 11 and x below q.
#[allow(clippy::cast_possible_truncation)] // result fits 12 bits
pub(crate) fn compress(d: u32, poly: &mut Poly) {
    const M: u32 = (((1u64 << 36) + Q as u64 - 1) / Q as u64) as u32;
    for c in &mut poly.f {
        let y = (c.get_u32() << d) + (u32::from(Q) >> 1);
        c.set(((u64::from(y) * u64::from(M)) >> 36) as u16);
    }
}


/// `y -> round(q / 2^d * y)`, the lossy inverse of `compress`.
#[allow(clippy::cast_possible_truncation)] // result fits 12 bits
pub(crate) fn decompress(d: u32, poly: &mut Poly) {
    for c in &mut poly.f {
        let qy = u32::from(Q) * c.get_u32() + (1 << d) - 1;
        c.set((qy >> d) as u16);
    }
}


/// Uniform NTT-domain element by 12-bit rejection from SHAKE128(rho ‖ j ‖ i).
/// The stream depends only on the public rho, so not constant time.
#[allow(clippy::cast_possible_truncation)] // d1, d2 fit 12 bits
pub(crate) fn sample_ntt(rho: &[u8; 32], j: u8, i: u8) -> Poly {
    let mut xof = shake128_xof(&[rho, &[j], &[i]]);
    let mut a_hat = Poly::default();
    let mut bbb = [0u8; 3];
    let mut idx = 0usize;
    while idx < N {
        xof.read(&mut bbb);
        let d1 = u32::from(bbb[0]) + 256 * (u32::from(bbb[1]) & 0x0F);
        let d2 = (u32::from(bbb[1]) >> 4) + 16 * u32::from(bbb[2]);
        if d1 < u32::from(Q) {
            a_hat.f[idx].set(d1 as u16);
            idx += 1;
        }
        if (d2 < u32::from(Q)) & (idx < N) {
            a_hat.f[idx].set(d2 as u16);
            idx += 1;
        }
    }
    a_hat
}


/// PRF for the noise samplers: SHAKE256(s ‖ b) producing `64 * eta` bytes.
#[must_use]
pub(crate) fn prf(s: &[u8; 32], b: u8) -> [u8; 64 * ETA] {
    let mut hasher = Shake256::default();
    hasher.update(s);
    hasher.update(&[b]);
    let mut reader = hasher.finalize_xof();
    let mut result = [0u8; 64 * ETA];
    reader.read(&mut result);
    result
}


/// Centered binomial sample from a PRF output block: each coefficient is a
/// difference of two eta-bit popcounts, in constant time.
#[must_use]
pub(crate) fn sample_cbd(bytes: &[u8; 64 * ETA]) -> Poly {
    let eta = u32::try_from(ETA).expect("eta fits u32");
    let mut poly = Poly::default();
    let mut temp = 0u32;
    let mut int_index = 0;
    let mut bit_index = 0usize;
    for byte in bytes {
        temp |= u32::from(*byte) << bit_index;
        bit_index += 8;
        while bit_index >= 2 * ETA {
            let x = count_ones(temp & ((1 << eta) - 1));
            let y = count_ones((temp >> eta) & ((1 << eta) - 1));
            let (mut fx, mut fy) = (Fq::default(), Fq::default());
            fx.set(x);
            fy.set(y);
            poly.f[int_index] = fx.sub(fy);
            bit_index -= 2 * ETA;
            temp >>= 2 * ETA;
            int_index += 1;
        }
    }
    poly
}


// Constant-time popcount of a narrow field
#[allow(clippy::cast_possible_truncation)] // counts fit u16
fn count_ones(x: u32) -> u16 {
    let x = (x & 0x5555_5555) + ((x >> 1) & 0x5555_5555);
    let x = (x & 0x3333_3333) + ((x >> 2) & 0x3333_3333);
    let x = (x & 0x0F0F_0F0F) + ((x >> 4) & 0x0F0F_0F0F);
    x as u16
}


#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};

    // Simple round trip tests...
    #[test]
    fn test_decode_then_encode() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
        for num_bits in 2..12u32 {
            for _i in 0..50 {
                let num_bytes = 32 * num_bits as usize;
                let bytes1: alloc::vec::Vec<u8> = (0..num_bytes).map(|_| rng.gen()).collect();
                let poly = byte_decode(num_bits, &bytes1).unwrap();
                let mut bytes2 = alloc::vec![0u8; num_bytes];
                byte_encode(num_bits, &poly, &mut bytes2);
                assert_eq!(bytes1, bytes2);
            }
        }
    }

    #[test]
    fn test_decode_rejects_oversize() {
        let bytes = alloc::vec![0xFFu8; 32 * 12];
        assert!(byte_decode(12, &bytes).is_err());
    }

    #[test]
    fn test_cbd_is_centered() {
        let block = [0x5Au8; 64 * ETA];
        let poly = sample_cbd(&block);
        // every coefficient is one of {-2..2} mod q
        for c in &poly.f {
            let v = c.get();
            assert!(v <= 2 || v >= Q - 2);
        }
    }
}
