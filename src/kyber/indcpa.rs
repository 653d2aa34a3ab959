use crate::helpers::ensure;
use crate::kyber::poly::{
    byte_decode, byte_encode, compress, decompress, prf, sample_cbd, sample_ntt, Poly,
};
use crate::kyber::{DU, DV, EK_PKE_LEN, K, MSG_LEN, SEED_LEN};

// The IND-CPA public-key encryption layer underneath the KEM: textbook
// module-LWE with the matrix expanded on the fly from rho.

type PolyVec = [Poly; K];


/// Expands rho into the K x K NTT-domain matrix; entry (i, j) comes from
/// XOF(rho ‖ j ‖ i) per the transposed-indices convention.
#[allow(clippy::cast_possible_truncation)] // K < 256
fn gen_a_hat(rho: &[u8; SEED_LEN]) -> [PolyVec; K] {
    core::array::from_fn(|i| core::array::from_fn(|j| sample_ntt(rho, j as u8, i as u8)))
}


fn add_vecs(a: &PolyVec, b: &PolyVec) -> PolyVec {
    core::array::from_fn(|i| a[i].add(&b[i]))
}


fn mul_mat_vec(a_hat: &[PolyVec; K], u_hat: &PolyVec) -> PolyVec {
    let mut w_hat = [Poly::default(); K];
    for (i, row) in a_hat.iter().enumerate() {
        for (j, entry) in row.iter().enumerate() {
            w_hat[i] = w_hat[i].add(&entry.mul_ntt(&u_hat[j]));
        }
    }
    w_hat
}


fn mul_mat_t_vec(a_hat: &[PolyVec; K], u_hat: &PolyVec) -> PolyVec {
    let mut y_hat = [Poly::default(); K];
    #[allow(clippy::needless_range_loop)] // the transpose reads columns
    for i in 0..K {
        for j in 0..K {
            y_hat[i] = y_hat[i].add(&a_hat[j][i].mul_ntt(&u_hat[j]));
        }
    }
    y_hat
}


fn dot_t_prod(u_hat: &PolyVec, v_hat: &PolyVec) -> Poly {
    let mut result = Poly::default();
    for j in 0..K {
        result = result.add(&u_hat[j].mul_ntt(&v_hat[j]));
    }
    result
}


/// K-PKE key generation from the expanded seed pair (rho, sigma):
/// `ek = ByteEncode12(t_hat) ‖ rho`, `dk = ByteEncode12(s_hat)`.
pub(crate) fn pke_keygen(
    rho: &[u8; SEED_LEN], sigma: &[u8; SEED_LEN], ek_pke: &mut [u8], dk_pke: &mut [u8],
) {
    debug_assert_eq!(ek_pke.len(), 384 * K + 32, "pke_keygen: ek len");
    debug_assert_eq!(dk_pke.len(), 384 * K, "pke_keygen: dk len");

    let a_hat = gen_a_hat(rho);

    let mut nonce = 0u8;
    let s: PolyVec = core::array::from_fn(|_| {
        let x = sample_cbd(&prf(sigma, nonce));
        nonce += 1;
        x
    });
    let e: PolyVec = core::array::from_fn(|_| {
        let x = sample_cbd(&prf(sigma, nonce));
        nonce += 1;
        x
    });

    let s_hat: PolyVec = core::array::from_fn(|i| s[i].to_ntt());
    let e_hat: PolyVec = core::array::from_fn(|i| e[i].to_ntt());

    // t_hat = A_hat ∘ s_hat + e_hat
    let t_hat = add_vecs(&mul_mat_vec(&a_hat, &s_hat), &e_hat);

    for i in 0..K {
        byte_encode(12, &t_hat[i], &mut ek_pke[i * 384..(i + 1) * 384]);
    }
    ek_pke[K * 384..].copy_from_slice(rho);
    for i in 0..K {
        byte_encode(12, &s_hat[i], &mut dk_pke[i * 384..(i + 1) * 384]);
    }
}


/// K-PKE encryption of the 32-byte message under the coins `r`.
pub(crate) fn pke_encrypt(
    ek: &[u8], m: &[u8; MSG_LEN], coins: &[u8; 32], ct: &mut [u8],
) -> Result<(), &'static str> {
    debug_assert_eq!(ek.len(), EK_PKE_LEN, "pke_encrypt: ek len");
    debug_assert_eq!(ct.len(), 32 * (DU as usize * K + DV as usize), "pke_encrypt: ct len");

    let mut t_hat = [Poly::default(); K];
    for i in 0..K {
        t_hat[i] = byte_decode(12, &ek[384 * i..384 * (i + 1)])?;
    }
    let rho: &[u8; SEED_LEN] = ek[384 * K..384 * K + 32].try_into().expect("rho slice");
    let a_hat = gen_a_hat(rho);

    let mut nonce = 0u8;
    let r: PolyVec = core::array::from_fn(|_| {
        let x = sample_cbd(&prf(coins, nonce));
        nonce += 1;
        x
    });
    let e1: PolyVec = core::array::from_fn(|_| {
        let x = sample_cbd(&prf(coins, nonce));
        nonce += 1;
        x
    });
    let e2 = sample_cbd(&prf(coins, nonce));

    let r_hat: PolyVec = core::array::from_fn(|i| r[i].to_ntt());

    // u = NTT^{-1}(A_hat^T ∘ r_hat) + e1
    let mut u = mul_mat_t_vec(&a_hat, &r_hat);
    for u_i in &mut u {
        *u_i = u_i.from_ntt();
    }
    u = add_vecs(&u, &e1);

    // v = NTT^{-1}(t_hat^T ∘ r_hat) + e2 + Decompress1(m)
    let mut mu = byte_decode(1, m)?;
    decompress(1, &mut mu);
    let v = dot_t_prod(&t_hat, &r_hat).from_ntt().add(&e2).add(&mu);

    let step = 32 * DU as usize;
    for i in 0..K {
        compress(DU, &mut u[i]);
        byte_encode(DU, &u[i], &mut ct[i * step..(i + 1) * step]);
    }
    let mut v = v;
    compress(DV, &mut v);
    byte_encode(DV, &v, &mut ct[K * step..K * step + 32 * DV as usize]);
    Ok(())
}


/// K-PKE decryption; the inverse of `pke_encrypt` up to the rounding noise.
pub(crate) fn pke_decrypt(dk: &[u8], ct: &[u8]) -> Result<[u8; MSG_LEN], &'static str> {
    debug_assert_eq!(dk.len(), 384 * K, "pke_decrypt: dk len");
    ensure!(ct.len() == 32 * (DU as usize * K + DV as usize), "pke_decrypt: ct len");

    let step = 32 * DU as usize;
    let mut u = [Poly::default(); K];
    for i in 0..K {
        u[i] = byte_decode(DU, &ct[step * i..step * (i + 1)])?;
        decompress(DU, &mut u[i]);
    }
    let mut v = byte_decode(DV, &ct[K * step..])?;
    decompress(DV, &mut v);

    let mut s_hat = [Poly::default(); K];
    for i in 0..K {
        s_hat[i] = byte_decode(12, &dk[384 * i..384 * (i + 1)])?;
    }

    // w = v - NTT^{-1}(s_hat^T ∘ NTT(u))
    let u_hat: PolyVec = core::array::from_fn(|i| u[i].to_ntt());
    let w = v.sub(&dot_t_prod(&s_hat, &u_hat).from_ntt());

    let mut w = w;
    compress(1, &mut w);
    let mut m = [0u8; MSG_LEN];
    byte_encode(1, &w, &mut m);
    Ok(m)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::kyber::CT_LEN;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_pke_round_trip() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
        for _i in 0..10 {
            let rho: [u8; 32] = rng.gen();
            let sigma: [u8; 32] = rng.gen();
            let mut ek = [0u8; EK_PKE_LEN];
            let mut dk = [0u8; 384 * K];
            pke_keygen(&rho, &sigma, &mut ek, &mut dk);

            let m: [u8; 32] = rng.gen();
            let coins: [u8; 32] = rng.gen();
            let mut ct = [0u8; CT_LEN];
            pke_encrypt(&ek, &m, &coins, &mut ct).unwrap();
            assert_eq!(pke_decrypt(&dk, &ct).unwrap(), m);
        }
    }

    #[test]
    fn test_encrypt_rejects_unreduced_key() {
        let ff_ek = [0xFFu8; EK_PKE_LEN];
        let mut ct = [0u8; CT_LEN];
        assert!(pke_encrypt(&ff_ek, &[0u8; 32], &[0u8; 32], &mut ct).is_err());
    }
}
