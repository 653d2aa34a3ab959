//! Dilithium-III: module-lattice signatures via Fiat-Shamir with aborts.

mod ntt;
mod packing;
mod poly;
mod polyvec;
mod reduce;
mod rounding;

use crate::helpers::{ensure, shake256, shake256_xof};
use alloc::vec::Vec;
use rand_core::CryptoRngCore;
use self::poly::Poly;
use self::polyvec::{PolyVecK, PolyVecL};
use sha3::digest::XofReader;
use zeroize::Zeroize;

pub(crate) const N: usize = 256;
pub(crate) const Q: u32 = 8_380_417;
pub(crate) const D: u32 = 14;
pub(crate) const K: usize = 5;
pub(crate) const L: usize = 4;
pub(crate) const ETA: u32 = 5;
pub(crate) const BETA: u32 = 275;
pub(crate) const GAMMA1: u32 = (Q - 1) / 16;
pub(crate) const GAMMA2: u32 = GAMMA1 / 2;
pub(crate) const ALPHA: u32 = 2 * GAMMA2;
pub(crate) const OMEGA: usize = 96;

pub(crate) const SEED_LEN: usize = 32;
pub(crate) const CRH_LEN: usize = 48;
pub(crate) const POLT1_LEN: usize = 288;
pub(crate) const POLT0_LEN: usize = 448;
pub(crate) const POLETA_LEN: usize = 128;
pub(crate) const POLZ_LEN: usize = 640;
pub(crate) const POLW1_LEN: usize = 128;

pub(crate) const VK_LEN: usize = SEED_LEN + K * POLT1_LEN;
pub(crate) const SK_LEN: usize = 2 * SEED_LEN + CRH_LEN + (K + L) * POLETA_LEN + K * POLT0_LEN;
pub(crate) const SIG_LEN: usize = L * POLZ_LEN + OMEGA + K + N / 8 + 8;

/// The rejection loop converges after a handful of iterations with
/// overwhelming probability; hitting this bound indicates a broken key.
const MAX_SIGN_ATTEMPTS: usize = 512;


/// Expands rho into the public K x L matrix, entry (i,j) from nonce (i << 8) + j.
#[allow(clippy::cast_possible_truncation)] // K, L < 256
fn expand_mat(rho: &[u8; SEED_LEN]) -> [PolyVecL; K] {
    core::array::from_fn(|i| PolyVecL {
        vec: core::array::from_fn(|j| Poly::uniform(rho, ((i as u16) << 8) + j as u16)),
    })
}


/// Samples the sparse challenge polynomial (60 coefficients of ±1) from
/// SHAKE256(mu ‖ packed(w1)) by inside-out Fisher-Yates. The stream is
/// public, so the data-dependent draws are fine.
#[allow(clippy::cast_possible_truncation)] // sign mask is a single bit
fn challenge(mu: &[u8; CRH_LEN], w1: &PolyVecK) -> Poly {
    let mut inbuf = [0u8; CRH_LEN + K * POLW1_LEN];
    inbuf[..CRH_LEN].copy_from_slice(mu);
    for i in 0..K {
        let off = CRH_LEN + i * POLW1_LEN;
        packing::polyw1_pack(&mut inbuf[off..off + POLW1_LEN], &w1.vec[i]);
    }
    let mut xof = shake256_xof(&[&inbuf]);

    let mut signs_bytes = [0u8; 8];
    xof.read(&mut signs_bytes);
    let mut signs = u64::from_le_bytes(signs_bytes);

    let mut c = Poly::default();
    let mut byte = [0u8; 1];
    for i in 196..N {
        let b = loop {
            xof.read(&mut byte);
            if usize::from(byte[0]) <= i {
                break usize::from(byte[0]);
            }
        };
        c.coeffs[i] = c.coeffs[b];
        let mask = (signs as u32 & 1).wrapping_neg();
        c.coeffs[b] = 1 ^ (mask & (1 ^ (Q - 1)));
        signs >>= 1;
    }
    c
}


fn keygen(
    rng: &mut impl CryptoRngCore, vk: &mut [u8; VK_LEN], sk: &mut [u8; SK_LEN],
) -> Result<(), &'static str> {
    // expand 96 bytes of randomness into rho, rhoprime and key
    let mut seedbuf = [0u8; 3 * SEED_LEN];
    rng.try_fill_bytes(&mut seedbuf).map_err(|_| "Keygen: random number generator failed")?;
    let rho: [u8; SEED_LEN] = seedbuf[..SEED_LEN].try_into().expect("seed split");
    let rhoprime: [u8; SEED_LEN] = seedbuf[SEED_LEN..2 * SEED_LEN].try_into().expect("seed split");
    let key: [u8; SEED_LEN] = seedbuf[2 * SEED_LEN..].try_into().expect("seed split");

    let mat = expand_mat(&rho);

    // sample short vectors s1 and s2
    let mut nonce = 0u16;
    let mut s1 = PolyVecL::default();
    for p in &mut s1.vec {
        *p = Poly::uniform_eta(&rhoprime, nonce);
        nonce += 1;
    }
    let mut s2 = PolyVecK::default();
    for p in &mut s2.vec {
        *p = Poly::uniform_eta(&rhoprime, nonce);
        nonce += 1;
    }

    // t = A*s1 + s2
    let mut s1hat = s1;
    s1hat.ntt();
    let mut t = PolyVecK::default();
    for i in 0..K {
        t.vec[i] = PolyVecL::pointwise_acc_invmontgomery(&mat[i], &s1hat);
        t.vec[i].reduce();
        t.vec[i].invntt_montgomery();
    }
    t = t.add(&s2);
    t.freeze();

    // split off the high part and write both keys; tr caches CRH(vk)
    let (t1, t0) = t.power2round();
    packing::pack_pk(vk, &rho, &t1);
    let tr: [u8; CRH_LEN] = shake256(&[vk.as_slice()]);
    packing::pack_sk(sk, &rho, &key, &tr, &s1, &s2, &t0);

    seedbuf.zeroize();
    wipe_l(&mut s1);
    wipe_l(&mut s1hat);
    wipe_k(&mut s2);
    Ok(())
}


/// Deterministic signing: `signed = signature ‖ message`. The rejection
/// loop restarts on any failed check with a monotonically increasing nonce;
/// no fresh randomness is drawn after key unpacking.
fn sign(sk: &[u8; SK_LEN], message: &[u8]) -> Result<Vec<u8>, &'static str> {
    let (rho, mut key, tr, mut s1, mut s2, mut t0) = packing::unpack_sk(sk);

    let mut signed = alloc::vec![0u8; SIG_LEN + message.len()];
    signed[SIG_LEN..].copy_from_slice(message);

    let mu: [u8; CRH_LEN] = shake256(&[&tr, message]);
    let mut rhoprime: [u8; CRH_LEN] = shake256(&[&key, &mu]);

    let mat = expand_mat(&rho);
    s1.ntt();
    s2.ntt();
    t0.ntt();

    let mut nonce = 0u16;
    let mut result = Err("Sign: rejection loop exhausted its attempt budget");
    for _attempt in 0..MAX_SIGN_ATTEMPTS {
        // sample the masking vector and commit to w = A*y
        let mut y = PolyVecL::default();
        for p in &mut y.vec {
            *p = Poly::uniform_gamma1m1(&rhoprime, nonce);
            nonce += 1;
        }
        let mut yhat = y;
        yhat.ntt();
        let mut w = PolyVecK::default();
        for i in 0..K {
            w.vec[i] = PolyVecL::pointwise_acc_invmontgomery(&mat[i], &yhat);
            w.vec[i].reduce();
            w.vec[i].invntt_montgomery();
        }
        w.csubq();
        let (w1, w0) = w.decompose();
        let c = challenge(&mu, &w1);
        let mut chat = c;
        chat.ntt();

        // subtracting c*s2 must leave the high bits of w untouched and
        // low bits that reveal nothing
        let mut cs2 = PolyVecK::default();
        for i in 0..K {
            cs2.vec[i] = Poly::pointwise_invmontgomery(&chat, &s2.vec[i]);
            cs2.vec[i].invntt_montgomery();
        }
        let mut r0 = w0.sub(&cs2);
        r0.freeze();
        if r0.chknorm(GAMMA2 - BETA) {
            continue;
        }

        // the response z must not leak s1
        let mut z = PolyVecL::default();
        for i in 0..L {
            z.vec[i] = Poly::pointwise_invmontgomery(&chat, &s1.vec[i]);
            z.vec[i].invntt_montgomery();
        }
        z = z.add(&y);
        z.freeze();
        if z.chknorm(GAMMA1 - BETA) {
            continue;
        }

        // hint construction fails if c*t0 is too large
        let mut ct0 = PolyVecK::default();
        for i in 0..K {
            ct0.vec[i] = Poly::pointwise_invmontgomery(&chat, &t0.vec[i]);
            ct0.vec[i].invntt_montgomery();
        }
        ct0.csubq();
        if ct0.chknorm(GAMMA2) {
            continue;
        }

        let mut r0h = r0.add(&ct0);
        r0h.csubq();
        let (h, hints) = PolyVecK::make_hint(&r0h, &w1);
        if hints > u32::try_from(OMEGA).expect("omega fits u32") {
            continue;
        }

        let sig: &mut [u8; SIG_LEN] =
            (&mut signed[..SIG_LEN]).try_into().expect("signature slice");
        packing::pack_sig(sig, &z, &h, &c);
        wipe_l(&mut y);
        wipe_l(&mut yhat);
        result = Ok(signed);
        break;
    }

    key.zeroize();
    rhoprime.zeroize();
    wipe_l(&mut s1);
    wipe_k(&mut s2);
    wipe_k(&mut t0);
    result
}


/// Verifies `signature ‖ message` and returns the message on success.
fn verify(vk: &[u8; VK_LEN], signed: &[u8]) -> Result<Vec<u8>, &'static str> {
    ensure!(signed.len() >= SIG_LEN, "Verify: signed message too short");
    let sig: &[u8; SIG_LEN] = signed[..SIG_LEN].try_into().expect("signature slice");
    let message = &signed[SIG_LEN..];

    let (rho, mut t1) = packing::unpack_pk(vk);
    let (mut z, h, c) = packing::unpack_sig(sig)?;
    ensure!(!z.chknorm(GAMMA1 - BETA), "Verify: z norm out of bounds");

    // mu = CRH(CRH(vk) ‖ message)
    let tr: [u8; CRH_LEN] = shake256(&[vk.as_slice()]);
    let mu: [u8; CRH_LEN] = shake256(&[&tr, message]);

    // reconstruct w1 from A*z - c*t1*2^D with the signer's hints
    let mat = expand_mat(&rho);
    z.ntt();
    let mut tmp1 = PolyVecK::default();
    for i in 0..K {
        tmp1.vec[i] = PolyVecL::pointwise_acc_invmontgomery(&mat[i], &z);
    }
    let mut chat = c;
    chat.ntt();
    t1.shiftl();
    t1.ntt();
    let mut tmp2 = PolyVecK::default();
    for i in 0..K {
        tmp2.vec[i] = Poly::pointwise_invmontgomery(&chat, &t1.vec[i]);
    }
    tmp1 = tmp1.sub(&tmp2);
    tmp1.reduce();
    tmp1.invntt_montgomery();
    tmp1.csubq();
    let w1 = tmp1.use_hint(&h);

    // the challenge recomputed from the reconstruction must match
    let cp = challenge(&mu, &w1);
    for i in 0..N {
        ensure!(c.coeffs[i] == cp.coeffs[i], "Verify: challenge mismatch");
    }
    Ok(message.to_vec())
}


fn wipe_l(v: &mut PolyVecL) { v.vec.iter_mut().for_each(|p| p.coeffs.zeroize()); }

fn wipe_k(v: &mut PolyVecK) { v.vec.iter_mut().for_each(|p| p.coeffs.zeroize()); }


/// Functionality for the Dilithium-III security parameter set (NIST security
/// category 3): deterministic lattice signatures with 1472-byte public keys,
/// 3504-byte signing keys and 2701-byte signatures.
pub mod dilithium_iii {
    //!
    //! Typical usage flow entails:
    //! 1. The signer runs `try_keygen()` to get a verifying key `vk` and signing key `sk`.
    //! 2. The signer publishes `vk.into_bytes()` and keeps `sk` private.
    //! 3. `sk.try_sign(msg)` produces `signature ‖ message`.
    //! 4. Any holder of `vk` runs `try_open(..)` to authenticate and recover the message.
    //!
    //! **--> See [`crate::traits`] for the keygen, signing, verification, and serialization functionality.**

    use super::{keygen, sign, verify};
    use crate::traits::{SerDes, SigGen, Signer, Verifier};
    use alloc::vec::Vec;
    use rand_core::CryptoRngCore;

    /// Serialized verifying (public) key length (in bytes)
    pub const VK_LEN: usize = super::VK_LEN;
    /// Serialized signing (private) key length (in bytes)
    pub const SK_LEN: usize = super::SK_LEN;
    /// Detached signature length (in bytes); a signed message adds the message length
    pub const SIG_LEN: usize = super::SIG_LEN;

    /// Correctly sized verifying key specific to this parameter set.
    pub type VerifyingKey = crate::types::VerifyingKey<VK_LEN>;

    /// Correctly sized signing key specific to this parameter set.
    pub type SigningKey = crate::types::SigningKey<SK_LEN>;

    /// Supports the `SigGen` trait, allowing for keypair generation
    pub struct KG();


    impl SigGen for KG {
        type SigningByteArray = [u8; SK_LEN];
        type SigningKey = SigningKey;
        type VerifyingByteArray = [u8; VK_LEN];
        type VerifyingKey = VerifyingKey;

        fn try_keygen_with_rng(
            rng: &mut impl CryptoRngCore,
        ) -> Result<(VerifyingKey, SigningKey), &'static str> {
            let (mut vk, mut sk) = ([0u8; VK_LEN], [0u8; SK_LEN]);
            keygen(rng, &mut vk, &mut sk)?;
            Ok((VerifyingKey { 0: vk }, SigningKey { 0: sk }))
        }
    }


    impl Signer for SigningKey {
        fn try_sign(&self, message: &[u8]) -> Result<Vec<u8>, &'static str> {
            sign(&self.0, message)
        }
    }


    impl Verifier for VerifyingKey {
        fn try_open(&self, signed_message: &[u8]) -> Result<Vec<u8>, &'static str> {
            verify(&self.0, signed_message)
        }
    }


    impl SerDes for VerifyingKey {
        type ByteArray = [u8; VK_LEN];

        fn into_bytes(self) -> Self::ByteArray { self.0 }

        fn try_from_bytes(vk: Self::ByteArray) -> Result<Self, &'static str> {
            // Every 9-bit lane is a valid t1 coefficient, so size is the only
            // wire-format constraint; a Result is kept for symmetry.
            Ok(VerifyingKey { 0: vk })
        }
    }


    impl SerDes for SigningKey {
        type ByteArray = [u8; SK_LEN];

        fn into_bytes(self) -> Self::ByteArray { self.0 }

        fn try_from_bytes(sk: Self::ByteArray) -> Result<Self, &'static str> {
            Ok(SigningKey { 0: sk })
        }
    }


    #[cfg(test)]
    mod tests {
        use super::*;
        use rand_chacha::rand_core::SeedableRng;

        #[test]
        fn smoke_test() {
            let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
            for msg_len in [0usize, 1, 59, 333] {
                let (vk, sk) = KG::try_keygen_with_rng(&mut rng).unwrap();
                let msg = alloc::vec![0xA5u8; msg_len];
                let signed = sk.try_sign(&msg).unwrap();
                assert_eq!(signed.len(), SIG_LEN + msg_len);
                let opened = vk.try_open(&signed).unwrap();
                assert_eq!(opened, msg);
            }
        }

        #[test]
        fn deterministic_signatures() {
            let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(456);
            let (_vk, sk) = KG::try_keygen_with_rng(&mut rng).unwrap();
            let s1 = sk.try_sign(b"same message").unwrap();
            let s2 = sk.try_sign(b"same message").unwrap();
            assert_eq!(s1, s2);
        }

        #[test]
        fn bit_flips_reject() {
            let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(789);
            let (vk, sk) = KG::try_keygen_with_rng(&mut rng).unwrap();
            let signed = sk.try_sign(b"attack at dawn").unwrap();
            for i in [0, SIG_LEN / 2, SIG_LEN - 1, SIG_LEN + 3] {
                let mut bad = signed.clone();
                bad[i] ^= 0x04;
                assert!(vk.try_open(&bad).is_err());
            }
        }
    }
}
