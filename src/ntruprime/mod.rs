//! Streamlined NTRU Prime 4591^761: a quotient-ring KEM over the
//! inert modulus x^p - x - 1.

mod mod3;
mod modq;
mod r3;
mod recip;
mod rq;
mod weight;

use crate::helpers::{sha3_512, shake256};
use crate::SharedSecretKey;
use rand_core::CryptoRngCore;
use subtle::{ConditionallySelectable, ConstantTimeEq};
use zeroize::Zeroize;

pub(crate) const P: usize = 761;
pub(crate) const Q: i16 = 4591;
pub(crate) const QSHIFT: i16 = 2295;
pub(crate) const W: usize = 286;

pub(crate) const SMALL_LEN: usize = (P + 3) / 4;
pub(crate) const RQ_LEN: usize = 8 * (P / 5) + 2;
pub(crate) const RQ_ROUNDED_LEN: usize = 4 * (P / 3) + 3;
pub(crate) const EK_LEN: usize = RQ_LEN;
pub(crate) const DK_LEN: usize = 2 * SMALL_LEN + RQ_LEN;
pub(crate) const CT_LEN: usize = 32 + RQ_ROUNDED_LEN;

/// Non-invertible g draws are roughly one in q; this budget makes keygen
/// failure a sign of a broken RNG rather than bad luck.
const MAX_KEYGEN_ATTEMPTS: usize = 48;


/// Keygen: h = g / (3f) with g invertible mod 3 and f of fixed weight w.
/// dk = trits(f) ‖ trits(1/g mod 3) ‖ ek.
fn kem_keygen(
    rng: &mut impl CryptoRngCore, ek: &mut [u8; EK_LEN], dk: &mut [u8; DK_LEN],
) -> Result<(), &'static str> {
    let mut grecip = [0i8; P];
    let mut invertible = None;
    for _attempt in 0..MAX_KEYGEN_ATTEMPTS {
        let candidate = weight::small_random(rng)?;
        if recip::r3_recip(&mut grecip, &candidate) {
            invertible = Some(candidate);
            break;
        }
    }
    let Some(mut g) = invertible else {
        grecip.zeroize();
        return Err("Keygen: exhausted retries for invertible g");
    };

    let mut f = weight::small_random_weightw(rng).map_err(|_| "Keygen: random number generator failed")?;
    let mut f3recip = [0i16; P];
    if !recip::rq_recip3(&mut f3recip, &f) {
        return Err("Keygen: ring inversion failed on a unit");
    }

    let h = rq::mult(&f3recip, &g);
    *ek = rq::encode(&h);
    dk[..SMALL_LEN].copy_from_slice(&weight::small_encode(&f));
    dk[SMALL_LEN..2 * SMALL_LEN].copy_from_slice(&weight::small_encode(&grecip));
    dk[2 * SMALL_LEN..].copy_from_slice(ek);

    g.zeroize();
    grecip.zeroize();
    f.zeroize();
    f3recip.zeroize();
    Ok(())
}


/// Encapsulation: choose a fixed-weight r, hash its encoding into the
/// confirmation and the session key, and round h*r for the wire.
fn kem_encaps(
    rng: &mut impl CryptoRngCore, ek: &[u8; EK_LEN], ct: &mut [u8; CT_LEN],
) -> Result<SharedSecretKey, &'static str> {
    let mut r = weight::small_random_weightw(rng).map_err(|_| "Encaps: random number generator failed")?;
    let mut rstr = weight::small_encode(&r);
    let mut hash = sha3_512(&[&rstr]);

    let h = rq::decode(ek);
    let c = rq::round3(&rq::mult(&h, &r));

    ct[..32].copy_from_slice(&hash[..32]);
    ct[32..].copy_from_slice(&rq::encode_rounded(&c));
    let mut ssk = [0u8; 32];
    ssk.copy_from_slice(&hash[32..]);

    r.zeroize();
    rstr.zeroize();
    hash.zeroize();
    Ok(SharedSecretKey(ssk))
}


/// Decapsulation: recover r = (3fc)(1/g) mod 3, then re-encrypt and fold
/// the weight, confirmation and ciphertext checks into one constant-time
/// selection between the real key and the implicit-rejection key.
fn kem_decaps(dk: &[u8; DK_LEN], ct: &[u8; CT_LEN]) -> Result<SharedSecretKey, &'static str> {
    let mut f = weight::small_decode(&dk[..SMALL_LEN]);
    let mut grecip = weight::small_decode(&dk[SMALL_LEN..2 * SMALL_LEN]);
    let ek: &[u8; EK_LEN] = dk[2 * SMALL_LEN..].try_into().expect("embedded ek");

    let c = rq::decode_rounded(ct[32..].try_into().expect("rounded block"));
    let t = rq::mult(&c, &f);
    let mut t3 = [0i8; P];
    for i in 0..P {
        t3[i] = mod3::freeze(i32::from(modq::freeze(3 * i32::from(t[i]))));
    }
    let mut r = r3::mult(&t3, &grecip);

    let weight = r.iter().filter(|&&x| x != 0).count();
    let weight_ok = u32::try_from(weight).expect("weight fits u32").ct_eq(&u32::try_from(W).expect("w fits u32"));

    // re-encrypt under the embedded public key and recompute the hashes
    let h = rq::decode(ek);
    let c_prime = rq::round3(&rq::mult(&h, &r));
    let reencrypt_ok = rq::encode_rounded(&c_prime)[..].ct_eq(&ct[32..]);

    let mut rstr = weight::small_encode(&r);
    let mut hash = sha3_512(&[&rstr]);
    let confirm_ok = hash[..32].ct_eq(&ct[..32]);

    let ok = weight_ok & confirm_ok & reencrypt_ok;

    // implicit rejection: a deterministic pseudorandom key on any failure
    let mut ssk: [u8; 32] = shake256(&[&[0u8], &dk[..SMALL_LEN], ct]);
    let good: [u8; 32] = hash[32..].try_into().expect("hash split");
    ssk.conditional_assign(&good, ok);

    f.zeroize();
    grecip.zeroize();
    t3.zeroize();
    r.zeroize();
    rstr.zeroize();
    hash.zeroize();
    Ok(SharedSecretKey(ssk))
}


/// Functionality for the Streamlined NTRU Prime 4591^761 parameter set:
/// 1218-byte public keys, 1600-byte secret keys, 1047-byte ciphertexts,
/// 32-byte shared secrets.
pub mod ntru_s3 {
    //!
    //! Typical usage flow entails:
    //! 1. The originator runs `try_keygen()` to get an encaps key and decaps key.
    //! 2. The encaps key is serialized via `into_bytes()` and sent to the remote party.
    //! 3. The remote party runs `try_encaps()` to get the shared secret and ciphertext.
    //! 4. The originator runs `try_decaps(..)`; both sides now hold the secret.
    //!
    //! **--> See [`crate::traits`] for the keygen, encapsulation, decapsulation, and serialization/deserialization functionality.**

    use super::{kem_decaps, kem_encaps, kem_keygen, SMALL_LEN};
    use crate::traits::{Decaps, Encaps, KeyGen, SerDes};
    use crate::SharedSecretKey;
    use rand_core::{CryptoRng, CryptoRngCore, RngCore};

    /// Serialized Encapsulation Key Length (in bytes)
    pub const EK_LEN: usize = super::EK_LEN;
    /// Serialized Decapsulation Key Length (in bytes)
    pub const DK_LEN: usize = super::DK_LEN;
    /// Serialized Ciphertext Length (in bytes)
    pub const CT_LEN: usize = super::CT_LEN;

    /// Correctly sized encapsulation key specific to this parameter set.
    pub type EncapsKey = crate::types::EncapsKey<EK_LEN>;

    /// Correctly sized decapsulation key specific to this parameter set.
    pub type DecapsKey = crate::types::DecapsKey<DK_LEN>;

    /// Correctly sized ciphertext specific to this parameter set.
    pub type CipherText = crate::types::CipherText<CT_LEN>;

    /// Supports the `KeyGen` trait, allowing for keypair generation
    pub struct KG();


    impl KeyGen for KG {
        type DecapsByteArray = [u8; DK_LEN];
        type DecapsKey = DecapsKey;
        type EncapsByteArray = [u8; EK_LEN];
        type EncapsKey = EncapsKey;

        fn try_keygen_with_rng(
            rng: &mut impl CryptoRngCore,
        ) -> Result<(EncapsKey, DecapsKey), &'static str> {
            let mut ek = [0u8; EK_LEN];
            let mut dk = [0u8; DK_LEN];
            kem_keygen(rng, &mut ek, &mut dk)?;
            Ok((EncapsKey { 0: ek }, DecapsKey { 0: dk }))
        }

        #[allow(clippy::items_after_statements)] // introduce the dummy RNG just before encaps
        fn validate_keypair_vartime(ek: &[u8; EK_LEN], dk: &[u8; DK_LEN]) -> bool {
            // 1. dk should embed ek
            if *ek != dk[2 * SMALL_LEN..] {
                return false;
            }
            // 2. a full encaps/decaps round trip should agree
            struct A5Rng();
            impl RngCore for A5Rng {
                fn next_u32(&mut self) -> u32 { unimplemented!() }

                fn next_u64(&mut self) -> u64 { unimplemented!() }

                fn fill_bytes(&mut self, _out: &mut [u8]) { unimplemented!() }

                fn try_fill_bytes(&mut self, out: &mut [u8]) -> Result<(), rand_core::Error> {
                    let mut x = 0x2545_F491u32;
                    out.iter_mut().for_each(|b| {
                        // xorshift is plenty for a validity probe
                        x ^= x << 13;
                        x ^= x >> 17;
                        x ^= x << 5;
                        *b = x.to_le_bytes()[0];
                    });
                    Ok(())
                }
            }
            impl CryptoRng for A5Rng {}
            let mut a5rng = A5Rng {};
            let Ok(ek) = EncapsKey::try_from_bytes(*ek) else {
                return false;
            };
            let Ok(dk) = DecapsKey::try_from_bytes(*dk) else {
                return false;
            };
            let Ok((ssk1, ct)) = ek.try_encaps_with_rng(&mut a5rng) else {
                return false;
            };
            let Ok(ssk2) = dk.try_decaps(&ct) else {
                return false;
            };
            ssk1 == ssk2
        }
    }


    impl Encaps for EncapsKey {
        type CipherText = CipherText;
        type SharedSecretKey = SharedSecretKey;

        fn try_encaps_with_rng(
            &self, rng: &mut impl CryptoRngCore,
        ) -> Result<(SharedSecretKey, CipherText), &'static str> {
            let mut ct = [0u8; CT_LEN];
            let ssk = kem_encaps(rng, &self.0, &mut ct)?;
            Ok((ssk, CipherText { 0: ct }))
        }
    }


    impl Decaps for DecapsKey {
        type CipherText = CipherText;
        type SharedSecretKey = SharedSecretKey;

        fn try_decaps(&self, ct: &CipherText) -> Result<SharedSecretKey, &'static str> {
            kem_decaps(&self.0, &ct.0)
        }
    }


    impl SerDes for EncapsKey {
        type ByteArray = [u8; EK_LEN];

        fn into_bytes(self) -> Self::ByteArray { self.0 }

        fn try_from_bytes(ek: Self::ByteArray) -> Result<Self, &'static str> {
            // Every byte string decodes to a ring element (non-canonical
            // digits reduce); size is the only wire-format constraint.
            Ok(EncapsKey { 0: ek })
        }
    }


    impl SerDes for DecapsKey {
        type ByteArray = [u8; DK_LEN];

        fn into_bytes(self) -> Self::ByteArray { self.0 }

        fn try_from_bytes(dk: Self::ByteArray) -> Result<Self, &'static str> {
            Ok(DecapsKey { 0: dk })
        }
    }


    impl SerDes for CipherText {
        type ByteArray = [u8; CT_LEN];

        fn into_bytes(self) -> Self::ByteArray { self.0 }

        fn try_from_bytes(ct: Self::ByteArray) -> Result<Self, &'static str> {
            Ok(CipherText { 0: ct })
        }
    }


    #[cfg(test)]
    mod tests {
        use super::*;
        use rand_chacha::rand_core::SeedableRng;

        #[test]
        fn smoke_test() {
            let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
            for _i in 0..5 {
                let (ek, dk) = KG::try_keygen_with_rng(&mut rng).unwrap();
                let (ssk1, ct) = ek.try_encaps_with_rng(&mut rng).unwrap();
                let ssk2 = dk.try_decaps(&ct).unwrap();
                assert_eq!(ssk1, ssk2);
                assert!(KG::validate_keypair_vartime(
                    &ek.clone().into_bytes(),
                    &dk.clone().into_bytes()
                ));
            }
        }

        #[test]
        fn implicit_rejection_is_deterministic() {
            let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(456);
            let (ek, dk) = KG::try_keygen_with_rng(&mut rng).unwrap();
            let (ssk, ct) = ek.try_encaps_with_rng(&mut rng).unwrap();
            for position in [0usize, 31, 32, CT_LEN - 1] {
                let mut bad = ct.clone().into_bytes();
                bad[position] ^= 0x01;
                let bad_ct = CipherText::try_from_bytes(bad).unwrap();
                let r1 = dk.try_decaps(&bad_ct).unwrap();
                let r2 = dk.try_decaps(&bad_ct).unwrap();
                assert!(r1 != ssk);
                assert_eq!(r1.clone().into_bytes(), r2.into_bytes());
            }
        }
    }
}
