//! Classic McEliece: binary-Goppa code KEM (round-2 semantics), parameter
//! sets 6960-119 and 8192-128 over GF(2^13).

mod benes;
mod decode;
mod encode;
mod gf;
mod gfpoly;
mod matrix;

use crate::helpers::shake256;
use crate::SharedSecretKey;
use alloc::vec;
use alloc::vec::Vec;
use rand_core::CryptoRngCore;
use self::gf::Gf;
use zeroize::Zeroize;

pub(crate) const GFBITS: usize = 13;
pub(crate) const GF_N: usize = 1 << GFBITS;
pub(crate) const GFMASK: u16 = (1 << GFBITS) - 1;
pub(crate) const COND_BYTES: usize = (2 * GFBITS - 1) * GF_N / 16;

/// Bad luck (non-systematic matrix, repeated permutation entry, reducible
/// candidate) is retried; a broken RNG hits this budget and errors out.
const MAX_KEYGEN_ATTEMPTS: usize = 48;


/// Everything that distinguishes the two parameter sets, including the
/// nonzero tail of the degree-t field-extension modulus f(y).
pub(crate) struct Params {
    pub(crate) n: usize,
    pub(crate) t: usize,
    pub(crate) reduction: &'static [(usize, Gf)],
}

impl Params {
    pub(crate) const fn pk_nrows(&self) -> usize { GFBITS * self.t }

    pub(crate) const fn pk_row_bytes(&self) -> usize { (self.n - self.pk_nrows() + 7) / 8 }

    pub(crate) const fn pk_len(&self) -> usize { self.pk_nrows() * self.pk_row_bytes() }

    pub(crate) const fn synd_bytes(&self) -> usize { (self.pk_nrows() + 7) / 8 }

    pub(crate) const fn irr_bytes(&self) -> usize { 2 * self.t }

    pub(crate) const fn sk_len(&self) -> usize { self.n / 8 + self.irr_bytes() + COND_BYTES }

    pub(crate) const fn ct_len(&self) -> usize { self.synd_bytes() + 32 }
}

#[cfg(feature = "mceliece-6960-119")]
pub(crate) const PARAMS_6960_119: Params =
    Params { n: 6960, t: 119, reduction: &[(2, 6400), (0, 3134)] };

#[cfg(feature = "mceliece-8192-128")]
pub(crate) const PARAMS_8192_128: Params =
    Params { n: 8192, t: 128, reduction: &[(5, 7682), (3, 2159), (0, 3597)] };


/// Keygen: sk = s ‖ packed g ‖ Benes control bits; pk = the non-identity
/// block of the systematic parity-check matrix.
fn kem_keygen(
    rng: &mut impl CryptoRngCore, params: &Params,
) -> Result<(Vec<u8>, Vec<u8>), &'static str> {
    let (n, t) = (params.n, params.t);
    let mut sk = vec![0u8; params.sk_len()];
    rng.try_fill_bytes(&mut sk[..n / 8])
        .map_err(|_| "Keygen: random number generator failed")?;

    for _attempt in 0..MAX_KEYGEN_ATTEMPTS {
        // candidate Goppa polynomial: the minimal polynomial of a random
        // field-extension element
        let mut a_bytes = vec![0u8; 2 * t];
        rng.try_fill_bytes(&mut a_bytes)
            .map_err(|_| "Keygen: random number generator failed")?;
        let a: Vec<Gf> = a_bytes
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes(c.try_into().expect("two bytes")) & GFMASK)
            .collect();
        let mut goppa = vec![Gf::default(); t];
        if !gfpoly::irr_gen(&mut goppa, &a, params.reduction) {
            continue;
        }

        // candidate support permutation, rejected on any repetition
        let mut perm_bytes = vec![0u8; 4 * GF_N];
        rng.try_fill_bytes(&mut perm_bytes)
            .map_err(|_| "Keygen: random number generator failed")?;
        let mut keys: Vec<u64> = perm_bytes
            .chunks_exact(4)
            .enumerate()
            .map(|(i, c)| {
                (u64::from(u32::from_le_bytes(c.try_into().expect("four bytes"))) << 31)
                    | u64::try_from(i).expect("13-bit index")
            })
            .collect();
        benes::sort_63b(&mut keys);
        if keys.windows(2).any(|w| w[0] >> 31 == w[1] >> 31) {
            continue;
        }
        let mut pi = [0u16; GF_N];
        for (slot, key) in pi.iter_mut().zip(keys.iter()) {
            // the low 31 bits carried the original index; 13 bits suffice
            #[allow(clippy::cast_possible_truncation)]
            let index = *key as u16;
            *slot = index & GFMASK;
        }
        let cond = benes::controlbits(&pi);

        let mut pk = vec![0u8; params.pk_len()];
        if matrix::pk_gen(&mut pk, &goppa, &cond, params) {
            let irr = &mut sk[n / 8..n / 8 + 2 * t];
            for (chunk, &coeff) in irr.chunks_exact_mut(2).zip(goppa.iter()) {
                chunk.copy_from_slice(&coeff.to_le_bytes());
            }
            sk[n / 8 + 2 * t..].copy_from_slice(&cond);
            goppa.zeroize();
            return Ok((pk, sk));
        }
    }
    Err("Keygen: exhausted retries for a systematic key")
}


/// Encapsulation: ct = (He, H(2, e)); ss = H(1, e, ct).
fn kem_encaps(
    rng: &mut impl CryptoRngCore, pk: &[u8], params: &Params,
) -> Result<(Vec<u8>, SharedSecretKey), &'static str> {
    let mut e = encode::gen_e(rng, params)?;
    let mut ct = encode::syndrome(pk, &e, params);
    let c1: [u8; 32] = shake256(&[&[2u8], &e]);
    ct.extend_from_slice(&c1);
    let ssk: [u8; 32] = shake256(&[&[1u8], &e, &ct]);
    e.zeroize();
    Ok((ct, SharedSecretKey(ssk)))
}


/// Decapsulation: decode, recompute the confirmation, and fold both checks
/// into one mask selecting between the error vector and the secret string s
/// before the final hash (implicit rejection).
fn kem_decaps(sk: &[u8], ct: &[u8], params: &Params) -> SharedSecretKey {
    let n = params.n;
    let synd_bytes = params.synd_bytes();

    let mut e = vec![0u8; n / 8];
    let ret_decrypt = decode::decrypt(&mut e, &sk[n / 8..], &ct[..synd_bytes], params);

    let c1: [u8; 32] = shake256(&[&[2u8], &e]);
    let mut ret_confirm = 0u8;
    for (a, b) in c1.iter().zip(ct[synd_bytes..].iter()) {
        ret_confirm |= a ^ b;
    }

    #[allow(clippy::cast_possible_truncation)] // mask fits a byte
    let m = ((ret_decrypt | u16::from(ret_confirm)).wrapping_sub(1) >> 8) as u8;

    let mut preimage = vec![0u8; 1 + n / 8 + ct.len()];
    preimage[0] = m & 1;
    for (i, slot) in preimage[1..=n / 8].iter_mut().enumerate() {
        *slot = (!m & sk[i]) | (m & e[i]);
    }
    preimage[1 + n / 8..].copy_from_slice(ct);

    let ssk: [u8; 32] = shake256(&[&preimage]);
    e.zeroize();
    preimage.zeroize();
    SharedSecretKey(ssk)
}


// This common functionality is injected into each parameter set module
macro_rules! functionality {
    ($params:path) => {
        use crate::helpers::ensure;
        use crate::traits::{Decaps, Encaps, KeyGen, SerDes};
        use crate::SharedSecretKey;
        use alloc::vec::Vec;
        use rand_core::{CryptoRng, CryptoRngCore, RngCore};
        use zeroize::{Zeroize, ZeroizeOnDrop};

        /// Serialized public (encapsulation) key length (in bytes)
        pub const EK_LEN: usize = $params.pk_len();
        /// Serialized private (decapsulation) key length (in bytes)
        pub const DK_LEN: usize = $params.sk_len();
        /// Serialized ciphertext length (in bytes)
        pub const CT_LEN: usize = $params.ct_len();

        /// The (public) encapsulation key; heap-backed, as the systematic
        /// parity-check block runs to a megabyte.
        #[derive(Clone)]
        pub struct EncapsKey(Vec<u8>);

        /// The (private) decapsulation key; heap-backed and wiped on drop.
        #[derive(Clone, Zeroize, ZeroizeOnDrop)]
        pub struct DecapsKey(Vec<u8>);

        /// Correctly sized ciphertext specific to this parameter set.
        pub type CipherText = crate::types::CipherText<CT_LEN>;

        /// Supports the `KeyGen` trait, allowing for keypair generation
        pub struct KG();


        impl KeyGen for KG {
            type DecapsByteArray = Vec<u8>;
            type DecapsKey = DecapsKey;
            type EncapsByteArray = Vec<u8>;
            type EncapsKey = EncapsKey;

            fn try_keygen_with_rng(
                rng: &mut impl CryptoRngCore,
            ) -> Result<(EncapsKey, DecapsKey), &'static str> {
                let (pk, sk) = super::kem_keygen(rng, &$params)?;
                Ok((EncapsKey(pk), DecapsKey(sk)))
            }

            #[allow(clippy::items_after_statements)] // introduce the dummy RNG just before encaps
            fn validate_keypair_vartime(ek: &Vec<u8>, dk: &Vec<u8>) -> bool {
                if ek.len() != EK_LEN || dk.len() != DK_LEN {
                    return false;
                }
                struct ProbeRng(u32);
                impl RngCore for ProbeRng {
                    fn next_u32(&mut self) -> u32 { unimplemented!() }

                    fn next_u64(&mut self) -> u64 { unimplemented!() }

                    fn fill_bytes(&mut self, _out: &mut [u8]) { unimplemented!() }

                    fn try_fill_bytes(&mut self, out: &mut [u8]) -> Result<(), rand_core::Error> {
                        out.iter_mut().for_each(|b| {
                            self.0 ^= self.0 << 13;
                            self.0 ^= self.0 >> 17;
                            self.0 ^= self.0 << 5;
                            *b = self.0.to_le_bytes()[0];
                        });
                        Ok(())
                    }
                }
                impl CryptoRng for ProbeRng {}
                let mut probe = ProbeRng(0x2545_F491);
                let Ok(ek) = EncapsKey::try_from_bytes(ek.clone()) else {
                    return false;
                };
                let Ok(dk) = DecapsKey::try_from_bytes(dk.clone()) else {
                    return false;
                };
                let Ok((ssk1, ct)) = ek.try_encaps_with_rng(&mut probe) else {
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
                let (ct_bytes, ssk) = super::kem_encaps(rng, &self.0, &$params)?;
                let mut ct = [0u8; CT_LEN];
                ct.copy_from_slice(&ct_bytes);
                Ok((ssk, CipherText { 0: ct }))
            }
        }


        impl Decaps for DecapsKey {
            type CipherText = CipherText;
            type SharedSecretKey = SharedSecretKey;

            fn try_decaps(&self, ct: &CipherText) -> Result<SharedSecretKey, &'static str> {
                Ok(super::kem_decaps(&self.0, &ct.0, &$params))
            }
        }


        impl SerDes for EncapsKey {
            type ByteArray = Vec<u8>;

            fn into_bytes(self) -> Vec<u8> { self.0 }

            fn try_from_bytes(ek: Vec<u8>) -> Result<Self, &'static str> {
                ensure!(ek.len() == EK_LEN, "Encaps key of wrong length");
                Ok(EncapsKey(ek))
            }
        }


        impl SerDes for DecapsKey {
            type ByteArray = Vec<u8>;

            fn into_bytes(self) -> Vec<u8> {
                let mut this = self;
                core::mem::take(&mut this.0)
            }

            fn try_from_bytes(dk: Vec<u8>) -> Result<Self, &'static str> {
                ensure!(dk.len() == DK_LEN, "Decaps key of wrong length");
                Ok(DecapsKey(dk))
            }
        }


        impl SerDes for CipherText {
            type ByteArray = [u8; CT_LEN];

            fn into_bytes(self) -> Self::ByteArray { self.0 }

            fn try_from_bytes(ct: Self::ByteArray) -> Result<Self, &'static str> {
                // Size is the only wire-format constraint on a ciphertext.
                Ok(CipherText { 0: ct })
            }
        }
    };
}


/// Functionality for the Classic `McEliece` 6960-119 parameter set:
/// 1047319-byte public keys, 13908-byte secret keys, 226-byte ciphertexts,
/// 32-byte shared secrets.
#[cfg(feature = "mceliece-6960-119")]
pub mod mceliece_6960_119 {
    //!
    //! Typical usage flow entails:
    //! 1. The originator runs `try_keygen()` to get an encaps key and decaps key.
    //! 2. The (large) encaps key is serialized via `into_bytes()` and sent to the remote party.
    //! 3. The remote party runs `try_encaps()` to get the shared secret and a small ciphertext.
    //! 4. The originator runs `try_decaps(..)`; both sides now hold the secret.
    //!
    //! **--> See [`crate::traits`] for the keygen, encapsulation, decapsulation, and serialization/deserialization functionality.**

    use super::PARAMS_6960_119;

    functionality!(PARAMS_6960_119);

    #[cfg(test)]
    mod tests {
        use super::*;
        use rand_chacha::rand_core::SeedableRng;

        #[test]
        fn smoke_test() {
            let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
            let (ek, dk) = KG::try_keygen_with_rng(&mut rng).unwrap();
            let (ssk1, ct) = ek.try_encaps_with_rng(&mut rng).unwrap();
            let ssk2 = dk.try_decaps(&ct).unwrap();
            assert_eq!(ssk1, ssk2);

            // any single flipped ciphertext byte must implicitly reject
            let mut bad = ct.clone().into_bytes();
            bad[100] ^= 0x40;
            let bad_ct = CipherText::try_from_bytes(bad).unwrap();
            let r1 = dk.try_decaps(&bad_ct).unwrap();
            let r2 = dk.try_decaps(&bad_ct).unwrap();
            assert!(r1 != ssk1);
            assert_eq!(r1.clone().into_bytes(), r2.into_bytes());
        }
    }
}


/// Functionality for the Classic `McEliece` 8192-128 parameter set:
/// 1357824-byte public keys, 14080-byte secret keys, 240-byte ciphertexts,
/// 32-byte shared secrets.
#[cfg(feature = "mceliece-8192-128")]
pub mod mceliece_8192_128 {
    //!
    //! See the sibling [`super::mceliece_6960_119`] module for the usage flow;
    //! this set trades a larger key for byte-aligned internals.
    //!
    //! **--> See [`crate::traits`] for the keygen, encapsulation, decapsulation, and serialization/deserialization functionality.**

    use super::PARAMS_8192_128;

    functionality!(PARAMS_8192_128);

    #[cfg(test)]
    mod tests {
        use super::*;
        use rand_chacha::rand_core::SeedableRng;

        // $ cargo test -- --ignored
        #[ignore] // keygen Gaussian elimination is slow in debug builds
        #[test]
        fn smoke_test() {
            let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(456);
            let (ek, dk) = KG::try_keygen_with_rng(&mut rng).unwrap();
            let (ssk1, ct) = ek.try_encaps_with_rng(&mut rng).unwrap();
            let ssk2 = dk.try_decaps(&ct).unwrap();
            assert_eq!(ssk1, ssk2);
        }
    }
}
