//! Kyber-768: module-lattice KEM with the round-3 Fujisaki-Okamoto transform.

mod field;
mod indcpa;
mod ntt;
mod poly;

use crate::helpers::{sha3_256, sha3_512, shake256};
use crate::SharedSecretKey;
use rand_core::CryptoRngCore;
use subtle::{ConditionallySelectable, ConstantTimeEq};

pub(crate) const N: usize = 256;
pub(crate) const Q: u16 = 3329;
pub(crate) const ZETA: u16 = 17;
pub(crate) const K: usize = 3;
pub(crate) const ETA: usize = 2;
pub(crate) const DU: u32 = 10;
pub(crate) const DV: u32 = 4;

pub(crate) const SEED_LEN: usize = 32;
pub(crate) const MSG_LEN: usize = 32;
pub(crate) const EK_PKE_LEN: usize = 384 * K + 32;
pub(crate) const DK_PKE_LEN: usize = 384 * K;
pub(crate) const CT_LEN: usize = 32 * (DU as usize * K + DV as usize);
pub(crate) const EK_LEN: usize = EK_PKE_LEN;
pub(crate) const DK_LEN: usize = DK_PKE_LEN + EK_LEN + 32 + 32;


/// Keygen per the round-3 transform: the KEM decapsulation key carries the
/// PKE key, the full encapsulation key, its hash, and the implicit-rejection
/// seed z.
fn kem_keygen(
    rng: &mut impl CryptoRngCore, ek: &mut [u8; EK_LEN], dk: &mut [u8; DK_LEN],
) -> Result<(), &'static str> {
    let mut dz = [0u8; 64];
    rng.try_fill_bytes(&mut dz).map_err(|_| "Keygen: random number generator failed")?;
    let d: [u8; 32] = dz[..32].try_into().expect("seed split");

    // (rho, sigma) <- G(d)
    let g = sha3_512(&[&d]);
    let rho: [u8; 32] = g[..32].try_into().expect("G split");
    let sigma: [u8; 32] = g[32..].try_into().expect("G split");

    indcpa::pke_keygen(&rho, &sigma, ek, &mut dk[..DK_PKE_LEN]);

    // dk <- dk_pke ‖ ek ‖ H(ek) ‖ z
    let h_ek = sha3_256(&[ek.as_slice()]);
    dk[DK_PKE_LEN..DK_PKE_LEN + EK_LEN].copy_from_slice(ek);
    dk[DK_PKE_LEN + EK_LEN..DK_PKE_LEN + EK_LEN + 32].copy_from_slice(&h_ek);
    dk[DK_PKE_LEN + EK_LEN + 32..].copy_from_slice(&dz[32..]);
    Ok(())
}


/// Encapsulation: hash the fresh randomness into the message, derive
/// (K̄, r) from G(m ‖ H(ek)), and output `KDF(K̄ ‖ H(ct))`.
fn kem_encaps(
    rng: &mut impl CryptoRngCore, ek: &[u8; EK_LEN], ct: &mut [u8; CT_LEN],
) -> Result<SharedSecretKey, &'static str> {
    let mut m0 = [0u8; 32];
    rng.try_fill_bytes(&mut m0).map_err(|_| "Encaps: random number generator failed")?;
    let m = sha3_256(&[&m0]);

    let h_ek = sha3_256(&[ek.as_slice()]);
    let g = sha3_512(&[&m, &h_ek]);
    let kbar: [u8; 32] = g[..32].try_into().expect("G split");
    let r: [u8; 32] = g[32..].try_into().expect("G split");

    indcpa::pke_encrypt(ek, &m, &r, ct)?;

    let h_ct = sha3_256(&[ct.as_slice()]);
    Ok(SharedSecretKey(shake256(&[&kbar, &h_ct])))
}


/// Decapsulation with implicit rejection: re-encrypt the decrypted message
/// and constant-time select the rejection seed z on mismatch. Both branches
/// end in the same `KDF(· ‖ H(ct))`.
fn kem_decaps(dk: &[u8; DK_LEN], ct: &[u8; CT_LEN]) -> Result<SharedSecretKey, &'static str> {
    let dk_pke = &dk[..DK_PKE_LEN];
    let ek_pke = &dk[DK_PKE_LEN..DK_PKE_LEN + EK_LEN];
    let h_ek = &dk[DK_PKE_LEN + EK_LEN..DK_PKE_LEN + EK_LEN + 32];
    let z = &dk[DK_PKE_LEN + EK_LEN + 32..];

    let m_prime = indcpa::pke_decrypt(dk_pke, ct)?;
    let g = sha3_512(&[&m_prime, h_ek]);
    let mut kbar: [u8; 32] = g[..32].try_into().expect("G split");
    let r_prime: [u8; 32] = g[32..].try_into().expect("G split");

    let mut ct_prime = [0u8; CT_LEN];
    indcpa::pke_encrypt(ek_pke, &m_prime, &r_prime, &mut ct_prime)?;

    let z: [u8; 32] = z.try_into().expect("z slice");
    kbar.conditional_assign(&z, ct.ct_ne(&ct_prime));

    let h_ct = sha3_256(&[ct.as_slice()]);
    Ok(SharedSecretKey(shake256(&[&kbar, &h_ct])))
}


/// Functionality for the Kyber-768 security parameter set (NIST security
/// category 3): 1184-byte encapsulation keys, 2400-byte decapsulation keys,
/// 1088-byte ciphertexts, 32-byte shared secrets.
pub mod kyber_768 {
    //!
    //! Typical usage flow entails:
    //! 1. The originator runs `try_keygen()` to get an encaps key and decaps key.
    //! 2. The encaps key is serialized via `into_bytes()` and sent to the remote party.
    //! 3. The remote party deserializes via `try_from_bytes(..)` and runs `try_encaps()` to
    //!    get the shared secret and a ciphertext for the originator.
    //! 4. The originator runs `try_decaps(..)` on the ciphertext; both sides now share the secret.
    //!
    //! **--> See [`crate::traits`] for the keygen, encapsulation, decapsulation, and serialization/deserialization functionality.**

    use super::{kem_decaps, kem_encaps, kem_keygen, CT_LEN as CT, DK_LEN as DK, EK_LEN as EK};
    use crate::helpers::ensure;
    use crate::kyber::{poly, DK_PKE_LEN};
    use crate::traits::{Decaps, Encaps, KeyGen, SerDes};
    use crate::SharedSecretKey;
    use rand_core::{CryptoRng, CryptoRngCore, RngCore};

    /// Serialized Encapsulation Key Length (in bytes)
    pub const EK_LEN: usize = EK;
    /// Serialized Decapsulation Key Length (in bytes)
    pub const DK_LEN: usize = DK;
    /// Serialized Ciphertext Length (in bytes)
    pub const CT_LEN: usize = CT;

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
            let (mut ek, mut dk) = ([0u8; EK_LEN], [0u8; DK_LEN]);
            kem_keygen(rng, &mut ek, &mut dk)?;
            Ok((EncapsKey { 0: ek }, DecapsKey { 0: dk }))
        }

        #[allow(clippy::items_after_statements)] // introduce the dummy RNG just before encaps
        fn validate_keypair_vartime(ek: &[u8; EK_LEN], dk: &[u8; DK_LEN]) -> bool {
            // 1. dk should contain ek
            if *ek != dk[DK_PKE_LEN..DK_PKE_LEN + EK_LEN] {
                return false;
            }
            // 2. dk should contain the hash of ek
            if crate::helpers::sha3_256(&[ek.as_slice()])
                != dk[DK_PKE_LEN + EK_LEN..DK_PKE_LEN + EK_LEN + 32]
            {
                return false;
            }
            // 3. ek and dk should deserialize ok
            let ek = EncapsKey::try_from_bytes(*ek);
            let dk = DecapsKey::try_from_bytes(*dk);
            if ek.is_err() || dk.is_err() {
                return false;
            }
            // A fixed-fill RNG so this check does not require an external RNG
            struct A5Rng();
            impl RngCore for A5Rng {
                fn next_u32(&mut self) -> u32 { unimplemented!() }

                fn next_u64(&mut self) -> u64 { unimplemented!() }

                fn fill_bytes(&mut self, _out: &mut [u8]) { unimplemented!() }

                fn try_fill_bytes(&mut self, out: &mut [u8]) -> Result<(), rand_core::Error> {
                    out.iter_mut().for_each(|b| *b = 0xa5);
                    Ok(())
                }
            }
            impl CryptoRng for A5Rng {}
            let mut a5rng = A5Rng {};
            // 4-6. encaps and decaps should run and agree
            let Ok((ssk1, ct)) = ek.unwrap().try_encaps_with_rng(&mut a5rng) else {
                return false;
            };
            let Ok(ssk2) = dk.unwrap().try_decaps(&ct) else {
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
            // The t_hat lanes must decode to integers modulo q without any
            // modular reduction; size is enforced by the array type.
            for i in 0..super::K {
                let _poly = poly::byte_decode(12, &ek[384 * i..384 * (i + 1)])?;
            }
            Ok(EncapsKey { 0: ek })
        }
    }


    impl SerDes for DecapsKey {
        type ByteArray = [u8; DK_LEN];

        fn into_bytes(self) -> Self::ByteArray { self.0 }

        fn try_from_bytes(dk: Self::ByteArray) -> Result<Self, &'static str> {
            // The embedded ek must itself be valid and match its cached hash.
            let ek = &dk[DK_PKE_LEN..DK_PKE_LEN + EK_LEN];
            let _res = EncapsKey::try_from_bytes(ek.try_into().map_err(|_| "Malformed encaps key")?)?;
            ensure!(
                crate::helpers::sha3_256(&[ek]) == dk[DK_PKE_LEN + EK_LEN..DK_PKE_LEN + EK_LEN + 32],
                "Encaps hash wrong"
            );
            Ok(DecapsKey { 0: dk })
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


    #[cfg(test)]
    mod tests {
        use super::*;
        use rand_chacha::rand_core::SeedableRng;

        #[test]
        fn smoke_test() {
            let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
            for _i in 0..50 {
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
            let mut bad = ct.clone().into_bytes();
            bad[17] ^= 0x20;
            let bad_ct = CipherText::try_from_bytes(bad).unwrap();
            let r1 = dk.try_decaps(&bad_ct).unwrap();
            let r2 = dk.try_decaps(&bad_ct).unwrap();
            assert!(r1 != ssk);
            assert_eq!(r1, r2);
        }
    }
}
