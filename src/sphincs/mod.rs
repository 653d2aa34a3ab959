//! SPHINCS+ (SHAKE-256, simple, small variants): stateless hash-based
//! signatures over a depth-8 hypertree of height-8 subtrees.

mod address;
mod fors;
mod hashes;
mod merkle;
mod wots;

use alloc::vec;
use alloc::vec::Vec;
use rand_core::CryptoRngCore;
use self::address::{Adrs, ADDR_TYPE_HASHTREE, ADDR_TYPE_WOTS, ADDR_TYPE_WOTSPK};
use self::hashes::{gen_message_random, hash_message, thash};

/// Total hypertree height; `D_LAYERS` subtrees of `TREE_HEIGHT` each.
const FULL_HEIGHT: usize = 64;
const D_LAYERS: usize = 8;
const TREE_HEIGHT: usize = 8;


/// The per-variant knobs: hash size and FORS dimensions. Everything else
/// (w = 16, the hypertree shape) is common to the small parameter sets.
pub(crate) struct SpxParams {
    pub(crate) n: usize,
    pub(crate) fors_height: usize,
    pub(crate) fors_trees: usize,
}

impl SpxParams {
    pub(crate) const fn wots_len1(&self) -> usize { 2 * self.n }

    // floor(log2(len1 * 15) / 4) + 1 = 3 for every n in 9..=136
    pub(crate) const fn wots_len2(&self) -> usize { 3 }

    pub(crate) const fn wots_len(&self) -> usize { self.wots_len1() + self.wots_len2() }

    pub(crate) const fn wots_bytes(&self) -> usize { self.wots_len() * self.n }

    pub(crate) const fn fors_msg_bytes(&self) -> usize {
        (self.fors_height * self.fors_trees + 7) / 8
    }

    pub(crate) const fn fors_bytes(&self) -> usize {
        (self.fors_height + 1) * self.fors_trees * self.n
    }

    pub(crate) const fn tree_bits(&self) -> usize { TREE_HEIGHT * (D_LAYERS - 1) }

    pub(crate) const fn leaf_bits(&self) -> usize { TREE_HEIGHT }

    pub(crate) const fn sig_len(&self) -> usize {
        self.n + self.fors_bytes() + D_LAYERS * self.wots_bytes() + FULL_HEIGHT * self.n
    }

    pub(crate) const fn vk_len(&self) -> usize { 2 * self.n }

    pub(crate) const fn sk_len(&self) -> usize { 4 * self.n }
}

#[cfg(feature = "sphincs-shake-128s")]
pub(crate) const PARAMS_128S: SpxParams = SpxParams { n: 16, fors_height: 15, fors_trees: 10 };
#[cfg(feature = "sphincs-shake-192s")]
pub(crate) const PARAMS_192S: SpxParams = SpxParams { n: 24, fors_height: 16, fors_trees: 14 };
#[cfg(feature = "sphincs-shake-256s")]
pub(crate) const PARAMS_256S: SpxParams = SpxParams { n: 32, fors_height: 14, fors_trees: 22 };


/// One hypertree leaf: a full WOTS public key compressed under a WOTSPK tweak.
fn wots_gen_leaf(
    leaf: &mut [u8], sk_seed: &[u8], pub_seed: &[u8], addr_idx: u32, tree_adrs: &Adrs,
    params: &SpxParams,
) {
    let mut wots_adrs = Adrs::default();
    wots_adrs.copy_subtree(tree_adrs);
    wots_adrs.set_type(ADDR_TYPE_WOTS);
    wots_adrs.set_keypair(addr_idx);
    let mut pk_adrs = Adrs::default();
    pk_adrs.copy_keypair(&wots_adrs);
    pk_adrs.set_type(ADDR_TYPE_WOTSPK);

    let mut pk_buf = vec![0u8; params.wots_bytes()];
    wots::wots_gen_pk(&mut pk_buf, sk_seed, pub_seed, &mut wots_adrs, params);
    thash(leaf, pub_seed, &pk_adrs, &pk_buf);
}


/// Keygen: sk = sk_seed ‖ sk_prf ‖ pub_seed ‖ root, pk = pub_seed ‖ root.
/// The root is the top-layer subtree over the WOTS leaves.
fn keygen(
    rng: &mut impl CryptoRngCore, vk: &mut [u8], sk: &mut [u8], params: &SpxParams,
) -> Result<(), &'static str> {
    let n = params.n;
    rng.try_fill_bytes(&mut sk[..3 * n])
        .map_err(|_| "Keygen: random number generator failed")?;
    let (seeds, root_out) = sk.split_at_mut(3 * n);
    let (sk_seed, rest) = seeds.split_at(n);
    let pub_seed = &rest[n..];

    let mut top_adrs = Adrs::default();
    top_adrs.set_layer(u32::try_from(D_LAYERS - 1).expect("layer"));
    top_adrs.set_type(ADDR_TYPE_HASHTREE);
    let mut auth_scratch = vec![0u8; TREE_HEIGHT * n];
    let gen = |out: &mut [u8], idx: u32, adrs: &mut Adrs| {
        wots_gen_leaf(out, sk_seed, pub_seed, idx, adrs, params);
    };
    merkle::treehash(
        root_out,
        &mut auth_scratch,
        0,
        0,
        u32::try_from(TREE_HEIGHT).expect("height"),
        gen,
        pub_seed,
        &mut top_adrs,
        n,
    );

    vk[..n].copy_from_slice(pub_seed);
    vk[n..].copy_from_slice(root_out);
    Ok(())
}


/// Deterministic signing: `signed = R ‖ FORS ‖ D x (WOTS ‖ auth) ‖ message`.
fn sign(sk: &[u8], message: &[u8], params: &SpxParams) -> Result<Vec<u8>, &'static str> {
    let n = params.n;
    let sk_seed = &sk[..n];
    let sk_prf = &sk[n..2 * n];
    let pub_seed = &sk[2 * n..3 * n];
    let pk = &sk[2 * n..4 * n]; // pub_seed ‖ root

    let sig_len = params.sig_len();
    let mut signed = vec![0u8; sig_len + message.len()];
    signed[sig_len..].copy_from_slice(message);

    // randomizer pinned to a deterministic derivation
    let opt = vec![0u8; n];
    {
        let (r_out, _) = signed.split_at_mut(n);
        gen_message_random(r_out, sk_prf, &opt, message);
    }
    let (digest, mut tree, mut idx_leaf) = hash_message(&signed[..n], pk, message, params);

    let mut wots_adrs = Adrs::default();
    wots_adrs.set_type(ADDR_TYPE_WOTS);
    let mut tree_adrs = Adrs::default();
    tree_adrs.set_type(ADDR_TYPE_HASHTREE);

    wots_adrs.set_tree(tree);
    wots_adrs.set_keypair(idx_leaf);

    let mut off = n;
    let mut root = vec![0u8; n];
    fors::fors_sign(
        &mut signed[off..off + params.fors_bytes()],
        &mut root,
        &digest,
        sk_seed,
        pub_seed,
        &wots_adrs,
        params,
    );
    off += params.fors_bytes();

    for layer in 0..D_LAYERS {
        tree_adrs.set_layer(u32::try_from(layer).expect("layer"));
        tree_adrs.set_tree(tree);
        wots_adrs.copy_subtree(&tree_adrs);
        wots_adrs.set_keypair(idx_leaf);

        wots::wots_sign(
            &mut signed[off..off + params.wots_bytes()],
            &root,
            sk_seed,
            pub_seed,
            &mut wots_adrs,
            params,
        );
        off += params.wots_bytes();

        let gen = |out: &mut [u8], idx: u32, adrs: &mut Adrs| {
            wots_gen_leaf(out, sk_seed, pub_seed, idx, adrs, params);
        };
        let (root_ref, auth) = (&mut root, &mut signed[off..off + TREE_HEIGHT * n]);
        merkle::treehash(
            root_ref,
            auth,
            idx_leaf,
            0,
            u32::try_from(TREE_HEIGHT).expect("height"),
            gen,
            pub_seed,
            &mut tree_adrs,
            n,
        );
        off += TREE_HEIGHT * n;

        idx_leaf = u32::try_from(tree & ((1 << TREE_HEIGHT) - 1)).expect("leaf index");
        tree >>= TREE_HEIGHT;
    }
    Ok(signed)
}


/// Verifies `signature ‖ message` and returns the message on success.
fn verify(vk: &[u8], signed: &[u8], params: &SpxParams) -> Result<Vec<u8>, &'static str> {
    let n = params.n;
    let sig_len = params.sig_len();
    crate::helpers::ensure!(signed.len() >= sig_len, "Verify: signed message too short");
    let message = &signed[sig_len..];
    let pub_seed = &vk[..n];
    let pk_root = &vk[n..];

    let (digest, mut tree, mut idx_leaf) = hash_message(&signed[..n], vk, message, params);

    let mut wots_adrs = Adrs::default();
    wots_adrs.set_type(ADDR_TYPE_WOTS);
    let mut tree_adrs = Adrs::default();
    tree_adrs.set_type(ADDR_TYPE_HASHTREE);
    let mut wots_pk_adrs = Adrs::default();
    wots_pk_adrs.set_type(ADDR_TYPE_WOTSPK);

    wots_adrs.set_tree(tree);
    wots_adrs.set_keypair(idx_leaf);

    let mut off = n;
    let mut root = vec![0u8; n];
    fors::fors_pk_from_sig(
        &mut root,
        &signed[off..off + params.fors_bytes()],
        &digest,
        pub_seed,
        &wots_adrs,
        params,
    );
    off += params.fors_bytes();

    let mut wots_pk = vec![0u8; params.wots_bytes()];
    let mut leaf = vec![0u8; n];
    for layer in 0..D_LAYERS {
        tree_adrs.set_layer(u32::try_from(layer).expect("layer"));
        tree_adrs.set_tree(tree);
        wots_adrs.copy_subtree(&tree_adrs);
        wots_adrs.set_keypair(idx_leaf);
        wots_pk_adrs.copy_keypair(&wots_adrs);

        wots::wots_pk_from_sig(
            &mut wots_pk,
            &signed[off..off + params.wots_bytes()],
            &root,
            pub_seed,
            &mut wots_adrs,
            params,
        );
        off += params.wots_bytes();
        thash(&mut leaf, pub_seed, &wots_pk_adrs, &wots_pk);

        merkle::compute_root(
            &mut root,
            &leaf,
            idx_leaf,
            0,
            &signed[off..off + TREE_HEIGHT * n],
            u32::try_from(TREE_HEIGHT).expect("height"),
            pub_seed,
            &mut tree_adrs,
        );
        off += TREE_HEIGHT * n;

        idx_leaf = u32::try_from(tree & ((1 << TREE_HEIGHT) - 1)).expect("leaf index");
        tree >>= TREE_HEIGHT;
    }

    crate::helpers::ensure!(root == pk_root, "Verify: root mismatch");
    Ok(message.to_vec())
}


// This common functionality is injected into each parameter set module
macro_rules! functionality {
    ($params:path) => {
        use crate::traits::{SerDes, SigGen, Signer, Verifier};
        use alloc::vec::Vec;
        use rand_core::CryptoRngCore;

        /// Serialized verifying (public) key length (in bytes)
        pub const VK_LEN: usize = $params.vk_len();
        /// Serialized signing (private) key length (in bytes)
        pub const SK_LEN: usize = $params.sk_len();
        /// Detached signature length (in bytes); a signed message adds the message length
        pub const SIG_LEN: usize = $params.sig_len();

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
                super::keygen(rng, &mut vk, &mut sk, &$params)?;
                Ok((VerifyingKey { 0: vk }, SigningKey { 0: sk }))
            }
        }


        impl Signer for SigningKey {
            fn try_sign(&self, message: &[u8]) -> Result<Vec<u8>, &'static str> {
                super::sign(&self.0, message, &$params)
            }
        }


        impl Verifier for VerifyingKey {
            fn try_open(&self, signed_message: &[u8]) -> Result<Vec<u8>, &'static str> {
                super::verify(&self.0, signed_message, &$params)
            }
        }


        impl SerDes for VerifyingKey {
            type ByteArray = [u8; VK_LEN];

            fn into_bytes(self) -> Self::ByteArray { self.0 }

            fn try_from_bytes(vk: Self::ByteArray) -> Result<Self, &'static str> {
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
    };
}


/// Functionality for the SPHINCS+-SHAKE-128s parameter set: 32-byte public
/// keys, 64-byte signing keys, 8080-byte signatures.
#[cfg(feature = "sphincs-shake-128s")]
pub mod sphincs_shake_128s {
    //!
    //! Typical usage flow entails:
    //! 1. The signer runs `try_keygen()` for a (tiny) verifying key and signing key.
    //! 2. `sk.try_sign(msg)` walks the hypertree and emits `signature ‖ message`.
    //! 3. Any holder of the verifying key runs `try_open(..)` to authenticate.
    //!
    //! Signing is deterministic; the same key and message give identical bytes.
    //!
    //! **--> See [`crate::traits`] for the keygen, signing, verification, and serialization functionality.**

    use super::PARAMS_128S;

    functionality!(PARAMS_128S);

    #[cfg(test)]
    mod tests {
        use super::*;
        use rand_chacha::rand_core::SeedableRng;

        #[test]
        fn smoke_test() {
            let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
            let (vk, sk) = KG::try_keygen_with_rng(&mut rng).unwrap();
            let signed = sk.try_sign(b"few-time trees, one-time chains").unwrap();
            assert_eq!(signed.len(), SIG_LEN + 31);
            let opened = vk.try_open(&signed).unwrap();
            assert_eq!(opened, b"few-time trees, one-time chains");

            // deterministic signing
            let again = sk.try_sign(b"few-time trees, one-time chains").unwrap();
            assert_eq!(signed, again);
        }

        #[test]
        fn tampered_signatures_reject() {
            let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(456);
            let (vk, sk) = KG::try_keygen_with_rng(&mut rng).unwrap();
            let signed = sk.try_sign(b"x").unwrap();
            for i in [0, SIG_LEN / 3, SIG_LEN - 1, SIG_LEN] {
                let mut bad = signed.clone();
                bad[i] ^= 0x80;
                assert!(vk.try_open(&bad).is_err());
            }
        }
    }
}


/// Functionality for the SPHINCS+-SHAKE-192s parameter set: 48-byte public
/// keys, 96-byte signing keys, 17064-byte signatures.
#[cfg(feature = "sphincs-shake-192s")]
pub mod sphincs_shake_192s {
    //!
    //! See the sibling [`super::sphincs_shake_128s`] module for the usage flow.
    //!
    //! **--> See [`crate::traits`] for the keygen, signing, verification, and serialization functionality.**

    use super::PARAMS_192S;

    functionality!(PARAMS_192S);

    #[cfg(test)]
    mod tests {
        use super::*;
        use rand_chacha::rand_core::SeedableRng;

        // $ cargo test -- --ignored
        #[ignore] // tree walks are slow in debug builds
        #[test]
        fn smoke_test() {
            let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(789);
            let (vk, sk) = KG::try_keygen_with_rng(&mut rng).unwrap();
            let signed = sk.try_sign(b"abc").unwrap();
            assert_eq!(vk.try_open(&signed).unwrap(), b"abc");
        }
    }
}


/// Functionality for the SPHINCS+-SHAKE-256s parameter set: 64-byte public
/// keys, 128-byte signing keys, 29792-byte signatures.
#[cfg(feature = "sphincs-shake-256s")]
pub mod sphincs_shake_256s {
    //!
    //! See the sibling [`super::sphincs_shake_128s`] module for the usage flow.
    //!
    //! **--> See [`crate::traits`] for the keygen, signing, verification, and serialization functionality.**

    use super::PARAMS_256S;

    functionality!(PARAMS_256S);

    #[cfg(test)]
    mod tests {
        use super::*;
        use rand_chacha::rand_core::SeedableRng;

        // $ cargo test -- --ignored
        #[ignore] // tree walks are slow in debug builds
        #[test]
        fn smoke_test() {
            let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(321);
            let (vk, sk) = KG::try_keygen_with_rng(&mut rng).unwrap();
            let signed = sk.try_sign(b"abc").unwrap();
            assert_eq!(vk.try_open(&signed).unwrap(), b"abc");
        }
    }
}
