#![no_std]
#![deny(clippy::pedantic, warnings, missing_docs, unsafe_code)]
// Most of the 'allow' category...
#![deny(absolute_paths_not_starting_with_crate, dead_code)]
#![deny(elided_lifetimes_in_paths, explicit_outlives_requirements, keyword_idents)]
#![deny(let_underscore_drop, macro_use_extern_crate, meta_variable_misuse, missing_abi)]
#![deny(non_ascii_idents, rust_2021_incompatible_closure_captures)]
#![deny(rust_2021_incompatible_or_patterns, rust_2021_prefixes_incompatible_syntax)]
#![deny(rust_2021_prelude_collisions, single_use_lifetimes, trivial_casts)]
#![deny(trivial_numeric_casts, unreachable_pub, unsafe_op_in_unsafe_fn, unstable_features)]
#![deny(unused_extern_crates, unused_import_braces, unused_lifetimes, unused_macro_rules)]
#![deny(unused_qualifications, unused_results, variant_size_differences)]
//
#![doc = include_str!("../README.md")]

// Five schemes, one sponge. The scheme modules are independent of each other
// by construction: the only shared machinery is the Keccak family (helpers.rs)
// and the byte-array key types (types.rs). Parameter sets are cargo features,
// and each parameter-set module wires the scheme internals to the public
// traits via an injected macro, so consumers can hold trait objects across
// security levels.
//
// The arithmetic layers are written to be constant-time with respect to
// secret data: no secret-dependent branches, no secret indexing, masked
// selects via `subtle` where a conditional write depends on a secret. The
// rejection samplers branch only on data that crosses the trust boundary in
// the clear (public seeds, hash outputs destined for the wire).
//
// The ensure!() instances are for validation purposes and cannot be turned
// off. The debug_assert!() instances guard internal size contracts and are
// removed in release builds.

/// The `rand_core` types are re-exported so that users of pqcore do not
/// have to worry about using the exact correct version of `rand_core`.
pub use rand_core::{CryptoRng, Error as RngError, RngCore};

extern crate alloc;

use crate::traits::SerDes;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

mod helpers;
mod types;

#[cfg(feature = "dilithium-iii")]
mod dilithium;
#[cfg(feature = "kyber-768")]
mod kyber;
#[cfg(any(feature = "mceliece-6960-119", feature = "mceliece-8192-128"))]
mod mceliece;
#[cfg(feature = "ntru-s3")]
mod ntruprime;
#[cfg(any(
    feature = "sphincs-shake-128s",
    feature = "sphincs-shake-192s",
    feature = "sphincs-shake-256s"
))]
mod sphincs;

/// All functionality is covered by traits, such that consumers can utilize trait objects if desired.
pub mod traits;

#[cfg(feature = "dilithium-iii")]
pub use dilithium::dilithium_iii;
#[cfg(feature = "kyber-768")]
pub use kyber::kyber_768;
#[cfg(feature = "mceliece-6960-119")]
pub use mceliece::mceliece_6960_119;
#[cfg(feature = "mceliece-8192-128")]
pub use mceliece::mceliece_8192_128;
#[cfg(feature = "ntru-s3")]
pub use ntruprime::ntru_s3;
#[cfg(feature = "sphincs-shake-128s")]
pub use sphincs::sphincs_shake_128s;
#[cfg(feature = "sphincs-shake-192s")]
pub use sphincs::sphincs_shake_192s;
#[cfg(feature = "sphincs-shake-256s")]
pub use sphincs::sphincs_shake_256s;


/// Shared Secret Key length for all KEM variants (in bytes)
pub const SSK_LEN: usize = 32;

/// The (opaque) shared secret that can be de/serialized by each party.
#[derive(Clone, Debug, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecretKey([u8; SSK_LEN]);


impl SerDes for SharedSecretKey {
    type ByteArray = [u8; SSK_LEN];

    fn into_bytes(self) -> Self::ByteArray { self.0 }

    fn try_from_bytes(ssk: Self::ByteArray) -> Result<Self, &'static str> {
        // The `try_` is not really needed but implemented for symmetry/consistency, e.g., there
        // is no opportunity for validation (yet), but using a Result for the future possibility
        Ok(SharedSecretKey(ssk))
    }
}


// Conservative (constant-time) support...
impl PartialEq for SharedSecretKey {
    fn eq(&self, other: &Self) -> bool { bool::from(self.0.ct_eq(&other.0)) }
}
