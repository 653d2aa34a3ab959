#[cfg(any(feature = "dilithium-iii", feature = "kyber-768"))]
use sha3::Shake128;
#[cfg(feature = "kyber-768")]
use sha3::Sha3_256;
#[cfg(any(feature = "kyber-768", feature = "ntru-s3"))]
use sha3::{Digest, Sha3_512};
use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::Shake256;


/// If the condition is not met, return an error message. Borrowed from the `anyhow` crate.
macro_rules! ensure {
    ($cond:expr, $msg:literal $(,)?) => {
        if !$cond {
            return Err($msg);
        }
    };
}

pub(crate) use ensure; // make available throughout crate


/// SHAKE128 over the concatenation of `parts`, returned as an XOF reader for
/// the rejection samplers to draw from.
#[cfg(any(feature = "dilithium-iii", feature = "kyber-768"))]
pub(crate) fn shake128_xof(parts: &[&[u8]]) -> impl XofReader {
    let mut hasher = Shake128::default();
    parts.iter().for_each(|p| hasher.update(p));
    hasher.finalize_xof()
}


/// SHAKE256 over the concatenation of `parts`, returned as an XOF reader.
#[cfg(any(
    feature = "dilithium-iii",
    feature = "sphincs-shake-128s",
    feature = "sphincs-shake-192s",
    feature = "sphincs-shake-256s"
))]
pub(crate) fn shake256_xof(parts: &[&[u8]]) -> impl XofReader {
    let mut hasher = Shake256::default();
    parts.iter().for_each(|p| hasher.update(p));
    hasher.finalize_xof()
}


/// One-shot SHAKE256 with a fixed output size. The multi-part signature
/// avoids concatenation buffers for inputs like `key ‖ µ` or `prefix ‖ e ‖ ct`.
#[cfg(any(
    feature = "dilithium-iii",
    feature = "kyber-768",
    feature = "ntru-s3",
    feature = "mceliece-6960-119",
    feature = "mceliece-8192-128"
))]
#[must_use]
pub(crate) fn shake256<const N: usize>(parts: &[&[u8]]) -> [u8; N] {
    let mut hasher = Shake256::default();
    parts.iter().for_each(|p| hasher.update(p));
    let mut reader = hasher.finalize_xof();
    let mut result = [0u8; N];
    reader.read(&mut result);
    result
}


/// SHAKE256 written into a caller-sized buffer; the hash-based signature
/// trees need output lengths that are not compile-time constants at the
/// call site.
#[cfg(any(
    feature = "sphincs-shake-128s",
    feature = "sphincs-shake-192s",
    feature = "sphincs-shake-256s"
))]
pub(crate) fn shake256_into(out: &mut [u8], parts: &[&[u8]]) {
    let mut hasher = Shake256::default();
    parts.iter().for_each(|p| hasher.update(p));
    let mut reader = hasher.finalize_xof();
    reader.read(out);
}


/// SHA3-256 over the concatenation of `parts`.
#[cfg(feature = "kyber-768")]
#[must_use]
pub(crate) fn sha3_256(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    parts.iter().for_each(|p| Digest::update(&mut hasher, p));
    hasher.finalize().into()
}


/// SHA3-512 over the concatenation of `parts`.
#[cfg(any(feature = "kyber-768", feature = "ntru-s3"))]
#[must_use]
pub(crate) fn sha3_512(parts: &[&[u8]]) -> [u8; 64] {
    let mut hasher = Sha3_512::new();
    parts.iter().for_each(|p| Digest::update(&mut hasher, p));
    hasher.finalize().into()
}
