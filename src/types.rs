use zeroize::{Zeroize, ZeroizeOnDrop};


/// Correctly sized encapsulation key specific to the target security parameter set.
#[cfg(any(feature = "kyber-768", feature = "ntru-s3"))]
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
#[repr(align(8))]
pub struct EncapsKey<const EK_LEN: usize>(pub(crate) [u8; EK_LEN]);


/// Correctly sized decapsulation key specific to the target security parameter set.
#[cfg(any(feature = "kyber-768", feature = "ntru-s3"))]
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
#[repr(align(8))]
pub struct DecapsKey<const DK_LEN: usize>(pub(crate) [u8; DK_LEN]);


/// Correctly sized ciphertext specific to the target security parameter set.
#[cfg(any(
    feature = "kyber-768",
    feature = "ntru-s3",
    feature = "mceliece-6960-119",
    feature = "mceliece-8192-128"
))]
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
#[repr(align(8))]
pub struct CipherText<const CT_LEN: usize>(pub(crate) [u8; CT_LEN]);


/// Correctly sized public verification key specific to the target security parameter set.
#[cfg(any(
    feature = "dilithium-iii",
    feature = "sphincs-shake-128s",
    feature = "sphincs-shake-192s",
    feature = "sphincs-shake-256s"
))]
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
#[repr(align(8))]
pub struct VerifyingKey<const VK_LEN: usize>(pub(crate) [u8; VK_LEN]);


/// Correctly sized private signing key specific to the target security parameter set.
#[cfg(any(
    feature = "dilithium-iii",
    feature = "sphincs-shake-128s",
    feature = "sphincs-shake-192s",
    feature = "sphincs-shake-256s"
))]
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
#[repr(align(8))]
pub struct SigningKey<const SK_LEN: usize>(pub(crate) [u8; SK_LEN]);
