use alloc::vec::Vec;
use rand_core::CryptoRngCore;

#[cfg(feature = "default-rng")]
use rand_core::OsRng;


/// The `KeyGen` trait covers keypair generation for the KEM schemes and is
/// defined to allow trait objects.
pub trait KeyGen {
    /// The (public) encapsulation key sent from the originator to the remote party.
    type EncapsKey;
    /// The (private) decapsulation key used by the originator to generate the shared secret.
    type DecapsKey;
    /// A serialized (public) encapsulation key of the correct length
    type EncapsByteArray;
    /// A serialized (private) decapsulation key of the correct length
    type DecapsByteArray;


    /// Generates an encapsulation and decapsulation key pair specific to this security
    /// parameter set, using the OS default random number generator.
    /// # Errors
    /// Returns an error when the random number generator fails or the scheme exhausts
    /// its internal retry budget (`McEliece`, `NTRU Prime`).
    /// # Examples
    /// ```rust
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use pqcore::kyber_768;
    /// use pqcore::traits::{Decaps, Encaps, KeyGen, SerDes};
    ///
    /// let (ek, dk) = kyber_768::KG::try_keygen()?;   // Party 1 generates both keys
    /// let ek_bytes = ek.into_bytes();                // ...and sends the encaps key
    ///
    /// let ek2 = kyber_768::EncapsKey::try_from_bytes(ek_bytes)?;
    /// let (ssk2, ct) = ek2.try_encaps()?;            // Party 2 encapsulates
    ///
    /// let ssk1 = dk.try_decaps(&ct)?;                // Party 1 decapsulates
    /// assert_eq!(ssk1, ssk2);
    /// # Ok(())}
    /// ```
    #[cfg(feature = "default-rng")]
    fn try_keygen() -> Result<(Self::EncapsKey, Self::DecapsKey), &'static str> {
        Self::try_keygen_with_rng(&mut OsRng)
    }


    /// Generates an encapsulation and decapsulation key pair specific to this security
    /// parameter set, using a provided random number generator.
    /// # Errors
    /// Returns an error when the random number generator fails or the scheme exhausts
    /// its internal retry budget (`McEliece`, `NTRU Prime`).
    fn try_keygen_with_rng(
        rng: &mut impl CryptoRngCore,
    ) -> Result<(Self::EncapsKey, Self::DecapsKey), &'static str>;


    /// Performs validation between an encapsulation key and a decapsulation key (both as
    /// byte arrays), perhaps in the scenario where both have been serialized, stored to
    /// disk, and then retrieved. This function is not intended to operate in constant-time.
    fn validate_keypair_vartime(ek: &Self::EncapsByteArray, dk: &Self::DecapsByteArray) -> bool;
}


/// The `Encaps` trait uses the encapsulation key to generate the ciphertext and shared secret.
pub trait Encaps {
    /// The common shared secret
    type SharedSecretKey;
    /// The ciphertext transmitted from the remote party to the originator.
    type CipherText;


    /// Generates a shared secret and ciphertext from an encapsulation key specific to this
    /// security parameter set, using the OS default random number generator.
    /// # Errors
    /// Returns an error when the random number generator fails or an internal error
    /// condition arises.
    #[cfg(feature = "default-rng")]
    fn try_encaps(&self) -> Result<(Self::SharedSecretKey, Self::CipherText), &'static str> {
        self.try_encaps_with_rng(&mut OsRng)
    }


    /// Generates a shared secret and ciphertext from an encapsulation key specific to this
    /// security parameter set, using a provided random number generator. This function is
    /// intended to operate in constant time.
    /// # Errors
    /// Returns an error when the random number generator fails or an internal error
    /// condition arises.
    fn try_encaps_with_rng(
        &self, rng: &mut impl CryptoRngCore,
    ) -> Result<(Self::SharedSecretKey, Self::CipherText), &'static str>;
}


/// The `Decaps` trait uses the decapsulation key and ciphertext to generate the shared secret.
pub trait Decaps {
    /// Ciphertext struct
    type CipherText;
    /// Shared secret struct
    type SharedSecretKey;


    /// Generates a shared secret from a decapsulation key and ciphertext specific to this
    /// security parameter set. This function is intended to operate in constant-time; a
    /// malformed ciphertext yields a deterministic pseudorandom secret rather than an error
    /// (implicit rejection).
    /// # Errors
    /// Returns an error only on an internal error condition; never because of ciphertext
    /// contents.
    fn try_decaps(&self, ct: &Self::CipherText) -> Result<Self::SharedSecretKey, &'static str>;
}


/// The `SigGen` trait covers keypair generation for the signature schemes and is
/// defined to allow trait objects.
pub trait SigGen {
    /// The (public) verification key distributed to any verifying party.
    type VerifyingKey;
    /// The (private) signing key retained by the signer.
    type SigningKey;
    /// A serialized (public) verification key of the correct length
    type VerifyingByteArray;
    /// A serialized (private) signing key of the correct length
    type SigningByteArray;


    /// Generates a signing and verification key pair specific to this security parameter
    /// set, using the OS default random number generator.
    /// # Errors
    /// Returns an error when the random number generator fails.
    /// # Examples
    /// ```rust
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use pqcore::dilithium_iii;
    /// use pqcore::traits::{SigGen, Signer, Verifier};
    ///
    /// let (vk, sk) = dilithium_iii::KG::try_keygen()?;
    /// let signed = sk.try_sign(b"sample message")?;  // signature ‖ message
    /// let msg = vk.try_open(&signed)?;               // recovered on success
    /// assert_eq!(msg, b"sample message");
    /// # Ok(())}
    /// ```
    #[cfg(feature = "default-rng")]
    fn try_keygen() -> Result<(Self::VerifyingKey, Self::SigningKey), &'static str> {
        Self::try_keygen_with_rng(&mut OsRng)
    }


    /// Generates a signing and verification key pair specific to this security parameter
    /// set, using a provided random number generator.
    /// # Errors
    /// Returns an error when the random number generator fails.
    fn try_keygen_with_rng(
        rng: &mut impl CryptoRngCore,
    ) -> Result<(Self::VerifyingKey, Self::SigningKey), &'static str>;
}


/// The `Signer` trait produces signatures over caller messages. Signing is
/// deterministic for every scheme in this crate: the same key and message
/// always produce the same bytes.
pub trait Signer {
    /// Signs a message, returning `signature ‖ message` (the historic NIST
    /// sign/open envelope).
    /// # Errors
    /// Returns an error when the scheme exhausts its internal rejection budget.
    fn try_sign(&self, message: &[u8]) -> Result<Vec<u8>, &'static str>;
}


/// The `Verifier` trait checks a `signature ‖ message` envelope against a
/// verification key.
pub trait Verifier {
    /// Verifies a signed message and, on success, returns the message portion.
    /// On failure no information beyond the rejection itself is disclosed.
    /// # Errors
    /// Returns a rejection error for any malformed or forged input.
    fn try_open(&self, signed_message: &[u8]) -> Result<Vec<u8>, &'static str>;
}


/// Serialization and Deserialization of structs
pub trait SerDes {
    /// Correctly sized byte array for struct
    type ByteArray;


    /// Produces a byte array of fixed-size specific to the struct being serialized.
    fn into_bytes(self) -> Self::ByteArray;


    /// Consumes a byte array of fixed-size specific to the struct being deserialized;
    /// performs validation.
    /// # Errors
    /// Returns an error on malformed input.
    fn try_from_bytes(ba: Self::ByteArray) -> Result<Self, &'static str>
    where
        Self: Sized;
}
