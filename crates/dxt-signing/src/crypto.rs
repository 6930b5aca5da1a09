//! Signature primitive used by the signer and verifier.
//!
//! The protocol only fixes `SHA256withRSA` (RSASSA-PKCS1-v1_5 over SHA-256).
//! Signer and verifier are generic over these traits so the primitive can be
//! swapped out in tests or backed by an HSM.

use rsa::Pkcs1v15Sign;
use rsa::RsaPrivateKey;
use rsa::RsaPublicKey;
use sha2::Digest;
use sha2::Sha256;

use crate::error::SigningError;

/// Produces signatures over arbitrary messages.
pub trait PayloadSigner {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SigningError>;
}

/// Checks signatures over arbitrary messages.
pub trait PayloadVerifier {
    fn verify(&self, message: &[u8], signature: &[u8]) -> bool;
}

impl PayloadSigner for RsaPrivateKey {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SigningError> {
        let hashed = Sha256::digest(message);
        RsaPrivateKey::sign(self, Pkcs1v15Sign::new::<Sha256>(), &hashed)
            .map_err(|e| SigningError::SigningKeyInvalid(e.to_string()))
    }
}

impl PayloadVerifier for RsaPublicKey {
    fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        let hashed = Sha256::digest(message);
        RsaPublicKey::verify(self, Pkcs1v15Sign::new::<Sha256>(), &hashed, signature).is_ok()
    }
}

impl<T: PayloadSigner + ?Sized> PayloadSigner for &T {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SigningError> {
        (**self).sign(message)
    }
}

impl<T: PayloadVerifier + ?Sized> PayloadVerifier for &T {
    fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        (**self).verify(message, signature)
    }
}
