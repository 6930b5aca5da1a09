//! RSA signing and verification for DXT archives.
//!
//! A DXT archive is a zip holding `manifest.json` plus arbitrary payload
//! entries. Signing computes `SHA-256` over the concatenated bytes of every
//! entry except `META-INF/dxt-signatures.json`, signs the hex digest text
//! with `SHA256withRSA` and stores a [`SignatureFile`] at that path.
//!
//! # Signing
//!
//! ```no_run
//! use std::path::Path;
//!
//! use dxt_signing::{DxtArchive, keys, signer};
//!
//! let key = keys::load_private_key(Path::new("release.pem"))?;
//! let archive = DxtArchive::open(Path::new("extension.dxt"))?;
//! let (signed, _) = signer::sign_archive(&archive, &key, "release-2024")?;
//! signed.save(Path::new("extension.signed.dxt"))?;
//! # Ok::<(), dxt_signing::SigningError>(())
//! ```
//!
//! # Verification
//!
//! Verification is a chain of guards; the first failing one determines the
//! returned [`SigningError`]. Trust is decided by the caller-supplied
//! [`TrustedKeys`] map, keyed by the `signingKeyId` of the last signature
//! record. [`keys::TrustStore`] persists such a map at
//! `~/.config/dxt/trusted-keys.json`.
//!
//! ```no_run
//! use std::path::Path;
//!
//! use dxt_signing::{DxtArchive, TrustedKeys, keys, verifier};
//!
//! let trusted = TrustedKeys::new().with_key("release-2024", keys::load_public_key(Path::new("release.pub.pem"))?);
//! let archive = DxtArchive::open(Path::new("extension.signed.dxt"))?;
//! verifier::verify_archive(&archive, &trusted)?;
//! # Ok::<(), dxt_signing::SigningError>(())
//! ```

pub mod archive;
pub mod crypto;
pub mod digest;
pub mod error;
pub mod keys;
pub mod signature;
pub mod signer;
pub mod verifier;

pub use archive::Archive;
pub use archive::DxtArchive;
pub use error::SigningError;
pub use keys::TrustedKeys;
pub use signature::SignatureFile;
pub use verifier::VerifiedSignature;
pub use verifier::VerifyOptions;

/// Path of the manifest entry.
pub const MANIFEST_PATH: &str = "manifest.json";

/// Reserved path of the signature file; never part of the payload digest.
pub const SIGNATURE_PATH: &str = "META-INF/dxt-signatures.json";
