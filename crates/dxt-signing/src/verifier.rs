//! Archive signature verification.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::MANIFEST_PATH;
use crate::archive::Archive;
use crate::crypto::PayloadVerifier;
use crate::digest::compute_payload_digest;
use crate::digest::sha256_hex;
use crate::error::SigningError;
use crate::keys::TrustedKeys;
use crate::signature;
use crate::signature::SIGNATURE_ALGORITHM;

/// Knobs for [`verify_archive_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyOptions {
    /// Also require `signedPayload.manifestDigest` to match the current
    /// `manifest.json`. A missing manifest hashes as empty text, which is
    /// what older tooling recorded when signing manifest-less archives.
    pub check_manifest_digest: bool,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            check_manifest_digest: true,
        }
    }
}

/// Details of a signature that passed verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedSignature {
    /// Trusted key the archive was signed with.
    pub key_id: String,
    /// Signing time recorded in the signature (Unix seconds).
    pub timestamp: u64,
    /// Verified payload digest.
    pub digest: String,
}

/// Verify an archive against a set of trusted keys with default options.
pub fn verify_archive<A, K>(archive: &A, trusted: &TrustedKeys<K>) -> Result<VerifiedSignature, SigningError>
where
    A: Archive,
    K: PayloadVerifier,
{
    verify_archive_with(archive, trusted, &VerifyOptions::default())
}

/// Verify an archive against a set of trusted keys.
///
/// Steps, each failing with its own error:
/// 1. Extract `META-INF/dxt-signatures.json` and take its last record
/// 2. Recompute the payload digest and compare it with the signed one
/// 3. Optionally re-check the manifest digest
/// 4. Resolve the record's key id in `trusted`
/// 5. Verify the RSA signature over the digest text
pub fn verify_archive_with<A, K>(
    archive: &A,
    trusted: &TrustedKeys<K>,
    options: &VerifyOptions,
) -> Result<VerifiedSignature, SigningError>
where
    A: Archive,
    K: PayloadVerifier,
{
    // Step 1: Locate the authoritative record
    let file = signature::extract(archive)?;
    let record = file.latest()?;

    // Step 2: Check payload digest
    let actual = compute_payload_digest(archive);
    if actual != file.signed_payload.digest {
        return Err(SigningError::PayloadDigestMismatch {
            expected: file.signed_payload.digest.clone(),
            actual,
        });
    }

    // Step 3: Check manifest digest
    if options.check_manifest_digest {
        let manifest = archive.entry_text(MANIFEST_PATH).unwrap_or_default();
        let actual_manifest = sha256_hex(manifest.as_bytes());
        if actual_manifest != file.signed_payload.manifest_digest {
            return Err(SigningError::ManifestDigestMismatch {
                expected: file.signed_payload.manifest_digest.clone(),
                actual: actual_manifest,
            });
        }
    }

    // Step 4: Resolve the signing key
    let key = trusted.get(&record.signing_key_id).ok_or_else(|| {
        tracing::debug!(key_id = %record.signing_key_id, "signing key not in trust store");
        SigningError::UntrustedKey(record.signing_key_id.clone())
    })?;

    // Step 5: Verify the signature over the digest text
    if record.algorithm != SIGNATURE_ALGORITHM {
        return Err(SigningError::UnsupportedAlgorithm(record.algorithm.clone()));
    }
    let sig_bytes = STANDARD.decode(&record.signature).map_err(|e| {
        tracing::debug!(error = %e, "signature is not valid base64");
        SigningError::SignatureInvalid
    })?;
    if !key.verify(actual.as_bytes(), &sig_bytes) {
        return Err(SigningError::SignatureInvalid);
    }

    tracing::info!(key_id = %record.signing_key_id, digest = %actual, "archive signature valid");
    Ok(VerifiedSignature {
        key_id: record.signing_key_id.clone(),
        timestamp: record.timestamp,
        digest: actual,
    })
}
