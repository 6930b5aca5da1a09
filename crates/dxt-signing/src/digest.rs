//! Payload and manifest digests.
//!
//! The payload digest is `SHA-256` over the raw bytes of every entry except
//! the signature file, concatenated in the archive's native order with no
//! framing. It is therefore sensitive to entry order: the same files stored
//! in a different physical order hash differently. This matches archives
//! signed by earlier DXT tooling and must not be changed without bumping
//! `dxtVersion`.

use sha2::Digest;
use sha2::Sha256;

use crate::MANIFEST_PATH;
use crate::SIGNATURE_PATH;
use crate::archive::Archive;
use crate::error::SigningError;

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Compute the payload digest of `archive`, skipping the signature entry.
pub fn compute_payload_digest<A: Archive>(archive: &A) -> String {
    let mut hasher = Sha256::new();
    let mut hashed = 0usize;
    for (name, bytes) in archive.entries() {
        if name == SIGNATURE_PATH {
            continue;
        }
        hasher.update(bytes);
        hashed += 1;
    }
    let digest = hex::encode(hasher.finalize());
    tracing::debug!(entries = hashed, %digest, "computed payload digest");
    digest
}

/// SHA-256 of the manifest's text content.
pub fn manifest_digest<A: Archive>(archive: &A) -> Result<String, SigningError> {
    let text = archive.entry_text(MANIFEST_PATH).ok_or(SigningError::ManifestMissing)?;
    Ok(sha256_hex(text.as_bytes()))
}
