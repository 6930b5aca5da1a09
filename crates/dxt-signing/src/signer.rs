//! Archive signing using SHA-256 + RSA.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::SIGNATURE_PATH;
use crate::archive::Archive;
use crate::crypto::PayloadSigner;
use crate::digest::compute_payload_digest;
use crate::digest::manifest_digest;
use crate::error::SigningError;
use crate::signature;
use crate::signature::RECORD_VERSION;
use crate::signature::SIGNATURE_ALGORITHM;
use crate::signature::SignatureFile;
use crate::signature::SignatureRecord;
use crate::signature::SignedPayload;

/// Sign an archive.
///
/// Computes the payload digest (ignoring any existing signature entry),
/// signs its hex text with `signer` and returns a copy of `archive` carrying
/// a fresh `META-INF/dxt-signatures.json`. Any previous signature file is
/// replaced, not appended to. `archive` itself is left untouched.
pub fn sign_archive<A, S>(archive: &A, signer: &S, key_id: &str) -> Result<(A, SignatureFile), SigningError>
where
    A: Archive + Clone,
    S: PayloadSigner + ?Sized,
{
    let now = std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).unwrap_or_default().as_secs();
    sign_archive_at(archive, signer, key_id, now)
}

/// [`sign_archive`] with an explicit signing time (Unix seconds).
pub fn sign_archive_at<A, S>(
    archive: &A,
    signer: &S,
    key_id: &str,
    timestamp: u64,
) -> Result<(A, SignatureFile), SigningError>
where
    A: Archive + Clone,
    S: PayloadSigner + ?Sized,
{
    let digest = compute_payload_digest(archive);
    let manifest_digest = manifest_digest(archive)?;

    let signature_bytes = signer.sign(digest.as_bytes())?;

    let record = SignatureRecord {
        version: RECORD_VERSION,
        signing_key_id: key_id.to_string(),
        algorithm: SIGNATURE_ALGORITHM.to_string(),
        signature: STANDARD.encode(signature_bytes),
        certificate: String::new(),
        timestamp,
    };
    let file = SignatureFile {
        signatures: vec![record],
        signed_payload: SignedPayload::new(digest, manifest_digest),
    };

    let mut signed = archive.clone();
    signed.put_entry(SIGNATURE_PATH, signature::serialize(&file)?);

    tracing::info!(key_id, digest = %file.signed_payload.digest, "signed archive");
    Ok((signed, file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MANIFEST_PATH;
    use crate::archive::DxtArchive;
    use crate::digest::sha256_hex;
    use crate::keys::other_test_key;
    use crate::keys::test_key;

    fn fixture() -> DxtArchive {
        DxtArchive::new().with_entry(MANIFEST_PATH, "{}").with_entry("payload.bin", vec![0x01, 0x02, 0x03])
    }

    struct FailingSigner;

    impl PayloadSigner for FailingSigner {
        fn sign(&self, _message: &[u8]) -> Result<Vec<u8>, SigningError> {
            Err(SigningError::SigningKeyInvalid("key is locked".into()))
        }
    }

    #[test]
    fn sign_fills_payload_fields() {
        let (_, file) = sign_archive_at(&fixture(), test_key(), "k1", 1_700_000_000).unwrap();

        assert_eq!(file.signed_payload.digest, sha256_hex(b"{}\x01\x02\x03"));
        assert_eq!(file.signed_payload.manifest_digest, sha256_hex(b"{}"));
        assert_eq!(file.signed_payload.digest_algorithm, "SHA-256");
        assert_eq!(file.signed_payload.dxt_version, "1.0.0");

        let record = file.latest().unwrap();
        assert_eq!(record.version, 1);
        assert_eq!(record.signing_key_id, "k1");
        assert_eq!(record.algorithm, "SHA256withRSA");
        assert_eq!(record.certificate, "");
        assert_eq!(record.timestamp, 1_700_000_000);
        assert!(STANDARD.decode(&record.signature).is_ok());
    }

    #[test]
    fn sign_embeds_signature_file() {
        let (signed, file) = sign_archive(&fixture(), test_key(), "k1").unwrap();
        assert_eq!(signature::extract(&signed).unwrap(), file);
        assert_eq!(signed.names().last(), Some(SIGNATURE_PATH));
    }

    #[test]
    fn sign_uses_current_time() {
        let before = std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).unwrap().as_secs();
        let (_, file) = sign_archive(&fixture(), test_key(), "k1").unwrap();
        assert!(file.latest().unwrap().timestamp >= before);
    }

    #[test]
    fn sign_leaves_source_untouched() {
        let source = fixture();
        let (signed, _) = sign_archive(&source, test_key(), "k1").unwrap();
        assert_eq!(source, fixture());
        assert_ne!(signed, source);
    }

    #[test]
    fn sign_requires_manifest() {
        let archive = DxtArchive::new().with_entry("payload.bin", vec![1]);
        let err = sign_archive(&archive, test_key(), "k1").unwrap_err();
        assert!(matches!(err, SigningError::ManifestMissing));
    }

    #[test]
    fn signer_failure_propagates() {
        let err = sign_archive(&fixture(), &FailingSigner, "k1").unwrap_err();
        assert!(matches!(err, SigningError::SigningKeyInvalid(_)));
    }

    #[test]
    fn resigning_replaces_signature_file() {
        let (first, first_file) = sign_archive(&fixture(), test_key(), "k1").unwrap();
        let (second, second_file) = sign_archive(&first, other_test_key(), "k2").unwrap();

        assert_eq!(second_file.signatures.len(), 1);
        assert_eq!(second_file.latest().unwrap().signing_key_id, "k2");
        // The old signature entry is not part of the digest.
        assert_eq!(first_file.signed_payload.digest, second_file.signed_payload.digest);
        // Replaced in place rather than duplicated.
        assert_eq!(second.len(), first.len());
    }
}
