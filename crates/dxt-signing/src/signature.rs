//! Signature file stored at `META-INF/dxt-signatures.json`.

use serde::Deserialize;
use serde::Serialize;

use crate::SIGNATURE_PATH;
use crate::archive::Archive;
use crate::error::SigningError;

/// Digest algorithm label written to [`SignedPayload::digest_algorithm`].
pub const DIGEST_ALGORITHM: &str = "SHA-256";

/// Signature algorithm label written to [`SignatureRecord::algorithm`].
pub const SIGNATURE_ALGORITHM: &str = "SHA256withRSA";

/// DXT format version written to [`SignedPayload::dxt_version`].
pub const DXT_VERSION: &str = "1.0.0";

/// Shape version of [`SignatureRecord`].
pub const RECORD_VERSION: u32 = 1;

/// One signature over the payload digest.
///
/// The signed message is the UTF-8 text of the lowercase hex payload digest,
/// not the raw digest bytes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SignatureRecord {
    /// Shape version of this record.
    pub version: u32,
    /// Opaque key identifier, resolved against the verifier's trust store.
    pub signing_key_id: String,
    /// Always `SHA256withRSA`.
    pub algorithm: String,
    /// Base64-encoded signature bytes.
    pub signature: String,
    /// Optional base64 certificate; empty when unused.
    #[serde(default)]
    pub certificate: String,
    /// Signing time (Unix seconds).
    pub timestamp: u64,
}

/// What the signatures cover.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SignedPayload {
    pub digest_algorithm: String,
    /// Hex SHA-256 of every non-signature entry, concatenated.
    pub digest: String,
    pub dxt_version: String,
    /// Hex SHA-256 of `manifest.json`'s text.
    pub manifest_digest: String,
}

impl SignedPayload {
    pub fn new(digest: String, manifest_digest: String) -> Self {
        Self {
            digest_algorithm: DIGEST_ALGORITHM.to_string(),
            digest,
            dxt_version: DXT_VERSION.to_string(),
            manifest_digest,
        }
    }
}

/// Contents of `META-INF/dxt-signatures.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SignatureFile {
    /// Signature history; only the last record is trusted.
    pub signatures: Vec<SignatureRecord>,
    pub signed_payload: SignedPayload,
}

impl SignatureFile {
    /// The authoritative (most recently appended) record.
    pub fn latest(&self) -> Result<&SignatureRecord, SigningError> {
        self.signatures.last().ok_or(SigningError::NoSignatures)
    }
}

/// Decode a signature file.
pub fn parse(bytes: &[u8]) -> Result<SignatureFile, SigningError> {
    serde_json::from_slice(bytes).map_err(SigningError::MalformedSignature)
}

/// Encode a signature file as pretty-printed JSON with a stable field order.
pub fn serialize(file: &SignatureFile) -> Result<Vec<u8>, SigningError> {
    Ok(serde_json::to_vec_pretty(file)?)
}

/// Read and decode the signature file embedded in `archive`.
pub fn extract<A: Archive>(archive: &A) -> Result<SignatureFile, SigningError> {
    let bytes = archive.entry(SIGNATURE_PATH).ok_or(SigningError::SignatureNotFound)?;
    parse(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::DxtArchive;

    fn record(key_id: &str) -> SignatureRecord {
        SignatureRecord {
            version: RECORD_VERSION,
            signing_key_id: key_id.to_string(),
            algorithm: SIGNATURE_ALGORITHM.to_string(),
            signature: "c2lnbmF0dXJl".to_string(),
            certificate: String::new(),
            timestamp: 1_700_000_000,
        }
    }

    fn file() -> SignatureFile {
        SignatureFile {
            signatures: vec![record("k1")],
            signed_payload: SignedPayload::new("ab".repeat(32), "cd".repeat(32)),
        }
    }

    #[test]
    fn serialize_uses_wire_field_names() {
        let json: serde_json::Value = serde_json::from_slice(&serialize(&file()).unwrap()).unwrap();
        let sig = &json["signatures"][0];
        assert_eq!(sig["version"], 1);
        assert_eq!(sig["signingKeyId"], "k1");
        assert_eq!(sig["algorithm"], "SHA256withRSA");
        assert_eq!(sig["certificate"], "");
        assert_eq!(sig["timestamp"], 1_700_000_000u64);
        let payload = &json["signedPayload"];
        assert_eq!(payload["digestAlgorithm"], "SHA-256");
        assert_eq!(payload["dxtVersion"], "1.0.0");
        assert_eq!(payload["digest"], "ab".repeat(32));
        assert_eq!(payload["manifestDigest"], "cd".repeat(32));
    }

    #[test]
    fn serialize_is_deterministic() {
        assert_eq!(serialize(&file()).unwrap(), serialize(&file()).unwrap());
    }

    #[test]
    fn parse_accepts_serialized() {
        let bytes = serialize(&file()).unwrap();
        assert_eq!(parse(&bytes).unwrap(), file());
    }

    #[test]
    fn parse_defaults_missing_certificate() {
        let json = r#"{
            "signatures": [{
                "version": 1,
                "signingKeyId": "k1",
                "algorithm": "SHA256withRSA",
                "signature": "AAAA",
                "timestamp": 42
            }],
            "signedPayload": {
                "digestAlgorithm": "SHA-256",
                "digest": "00",
                "dxtVersion": "1.0.0",
                "manifestDigest": "11"
            }
        }"#;
        let parsed = parse(json.as_bytes()).unwrap();
        assert_eq!(parsed.signatures[0].certificate, "");
        assert_eq!(parsed.signatures[0].timestamp, 42);
    }

    #[test]
    fn parse_rejects_invalid_json() {
        assert!(matches!(parse(b"not json"), Err(SigningError::MalformedSignature(_))));
    }

    #[test]
    fn parse_rejects_missing_fields() {
        let json = br#"{"signatures": []}"#;
        assert!(matches!(parse(json), Err(SigningError::MalformedSignature(_))));
    }

    #[test]
    fn latest_picks_last_record() {
        let mut f = file();
        f.signatures.push(record("k2"));
        assert_eq!(f.latest().unwrap().signing_key_id, "k2");
    }

    #[test]
    fn latest_on_empty_list() {
        let mut f = file();
        f.signatures.clear();
        assert!(matches!(f.latest(), Err(SigningError::NoSignatures)));
    }

    #[test]
    fn extract_reads_fixed_path() {
        let archive = DxtArchive::new().with_entry(SIGNATURE_PATH, serialize(&file()).unwrap());
        assert_eq!(extract(&archive).unwrap(), file());
    }

    #[test]
    fn extract_without_entry() {
        let archive = DxtArchive::new().with_entry("manifest.json", "{}");
        assert!(matches!(extract(&archive), Err(SigningError::SignatureNotFound)));
    }
}
