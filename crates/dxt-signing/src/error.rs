//! Error types for DXT signing operations.

/// Errors from archive signing and verification.
///
/// Every verification guard maps to its own variant so callers can tell an
/// unsigned archive from a tampered one or from one signed by an unknown key.
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    /// The archive has no `META-INF/dxt-signatures.json` entry.
    #[error("signature file not found in META-INF")]
    SignatureNotFound,

    /// The signature file holds an empty `signatures` list.
    #[error("signature file contains no signatures")]
    NoSignatures,

    /// The signature file is not valid JSON or misses required fields.
    #[error("malformed signature file: {0}")]
    MalformedSignature(#[source] serde_json::Error),

    /// The archive has no `manifest.json` entry.
    #[error("manifest.json not found in archive")]
    ManifestMissing,

    /// The recomputed payload digest differs from the signed one.
    #[error("payload digest mismatch: expected {expected}, got {actual}")]
    PayloadDigestMismatch { expected: String, actual: String },

    /// The manifest text no longer hashes to the signed manifest digest.
    #[error("manifest digest mismatch: expected {expected}, got {actual}")]
    ManifestDigestMismatch { expected: String, actual: String },

    /// The signing key id is not present in the trust store.
    #[error("untrusted key ID: {0}")]
    UntrustedKey(String),

    /// The signature record names an algorithm other than `SHA256withRSA`.
    #[error("unsupported signature algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The signature did not verify against the trusted public key.
    #[error("signature verification failed")]
    SignatureInvalid,

    /// The private key could not be parsed or used for signing.
    #[error("invalid signing key: {0}")]
    SigningKeyInvalid(String),

    /// The public key could not be parsed.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Neither `XDG_CONFIG_HOME` nor `HOME` is set.
    #[error("cannot locate config directory: set XDG_CONFIG_HOME or HOME")]
    ConfigDirUnavailable,

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The archive container could not be read or written.
    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// JSON serialization error outside the signature file.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
