//! RSA key management and trust store.

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use rsa::RsaPrivateKey;
use rsa::RsaPublicKey;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::pkcs8::DecodePublicKey;
use rsa::pkcs8::EncodePrivateKey;
use rsa::pkcs8::EncodePublicKey;
use rsa::pkcs8::LineEnding;
use serde::Deserialize;
use serde::Serialize;

use crate::error::SigningError;

/// Default modulus size for generated keys.
pub const DEFAULT_KEY_BITS: usize = 2048;

/// Generate a new RSA keypair for archive signing.
pub fn generate_keypair(bits: usize) -> Result<RsaPrivateKey, SigningError> {
    RsaPrivateKey::new(&mut rand_core::OsRng, bits).map_err(|e| SigningError::SigningKeyInvalid(e.to_string()))
}

/// Parse a PKCS#8 (`PRIVATE KEY`) or PKCS#1 (`RSA PRIVATE KEY`) PEM private key.
pub fn parse_private_key_pem(pem: &str) -> Result<RsaPrivateKey, SigningError> {
    let pem = pem.trim();
    let parsed = if pem.contains("BEGIN RSA PRIVATE KEY") {
        RsaPrivateKey::from_pkcs1_pem(pem).map_err(|e| e.to_string())
    } else {
        RsaPrivateKey::from_pkcs8_pem(pem).map_err(|e| e.to_string())
    };
    parsed.map_err(SigningError::SigningKeyInvalid)
}

/// Parse an SPKI (`PUBLIC KEY`) or PKCS#1 (`RSA PUBLIC KEY`) PEM public key.
pub fn parse_public_key_pem(pem: &str) -> Result<RsaPublicKey, SigningError> {
    let pem = pem.trim();
    let parsed = if pem.contains("BEGIN RSA PUBLIC KEY") {
        RsaPublicKey::from_pkcs1_pem(pem).map_err(|e| e.to_string())
    } else {
        RsaPublicKey::from_public_key_pem(pem).map_err(|e| e.to_string())
    };
    parsed.map_err(SigningError::InvalidPublicKey)
}

/// Load a private key from a PEM file.
pub fn load_private_key(path: &Path) -> Result<RsaPrivateKey, SigningError> {
    let pem = std::fs::read_to_string(path)?;
    parse_private_key_pem(&pem)
}

/// Load a public key from a PEM file.
pub fn load_public_key(path: &Path) -> Result<RsaPublicKey, SigningError> {
    let pem = std::fs::read_to_string(path)?;
    parse_public_key_pem(&pem)
}

/// Encode a public key as SPKI PEM.
pub fn public_key_pem(key: &RsaPublicKey) -> Result<String, SigningError> {
    key.to_public_key_pem(LineEnding::LF).map_err(|e| SigningError::InvalidPublicKey(e.to_string()))
}

/// Save a private key as PKCS#8 PEM.
///
/// Sets file permissions to 0o600 on Unix.
pub fn save_private_key(path: &Path, key: &RsaPrivateKey) -> Result<(), SigningError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let pem = key.to_pkcs8_pem(LineEnding::LF).map_err(|e| SigningError::SigningKeyInvalid(e.to_string()))?;
    std::fs::write(path, pem.as_bytes())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}

/// Save a public key as SPKI PEM.
pub fn save_public_key(path: &Path, key: &RsaPublicKey) -> Result<(), SigningError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, public_key_pem(key)?)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Trusted Keys
// ---------------------------------------------------------------------------

/// Mapping from signing key id to the public key accepted for it.
///
/// Passed explicitly to the verifier; an id missing from the map is
/// rejected rather than treated as unsigned.
#[derive(Debug, Clone)]
pub struct TrustedKeys<K = RsaPublicKey> {
    keys: BTreeMap<String, K>,
}

impl<K> Default for TrustedKeys<K> {
    fn default() -> Self {
        Self { keys: BTreeMap::new() }
    }
}

impl<K> TrustedKeys<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trust `key` for `key_id`, returning the key it replaced.
    pub fn insert(&mut self, key_id: impl Into<String>, key: K) -> Option<K> {
        self.keys.insert(key_id.into(), key)
    }

    /// Builder-style [`TrustedKeys::insert`].
    pub fn with_key(mut self, key_id: impl Into<String>, key: K) -> Self {
        self.insert(key_id, key);
        self
    }

    pub fn get(&self, key_id: &str) -> Option<&K> {
        self.keys.get(key_id)
    }

    pub fn remove(&mut self, key_id: &str) -> Option<K> {
        self.keys.remove(key_id)
    }

    pub fn contains(&self, key_id: &str) -> bool {
        self.keys.contains_key(key_id)
    }

    pub fn key_ids(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<K> FromIterator<(String, K)> for TrustedKeys<K> {
    fn from_iter<I: IntoIterator<Item = (String, K)>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Trust Store File
// ---------------------------------------------------------------------------

/// A trusted signer as persisted in the trust store file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrustedSigner {
    /// Key id as written into signature records.
    pub key_id: String,
    /// SPKI or PKCS#1 PEM public key.
    pub public_key_pem: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// When this key was added (Unix milliseconds).
    pub added_at_ms: u64,
}

/// Persisted allowlist of signing keys.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TrustStore {
    pub signers: Vec<TrustedSigner>,
}

impl TrustStore {
    /// Default path for the trust store file.
    pub fn default_path() -> Result<PathBuf, SigningError> {
        Ok(config_dir()?.join("trusted-keys.json"))
    }

    /// Load the trust store from a JSON file. Returns an empty store if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, SigningError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Save the trust store to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), SigningError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }

    /// Trust `public_key_pem` for `key_id`, replacing any earlier key for that id.
    ///
    /// The PEM is parsed first so the file never holds an unusable key.
    pub fn add(&mut self, key_id: &str, public_key_pem: &str, name: &str) -> Result<(), SigningError> {
        parse_public_key_pem(public_key_pem)?;
        self.remove(key_id);
        let now_ms =
            std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).unwrap_or_default().as_millis() as u64;
        self.signers.push(TrustedSigner {
            key_id: key_id.to_string(),
            public_key_pem: public_key_pem.trim().to_string(),
            name: name.to_string(),
            added_at_ms: now_ms,
        });
        Ok(())
    }

    /// Remove a signer by key id. Returns whether it was found.
    pub fn remove(&mut self, key_id: &str) -> bool {
        let before = self.signers.len();
        self.signers.retain(|s| s.key_id != key_id);
        self.signers.len() < before
    }

    /// Check if a key id is in the store.
    pub fn is_trusted(&self, key_id: &str) -> bool {
        self.signers.iter().any(|s| s.key_id == key_id)
    }

    /// Parse every stored key into a [`TrustedKeys`] map for verification.
    pub fn to_trusted_keys(&self) -> Result<TrustedKeys, SigningError> {
        self.signers
            .iter()
            .map(|s| parse_public_key_pem(&s.public_key_pem).map(|key| (s.key_id.clone(), key)))
            .collect()
    }
}

/// The `dxt` config directory under `$XDG_CONFIG_HOME` or `$HOME/.config`.
///
/// Fails with [`SigningError::ConfigDirUnavailable`] when neither is set.
pub fn config_dir() -> Result<PathBuf, SigningError> {
    resolve_config_dir(std::env::var("XDG_CONFIG_HOME").ok(), std::env::var("HOME").ok())
        .ok_or(SigningError::ConfigDirUnavailable)
}

fn resolve_config_dir(xdg_config_home: Option<String>, home: Option<String>) -> Option<PathBuf> {
    let base = xdg_config_home
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| home.filter(|v| !v.is_empty()).map(|h| PathBuf::from(h).join(".config")))?;
    Some(base.join("dxt"))
}

/// Shared keys for unit tests; RSA generation is slow in debug builds.
#[cfg(test)]
pub(crate) fn test_key() -> &'static RsaPrivateKey {
    static KEY: std::sync::OnceLock<RsaPrivateKey> = std::sync::OnceLock::new();
    KEY.get_or_init(|| generate_keypair(1024).unwrap())
}

#[cfg(test)]
pub(crate) fn other_test_key() -> &'static RsaPrivateKey {
    static KEY: std::sync::OnceLock<RsaPrivateKey> = std::sync::OnceLock::new();
    KEY.get_or_init(|| generate_keypair(1024).unwrap())
}
