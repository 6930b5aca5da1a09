//! `dxt-sign verify` — check an archive's signature.

use std::path::Path;

use anyhow::Context;
use dxt_signing::DxtArchive;
use dxt_signing::VerifyOptions;
use dxt_signing::keys;
use dxt_signing::keys::TrustStore;
use dxt_signing::verifier;

pub fn run(
    archive_path: &Path,
    key_id: &str,
    public_key: &Path,
    trust_store: Option<&Path>,
    skip_manifest_check: bool,
) -> anyhow::Result<()> {
    let mut trusted = match trust_store {
        Some(path) => TrustStore::load(path)
            .and_then(|store| store.to_trusted_keys())
            .with_context(|| format!("failed to load trust store {}", path.display()))?,
        None => Default::default(),
    };
    let key = keys::load_public_key(public_key)
        .with_context(|| format!("failed to load public key {}", public_key.display()))?;
    trusted.insert(key_id, key);
    tracing::debug!(trusted = trusted.len(), "loaded trusted keys");

    let archive =
        DxtArchive::open(archive_path).with_context(|| format!("failed to open {}", archive_path.display()))?;

    println!("Verifying {} ({} entries)...", archive_path.display(), archive.len());

    let options = VerifyOptions {
        check_manifest_digest: !skip_manifest_check,
    };
    let verified = verifier::verify_archive_with(&archive, &trusted, &options).context("verification failed")?;

    println!("✓ DXT signature verification successful");
    println!("  Key: {}", verified.key_id);
    println!("  Signed at: {} (unix)", verified.timestamp);
    println!("  Payload digest: {}", verified.digest);

    Ok(())
}
