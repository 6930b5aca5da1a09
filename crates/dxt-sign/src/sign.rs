//! `dxt-sign sign` — sign an archive into a new file.

use std::path::Path;

use anyhow::Context;
use dxt_signing::DxtArchive;
use dxt_signing::keys;
use dxt_signing::signer;

pub fn run(archive_path: &Path, key_path: &Path, key_id: &str, output: &Path) -> anyhow::Result<()> {
    let signing_key = keys::load_private_key(key_path)
        .with_context(|| format!("failed to load private key {}", key_path.display()))?;
    tracing::debug!(path = %key_path.display(), "loaded signing key");
    let archive =
        DxtArchive::open(archive_path).with_context(|| format!("failed to open {}", archive_path.display()))?;

    println!("Signing {} ({} entries)...", archive_path.display(), archive.len());

    // Nothing is written unless signing succeeded.
    let (signed, file) = signer::sign_archive(&archive, &signing_key, key_id)?;
    signed.save(output).with_context(|| format!("failed to write {}", output.display()))?;

    println!("✓ Signed with key {key_id}");
    println!("  Payload digest: {}", file.signed_payload.digest);
    println!("  Written to: {}", output.display());

    Ok(())
}
