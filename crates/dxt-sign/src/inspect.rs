//! `dxt-sign inspect` — print the embedded signature file.

use std::path::Path;

use anyhow::Context;
use dxt_signing::DxtArchive;
use dxt_signing::digest;
use dxt_signing::signature;

pub fn run(archive_path: &Path) -> anyhow::Result<()> {
    let archive =
        DxtArchive::open(archive_path).with_context(|| format!("failed to open {}", archive_path.display()))?;
    let file = signature::extract(&archive)?;

    println!("{} ({} entries)", archive_path.display(), archive.len());
    println!("  Format version: {}", file.signed_payload.dxt_version);
    println!("  Digest ({}): {}", file.signed_payload.digest_algorithm, file.signed_payload.digest);
    println!("  Manifest digest: {}", file.signed_payload.manifest_digest);

    let current = digest::compute_payload_digest(&archive);
    if current == file.signed_payload.digest {
        println!("  Current payload matches the signed digest");
    } else {
        println!("  Current payload digest differs: {current}");
    }

    println!("  Signatures: {}", file.signatures.len());
    for (index, record) in file.signatures.iter().enumerate() {
        let marker = if index + 1 == file.signatures.len() { " (authoritative)" } else { "" };
        println!(
            "    [{index}] key={} algorithm={} version={} timestamp={}{marker}",
            record.signing_key_id, record.algorithm, record.version, record.timestamp
        );
    }

    Ok(())
}
