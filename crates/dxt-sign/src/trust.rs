//! `dxt-sign trust` — manage the persisted trust store.

use std::path::Path;

use anyhow::Context;
use dxt_signing::keys::TrustStore;

pub fn add(store_path: &Path, key_id: &str, public_key: &Path, name: &str) -> anyhow::Result<()> {
    let pem = std::fs::read_to_string(public_key)
        .with_context(|| format!("failed to read public key {}", public_key.display()))?;

    let mut store = TrustStore::load(store_path)?;
    let replaced = store.is_trusted(key_id);
    store.add(key_id, &pem, name)?;
    store.save(store_path)?;

    if replaced {
        println!("✓ Replaced trusted key {key_id}");
    } else {
        println!("✓ Trusted key {key_id}");
    }
    println!("  Trust store: {}", store_path.display());
    Ok(())
}

pub fn remove(store_path: &Path, key_id: &str) -> anyhow::Result<()> {
    let mut store = TrustStore::load(store_path)?;
    if !store.remove(key_id) {
        anyhow::bail!("key {key_id} is not in {}", store_path.display());
    }
    store.save(store_path)?;
    println!("✓ Removed trusted key {key_id}");
    Ok(())
}

pub fn list(store_path: &Path) -> anyhow::Result<()> {
    let store = TrustStore::load(store_path)?;
    if store.signers.is_empty() {
        println!("No trusted keys in {}", store_path.display());
        return Ok(());
    }
    for signer in &store.signers {
        if signer.name.is_empty() {
            println!("  {}", signer.key_id);
        } else {
            println!("  {} ({})", signer.key_id, signer.name);
        }
    }
    Ok(())
}
