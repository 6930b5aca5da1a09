//! `dxt-sign keygen` — generate an RSA keypair.

use std::path::Path;

use dxt_signing::keys;

pub fn run(key_id: &str, output: Option<&Path>, bits: usize) -> anyhow::Result<()> {
    let dir = match output {
        Some(dir) => dir.to_path_buf(),
        None => keys::config_dir()?.join("keys"),
    };
    let private_path = dir.join(format!("{key_id}.pem"));
    let public_path = dir.join(format!("{key_id}.pub.pem"));

    // Don't overwrite existing keys
    for path in [&private_path, &public_path] {
        if path.exists() {
            anyhow::bail!("key file already exists at {}. Remove it first or use --output.", path.display());
        }
    }

    println!("Generating {bits}-bit RSA keypair...");
    let key = keys::generate_keypair(bits)?;
    keys::save_private_key(&private_path, &key)?;
    keys::save_public_key(&public_path, &key.to_public_key())?;

    println!("✓ Generated RSA keypair '{key_id}'");
    println!("  Private key: {}", private_path.display());
    println!("  Public key: {}", public_path.display());
    println!();
    println!("  Keep your private key safe! Share only the public key.");
    println!("  Others can verify your archives with:");
    println!("    dxt-sign verify <archive> {key_id} {}", public_path.display());

    Ok(())
}

