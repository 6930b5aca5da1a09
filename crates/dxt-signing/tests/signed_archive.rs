//! End-to-end signing and verification through zip files on disk.

use dxt_signing::Archive;
use dxt_signing::DxtArchive;
use dxt_signing::SIGNATURE_PATH;
use dxt_signing::SigningError;
use dxt_signing::TrustedKeys;
use dxt_signing::digest::sha256_hex;
use dxt_signing::keys;
use dxt_signing::signature;
use dxt_signing::signer::sign_archive;
use dxt_signing::verifier::verify_archive;

fn write_bundle(path: &std::path::Path) {
    DxtArchive::new()
        .with_entry("manifest.json", "{}")
        .with_entry("payload.bin", vec![0x01, 0x02, 0x03])
        .save(path)
        .unwrap();
}

#[test]
fn sign_and_verify_through_files() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bundle.dxt");
    let output = dir.path().join("bundle.signed.dxt");
    let key_path = dir.path().join("keys/k1.pem");
    let pub_path = dir.path().join("keys/k1.pub.pem");

    write_bundle(&input);
    let key = keys::generate_keypair(1024).unwrap();
    keys::save_private_key(&key_path, &key).unwrap();
    keys::save_public_key(&pub_path, &key.to_public_key()).unwrap();

    // Sign from disk
    let signing_key = keys::load_private_key(&key_path).unwrap();
    let archive = DxtArchive::open(&input).unwrap();
    let (signed, file) = sign_archive(&archive, &signing_key, "k1").unwrap();
    signed.save(&output).unwrap();

    assert_eq!(file.signed_payload.digest, sha256_hex(b"{}\x01\x02\x03"));
    assert_eq!(file.signed_payload.manifest_digest, sha256_hex(b"{}"));

    // The input file is untouched
    assert!(DxtArchive::open(&input).unwrap().entry(SIGNATURE_PATH).is_none());

    // Verify after re-opening
    let reopened = DxtArchive::open(&output).unwrap();
    assert_eq!(signature::extract(&reopened).unwrap(), file);
    let trusted = TrustedKeys::new().with_key("k1", keys::load_public_key(&pub_path).unwrap());
    let verified = verify_archive(&reopened, &trusted).unwrap();
    assert_eq!(verified.key_id, "k1");

    // Tamper on disk and re-check
    let mut tampered = reopened.clone();
    tampered.put_entry("payload.bin", vec![0x01, 0x02, 0x03, 0x04]);
    tampered.save(&output).unwrap();
    let err = verify_archive(&DxtArchive::open(&output).unwrap(), &trusted).unwrap_err();
    assert!(matches!(err, SigningError::PayloadDigestMismatch { .. }));
}

#[test]
fn signature_file_is_pretty_json() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bundle.dxt");
    write_bundle(&input);

    let key = keys::generate_keypair(1024).unwrap();
    let (signed, _) = sign_archive(&DxtArchive::open(&input).unwrap(), &key, "k1").unwrap();

    let text = signed.entry_text(SIGNATURE_PATH).unwrap();
    assert!(text.starts_with("{\n  \"signatures\": [\n"));
    assert!(text.contains("\"signedPayload\""));
}
