use assert_cmd::Command;
use sekey::logic::{MessageDigest, RomIdSha256};
use sekey::model::{RomId, Secp256r1PublicKey};
use std::path::Path;
use tempfile::TempDir;

const SEED: &str = "000102030405060708090a0b0c0d0e0f";

fn sekey(keyring: &Path) -> Command {
    let mut cmd = Command::cargo_bin("sekey").unwrap();
    cmd.env_remove("SEKEY_VIRTUAL_SEED")
        .env_remove("SEKEY_PIN")
        .arg("--keyring")
        .arg(keyring);
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).unwrap().trim().to_string()
}

#[test]
fn test_cli_version_parameter() {
    let mut cmd = Command::cargo_bin("sekey").unwrap();
    cmd.arg("--version").assert().success();
}

#[test]
fn test_cli_add_and_sign_with_virtual_element() {
    let dir = TempDir::new().unwrap();
    let keyring = dir.path().join("keyring.json");

    let public_key_hex = stdout_of(
        sekey(&keyring)
            .args(["--virtual-seed", SEED])
            .args(["add", "device"]),
    );
    assert_eq!(public_key_hex.len(), 130);
    assert!(public_key_hex.starts_with("04"));

    let signature_hex = stdout_of(
        sekey(&keyring)
            .args(["--virtual-seed", SEED])
            .args(["sign", "device"])
            .write_stdin("hello"),
    );

    let public_key = Secp256r1PublicKey::from_slice(&hex::decode(public_key_hex).unwrap()).unwrap();
    let signature = hex::decode(signature_hex).unwrap();
    let rom_id = RomId::new(b"sekey-virtual".to_vec()).unwrap();
    let digest = RomIdSha256.digest(b"hello", &rom_id);
    assert!(public_key.verify_digest(&digest, &signature));
}

#[test]
fn test_cli_list_and_show() {
    let dir = TempDir::new().unwrap();
    let keyring = dir.path().join("keyring.json");
    sekey(&keyring)
        .args(["--virtual-seed", SEED])
        .args(["add", "device"])
        .assert()
        .success();
    sekey(&keyring).args(["add", "soft", "--local"]).assert().success();

    let listing = stdout_of(sekey(&keyring).arg("list"));
    assert!(listing.contains("device\tkeys/secureElementInfo"));
    assert!(listing.contains("soft\tkeys/localInfo"));

    let shown = stdout_of(sekey(&keyring).args(["show", "device"]));
    assert!(shown.contains("type: keys/secureElementInfo"));
}

#[test]
fn test_cli_validate_detects_swapped_device() {
    let dir = TempDir::new().unwrap();
    let keyring = dir.path().join("keyring.json");
    sekey(&keyring)
        .args(["--virtual-seed", SEED])
        .args(["add", "device"])
        .assert()
        .success();

    let ok = stdout_of(
        sekey(&keyring)
            .args(["--virtual-seed", SEED])
            .args(["validate", "device"]),
    );
    assert_eq!(ok, "ok");

    let output = sekey(&keyring)
        .args(["--virtual-seed", "ff"])
        .args(["validate", "device"])
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    assert!(String::from_utf8_lossy(&output).contains("does not match"));
}

#[test]
fn test_cli_local_key_signs_without_device() {
    let dir = TempDir::new().unwrap();
    let keyring = dir.path().join("keyring.json");

    let public_key_hex = stdout_of(sekey(&keyring).args(["add", "soft", "--local"]));
    let signature_hex = stdout_of(sekey(&keyring).args(["sign", "soft"]).write_stdin("hello"));

    let public_key = Secp256r1PublicKey::from_slice(&hex::decode(public_key_hex).unwrap()).unwrap();
    assert!(public_key.verify(b"hello", &hex::decode(signature_hex).unwrap()));
}

#[test]
#[cfg(not(feature = "yubikey"))]
fn test_cli_add_without_device_configured() {
    let dir = TempDir::new().unwrap();
    let keyring = dir.path().join("keyring.json");

    let output = sekey(&keyring)
        .args(["add", "device"])
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    assert!(String::from_utf8_lossy(&output).contains("not configured"));
    assert!(!keyring.exists());
}

#[test]
fn test_cli_add_duplicate_and_remove() {
    let dir = TempDir::new().unwrap();
    let keyring = dir.path().join("keyring.json");
    sekey(&keyring).args(["add", "soft", "--local"]).assert().success();
    sekey(&keyring).args(["add", "soft", "--local"]).assert().failure();

    sekey(&keyring).args(["remove", "soft"]).assert().success();
    assert_eq!(stdout_of(sekey(&keyring).arg("list")), "");
    sekey(&keyring).args(["remove", "soft"]).assert().failure();
}
