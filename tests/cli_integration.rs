//! CLI integration tests
//!
//! Tests the command-line interface end-to-end.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tempfile::TempDir;

const PASSPHRASE: &str = "0123456789ABCDEF";
const IV: &str = "ABCDEFGHIJKLMNOP";

/// Get path to the saltcrypt binary
fn saltcrypt_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_saltcrypt"))
}

/// Run saltcrypt with passphrase from stdin
fn run_saltcrypt_with_passphrase(
    args: &[&str],
    passphrase: &str,
) -> Result<std::process::Output, std::io::Error> {
    let mut child = Command::new(saltcrypt_bin())
        .arg("--passphrase-stdin")
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    {
        let stdin = child.stdin.as_mut().expect("failed to open stdin");
        // Ignore BrokenPipe errors - the command may exit before reading stdin
        // if it encounters an error (e.g., invalid arguments)
        let _ = stdin.write_all(passphrase.as_bytes());
    }

    child.wait_with_output()
}

/// Get path to testdata directory
fn testdata_path(filename: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("testdata");
    path.push(filename);
    path
}

fn roundtrip(extra_args: &[&str], passphrase: &str, content: &[u8]) {
    let temp_dir = TempDir::new().unwrap();
    let plaintext = temp_dir.path().join("plain.bin");
    let encrypted = temp_dir.path().join("plain.bin.b64");
    let decrypted = temp_dir.path().join("decrypted.bin");
    fs::write(&plaintext, content).unwrap();

    let mut args = extra_args.to_vec();
    args.extend([
        "encrypt",
        "-i",
        plaintext.to_str().unwrap(),
        "-o",
        encrypted.to_str().unwrap(),
    ]);
    let result = run_saltcrypt_with_passphrase(&args, passphrase).unwrap();
    assert!(
        result.status.success(),
        "encrypt failed: {}",
        String::from_utf8_lossy(&result.stderr)
    );

    let mut args = extra_args.to_vec();
    args.extend([
        "decrypt",
        "-i",
        encrypted.to_str().unwrap(),
        "-o",
        decrypted.to_str().unwrap(),
    ]);
    let result = run_saltcrypt_with_passphrase(&args, passphrase).unwrap();
    assert!(
        result.status.success(),
        "decrypt failed: {}",
        String::from_utf8_lossy(&result.stderr)
    );

    assert_eq!(fs::read(&decrypted).unwrap(), content);
}

/// Decrypt known ciphertext (default options: PBKDF2-HMAC-SHA1, CBC).
#[test]
fn test_decrypt_known_ciphertext() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("hello-decrypted.txt");

    let result = run_saltcrypt_with_passphrase(
        &[
            "--iv",
            IV,
            "decrypt",
            "-i",
            testdata_path("hello.txt.b64").to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ],
        PASSPHRASE,
    )
    .unwrap();

    assert!(
        result.status.success(),
        "decrypt failed: {}",
        String::from_utf8_lossy(&result.stderr)
    );

    let decrypted = fs::read_to_string(&output).unwrap();
    let expected = fs::read_to_string(testdata_path("hello.txt")).unwrap();
    assert_eq!(decrypted, expected);
}

#[test]
fn test_encrypt_matches_known_ciphertext() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("hello.txt.b64");

    // Trailing newline on stdin is not part of the passphrase.
    let result = run_saltcrypt_with_passphrase(
        &[
            "--iv",
            IV,
            "encrypt",
            "-i",
            testdata_path("hello.txt").to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ],
        &format!("{}\n", PASSPHRASE),
    )
    .unwrap();
    assert!(
        result.status.success(),
        "encrypt failed: {}",
        String::from_utf8_lossy(&result.stderr)
    );

    let encrypted = fs::read_to_string(&output).unwrap();
    let expected = fs::read_to_string(testdata_path("hello.txt.b64")).unwrap();
    assert_eq!(encrypted, expected);
}

#[test]
fn test_encrypt_decrypt_roundtrip_defaults() {
    roundtrip(&[], PASSPHRASE, b"Hello, saltcrypt!");
}

#[test]
fn test_roundtrip_salted_cbc_sha256() {
    roundtrip(
        &[
            "--iv",
            IV,
            "--hash",
            "sha256",
            "--iterations",
            "1000",
            "--hash-salt",
            "pepper",
            "--key-size",
            "256",
            "--min-salt",
            "4",
            "--max-salt",
            "32",
        ],
        "any length passphrase works with a fixed key size",
        b"salted content",
    );
}

#[test]
fn test_roundtrip_unhashed_ecb_ansix923() {
    roundtrip(
        &["--hash", "none", "--padding", "ansix923"],
        "0123456789ABCDEF01234567",
        &[0u8, 1, 2, 3, 255],
    );
}

#[test]
fn test_bad_passphrase_length_fails() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("out.b64");

    let result = run_saltcrypt_with_passphrase(
        &[
            "encrypt",
            "-i",
            testdata_path("hello.txt").to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ],
        "too short",
    )
    .unwrap();

    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(
        stderr.contains("passphrase must be 16, 24 or 32 bytes"),
        "unexpected error: {}",
        stderr
    );
    assert!(!output.exists());
}

#[test]
fn test_invalid_key_size_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("out.b64");

    let result = run_saltcrypt_with_passphrase(
        &[
            "--key-size",
            "100",
            "encrypt",
            "-i",
            testdata_path("hello.txt").to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ],
        PASSPHRASE,
    )
    .unwrap();

    assert!(!result.status.success());
    assert!(!output.exists());
}

#[test]
fn test_decrypt_nonexistent_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let nonexistent = temp_dir.path().join("nonexistent.b64");
    let output = temp_dir.path().join("output.txt");

    let result = run_saltcrypt_with_passphrase(
        &[
            "decrypt",
            "-i",
            nonexistent.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ],
        PASSPHRASE,
    )
    .unwrap();

    assert!(!result.status.success());
    assert!(!output.exists());
}

#[test]
fn test_empty_file_roundtrip() {
    roundtrip(&["--iv", IV], PASSPHRASE, b"");
}

#[test]
fn test_large_file_roundtrip() {
    let large_content = vec![0x42u8; 1024 * 1024];
    roundtrip(&["--iv", IV, "--max-salt", "64"], PASSPHRASE, &large_content);
}
