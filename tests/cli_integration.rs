//! CLI integration tests
//!
//! Tests the command-line interface end-to-end.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tempfile::TempDir;

/// Get path to the otpcrypt binary
fn otpcrypt_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_otpcrypt"))
}

/// Run otpcrypt with passphrase from stdin
fn run_otpcrypt_with_passphrase(
    args: &[&str],
    passphrase: &str,
) -> Result<std::process::Output, std::io::Error> {
    let mut child = Command::new(otpcrypt_bin())
        .arg("--passphrase-stdin")
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    {
        let stdin = child.stdin.as_mut().expect("failed to open stdin");
        // Ignore BrokenPipe errors - the command may exit before reading stdin
        // if it encounters an error (e.g., account file not found)
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

fn stdout_line(output: &std::process::Output) -> String {
    String::from_utf8(output.stdout.clone())
        .unwrap()
        .trim_end()
        .to_string()
}

#[test]
fn test_lookup_known_account() {
    let accounts = testdata_path("accounts.txt");

    let result = run_otpcrypt_with_passphrase(
        &["lookup", "-a", "github", "-f", accounts.to_str().unwrap()],
        "correct horse\n",
    )
    .unwrap();

    assert!(
        result.status.success(),
        "lookup failed: {}",
        String::from_utf8_lossy(&result.stderr)
    );
    assert_eq!(stdout_line(&result), "JBSWY3DPEHPK3PXP");

    let result = run_otpcrypt_with_passphrase(
        &["lookup", "-a", "gitlab", "-f", accounts.to_str().unwrap()],
        "test",
    )
    .unwrap();

    assert!(result.status.success());
    assert_eq!(stdout_line(&result), "GEZDGNBVGY3TQOJQ");
}

#[test]
fn test_encrypt_decrypt_roundtrip() {
    let result =
        run_otpcrypt_with_passphrase(&["encrypt", "-t", "JBSWY3DPEHPK3PXP"], "correct horse")
            .unwrap();

    assert!(
        result.status.success(),
        "encrypt failed: {}",
        String::from_utf8_lossy(&result.stderr)
    );
    let encoded = stdout_line(&result);
    assert_eq!(encoded.len(), 64, "16 + 16 + 16 bytes of base64");

    let result =
        run_otpcrypt_with_passphrase(&["decrypt", "-e", &encoded], "correct horse").unwrap();

    assert!(
        result.status.success(),
        "decrypt failed: {}",
        String::from_utf8_lossy(&result.stderr)
    );
    assert_eq!(stdout_line(&result), "JBSWY3DPEHPK3PXP");
}

#[test]
fn test_encrypted_token_works_in_account_file() {
    let temp_dir = TempDir::new().unwrap();
    let accounts = temp_dir.path().join("accounts");

    let result = run_otpcrypt_with_passphrase(&["encrypt", "-t", "MFRGGZDFMZTWQ2LK"], "pw").unwrap();
    assert!(result.status.success());
    fs::write(&accounts, format!("example {}\n", stdout_line(&result))).unwrap();

    let result = run_otpcrypt_with_passphrase(
        &["lookup", "-a", "example", "-f", accounts.to_str().unwrap()],
        "pw",
    )
    .unwrap();

    assert!(result.status.success());
    assert_eq!(stdout_line(&result), "MFRGGZDFMZTWQ2LK");
}

#[test]
fn test_lookup_wrong_passphrase() {
    let accounts = testdata_path("accounts.txt");

    let result = run_otpcrypt_with_passphrase(
        &["lookup", "-a", "github", "-f", accounts.to_str().unwrap()],
        "wrong",
    )
    .unwrap();

    assert!(!result.status.success());
    assert!(result.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("wrong password"), "stderr: {}", stderr);
}

#[test]
fn test_lookup_unknown_account() {
    let accounts = testdata_path("accounts.txt");

    let result = run_otpcrypt_with_passphrase(
        &["lookup", "-a", "bitbucket", "-f", accounts.to_str().unwrap()],
        "test",
    )
    .unwrap();

    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("account bitbucket not found"), "stderr: {}", stderr);
}

#[test]
fn test_lookup_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("missing");

    let result = run_otpcrypt_with_passphrase(
        &["lookup", "-a", "github", "-f", missing.to_str().unwrap()],
        "test",
    )
    .unwrap();

    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("failed to read from"), "stderr: {}", stderr);
}

#[test]
fn test_decrypt_garbage_is_not_wrong_password() {
    let result = run_otpcrypt_with_passphrase(&["decrypt", "-e", "not-base64!!"], "test").unwrap();

    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("corrupt"), "stderr: {}", stderr);
    assert!(!stderr.contains("wrong password"), "stderr: {}", stderr);
}

#[test]
fn test_encrypt_requires_token_with_passphrase_stdin() {
    let result = run_otpcrypt_with_passphrase(&["encrypt"], "test").unwrap();

    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("--token is required"), "stderr: {}", stderr);
}

#[test]
fn test_encrypt_rejects_unprintable_token() {
    let result = run_otpcrypt_with_passphrase(&["encrypt", "-t", "caf\u{e9}"], "test").unwrap();

    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("printable ASCII"), "stderr: {}", stderr);
}
