//! Read-only lookup in the account file
//!
//! The account file holds one account per line:
//!
//! ```text
//! <account name> <encoded token>
//! ```
//!
//! Names cannot contain spaces. Nothing here writes the file.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use tracing::debug;
use zeroize::Zeroizing;

use crate::error::{ErrorCategory, ErrorKind, OtpcryptError, Result};

/// Find the encoded token stored for `account_name` in `file_path`.
///
/// Returns `Ok(None)` when no line carries that name. The first matching
/// line wins; trailing `\r`/`\n` are removed from the token. Lines with a
/// name but no token are skipped.
pub fn find_encoded_token(
    account_name: &str,
    file_path: &Path,
) -> Result<Option<Zeroizing<String>>> {
    let file = File::open(file_path).map_err(|e| read_error(file_path, e))?;
    let mut reader = BufReader::new(file);
    let mut line = Zeroizing::new(Vec::new());

    loop {
        line.clear();
        let read = reader
            .read_until(b'\n', &mut line)
            .map_err(|e| read_error(file_path, e))?;
        if read == 0 {
            debug!(path = %file_path.display(), "account not found");
            return Ok(None);
        }

        let Some((name, token)) = split_line(&line) else {
            continue;
        };
        if name != account_name.as_bytes() {
            continue;
        }

        let token = std::str::from_utf8(token).map_err(|e| {
            OtpcryptError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::Encoding,
                format!("stored token for account {} is not valid UTF-8", account_name),
                e,
            )
        })?;
        return Ok(Some(Zeroizing::new(token.to_owned())));
    }
}

/// Split `name token[ ...]\n` into name and token.
fn split_line(line: &[u8]) -> Option<(&[u8], &[u8])> {
    let line = trim_line_end(line);
    let space = line.iter().position(|&b| b == b' ')?;
    let (name, rest) = (&line[..space], &line[space + 1..]);
    let token = rest.split(|&b| b == b' ').next()?;
    if name.is_empty() || token.is_empty() {
        return None;
    }
    Some((name, token))
}

fn trim_line_end(mut line: &[u8]) -> &[u8] {
    while let Some((&last, rest)) = line.split_last() {
        if last != b'\n' && last != b'\r' {
            break;
        }
        line = rest;
    }
    line
}

fn read_error(path: &Path, err: io::Error) -> OtpcryptError {
    let category = if err.kind() == io::ErrorKind::NotFound {
        ErrorCategory::User
    } else {
        ErrorCategory::Internal
    };
    OtpcryptError::with_kind_and_source(
        category,
        ErrorKind::Io,
        format!("failed to read from {}", path.display()),
        err,
    )
}
