//! Content fingerprinting for jobs and packages

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::{CoreError, Result};

/// Compute the content fingerprint of a file: the SHA256 hash of its raw
/// bytes as a lowercase hex string.
///
/// The fingerprint depends only on content, never on the file's name, path,
/// or metadata. The file is streamed through the digest rather than read
/// into memory at once.
pub fn fingerprint(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| CoreError::file(path, e))?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();

    let mut buffer = [0u8; 8192];
    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| CoreError::file(path, e))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}
