//! File fingerprints: content digests and modification times.

use std::fs::{File, Metadata};
use std::io::{self, Read};
use std::path::Path;

use blake3::Hasher;
use chrono::{DateTime, Utc};

use fileset_core::FingerprintAlgorithm;

/// Compute the fingerprint of `path` with `algorithm`.
pub fn fingerprint(path: &Path, algorithm: FingerprintAlgorithm) -> io::Result<String> {
    match algorithm {
        FingerprintAlgorithm::Digest => content_digest(path),
        FingerprintAlgorithm::LastModified => {
            let metadata = std::fs::metadata(path)?;
            Ok(modified_millis(&metadata)?.to_string())
        }
    }
}

/// BLAKE3 of the file contents as lowercase hex.
pub fn content_digest(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Hasher::new();
    let mut buffer = vec![0u8; 64 * 1024];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize().to_hex().to_string())
}

/// Modification time in milliseconds since the Unix epoch.
pub fn modified_millis(metadata: &Metadata) -> io::Result<i64> {
    let modified: DateTime<Utc> = metadata.modified()?.into();
    Ok(modified.timestamp_millis())
}
