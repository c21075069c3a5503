//! Checksums backing undo safety checks.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::UNIX_EPOCH;

use sha2::{Digest, Sha256};

use crate::error::Result;

use super::entry::FileChecksum;

/// Hash a file in 8 KiB chunks and snapshot its size and mtime.
pub fn compute_file_checksum(path: &Path) -> Result<FileChecksum> {
    let metadata = std::fs::metadata(path)?;
    let modified = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(FileChecksum {
        sha256: hex::encode(hasher.finalize()),
        size: metadata.len(),
        modified,
    })
}

/// Short stable identifier for a folder path, used as the journal file name.
pub fn hash_folder_path(folder: &str) -> String {
    let digest = Sha256::digest(folder.as_bytes());
    hex::encode(&digest[..8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn checksum_matches_known_sha256() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("hello.txt");
        let mut file = File::create(&path).unwrap();
        file.write_all(b"hello world").unwrap();
        drop(file);

        let checksum = compute_file_checksum(&path).unwrap();
        assert_eq!(
            checksum.sha256,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
        assert_eq!(checksum.size, 11);
        assert!(checksum.modified > 0);
    }

    #[test]
    fn checksum_changes_with_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("f.txt");
        std::fs::write(&path, b"one").unwrap();
        let first = compute_file_checksum(&path).unwrap();
        std::fs::write(&path, b"two").unwrap();
        let second = compute_file_checksum(&path).unwrap();
        assert_ne!(first.sha256, second.sha256);
    }

    #[test]
    fn missing_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        assert!(compute_file_checksum(&tmp.path().join("gone")).is_err());
    }

    #[test]
    fn folder_hash_is_stable_and_short() {
        let a = hash_folder_path("/home/user/Downloads");
        let b = hash_folder_path("/home/user/Downloads");
        let c = hash_folder_path("/home/user/Desktop");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 16);
    }
}
