use std::io::Read;

use sha2::{Digest, Sha256};

const CHUNK: usize = 64 * 1024;

/// Hex-encoded SHA-256 of everything `reader` yields, streamed in 64KB chunks
/// so large videos never sit in memory whole.
pub fn compute_checksum<R: Read>(mut reader: R) -> std::io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK];

    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_checksum_known_value() {
        let hash = compute_checksum(&b"hello world"[..]).unwrap();
        assert_eq!(
            hash,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_checksum_empty_input() {
        let hash = compute_checksum(std::io::empty()).unwrap();
        assert_eq!(
            hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_checksum_file_consistency() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("test.bin");
        fs::write(&path, vec![0xABu8; 3 * CHUNK + 17]).unwrap();

        let a = compute_checksum(fs::File::open(&path).unwrap()).unwrap();
        let b = compute_checksum(fs::File::open(&path).unwrap()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_checksum_single_byte_difference() {
        let mut data = vec![0u8; 1000];
        let a = compute_checksum(&data[..]).unwrap();
        data[999] = 1;
        let b = compute_checksum(&data[..]).unwrap();
        assert_ne!(a, b);
    }
}
