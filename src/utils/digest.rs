// file: src/utils/digest.rs
// description: content digests for published and served artifacts

use sha2::{Digest, Sha256};

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        assert_eq!(
            sha256_hex(b"[]"),
            "4f53cda18c2baa0c0354bb5f9a3ecbe5ed12ab4d8e11ba873c2f11161202b945"
        );
    }

    #[test]
    fn test_hash_consistency() {
        assert_eq!(sha256_hex(b"catalog"), sha256_hex(b"catalog"));
        assert_ne!(sha256_hex(b"catalog"), sha256_hex(b"catalog "));
    }
}
