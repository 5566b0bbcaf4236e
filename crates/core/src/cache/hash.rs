//! URL digests used to group cached generations.

use sha2::{Digest, Sha256};

/// Compute the fixed-length digest that groups all generations of one URL.
pub fn url_hash(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_stability() {
        assert_eq!(url_hash("/dav/files/alice"), url_hash("/dav/files/alice"));
    }

    #[test]
    fn test_hash_different_urls() {
        assert_ne!(url_hash("/x"), url_hash("/y"));
    }

    #[test]
    fn test_hash_format() {
        let hash = url_hash("/x");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(url_hash("").len(), 64);
    }
}
