//! Golden checksum vectors.
//!
//! Stored checksums are reported to clients as lowercase hex SHA-256, so
//! these values must never change.

use cloudfiles_core::{compute_checksum, Checksum};

/// A golden checksum vector.
#[derive(Debug, Clone)]
pub struct ChecksumVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Input bytes.
    pub data: &'static [u8],
    /// Expected checksum (hex).
    pub expected: &'static str,
}

/// Get all golden vectors.
pub fn all_vectors() -> Vec<ChecksumVector> {
    vec![
        ChecksumVector {
            name: "empty file",
            data: b"",
            expected: "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
        },
        ChecksumVector {
            name: "hello",
            data: b"hello",
            expected: "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824",
        },
        ChecksumVector {
            name: "abc",
            data: b"abc",
            expected: "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad",
        },
        ChecksumVector {
            name: "pangram",
            data: b"The quick brown fox jumps over the lazy dog",
            expected: "d7a8fbb307d7809469ca9abcb0082e4f8d5651e46d3cdb762d02d0bf37c9e592",
        },
    ]
}

/// Check every vector against [`compute_checksum`].
///
/// Returns `(name, matches, actual_hex)` per vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let hex = compute_checksum(v.data);
            (v.name.to_string(), hex == v.expected, hex)
        })
        .collect()
}

/// Decode a vector's expected value.
pub fn expected_checksum(vector: &ChecksumVector) -> Checksum {
    let mut bytes = [0u8; 32];
    // Vectors are fixed 64-char hex literals.
    hex::decode_to_slice(vector.expected, &mut bytes).unwrap_or_else(|e| {
        panic!("vector '{}' is not valid hex: {}", vector.name, e)
    });
    Checksum(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_vectors_match() {
        for (name, matches, hex) in verify_all_vectors() {
            assert!(matches, "vector '{}' produced {}", name, hex);
        }
    }

    #[test]
    fn test_typed_checksum_matches_hex() {
        for vector in all_vectors() {
            let checksum = Checksum::compute(vector.data);
            assert_eq!(checksum, expected_checksum(&vector), "{}", vector.name);
            assert_eq!(checksum.to_hex(), vector.expected);
            assert!(checksum.verify(vector.data));
        }
    }
}
