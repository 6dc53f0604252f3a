//! Password digests
//!
//! Passwords are never kept in plaintext. Every credential in the system is
//! stored as the hex-encoded digest produced by the configured algorithm.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};

use super::result::{Error, Result};

/// Digest algorithms accepted for password storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Sha512,
}

impl HashAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "SHA-256",
            HashAlgorithm::Sha512 => "SHA-512",
        }
    }

    /// Hash a plaintext password
    pub fn hash(&self, plaintext: &str) -> PasswordHash {
        let digest = match self {
            HashAlgorithm::Sha256 => hex::encode(Sha256::digest(plaintext.as_bytes())),
            HashAlgorithm::Sha512 => hex::encode(Sha512::digest(plaintext.as_bytes())),
        };
        PasswordHash(digest)
    }

    /// Hash a password and its confirmation independently, requiring both
    /// to be present and to produce the same digest
    pub fn hash_confirmed(&self, password: &str, repeat: &str) -> Result<PasswordHash> {
        if password.is_empty() || repeat.is_empty() {
            return Err(Error::invalid_argument("Invalid password"));
        }
        let hashed = self.hash(password);
        let repeat_hashed = self.hash(repeat);
        if hashed != repeat_hashed {
            return Err(Error::invalid_argument("Passwords do not match"));
        }
        Ok(hashed)
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "SHA-256" | "SHA256" => Ok(HashAlgorithm::Sha256),
            "SHA-512" | "SHA512" => Ok(HashAlgorithm::Sha512),
            other => Err(Error::invalid_argument(format!(
                "Cannot hash password: unsupported algorithm {:?}",
                other
            ))),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored password digest (lowercase hex)
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an already-hashed value read from storage
    pub fn from_stored(digest: impl Into<String>) -> Result<Self> {
        let digest = digest.into().trim().to_lowercase();
        if digest.is_empty() {
            return Err(Error::invalid_argument("Invalid password"));
        }
        if !digest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::invalid_argument("Invalid password digest"));
        }
        Ok(Self(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check a plaintext candidate against this digest
    pub fn verify(&self, algorithm: HashAlgorithm, plaintext: &str) -> bool {
        algorithm.hash(plaintext) == *self
    }
}

// Digests stay out of debug output and logs
impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_digest() {
        let hash = HashAlgorithm::Sha256.hash("abc");
        assert_eq!(
            hash.as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(hash, HashAlgorithm::Sha256.hash("abc"));
        assert_ne!(hash, HashAlgorithm::Sha256.hash("abC"));
    }

    #[test]
    fn test_sha512_known_digest() {
        assert_eq!(
            HashAlgorithm::Sha512.hash("abc").as_str(),
            "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a\
             2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f"
        );
    }

    #[test]
    fn test_hash_confirmed() {
        let alg = HashAlgorithm::Sha256;
        assert!(alg.hash_confirmed("pw", "pw").is_ok());
        assert!(matches!(alg.hash_confirmed("", "pw"), Err(Error::InvalidArgument(_))));
        assert!(matches!(alg.hash_confirmed("pw", ""), Err(Error::InvalidArgument(_))));
        assert!(matches!(alg.hash_confirmed("pw", "px"), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_parse_algorithm() {
        assert_eq!("SHA-256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
        assert_eq!("sha512".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha512);
        assert!("MD5".parse::<HashAlgorithm>().is_err());
    }

    #[test]
    fn test_from_stored_and_verify() {
        let hash = HashAlgorithm::Sha256.hash("secret");
        let stored = PasswordHash::from_stored(hash.as_str().to_uppercase()).unwrap();
        assert_eq!(stored, hash);
        assert!(stored.verify(HashAlgorithm::Sha256, "secret"));
        assert!(!stored.verify(HashAlgorithm::Sha256, "Secret"));
        assert!(PasswordHash::from_stored("").is_err());
        assert!(PasswordHash::from_stored("not hex!").is_err());
    }

    #[test]
    fn test_debug_hides_digest() {
        let hash = HashAlgorithm::Sha256.hash("secret");
        assert_eq!(format!("{:?}", hash), "PasswordHash(..)");
    }
}
