//! Request fingerprinting primitives
//!
//! Provides [`RequestFingerprint`], a strongly-typed 32-byte hash over the
//! semantically meaningful fields of a generation request. The fingerprint is
//! the stable per-request sample used by the rollout gate and the key under
//! which selections are recorded.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// A 32-byte request fingerprint (Blake3)
///
/// Stable for the lifetime of a logical request: the same semantic fields
/// always produce the same fingerprint. Immutable and cheap to clone (Copy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestFingerprint([u8; 32]);

impl RequestFingerprint {
    /// Create a fingerprint from raw bytes
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get reference to the underlying bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Create fingerprint from byte slice
    ///
    /// # Errors
    /// Returns error if slice length is not exactly 32 bytes
    #[inline]
    pub fn from_slice(bytes: &[u8]) -> Result<Self, FingerprintError> {
        if bytes.len() != 32 {
            return Err(FingerprintError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// Compute Blake3 fingerprint of arbitrary data
    #[inline]
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        let hash = blake3::hash(data);
        Self::new(*hash.as_bytes())
    }

    /// Compute fingerprint from a serializable value (JSON encoding)
    ///
    /// # Errors
    /// Returns error if serialization fails
    #[inline]
    pub fn compute_serializable<T>(value: &T) -> Result<Self, FingerprintError>
    where
        T: serde::Serialize,
    {
        let json = serde_json::to_vec(value)?;
        Ok(Self::compute(&json))
    }

    /// Short string representation (first 16 hex chars)
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl Display for RequestFingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for RequestFingerprint {
    type Err = FingerprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        Self::from_slice(&bytes)
    }
}

impl AsRef<[u8; 32]> for RequestFingerprint {
    fn as_ref(&self) -> &[u8; 32] {
        &self.0
    }
}

// Serde implementations for compact serialization
impl serde::Serialize for RequestFingerprint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

impl<'de> serde::Deserialize<'de> for RequestFingerprint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct FingerprintVisitor;

        impl serde::de::Visitor<'_> for FingerprintVisitor {
            type Value = RequestFingerprint;

            fn expecting(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
                formatter.write_str("a 32-byte fingerprint as hex string or byte array")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                value.parse().map_err(serde::de::Error::custom)
            }

            fn visit_bytes<E>(self, value: &[u8]) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                RequestFingerprint::from_slice(value).map_err(serde::de::Error::custom)
            }
        }

        if deserializer.is_human_readable() {
            deserializer.deserialize_str(FingerprintVisitor)
        } else {
            deserializer.deserialize_bytes(FingerprintVisitor)
        }
    }
}

/// Errors that can occur when working with request fingerprints
#[derive(Debug, thiserror::Error)]
pub enum FingerprintError {
    /// Invalid fingerprint length
    #[error("invalid fingerprint length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Hex encoding error
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_compute_deterministic() {
        let data = b"leadership workshop";
        let f1 = RequestFingerprint::compute(data);
        let f2 = RequestFingerprint::compute(data);
        assert_eq!(f1, f2);
    }

    #[test]
    fn fingerprint_compute_different_data() {
        let f1 = RequestFingerprint::compute(b"workshop a");
        let f2 = RequestFingerprint::compute(b"workshop b");
        assert_ne!(f1, f2);
    }

    #[test]
    fn fingerprint_from_slice_invalid_length() {
        let bytes = vec![1u8; 31];
        let result = RequestFingerprint::from_slice(&bytes);
        assert!(matches!(
            result,
            Err(FingerprintError::InvalidLength { expected: 32, actual: 31 })
        ));
    }

    #[test]
    fn fingerprint_display_and_parse() {
        let fp = RequestFingerprint::compute(b"roundtrip");
        let s = fp.to_string();
        let parsed: RequestFingerprint = s.parse().unwrap();
        assert_eq!(fp, parsed);
    }

    #[test]
    fn fingerprint_short() {
        let fp = RequestFingerprint::compute(b"short");
        let short = fp.short();
        assert_eq!(short.len(), 16); // 8 bytes = 16 hex chars
        assert!(fp.to_string().starts_with(&short));
    }

    #[test]
    fn fingerprint_serde_json() {
        let fp = RequestFingerprint::compute(b"serde");
        let json = serde_json::to_string(&fp).unwrap();
        let decoded: RequestFingerprint = serde_json::from_str(&json).unwrap();
        assert_eq!(fp, decoded);
    }

    #[test]
    fn fingerprint_compute_serializable() {
        #[derive(serde::Serialize)]
        struct Fields<'a> {
            category: &'a str,
            outcome: &'a str,
        }

        let a = RequestFingerprint::compute_serializable(&Fields {
            category: "sales",
            outcome: "objection handling",
        })
        .unwrap();
        let b = RequestFingerprint::compute_serializable(&Fields {
            category: "sales",
            outcome: "objection handling",
        })
        .unwrap();
        assert_eq!(a, b);
    }
}
