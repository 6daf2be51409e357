//! Versioned postcard envelopes for cached read responses.
//!
//! Every stored response follows this format:
//! ```text
//! ┌───────────────┬──────────────────┬───────────────────────┐
//! │ MAGIC (4 B)   │ VERSION (varint) │ PAYLOAD (postcard, T) │
//! └───────────────┴──────────────────┴───────────────────────┘
//!   "SCRC"          u32, 1 byte for versions below 128
//! ```
//!
//! Responses arrive as JSON and are decoded into typed records before they
//! are cached, so the envelope stores the typed value, not the raw body.
//! Records must therefore avoid serde attributes that need a
//! self-describing format (`untagged`, `flatten`, `skip_serializing_if`).
//!
//! # Example
//!
//! ```rust
//! use service_center_kit::serialization::{deserialize_from_cache, serialize_for_cache};
//!
//! # fn main() -> service_center_kit::Result<()> {
//! let costs = vec![500.0_f64, 1200.5];
//! let bytes = serialize_for_cache(&costs)?;
//! let back: Vec<f64> = deserialize_from_cache(&bytes)?;
//! assert_eq!(costs, back);
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Magic header for stored responses: b"SCRC"
pub const CACHE_MAGIC: [u8; 4] = *b"SCRC";

/// Current schema version.
///
/// **CRITICAL:** Increment when a cached record changes shape (fields
/// added, removed, reordered or retyped). Entries written by an older build
/// are then evicted and refetched instead of being misread.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Versioned envelope around a cached value.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CacheEnvelope<T> {
    /// Magic header: must be b"SCRC"
    pub magic: [u8; 4],
    /// Schema version: must match CURRENT_SCHEMA_VERSION
    pub version: u32,
    /// The cached value
    pub payload: T,
}

impl<T> CacheEnvelope<T> {
    /// Create a new envelope with current magic and version.
    pub fn new(payload: T) -> Self {
        Self {
            magic: CACHE_MAGIC,
            version: CURRENT_SCHEMA_VERSION,
            payload,
        }
    }
}

/// Wrap `value` in an envelope and encode it for storage.
///
/// # Errors
///
/// Returns `Error::SerializationError` if postcard rejects the value.
pub fn serialize_for_cache<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    postcard::to_allocvec(&CacheEnvelope::new(value)).map_err(|e| {
        error!("Failed to encode cached response: {}", e);
        Error::SerializationError(e.to_string())
    })
}

/// Decode a stored envelope and return its payload.
///
/// # Errors
///
/// - `Error::DeserializationError`: bytes do not decode as an envelope of `T`
/// - `Error::InvalidCacheEntry`: header is not `SCRC`
/// - `Error::VersionMismatch`: written by a build with another schema version
pub fn deserialize_from_cache<'de, T: Deserialize<'de>>(bytes: &'de [u8]) -> Result<T> {
    let envelope: CacheEnvelope<T> = postcard::from_bytes(bytes)
        .map_err(|e| Error::DeserializationError(e.to_string()))?;
    check_header(&envelope.magic, envelope.version)?;
    Ok(envelope.payload)
}

fn check_header(magic: &[u8; 4], version: u32) -> Result<()> {
    if *magic != CACHE_MAGIC {
        return Err(Error::InvalidCacheEntry(format!(
            "unexpected header {:?}",
            String::from_utf8_lossy(magic)
        )));
    }
    if version != CURRENT_SCHEMA_VERSION {
        return Err(Error::VersionMismatch {
            expected: CURRENT_SCHEMA_VERSION,
            found: version,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Job, ServiceRequest, ServiceRequestStatus};

    fn sample_request() -> ServiceRequest {
        ServiceRequest {
            id: 12,
            description: "Full service".to_string(),
            status: ServiceRequestStatus::Completed,
            vehicle_id: Some(3),
            vehicle_number: Some("KA-01-1234".to_string()),
            customer_id: Some(7),
            customer_name: Some("Asha Rao".to_string()),
            jobs: Some(vec![Job {
                id: 1,
                description: Some("Engine oil".to_string()),
                job_name: "Oil change".to_string(),
                cost: 500.0,
                service_request_id: Some(12),
                user_id: None,
                user_name: None,
                service_template_id: Some(4),
                service_template_name: Some("Oil change".to_string()),
            }]),
        }
    }

    #[test]
    fn test_typed_record_survives_envelope() {
        let request = sample_request();
        let bytes = serialize_for_cache(&request).unwrap();
        let back: ServiceRequest = deserialize_from_cache(&bytes).unwrap();
        assert_eq!(request, back);
    }

    #[test]
    fn test_envelope_structure() {
        let bytes = serialize_for_cache(&42u64).unwrap();
        let envelope: CacheEnvelope<u64> = postcard::from_bytes(&bytes).unwrap();

        assert_eq!(envelope.magic, CACHE_MAGIC);
        assert_eq!(envelope.version, CURRENT_SCHEMA_VERSION);
        assert_eq!(envelope.payload, 42);
    }

    #[test]
    fn test_invalid_magic_rejected() {
        let envelope = CacheEnvelope {
            magic: *b"XXXX",
            version: CURRENT_SCHEMA_VERSION,
            payload: 1u32,
        };
        let bytes = postcard::to_allocvec(&envelope).unwrap();

        let result: Result<u32> = deserialize_from_cache(&bytes);
        match result.unwrap_err() {
            Error::InvalidCacheEntry(_) => {}
            e => panic!("Expected InvalidCacheEntry, got {:?}", e),
        }
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let mut envelope = CacheEnvelope::new(sample_request());
        envelope.version = 999;

        let bytes = postcard::to_allocvec(&envelope).unwrap();
        let result: Result<ServiceRequest> = deserialize_from_cache(&bytes);

        match result.unwrap_err() {
            Error::VersionMismatch { expected, found } => {
                assert_eq!(expected, CURRENT_SCHEMA_VERSION);
                assert_eq!(found, 999);
            }
            e => panic!("Expected VersionMismatch, got {:?}", e),
        }
    }

    #[test]
    fn test_corrupted_payload_rejected() {
        let mut bytes = serialize_for_cache(&sample_request()).unwrap();
        let original_len = bytes.len();
        bytes.truncate(original_len / 2);

        let result: Result<ServiceRequest> = deserialize_from_cache(&bytes);
        match result.unwrap_err() {
            Error::DeserializationError(_) => {}
            e => panic!("Expected DeserializationError, got {:?}", e),
        }
    }

    #[test]
    fn test_floats_are_bit_identical() {
        let amounts = vec![0.1_f64 + 0.2, 1836.5450000000001, -170.05];
        let bytes = serialize_for_cache(&amounts).unwrap();
        let back: Vec<f64> = deserialize_from_cache(&bytes).unwrap();
        for (a, b) in amounts.iter().zip(back.iter()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }
}
