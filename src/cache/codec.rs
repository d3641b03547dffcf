//! Entry Codec Module
//!
//! Stateless transform between a typed value plus its eviction
//! deadline and the (payload string, metadata map) pair handed to the
//! store. Value bytes are serde_json, optionally sealed by the
//! encryption capability, then base64-encoded so arbitrary byte
//! output survives the store's string payload byte-exactly.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use serde::Serialize;

use crate::crypto::EncrypterDecrypter;
use crate::error::{CacheError, Result};
use crate::store::Metadata;

/// Metadata key the eviction deadline is stored under.
pub const EVICTION_TIME_KEY: &str = "EVICTION_TIME";

// == Encode ==
/// Packs a value and its deadline into a store payload and metadata.
pub fn encode<T: Serialize>(
    key: &str,
    value: &T,
    eviction_time: u64,
    crypto: &dyn EncrypterDecrypter,
) -> Result<(String, Metadata)> {
    let bytes = serde_json::to_vec(value).map_err(|err| CacheError::Encoding(key.to_string(), err))?;
    let sealed = crypto
        .encrypt(&bytes, key)
        .map_err(|err| CacheError::Encryption(key.to_string(), err.to_string()))?;
    let payload = BASE64_STANDARD.encode(sealed);

    let mut metadata = Metadata::with_capacity(1);
    metadata.insert(
        EVICTION_TIME_KEY.to_string(),
        serde_json::json!(eviction_time),
    );
    Ok((payload, metadata))
}

// == Eviction Time Of ==
/// Extracts the eviction deadline from entry metadata.
///
/// Split out from payload decoding so a read can check expiration
/// before paying for decryption.
pub fn eviction_time_of(key: &str, metadata: &Metadata) -> Result<u64> {
    metadata
        .get(EVICTION_TIME_KEY)
        .ok_or_else(|| {
            CacheError::MalformedMetadata(key.to_string(), "EVICTION_TIME missing".to_string())
        })?
        .as_u64()
        .ok_or_else(|| {
            CacheError::MalformedMetadata(
                key.to_string(),
                "EVICTION_TIME is not an unsigned integer".to_string(),
            )
        })
}

// == Open Payload ==
/// Reverses the text encoding and the encryption, yielding the
/// serialized value bytes.
pub fn open_payload(
    key: &str,
    payload: &str,
    crypto: &dyn EncrypterDecrypter,
) -> Result<Vec<u8>> {
    let sealed = BASE64_STANDARD
        .decode(payload)
        .map_err(|err| CacheError::Decoding(key.to_string(), err.to_string()))?;
    crypto
        .decrypt(&sealed, key)
        .map_err(|err| CacheError::Decryption(key.to_string(), err.to_string()))
}
