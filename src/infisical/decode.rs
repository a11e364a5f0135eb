//! Response decoding
//!
//! A response body is a scoped resource: [`decode`] reads it, parses it, and
//! closes it on every exit path. Parsing and releasing are reported
//! separately because a failed close does not invalidate parsed records.

use crate::error::{ProviderError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::future::Future;
use std::io;

/// A response body that must be closed once read
pub trait ResponseBody: Send {
    /// Read the remaining bytes of the body
    fn read_all(&mut self) -> impl Future<Output = io::Result<Vec<u8>>> + Send;

    /// Release the body
    fn close(self) -> io::Result<()>;
}

/// Outcome of decoding one body
#[derive(Debug)]
pub struct Decoded<T> {
    pub records: Result<T>,
    pub release: Result<()>,
}

/// Read, parse and close `body`. `resource` names what is decoded and ends up
/// in error messages.
pub async fn decode<T, B>(resource: &'static str, mut body: B) -> Decoded<T>
where
    T: DeserializeOwned + Default,
    B: ResponseBody,
{
    let records = match body.read_all().await {
        Ok(bytes) => parse(resource, &bytes),
        Err(e) => Err(ProviderError::BodyRead(e)),
    };

    let release = body.close().map_err(ProviderError::ResourceRelease);
    if let Err(e) = &release {
        tracing::warn!("{}: {}", resource, e);
    }

    Decoded { records, release }
}

/// Parse a complete body.
///
/// An empty (or whitespace-only) body and a JSON `null` both mean "no data"
/// and yield `T::default()`. Anything else must match `T`.
pub fn parse<T>(resource: &'static str, bytes: &[u8]) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if bytes.iter().all(u8::is_ascii_whitespace) {
        tracing::debug!("{}: empty response body", resource);
        return Ok(T::default());
    }

    serde_json::from_slice::<Option<T>>(bytes)
        .map(Option::unwrap_or_default)
        .map_err(|source| ProviderError::Decode { resource, source })
}

/// Field deserializer treating an explicit `null` like a missing value.
/// Pair with `#[serde(default)]`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
