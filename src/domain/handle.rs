//! Node Handles
//!
//! Every node id handed to callers is a region-qualified handle of the form
//! `region/local-id` (e.g. `us-east-1/i-0abc123`). Strategies decode it to
//! recover the region before talking to the provider.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Separator between region and provider-local id
pub const DELIMITER: char = '/';

/// Region-qualified node identifier, serialized in its encoded form
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Handle {
    region: String,
    local_id: String,
}

impl Handle {
    /// Create a handle, validating both parts
    pub fn new(region: impl Into<String>, local_id: impl Into<String>) -> Result<Self> {
        let region = region.into();
        let local_id = local_id.into();

        for (part, value) in [("region", &region), ("local id", &local_id)] {
            if value.is_empty() {
                return Err(Error::malformed_handle(
                    encode_handle(&region, &local_id),
                    format!("empty {}", part),
                ));
            }
            if value.contains(DELIMITER) {
                return Err(Error::malformed_handle(
                    encode_handle(&region, &local_id),
                    format!("{} contains '{}'", part, DELIMITER),
                ));
            }
        }

        Ok(Self { region, local_id })
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn local_id(&self) -> &str {
        &self.local_id
    }

    /// Encoded opaque id
    pub fn encode(&self) -> String {
        encode_handle(&self.region, &self.local_id)
    }

    pub fn into_parts(self) -> (String, String) {
        (self.region, self.local_id)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.region, DELIMITER, self.local_id)
    }
}

impl FromStr for Handle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        decode_handle(s)
    }
}

impl TryFrom<String> for Handle {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        decode_handle(&value)
    }
}

impl From<Handle> for String {
    fn from(handle: Handle) -> Self {
        handle.encode()
    }
}

/// Encode a region and provider-local id into an opaque node id.
///
/// No validation happens here; a delimiter inside either part makes the
/// result undecodable.
pub fn encode_handle(region: &str, local_id: &str) -> String {
    format!("{}{}{}", region, DELIMITER, local_id)
}

/// Decode an opaque node id into its region and provider-local id
pub fn decode_handle(id: &str) -> Result<Handle> {
    if id.is_empty() {
        return Err(Error::malformed_handle(id, "empty handle"));
    }

    let mut parts = id.split(DELIMITER);
    let (region, local_id) = match (parts.next(), parts.next(), parts.next()) {
        (Some(region), Some(local_id), None) => (region, local_id),
        (_, None, _) => {
            return Err(Error::malformed_handle(
                id,
                format!("expected region{}id", DELIMITER),
            ))
        }
        _ => {
            return Err(Error::malformed_handle(
                id,
                format!("more than one '{}'", DELIMITER),
            ))
        }
    };

    if region.is_empty() || local_id.is_empty() {
        return Err(Error::malformed_handle(id, "empty region or id"));
    }

    Ok(Handle {
        region: region.to_string(),
        local_id: local_id.to_string(),
    })
}
