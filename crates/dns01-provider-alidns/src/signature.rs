//! RPC request signing (signature version 1.0, HMAC-SHA1)
//!
//! ```text
//! canonical     = sorted k=v pairs, RFC 3986 encoded, joined by '&'
//! string_to_sign = "GET&%2F&" + encode(canonical)
//! signature      = base64(HMAC-SHA1(secret + "&", string_to_sign))
//! ```

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha1::Sha1;

use dns01_core::{Error, Result};

type HmacSha1 = Hmac<Sha1>;

/// Everything except the RFC 3986 unreserved characters
const RFC3986: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// RFC 3986 percent-encoding (space becomes `%20`, `*` becomes `%2A`)
pub fn percent_encode(value: &str) -> String {
    utf8_percent_encode(value, RFC3986).to_string()
}

/// Sorted, encoded `k=v&k=v` form of the parameters
pub fn canonical_query(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// String signed for a GET request against `/`
pub fn string_to_sign(canonical: &str) -> String {
    format!("GET&{}&{}", percent_encode("/"), percent_encode(canonical))
}

/// Sign the parameters with the access key secret
///
/// Returns the canonical query and its base64 signature.
pub fn sign(params: &BTreeMap<String, String>, access_key_secret: &str) -> Result<(String, String)> {
    let canonical = canonical_query(params);

    let mut mac = HmacSha1::new_from_slice(format!("{}&", access_key_secret).as_bytes())
        .map_err(|e| Error::provider("alidns", format!("HMAC error: {}", e)))?;
    mac.update(string_to_sign(&canonical).as_bytes());
    let signature = STANDARD.encode(mac.finalize().into_bytes());

    Ok((canonical, signature))
}
