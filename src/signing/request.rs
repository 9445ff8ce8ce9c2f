//! REST request signing
//!
//! `DYDX-SIGNATURE = base64url(HMAC-SHA256(secret, timestamp + method + path + body))`
//! where `secret` is the base64url-decoded API secret.

use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::errors::{SigningError, SigningResult};

type HmacSha256 = Hmac<Sha256>;

/// Parts of an outgoing request covered by the HMAC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestDescriptor<'a> {
    /// UTC, millisecond precision, `YYYY-MM-DDTHH:mm:ss.sssZ`
    pub iso_timestamp: &'a str,
    pub method: &'a str,
    /// Path including `/v3/` prefix and query string
    pub request_path: &'a str,
    pub body: &'a str,
}

impl RequestDescriptor<'_> {
    fn message(&self) -> String {
        format!(
            "{}{}{}{}",
            self.iso_timestamp, self.method, self.request_path, self.body
        )
    }
}

/// Compute the request signature header value
pub fn sign_request(secret: &str, request: &RequestDescriptor<'_>) -> SigningResult<String> {
    let secret_bytes = URL_SAFE
        .decode(secret)
        .map_err(|e| SigningError::EncodingFailure(format!("Invalid API secret: {}", e)))?;

    let mut mac = HmacSha256::new_from_slice(&secret_bytes)
        .map_err(|e| SigningError::EncodingFailure(format!("Invalid HMAC key: {}", e)))?;
    mac.update(request.message().as_bytes());

    Ok(URL_SAFE.encode(mac.finalize().into_bytes()))
}

/// Format a UTC instant the way the exchange expects
pub fn format_iso(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current time as a request timestamp
pub fn generate_now_iso() -> String {
    format_iso(Utc::now())
}

/// Timestamp `duration` from now (order expirations)
pub fn expire_after(duration: Duration) -> SigningResult<String> {
    let out_of_range = || {
        SigningError::EncodingFailure(format!(
            "Expiration {}s from now is out of range",
            duration.as_secs()
        ))
    };
    let offset = chrono::Duration::from_std(duration).map_err(|_| out_of_range())?;
    let instant = Utc::now()
        .checked_add_signed(offset)
        .ok_or_else(out_of_range)?;
    Ok(format_iso(instant))
}
