//! Typed signature encoding
//!
//! Wallet backends return `v` either as 0/1 or as 27/28. The exchange
//! verifier expects 27/28 followed by a one-byte signature scheme tag.

use std::fmt;

use super::errors::{SigningError, SigningResult};

/// Hex length of a raw r‖s‖v signature without the `0x` prefix
pub const RAW_SIGNATURE_HEX_LEN: usize = 130;

/// Signature scheme selector appended to a typed signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureType {
    NoPrepend = 0,
    Decimal = 1,
    Hexadecimal = 2,
}

impl fmt::Display for SignatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

/// Normalize a raw `0x` + 130 hex char signature and append the scheme tag.
///
/// The tag is written as a single byte (`00`, `01` or `02`), so the output
/// is always `0x` followed by 132 lowercase hex characters.
pub fn create_typed_signature(signature: &str, sig_type: SignatureType) -> SigningResult<String> {
    let fixed = fix_raw_signature(signature)?;
    Ok(format!("{}0{}", fixed, sig_type))
}

/// Rewrite the trailing `v` byte into the 27/28 convention
pub fn fix_raw_signature(signature: &str) -> SigningResult<String> {
    let stripped = signature.strip_prefix("0x").unwrap_or(signature);
    if stripped.len() != RAW_SIGNATURE_HEX_LEN || hex::decode(stripped).is_err() {
        return Err(SigningError::InvalidSignatureFormat(format!(
            "Invalid raw signature: {}",
            signature
        )));
    }

    let stripped = stripped.to_ascii_lowercase();
    let (rs, v) = stripped.split_at(128);
    match v {
        "00" => Ok(format!("0x{}1b", rs)),
        "01" => Ok(format!("0x{}1c", rs)),
        "1b" | "1c" => Ok(format!("0x{}", stripped)),
        other => Err(SigningError::InvalidRecoveryId(format!("Invalid v value: {}", other))),
    }
}
