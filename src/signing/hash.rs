//! Solidity-style packed Keccak-256 hashing
//!
//! Mirrors `keccak256(abi.encodePacked(...))`: every value is encoded per its
//! declared type and the encodings are concatenated without padding between
//! elements.
//!
//! | type      | packed encoding                          |
//! |-----------|------------------------------------------|
//! | `string`  | raw UTF-8 bytes                          |
//! | `bytes`   | raw bytes                                |
//! | `bytesN`  | raw N bytes                              |
//! | `uint256` | 32-byte big-endian, value mod 2^256      |

use num_bigint::BigUint;
use num_traits::{Num, One};
use sha3::{Digest, Keccak256};

use super::errors::{SigningError, SigningResult};

/// A typed value ready for packed encoding.
///
/// The ABI type and the value travel together, so a type list and a value
/// list can never disagree in length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackedValue<'a> {
    String(&'a str),
    Bytes(&'a [u8]),
    /// `bytes1` .. `bytes32`, already sized by the caller
    FixedBytes(&'a [u8]),
    Uint256(BigUint),
}

impl PackedValue<'_> {
    fn append_to(&self, hasher: &mut Keccak256) {
        match self {
            PackedValue::String(s) => hasher.update(s.as_bytes()),
            PackedValue::Bytes(b) | PackedValue::FixedBytes(b) => hasher.update(b),
            PackedValue::Uint256(n) => hasher.update(uint256_bytes(n)),
        }
    }
}

/// Encode an integer as a 32-byte big-endian word.
///
/// Values wider than 256 bits keep their low 256 bits, matching the U256
/// conversion of the Ethereum tooling the exchange was built against.
pub fn uint256_bytes(value: &BigUint) -> [u8; 32] {
    let modulus = BigUint::one() << 256u32;
    let reduced = value % &modulus;
    let bytes = reduced.to_bytes_be();

    let mut word = [0u8; 32];
    word[32 - bytes.len()..].copy_from_slice(&bytes);
    word
}

/// Keccak-256 over the packed encoding of `values`
pub fn solidity_keccak256(values: &[PackedValue<'_>]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    for value in values {
        value.append_to(&mut hasher);
    }
    hasher.finalize().into()
}

/// Keccak-256 of a single UTF-8 string (`keccak256(abi.encodePacked(s))`)
pub fn hash_string(input: &str) -> [u8; 32] {
    solidity_keccak256(&[PackedValue::String(input)])
}

/// Hex-encode a digest with a `0x` prefix
pub fn to_hex_hash(digest: &[u8; 32]) -> String {
    format!("0x{}", hex::encode(digest))
}

/// Tag-driven variant of [`solidity_keccak256`].
///
/// Values are written the way Ethereum tooling writes them: `0x` hex for
/// `bytes`/`bytesN`, decimal (or `0x` hex) for `uint256`, plain text for
/// `string`. Mismatched list lengths, unknown tags and malformed values are
/// rejected before anything is hashed.
pub fn solidity_keccak256_tagged(tags: &[&str], values: &[&str]) -> SigningResult<[u8; 32]> {
    if tags.len() != values.len() {
        return Err(SigningError::EncodingFailure(format!(
            "{} type tags for {} values",
            tags.len(),
            values.len()
        )));
    }

    let mut encoded: Vec<Vec<u8>> = Vec::with_capacity(values.len());
    for (tag, value) in tags.iter().zip(values) {
        let bytes = match *tag {
            "string" => value.as_bytes().to_vec(),
            "uint256" => uint256_bytes(&parse_uint(value)?).to_vec(),
            "bytes" => decode_hex(value)?,
            fixed if fixed.starts_with("bytes") => {
                let size: usize = fixed[5..].parse().map_err(|_| {
                    SigningError::EncodingFailure(format!("Unsupported type tag: {}", fixed))
                })?;
                let bytes = decode_hex(value)?;
                if size == 0 || size > 32 || bytes.len() != size {
                    return Err(SigningError::EncodingFailure(format!(
                        "Value {} does not fit {}",
                        value, fixed
                    )));
                }
                bytes
            }
            other => {
                return Err(SigningError::EncodingFailure(format!(
                    "Unsupported type tag: {}",
                    other
                )))
            }
        };
        encoded.push(bytes);
    }

    let packed: Vec<PackedValue<'_>> = encoded.iter().map(|b| PackedValue::Bytes(b)).collect();
    Ok(solidity_keccak256(&packed))
}

fn decode_hex(value: &str) -> SigningResult<Vec<u8>> {
    let stripped = value.strip_prefix("0x").unwrap_or(value);
    hex::decode(stripped)
        .map_err(|e| SigningError::EncodingFailure(format!("Invalid hex {}: {}", value, e)))
}

fn parse_uint(value: &str) -> SigningResult<BigUint> {
    let parsed = match value.strip_prefix("0x") {
        Some(hex_digits) => BigUint::from_str_radix(hex_digits, 16),
        None => BigUint::from_str_radix(value, 10),
    };
    parsed.map_err(|e| SigningError::EncodingFailure(format!("Invalid uint256 {}: {}", value, e)))
}
