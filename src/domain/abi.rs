//! Minimal ABI encoding for contract calls.
//!
//! Covers zero-argument calls, calls taking a single dynamic `string`, and
//! decoding a `string` return value.

use sha3::{Digest, Keccak256};
use thiserror::Error;

const WORD: usize = 32;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AbiError {
    #[error("ABI data too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("ABI offset or length out of range")]
    OutOfRange,
    #[error("ABI string is not valid UTF-8")]
    InvalidUtf8,
}

/// Returns the 4-byte selector for a canonical signature like `update(string)`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Calldata for a function that takes no arguments.
pub fn encode_call(signature: &str) -> Vec<u8> {
    selector(signature).to_vec()
}

/// Calldata for a function whose only argument is a `string`.
///
/// Layout: `selector || offset (0x20) || length || bytes padded to 32`.
pub fn encode_string_call(signature: &str, value: &str) -> Vec<u8> {
    let bytes = value.as_bytes();
    let padded_len = bytes.len().div_ceil(WORD) * WORD;

    let mut data = Vec::with_capacity(4 + 2 * WORD + padded_len);
    data.extend_from_slice(&selector(signature));
    data.extend_from_slice(&usize_word(WORD));
    data.extend_from_slice(&usize_word(bytes.len()));
    data.extend_from_slice(bytes);
    data.resize(4 + 2 * WORD + padded_len, 0);
    data
}

/// Decodes return data holding a single `string`.
pub fn decode_string(data: &[u8]) -> Result<String, AbiError> {
    let offset = read_usize(data, 0)?;
    let length = read_usize(data, offset)?;
    let start = offset.checked_add(WORD).ok_or(AbiError::OutOfRange)?;
    let end = start.checked_add(length).ok_or(AbiError::OutOfRange)?;
    let bytes = data.get(start..end).ok_or(AbiError::TooShort {
        needed: end,
        actual: data.len(),
    })?;
    String::from_utf8(bytes.to_vec()).map_err(|_| AbiError::InvalidUtf8)
}

fn usize_word(value: usize) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&(value as u64).to_be_bytes());
    word
}

fn read_usize(data: &[u8], at: usize) -> Result<usize, AbiError> {
    let end = at.checked_add(WORD).ok_or(AbiError::OutOfRange)?;
    let word = data.get(at..end).ok_or(AbiError::TooShort {
        needed: end,
        actual: data.len(),
    })?;
    if word[..WORD - 8].iter().any(|b| *b != 0) {
        return Err(AbiError::OutOfRange);
    }
    let mut low = [0u8; 8];
    low.copy_from_slice(&word[WORD - 8..]);
    usize::try_from(u64::from_be_bytes(low)).map_err(|_| AbiError::OutOfRange)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_selectors() {
        assert_eq!(hex::encode(selector("transfer(address,uint256)")), "a9059cbb");
        assert_eq!(hex::encode(selector("balanceOf(address)")), "70a08231");
    }

    #[test]
    fn test_encode_call_is_selector_only() {
        let data = encode_call("message()");
        assert_eq!(data, selector("message()").to_vec());
    }

    #[test]
    fn test_encode_string_call_layout() {
        let data = encode_string_call("update(string)", "hello");
        assert_eq!(data.len(), 4 + 3 * 32);
        assert_eq!(&data[..4], &selector("update(string)"));
        assert_eq!(data[4 + 31], 0x20);
        assert_eq!(data[4 + 63], 5);
        assert_eq!(&data[4 + 64..4 + 69], b"hello");
        assert!(data[4 + 69..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_encode_string_exact_word() {
        let value = "a".repeat(32);
        let data = encode_string_call("update(string)", &value);
        assert_eq!(data.len(), 4 + 3 * 32);

        let empty = encode_string_call("update(string)", "");
        assert_eq!(empty.len(), 4 + 2 * 32);
    }

    #[test]
    fn test_decode_string_from_encoded_arguments() {
        let message = "Hello from the wallet session, with a message longer than one word";
        let data = encode_string_call("update(string)", message);
        assert_eq!(decode_string(&data[4..]).unwrap(), message);
    }

    #[test]
    fn test_decode_string_truncated() {
        let data = encode_string_call("update(string)", "hello");
        let err = decode_string(&data[4..4 + 64 + 2]).unwrap_err();
        assert!(matches!(err, AbiError::TooShort { .. }));

        assert!(matches!(
            decode_string(&[0u8; 10]),
            Err(AbiError::TooShort { needed: 32, actual: 10 })
        ));
    }

    #[test]
    fn test_decode_string_rejects_huge_offset() {
        let mut data = vec![0xffu8; 32];
        data.extend_from_slice(&[0u8; 32]);
        assert_eq!(decode_string(&data), Err(AbiError::OutOfRange));
    }

    #[test]
    fn test_decode_string_invalid_utf8() {
        let mut data = usize_word(32).to_vec();
        data.extend_from_slice(&usize_word(2));
        data.extend_from_slice(&[0xff, 0xfe]);
        data.resize(96, 0);
        assert_eq!(decode_string(&data), Err(AbiError::InvalidUtf8));
    }
}
