use hex::FromHexError;
use serde_json::Value;

use super::error::HexError;

/// Borrow the hex text of a record value.
pub fn hex_text(value: Option<&Value>) -> Result<&str, HexError> {
    match value {
        Some(Value::String(text)) => Ok(text),
        Some(other) => Err(HexError::NotText {
            found: json_kind(other),
        }),
        None => Err(HexError::NotText { found: "no value" }),
    }
}

/// Decode a hexadecimal string into bytes.
///
/// Both digit cases are accepted. The length is checked before the digits, and
/// an empty string yields an empty buffer.
///
/// # Examples
/// ```
/// use bucketparse_core::payload::decode_hex;
///
/// assert_eq!(decode_hex("0961")?, vec![0x09, 0x61]);
/// assert!(decode_hex("ZZ").is_err());
/// # Ok::<(), bucketparse_core::payload::HexError>(())
/// ```
pub fn decode_hex(text: &str) -> Result<Vec<u8>, HexError> {
    hex::decode(text).map_err(|err| match err {
        FromHexError::InvalidHexCharacter { c, index } => {
            HexError::InvalidDigit { digit: c, index }
        }
        FromHexError::OddLength | FromHexError::InvalidStringLength => HexError::OddLength {
            length: text.len(),
        },
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
