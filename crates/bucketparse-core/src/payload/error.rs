use thiserror::Error;

/// Errors turning a record value into payload bytes.
///
/// `InvalidDigit::index` and `OddLength::length` count bytes of the UTF-8
/// text. Any non-ASCII byte is itself an invalid digit, so the reported index
/// is also the char index.
///
/// # Examples
/// ```
/// use bucketparse_core::payload::HexError;
///
/// let err = HexError::OddLength { length: 3 };
/// assert!(err.to_string().contains("odd length"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HexError {
    #[error("payload value is not a hex string (found {found})")]
    NotText { found: &'static str },
    #[error("invalid hex digit {digit:?} at index {index}")]
    InvalidDigit { digit: char, index: usize },
    #[error("hex payload has odd length: {length}")]
    OddLength { length: usize },
}

/// Errors reading fields out of the payload bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("payload too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
}
