use thiserror::Error;

/// Errors raised while building a struct descriptor.
///
/// # Examples
/// ```
/// use bmdecode_core::binary::error::DescriptorError;
///
/// let err = DescriptorError::UnsupportedType { tag: "char".to_string() };
/// assert!(err.to_string().contains("unsupported struct data type"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("unsupported struct data type: {tag}")]
    UnsupportedType { tag: String },
    #[error("duplicate field name in struct descriptor: {name}")]
    DuplicateField { name: String },
    #[error("struct descriptor has no fields")]
    Empty,
}

/// Errors returned by payload decoding.
///
/// # Examples
/// ```
/// use bmdecode_core::binary::error::DecodeError;
///
/// let err = DecodeError::ByteLengthMismatch { expected: 18, actual: 17 };
/// assert!(err.to_string().contains("expected 18 bytes"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error(
        "payload length mismatch: expected {expected} hex characters for {channels} channels, got {actual}"
    )]
    PayloadLengthMismatch {
        expected: usize,
        actual: usize,
        channels: usize,
    },
    #[error("byte length mismatch: expected {expected} bytes, got {actual}")]
    ByteLengthMismatch { expected: usize, actual: usize },
    #[error("invalid hex character {character:?} at position {position}")]
    InvalidHex { position: usize, character: char },
    #[error("odd hex length: {length}")]
    OddHexLength { length: usize },
}
