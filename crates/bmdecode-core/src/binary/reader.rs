use super::descriptor::FieldType;
use super::error::DecodeError;
use crate::FieldValue;

/// Remove every whitespace character from a hex payload.
///
/// # Examples
/// ```
/// use bmdecode_core::binary::reader::strip_whitespace;
///
/// assert_eq!(strip_whitespace(" b1 00\n5a\t"), "b1005a");
/// ```
pub fn strip_whitespace(payload: &str) -> String {
    payload.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Convert a whitespace-free hex string to bytes (either case accepted).
///
/// # Examples
/// ```
/// use bmdecode_core::binary::reader::hex_to_bytes;
///
/// assert_eq!(hex_to_bytes("B100ff")?, vec![0xb1, 0x00, 0xff]);
/// # Ok::<(), bmdecode_core::DecodeError>(())
/// ```
///
/// # Errors
/// `InvalidHex` for a non-hex character, `OddHexLength` when a trailing
/// nibble has no partner.
pub fn hex_to_bytes(digits: &str) -> Result<Vec<u8>, DecodeError> {
    hex::decode(digits).map_err(|err| match err {
        hex::FromHexError::InvalidHexCharacter { c, index } => DecodeError::InvalidHex {
            position: index,
            character: c,
        },
        _ => DecodeError::OddHexLength {
            length: digits.len(),
        },
    })
}

/// Sequential little-endian reader over one record.
pub struct RecordReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> RecordReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    pub fn require_len(&self, needed: usize) -> Result<(), DecodeError> {
        if self.bytes.len() != needed {
            return Err(DecodeError::ByteLengthMismatch {
                expected: needed,
                actual: self.bytes.len(),
            });
        }
        Ok(())
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    pub fn read_value(&mut self, field_type: FieldType) -> Result<FieldValue, DecodeError> {
        let value = match field_type {
            FieldType::U16 => FieldValue::Unsigned(u16::from_le_bytes(self.take()?) as u64),
            FieldType::I16 => FieldValue::Signed(i16::from_le_bytes(self.take()?) as i64),
            FieldType::U32 => FieldValue::Unsigned(u32::from_le_bytes(self.take()?) as u64),
            FieldType::I32 => FieldValue::Signed(i32::from_le_bytes(self.take()?) as i64),
            FieldType::F32 => FieldValue::Float(f32::from_le_bytes(self.take()?) as f64),
            FieldType::U64 => FieldValue::Unsigned(u64::from_le_bytes(self.take()?)),
            FieldType::I64 => FieldValue::Signed(i64::from_le_bytes(self.take()?)),
            FieldType::F64 => FieldValue::Float(f64::from_le_bytes(self.take()?)),
        };
        Ok(value)
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let end = self.offset + N;
        let bytes = self
            .bytes
            .get(self.offset..end)
            .ok_or(DecodeError::ByteLengthMismatch {
                expected: end,
                actual: self.bytes.len(),
            })?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        self.offset = end;
        Ok(out)
    }
}
