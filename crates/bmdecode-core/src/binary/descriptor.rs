use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use super::error::DescriptorError;
use super::layout;

/// Field type vocabulary for struct descriptors.
///
/// Tags parse from the short names (`uint16`, `float32`, ...) and from the C
/// spellings found in firmware headers (`uint16_t`, `float`, `double`, ...).
///
/// # Examples
/// ```
/// use bmdecode_core::FieldType;
///
/// let tag: FieldType = "double".parse()?;
/// assert_eq!(tag, FieldType::F64);
/// assert_eq!(tag.width(), 8);
/// assert!("char".parse::<FieldType>().is_err());
/// # Ok::<(), bmdecode_core::DescriptorError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    U16,
    I16,
    U32,
    I32,
    F32,
    U64,
    I64,
    F64,
}

impl FieldType {
    /// Width of the field on the wire, in bytes.
    pub fn width(self) -> usize {
        match self {
            FieldType::U16 | FieldType::I16 => layout::U16_WIDTH,
            FieldType::U32 | FieldType::I32 | FieldType::F32 => layout::U32_WIDTH,
            FieldType::U64 | FieldType::I64 | FieldType::F64 => layout::U64_WIDTH,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::U16 => "uint16",
            FieldType::I16 => "int16",
            FieldType::U32 => "uint32",
            FieldType::I32 => "int32",
            FieldType::F32 => "float32",
            FieldType::U64 => "uint64",
            FieldType::I64 => "int64",
            FieldType::F64 => "float64",
        }
    }
}

impl FromStr for FieldType {
    type Err = DescriptorError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim() {
            "uint16" | "uint16_t" => Ok(FieldType::U16),
            "int16" | "int16_t" => Ok(FieldType::I16),
            "uint32" | "uint32_t" => Ok(FieldType::U32),
            "int32" | "int32_t" => Ok(FieldType::I32),
            "float32" | "float" => Ok(FieldType::F32),
            "uint64" | "uint64_t" => Ok(FieldType::U64),
            "int64" | "int64_t" => Ok(FieldType::I64),
            "float64" | "double" => Ok(FieldType::F64),
            other => Err(DescriptorError::UnsupportedType {
                tag: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One (type, name) entry of a struct descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub field_type: FieldType,
    pub name: String,
}

/// Ordered field schema describing one fixed-width record.
///
/// Field names are unique and the field list is never empty. Descriptors are
/// immutable once built.
///
/// # Examples
/// ```
/// use bmdecode_core::{FieldType, StructDescriptor};
///
/// let descriptor = StructDescriptor::new([
///     (FieldType::U16, "sample_count"),
///     (FieldType::F32, "mean"),
/// ])?;
/// assert_eq!(descriptor.size_bytes(), 6);
/// assert_eq!(descriptor.hex_len(), 12);
/// # Ok::<(), bmdecode_core::DescriptorError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDescriptor {
    fields: Vec<FieldSpec>,
}

impl StructDescriptor {
    pub fn new<I, S>(fields: I) -> Result<Self, DescriptorError>
    where
        I: IntoIterator<Item = (FieldType, S)>,
        S: Into<String>,
    {
        let fields: Vec<FieldSpec> = fields
            .into_iter()
            .map(|(field_type, name)| FieldSpec {
                field_type,
                name: name.into(),
            })
            .collect();
        if fields.is_empty() {
            return Err(DescriptorError::Empty);
        }
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(DescriptorError::DuplicateField {
                    name: field.name.clone(),
                });
            }
        }
        Ok(Self { fields })
    }

    /// Build a descriptor from (tag, name) string pairs.
    ///
    /// # Errors
    /// `UnsupportedType` for a tag outside the vocabulary, plus the errors of
    /// [`StructDescriptor::new`].
    pub fn from_tags<I, T, S>(fields: I) -> Result<Self, DescriptorError>
    where
        I: IntoIterator<Item = (T, S)>,
        T: AsRef<str>,
        S: Into<String>,
    {
        let typed = fields
            .into_iter()
            .map(|(tag, name)| -> Result<(FieldType, S), DescriptorError> {
                Ok((tag.as_ref().parse::<FieldType>()?, name))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(typed)
    }

    /// Aanderaa adapter DVT1 record (18 bytes).
    pub fn dvt1() -> Self {
        Self::from_layout(&layout::DVT1_FIELDS)
    }

    /// RBR CODA record (34 bytes).
    pub fn rbr_coda() -> Self {
        Self::from_layout(&layout::RBR_CODA_FIELDS)
    }

    fn from_layout(fields: &[(FieldType, &str)]) -> Self {
        Self {
            fields: fields
                .iter()
                .map(|(field_type, name)| FieldSpec {
                    field_type: *field_type,
                    name: (*name).to_string(),
                })
                .collect(),
        }
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Total record size in bytes.
    pub fn size_bytes(&self) -> usize {
        self.fields.iter().map(|field| field.field_type.width()).sum()
    }

    /// Number of hex characters one record occupies.
    pub fn hex_len(&self) -> usize {
        self.size_bytes() * layout::HEX_CHARS_PER_BYTE
    }
}

/// Compute the byte size of a record from its raw type tags.
///
/// # Examples
/// ```
/// use bmdecode_core::struct_size_bytes;
///
/// assert_eq!(struct_size_bytes(&["uint16_t", "float", "double"])?, 14);
/// assert!(struct_size_bytes(&["uint8_t"]).is_err());
/// # Ok::<(), bmdecode_core::DescriptorError>(())
/// ```
pub fn struct_size_bytes<T: AsRef<str>>(tags: &[T]) -> Result<usize, DescriptorError> {
    tags.iter()
        .try_fold(0usize, |size, tag| -> Result<usize, DescriptorError> {
            Ok(size + tag.as_ref().parse::<FieldType>()?.width())
        })
}

#[cfg(test)]
mod tests {
    use super::{FieldType, StructDescriptor, struct_size_bytes};
    use crate::binary::error::DescriptorError;
    use crate::binary::layout;

    #[test]
    fn builtin_sizes() {
        assert_eq!(StructDescriptor::dvt1().size_bytes(), 18);
        assert_eq!(StructDescriptor::rbr_coda().size_bytes(), 34);
        assert_eq!(StructDescriptor::dvt1().hex_len(), 36);
    }

    #[test]
    fn builtin_layouts_pass_validation() {
        let dvt1 = StructDescriptor::new(layout::DVT1_FIELDS).unwrap();
        assert_eq!(dvt1, StructDescriptor::dvt1());
        let rbr = StructDescriptor::new(layout::RBR_CODA_FIELDS).unwrap();
        assert_eq!(rbr, StructDescriptor::rbr_coda());
    }

    #[test]
    fn widths_cover_vocabulary() {
        let tags = [
            "uint16", "int16", "uint32", "int32", "float32", "uint64", "int64", "float64",
        ];
        assert_eq!(struct_size_bytes(&tags).unwrap(), 2 + 2 + 4 + 4 + 4 + 8 + 8 + 8);
    }

    #[test]
    fn c_spellings_parse() {
        assert_eq!("uint16_t".parse::<FieldType>().unwrap(), FieldType::U16);
        assert_eq!("float".parse::<FieldType>().unwrap(), FieldType::F32);
        assert_eq!("double".parse::<FieldType>().unwrap(), FieldType::F64);
        assert_eq!("int64_t".parse::<FieldType>().unwrap(), FieldType::I64);
    }

    #[test]
    fn unsupported_tag_is_rejected() {
        let err = struct_size_bytes(&["uint16_t", "bool"]).unwrap_err();
        assert_eq!(
            err,
            DescriptorError::UnsupportedType {
                tag: "bool".to_string()
            }
        );

        let err = StructDescriptor::from_tags([("uint8_t", "flag")]).unwrap_err();
        assert!(matches!(err, DescriptorError::UnsupportedType { .. }));
    }

    #[test]
    fn duplicate_field_names_are_rejected() {
        let err = StructDescriptor::new([(FieldType::U16, "mean"), (FieldType::F32, "mean")])
            .unwrap_err();
        assert_eq!(
            err,
            DescriptorError::DuplicateField {
                name: "mean".to_string()
            }
        );
    }

    #[test]
    fn empty_descriptor_is_rejected() {
        let fields: [(FieldType, &str); 0] = [];
        assert_eq!(
            StructDescriptor::new(fields).unwrap_err(),
            DescriptorError::Empty
        );
    }

    #[test]
    fn empty_tag_list_has_zero_size() {
        let tags: [&str; 0] = [];
        assert_eq!(struct_size_bytes(&tags).unwrap(), 0);
    }
}
