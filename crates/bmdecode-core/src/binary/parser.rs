use super::descriptor::StructDescriptor;
use super::error::DecodeError;
use super::reader::{RecordReader, hex_to_bytes, strip_whitespace};
use crate::{ChannelData, DecodedChannel};

/// Decode a hex payload into one channel per name, in name order.
///
/// Every channel slot uses the same descriptor. The stripped payload must
/// hold exactly `channel_names.len()` records.
///
/// # Examples
/// ```
/// use bmdecode_core::{FieldType, FieldValue, StructDescriptor, decode_payload_to_structs};
///
/// let descriptor = StructDescriptor::new([(FieldType::U16, "count")])?;
/// let channels = decode_payload_to_structs("0100 ff00", &["a", "b"], &descriptor)?;
/// assert_eq!(channels[1].channel_name, "b");
/// assert_eq!(channels[1].data.get("count"), Some(FieldValue::Unsigned(255)));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// # Errors
/// `PayloadLengthMismatch` when the payload length does not match the
/// channel count, `InvalidHex` for non-hex characters.
pub fn decode_payload_to_structs<S: AsRef<str>>(
    hex_payload: &str,
    channel_names: &[S],
    descriptor: &StructDescriptor,
) -> Result<Vec<DecodedChannel>, DecodeError> {
    let trimmed = strip_whitespace(hex_payload);
    let record_hex_len = descriptor.hex_len();
    let expected = channel_names.len() * record_hex_len;
    if trimmed.len() != expected {
        return Err(DecodeError::PayloadLengthMismatch {
            expected,
            actual: trimmed.len(),
            channels: channel_names.len(),
        });
    }

    let bytes = hex_to_bytes(&trimmed)?;
    let record_len = descriptor.size_bytes();
    channel_names
        .iter()
        .zip(bytes.chunks(record_len))
        .map(|(name, record)| -> Result<DecodedChannel, DecodeError> {
            Ok(DecodedChannel {
                channel_name: name.as_ref().to_string(),
                data: decode_record(record, descriptor)?,
            })
        })
        .collect()
}

/// Unpack one record's bytes per descriptor field order.
///
/// # Errors
/// `ByteLengthMismatch` unless `bytes` is exactly one record long.
pub fn decode_record(bytes: &[u8], descriptor: &StructDescriptor) -> Result<ChannelData, DecodeError> {
    let mut reader = RecordReader::new(bytes);
    reader.require_len(descriptor.size_bytes())?;

    let mut data = ChannelData::new();
    for field in descriptor.fields() {
        data.insert(field.name.clone(), reader.read_value(field.field_type)?);
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::{decode_payload_to_structs, decode_record};
    use crate::FieldValue;
    use crate::binary::descriptor::{FieldType, StructDescriptor};
    use crate::binary::error::DecodeError;
    use crate::binary::layout;

    fn dvt1_record(count: u16, stats: [f32; 4]) -> String {
        let mut bytes = count.to_le_bytes().to_vec();
        for value in stats {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }

    #[test]
    fn decode_sample_payload() {
        let decoded = decode_payload_to_structs(
            layout::DVT1_SAMPLE_PAYLOAD,
            &layout::DVT1_CHANNELS,
            &StructDescriptor::dvt1(),
        )
        .unwrap();

        assert_eq!(decoded.len(), 9);
        let names: Vec<_> = decoded.iter().map(|c| c.channel_name.as_str()).collect();
        assert_eq!(names, layout::DVT1_CHANNELS);

        let speed = &decoded[0].data;
        assert_eq!(speed.get("sample_count"), Some(FieldValue::Unsigned(177)));
        assert_eq!(
            speed.names().collect::<Vec<_>>(),
            ["sample_count", "min", "max", "mean", "stdev"]
        );
        let mean = speed.get("mean").unwrap().as_f64();
        assert!((mean - 120.190_811_157_226_56).abs() < 1e-9);

        let ping = &decoded[7].data;
        assert_eq!(ping.get("min"), Some(FieldValue::Float(13.0)));
        assert_eq!(ping.get("max"), Some(FieldValue::Float(15.0)));
    }

    #[test]
    fn round_trip_float32_record() {
        let stats = [-1.25f32, 3.5, 0.75, 0.125];
        let hex = dvt1_record(42, stats);
        let decoded =
            decode_payload_to_structs(&hex, &["Only"], &StructDescriptor::dvt1()).unwrap();
        let data = &decoded[0].data;
        assert_eq!(data.get("sample_count"), Some(FieldValue::Unsigned(42)));
        for (name, expected) in ["min", "max", "mean", "stdev"].iter().zip(stats) {
            let value = data.get(name).unwrap().as_f64();
            assert!((value - expected as f64).abs() < 1e-6, "{name}");
        }
    }

    #[test]
    fn round_trip_float64_record() {
        let hex = "0c00000000000000f83f00000000000002c0000000000000c03f0000000000000840";
        let decoded =
            decode_payload_to_structs(hex, &layout::RBR_CODA_CHANNELS, &StructDescriptor::rbr_coda())
                .unwrap();
        let data = &decoded[0].data;
        assert_eq!(data.get("sample_count"), Some(FieldValue::Unsigned(12)));
        assert_eq!(data.get("min"), Some(FieldValue::Float(1.5)));
        assert_eq!(data.get("max"), Some(FieldValue::Float(-2.25)));
        assert_eq!(data.get("mean"), Some(FieldValue::Float(0.125)));
        assert_eq!(data.get("stdev"), Some(FieldValue::Float(3.0)));
    }

    #[test]
    fn uppercase_and_whitespace_are_accepted() {
        let hex = dvt1_record(1, [1.0, 2.0, 3.0, 4.0]).to_uppercase();
        let spaced = format!(" {}\n{} ", &hex[..10], &hex[10..]);
        let decoded =
            decode_payload_to_structs(&spaced, &["x"], &StructDescriptor::dvt1()).unwrap();
        assert_eq!(decoded[0].data.get("max"), Some(FieldValue::Float(2.0)));
    }

    #[test]
    fn length_not_a_multiple_of_record() {
        let hex = format!("{}00", dvt1_record(1, [0.0; 4]));
        let err = decode_payload_to_structs(&hex, &["x"], &StructDescriptor::dvt1()).unwrap_err();
        assert_eq!(
            err,
            DecodeError::PayloadLengthMismatch {
                expected: 36,
                actual: 38,
                channels: 1
            }
        );
    }

    #[test]
    fn record_count_differs_from_channel_count() {
        let hex = dvt1_record(1, [0.0; 4]).repeat(2);
        let err =
            decode_payload_to_structs(&hex, &["a", "b", "c"], &StructDescriptor::dvt1()).unwrap_err();
        assert!(matches!(err, DecodeError::PayloadLengthMismatch { .. }));

        let err = decode_payload_to_structs(&hex, &["a"], &StructDescriptor::dvt1()).unwrap_err();
        assert!(matches!(err, DecodeError::PayloadLengthMismatch { .. }));
    }

    #[test]
    fn empty_channel_list_needs_empty_payload() {
        let names: [&str; 0] = [];
        let decoded = decode_payload_to_structs("  ", &names, &StructDescriptor::dvt1()).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn non_hex_payload_of_right_length() {
        let hex = "zz".repeat(18);
        let err = decode_payload_to_structs(&hex, &["x"], &StructDescriptor::dvt1()).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidHex { position: 0, .. }));
    }

    #[test]
    fn decode_record_rejects_short_slice() {
        let descriptor = StructDescriptor::new([(FieldType::I32, "v")]).unwrap();
        let err = decode_record(&[0, 1, 2], &descriptor).unwrap_err();
        assert_eq!(
            err,
            DecodeError::ByteLengthMismatch {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn mixed_integer_descriptor() {
        let descriptor = StructDescriptor::from_tags([
            ("int16_t", "offset"),
            ("uint32_t", "ticks"),
            ("int64_t", "epoch"),
        ])
        .unwrap();
        let mut bytes = (-300i16).to_le_bytes().to_vec();
        bytes.extend_from_slice(&123_456u32.to_le_bytes());
        bytes.extend_from_slice(&(-1i64).to_le_bytes());
        let data = decode_record(&bytes, &descriptor).unwrap();
        assert_eq!(data.get("offset"), Some(FieldValue::Signed(-300)));
        assert_eq!(data.get("ticks"), Some(FieldValue::Unsigned(123_456)));
        assert_eq!(data.get("epoch"), Some(FieldValue::Signed(-1)));
    }
}
