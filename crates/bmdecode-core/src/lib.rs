//! bmdecode core library for Bristlemouth sensor telemetry.
//!
//! This crate implements the two decoding paths used by the CLI:
//! hex payloads from single-device modules are unpacked through a struct
//! descriptor (layout/reader/parser), and flat per-reading samples from
//! multi-sensor modules are grouped by location and formatted into derived
//! channels. Everything here is pure and works on in-memory values; fetching
//! data and rendering it belong to the callers.
//!
//! Invariants:
//! - Decoded channels come back in the order the channel names were given.
//! - Grouping never drops or duplicates a sample, and keys are unique.
//! - A failure while decoding or formatting one item never aborts a batch;
//!   it is reported for that item only.
//!
//! # Examples
//! ```
//! use bmdecode_core::binary::layout::DVT1_SAMPLE_PAYLOAD;
//! use bmdecode_core::DecoderProfile;
//!
//! let profile = DecoderProfile::dvt1();
//! let channels = profile.decode(DVT1_SAMPLE_PAYLOAD)?;
//! assert_eq!(channels.len(), 9);
//! assert_eq!(channels[0].channel_name, "Abs Speed[cm/s]");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub mod binary;
pub mod channels;
pub mod location;
mod payloads;
mod profile;

pub use binary::{
    DecodeError, DescriptorError, FieldSpec, FieldType, StructDescriptor,
    decode_payload_to_structs, decode_record, struct_size_bytes,
};
pub use location::{
    DataTypeName, DatumOutcome, FormatError, FormatReport, LocationDatum, LocationKey, RawSample,
    SampleTable, SampleValue, SensorPosition, SensorVariant, SkipReason, format_current_meter_data,
    format_location_data, format_temperature_data, group_sensor_data,
};
pub use payloads::{PayloadError, PayloadReport, SensorPayload, decode_sensor_payloads};
pub use profile::{BUILTIN_PROFILES, DecoderProfile, ProfileError};

/// A single decoded numeric value, keeping its wire interpretation.
///
/// # Examples
/// ```
/// use bmdecode_core::FieldValue;
///
/// assert_eq!(FieldValue::Unsigned(177).as_f64(), 177.0);
/// assert_eq!(FieldValue::Float(1.5).to_string(), "1.5");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Unsigned integer field (`uint16`, `uint32`, `uint64`).
    Unsigned(u64),
    /// Signed integer field (`int16`, `int32`, `int64`).
    Signed(i64),
    /// IEEE-754 field (`float32` widened, or `float64`).
    Float(f64),
}

impl FieldValue {
    /// Numeric value as `f64` (integers above 2^53 lose precision).
    pub fn as_f64(self) -> f64 {
        match self {
            FieldValue::Unsigned(value) => value as f64,
            FieldValue::Signed(value) => value as f64,
            FieldValue::Float(value) => value,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Unsigned(value) => write!(f, "{value}"),
            FieldValue::Signed(value) => write!(f, "{value}"),
            FieldValue::Float(value) => write!(f, "{value:?}"),
        }
    }
}

/// Field name to value mapping for one channel, in descriptor order.
///
/// Serializes as a JSON object whose keys keep insertion order.
///
/// # Examples
/// ```
/// use bmdecode_core::{ChannelData, FieldValue};
///
/// let mut data = ChannelData::new();
/// data.insert("mean", FieldValue::Float(2.0));
/// data.insert("stdev", FieldValue::Float(0.5));
/// assert_eq!(data.get("mean"), Some(FieldValue::Float(2.0)));
/// assert_eq!(data.names().collect::<Vec<_>>(), ["mean", "stdev"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelData {
    fields: Vec<(String, FieldValue)>,
}

impl ChannelData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a field. Replacing keeps the original position.
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        let name = name.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<FieldValue> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| *value)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, FieldValue)> for ChannelData {
    fn from_iter<I: IntoIterator<Item = (S, FieldValue)>>(iter: I) -> Self {
        let mut data = ChannelData::new();
        for (name, value) in iter {
            data.insert(name, value);
        }
        data
    }
}

impl Serialize for ChannelData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ChannelData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ChannelDataVisitor;

        impl<'de> Visitor<'de> for ChannelDataVisitor {
            type Value = ChannelData;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of field names to numbers")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut data = ChannelData::new();
                while let Some((name, value)) = access.next_entry::<String, FieldValue>()? {
                    data.insert(name, value);
                }
                Ok(data)
            }
        }

        deserializer.deserialize_map(ChannelDataVisitor)
    }
}

/// One named channel of decoded data.
///
/// # Examples
/// ```
/// use bmdecode_core::{ChannelData, DecodedChannel, FieldValue};
///
/// let channel = DecodedChannel {
///     channel_name: "Ping Count".to_string(),
///     data: [("sample_count", FieldValue::Unsigned(177))].into_iter().collect(),
/// };
/// let json = serde_json::to_string(&channel)?;
/// assert_eq!(json, r#"{"channel_name":"Ping Count","data":{"sample_count":177}}"#);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedChannel {
    /// Channel name, e.g. `Abs Speed[cm/s]`.
    pub channel_name: String,
    /// Decoded or derived fields for this channel.
    pub data: ChannelData,
}

/// Sensor-data API envelope: `{"data": [...]}`.
///
/// A missing `data` member reads as an empty list.
///
/// # Examples
/// ```
/// use bmdecode_core::{RawSample, SensorDataResponse};
///
/// let response: SensorDataResponse<RawSample> = serde_json::from_str("{}")?;
/// assert!(response.data.is_empty());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorDataResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_data_serializes_in_insertion_order() {
        let data: ChannelData = [
            ("sample_count", FieldValue::Unsigned(3)),
            ("min", FieldValue::Float(-1.0)),
            ("max", FieldValue::Float(4.5)),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_string(&data).expect("channel data json");
        assert_eq!(json, r#"{"sample_count":3,"min":-1.0,"max":4.5}"#);
    }

    #[test]
    fn channel_data_reads_back_with_value_kinds() {
        let data: ChannelData =
            serde_json::from_str(r#"{"b":1,"a":-2,"c":0.25}"#).expect("parse channel data");
        assert_eq!(data.names().collect::<Vec<_>>(), ["b", "a", "c"]);
        assert_eq!(data.get("b"), Some(FieldValue::Unsigned(1)));
        assert_eq!(data.get("a"), Some(FieldValue::Signed(-2)));
        assert_eq!(data.get("c"), Some(FieldValue::Float(0.25)));
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut data = ChannelData::new();
        data.insert("mean", FieldValue::Float(1.0));
        data.insert("stdev", FieldValue::Float(2.0));
        data.insert("mean", FieldValue::Float(3.0));
        assert_eq!(data.len(), 2);
        assert_eq!(data.names().collect::<Vec<_>>(), ["mean", "stdev"]);
        assert_eq!(data.get("mean"), Some(FieldValue::Float(3.0)));
    }

    #[test]
    fn float_display_keeps_fraction() {
        assert_eq!(FieldValue::Float(13.0).to_string(), "13.0");
        assert_eq!(FieldValue::Signed(-7).to_string(), "-7");
    }
}
