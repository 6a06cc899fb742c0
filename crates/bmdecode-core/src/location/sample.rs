use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::DecodedChannel;

/// Sensor position as reported upstream: an index or a label.
///
/// Indices order before labels.
///
/// # Examples
/// ```
/// use bmdecode_core::SensorPosition;
///
/// let position: SensorPosition = serde_json::from_str("2")?;
/// assert_eq!(position, SensorPosition::Index(2));
/// assert!(position < SensorPosition::Label("1".to_string()));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SensorPosition {
    Index(i64),
    Label(String),
}

impl fmt::Display for SensorPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorPosition::Index(index) => write!(f, "{index}"),
            SensorPosition::Label(label) => f.write_str(label),
        }
    }
}

/// One raw measurement tagged with its semantic role.
///
/// `value` is `None` when the upstream reading was `null` or absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleValue {
    pub units: String,
    #[serde(default)]
    pub value: Option<f64>,
    pub unit_type: String,
    pub data_type_name: String,
}

/// One record of a location sensor-data response.
///
/// # Examples
/// ```
/// use bmdecode_core::RawSample;
///
/// let sample: RawSample = serde_json::from_str(r#"{
///     "timestamp": "2024-03-01T00:00:00.000Z",
///     "latitude": 37.7, "longitude": -122.4, "sensorPosition": 1,
///     "units": "cm/s", "value": 12.5, "unit_type": "velocity",
///     "data_type_name": "aanderaa_abs_speed_mean_15bits"
/// }"#)?;
/// assert_eq!(sample.bristlemouth_node_id, None);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    pub timestamp: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "sensorPosition")]
    pub sensor_position: SensorPosition,
    #[serde(default)]
    pub bristlemouth_node_id: Option<String>,
    pub units: String,
    #[serde(default)]
    pub value: Option<f64>,
    pub unit_type: String,
    pub data_type_name: String,
}

impl RawSample {
    /// Split into the grouping key and the sample payload.
    pub fn into_parts(self) -> (LocationKey, SampleValue) {
        (
            LocationKey {
                timestamp: self.timestamp,
                latitude: positive_zero(self.latitude),
                longitude: positive_zero(self.longitude),
                sensor_position: self.sensor_position,
                bristlemouth_node_id: self.bristlemouth_node_id,
            },
            SampleValue {
                units: self.units,
                value: self.value,
                unit_type: self.unit_type,
                data_type_name: self.data_type_name,
            },
        )
    }
}

/// `-0.0` and `0.0` name the same coordinate.
fn positive_zero(coordinate: f64) -> f64 {
    if coordinate == 0.0 { 0.0 } else { coordinate }
}

/// Identity of one reading instant from one physical sensor.
///
/// Keys order by timestamp (as text), latitude, longitude, sensor position,
/// then node id with a missing id first. Coordinates compare by IEEE total
/// order; keys built by [`RawSample::into_parts`] carry `0.0` for either
/// signed zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationKey {
    pub timestamp: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "sensorPosition")]
    pub sensor_position: SensorPosition,
    #[serde(default)]
    pub bristlemouth_node_id: Option<String>,
}

impl Ord for LocationKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then_with(|| self.latitude.total_cmp(&other.latitude))
            .then_with(|| self.longitude.total_cmp(&other.longitude))
            .then_with(|| self.sensor_position.cmp(&other.sensor_position))
            .then_with(|| self.bristlemouth_node_id.cmp(&other.bristlemouth_node_id))
    }
}

impl PartialOrd for LocationKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for LocationKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for LocationKey {}

/// One grouped reading: its key, its samples, and derived channels once
/// formatted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationDatum {
    #[serde(flatten)]
    pub key: LocationKey,
    pub sample_values: Vec<SampleValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decoded_value: Option<Vec<DecodedChannel>>,
}

impl LocationDatum {
    pub fn new(key: LocationKey, sample_values: Vec<SampleValue>) -> Self {
        Self {
            key,
            sample_values,
            decoded_value: None,
        }
    }
}
