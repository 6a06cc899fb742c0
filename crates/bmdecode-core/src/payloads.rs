use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::{DecodeError, DecodedChannel, DecoderProfile};

/// Units value marking a record whose `value` is a hex payload.
pub const HEX_UNITS: &str = "hex";

/// One record of a legacy sensor-data response.
///
/// Fields this crate does not interpret are kept in `extra` and written
/// back unchanged.
///
/// # Examples
/// ```
/// use bmdecode_core::SensorPayload;
///
/// let payload: SensorPayload = serde_json::from_str(
///     r#"{"timestamp":"2023-10-01T00:00:00.000Z","units":"hex","value":"b100","sensorPosition":1}"#,
/// )?;
/// assert_eq!(payload.units.as_deref(), Some("hex"));
/// assert!(payload.extra.contains_key("sensorPosition"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    #[serde(default)]
    pub value: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decoded_value: Option<Vec<DecodedChannel>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("unexpected units {units:?}, expected \"hex\"")]
    UnexpectedUnits { units: Option<String> },
    #[error("payload value is not a string")]
    NonTextValue,
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Outcome of decoding one legacy record.
#[derive(Debug, Clone, PartialEq)]
pub struct PayloadReport {
    /// Position of the record in the input batch.
    pub index: usize,
    pub timestamp: Option<String>,
    pub error: Option<PayloadError>,
}

impl PayloadReport {
    pub fn is_decoded(&self) -> bool {
        self.error.is_none()
    }
}

/// Decode every hex record of a batch with one profile.
///
/// Records that decode get `decoded_value` attached; a record that is not
/// hex or fails to decode is left untouched and reported, and the batch
/// continues.
pub fn decode_sensor_payloads(
    payloads: &mut [SensorPayload],
    profile: &DecoderProfile,
) -> Vec<PayloadReport> {
    payloads
        .iter_mut()
        .enumerate()
        .map(|(index, payload)| {
            let error = match decode_one(payload, profile) {
                Ok(channels) => {
                    payload.decoded_value = Some(channels);
                    None
                }
                Err(err) => Some(err),
            };
            PayloadReport {
                index,
                timestamp: payload.timestamp.clone(),
                error,
            }
        })
        .collect()
}

fn decode_one(
    payload: &SensorPayload,
    profile: &DecoderProfile,
) -> Result<Vec<DecodedChannel>, PayloadError> {
    if payload.units.as_deref() != Some(HEX_UNITS) {
        return Err(PayloadError::UnexpectedUnits {
            units: payload.units.clone(),
        });
    }
    let hex = payload.value.as_str().ok_or(PayloadError::NonTextValue)?;
    Ok(profile.decode(hex)?)
}
