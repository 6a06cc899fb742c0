use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::FormatError;
use super::sample::{LocationDatum, LocationKey};
use super::vocabulary::{DataTypeName, SampleTable};
use crate::{ChannelData, DecodedChannel, FieldValue};

pub const SPEED_CHANNEL: &str = "Abs Speed[cm/s]";
pub const TILT_CHANNEL: &str = "Abs Tilt[Deg]";
pub const DIRECTION_CHANNEL: &str = "Direction[Deg.M]";
pub const TEMPERATURE_CHANNEL: &str = "Temperature[ºC]";

/// Channels emitted for a current-meter datum, in emission order.
pub const CURRENT_METER_CHANNELS: [&str; 4] = [
    SPEED_CHANNEL,
    TILT_CHANNEL,
    DIRECTION_CHANNEL,
    TEMPERATURE_CHANNEL,
];

/// Channels emitted for a temperature-module datum.
pub const TEMPERATURE_CHANNELS: [&str; 1] = [TEMPERATURE_CHANNEL];

/// Tilt above which a meter reporting no speed is considered lying flat.
pub const HORIZONTAL_TILT_DEG: f64 = 75.0;

/// Which formatting policy applies to a datum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SensorVariant {
    /// Aanderaa current meter: speed, tilt, direction and temperature.
    CurrentMeter,
    /// SOFT temperature module: temperature only.
    Temperature,
}

impl SensorVariant {
    /// Pick the variant from the names present in a datum.
    ///
    /// Any current-meter name selects the current meter; otherwise a SOFT
    /// temperature sample selects the temperature module. Datums with
    /// neither fall back to the current meter.
    pub fn detect(table: &SampleTable<'_>) -> Self {
        if !table.has_current_meter_data() && table.contains(DataTypeName::SoftTemperatureMean) {
            SensorVariant::Temperature
        } else {
            SensorVariant::CurrentMeter
        }
    }

    pub fn channel_names(self) -> &'static [&'static str] {
        match self {
            SensorVariant::CurrentMeter => &CURRENT_METER_CHANNELS,
            SensorVariant::Temperature => &TEMPERATURE_CHANNELS,
        }
    }
}

/// Why a datum was left without decoded channels.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// No speed reported and the meter is tilted past the threshold.
    Horizontal { tilt_deg: f64 },
    /// The current meter reported no mean tilt.
    NoTilt,
    /// The temperature module reported no temperature.
    NoTemperature,
    /// A sample needed to build the channels was absent.
    MissingData {
        #[serde(serialize_with = "serialize_display")]
        error: FormatError,
    },
}

fn serialize_display<S: serde::Serializer>(
    value: &FormatError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Horizontal { tilt_deg } => {
                write!(f, "sensor horizontal (tilt {tilt_deg:.1} deg)")
            }
            SkipReason::NoTilt => f.write_str("no tilt data"),
            SkipReason::NoTemperature => f.write_str("no temperature data"),
            SkipReason::MissingData { error } => write!(f, "{error}"),
        }
    }
}

/// Result of formatting one datum.
#[derive(Debug, Clone, PartialEq)]
pub enum DatumOutcome {
    Emitted(Vec<DecodedChannel>),
    Skipped(SkipReason),
}

/// Per-datum record of what the formatter did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormatReport {
    #[serde(flatten)]
    pub key: LocationKey,
    pub variant: SensorVariant,
    /// `None` when channels were attached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<SkipReason>,
    /// Vocabulary names that appeared more than once (last one used).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub duplicates: Vec<DataTypeName>,
}

impl FormatReport {
    pub fn is_emitted(&self) -> bool {
        self.skipped.is_none()
    }
}

/// Apply the current-meter policy to a datum's samples.
///
/// # Examples
/// ```
/// use bmdecode_core::location::formatter::format_current_meter;
/// use bmdecode_core::{DatumOutcome, SampleTable, SampleValue, SkipReason};
///
/// let samples = [SampleValue {
///     units: "rad".to_string(),
///     value: Some(std::f64::consts::FRAC_PI_2),
///     unit_type: "angle".to_string(),
///     data_type_name: "aanderaa_abs_tilt_mean_8bits".to_string(),
/// }];
/// let outcome = format_current_meter(&SampleTable::build(&samples));
/// assert!(matches!(outcome, DatumOutcome::Skipped(SkipReason::Horizontal { .. })));
/// ```
pub fn format_current_meter(table: &SampleTable<'_>) -> DatumOutcome {
    let tilt = table.value(DataTypeName::TiltMean);
    if let Some(tilt) = tilt {
        let tilt_deg = tilt.to_degrees();
        if !table.contains(DataTypeName::SpeedMean) && tilt_deg > HORIZONTAL_TILT_DEG {
            return DatumOutcome::Skipped(SkipReason::Horizontal { tilt_deg });
        }
    } else {
        return DatumOutcome::Skipped(SkipReason::NoTilt);
    }

    match current_meter_channels(table) {
        Ok(channels) => DatumOutcome::Emitted(channels),
        Err(error) => DatumOutcome::Skipped(SkipReason::MissingData { error }),
    }
}

fn current_meter_channels(table: &SampleTable<'_>) -> Result<Vec<DecodedChannel>, FormatError> {
    let sample_count = table.require(DataTypeName::ReadingCount)?;
    Ok(vec![
        channel(
            SPEED_CHANNEL,
            [
                ("sample_count", sample_count),
                ("mean", table.require(DataTypeName::SpeedMean)?),
                ("stdev", table.require(DataTypeName::SpeedStd)?),
            ],
        ),
        channel(
            TILT_CHANNEL,
            [
                ("sample_count", sample_count),
                ("mean", table.require(DataTypeName::TiltMean)?.to_degrees()),
                ("stdev", table.require(DataTypeName::TiltStd)?.to_degrees()),
            ],
        ),
        channel(
            DIRECTION_CHANNEL,
            [
                ("sample_count", sample_count),
                ("mean", table.require(DataTypeName::DirectionMean)?.to_degrees()),
                ("stdev", table.require(DataTypeName::DirectionStd)?.to_degrees()),
            ],
        ),
        channel(
            TEMPERATURE_CHANNEL,
            [
                ("sample_count", sample_count),
                ("mean", table.require(DataTypeName::TemperatureMean)?),
            ],
        ),
    ])
}

/// Apply the temperature-module policy to a datum's samples.
pub fn format_temperature(table: &SampleTable<'_>) -> DatumOutcome {
    match table.value(DataTypeName::SoftTemperatureMean) {
        Some(mean) => DatumOutcome::Emitted(vec![channel(TEMPERATURE_CHANNEL, [("mean", mean)])]),
        None => DatumOutcome::Skipped(SkipReason::NoTemperature),
    }
}

fn channel<const N: usize>(name: &str, fields: [(&str, f64); N]) -> DecodedChannel {
    DecodedChannel {
        channel_name: name.to_string(),
        data: fields
            .into_iter()
            .map(|(field, value)| (field, FieldValue::Float(value)))
            .collect::<ChannelData>(),
    }
}

/// Format one datum, attaching `decoded_value` when channels are emitted.
///
/// `variant` of `None` detects the variant from the datum's samples.
pub fn format_datum(datum: &mut LocationDatum, variant: Option<SensorVariant>) -> FormatReport {
    let table = SampleTable::build(&datum.sample_values);
    let variant = variant.unwrap_or_else(|| SensorVariant::detect(&table));
    let outcome = match variant {
        SensorVariant::CurrentMeter => format_current_meter(&table),
        SensorVariant::Temperature => format_temperature(&table),
    };
    let duplicates = table.duplicates().to_vec();

    let skipped = match outcome {
        DatumOutcome::Emitted(channels) => {
            datum.decoded_value = Some(channels);
            None
        }
        DatumOutcome::Skipped(reason) => Some(reason),
    };
    FormatReport {
        key: datum.key.clone(),
        variant,
        skipped,
        duplicates,
    }
}

/// Format every datum independently; one report per datum, in input order.
pub fn format_location_data(
    data: &mut [LocationDatum],
    variant: Option<SensorVariant>,
) -> Vec<FormatReport> {
    data.iter_mut()
        .map(|datum| format_datum(datum, variant))
        .collect()
}

/// Current-meter formatting for every datum.
pub fn format_current_meter_data(data: &mut [LocationDatum]) -> Vec<FormatReport> {
    format_location_data(data, Some(SensorVariant::CurrentMeter))
}

/// Temperature-module formatting for every datum.
pub fn format_temperature_data(data: &mut [LocationDatum]) -> Vec<FormatReport> {
    format_location_data(data, Some(SensorVariant::Temperature))
}
