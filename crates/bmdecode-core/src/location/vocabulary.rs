use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::FormatError;
use super::sample::SampleValue;

const VOCABULARY_LEN: usize = 9;

/// Controlled vocabulary of `data_type_name` values the formatter reads.
///
/// # Examples
/// ```
/// use bmdecode_core::DataTypeName;
///
/// let name: DataTypeName = "aanderaa_abs_tilt_mean_8bits".parse().unwrap();
/// assert_eq!(name, DataTypeName::TiltMean);
/// assert!(name.is_current_meter());
/// assert!("spotter_battery_volts".parse::<DataTypeName>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataTypeName {
    #[serde(rename = "aanderaa_reading_count_10bits")]
    ReadingCount,
    #[serde(rename = "aanderaa_abs_speed_mean_15bits")]
    SpeedMean,
    #[serde(rename = "aanderaa_abs_speed_std_15bits")]
    SpeedStd,
    #[serde(rename = "aanderaa_abs_tilt_mean_8bits")]
    TiltMean,
    #[serde(rename = "aanderaa_std_tilt_mean_8bits")]
    TiltStd,
    #[serde(rename = "aanderaa_direction_circ_mean_13bits")]
    DirectionMean,
    #[serde(rename = "aanderaa_direction_circ_std_13bits")]
    DirectionStd,
    #[serde(rename = "aanderaa_temperature_mean_13bits")]
    TemperatureMean,
    #[serde(rename = "bm_soft_temperature_mean_13bits")]
    SoftTemperatureMean,
}

impl DataTypeName {
    pub const ALL: [DataTypeName; VOCABULARY_LEN] = [
        DataTypeName::ReadingCount,
        DataTypeName::SpeedMean,
        DataTypeName::SpeedStd,
        DataTypeName::TiltMean,
        DataTypeName::TiltStd,
        DataTypeName::DirectionMean,
        DataTypeName::DirectionStd,
        DataTypeName::TemperatureMean,
        DataTypeName::SoftTemperatureMean,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DataTypeName::ReadingCount => "aanderaa_reading_count_10bits",
            DataTypeName::SpeedMean => "aanderaa_abs_speed_mean_15bits",
            DataTypeName::SpeedStd => "aanderaa_abs_speed_std_15bits",
            DataTypeName::TiltMean => "aanderaa_abs_tilt_mean_8bits",
            DataTypeName::TiltStd => "aanderaa_std_tilt_mean_8bits",
            DataTypeName::DirectionMean => "aanderaa_direction_circ_mean_13bits",
            DataTypeName::DirectionStd => "aanderaa_direction_circ_std_13bits",
            DataTypeName::TemperatureMean => "aanderaa_temperature_mean_13bits",
            DataTypeName::SoftTemperatureMean => "bm_soft_temperature_mean_13bits",
        }
    }

    /// Whether the name belongs to the Aanderaa current-meter set.
    pub fn is_current_meter(self) -> bool {
        !matches!(self, DataTypeName::SoftTemperatureMean)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for DataTypeName {
    type Err = ();

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        DataTypeName::ALL
            .into_iter()
            .find(|known| known.as_str() == name)
            .ok_or(())
    }
}

impl fmt::Display for DataTypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-datum lookup of samples by vocabulary name.
///
/// Built once from a datum's sample list. When a name repeats, the last
/// occurrence wins and the name is recorded in [`SampleTable::duplicates`].
/// Names outside the vocabulary and samples without a value are ignored.
///
/// # Examples
/// ```
/// use bmdecode_core::{DataTypeName, SampleTable, SampleValue};
///
/// let tilt = |value: f64| SampleValue {
///     units: "rad".to_string(),
///     value: Some(value),
///     unit_type: "angle".to_string(),
///     data_type_name: "aanderaa_abs_tilt_mean_8bits".to_string(),
/// };
/// let samples = [tilt(0.1), tilt(0.2)];
/// let table = SampleTable::build(&samples);
/// assert_eq!(table.value(DataTypeName::TiltMean), Some(0.2));
/// assert_eq!(table.duplicates(), &[DataTypeName::TiltMean]);
/// ```
#[derive(Debug, Clone)]
pub struct SampleTable<'a> {
    slots: [Option<&'a SampleValue>; VOCABULARY_LEN],
    duplicates: Vec<DataTypeName>,
}

impl<'a> SampleTable<'a> {
    pub fn build(samples: &'a [SampleValue]) -> Self {
        let mut slots = [None; VOCABULARY_LEN];
        let mut duplicates = Vec::new();
        for sample in samples {
            if sample.value.is_none() {
                continue;
            }
            let Ok(name) = sample.data_type_name.parse::<DataTypeName>() else {
                continue;
            };
            let slot = &mut slots[name.index()];
            if slot.is_some() && !duplicates.contains(&name) {
                duplicates.push(name);
            }
            *slot = Some(sample);
        }
        Self { slots, duplicates }
    }

    pub fn get(&self, name: DataTypeName) -> Option<&'a SampleValue> {
        self.slots[name.index()]
    }

    pub fn contains(&self, name: DataTypeName) -> bool {
        self.get(name).is_some()
    }

    pub fn value(&self, name: DataTypeName) -> Option<f64> {
        self.get(name).and_then(|sample| sample.value)
    }

    /// Value of a sample the caller cannot do without.
    pub fn require(&self, name: DataTypeName) -> Result<f64, FormatError> {
        self.value(name)
            .ok_or(FormatError::MissingChannelData { name })
    }

    /// Names seen more than once, in order of first repetition.
    pub fn duplicates(&self) -> &[DataTypeName] {
        &self.duplicates
    }

    pub fn has_current_meter_data(&self) -> bool {
        DataTypeName::ALL
            .into_iter()
            .filter(|name| name.is_current_meter())
            .any(|name| self.contains(name))
    }
}

#[cfg(test)]
mod tests {
    use super::{DataTypeName, SampleTable};
    use crate::location::error::FormatError;
    use crate::location::sample::SampleValue;

    fn sample(name: &str, value: f64) -> SampleValue {
        SampleValue {
            units: "u".to_string(),
            value: Some(value),
            unit_type: "t".to_string(),
            data_type_name: name.to_string(),
        }
    }

    #[test]
    fn names_round_trip_through_strings() {
        for name in DataTypeName::ALL {
            assert_eq!(name.as_str().parse::<DataTypeName>(), Ok(name));
            let json = serde_json::to_string(&name).unwrap();
            assert_eq!(json, format!("\"{}\"", name.as_str()));
        }
    }

    #[test]
    fn index_matches_position_in_all() {
        for (position, name) in DataTypeName::ALL.into_iter().enumerate() {
            assert_eq!(name.index(), position);
        }
    }

    #[test]
    fn last_duplicate_wins_and_is_reported_once() {
        let samples = [
            sample("aanderaa_abs_speed_mean_15bits", 1.0),
            sample("aanderaa_abs_speed_mean_15bits", 2.0),
            sample("aanderaa_abs_speed_mean_15bits", 3.0),
            sample("aanderaa_temperature_mean_13bits", 9.0),
        ];
        let table = SampleTable::build(&samples);
        assert_eq!(table.value(DataTypeName::SpeedMean), Some(3.0));
        assert_eq!(table.duplicates(), &[DataTypeName::SpeedMean]);
        assert_eq!(table.value(DataTypeName::TemperatureMean), Some(9.0));
    }

    #[test]
    fn unknown_names_are_ignored() {
        let samples = [sample("spotter_battery_volts", 3.7)];
        let table = SampleTable::build(&samples);
        assert!(DataTypeName::ALL.into_iter().all(|name| !table.contains(name)));
        assert!(table.duplicates().is_empty());
        assert!(!table.has_current_meter_data());
    }

    #[test]
    fn samples_without_value_are_missing() {
        let mut blank = sample("aanderaa_abs_speed_mean_15bits", 0.0);
        blank.value = None;
        let samples = [sample("aanderaa_abs_speed_mean_15bits", 4.0), blank];
        let table = SampleTable::build(&samples);
        assert_eq!(table.value(DataTypeName::SpeedMean), Some(4.0));
        assert!(table.duplicates().is_empty());

        let mut only_blank = sample("aanderaa_abs_tilt_mean_8bits", 0.0);
        only_blank.value = None;
        let samples = [only_blank];
        let table = SampleTable::build(&samples);
        assert!(!table.contains(DataTypeName::TiltMean));
        assert!(!table.has_current_meter_data());
    }

    #[test]
    fn require_reports_missing_name() {
        let table = SampleTable::build(&[]);
        assert_eq!(
            table.require(DataTypeName::DirectionStd),
            Err(FormatError::MissingChannelData {
                name: DataTypeName::DirectionStd
            })
        );
    }

    #[test]
    fn soft_temperature_is_not_current_meter_data() {
        let samples = [sample("bm_soft_temperature_mean_13bits", 12.0)];
        let table = SampleTable::build(&samples);
        assert!(!table.has_current_meter_data());
        assert!(table.contains(DataTypeName::SoftTemperatureMean));
    }
}
