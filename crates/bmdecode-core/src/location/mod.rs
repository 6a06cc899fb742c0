//! Location-keyed grouping and channel formatting for multi-sensor modules.
//!
//! Multi-sensor modules report one flat sample per (reading, statistic). The
//! grouping engine partitions those samples into one datum per location key;
//! the formatter derives named, unit-converted channels from each datum's
//! own samples, or records why it skipped the datum.
//!
//! - `sample`: wire records, keys, and datums
//! - `grouping`: stable key sort and run partitioning
//! - `vocabulary`: the controlled `data_type_name` set and per-datum lookup
//! - `formatter`: skip/emit policy for the current-meter and temperature
//!   variants
//! - `error`: formatting errors scoped to one datum

pub mod error;
pub mod formatter;
pub mod grouping;
pub mod sample;
pub mod vocabulary;

pub use error::FormatError;
pub use formatter::{
    DatumOutcome, FormatReport, SensorVariant, SkipReason, format_current_meter_data,
    format_location_data, format_temperature_data,
};
pub use grouping::{group_sensor_data, total_samples};
pub use sample::{LocationDatum, LocationKey, RawSample, SampleValue, SensorPosition};
pub use vocabulary::{DataTypeName, SampleTable};
