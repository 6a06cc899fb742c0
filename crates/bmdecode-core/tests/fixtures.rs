use std::fs;
use std::path::{Path, PathBuf};

use bmdecode_core::{
    DataTypeName, DecoderProfile, FieldValue, LocationDatum, RawSample, SensorDataResponse,
    SensorPayload, SensorPosition, SensorVariant, SkipReason, decode_sensor_payloads,
    format_location_data, format_temperature_data, group_sensor_data,
};
use serde::de::DeserializeOwned;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load<T: DeserializeOwned>(name: &str) -> T {
    let text = fs::read_to_string(fixture(name)).expect("read fixture");
    serde_json::from_str(&text).expect("parse fixture")
}

fn grouped(name: &str) -> Vec<LocationDatum> {
    let samples: Vec<RawSample> = match load::<serde_json::Value>(name) {
        value @ serde_json::Value::Array(_) => serde_json::from_value(value).expect("samples"),
        value => {
            serde_json::from_value::<SensorDataResponse<RawSample>>(value)
                .expect("sample response")
                .data
        }
    };
    group_sensor_data(samples)
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn legacy_payloads_match_expected_output() {
    let mut response: SensorDataResponse<SensorPayload> = load("legacy_payloads.json");
    let expected: serde_json::Value = load("legacy_payloads.expected.json");

    let reports = decode_sensor_payloads(&mut response.data, &DecoderProfile::dvt1());
    let decoded: Vec<usize> = reports
        .iter()
        .filter(|r| r.is_decoded())
        .map(|r| r.index)
        .collect();
    assert_eq!(decoded, [0, 3]);

    let actual = serde_json::to_value(&response).expect("serialize response");
    assert_eq!(actual, expected, "legacy payload output mismatch");
}

#[test]
fn rbr_coda_payload_decodes_float64_stats() {
    let mut response: SensorDataResponse<SensorPayload> = load("rbr_coda_payloads.json");
    let reports = decode_sensor_payloads(&mut response.data, &DecoderProfile::rbr_coda());
    assert!(reports.iter().all(|r| r.is_decoded()));

    let channels = response.data[0].decoded_value.as_ref().expect("decoded");
    assert_eq!(channels.len(), 1);
    assert_eq!(channels[0].channel_name, "Temperature[ºC] or Pressure[dbar]");
    let data = &channels[0].data;
    assert_eq!(data.get("sample_count"), Some(FieldValue::Unsigned(60)));
    assert_eq!(data.get("min"), Some(FieldValue::Float(10.5)));
    assert_eq!(data.get("max"), Some(FieldValue::Float(12.25)));
    assert_eq!(data.get("mean"), Some(FieldValue::Float(11.0)));
    assert_eq!(data.get("stdev"), Some(FieldValue::Float(0.5)));
}

#[test]
fn current_meter_samples_group_by_location() {
    let data = grouped("current_meter_samples.json");

    assert_eq!(data.len(), 2);
    assert_eq!(
        data.iter().map(|d| d.sample_values.len()).sum::<usize>(),
        11
    );
    assert_eq!(data[0].key.timestamp, "2024-03-01T12:00:00.000Z");
    assert_eq!(data[0].sample_values.len(), 8);
    assert_eq!(data[1].key.sensor_position, SensorPosition::Index(3));
    let later: Vec<&str> = data[1]
        .sample_values
        .iter()
        .map(|s| s.data_type_name.as_str())
        .collect();
    assert_eq!(
        later,
        [
            "aanderaa_reading_count_10bits",
            "aanderaa_abs_tilt_mean_8bits",
            "spotter_battery_volts"
        ]
    );
}

#[test]
fn current_meter_samples_format_and_skip_horizontal() {
    let mut data = grouped("current_meter_samples.json");
    let reports = format_location_data(&mut data, None);

    assert!(reports[0].is_emitted());
    let channels = data[0].decoded_value.as_ref().expect("channels");
    assert_eq!(channels.len(), 4);
    let direction = channels[2].data.get("mean").expect("direction").as_f64();
    assert!(close(direction, 180.0));
    let tilt = channels[1].data.get("mean").expect("tilt").as_f64();
    assert!(close(tilt, 0.1f64.to_degrees()));

    match &reports[1].skipped {
        Some(SkipReason::Horizontal { tilt_deg }) => assert!(close(*tilt_deg, 90.0)),
        other => panic!("expected horizontal skip, got {other:?}"),
    }
    assert!(data[1].decoded_value.is_none());

    let value = serde_json::to_value(&data[1]).expect("serialize datum");
    assert!(value.get("decoded_value").is_none());
    assert_eq!(value["bristlemouth_node_id"], "0x6a7d3b4f2e1c0d9a");
}

#[test]
fn soft_temperature_samples_merge_missing_and_null_node_ids() {
    let data = grouped("soft_temperature_samples.json");

    assert_eq!(data.len(), 3);
    assert_eq!(data[0].key.bristlemouth_node_id, None);
    assert_eq!(data[0].sample_values.len(), 2);
    assert_eq!(data[1].key.sensor_position, SensorPosition::Label("aft".to_string()));
    assert_eq!(data[2].key.sensor_position, SensorPosition::Label("fore".to_string()));

    let value = serde_json::to_value(&data[0]).expect("serialize datum");
    assert!(value["bristlemouth_node_id"].is_null());
}

#[test]
fn soft_temperature_samples_format_with_either_policy() {
    let mut auto = grouped("soft_temperature_samples.json");
    let reports = format_location_data(&mut auto, None);
    assert_eq!(reports[0].variant, SensorVariant::Temperature);
    assert_eq!(reports[0].duplicates, [DataTypeName::SoftTemperatureMean]);
    assert_eq!(reports[2].variant, SensorVariant::CurrentMeter);
    assert_eq!(reports[2].skipped, Some(SkipReason::NoTilt));

    let mut forced = grouped("soft_temperature_samples.json");
    let reports = format_temperature_data(&mut forced);
    assert_eq!(reports[2].skipped, Some(SkipReason::NoTemperature));

    let first = forced[0].decoded_value.as_ref().expect("temperature");
    assert_eq!(first[0].data.get("mean"), Some(FieldValue::Float(17.625)));
    let second = forced[1].decoded_value.as_ref().expect("temperature");
    assert_eq!(second[0].data.get("mean"), Some(FieldValue::Float(17.25)));
}
