use super::sample::{LocationDatum, LocationKey, RawSample, SampleValue};

/// Group raw samples into one datum per location key.
///
/// Samples are stable-sorted by key, so samples sharing a key keep their
/// input order. Datums come back in ascending key order and together hold
/// every input sample exactly once.
///
/// # Examples
/// ```
/// use bmdecode_core::{RawSample, SensorPosition, group_sensor_data};
///
/// let sample = |ts: &str, name: &str| RawSample {
///     timestamp: ts.to_string(),
///     latitude: 1.0,
///     longitude: 2.0,
///     sensor_position: SensorPosition::Index(1),
///     bristlemouth_node_id: None,
///     units: "cm/s".to_string(),
///     value: Some(0.0),
///     unit_type: "velocity".to_string(),
///     data_type_name: name.to_string(),
/// };
/// let grouped = group_sensor_data(vec![
///     sample("2024-01-02T00:00:00.000Z", "b"),
///     sample("2024-01-01T00:00:00.000Z", "a"),
///     sample("2024-01-02T00:00:00.000Z", "c"),
/// ]);
/// assert_eq!(grouped.len(), 2);
/// assert_eq!(grouped[1].sample_values.len(), 2);
/// assert_eq!(grouped[1].sample_values[0].data_type_name, "b");
/// ```
pub fn group_sensor_data(samples: Vec<RawSample>) -> Vec<LocationDatum> {
    let mut keyed: Vec<(LocationKey, SampleValue)> =
        samples.into_iter().map(RawSample::into_parts).collect();
    keyed.sort_by(|(a, _), (b, _)| a.cmp(b));

    let mut grouped: Vec<LocationDatum> = Vec::new();
    for (key, sample) in keyed {
        match grouped.last_mut() {
            Some(datum) if datum.key == key => datum.sample_values.push(sample),
            _ => grouped.push(LocationDatum::new(key, vec![sample])),
        }
    }
    grouped
}

/// Total number of samples held by a set of datums.
pub fn total_samples(data: &[LocationDatum]) -> usize {
    data.iter().map(|datum| datum.sample_values.len()).sum()
}
