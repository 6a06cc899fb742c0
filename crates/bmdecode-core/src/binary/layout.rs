use super::descriptor::FieldType;

pub const U16_WIDTH: usize = 2;
pub const U32_WIDTH: usize = 4;
pub const U64_WIDTH: usize = 8;
pub const HEX_CHARS_PER_BYTE: usize = 2;

/// Aanderaa adapter DVT1 firmware record: count plus float32 statistics.
pub const DVT1_FIELDS: [(FieldType, &str); 5] = [
    (FieldType::U16, "sample_count"),
    (FieldType::F32, "min"),
    (FieldType::F32, "max"),
    (FieldType::F32, "mean"),
    (FieldType::F32, "stdev"),
];

pub const DVT1_CHANNELS: [&str; 9] = [
    "Abs Speed[cm/s]",
    "Direction[Deg.M]",
    "North[cm/s]",
    "East[cm/s]",
    "Heading[Deg.M]",
    "Tilt X[Deg]",
    "Tilt Y[Deg]",
    "Ping Count",
    "Abs Tilt[Deg]",
];

/// RBR CODA record: same statistics as DVT1 with float64 values.
pub const RBR_CODA_FIELDS: [(FieldType, &str); 5] = [
    (FieldType::U16, "sample_count"),
    (FieldType::F64, "min"),
    (FieldType::F64, "max"),
    (FieldType::F64, "mean"),
    (FieldType::F64, "stdev"),
];

pub const RBR_CODA_CHANNELS: [&str; 1] = ["Temperature[ºC] or Pressure[dbar]"];

/// Nine DVT1 records as reported by a current meter in the field.
pub const DVT1_SAMPLE_PAYLOAD: &str = concat!(
    "b1005abdf33fae96cb43b261f042f4199442b100784ecc3bf7acb343b71f48432059e042",
    "b100f938a2c37c39c843b7421c409192fe42b10034d20ac3c9561143cd137a41cedf6b42",
    "b100134f614244296742474364425cf1763eb10054d404422a34054291060542dc74993c",
    "b100b88951c2272251c2135351c2c2a8993cb1000000504100007041e2a45e410c1f023f",
    "b10002ec8e42d47b8f425c388f42e1f73b3d",
);
