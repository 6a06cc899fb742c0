use std::fs;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use bmdecode_core::channels::{channel_handles, retain_channels, select_channels};
use bmdecode_core::location::formatter::CURRENT_METER_CHANNELS;
use bmdecode_core::{
    BUILTIN_PROFILES, DecodeError, DecodedChannel, DecoderProfile, FormatReport, LocationDatum,
    PayloadReport, RawSample, SensorDataResponse, SensorPayload, SensorVariant,
    decode_sensor_payloads, format_location_data, group_sensor_data,
};
use clap::builder::PossibleValuesParser;
use clap::{Args, Parser, Subcommand, ValueEnum};
use glob::glob;
use serde::Serialize;
use serde::de::DeserializeOwned;
use time::OffsetDateTime;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod window;

use window::{TimeWindow, parse_rfc3339};

const DEFAULT_LOG_DIRECTIVE: &str = "bmdecode=info";

#[derive(Parser, Debug)]
#[command(name = "bmdecode")]
#[command(version)]
#[command(
    about = "Decoder for Bristlemouth sensor telemetry (hex payloads and location samples).",
    long_about = None,
    after_help = "Examples:\n  bmdecode hex b100...\n  bmdecode payloads response.json -o decoded.json\n  bmdecode locations samples.json --sensor current-meter --stdout --pretty"
)]
struct Cli {
    /// Suppress non-error output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a single hex payload and print its channels.
    Hex {
        /// Hex payload, or '-' to read it from stdin
        payload: String,

        /// Built-in decoder profile
        #[arg(long, default_value = "dvt1", value_parser = PossibleValuesParser::new(BUILTIN_PROFILES))]
        profile: String,

        /// JSON profile file with "fields" and "channels"
        #[arg(long, conflicts_with = "profile")]
        descriptor: Option<PathBuf>,

        /// Print JSON instead of the channel listing
        #[arg(long)]
        json: bool,

        /// Pretty-print JSON output
        #[arg(long, requires = "json")]
        pretty: bool,

        /// Channel handles to keep (e.g. absspeed,pingcount), or 'all'
        #[arg(long, value_delimiter = ',')]
        channels: Vec<String>,
    },

    /// Decode every hex record of a legacy sensor-data response.
    #[command(
        after_help = "Examples:\n  bmdecode payloads response.json -o decoded.json\n  bmdecode payloads 'data/*.json' --profile rbr-coda --stdout"
    )]
    Payloads {
        /// Path to a .json response ({"data": [...]} or a bare array)
        input: PathBuf,

        /// Built-in decoder profile
        #[arg(long, default_value = "dvt1", value_parser = PossibleValuesParser::new(BUILTIN_PROFILES))]
        profile: String,

        /// JSON profile file with "fields" and "channels"
        #[arg(long, conflicts_with = "profile")]
        descriptor: Option<PathBuf>,

        #[command(flatten)]
        filter: FilterArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Group location samples and format them into sensor channels.
    #[command(
        after_help = "Examples:\n  bmdecode locations samples.json -o formatted.json\n  bmdecode locations samples.json --sensor temperature --stdout"
    )]
    Locations {
        /// Path to a .json response ({"data": [...]} or a bare array)
        input: PathBuf,

        /// Formatting policy; 'auto' picks one per location
        #[arg(long, value_enum, default_value_t = SensorArg::Auto)]
        sensor: SensorArg,

        #[command(flatten)]
        filter: FilterArgs,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Channel handles to keep (e.g. absspeed,pingcount), or 'all'
    #[arg(long, value_delimiter = ',')]
    channels: Vec<String>,

    /// Keep records at or after this RFC 3339 time
    #[arg(long, value_parser = parse_rfc3339)]
    start: Option<OffsetDateTime>,

    /// Keep records at or before this RFC 3339 time
    #[arg(long, value_parser = parse_rfc3339)]
    end: Option<OffsetDateTime>,
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Output path (JSON)
    #[arg(short = 'o', long, required_unless_present = "stdout")]
    output: Option<PathBuf>,

    /// Write JSON to stdout
    #[arg(long, conflicts_with = "output")]
    stdout: bool,

    /// Pretty-print JSON output
    #[arg(long, conflicts_with = "compact")]
    pretty: bool,

    /// Compact JSON output (default)
    #[arg(long)]
    compact: bool,

    /// Exit with a non-zero code if any record was not decoded
    #[arg(long)]
    strict: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SensorArg {
    Auto,
    CurrentMeter,
    Temperature,
}

impl SensorArg {
    fn variant(self) -> Option<SensorVariant> {
        match self {
            SensorArg::Auto => None,
            SensorArg::CurrentMeter => Some(SensorVariant::CurrentMeter),
            SensorArg::Temperature => Some(SensorVariant::Temperature),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    let result = match cli.command {
        Commands::Hex {
            payload,
            profile,
            descriptor,
            json,
            pretty,
            channels,
        } => cmd_hex(payload, profile, descriptor, json, pretty, channels),
        Commands::Payloads {
            input,
            profile,
            descriptor,
            filter,
            output,
        } => cmd_payloads(input, profile, descriptor, filter, output, cli.quiet),
        Commands::Locations {
            input,
            sensor,
            filter,
            output,
        } => cmd_locations(input, sensor, filter, output, cli.quiet),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_tracing(quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

fn cmd_hex(
    payload: String,
    profile: String,
    descriptor: Option<PathBuf>,
    json: bool,
    pretty: bool,
    channels: Vec<String>,
) -> Result<(), CliError> {
    let profile = load_profile(&profile, descriptor.as_deref())?;
    let payload = if payload == "-" {
        io::read_to_string(io::stdin()).context("Failed to read payload from stdin")?
    } else {
        payload
    };

    let mut decoded = profile
        .decode(&payload)
        .map_err(|err| decode_error(&profile, err))?;
    if let Some(selected) = resolve_channels(&channels, &profile.channels)? {
        retain_channels(&mut decoded, &selected);
    }

    if json {
        println!("{}", serialize_report(&decoded, pretty, false)?);
    } else {
        print!("{}", render_channels(&decoded));
    }
    Ok(())
}

fn cmd_payloads(
    input: PathBuf,
    profile: String,
    descriptor: Option<PathBuf>,
    filter: FilterArgs,
    output: OutputArgs,
    quiet: bool,
) -> Result<(), CliError> {
    let input = prepare_input(&input, &output)?;
    let profile = load_profile(&profile, descriptor.as_deref())?;
    let selected = resolve_channels(&filter.channels, &profile.channels)?;
    let window = time_window(&filter)?;

    let records: Vec<SensorPayload> = read_records(&input)?;
    let total = records.len();
    let mut records: Vec<SensorPayload> = records
        .into_iter()
        .filter(|record| window.contains(record.timestamp.as_deref()))
        .collect();
    if records.len() < total {
        debug!(kept = records.len(), total, "time window applied");
    }

    let reports = decode_sensor_payloads(&mut records, &profile);
    if let Some(selected) = selected.as_ref() {
        for decoded in records.iter_mut().filter_map(|r| r.decoded_value.as_mut()) {
            retain_channels(decoded, selected);
        }
    }
    let failed = log_payload_reports(&reports);
    info!(
        profile = %profile.name,
        decoded = reports.len() - failed,
        failed,
        "payloads decoded"
    );

    let response = SensorDataResponse { data: records };
    write_output(&response, &input, &output, quiet)?;

    if output.strict && failed > 0 {
        return Err(CliError::new(
            format!("{failed} payload(s) could not be decoded"),
            Some("check the warnings above or rerun without --strict".to_string()),
        ));
    }
    Ok(())
}

fn cmd_locations(
    input: PathBuf,
    sensor: SensorArg,
    filter: FilterArgs,
    output: OutputArgs,
    quiet: bool,
) -> Result<(), CliError> {
    let input = prepare_input(&input, &output)?;
    let channel_names = sensor
        .variant()
        .map_or(&CURRENT_METER_CHANNELS[..], SensorVariant::channel_names);
    let selected = resolve_channels(&filter.channels, channel_names)?;
    let window = time_window(&filter)?;

    let samples: Vec<RawSample> = read_records(&input)?;
    let total = samples.len();
    let samples: Vec<RawSample> = samples
        .into_iter()
        .filter(|sample| window.contains(Some(sample.timestamp.as_str())))
        .collect();
    if samples.len() < total {
        debug!(kept = samples.len(), total, "time window applied");
    }

    let mut data: Vec<LocationDatum> = group_sensor_data(samples);
    let reports = format_location_data(&mut data, sensor.variant());
    if let Some(selected) = selected.as_ref() {
        for decoded in data.iter_mut().filter_map(|d| d.decoded_value.as_mut()) {
            retain_channels(decoded, selected);
        }
    }
    let skipped = log_format_reports(&reports);
    info!(
        locations = data.len(),
        formatted = reports.len() - skipped,
        skipped,
        "location samples formatted"
    );

    let response = SensorDataResponse { data };
    write_output(&response, &input, &output, quiet)?;

    if output.strict && skipped > 0 {
        return Err(CliError::new(
            format!("{skipped} location(s) were skipped"),
            Some("check the warnings above or rerun without --strict".to_string()),
        ));
    }
    Ok(())
}

fn load_profile(name: &str, descriptor: Option<&Path>) -> Result<DecoderProfile, CliError> {
    let Some(path) = descriptor else {
        return DecoderProfile::builtin(name).ok_or_else(|| {
            CliError::new(
                format!("unknown profile '{name}'"),
                Some(format!("expected one of: {}", BUILTIN_PROFILES.join(", "))),
            )
        });
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read profile: {}", path.display()))?;
    let profile = DecoderProfile::from_json(&text).map_err(|err| {
        CliError::new(
            format!("invalid profile {}: {err}", path.display()),
            Some(
                r#"expected {"fields": [["uint16_t", "sample_count"], ...], "channels": ["..."]}"#
                    .to_string(),
            ),
        )
    })?;
    debug!(
        profile = %profile.name,
        record_bytes = profile.descriptor.size_bytes(),
        channels = profile.channels.len(),
        "profile loaded"
    );
    Ok(profile)
}

fn decode_error(profile: &DecoderProfile, err: DecodeError) -> CliError {
    let hint = match err {
        DecodeError::PayloadLengthMismatch { .. } => format!(
            "profile '{}' expects {} hex characters ({} channels of {} bytes)",
            profile.name,
            profile.payload_hex_len(),
            profile.channels.len(),
            profile.descriptor.size_bytes()
        ),
        _ => "payload must be hexadecimal text".to_string(),
    };
    CliError::new(format!("payload decode failed: {err}"), Some(hint))
}

/// Resolve `--channels` handles against a channel list.
///
/// `None` when no selection was requested.
fn resolve_channels<S: AsRef<str>>(
    requested: &[String],
    channels: &[S],
) -> Result<Option<Vec<String>>, CliError> {
    if requested.is_empty() {
        return Ok(None);
    }
    let handles = channel_handles(channels);
    let unknown: Vec<&str> = requested
        .iter()
        .map(String::as_str)
        .filter(|r| {
            *r != bmdecode_core::channels::ALL_CHANNELS && !handles.iter().any(|(h, _)| h == r)
        })
        .collect();
    if !unknown.is_empty() {
        let available = handles
            .iter()
            .map(|(handle, _)| handle.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(CliError::new(
            format!("unknown channel handle(s): {}", unknown.join(", ")),
            Some(format!("available: {available}, all")),
        ));
    }
    Ok(Some(select_channels(requested, &handles)))
}

fn time_window(filter: &FilterArgs) -> Result<TimeWindow, CliError> {
    TimeWindow::new(filter.start, filter.end).ok_or_else(|| {
        CliError::new(
            "--start is after --end",
            Some("swap the bounds or drop one of them".to_string()),
        )
    })
}

fn log_payload_reports(reports: &[PayloadReport]) -> usize {
    let mut failed = 0;
    for report in reports {
        if let Some(err) = report.error.as_ref() {
            failed += 1;
            warn!(
                index = report.index,
                timestamp = report.timestamp.as_deref().unwrap_or("-"),
                error = %err,
                "payload not decoded"
            );
        }
    }
    failed
}

fn log_format_reports(reports: &[FormatReport]) -> usize {
    let mut skipped = 0;
    for report in reports {
        if !report.duplicates.is_empty() {
            let names: Vec<&str> = report.duplicates.iter().map(|name| name.as_str()).collect();
            warn!(
                timestamp = %report.key.timestamp,
                sensor_position = %report.key.sensor_position,
                duplicates = %names.join(","),
                "duplicate samples, last value used"
            );
        }
        if let Some(reason) = report.skipped.as_ref() {
            skipped += 1;
            warn!(
                timestamp = %report.key.timestamp,
                sensor_position = %report.key.sensor_position,
                variant = ?report.variant,
                reason = %reason,
                "location skipped"
            );
        }
    }
    skipped
}

fn render_channels(channels: &[DecodedChannel]) -> String {
    let mut out = String::new();
    for channel in channels {
        out.push_str(&channel.channel_name);
        out.push('\n');
        for (name, value) in channel.data.iter() {
            out.push_str(&format!("  {name}: {value}\n"));
        }
    }
    out
}

fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, CliError> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse JSON: {}", path.display()))?;
    let records = if value.is_array() {
        serde_json::from_value::<Vec<T>>(value)
    } else {
        serde_json::from_value::<SensorDataResponse<T>>(value).map(|response| response.data)
    };
    records.map_err(|err| {
        CliError::new(
            format!("unexpected record layout in {}: {err}", path.display()),
            Some("expected {\"data\": [...]} or a JSON array of records".to_string()),
        )
    })
}

/// Resolve and validate the input, and reject an output that would overwrite it.
fn prepare_input(input: &Path, output: &OutputArgs) -> Result<PathBuf, CliError> {
    let resolved_input = resolve_input_path(input)?;
    validate_input_file(&resolved_input)?;
    let input_abs = fs::canonicalize(&resolved_input)
        .with_context(|| format!("Failed to resolve input path: {}", resolved_input.display()))?;

    if let Some(output_path) = output.output.as_ref().filter(|_| !output.stdout) {
        let output_dir = output_path
            .parent()
            .map(|parent| {
                if parent.as_os_str().is_empty() {
                    fs::canonicalize(".")
                } else {
                    fs::canonicalize(parent)
                }
            })
            .transpose();
        // A missing output directory is created later and cannot hold the input.
        if let Ok(Some(output_dir)) = output_dir {
            let output_target = output_dir.join(
                output_path
                    .file_name()
                    .ok_or_else(|| anyhow::anyhow!("Invalid output path"))?,
            );
            if output_target == input_abs {
                return Err(CliError::new(
                    format!(
                        "output path must differ from input: {}",
                        output_path.display()
                    ),
                    Some("choose a different output path".to_string()),
                ));
            }
        }
    }

    let meta = fs::metadata(&resolved_input)
        .with_context(|| format!("Failed to read input file: {}", resolved_input.display()))?;
    if !meta.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use a .json file".to_string()),
        ));
    }
    Ok(resolved_input)
}

fn write_output<T: Serialize>(
    value: &T,
    input: &Path,
    output: &OutputArgs,
    quiet: bool,
) -> Result<(), CliError> {
    let json = serialize_report(value, output.pretty, output.compact)?;
    if output.stdout {
        println!("{}", json);
        return Ok(());
    }

    let path = output.output.as_ref().ok_or_else(|| {
        CliError::new(
            "missing output path",
            Some("use -o/--output or --stdout".to_string()),
        )
    })?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    fs::write(path, json).with_context(|| format!("Failed to write output: {}", path.display()))?;

    if !quiet {
        eprintln!("OK: {} decoded -> {}", input.display(), path.display());
    }
    Ok(())
}

fn serialize_report<T: Serialize>(value: &T, pretty: bool, compact: bool) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(value)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(value)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a .json sensor-data file".to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "json" {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .json file".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    if matches.is_empty() {
        return Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern; expected .json".to_string()),
        ));
    }
    if matches.len() > 1 {
        let listed = matches
            .iter()
            .take(3)
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let more = if matches.len() > 3 { ", ..." } else { "" };
        return Err(CliError::new(
            format!(
                "multiple files match pattern '{}' ({} matches); matches: {}{}",
                pattern,
                matches.len(),
                listed,
                more
            ),
            Some("pass a single response file, or run once per file".to_string()),
        ));
    }

    Ok(matches.remove(0))
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
