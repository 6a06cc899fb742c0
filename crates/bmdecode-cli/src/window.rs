use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Inclusive `[start, end]` filter on RFC 3339 record timestamps.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeWindow {
    start: Option<OffsetDateTime>,
    end: Option<OffsetDateTime>,
}

impl TimeWindow {
    /// `None` when `start` is after `end`.
    pub fn new(start: Option<OffsetDateTime>, end: Option<OffsetDateTime>) -> Option<Self> {
        match (start, end) {
            (Some(start), Some(end)) if start > end => None,
            _ => Some(Self { start, end }),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Whether a record timestamp falls inside the window.
    ///
    /// Missing or unparsable timestamps only pass an unbounded window.
    pub fn contains(&self, timestamp: Option<&str>) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let Some(at) = timestamp.and_then(|ts| parse_rfc3339(ts).ok()) else {
            return false;
        };
        self.start.is_none_or(|start| at >= start) && self.end.is_none_or(|end| at <= end)
    }
}

/// clap value parser for `--start`/`--end`.
pub fn parse_rfc3339(value: &str) -> Result<OffsetDateTime, String> {
    OffsetDateTime::parse(value, &Rfc3339)
        .map_err(|err| format!("expected an RFC 3339 timestamp like 2024-03-01T12:00:00Z ({err})"))
}
