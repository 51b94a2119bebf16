use crate::conf::ConfigError;
use crate::pipeline::constants::{CLF_TIMESTAMP_FORMAT, REQUIRED_GROUPS};
use crate::pipeline::error::{MalformedLine, MalformedReason};
use crate::pipeline::types::Event;
use chrono::{DateTime, Local};
use regex::{Captures, Regex};

/// Turns raw access-log lines into [`Event`]s using a configurable pattern.
#[derive(Debug, Clone)]
pub struct EventParser {
    pattern: Regex,
}

impl EventParser {
    /// Compile `pattern` and check that it defines every required named group.
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        let pattern =
            Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern { source })?;

        let names: Vec<&str> = pattern.capture_names().flatten().collect();
        for group in REQUIRED_GROUPS {
            if !names.contains(&group) {
                return Err(ConfigError::MissingCaptureGroup { group });
            }
        }

        Ok(Self { pattern })
    }

    pub fn parse(&self, line: &str) -> Result<Event, MalformedLine> {
        self.parse_at(line, Local::now())
    }

    /// Parse `line` as if it arrived at `received_at`.
    pub fn parse_at(&self, line: &str, received_at: DateTime<Local>) -> Result<Event, MalformedLine> {
        let caps = self
            .pattern
            .captures(line)
            .ok_or(MalformedReason::NoMatch)?;

        let status = field(&caps, "status")
            .parse::<u16>()
            .map_err(|_| MalformedReason::InvalidStatus)?;

        let bytes = field(&caps, "bytes")
            .parse::<u64>()
            .map_err(|_| MalformedReason::InvalidBytes)?;

        let path = field(&caps, "path");
        let section = section_of(path).ok_or(MalformedReason::MissingSection)?;

        Ok(Event {
            address: field(&caps, "address").to_string(),
            received_at,
            // Not every log format uses CLF timestamps; keep the event either way.
            logged_at: DateTime::parse_from_str(field(&caps, "timestamp"), CLF_TIMESTAMP_FORMAT)
                .ok(),
            method: field(&caps, "method").to_string(),
            path: path.to_string(),
            section: section.to_string(),
            protocol: field(&caps, "protocol").to_string(),
            status,
            bytes,
            referer: field(&caps, "referer").to_string(),
            user_agent: field(&caps, "user_agent").to_string(),
        })
    }
}

fn field<'h>(caps: &Captures<'h>, name: &str) -> &'h str {
    caps.name(name).map(|m| m.as_str()).unwrap_or("")
}

/// First path segment after the leading separator, without query or fragment.
///
/// `"/report/daily?x=1"` is `"report"`, `"/"` is `""`, and a path without any
/// separator has no section at all.
pub fn section_of(path: &str) -> Option<&str> {
    let segment = path.split('/').nth(1)?;
    Some(segment.split(['?', '#']).next().unwrap_or(segment))
}
