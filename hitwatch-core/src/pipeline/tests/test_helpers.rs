use crate::pipeline::{Bucket, Event, TimeSeries};
use chrono::{DateTime, Local, TimeZone};

pub const CURL_LINE: &str =
    r#"10.0.0.1 - - [1/Jan/2024:00:00:00 +0000] "GET /report HTTP/1.0" 200 1234 "-" "curl/7.0""#;

/// A fixed instant `secs` seconds after a reference point.
pub fn at(secs: i64) -> DateTime<Local> {
    Local.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

pub fn event(address: &str, section: &str, status: u16, bytes: u64) -> Event {
    Event {
        address: address.to_string(),
        received_at: at(0),
        logged_at: None,
        method: "GET".to_string(),
        path: format!("/{section}"),
        section: section.to_string(),
        protocol: "HTTP/1.1".to_string(),
        status,
        bytes,
        referer: "-".to_string(),
        user_agent: "curl/8.0".to_string(),
    }
}

pub fn bucket(secs: i64, hits: u64, bytes: u64) -> Bucket {
    Bucket {
        hits,
        bytes,
        ..Bucket::empty(at(secs))
    }
}

pub fn series_of(hits: &[u64]) -> TimeSeries {
    let mut series = TimeSeries::new();
    for (i, h) in hits.iter().enumerate() {
        series.append(bucket(i as i64 * 2, *h, h * 100));
    }
    series
}
