//! Paginated time-entry fetch with the documented normalization fallbacks.

use chrono::{DateTime, Utc};

use crate::client::ClockifyClient;
use crate::duration::hours_from_value;
use crate::models::ReportEntry;
use crate::sink::EventSink;

/// One tracked work interval, normalized from the wire. Immutable once
/// constructed; the project name is `None` until resolution when the report
/// did not embed it.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeEntry {
    pub project_id: Option<String>,
    pub project_name: Option<String>,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub hours: f64,
}

impl TimeEntry {
    /// Normalizes a raw report entry. Fallback policy: absent or
    /// unparseable duration counts as zero hours, unparsable timestamps
    /// fall back to the requested range boundary; both leave a warning on
    /// the sink rather than failing the run.
    pub fn from_report(
        raw: ReportEntry,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
        sink: &dyn EventSink,
    ) -> Self {
        let description = raw.description.clone().unwrap_or_default();
        let project_name = raw.embedded_project_name().map(str::to_string);
        let project_id = raw.project_id.clone().filter(|id| !id.is_empty());

        let interval = raw.time_interval.as_ref();
        let hours = match interval.and_then(|i| i.duration.as_ref()) {
            Some(value) => match hours_from_value(value) {
                Some(hours) => hours,
                None => {
                    sink.warn(format!(
                        "entry '{}' has an unparseable duration; counting 0 hours",
                        description
                    ));
                    0.0
                }
            },
            None => {
                sink.warn(format!(
                    "entry '{}' has no duration; counting 0 hours",
                    description
                ));
                0.0
            }
        };

        let start = normalize_timestamp(
            interval.and_then(|i| i.start.as_deref()),
            range_start,
            "start",
            &description,
            sink,
        );
        let end = normalize_timestamp(
            interval.and_then(|i| i.end.as_deref()),
            range_end,
            "end",
            &description,
            sink,
        );

        Self {
            project_id,
            project_name,
            description,
            start,
            end,
            hours,
        }
    }
}

fn normalize_timestamp(
    value: Option<&str>,
    boundary: DateTime<Utc>,
    field: &str,
    description: &str,
    sink: &dyn EventSink,
) -> DateTime<Utc> {
    match value {
        // An absent end is normal for a still-running entry; clamp quietly.
        None => boundary,
        Some(text) => match DateTime::parse_from_rfc3339(text) {
            Ok(parsed) => parsed.with_timezone(&Utc),
            Err(_) => {
                sink.warn(format!(
                    "entry '{}' has an unparsable {} timestamp '{}'; using the range boundary",
                    description, field, text
                ));
                boundary
            }
        },
    }
}

/// Fetches every time entry in the range, page by page, until a page comes
/// back short or empty. A network or API failure aborts pagination and
/// returns whatever was accumulated; no retry is attempted.
pub async fn fetch_time_entries(
    client: &ClockifyClient,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    sink: &dyn EventSink,
) -> Vec<TimeEntry> {
    let page_size = client.config().page_size as usize;
    let mut entries = Vec::new();
    let mut page = 1u32;

    loop {
        let report = match client.fetch_report_page(start, end, page).await {
            Ok(report) => report,
            Err(err) => {
                sink.warn(format!(
                    "report fetch aborted on page {}: {} ({} entries kept)",
                    page,
                    err,
                    entries.len()
                ));
                return entries;
            }
        };

        let batch = report.timeentries.len();
        for raw in report.timeentries {
            entries.push(TimeEntry::from_report(raw, start, end, sink));
        }
        if batch < page_size {
            break;
        }
        page += 1;
    }

    sink.info(format!("fetched {} time entries", entries.len()));
    entries
}
