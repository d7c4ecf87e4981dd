//! Deduplication, grouping and invoice totals.

use std::collections::HashSet;

use clockify_api::{EventSink, TimeEntry};

use crate::config::ConstantLineItem;
use crate::resolver::NO_PROJECT;

/// Tolerance for the hours-conservation consistency check.
pub const HOURS_EPSILON: f64 = 1e-9;

/// Aggregated hours for one project across the billing period.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectGroup {
    pub project_id: Option<String>,
    pub project_name: String,
    pub hours: f64,
    pub amount: f64,
}

/// The computed body of an invoice: per-project rows plus totals.
/// Constant line items contribute to the total amount but not the hours.
#[derive(Debug, Clone)]
pub struct InvoiceBreakdown {
    pub groups: Vec<ProjectGroup>,
    pub total_hours: f64,
    pub total_amount: f64,
}

/// Drops exact duplicates, keeping the first occurrence. Two entries are
/// duplicates only when start, end, project id, description and hours all
/// match.
pub fn dedup_entries(entries: Vec<TimeEntry>, sink: &dyn EventSink) -> Vec<TimeEntry> {
    let mut seen: HashSet<(i64, i64, Option<String>, String, u64)> = HashSet::new();
    let mut kept = Vec::with_capacity(entries.len());
    let mut dropped = 0usize;

    for entry in entries {
        let key = (
            entry.start.timestamp(),
            entry.end.timestamp(),
            entry.project_id.clone(),
            entry.description.clone(),
            entry.hours.to_bits(),
        );
        if seen.insert(key) {
            kept.push(entry);
        } else {
            dropped += 1;
            sink.warn(format!(
                "dropping duplicate entry '{}' ({:.2}h starting {})",
                entry.description, entry.hours, entry.start
            ));
        }
    }

    if dropped > 0 {
        sink.info(format!("dropped {dropped} duplicate entries"));
    }
    kept
}

/// Display name for grouping: the resolved name when present, otherwise
/// the documented fallbacks applied before grouping.
fn group_name(entry: &TimeEntry) -> String {
    match entry.project_name.as_deref().filter(|name| !name.is_empty()) {
        Some(name) => name.to_string(),
        None => match entry.project_id.as_deref() {
            Some(id) => format!("Unknown Project: {id}"),
            None => NO_PROJECT.to_string(),
        },
    }
}

/// Deduplicates, groups by project and computes totals at one flat hourly
/// rate. Group order follows first appearance in the entry list.
pub fn aggregate(
    entries: Vec<TimeEntry>,
    constant_items: &[ConstantLineItem],
    hourly_rate: f64,
    sink: &dyn EventSink,
) -> InvoiceBreakdown {
    let deduped = dedup_entries(entries, sink);
    let entry_hours: f64 = deduped.iter().map(|entry| entry.hours).sum();

    let mut groups: Vec<ProjectGroup> = Vec::new();
    for entry in &deduped {
        let name = group_name(entry);
        let slot = groups
            .iter_mut()
            .find(|group| group.project_id == entry.project_id && group.project_name == name);
        match slot {
            Some(group) => group.hours += entry.hours,
            None => groups.push(ProjectGroup {
                project_id: entry.project_id.clone(),
                project_name: name,
                hours: entry.hours,
                amount: 0.0,
            }),
        }
    }

    let mut total_hours = 0.0;
    let mut total_amount = 0.0;
    for group in &mut groups {
        group.amount = group.hours * hourly_rate;
        total_hours += group.hours;
        total_amount += group.amount;
    }
    for item in constant_items {
        total_amount += item.amount;
    }

    // Hours must be conserved across grouping; a mismatch means the
    // aggregation itself lost or invented time.
    if (total_hours - entry_hours).abs() > HOURS_EPSILON {
        sink.warn(format!(
            "grouped hours {total_hours} do not match entry hours {entry_hours}"
        ));
    }

    InvoiceBreakdown {
        groups,
        total_hours,
        total_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use clockify_api::BufferSink;

    fn ts(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn entry(project: Option<(&str, &str)>, description: &str, start: &str, hours: f64) -> TimeEntry {
        TimeEntry {
            project_id: project.map(|(id, _)| id.to_string()),
            project_name: project.map(|(_, name)| name.to_string()),
            description: description.to_string(),
            start: ts(start),
            end: ts(start),
            hours,
        }
    }

    #[test]
    fn exact_duplicates_are_dropped_first_occurrence_wins() {
        let sink = BufferSink::new();
        let entries = vec![
            entry(Some(("p-1", "A")), "work", "2025-09-02T09:00:00Z", 2.0),
            entry(Some(("p-1", "A")), "work", "2025-09-02T09:00:00Z", 2.0),
        ];

        let kept = dedup_entries(entries, &sink);
        assert_eq!(kept.len(), 1);
        assert!(sink.warnings()[0].contains("duplicate"));
    }

    #[test]
    fn near_duplicates_differing_in_hours_are_both_kept() {
        let sink = BufferSink::new();
        let entries = vec![
            entry(Some(("p-1", "A")), "work", "2025-09-02T09:00:00Z", 2.0),
            entry(Some(("p-1", "A")), "work", "2025-09-02T09:00:00Z", 3.0),
        ];

        assert_eq!(dedup_entries(entries, &sink).len(), 2);
        assert!(sink.warnings().is_empty());
    }

    #[test]
    fn unresolved_names_get_the_documented_fallbacks() {
        let sink = BufferSink::new();
        let entries = vec![
            TimeEntry {
                project_id: Some("p-9".to_string()),
                project_name: None,
                description: "id only".to_string(),
                start: ts("2025-09-02T09:00:00Z"),
                end: ts("2025-09-02T10:00:00Z"),
                hours: 1.0,
            },
            TimeEntry {
                project_id: None,
                project_name: None,
                description: "untagged".to_string(),
                start: ts("2025-09-03T09:00:00Z"),
                end: ts("2025-09-03T10:00:00Z"),
                hours: 1.0,
            },
        ];

        let breakdown = aggregate(entries, &[], 50.0, &sink);
        let names: Vec<&str> = breakdown
            .groups
            .iter()
            .map(|group| group.project_name.as_str())
            .collect();
        assert_eq!(names, vec!["Unknown Project: p-9", "No Project"]);
    }

    #[test]
    fn grouping_preserves_first_seen_order_and_sums_hours() {
        let sink = BufferSink::new();
        let entries = vec![
            entry(Some(("p-b", "Beta")), "x", "2025-09-01T09:00:00Z", 1.0),
            entry(Some(("p-a", "Alpha")), "y", "2025-09-02T09:00:00Z", 2.0),
            entry(Some(("p-b", "Beta")), "z", "2025-09-03T09:00:00Z", 0.5),
        ];

        let breakdown = aggregate(entries, &[], 10.0, &sink);
        assert_eq!(breakdown.groups.len(), 2);
        assert_eq!(breakdown.groups[0].project_name, "Beta");
        assert_eq!(breakdown.groups[0].hours, 1.5);
        assert_eq!(breakdown.groups[1].project_name, "Alpha");
        assert_eq!(breakdown.groups[1].hours, 2.0);
    }

    #[test]
    fn grouped_hours_equal_deduplicated_entry_hours() {
        let sink = BufferSink::new();
        let entries = vec![
            entry(Some(("p-1", "A")), "a", "2025-09-01T09:00:00Z", 0.1),
            entry(Some(("p-1", "A")), "b", "2025-09-02T09:00:00Z", 0.2),
            entry(Some(("p-2", "B")), "c", "2025-09-03T09:00:00Z", 0.3),
            // Exact duplicate of the first entry; must not count twice.
            entry(Some(("p-1", "A")), "a", "2025-09-01T09:00:00Z", 0.1),
        ];

        let breakdown = aggregate(entries, &[], 10.0, &sink);
        let expected: f64 = 0.1 + 0.2 + 0.3;
        assert!((breakdown.total_hours - expected).abs() < HOURS_EPSILON);
        assert!(sink
            .warnings()
            .iter()
            .all(|w| !w.contains("do not match")));
    }

    #[test]
    fn constant_items_add_amount_but_not_hours() {
        let sink = BufferSink::new();
        let entries = vec![entry(Some(("p-1", "A")), "a", "2025-09-01T09:00:00Z", 2.0)];
        let items = vec![ConstantLineItem {
            description: "Hosting".to_string(),
            amount: 25.0,
        }];

        let breakdown = aggregate(entries, &items, 100.0, &sink);
        assert_eq!(breakdown.total_hours, 2.0);
        assert_eq!(breakdown.total_amount, 225.0);
    }

    #[test]
    fn end_to_end_scenario_matches_expected_totals() {
        let sink = BufferSink::new();
        let entries = vec![
            entry(Some(("p-a", "Project A")), "feature", "2025-09-01T09:00:00Z", 2.0),
            entry(Some(("p-a", "Project A")), "review", "2025-09-02T09:00:00Z", 3.0),
            entry(Some(("p-b", "Project B")), "support", "2025-09-03T09:00:00Z", 1.0),
        ];
        let items = vec![ConstantLineItem {
            description: "Setup Fee".to_string(),
            amount: 50.0,
        }];

        let breakdown = aggregate(entries, &items, 100.0, &sink);

        assert_eq!(breakdown.groups.len(), 2);
        assert_eq!(breakdown.groups[0].project_name, "Project A");
        assert_eq!(breakdown.groups[0].hours, 5.0);
        assert_eq!(breakdown.groups[0].amount, 500.0);
        assert_eq!(breakdown.groups[1].project_name, "Project B");
        assert_eq!(breakdown.groups[1].hours, 1.0);
        assert_eq!(breakdown.groups[1].amount, 100.0);
        assert_eq!(breakdown.total_hours, 6.0);
        assert_eq!(breakdown.total_amount, 650.0);
    }
}
