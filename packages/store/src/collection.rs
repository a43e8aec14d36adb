//! Id-keyed, insertion-ordered report collection.

use std::collections::BTreeMap;

use pothole_map_report_models::Report;

/// All reports known to the client.
///
/// Reports are kept in the order they were first seen. The first report
/// with a given id wins; later reports with the same id are dropped, so
/// merging is idempotent and, for batches with disjoint ids, independent of
/// order.
#[derive(Debug, Clone, Default)]
pub struct ReportCollection {
    index: BTreeMap<String, usize>,
    reports: Vec<Report>,
}

impl ReportCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts every report whose id is not yet present and returns how
    /// many were inserted.
    pub fn merge(&mut self, incoming: impl IntoIterator<Item = Report>) -> usize {
        let mut inserted = 0;
        for report in incoming {
            if self.contains(&report.id) {
                continue;
            }
            self.index.insert(report.id.clone(), self.reports.len());
            self.reports.push(report);
            inserted += 1;
        }
        inserted
    }

    /// Looks up a report by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Report> {
        self.index.get(id).map(|&i| &self.reports[i])
    }

    /// Whether a report with this id is present.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Reports in insertion order.
    #[must_use]
    pub fn as_slice(&self) -> &[Report] {
        &self.reports
    }

    /// Number of reports.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reports.len()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone as _, Utc};

    use super::*;

    fn report(n: u32, device: &str) -> Report {
        Report {
            id: format!("00000000-0000-4000-8000-{n:012x}"),
            device_name: device.to_string(),
            timestamp: Utc.with_ymd_and_hms(2020, 7, 4, 10, 0, 0).unwrap(),
            confidence: 0.9,
            coordinates: [-31.95, 115.86],
            photo_url: None,
        }
    }

    #[test]
    fn keeps_insertion_order_and_first_write() {
        let mut c = ReportCollection::new();
        assert_eq!(c.merge([report(2, "a"), report(1, "a")]), 2);
        assert_eq!(c.merge([report(1, "b"), report(3, "b")]), 1);

        let devices: Vec<&str> = c.as_slice().iter().map(|r| r.device_name.as_str()).collect();
        assert_eq!(devices, ["a", "a", "b"]);
        assert_eq!(c.get(&report(1, "").id).unwrap().device_name, "a");
        assert_eq!(c.len(), 3);
    }

    #[test]
    fn duplicate_ids_within_one_batch_insert_once() {
        let mut c = ReportCollection::new();
        assert_eq!(c.merge([report(7, "first"), report(7, "second")]), 1);
        assert_eq!(c.get(&report(7, "").id).unwrap().device_name, "first");
    }

    #[test]
    fn empty() {
        let c = ReportCollection::new();
        assert_eq!(c.len(), 0);
        assert!(!c.contains("00000000-0000-4000-8000-000000000001"));
        assert!(c.get("missing").is_none());
    }
}
