use serde::{Deserialize, Serialize};

use crate::severity::Severity;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetEntry {
    pub filename: String,
    pub group: String,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetInventoryManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub source_directory: String,
    pub sheet_count: usize,
    pub sheets: Vec<SheetEntry>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SeverityTally {
    pub not_available: usize,
    pub good: usize,
    pub average: usize,
    pub degraded: usize,
    pub critical: usize,
}

impl SeverityTally {
    pub fn record(&mut self, severity: Severity) {
        match severity {
            Severity::NotAvailable => self.not_available += 1,
            Severity::Good => self.good += 1,
            Severity::Average => self.average += 1,
            Severity::Degraded => self.degraded += 1,
            Severity::Critical => self.critical += 1,
        }
    }

}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupAssessSummary {
    pub group: String,
    pub status: String,
    pub sheet_path: String,
    pub output_path: Option<String>,
    pub rows_total: usize,
    pub entities_classified: usize,
    pub rows_skipped_blank_key: usize,
    pub duplicate_keys: usize,
    pub final_severities: SeverityTally,
    pub failure_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub command: String,
    pub data_root: String,
    pub out_root: String,
    pub groups: Vec<GroupAssessSummary>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupReportSummary {
    pub group: String,
    pub status: String,
    pub processed_path: String,
    pub entities: usize,
    pub final_severities: SeverityTally,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub command: String,
    pub out_root: String,
    pub commentary_source: Option<String>,
    pub entity_count: usize,
    pub groups: Vec<GroupReportSummary>,
    pub output_path: String,
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::SeverityTally;
    use crate::severity::Severity;

    #[test]
    fn tally_counts_each_severity_bucket() {
        let mut tally = SeverityTally::default();
        tally.record(Severity::Good);
        tally.record(Severity::Good);
        tally.record(Severity::Critical);
        tally.record(Severity::NotAvailable);

        assert_eq!(tally.good, 2);
        assert_eq!(tally.critical, 1);
        assert_eq!(tally.not_available, 1);
        assert_eq!(tally.average, 0);
        assert_eq!(tally.degraded, 0);
    }
}
