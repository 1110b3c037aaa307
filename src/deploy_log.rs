//! Per-item deploy outcomes.
//!
//! Rows are appended in request order and never changed afterwards. The log
//! is written once, after the last import.

use anyhow::Result;
use chrono::Utc;
use std::path::{Path, PathBuf};

use crate::models::{ContentKind, DeployOutcome, DeployStatus};
use crate::tables::Table;

pub const DEPLOY_LOG_FILE: &str = "deploy_log.csv";
pub const DEPLOY_LOG_COLUMNS: [&str; 5] = ["date", "type", "value", "status", "issue"];

#[derive(Debug, Clone, Default)]
pub struct DeployLog {
    outcomes: Vec<DeployOutcome>,
}

impl DeployLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_deployed(&mut self, kind: ContentKind, value: &str) {
        self.push(kind, value, DeployStatus::Deployed, String::new());
    }

    pub fn record_failed(&mut self, kind: ContentKind, value: &str, issue: impl Into<String>) {
        self.push(kind, value, DeployStatus::Failed, issue.into());
    }

    fn push(&mut self, kind: ContentKind, value: &str, status: DeployStatus, issue: String) {
        self.outcomes.push(DeployOutcome {
            date: Utc::now(),
            kind,
            requested_value: value.to_string(),
            status,
            issue,
        });
    }

    pub fn outcomes(&self) -> &[DeployOutcome] {
        &self.outcomes
    }

    pub fn count(&self, status: DeployStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new(&DEPLOY_LOG_COLUMNS);
        for o in &self.outcomes {
            table.push_row(vec![
                o.date.format("%Y-%m-%d %H:%M:%S").to_string(),
                o.kind.as_str().to_string(),
                o.requested_value.clone(),
                o.status.as_str().to_string(),
                o.issue.clone(),
            ]);
        }
        table
    }

    /// Write `deploy_log.csv` into `output_dir`.
    pub fn write(&self, output_dir: &Path) -> Result<PathBuf> {
        self.to_table().write_to(output_dir, DEPLOY_LOG_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order_and_counts() {
        let mut log = DeployLog::new();
        log.record_failed(ContentKind::Looks, "A/x", "Request failed.");
        log.record_deployed(ContentKind::Looks, "A/y");

        let values: Vec<_> = log
            .outcomes()
            .iter()
            .map(|o| (o.requested_value.as_str(), o.status))
            .collect();
        assert_eq!(
            values,
            vec![("A/x", DeployStatus::Failed), ("A/y", DeployStatus::Deployed)]
        );
        assert_eq!(log.count(DeployStatus::Failed), 1);
        assert_eq!(log.count(DeployStatus::Deployed), 1);
    }

    #[test]
    fn table_has_log_columns() {
        let mut log = DeployLog::new();
        log.record_deployed(ContentKind::Dashboards, "A/B/Sales");
        let table = log.to_table();
        assert_eq!(table.headers(), &DEPLOY_LOG_COLUMNS);
        let row = &table.rows()[0];
        assert_eq!(&row[1..], &["dashboards", "A/B/Sales", "DEPLOYED", ""]);
    }
}
