//! JSON report files.

use crate::error::OutputError;
use crate::scanner::ScanReport;
use chrono::{DateTime, TimeZone};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// File name for a report: `{identifier}_{DD-MM-YYYY-HHMM}.json`.
pub fn report_file_name<Tz>(identifier: &str, captured_at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    format!("{}_{}.json", identifier, captured_at.format("%d-%m-%Y-%H%M"))
}

/// Serialize the whole report into `dir` in one write.
///
/// Returns the path of the written file.
pub fn write_json_report<Tz>(
    report: &ScanReport,
    dir: &Path,
    identifier: &str,
    captured_at: &DateTime<Tz>,
) -> Result<PathBuf, OutputError>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let path = dir.join(report_file_name(identifier, captured_at));
    let content = serde_json::to_string_pretty(report)?;

    fs::create_dir_all(dir).map_err(|e| OutputError::WriteFailed {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    fs::write(&path, content).map_err(|e| OutputError::WriteFailed {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{scan_with_scanner, PortResult, ProbeConfig, ScanTask, Scanner};
    use crate::types::TargetSpec;
    use async_trait::async_trait;
    use chrono::Utc;

    struct ClosedScanner;

    #[async_trait]
    impl Scanner for ClosedScanner {
        async fn scan(&self, task: ScanTask) -> PortResult {
            PortResult::closed(task)
        }
    }

    fn captured_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 7, 9, 5, 0).unwrap()
    }

    #[test]
    fn test_report_file_name() {
        assert_eq!(
            report_file_name("10.0.0.1", &captured_at()),
            "10.0.0.1_07-03-2026-0905.json"
        );
    }

    #[tokio::test]
    async fn test_write_json_report() {
        let target: TargetSpec = "10.0.0.1".parse().unwrap();
        let ports = "22".parse().unwrap();
        let report = scan_with_scanner(&ClosedScanner, &target, &ports, &ProbeConfig::new()).await;

        let dir = tempfile::tempdir().unwrap();
        let path = write_json_report(&report, dir.path(), &target.identifier(), &captured_at())
            .unwrap();
        assert_eq!(path, dir.path().join("10.0.0.1_07-03-2026-0905.json"));

        let content = fs::read_to_string(&path).unwrap();
        let parsed: ScanReport = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, report);

        let json: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["address"], "10.0.0.1");
        assert_eq!(json[0]["ports"][0]["status"], "closed");
    }

    #[tokio::test]
    async fn test_write_failure_is_reported() {
        let file = tempfile::NamedTempFile::new().unwrap();
        // a regular file cannot act as the output directory
        let result = write_json_report(
            &ScanReport::default(),
            file.path(),
            "10.0.0.1",
            &captured_at(),
        );
        assert!(matches!(result, Err(OutputError::WriteFailed { .. })));
    }
}
