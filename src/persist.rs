use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use tracing::{info, warn};

use crate::config::MonitorConfig;
use crate::error::PersistError;
use crate::summary::RunOverview;
use crate::{Endpoint, HistoryEntry, RunSummary, SavedReport};

const REPORT_PREFIX: &str = "report_";
const REPORT_SUFFIX: &str = ".json";

/// Percentage of cycles in which each endpoint was online. An endpoint
/// missing from a cycle counts as offline for that cycle.
pub fn availability(history: &[HistoryEntry], endpoints: &[Endpoint]) -> BTreeMap<String, f64> {
    endpoints
        .iter()
        .map(|endpoint| {
            let percentage = if history.is_empty() {
                0.0
            } else {
                let online = history
                    .iter()
                    .filter(|entry| {
                        entry
                            .details
                            .get(&endpoint.name)
                            .is_some_and(|result| result.online)
                    })
                    .count();
                online as f64 / history.len() as f64 * 100.0
            };
            (endpoint.name.clone(), percentage)
        })
        .collect()
}

pub fn summarize_run(
    history: &[HistoryEntry],
    endpoints: &[Endpoint],
    generation_time: DateTime<Utc>,
) -> RunSummary {
    RunSummary {
        total_cycles: history.len(),
        availability_by_endpoint: availability(history, endpoints),
        generation_time,
    }
}

pub fn report_file_name(now: DateTime<Local>) -> String {
    format!("{REPORT_PREFIX}{}{REPORT_SUFFIX}", now.format("%Y%m%d_%H%M%S"))
}

/// Writes `report` as pretty JSON into `path`. The parent directory must exist.
pub fn write_report(path: &Path, report: &SavedReport) -> Result<(), PersistError> {
    let file = File::create(path).map_err(|source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::to_writer_pretty(BufWriter::new(file), report).map_err(|source| {
        PersistError::Json {
            path: path.to_path_buf(),
            source,
        }
    })
}

pub fn read_report(path: &Path) -> Result<SavedReport, PersistError> {
    let file = File::open(path).map_err(|source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| PersistError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Most recent readable report in `dir`, going by the timestamp in its name.
/// Unreadable reports are skipped in favour of older ones. A missing
/// directory is the same as an empty one.
pub fn load_latest(dir: &Path) -> Option<SavedReport> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return None,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "failed to list reports");
            return None;
        }
    };

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(REPORT_PREFIX) && name.ends_with(REPORT_SUFFIX))
        })
        .collect();
    candidates.sort_unstable_by(|a, b| b.cmp(a));

    candidates.iter().find_map(|path| match read_report(path) {
        Ok(report) => Some(report),
        Err(e) => {
            warn!(error = %e, "skipping unreadable report");
            None
        }
    })
}

/// Prints the availability overview of a finished run and saves it.
///
/// Returns where the report was written. A failed write is reported on the
/// console and otherwise ignored.
pub fn finish(history: &[HistoryEntry], config: &MonitorConfig) -> Option<PathBuf> {
    if history.is_empty() {
        println!("No monitoring data");
        return None;
    }

    let report = SavedReport {
        history: history.to_vec(),
        summary: summarize_run(history, &config.endpoints, Utc::now()),
    };
    println!(
        "{}",
        RunOverview {
            history,
            summary: &report.summary,
        }
    );

    let path = config.report_dir.join(report_file_name(Local::now()));
    match write_report(&path, &report) {
        Ok(()) => {
            info!(path = %path.display(), cycles = history.len(), "report saved");
            println!("\n💾 Report saved: {}", path.display());
            Some(path)
        }
        Err(e) => {
            warn!(error = %e, "failed to save report");
            println!("\n📝 Note: the report could not be saved (restricted environment?)");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CheckResult, EndpointKind, Failure, OverallStatus, Summary};
    use chrono::TimeZone;

    fn endpoints() -> Vec<Endpoint> {
        vec![
            Endpoint::new("api", "http://api.test", EndpointKind::Api),
            Endpoint::new("dashboard", "http://dashboard.test", EndpointKind::Dashboard),
        ]
    }

    fn entry(cycle: u32, api: bool, dashboard: bool) -> HistoryEntry {
        let result = |online: bool| {
            if online {
                CheckResult {
                    online: true,
                    status_code: Some(200),
                    ..CheckResult::default()
                }
            } else {
                CheckResult::offline(Failure::Timeout, None, Some(30.0))
            }
        };
        let online = usize::from(api) + usize::from(dashboard);
        HistoryEntry {
            cycle,
            timestamp: Utc::now(),
            summary: Summary {
                status: OverallStatus::from_counts(online, 2),
                online,
                total: 2,
                timestamp: Utc::now(),
            },
            details: BTreeMap::from([
                ("api".to_string(), result(api)),
                ("dashboard".to_string(), result(dashboard)),
            ]),
        }
    }

    #[test]
    fn always_online_is_exactly_one_hundred() {
        let history: Vec<_> = (1..=3).map(|cycle| entry(cycle, true, false)).collect();
        let availability = availability(&history, &endpoints());
        assert_eq!(availability["api"], 100.0);
        assert_eq!(availability["dashboard"], 0.0);
    }

    #[test]
    fn availability_is_a_percentage_of_cycles() {
        let history = vec![
            entry(1, true, true),
            entry(2, false, true),
            entry(3, true, true),
            entry(4, true, false),
        ];
        let availability = availability(&history, &endpoints());
        assert_eq!(availability["api"], 75.0);
        assert_eq!(availability["dashboard"], 75.0);
    }

    #[test]
    fn missing_endpoint_counts_as_offline() {
        let mut only = entry(1, true, true);
        only.details.remove("dashboard");
        let availability = availability(&[only], &endpoints());
        assert_eq!(availability["dashboard"], 0.0);
    }

    #[test]
    fn report_name_embeds_timestamp() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(report_file_name(now), "report_20240309_070501.json");
    }

    #[test]
    fn saved_report_has_expected_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report_20240101_000000.json");
        let history = vec![entry(1, true, true)];
        let report = SavedReport {
            summary: summarize_run(&history, &endpoints(), Utc::now()),
            history,
        };
        write_report(&path, &report).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["summary"]["total_cycles"], 1);
        assert_eq!(json["summary"]["availability_by_endpoint"]["api"], 100.0);
        assert!(json["summary"]["generation_time"].is_string());
        assert_eq!(json["history"][0]["cycle"], 1);
        assert_eq!(json["history"][0]["summary"]["status"], "optimal");
        assert_eq!(json["history"][0]["details"]["api"]["online"], true);

        assert_eq!(read_report(&path).unwrap(), report);
    }

    #[test]
    fn latest_report_is_picked_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let older = SavedReport {
            history: vec![entry(1, false, false)],
            summary: summarize_run(&[entry(1, false, false)], &endpoints(), Utc::now()),
        };
        let newer = SavedReport {
            history: vec![entry(1, true, true)],
            summary: summarize_run(&[entry(1, true, true)], &endpoints(), Utc::now()),
        };
        write_report(&dir.path().join("report_20240101_000000.json"), &older).unwrap();
        write_report(&dir.path().join("report_20240102_000000.json"), &newer).unwrap();
        fs::write(dir.path().join("notes.json"), "{}").unwrap();

        assert_eq!(load_latest(dir.path()), Some(newer));
    }

    #[test]
    fn corrupt_newest_report_falls_back_to_older() {
        let dir = tempfile::tempdir().unwrap();
        let older = SavedReport {
            history: vec![entry(1, true, false)],
            summary: summarize_run(&[entry(1, true, false)], &endpoints(), Utc::now()),
        };
        write_report(&dir.path().join("report_20240101_000000.json"), &older).unwrap();
        fs::write(dir.path().join("report_20240102_000000.json"), "{\"history\": [").unwrap();

        assert_eq!(load_latest(dir.path()), Some(older));
    }

    #[test]
    fn only_corrupt_reports_means_no_data() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("report_20240102_000000.json"), "not json").unwrap();
        assert_eq!(load_latest(dir.path()), None);
    }

    #[test]
    fn missing_directory_has_no_report() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_latest(&dir.path().join("absent")), None);
    }

    #[test]
    fn unwritable_directory_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = MonitorConfig {
            report_dir: dir.path().join("missing").join("nested"),
            ..MonitorConfig::default()
        };
        assert_eq!(finish(&[entry(1, true, true)], &config), None);
    }

    #[test]
    fn empty_history_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = MonitorConfig {
            report_dir: dir.path().to_path_buf(),
            ..MonitorConfig::default()
        };
        assert_eq!(finish(&[], &config), None);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
