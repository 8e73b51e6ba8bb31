use crate::config::FilterConfig;
use crate::display::Console;
use crate::error::{Result, YagdError};
use crate::github::executor::Executor;
use crate::github::query::QuerySpec;
use crate::github::scanner::{self, PullRequestRecord};
use crate::github::teams;
use crate::presenter::{self, TableSpec};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum RepositoryOutcome {
    Listed(Vec<PullRequestRecord>),
    Failed(YagdError),
}

#[derive(Debug)]
pub struct RepositoryReport {
    pub path: PathBuf,
    pub outcome: RepositoryOutcome,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub repositories: Vec<RepositoryReport>,
}

impl RunReport {
    pub fn failures(&self) -> usize {
        self.repositories
            .iter()
            .filter(|r| matches!(r.outcome, RepositoryOutcome::Failed(_)))
            .count()
    }
}

#[derive(Serialize)]
struct Listing<'a> {
    path: &'a Path,
    pull_requests: &'a [PullRequestRecord],
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Lists open pull requests for every configured repository, in order. A failing
/// repository is reported and skipped; the rest of the batch still runs.
pub fn run<E: Executor + ?Sized>(
    config: &FilterConfig,
    executor: &E,
    console: &mut dyn Console,
    json: bool,
) -> Result<RunReport> {
    console.status("Fetching pull requests…");
    let report = fetch_all(config, executor, console, json);
    console.clear_status();
    let report = report?;

    if json {
        print_json(console, &report);
    }

    Ok(report)
}

fn fetch_all<E: Executor + ?Sized>(
    config: &FilterConfig,
    executor: &E,
    console: &mut dyn Console,
    json: bool,
) -> Result<RunReport> {
    let authors =
        teams::resolve_authors(executor, console, &config.authors, &config.authors_from_teams)?;
    tracing::debug!(?authors, "resolved author filter");

    let query = QuerySpec::build(config, &authors);
    let table_spec = TableSpec::from_config(config);
    let mut report = RunReport::default();

    for path in &config.repos {
        let outcome = match scanner::scan(executor, console, path, &query) {
            Ok(records) => {
                if !json {
                    presenter::render(console, path, &records, &table_spec);
                }
                RepositoryOutcome::Listed(records)
            }
            Err(e) => {
                console.warn(&format!(
                    "Failed to fetch pull requests for {}: {e}",
                    path.display()
                ));
                RepositoryOutcome::Failed(e)
            }
        };
        report.repositories.push(RepositoryReport {
            path: path.clone(),
            outcome,
        });
    }

    Ok(report)
}

fn print_json(console: &mut dyn Console, report: &RunReport) {
    let listings: Vec<Listing<'_>> = report
        .repositories
        .iter()
        .map(|r| match &r.outcome {
            RepositoryOutcome::Listed(records) => Listing {
                path: &r.path,
                pull_requests: records,
                error: None,
            },
            RepositoryOutcome::Failed(e) => Listing {
                path: &r.path,
                pull_requests: &[],
                error: Some(e.to_string()),
            },
        })
        .collect();

    match serde_json::to_string_pretty(&listings) {
        Ok(json) => console.print(&json),
        Err(e) => console.error(&format!("Failed to serialize JSON: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TeamRef;
    use crate::display::testing::RecordingConsole;
    use crate::github::executor::testing::{ok, FakeExecutor};
    use crate::github::executor::ProcessOutput;

    const TWO_PRS: &str = concat!(
        r#"{"number":3,"title":"Add caching","headRefName":"cache","author":{"login":"carol"}}"#,
        "\n",
        r#"{"number":5,"title":"Fix typo","headRefName":"typo","author":{"login":"erin"}}"#,
        "\n"
    );

    fn config(repos: &[&str]) -> FilterConfig {
        FilterConfig {
            repos: repos.iter().map(PathBuf::from).collect(),
            ..FilterConfig::default()
        }
    }

    #[test]
    fn lists_two_results_for_one_repository() {
        let executor = FakeExecutor::stdout(TWO_PRS);
        let mut console = RecordingConsole::default();

        let report = run(&config(&["/r1"]), &executor, &mut console, false).unwrap();

        assert_eq!(report.failures(), 0);
        assert_eq!(console.lines[0], "Found 2 results for /r1");
        assert!(console.lines[1].contains("#3"));
        assert!(console.lines[1].contains("#5"));
        assert_eq!(console.statuses, vec!["Fetching pull requests…"]);
        assert!(console.status_cleared);
    }

    #[test]
    fn zero_bytes_means_zero_results() {
        let executor = FakeExecutor::stdout("");
        let mut console = RecordingConsole::default();

        run(&config(&["/r1"]), &executor, &mut console, false).unwrap();

        assert_eq!(console.lines, vec!["Found 0 results for /r1", ""]);
    }

    #[test]
    fn repositories_are_processed_in_order() {
        let executor = FakeExecutor::stdout("");
        let mut console = RecordingConsole::default();

        run(&config(&["/b", "/a", "/c"]), &executor, &mut console, false).unwrap();

        let cwds: Vec<PathBuf> = executor
            .calls
            .borrow()
            .iter()
            .filter_map(|c| c.cwd.clone())
            .collect();
        assert_eq!(
            cwds,
            vec![PathBuf::from("/b"), PathBuf::from("/a"), PathBuf::from("/c")]
        );
    }

    #[test]
    fn team_members_drive_the_author_filter() {
        let executor = FakeExecutor::new(|call| {
            if call.args[0] == "api" {
                Ok(ok(r#"[{"login":"carol"},{"login":"dave"}]"#))
            } else {
                Ok(ok(TWO_PRS))
            }
        });
        let mut console = RecordingConsole::default();
        let config = FilterConfig {
            authors: vec!["alice".into()],
            authors_from_teams: vec![TeamRef {
                org: "acme".into(),
                team: "core".into(),
            }],
            show_author: true,
            ..config(&["/r1"])
        };

        run(&config, &executor, &mut console, false).unwrap();

        let calls = executor.calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[1].args[7],
            r#"(.[] | select(.author.login | contains("carol") or contains("dave")))"#
        );
        assert_eq!(console.lines[0], "Found 1 result for /r1");
        assert!(console.lines[1].contains("carol"));
        assert!(!console.lines[1].contains("erin"));
    }

    #[test]
    fn teams_are_resolved_once_per_run() {
        let executor = FakeExecutor::new(|call| {
            if call.args[0] == "api" {
                Ok(ok(r#"[{"login":"carol"}]"#))
            } else {
                Ok(ok(""))
            }
        });
        let mut console = RecordingConsole::default();
        let config = FilterConfig {
            authors_from_teams: vec![TeamRef {
                org: "acme".into(),
                team: "core".into(),
            }],
            ..config(&["/r1", "/r2", "/r3"])
        };

        run(&config, &executor, &mut console, false).unwrap();

        let lookups = executor
            .calls
            .borrow()
            .iter()
            .filter(|c| c.args[0] == "api")
            .count();
        assert_eq!(lookups, 1);
        assert_eq!(executor.call_count(), 4);
    }

    #[test]
    fn failing_repository_does_not_stop_the_batch() {
        let executor = FakeExecutor::new(|call| {
            if call.cwd.as_deref() == Some(Path::new("/broken")) {
                Ok(ProcessOutput {
                    stdout: String::new(),
                    stderr: "not a git repository".into(),
                    exit_code: Some(1),
                })
            } else {
                Ok(ok(TWO_PRS))
            }
        });
        let mut console = RecordingConsole::default();

        let report = run(&config(&["/broken", "/r2"]), &executor, &mut console, false).unwrap();

        assert_eq!(report.failures(), 1);
        assert_eq!(report.repositories.len(), 2);
        assert!(matches!(
            report.repositories[1].outcome,
            RepositoryOutcome::Listed(ref records) if records.len() == 2
        ));
        assert_eq!(console.warnings.len(), 1);
        assert!(console.warnings[0].contains("/broken"));
        assert_eq!(console.lines[0], "Found 2 results for /r2");
    }

    #[test]
    fn author_lookup_failure_aborts_before_any_repository() {
        let executor = FakeExecutor::new(|call| {
            Err(YagdError::ExternalTool {
                program: call.program.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
            })
        });
        let mut console = RecordingConsole::default();
        let config = FilterConfig {
            authors_from_teams: vec![TeamRef {
                org: "acme".into(),
                team: "core".into(),
            }],
            ..config(&["/r1"])
        };

        assert!(run(&config, &executor, &mut console, false).is_err());
        assert_eq!(executor.call_count(), 1);
        assert!(console.status_cleared);
        assert!(console.lines.is_empty());
    }

    #[test]
    fn json_mode_prints_one_document() {
        let executor = FakeExecutor::stdout(TWO_PRS);
        let mut console = RecordingConsole::default();

        run(&config(&["/r1"]), &executor, &mut console, true).unwrap();

        assert_eq!(console.lines.len(), 1);
        let value: serde_json::Value = serde_json::from_str(&console.lines[0]).unwrap();
        assert_eq!(value[0]["path"], "/r1");
        assert_eq!(value[0]["pull_requests"][1]["number"], 5);
        assert_eq!(value[0]["pull_requests"][0]["branch"], "cache");
    }

    #[test]
    fn json_mode_reports_failed_repositories() {
        let executor = FakeExecutor::new(|call| {
            if call.cwd.as_deref() == Some(Path::new("/broken")) {
                Ok(ProcessOutput {
                    stdout: String::new(),
                    stderr: "not a git repository".into(),
                    exit_code: Some(1),
                })
            } else {
                Ok(ok(TWO_PRS))
            }
        });
        let mut console = RecordingConsole::default();

        run(&config(&["/broken", "/r2"]), &executor, &mut console, true).unwrap();

        let value: serde_json::Value = serde_json::from_str(&console.lines[0]).unwrap();
        assert_eq!(value[0]["path"], "/broken");
        assert_eq!(value[0]["pull_requests"].as_array().map(Vec::len), Some(0));
        assert!(value[0]["error"]
            .as_str()
            .unwrap()
            .contains("not a git repository"));
        assert!(value[1].get("error").is_none());
        assert!(console.errors.is_empty());
        assert_eq!(value[1]["pull_requests"][0]["number"], 3);
    }

    #[test]
    fn failed_team_lookup_stops_the_run() {
        let executor = FakeExecutor::new(|call| {
            if call.args[0] == "api" {
                Ok(ProcessOutput {
                    stdout: String::new(),
                    stderr: "error connecting to api.github.com".into(),
                    exit_code: Some(1),
                })
            } else {
                Ok(ok(TWO_PRS))
            }
        });
        let mut console = RecordingConsole::default();
        let config = FilterConfig {
            authors: vec!["alice".into()],
            authors_from_teams: vec![TeamRef {
                org: "acme".into(),
                team: "core".into(),
            }],
            ..config(&["/r1", "/r2"])
        };

        let err = run(&config, &executor, &mut console, false).unwrap_err();

        assert!(matches!(err, YagdError::ExternalToolFailed { .. }));
        assert_eq!(executor.call_count(), 1);
        assert!(console.lines.is_empty());
        assert!(console.status_cleared);
    }

    #[test]
    fn every_repository_gets_the_same_columns() {
        let executor = FakeExecutor::stdout(TWO_PRS);
        let mut console = RecordingConsole::default();
        let config = FilterConfig {
            show_branch: true,
            show_headers: true,
            ..config(&["/r1", "/r2"])
        };

        run(&config, &executor, &mut console, false).unwrap();

        assert_eq!(console.lines.len(), 4);
        assert_eq!(console.lines[0], "Found 2 results for /r1");
        assert_eq!(console.lines[2], "Found 2 results for /r2");
        let first = &console.lines[1];
        let second = &console.lines[3];
        assert_eq!(first, second);
        for table in [first, second] {
            let header = table.lines().next().unwrap();
            assert!(header.contains("No."));
            assert!(header.contains("Title"));
            assert!(header.contains("Branch"));
            assert!(!header.contains("Author"));
            assert!(!header.contains("Url"));
            assert!(table.contains("cache"));
        }
    }
}
