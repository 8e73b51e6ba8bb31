use crate::display::Console;
use crate::error::{Result, YagdError};
use crate::github::executor::Executor;
use crate::github::query::QuerySpec;
use crate::github::GH;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Deserialize)]
struct RawAuthor {
    login: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPullRequest {
    number: u64,
    title: String,
    head_ref_name: String,
    author: RawAuthor,
    #[serde(default)]
    url: Option<String>,
}

/// One open pull request as listed by `gh`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestRecord {
    pub number: u64,
    pub title: String,
    pub branch: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl From<RawPullRequest> for PullRequestRecord {
    fn from(raw: RawPullRequest) -> Self {
        Self {
            number: raw.number,
            title: raw.title,
            branch: raw.head_ref_name,
            author: raw.author.login,
            url: raw.url,
        }
    }
}

/// Parses JSON Lines output. Any unreadable line fails the whole listing.
pub fn parse_records(stdout: &str, context: &str) -> Result<Vec<PullRequestRecord>> {
    stdout
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str::<RawPullRequest>(line)
                .map(PullRequestRecord::from)
                .map_err(|source| YagdError::MalformedOutput {
                    context: context.to_string(),
                    line: index + 1,
                    source,
                })
        })
        .collect()
}

/// Lists the pull requests of the checkout at `path`, in the order `gh` returns them.
pub fn scan<E: Executor + ?Sized>(
    executor: &E,
    console: &mut dyn Console,
    path: &Path,
    query: &QuerySpec,
) -> Result<Vec<PullRequestRecord>> {
    let output = executor.execute(GH, &query.to_args(), Some(path))?;
    let stderr = output.stderr.trim();

    if output.stdout.trim().is_empty() {
        if !output.success() {
            return Err(YagdError::ExternalToolFailed {
                program: format!("{GH} pr list"),
                status: output.status_label(),
                stderr: stderr.to_string(),
            });
        }
        if !stderr.is_empty() {
            console.warn(&format!("{}: {stderr}", path.display()));
        }
        return Ok(Vec::new());
    }

    if !stderr.is_empty() {
        console.warn(&format!("{}: {stderr}", path.display()));
    }

    let records = parse_records(&output.stdout, &path.display().to_string())?;
    Ok(records
        .into_iter()
        .filter(|record| query.author_filter.matches(&record.author))
        .collect())
}
