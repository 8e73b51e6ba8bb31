use crate::config::TeamRef;
use crate::display::Console;
use crate::error::{Result, YagdError};
use crate::github::executor::Executor;
use crate::github::GH;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Member {
    login: String,
}

fn members_endpoint(team: &TeamRef) -> String {
    format!("orgs/{}/teams/{}/members", team.org, team.team)
}

/// `--paginate` concatenates one JSON array per page, so the output is read as
/// a stream of arrays.
fn parse_members(stdout: &str) -> serde_json::Result<Vec<String>> {
    let mut logins = Vec::new();
    for page in serde_json::Deserializer::from_str(stdout).into_iter::<Vec<Member>>() {
        logins.extend(page?.into_iter().map(|m| m.login));
    }
    Ok(logins)
}

fn push_unique(set: &mut Vec<String>, login: String) {
    if !set.contains(&login) {
        set.push(login);
    }
}

/// Looks up the members of one team. Diagnostics are reported to the console.
/// A failed lookup with no readable members is an error; unreadable output from
/// a successful lookup yields no members.
pub fn team_members<E: Executor + ?Sized>(
    executor: &E,
    console: &mut dyn Console,
    team: &TeamRef,
) -> Result<Vec<String>> {
    let args = vec![
        "api".to_string(),
        "--paginate".to_string(),
        members_endpoint(team),
    ];
    let output = executor.execute(GH, &args, None)?;
    let stderr = output.stderr.trim();
    let parsed = parse_members(&output.stdout);

    if !output.success() && !matches!(&parsed, Ok(members) if !members.is_empty()) {
        return Err(YagdError::ExternalToolFailed {
            program: format!("{GH} api"),
            status: output.status_label(),
            stderr: format!("{team}: {stderr}"),
        });
    }

    if !stderr.is_empty() {
        console.warn(&format!("{team}: {stderr}"));
    }

    match parsed {
        Ok(members) => {
            tracing::debug!(%team, count = members.len(), "resolved team members");
            Ok(members)
        }
        Err(e) => {
            console.warn(&format!("Could not read members of {team}: {e}"));
            Ok(Vec::new())
        }
    }
}

/// Effective author filter for a run. Once any team is configured, team
/// membership replaces the explicit author list entirely. An empty result means
/// no author restriction.
pub fn resolve_authors<E: Executor + ?Sized>(
    executor: &E,
    console: &mut dyn Console,
    explicit: &[String],
    teams: &[TeamRef],
) -> Result<Vec<String>> {
    let mut resolved = Vec::new();

    if teams.is_empty() {
        for login in explicit {
            push_unique(&mut resolved, login.clone());
        }
        return Ok(resolved);
    }

    for team in teams {
        for login in team_members(executor, console, team)? {
            push_unique(&mut resolved, login);
        }
    }
    Ok(resolved)
}
