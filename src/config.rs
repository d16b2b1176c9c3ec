//! Run configuration for a single agenda publishing run.
use chrono::{Datelike, NaiveDate, Weekday};
use secrecy::SecretString;
use std::path::PathBuf;

use crate::error::{AgendaError, Result};

/// Default local path the repository is cloned into.
pub const DEFAULT_WORKDIR: &str = "/tmp/repo";
/// Default base URL git clones are made from.
pub const DEFAULT_GIT_BASE_URL: &str = "https://github.com";
/// Default GitHub REST API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";
/// Weekday the agenda meeting takes place on.
pub const AGENDA_WEEKDAY: Weekday = Weekday::Wed;

/// The date an agenda is prepared for.
///
/// Branch and file names are both derived from this single value so they can
/// never disagree within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct AgendaDate(NaiveDate);

impl AgendaDate {
    /// Next agenda day on or after `today`. Today itself qualifies.
    pub fn on_or_after(today: NaiveDate) -> Result<Self> {
        today
            .iter_days()
            .take(7)
            .find(|day| day.weekday() == AGENDA_WEEKDAY)
            .map(Self)
            .ok_or(AgendaError::DateOutOfRange(today))
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Zero padded `MM-DD`.
    pub fn branch_name(&self) -> String {
        format!("{:02}-{:02}", self.0.month(), self.0.day())
    }

    pub fn file_name(&self) -> String {
        format!("{}.md", self.branch_name())
    }
}

/// Git credentials. The token is also used for the pull request API.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub token: SecretString,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: "".to_string(),
            token: SecretString::from("".to_string()),
        }
    }
}

/// Immutable parameters of one run, resolved once at startup.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Agenda date the branch and file are named after.
    pub agenda: AgendaDate,
    /// Owner of the agenda repository.
    pub organization: String,
    /// Name of the agenda repository.
    pub repo: String,
    /// Branch the pull request targets.
    pub pr_base: String,
    /// Local directory the repository is cloned into.
    pub workdir: PathBuf,
    /// Base URL clones are made from, e.g. `https://github.com`.
    pub git_base_url: String,
    /// Base URL of the pull request API, e.g. `https://api.github.com`.
    pub api_base_url: String,
    /// Username sent with the pull request API request.
    pub pr_username: String,
    /// Credentials for git transport and the API.
    pub credentials: Credentials,
    /// Remove an existing working directory before cloning.
    pub clean_workdir: bool,
}

impl RunConfig {
    pub fn branch_name(&self) -> String {
        self.agenda.branch_name()
    }

    pub fn file_name(&self) -> String {
        self.agenda.file_name()
    }

    pub fn clone_url(&self) -> String {
        format!(
            "{}/{}/{}.git",
            self.git_base_url.trim_end_matches('/'),
            self.organization,
            self.repo
        )
    }

    pub fn commit_message(&self) -> String {
        format!("add {} agenda", self.branch_name())
    }

    pub fn pr_title(&self) -> String {
        format!("Agenda {}", self.branch_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::create_test_run_config;
    use chrono::Days;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn monday_advances_to_wednesday() {
        let agenda = AgendaDate::on_or_after(date(2024, 1, 1)).unwrap();
        assert_eq!(agenda.date(), date(2024, 1, 3));
        assert_eq!(agenda.branch_name(), "01-03");
        assert_eq!(agenda.file_name(), "01-03.md");
    }

    #[test]
    fn wednesday_stays_on_same_day() {
        let agenda = AgendaDate::on_or_after(date(2025, 6, 4)).unwrap();
        assert_eq!(agenda.date(), date(2025, 6, 4));
        assert_eq!(agenda.file_name(), "06-04.md");
    }

    #[test]
    fn thursday_wraps_to_next_week_across_year_end() {
        let agenda = AgendaDate::on_or_after(date(2026, 12, 31)).unwrap();
        assert_eq!(agenda.date(), date(2027, 1, 6));
        assert_eq!(agenda.branch_name(), "01-06");
    }

    #[test]
    fn every_day_maps_to_wednesday_within_a_week() {
        let start = date(2023, 1, 1);
        for offset in 0..800 {
            let today = start + Days::new(offset);
            let agenda = AgendaDate::on_or_after(today).unwrap();
            let target = agenda.date();

            assert!(target >= today);
            assert_eq!(target.weekday(), Weekday::Wed);
            assert!((target - today).num_days() < 7);
            assert_eq!(
                agenda.file_name(),
                format!("{}.md", agenda.branch_name())
            );
        }
    }

    #[test]
    fn end_of_calendar_is_out_of_range() {
        let result = AgendaDate::on_or_after(NaiveDate::MAX);
        if NaiveDate::MAX.weekday() != Weekday::Wed {
            assert!(matches!(result, Err(AgendaError::DateOutOfRange(_))));
        }
    }

    #[test]
    fn derived_names_share_the_agenda_date() {
        let config = create_test_run_config("/tmp/repo".into());
        assert_eq!(config.branch_name(), "01-03");
        assert_eq!(config.file_name(), "01-03.md");
        assert_eq!(config.commit_message(), "add 01-03 agenda");
        assert_eq!(config.pr_title(), "Agenda 01-03");
    }

    #[test]
    fn clone_url_joins_base_org_and_repo() {
        let mut config = create_test_run_config("/tmp/repo".into());
        assert_eq!(config.clone_url(), "https://github.com/coflnet/agenda.git");

        config.git_base_url = "file:///srv/git/".into();
        assert_eq!(config.clone_url(), "file:///srv/git/coflnet/agenda.git");
    }

    #[test]
    fn credentials_debug_redacts_token() {
        let credentials = Credentials {
            username: "bot".into(),
            token: SecretString::from("super-secret".to_string()),
        };
        let printed = format!("{credentials:?}");
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("bot"));
    }
}
