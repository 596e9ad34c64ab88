use chrono::{DateTime, Duration, Utc};

use crate::ordering::parse_goals;
use crate::state::{Match, ServerPrediction};

/// Predictions close this long before kickoff.
pub const LOCK_WINDOW_HOURS: i64 = 2;

pub fn lock_window() -> Duration {
    Duration::hours(LOCK_WINDOW_HOURS)
}

/// Whether edits to `m` are rejected at `now`. Evaluated at read time, never stored.
/// A match without a known kickoff stays open; the backend has the final say.
pub fn is_match_locked(m: &Match, now: DateTime<Utc>) -> bool {
    m.kickoff.is_some_and(|kickoff| now >= kickoff - lock_window())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PredictionStatus {
    #[default]
    Idle,
    Dirty,
    Saving,
    Saved,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreSide {
    Home,
    Away,
}

impl ScoreSide {
    pub fn other(self) -> Self {
        match self {
            ScoreSide::Home => ScoreSide::Away,
            ScoreSide::Away => ScoreSide::Home,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PredictionError {
    #[error("predictions lock {LOCK_WINDOW_HOURS}h before kick-off")]
    Locked,
    #[error("unknown match {0}")]
    UnknownMatch(String),
}

/// One user's prediction for one match, as held by the client session.
///
/// The goal fields keep the raw text the user typed so partial input survives
/// until it is completed; only complete scorelines are ever persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Prediction {
    pub home: String,
    pub away: String,
    pub status: PredictionStatus,
    /// Points awarded by the backend once the match is scored.
    pub points: Option<i64>,
    pub error: Option<String>,
    /// Token of the save currently in flight.
    pub pending_save: Option<u64>,
}

impl Prediction {
    pub fn new(home: impl Into<String>, away: impl Into<String>) -> Self {
        Self {
            home: home.into(),
            away: away.into(),
            ..Self::default()
        }
    }

    /// Both goal counts, when both are present and valid.
    pub fn scoreline(&self) -> Option<(u32, u32)> {
        Some((parse_goals(&self.home)?, parse_goals(&self.away)?))
    }

    pub fn side(&self, side: ScoreSide) -> &str {
        match side {
            ScoreSide::Home => &self.home,
            ScoreSide::Away => &self.away,
        }
    }

    pub fn edit(
        &mut self,
        side: ScoreSide,
        text: impl Into<String>,
        locked: bool,
    ) -> Result<(), PredictionError> {
        if locked {
            return Err(PredictionError::Locked);
        }
        match side {
            ScoreSide::Home => self.home = text.into(),
            ScoreSide::Away => self.away = text.into(),
        }
        self.status = PredictionStatus::Dirty;
        Ok(())
    }

    /// Move to `Saving` and hand back the scoreline to persist.
    ///
    /// Only dirty or failed predictions with a complete scoreline are sent;
    /// incomplete input stays dirty.
    pub fn begin_save(&mut self, locked: bool, token: u64) -> Option<(u32, u32)> {
        if locked || !matches!(self.status, PredictionStatus::Dirty | PredictionStatus::Error) {
            return None;
        }
        let scoreline = self.scoreline()?;
        self.status = PredictionStatus::Saving;
        self.pending_save = Some(token);
        self.error = None;
        Some(scoreline)
    }

    /// Returns false when `token` does not belong to the save in flight.
    pub fn save_succeeded(&mut self, token: u64, points: Option<i64>) -> bool {
        if self.pending_save != Some(token) {
            return false;
        }
        self.pending_save = None;
        if points.is_some() {
            self.points = points;
        }
        // An edit made while saving keeps the prediction dirty.
        if self.status == PredictionStatus::Saving {
            self.status = PredictionStatus::Saved;
        }
        true
    }

    pub fn save_failed(&mut self, token: u64, message: &str) -> bool {
        if self.pending_save != Some(token) {
            return false;
        }
        self.pending_save = None;
        self.error = Some(message.to_string());
        if self.status == PredictionStatus::Saving {
            self.status = PredictionStatus::Error;
        }
        true
    }

    /// Take over what the backend has stored.
    pub fn merge_server(&mut self, server: &ServerPrediction) {
        self.home = server.home_goals.map(|g| g.to_string()).unwrap_or_default();
        self.away = server.away_goals.map(|g| g.to_string()).unwrap_or_default();
        self.points = server.points;
        self.error = None;
        self.status = if self.scoreline().is_some() {
            PredictionStatus::Saved
        } else {
            PredictionStatus::Idle
        };
    }
}

pub fn status_label(status: PredictionStatus, locked: bool) -> &'static str {
    if locked {
        return "Locked";
    }
    match status {
        PredictionStatus::Idle => "",
        PredictionStatus::Dirty => "Changed - press Enter to save",
        PredictionStatus::Saving => "Saving...",
        PredictionStatus::Saved => "Saved",
        PredictionStatus::Error => "Error - will retry on next change",
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn fixture(kickoff: Option<DateTime<Utc>>) -> Match {
        Match {
            id: "1".to_string(),
            home_team: "A".to_string(),
            away_team: "B".to_string(),
            group_name: None,
            stage: None,
            kickoff,
            result: None,
        }
    }

    #[test]
    fn lock_starts_two_hours_before_kickoff() {
        let kickoff = Utc.with_ymd_and_hms(2026, 6, 11, 19, 0, 0).unwrap();
        let m = fixture(Some(kickoff));
        assert!(!is_match_locked(&m, kickoff - Duration::hours(3)));
        assert!(!is_match_locked(&m, kickoff - Duration::minutes(121)));
        assert!(is_match_locked(&m, kickoff - Duration::hours(2)));
        assert!(is_match_locked(&m, kickoff + Duration::hours(1)));
        assert!(!is_match_locked(&fixture(None), kickoff));
    }

    #[test]
    fn edit_save_cycle() {
        let mut p = Prediction::default();
        assert_eq!(p.status, PredictionStatus::Idle);

        p.edit(ScoreSide::Home, "2", false).unwrap();
        assert_eq!(p.status, PredictionStatus::Dirty);
        assert_eq!(p.begin_save(false, 1), None, "incomplete input is not sent");
        assert_eq!(p.status, PredictionStatus::Dirty);

        p.edit(ScoreSide::Away, "1", false).unwrap();
        assert_eq!(p.begin_save(false, 2), Some((2, 1)));
        assert_eq!(p.status, PredictionStatus::Saving);
        assert!(p.save_succeeded(2, Some(0)));
        assert_eq!(p.status, PredictionStatus::Saved);
        assert_eq!(p.points, Some(0));

        p.edit(ScoreSide::Away, "3", false).unwrap();
        assert_eq!(p.status, PredictionStatus::Dirty);
        assert_eq!(p.begin_save(false, 3), Some((2, 3)));
        assert!(p.save_failed(3, "boom"));
        assert_eq!(p.status, PredictionStatus::Error);
        assert_eq!(p.error.as_deref(), Some("boom"));

        p.edit(ScoreSide::Home, "1", false).unwrap();
        assert_eq!(p.status, PredictionStatus::Dirty);
    }

    #[test]
    fn locked_edits_are_rejected() {
        let mut p = Prediction::new("1", "1");
        p.status = PredictionStatus::Saved;
        assert_eq!(p.edit(ScoreSide::Home, "4", true), Err(PredictionError::Locked));
        assert_eq!(p.home, "1");
        assert_eq!(p.status, PredictionStatus::Saved);
    }

    #[test]
    fn edit_during_save_stays_dirty() {
        let mut p = Prediction::new("1", "0");
        p.status = PredictionStatus::Dirty;
        assert_eq!(p.begin_save(false, 7), Some((1, 0)));
        p.edit(ScoreSide::Home, "2", false).unwrap();
        assert!(!p.save_succeeded(6, None));
        assert!(p.save_succeeded(7, None));
        assert_eq!(p.status, PredictionStatus::Dirty);
        assert_eq!(p.pending_save, None);
    }

    #[test]
    fn locked_overrides_status_label() {
        assert_eq!(status_label(PredictionStatus::Saved, true), "Locked");
        assert_eq!(status_label(PredictionStatus::Saved, false), "Saved");
        assert_eq!(status_label(PredictionStatus::Idle, false), "");
    }
}
