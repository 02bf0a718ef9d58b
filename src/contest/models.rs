use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::roster::UserRoster;
use crate::shared::AppError;

/// Lifecycle of a contest. Only `Open` contests accept entries.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ContestStatus {
    Draft,
    #[default]
    Open,
    Closed,
    Settled,
}

/// A capacity-limited competition attached to one match.
///
/// `spots_remaining` stays within `0..=total_spots` and always equals
/// `total_spots - joined_users`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contest {
    pub id: String,
    pub match_id: String,
    pub name: String,
    pub entry_fee: i64,
    pub prize_pool: i64,
    pub total_spots: u32,
    pub spots_remaining: u32,
    pub joined_users: u32,
    pub max_entries_per_user: u32,
    pub winner_percentage: f64,
    pub is_guaranteed: bool,
    pub status: ContestStatus,
    pub created_at: DateTime<Utc>,
}

/// Why the admission step turned an entry away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionDenial {
    NotOpen,
    Full,
    PerUserLimitExceeded,
}

impl From<AdmissionDenial> for AppError {
    fn from(denial: AdmissionDenial) -> Self {
        match denial {
            AdmissionDenial::NotOpen => AppError::ContestNotOpen,
            AdmissionDenial::Full => AppError::ContestFull,
            AdmissionDenial::PerUserLimitExceeded => AppError::PerUserLimitExceeded,
        }
    }
}

impl Contest {
    /// Creates an open contest with every spot free
    pub fn new(match_id: &str, name: &str, total_spots: u32, max_entries_per_user: u32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            match_id: match_id.to_string(),
            name: name.to_string(),
            entry_fee: 0,
            prize_pool: 0,
            total_spots,
            spots_remaining: total_spots,
            joined_users: 0,
            max_entries_per_user,
            winner_percentage: 0.0,
            is_guaranteed: false,
            status: ContestStatus::Open,
            created_at: Utc::now(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == ContestStatus::Open
    }

    pub fn is_full(&self) -> bool {
        self.spots_remaining == 0
    }

    /// Admission checks in order: status, capacity, per-user limit.
    /// `existing_entries` is the user's current membership count in this contest.
    pub fn check_admission(&self, existing_entries: usize) -> Result<(), AdmissionDenial> {
        if !self.is_open() {
            return Err(AdmissionDenial::NotOpen);
        }
        if self.is_full() {
            return Err(AdmissionDenial::Full);
        }
        if existing_entries >= self.max_entries_per_user as usize {
            return Err(AdmissionDenial::PerUserLimitExceeded);
        }
        Ok(())
    }

    /// Takes one spot. Callers run `check_admission` first under the same lock.
    pub fn reserve_spot(&mut self) {
        self.spots_remaining = self.spots_remaining.saturating_sub(1);
        self.joined_users = self.total_spots - self.spots_remaining;
    }
}

/// A user's admitted entry in a contest, with the roster it was admitted with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestMembership {
    pub id: String,
    pub contest_id: String,
    pub user_id: String,
    pub roster: UserRoster,
    pub joined_at: DateTime<Utc>,
}

impl ContestMembership {
    pub fn new(roster: UserRoster) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            contest_id: roster.contest_id.clone(),
            user_id: roster.user_id.clone(),
            roster,
            joined_at: Utc::now(),
        }
    }
}

/// Returned to the caller on successful admission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipReceipt {
    pub membership_id: String,
    pub contest_id: String,
    pub user_id: String,
    pub roster_id: String,
    pub team_name: String,
    pub spots_remaining: u32,
    pub joined_users: u32,
    pub joined_at: DateTime<Utc>,
}

impl MembershipReceipt {
    pub fn new(contest: &Contest, membership: &ContestMembership) -> Self {
        Self {
            membership_id: membership.id.clone(),
            contest_id: contest.id.clone(),
            user_id: membership.user_id.clone(),
            roster_id: membership.roster.id.clone(),
            team_name: membership.roster.team_name.clone(),
            spots_remaining: contest.spots_remaining,
            joined_users: contest.joined_users,
            joined_at: membership.joined_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[test]
    fn new_contest_is_open_and_empty() {
        let contest = Contest::new("m1", "Finals", 10, 2);

        assert!(contest.is_open());
        assert_eq!(contest.spots_remaining, 10);
        assert_eq!(contest.joined_users, 0);
    }

    #[rstest]
    #[case(ContestStatus::Draft)]
    #[case(ContestStatus::Closed)]
    #[case(ContestStatus::Settled)]
    fn only_open_admits(#[case] status: ContestStatus) {
        let mut contest = Contest::new("m1", "Finals", 10, 1);
        contest.status = status;

        assert_eq!(contest.check_admission(0), Err(AdmissionDenial::NotOpen));
    }

    #[test]
    fn status_is_checked_before_capacity() {
        let mut contest = Contest::new("m1", "Finals", 1, 1);
        contest.reserve_spot();
        contest.status = ContestStatus::Closed;

        assert_eq!(contest.check_admission(0), Err(AdmissionDenial::NotOpen));
    }

    #[test]
    fn capacity_is_checked_before_user_limit() {
        let mut contest = Contest::new("m1", "Finals", 1, 1);
        contest.reserve_spot();

        assert_eq!(contest.check_admission(5), Err(AdmissionDenial::Full));
    }

    #[rstest]
    #[case(1, 0, true)]
    #[case(1, 1, false)]
    #[case(3, 2, true)]
    #[case(3, 3, false)]
    fn enforces_user_limit(#[case] limit: u32, #[case] existing: usize, #[case] admitted: bool) {
        let contest = Contest::new("m1", "Finals", 10, limit);

        assert_eq!(contest.check_admission(existing).is_ok(), admitted);
    }

    #[test]
    fn reserve_keeps_counters_consistent() {
        let mut contest = Contest::new("m1", "Finals", 3, 1);
        contest.reserve_spot();
        contest.reserve_spot();

        assert_eq!(contest.spots_remaining, 1);
        assert_eq!(contest.joined_users, 2);
        assert_eq!(contest.spots_remaining + contest.joined_users, contest.total_spots);
    }

    #[test]
    fn status_text_round_trips() {
        assert_eq!(ContestStatus::Settled.as_ref(), "settled");
        assert_eq!(ContestStatus::from_str("closed").unwrap(), ContestStatus::Closed);
        assert!(ContestStatus::from_str("archived").is_err());
    }

    #[test]
    fn denial_maps_to_app_error() {
        assert!(matches!(AppError::from(AdmissionDenial::Full), AppError::ContestFull));
        assert!(matches!(AppError::from(AdmissionDenial::NotOpen), AppError::ContestNotOpen));
        assert!(matches!(
            AppError::from(AdmissionDenial::PerUserLimitExceeded),
            AppError::PerUserLimitExceeded
        ));
    }
}
