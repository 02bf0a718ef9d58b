use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, PgPool, Row};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

use super::models::{AdmissionDenial, Contest, ContestMembership, ContestStatus, MembershipReceipt};
use crate::roster::UserRoster;
use crate::shared::AppError;

/// Result of attempting to admit a membership into a contest
#[derive(Debug, Clone)]
pub enum JoinContestResult {
    /// Membership stored and counters moved, returns the receipt
    Joined(MembershipReceipt),
    /// Contest does not exist
    ContestNotFound,
    /// Contest turned the entry away, nothing was written
    Denied(AdmissionDenial),
}

/// Trait for contest and membership storage
#[async_trait]
pub trait ContestRepository {
    async fn create_contest(&self, contest: &Contest) -> Result<(), AppError>;
    async fn get_contest(&self, contest_id: &str) -> Result<Option<Contest>, AppError>;
    async fn list_contests_for_match(&self, match_id: &str) -> Result<Vec<Contest>, AppError>;

    /// Atomically checks status, capacity and the user's entry count, then
    /// takes a spot and stores the membership. Concurrent joins on the same
    /// contest never over-subscribe it.
    async fn try_join(&self, membership: ContestMembership)
        -> Result<JoinContestResult, AppError>;

    async fn list_memberships(&self, contest_id: &str)
        -> Result<Vec<ContestMembership>, AppError>;
    async fn list_user_memberships(&self, user_id: &str)
        -> Result<Vec<ContestMembership>, AppError>;
}

struct ContestLedger {
    contest: Contest,
    memberships: Vec<ContestMembership>,
}

/// In-memory implementation of ContestRepository for development and testing.
/// Each contest has its own lock so joins on different contests never wait on each other.
#[derive(Default)]
pub struct InMemoryContestRepository {
    ledgers: RwLock<HashMap<String, Arc<Mutex<ContestLedger>>>>,
}

impl InMemoryContestRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contests(contests: Vec<Contest>) -> Self {
        let ledgers = contests
            .into_iter()
            .map(|contest| {
                let ledger = ContestLedger {
                    contest,
                    memberships: Vec::new(),
                };
                (ledger.contest.id.clone(), Arc::new(Mutex::new(ledger)))
            })
            .collect();

        Self {
            ledgers: RwLock::new(ledgers),
        }
    }

    async fn ledger(&self, contest_id: &str) -> Option<Arc<Mutex<ContestLedger>>> {
        self.ledgers.read().await.get(contest_id).cloned()
    }

    async fn all_ledgers(&self) -> Vec<Arc<Mutex<ContestLedger>>> {
        self.ledgers.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl ContestRepository for InMemoryContestRepository {
    #[instrument(skip(self, contest), fields(contest_id = %contest.id))]
    async fn create_contest(&self, contest: &Contest) -> Result<(), AppError> {
        let mut ledgers = self.ledgers.write().await;
        if ledgers.contains_key(&contest.id) {
            warn!("Contest already exists in memory");
            return Err(AppError::DatabaseError("Contest already exists".to_string()));
        }

        ledgers.insert(
            contest.id.clone(),
            Arc::new(Mutex::new(ContestLedger {
                contest: contest.clone(),
                memberships: Vec::new(),
            })),
        );

        debug!(match_id = %contest.match_id, "Contest created in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_contest(&self, contest_id: &str) -> Result<Option<Contest>, AppError> {
        let Some(ledger) = self.ledger(contest_id).await else {
            debug!(contest_id = %contest_id, "Contest not found in memory");
            return Ok(None);
        };

        let contest = ledger.lock().await.contest.clone();
        Ok(Some(contest))
    }

    #[instrument(skip(self))]
    async fn list_contests_for_match(&self, match_id: &str) -> Result<Vec<Contest>, AppError> {
        let mut contests = Vec::new();
        for ledger in self.all_ledgers().await {
            let ledger = ledger.lock().await;
            if ledger.contest.match_id == match_id {
                contests.push(ledger.contest.clone());
            }
        }
        contests.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

        debug!(match_id = %match_id, count = contests.len(), "Listed contests for match");
        Ok(contests)
    }

    #[instrument(skip(self, membership), fields(contest_id = %membership.contest_id, user_id = %membership.user_id))]
    async fn try_join(
        &self,
        membership: ContestMembership,
    ) -> Result<JoinContestResult, AppError> {
        let Some(ledger) = self.ledger(&membership.contest_id).await else {
            debug!("Contest not found");
            return Ok(JoinContestResult::ContestNotFound);
        };

        let mut ledger = ledger.lock().await;

        let existing_entries = ledger
            .memberships
            .iter()
            .filter(|m| m.user_id == membership.user_id)
            .count();

        if let Err(denial) = ledger.contest.check_admission(existing_entries) {
            debug!(?denial, spots_remaining = ledger.contest.spots_remaining, "Admission denied");
            return Ok(JoinContestResult::Denied(denial));
        }

        ledger.contest.reserve_spot();
        let receipt = MembershipReceipt::new(&ledger.contest, &membership);
        ledger.memberships.push(membership);

        info!(
            spots_remaining = receipt.spots_remaining,
            joined_users = receipt.joined_users,
            "Membership admitted (atomic)"
        );

        Ok(JoinContestResult::Joined(receipt))
    }

    #[instrument(skip(self))]
    async fn list_memberships(
        &self,
        contest_id: &str,
    ) -> Result<Vec<ContestMembership>, AppError> {
        match self.ledger(contest_id).await {
            Some(ledger) => Ok(ledger.lock().await.memberships.clone()),
            None => Ok(Vec::new()),
        }
    }

    #[instrument(skip(self))]
    async fn list_user_memberships(
        &self,
        user_id: &str,
    ) -> Result<Vec<ContestMembership>, AppError> {
        let mut memberships = Vec::new();
        for ledger in self.all_ledgers().await {
            let ledger = ledger.lock().await;
            memberships.extend(
                ledger
                    .memberships
                    .iter()
                    .filter(|m| m.user_id == user_id)
                    .cloned(),
            );
        }
        memberships.sort_by(|a, b| a.joined_at.cmp(&b.joined_at));

        Ok(memberships)
    }
}

/// PostgreSQL implementation. Admission runs in one transaction holding a
/// row lock on the contest.
pub struct PostgresContestRepository {
    pool: PgPool,
}

impl PostgresContestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const CONTEST_COLUMNS: &str = "id, match_id, name, entry_fee, prize_pool, total_spots, \
     spots_remaining, joined_users, max_entries_per_user, winner_percentage, is_guaranteed, \
     status, created_at";

const MEMBERSHIP_COLUMNS: &str = "id, contest_id, user_id, roster_id, match_id, team_name, \
     players, captain_id, vice_captain_id, roster_created_at, joined_at";

fn count_column(row: &PgRow, column: &str) -> Result<u32, AppError> {
    let value: i32 = row.get(column);
    u32::try_from(value)
        .map_err(|_| AppError::DatabaseError(format!("Negative value in {}", column)))
}

fn contest_from_row(row: &PgRow) -> Result<Contest, AppError> {
    let status: String = row.get("status");
    let status = ContestStatus::from_str(&status)
        .map_err(|_| AppError::DatabaseError(format!("Unknown contest status: {}", status)))?;

    Ok(Contest {
        id: row.get("id"),
        match_id: row.get("match_id"),
        name: row.get("name"),
        entry_fee: row.get("entry_fee"),
        prize_pool: row.get("prize_pool"),
        total_spots: count_column(row, "total_spots")?,
        spots_remaining: count_column(row, "spots_remaining")?,
        joined_users: count_column(row, "joined_users")?,
        max_entries_per_user: count_column(row, "max_entries_per_user")?,
        winner_percentage: row.get("winner_percentage"),
        is_guaranteed: row.get("is_guaranteed"),
        status,
        created_at: row.get("created_at"),
    })
}

fn membership_from_row(row: &PgRow) -> ContestMembership {
    let contest_id: String = row.get("contest_id");
    let user_id: String = row.get("user_id");
    let joined_at: DateTime<Utc> = row.get("joined_at");

    ContestMembership {
        id: row.get("id"),
        roster: UserRoster {
            id: row.get("roster_id"),
            user_id: user_id.clone(),
            match_id: row.get("match_id"),
            contest_id: contest_id.clone(),
            team_name: row.get("team_name"),
            players: row.get("players"),
            captain_id: row.get("captain_id"),
            vice_captain_id: row.get("vice_captain_id"),
            created_at: row.get("roster_created_at"),
        },
        contest_id,
        user_id,
        joined_at,
    }
}

#[async_trait]
impl ContestRepository for PostgresContestRepository {
    #[instrument(skip(self, contest), fields(contest_id = %contest.id))]
    async fn create_contest(&self, contest: &Contest) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO contests (id, match_id, name, entry_fee, prize_pool, total_spots, \
             spots_remaining, joined_users, max_entries_per_user, winner_percentage, \
             is_guaranteed, status, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(&contest.id)
        .bind(&contest.match_id)
        .bind(&contest.name)
        .bind(contest.entry_fee)
        .bind(contest.prize_pool)
        .bind(contest.total_spots as i32)
        .bind(contest.spots_remaining as i32)
        .bind(contest.joined_users as i32)
        .bind(contest.max_entries_per_user as i32)
        .bind(contest.winner_percentage)
        .bind(contest.is_guaranteed)
        .bind(contest.status.as_ref())
        .bind(contest.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create contest in database");
            AppError::DatabaseError(e.to_string())
        })?;

        debug!(match_id = %contest.match_id, "Contest created in database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_contest(&self, contest_id: &str) -> Result<Option<Contest>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM contests WHERE id = $1", CONTEST_COLUMNS))
            .bind(contest_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(contest_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn list_contests_for_match(&self, match_id: &str) -> Result<Vec<Contest>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM contests WHERE match_id = $1 ORDER BY created_at, id",
            CONTEST_COLUMNS
        ))
        .bind(match_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(contest_from_row).collect()
    }

    #[instrument(skip(self, membership), fields(contest_id = %membership.contest_id, user_id = %membership.user_id))]
    async fn try_join(
        &self,
        membership: ContestMembership,
    ) -> Result<JoinContestResult, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "SELECT {} FROM contests WHERE id = $1 FOR UPDATE",
            CONTEST_COLUMNS
        ))
        .bind(&membership.contest_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            debug!("Contest not found");
            return Ok(JoinContestResult::ContestNotFound);
        };
        let mut contest = contest_from_row(&row)?;

        let existing_entries: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM contest_memberships WHERE contest_id = $1 AND user_id = $2",
        )
        .bind(&membership.contest_id)
        .bind(&membership.user_id)
        .fetch_one(&mut *tx)
        .await?;

        let existing_entries = usize::try_from(existing_entries).unwrap_or(usize::MAX);
        if let Err(denial) = contest.check_admission(existing_entries) {
            debug!(?denial, spots_remaining = contest.spots_remaining, "Admission denied");
            return Ok(JoinContestResult::Denied(denial));
        }

        contest.reserve_spot();

        sqlx::query("UPDATE contests SET spots_remaining = $2, joined_users = $3 WHERE id = $1")
            .bind(&contest.id)
            .bind(contest.spots_remaining as i32)
            .bind(contest.joined_users as i32)
            .execute(&mut *tx)
            .await?;

        let roster = &membership.roster;
        sqlx::query(&format!(
            "INSERT INTO contest_memberships ({}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
            MEMBERSHIP_COLUMNS
        ))
        .bind(&membership.id)
        .bind(&membership.contest_id)
        .bind(&membership.user_id)
        .bind(&roster.id)
        .bind(&roster.match_id)
        .bind(&roster.team_name)
        .bind(&roster.players)
        .bind(&roster.captain_id)
        .bind(&roster.vice_captain_id)
        .bind(roster.created_at)
        .bind(membership.joined_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await.map_err(|e| {
            warn!(error = %e, "Failed to commit admission");
            AppError::DatabaseError(e.to_string())
        })?;

        let receipt = MembershipReceipt::new(&contest, &membership);
        info!(
            spots_remaining = receipt.spots_remaining,
            joined_users = receipt.joined_users,
            "Membership admitted in database"
        );

        Ok(JoinContestResult::Joined(receipt))
    }

    #[instrument(skip(self))]
    async fn list_memberships(
        &self,
        contest_id: &str,
    ) -> Result<Vec<ContestMembership>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM contest_memberships WHERE contest_id = $1 ORDER BY joined_at, id",
            MEMBERSHIP_COLUMNS
        ))
        .bind(contest_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(membership_from_row).collect())
    }

    #[instrument(skip(self))]
    async fn list_user_memberships(
        &self,
        user_id: &str,
    ) -> Result<Vec<ContestMembership>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM contest_memberships WHERE user_id = $1 ORDER BY joined_at, id",
            MEMBERSHIP_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(membership_from_row).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::RosterSubmission;
    use futures::future::join_all;

    fn membership_for(contest_id: &str, user_id: &str) -> ContestMembership {
        let players = (1..=6).map(|i| format!("h{}", i)).collect();
        let submission = RosterSubmission::new(players, "h1", "h2");
        ContestMembership::new(UserRoster::from_submission(submission, user_id, "m1", contest_id))
    }

    fn repo_with(contest: &Contest) -> Arc<InMemoryContestRepository> {
        Arc::new(InMemoryContestRepository::with_contests(vec![contest.clone()]))
    }

    #[tokio::test]
    async fn create_and_get_contest() {
        let repo = InMemoryContestRepository::new();
        let contest = Contest::new("m1", "Finals", 10, 1);

        repo.create_contest(&contest).await.unwrap();

        let stored = repo.get_contest(&contest.id).await.unwrap().unwrap();
        assert_eq!(stored, contest);
        assert!(repo.get_contest("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_contest_is_rejected() {
        let repo = InMemoryContestRepository::new();
        let contest = Contest::new("m1", "Finals", 10, 1);

        repo.create_contest(&contest).await.unwrap();
        let result = repo.create_contest(&contest).await;

        assert!(matches!(result, Err(AppError::DatabaseError(_))));
    }

    #[tokio::test]
    async fn lists_only_contests_for_match() {
        let repo = InMemoryContestRepository::with_contests(vec![
            Contest::new("m1", "A", 10, 1),
            Contest::new("m2", "B", 10, 1),
            Contest::new("m1", "C", 10, 1),
        ]);

        let contests = repo.list_contests_for_match("m1").await.unwrap();

        assert_eq!(contests.len(), 2);
        assert!(contests.iter().all(|c| c.match_id == "m1"));
    }

    #[tokio::test]
    async fn join_moves_counters_and_stores_membership() {
        let contest = Contest::new("m1", "Finals", 3, 1);
        let repo = repo_with(&contest);

        let result = repo.try_join(membership_for(&contest.id, "u1")).await.unwrap();

        let JoinContestResult::Joined(receipt) = result else {
            panic!("expected admission");
        };
        assert_eq!(receipt.spots_remaining, 2);
        assert_eq!(receipt.joined_users, 1);

        let memberships = repo.list_memberships(&contest.id).await.unwrap();
        assert_eq!(memberships.len(), 1);
        assert_eq!(memberships[0].roster.id, receipt.roster_id);
    }

    #[tokio::test]
    async fn join_unknown_contest() {
        let repo = InMemoryContestRepository::new();
        let result = repo.try_join(membership_for("missing", "u1")).await.unwrap();
        assert!(matches!(result, JoinContestResult::ContestNotFound));
    }

    #[tokio::test]
    async fn denied_join_writes_nothing() {
        let mut contest = Contest::new("m1", "Finals", 3, 1);
        contest.status = ContestStatus::Closed;
        let repo = repo_with(&contest);

        let result = repo.try_join(membership_for(&contest.id, "u1")).await.unwrap();

        assert!(matches!(
            result,
            JoinContestResult::Denied(AdmissionDenial::NotOpen)
        ));
        let stored = repo.get_contest(&contest.id).await.unwrap().unwrap();
        assert_eq!(stored.spots_remaining, 3);
        assert!(repo.list_memberships(&contest.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn concurrent_joins_never_oversubscribe() {
        let contest = Contest::new("m1", "Finals", 5, 1);
        let repo = repo_with(&contest);

        let tasks = (0..40).map(|i| {
            let repo = Arc::clone(&repo);
            let membership = membership_for(&contest.id, &format!("user-{}", i));
            tokio::spawn(async move { repo.try_join(membership).await })
        });
        let results = join_all(tasks).await;

        let joined = results
            .iter()
            .filter(|r| matches!(r, Ok(Ok(JoinContestResult::Joined(_)))))
            .count();
        let full = results
            .iter()
            .filter(|r| matches!(r, Ok(Ok(JoinContestResult::Denied(AdmissionDenial::Full)))))
            .count();

        assert_eq!(joined, 5);
        assert_eq!(full, 35);

        let stored = repo.get_contest(&contest.id).await.unwrap().unwrap();
        assert_eq!(stored.spots_remaining, 0);
        assert_eq!(stored.joined_users, 5);
        assert_eq!(repo.list_memberships(&contest.id).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn concurrent_joins_by_one_user_respect_limit() {
        let contest = Contest::new("m1", "Finals", 50, 2);
        let repo = repo_with(&contest);

        let tasks = (0..10).map(|_| {
            let repo = Arc::clone(&repo);
            let membership = membership_for(&contest.id, "greedy");
            tokio::spawn(async move { repo.try_join(membership).await })
        });
        let results = join_all(tasks).await;

        let joined = results
            .iter()
            .filter(|r| matches!(r, Ok(Ok(JoinContestResult::Joined(_)))))
            .count();
        assert_eq!(joined, 2);
        assert_eq!(repo.list_user_memberships("greedy").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn user_memberships_span_contests() {
        let first = Contest::new("m1", "A", 5, 1);
        let second = Contest::new("m1", "B", 5, 1);
        let repo = InMemoryContestRepository::with_contests(vec![first.clone(), second.clone()]);

        repo.try_join(membership_for(&first.id, "u1")).await.unwrap();
        repo.try_join(membership_for(&second.id, "u1")).await.unwrap();
        repo.try_join(membership_for(&second.id, "u2")).await.unwrap();

        let memberships = repo.list_user_memberships("u1").await.unwrap();
        assert_eq!(memberships.len(), 2);
        assert!(memberships.iter().all(|m| m.user_id == "u1"));
    }
}
