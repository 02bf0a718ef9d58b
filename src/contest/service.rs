use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{
    models::{Contest, ContestMembership, MembershipReceipt},
    repository::{ContestRepository, JoinContestResult},
    types::{CreateContestRequest, LeaderboardEntry},
};
use crate::directory::DirectoryRepository;
use crate::roster::{self, RosterSubmission, UserRoster};
use crate::scoring::compute_points;
use crate::shared::AppError;
use crate::squad::{repository::SquadRepository, MatchSquad};

/// Contest admission and the read paths around it
pub struct ContestRegistry {
    contests: Arc<dyn ContestRepository + Send + Sync>,
    squads: Arc<dyn SquadRepository + Send + Sync>,
    directory: Arc<dyn DirectoryRepository + Send + Sync>,
}

impl ContestRegistry {
    pub fn new(
        contests: Arc<dyn ContestRepository + Send + Sync>,
        squads: Arc<dyn SquadRepository + Send + Sync>,
        directory: Arc<dyn DirectoryRepository + Send + Sync>,
    ) -> Self {
        Self {
            contests,
            squads,
            directory,
        }
    }

    /// Admits `user_id` into a contest with the submitted roster.
    ///
    /// The roster is validated against the match squad before the atomic
    /// admission step, so a rejected roster never touches the counters.
    #[instrument(skip(self, submission))]
    pub async fn join(
        &self,
        contest_id: &str,
        user_id: &str,
        submission: RosterSubmission,
    ) -> Result<MembershipReceipt, AppError> {
        let contest = self.get_contest(contest_id).await?;

        let squad = self
            .squads
            .get_squad(&contest.match_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("No squad assigned for match {}", contest.match_id))
            })?;

        if let Err(err) = roster::validate(&submission, &squad) {
            info!(contest_id = %contest_id, user_id = %user_id, reason = %err, "Join declined: invalid roster");
            return Err(err.into());
        }

        let roster = UserRoster::from_submission(submission, user_id, &contest.match_id, contest_id);
        let membership = ContestMembership::new(roster);

        match self.contests.try_join(membership).await {
            Ok(JoinContestResult::Joined(receipt)) => {
                info!(
                    contest_id = %contest_id,
                    user_id = %user_id,
                    membership_id = %receipt.membership_id,
                    spots_remaining = receipt.spots_remaining,
                    "User joined contest"
                );
                Ok(receipt)
            }
            Ok(JoinContestResult::ContestNotFound) => {
                Err(AppError::NotFound(format!("Contest {} not found", contest_id)))
            }
            Ok(JoinContestResult::Denied(denial)) => {
                info!(contest_id = %contest_id, user_id = %user_id, ?denial, "Join declined");
                Err(denial.into())
            }
            Err(e) => {
                warn!(contest_id = %contest_id, user_id = %user_id, error = %e, "Admission failed");
                Err(e)
            }
        }
    }

    #[instrument(skip(self, request), fields(match_id = %request.match_id))]
    pub async fn create_contest(&self, request: CreateContestRequest) -> Result<Contest, AppError> {
        request.validate()?;

        if self.directory.get_match(&request.match_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Match {} not found",
                request.match_id
            )));
        }

        let contest = request.into_contest();
        self.contests.create_contest(&contest).await?;

        info!(contest_id = %contest.id, total_spots = contest.total_spots, "Contest created");
        Ok(contest)
    }

    pub async fn get_contest(&self, contest_id: &str) -> Result<Contest, AppError> {
        self.contests
            .get_contest(contest_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Contest {} not found", contest_id)))
    }

    pub async fn list_contests_for_match(&self, match_id: &str) -> Result<Vec<Contest>, AppError> {
        self.contests.list_contests_for_match(match_id).await
    }

    /// Every roster the user has entered, oldest first
    #[instrument(skip(self))]
    pub async fn list_user_rosters(&self, user_id: &str) -> Result<Vec<UserRoster>, AppError> {
        let memberships = self.contests.list_user_memberships(user_id).await?;
        debug!(user_id = %user_id, count = memberships.len(), "Listed user rosters");

        Ok(memberships.into_iter().map(|m| m.roster).collect())
    }

    /// Ranks a contest's entries by the live points of their six players.
    /// Equal totals share a rank and the next rank skips (1, 1, 3).
    #[instrument(skip(self))]
    pub async fn leaderboard(&self, contest_id: &str) -> Result<Vec<LeaderboardEntry>, AppError> {
        let contest = self.get_contest(contest_id).await?;
        let squad = self.squads.get_squad(&contest.match_id).await?;
        let mut memberships = self.contests.list_memberships(contest_id).await?;

        memberships.sort_by(|a, b| a.joined_at.cmp(&b.joined_at).then_with(|| a.id.cmp(&b.id)));

        let mut scored: Vec<(i64, ContestMembership)> = memberships
            .into_iter()
            .map(|m| (roster_points(&m.roster, squad.as_ref()), m))
            .collect();
        // Stable sort keeps join order among equal totals
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        let mut entries = Vec::with_capacity(scored.len());
        let mut rank = 0;
        let mut previous_points = None;
        for (position, (points, membership)) in scored.into_iter().enumerate() {
            if previous_points != Some(points) {
                rank = position as u32 + 1;
                previous_points = Some(points);
            }
            entries.push(LeaderboardEntry {
                rank,
                membership_id: membership.id,
                user_id: membership.user_id,
                roster_id: membership.roster.id,
                team_name: membership.roster.team_name,
                total_points: points,
            });
        }

        Ok(entries)
    }
}

fn roster_points(roster: &UserRoster, squad: Option<&MatchSquad>) -> i64 {
    let Some(squad) = squad else {
        return 0;
    };

    roster
        .players
        .iter()
        .filter_map(|id| squad.find_player(id))
        .map(|player| compute_points(&player.live_stats))
        .sum()
}
