use chrono::Utc;
use volley_fantasy::{
    directory::{
        AssociationRole, InMemoryDirectoryRepository, MatchRecord, PlayerCategory, PlayerRecord,
        TeamAssociation, TeamRecord,
    },
    RosterSubmission,
};

pub const HOME_TEAM: &str = "thunderbolts";
pub const AWAY_TEAM: &str = "spartans";

/// Player id for the n-th (1-based) player of a side
pub fn home_player(n: u32) -> String {
    format!("{}-{}", HOME_TEAM, n)
}

pub fn away_player(n: u32) -> String {
    format!("{}-{}", AWAY_TEAM, n)
}

/// Builds a directory holding one match between two teams.
/// Jersey numbers follow player numbers; the 5th player of each side is captain.
pub struct DirectoryBuilder {
    match_id: String,
    players_per_side: u32,
}

impl DirectoryBuilder {
    pub fn new(match_id: &str) -> Self {
        Self {
            match_id: match_id.to_string(),
            players_per_side: 8,
        }
    }

    pub fn with_players_per_side(mut self, count: u32) -> Self {
        self.players_per_side = count;
        self
    }

    pub fn build(self) -> InMemoryDirectoryRepository {
        let matches = vec![MatchRecord {
            id: self.match_id.clone(),
            league_id: "pvl".to_string(),
            home_team_id: HOME_TEAM.to_string(),
            away_team_id: AWAY_TEAM.to_string(),
            start_time: Utc::now(),
            status: "upcoming".to_string(),
            venue: "Kochi".to_string(),
        }];
        let teams = vec![
            TeamRecord {
                id: HOME_TEAM.to_string(),
                name: "Calicut Thunderbolts".to_string(),
                code: "CT".to_string(),
            },
            TeamRecord {
                id: AWAY_TEAM.to_string(),
                name: "Kochi Spartans".to_string(),
                code: "KS".to_string(),
            },
        ];

        let mut players = Vec::new();
        let mut associations = Vec::new();
        for team in [HOME_TEAM, AWAY_TEAM] {
            for n in 1..=self.players_per_side {
                let player_id = format!("{}-{}", team, n);
                players.push(PlayerRecord {
                    id: player_id.clone(),
                    name: format!("Player {}", player_id),
                    image_url: String::new(),
                    default_category: PlayerCategory::Attacker,
                    default_credits: 8.5,
                });
                associations.push(TeamAssociation {
                    id: format!("assoc-{}", player_id),
                    player_id,
                    team_id: team.to_string(),
                    season: "2026".to_string(),
                    jersey_number: n,
                    role: if n == 5 {
                        AssociationRole::Captain
                    } else {
                        AssociationRole::Player
                    },
                    is_active: true,
                });
            }
        }

        InMemoryDirectoryRepository::with_records(matches, teams, players, associations)
    }
}

/// A valid six-player roster: three from each side, captain and vice from the home side
pub fn valid_roster() -> RosterSubmission {
    roster_of(vec![
        home_player(1),
        home_player(2),
        home_player(3),
        away_player(1),
        away_player(2),
        away_player(3),
    ])
}

/// Roster using the first two players as captain and vice-captain
pub fn roster_of(players: Vec<String>) -> RosterSubmission {
    let captain = players.first().cloned().unwrap_or_default();
    let vice = players.get(1).cloned().unwrap_or_default();
    RosterSubmission::new(players, &captain, &vice)
}
