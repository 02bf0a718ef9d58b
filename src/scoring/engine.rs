use super::models::PlayerLiveStats;

/// Fixed scoring table
pub mod points {
    pub const ATTACK: i64 = 3;
    pub const ACE: i64 = 20;
    pub const BLOCK: i64 = 20;
    /// Per net successful reception (successes minus errors)
    pub const NET_RECEPTION: i64 = 3;
    pub const SET_AS_STARTER: i64 = 6;
    pub const SET_AS_SUBSTITUTE: i64 = 3;
}

/// Converts live counters into a point total.
///
/// Pure and total: absent counters contribute zero and net receptions may
/// drive the total negative.
pub fn compute_points(stats: &PlayerLiveStats) -> i64 {
    let net_receptions = i64::from(stats.receptions_success) - i64::from(stats.reception_errors);

    i64::from(stats.attacks) * points::ATTACK
        + i64::from(stats.aces) * points::ACE
        + i64::from(stats.blocks) * points::BLOCK
        + net_receptions * points::NET_RECEPTION
        + stats.sets_as_starter.len() as i64 * points::SET_AS_STARTER
        + stats.sets_as_substitute.len() as i64 * points::SET_AS_SUBSTITUTE
}
