mod utils;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use futures::future::join_all;
use rstest::rstest;
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use utils::*;
use volley_fantasy::{
    contest::{Contest, ContestStatus},
    AppError, ContestRepository, MembershipReceipt, RosterValidationError,
};

type JoinOutcome = Result<MembershipReceipt, AppError>;

/// Fires one join per user concurrently and collects the outcomes
async fn join_concurrently(setup: &TestSetup, contest_id: &str, users: Vec<String>) -> Vec<JoinOutcome> {
    let registry = setup.registry();
    let tasks = users.into_iter().map(|user| {
        let registry = registry.clone();
        let contest_id = contest_id.to_string();
        tokio::spawn(async move { registry.join(&contest_id, &user, valid_roster()).await })
    });

    join_all(tasks)
        .await
        .into_iter()
        .map(|handle| handle.unwrap())
        .collect()
}

async fn assert_counters_consistent(setup: &TestSetup, contest_id: &str) -> Contest {
    let contest = setup.contests.get_contest(contest_id).await.unwrap().unwrap();
    let memberships = setup.contests.list_memberships(contest_id).await.unwrap();

    assert!(contest.spots_remaining <= contest.total_spots);
    assert_eq!(contest.spots_remaining + contest.joined_users, contest.total_spots);
    assert_eq!(memberships.len() as u32, contest.joined_users);
    contest
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_joins_never_oversubscribe() {
    let contest = Contest::new(MATCH_ID, "Mega", 10, 1);
    let setup = TestSetupBuilder::new().with_contest(contest.clone()).build().await;

    let users = (0..60).map(|i| format!("user-{}", i)).collect();
    let outcomes = join_concurrently(&setup, &contest.id, users).await;

    let admitted = outcomes.iter().filter(|o| o.is_ok()).count();
    let full = outcomes
        .iter()
        .filter(|o| matches!(o, Err(AppError::ContestFull)))
        .count();
    assert_eq!(admitted, 10);
    assert_eq!(full, 50);

    let stored = assert_counters_consistent(&setup, &contest.id).await;
    assert_eq!(stored.spots_remaining, 0);
}

#[rstest]
#[case(1, 2)]
#[case(3, 3)]
#[case(5, 20)]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_exactly_n_admitted_for_n_spots(#[case] spots: u32, #[case] users: usize) {
    let contest = Contest::new(MATCH_ID, "Head to head", spots, 1);
    let setup = TestSetupBuilder::new().with_contest(contest.clone()).build().await;

    let users = (0..users).map(|i| format!("user-{}", i)).collect();
    let outcomes = join_concurrently(&setup, &contest.id, users).await;

    let admitted: Vec<&MembershipReceipt> = outcomes.iter().filter_map(|o| o.as_ref().ok()).collect();
    assert_eq!(admitted.len(), spots as usize);

    // Every admission saw a distinct remaining-spot count
    let mut remaining: Vec<u32> = admitted.iter().map(|r| r.spots_remaining).collect();
    remaining.sort_unstable();
    assert_eq!(remaining, (0..spots).collect::<Vec<u32>>());

    assert_counters_consistent(&setup, &contest.id).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_per_user_limit_holds_under_concurrency() {
    let contest = Contest::new(MATCH_ID, "Multi entry", 100, 3);
    let setup = TestSetupBuilder::new().with_contest(contest.clone()).build().await;

    let users = (0..25).map(|_| "same-user".to_string()).collect();
    let outcomes = join_concurrently(&setup, &contest.id, users).await;

    let admitted = outcomes.iter().filter(|o| o.is_ok()).count();
    let limited = outcomes
        .iter()
        .filter(|o| matches!(o, Err(AppError::PerUserLimitExceeded)))
        .count();
    assert_eq!(admitted, 3);
    assert_eq!(limited, 22);

    let stored = assert_counters_consistent(&setup, &contest.id).await;
    assert_eq!(stored.spots_remaining, 97);
}

#[tokio::test]
async fn test_invalid_rosters_leave_counters_untouched() {
    let contest = Contest::new(MATCH_ID, "Mega", 10, 1);
    let setup = TestSetupBuilder::new().with_contest(contest.clone()).build().await;
    let registry = setup.registry();

    let wrong_size = roster_of(vec![home_player(1), home_player(2), home_player(3)]);
    let duplicate = roster_of(vec![
        home_player(1),
        home_player(2),
        home_player(2),
        away_player(1),
        away_player(2),
        away_player(3),
    ]);
    let outsider = roster_of(vec![
        home_player(1),
        home_player(2),
        home_player(3),
        away_player(1),
        away_player(2),
        "free-agent".to_string(),
    ]);
    let mut same_captain = valid_roster();
    same_captain.vice_captain_id = same_captain.captain_id.clone();

    let results = vec![
        registry.join(&contest.id, "u1", wrong_size).await,
        registry.join(&contest.id, "u2", duplicate).await,
        registry.join(&contest.id, "u3", outsider).await,
        registry.join(&contest.id, "u4", same_captain).await,
    ];

    assert!(matches!(
        results[0],
        Err(AppError::Validation(RosterValidationError::WrongRosterSize { expected: 6, actual: 3 }))
    ));
    assert!(matches!(
        results[1],
        Err(AppError::Validation(RosterValidationError::DuplicatePlayer { .. }))
    ));
    assert!(matches!(
        results[2],
        Err(AppError::Validation(RosterValidationError::PlayerNotInSquad { .. }))
    ));
    assert!(matches!(
        results[3],
        Err(AppError::Validation(RosterValidationError::InvalidCaptainAssignment))
    ));

    let stored = assert_counters_consistent(&setup, &contest.id).await;
    assert_eq!(stored.spots_remaining, 10);
    assert_eq!(stored.joined_users, 0);
}

#[tokio::test]
async fn test_join_before_squad_assignment_is_not_found() {
    let contest = Contest::new(MATCH_ID, "Early bird", 10, 1);
    let setup = TestSetupBuilder::new()
        .with_contest(contest.clone())
        .without_squad()
        .build()
        .await;

    let result = setup.registry().join(&contest.id, "u1", valid_roster()).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_counters_consistent(&setup, &contest.id).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_contests_fill_independently() {
    let small = Contest::new(MATCH_ID, "Small", 2, 1);
    let large = Contest::new(MATCH_ID, "Large", 30, 1);
    let setup = TestSetupBuilder::new()
        .with_contest(small.clone())
        .with_contest(large.clone())
        .build()
        .await;

    let users: Vec<String> = (0..20).map(|i| format!("user-{}", i)).collect();
    let (small_outcomes, large_outcomes) = tokio::join!(
        join_concurrently(&setup, &small.id, users.clone()),
        join_concurrently(&setup, &large.id, users),
    );

    assert_eq!(small_outcomes.iter().filter(|o| o.is_ok()).count(), 2);
    assert_eq!(large_outcomes.iter().filter(|o| o.is_ok()).count(), 20);
    assert_counters_consistent(&setup, &small.id).await;
    assert_counters_consistent(&setup, &large.id).await;
}

#[tokio::test]
async fn test_closed_contest_rejects_before_capacity() {
    let mut contest = Contest::new(MATCH_ID, "Closed", 10, 1);
    contest.status = ContestStatus::Closed;
    let setup = TestSetupBuilder::new().with_contest(contest.clone()).build().await;

    let result = setup.registry().join(&contest.id, "u1", valid_roster()).await;

    assert!(matches!(result, Err(AppError::ContestNotOpen)));
}

// ============================================================================
// HTTP surface
// ============================================================================

fn join_request(contest_id: &str, token: Option<&str>) -> Request<Body> {
    let roster = valid_roster();
    let body = json!({
        "players": roster.players,
        "captainId": roster.captain_id,
        "viceCaptainId": roster.vice_captain_id,
    });

    let mut builder = Request::builder()
        .method("POST")
        .uri(format!("/contests/{}/join", contest_id))
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_http_join_flow() {
    let contest = Contest::new(MATCH_ID, "Duel", 1, 1);
    let setup = TestSetupBuilder::new().with_contest(contest.clone()).build().await;
    let app = setup.router();

    let (status, body) = send(&app, join_request(&contest.id, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, body) = send(&app, join_request(&contest.id, Some("not-a-jwt"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_TOKEN");

    let first = setup.token_for("alice");
    let (status, body) = send(&app, join_request(&contest.id, Some(&first))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userId"], "alice");
    assert_eq!(body["spotsRemaining"], 0);
    assert!(!body["teamName"].as_str().unwrap_or_default().is_empty());

    let second = setup.token_for("bob");
    let (status, body) = send(&app, join_request(&contest.id, Some(&second))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONTEST_FULL");

    let request = Request::builder()
        .uri(format!("/contests/{}", contest.id))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["joinedUsers"], 1);
    assert_eq!(body["spotsRemaining"], 0);
}

#[tokio::test]
async fn test_http_my_rosters_lists_only_caller() {
    let first = Contest::new(MATCH_ID, "A", 10, 1);
    let second = Contest::new(MATCH_ID, "B", 10, 1);
    let setup = TestSetupBuilder::new()
        .with_contest(first.clone())
        .with_contest(second.clone())
        .build()
        .await;
    let app = setup.router();

    let alice = setup.token_for("alice");
    let bob = setup.token_for("bob");
    send(&app, join_request(&first.id, Some(&alice))).await;
    send(&app, join_request(&second.id, Some(&alice))).await;
    send(&app, join_request(&second.id, Some(&bob))).await;

    let request = Request::builder()
        .uri("/me/rosters")
        .header("Authorization", format!("Bearer {}", alice))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    let rosters = body.as_array().unwrap();
    assert_eq!(rosters.len(), 2);
    assert!(rosters.iter().all(|r| r["userId"] == "alice"));
}

#[tokio::test]
async fn test_http_admin_creates_contest() {
    let setup = TestSetupBuilder::new().build().await;
    let app = setup.router();

    let body = json!({
        "matchId": MATCH_ID,
        "name": "Grand League",
        "entryFee": 49,
        "prizePool": 100000,
        "totalSpots": 500,
        "maxEntriesPerUser": 6,
        "winnerPercentage": 55.0,
        "isGuaranteed": true
    });
    let request = Request::builder()
        .method("POST")
        .uri("/admin/contests")
        .header("content-type", "application/json")
        .header("Authorization", format!("Bearer {}", setup.admin_token()))
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, created) = send(&app, request).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["spotsRemaining"], 500);
    assert_eq!(created["joinedUsers"], 0);
    assert_eq!(created["status"], "open");

    let request = Request::builder()
        .uri(format!("/matches/{}/contests", MATCH_ID))
        .body(Body::empty())
        .unwrap();
    let (status, listed) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
    assert_eq!(listed[0]["id"], created["id"]);
}
