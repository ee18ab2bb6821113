use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};

use golf_comp_back::{
    config::AppConfig,
    dao::state_store::{StateStore, file::FileStateStore},
    routes,
    services::storage_supervisor,
    state::{AppState, SharedState},
};

fn server_with_state() -> (TestServer, SharedState) {
    let state = AppState::new(AppConfig::default());
    let server = TestServer::new(routes::router(state.clone())).unwrap();
    (server, state)
}

async fn create_group(server: &TestServer, name: &str) -> String {
    let response = server.post("/groups").json(&json!({ "name": name })).await;
    response.assert_status_ok();
    response.json::<Value>()["id"].as_str().unwrap().to_string()
}

async fn add_player(server: &TestServer, group_id: &str, name: &str) -> String {
    let response = server
        .post(&format!("/groups/{group_id}/players"))
        .json(&json!({ "name": name }))
        .await;
    response.assert_status_ok();
    response.json::<Value>()["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn healthcheck_reports_degraded_without_store() {
    let (server, _) = server_with_state();
    let response = server.get("/healthcheck").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "degraded");
}

#[tokio::test]
async fn groups_hold_at_most_four_players() {
    let (server, _) = server_with_state();
    let group_id = create_group(&server, "Morning flight").await;
    for name in ["Ada", "Bea", "Cy", "Dee"] {
        add_player(&server, &group_id, name).await;
    }

    let response = server
        .post(&format!("/groups/{group_id}/players"))
        .json(&json!({ "name": "Eve" }))
        .await;
    response.assert_status(StatusCode::CONFLICT);

    let snapshot = server.get("/state").await.json::<Value>();
    let players = snapshot["groups"][0]["players"].as_array().unwrap();
    assert_eq!(players.len(), 4);
    assert_eq!(players[0]["groupId"], group_id.as_str());
}

#[tokio::test]
async fn score_entry_updates_totals() {
    let (server, _) = server_with_state();
    let group_id = create_group(&server, "A").await;
    let player_id = add_player(&server, &group_id, "Ada").await;

    let response = server
        .put(&format!("/players/{player_id}/holes/1"))
        .json(&json!({ "score": 5 }))
        .await;
    response.assert_status_ok();
    let card = response.json::<Value>();
    assert_eq!(card["totalScore"], 5);
    assert_eq!(card["totalPar"], 4);
    assert_eq!(card["netScore"], 1);
    assert_eq!(card["groupName"], "A");

    // Overwriting the same hole keeps a single entry.
    let card = server
        .put(&format!("/players/{player_id}/holes/1"))
        .json(&json!({ "score": 3, "par": 4 }))
        .await
        .json::<Value>();
    assert_eq!(card["scores"].as_array().unwrap().len(), 1);
    assert_eq!(card["netScore"], -1);
}

#[tokio::test]
async fn confirm_and_reset_a_group_hole() {
    let (server, _) = server_with_state();
    let group_id = create_group(&server, "A").await;
    let ada = add_player(&server, &group_id, "Ada").await;
    add_player(&server, &group_id, "Bea").await;

    server
        .put(&format!("/players/{ada}/holes/2"))
        .json(&json!({ "score": 6, "par": 5 }))
        .await
        .assert_status_ok();

    let confirmed = server
        .post(&format!("/groups/{group_id}/holes/2/confirm"))
        .json(&json!({ "par": 5 }))
        .await;
    confirmed.assert_status_ok();
    let confirmed = confirmed.json::<Value>();
    let totals: Vec<_> = confirmed["scores"]
        .as_array()
        .unwrap()
        .iter()
        .map(|card| card["totalScore"].as_i64().unwrap())
        .collect();
    assert_eq!(totals, vec![6, 5]);

    let reset = server
        .delete(&format!("/groups/{group_id}/holes/2"))
        .await;
    reset.assert_status_ok();
    let reset = reset.json::<Value>();
    for card in reset["scores"].as_array().unwrap() {
        assert!(card["scores"].as_array().unwrap().is_empty());
        assert_eq!(card["netScore"], 0);
    }

    // Cards survive the reset.
    let snapshot = server.get("/state").await.json::<Value>();
    assert_eq!(snapshot["scores"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn confirm_without_body_uses_default_par() {
    let (server, _) = server_with_state();
    let group_id = create_group(&server, "A").await;
    add_player(&server, &group_id, "Ada").await;

    let response = server
        .post(&format!("/groups/{group_id}/holes/1/confirm"))
        .await;
    response.assert_status_ok();
    let card = &response.json::<Value>()["scores"][0];
    assert_eq!(card["totalScore"], 4);
    assert_eq!(card["netScore"], 0);

    server
        .post(&format!("/groups/{group_id}/holes/2/confirm"))
        .json(&json!({ "par": 9 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn ranking_orders_by_net_score() {
    let (server, _) = server_with_state();
    let group_a = create_group(&server, "A").await;
    let group_b = create_group(&server, "B").await;
    let ada = add_player(&server, &group_a, "Ada").await;
    let bea = add_player(&server, &group_b, "Bea").await;

    server
        .put(&format!("/players/{ada}/holes/1"))
        .json(&json!({ "score": 5, "par": 4 }))
        .await
        .assert_status_ok();
    server
        .put(&format!("/players/{bea}/holes/1"))
        .json(&json!({ "score": 2, "par": 4 }))
        .await
        .assert_status_ok();

    let ranking = server.get("/ranking").await.json::<Value>();
    let standings = ranking["standings"].as_array().unwrap();
    assert_eq!(standings[0]["playerName"], "Bea");
    assert_eq!(standings[0]["netScore"], -2);
    assert_eq!(standings[0]["position"], 1);
    assert_eq!(standings[1]["playerName"], "Ada");
    assert_eq!(standings[1]["position"], 2);
    assert_eq!(standings[1]["lastHole"], 1);

    let summary = &ranking["summary"];
    assert_eq!(summary["participants"], 2);
    assert_eq!(summary["leaderNetScore"], -2);
    assert_eq!(summary["averageNetScore"], -0.5);
    assert_eq!(summary["groups"], 2);
}

#[tokio::test]
async fn unknown_targets_return_not_found() {
    let (server, state) = server_with_state();

    server
        .post("/groups/group_missing/players")
        .json(&json!({ "name": "Ada" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .put("/players/player_missing/holes/1")
        .json(&json!({ "score": 4 }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .delete("/groups/group_missing/holes/1")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    assert_eq!(state.revision(), 0);
}

#[tokio::test]
async fn out_of_range_input_is_rejected() {
    let (server, _) = server_with_state();
    let group_id = create_group(&server, "A").await;
    let player_id = add_player(&server, &group_id, "Ada").await;

    server
        .post("/groups")
        .json(&json!({ "name": "   " }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    server
        .put(&format!("/players/{player_id}/holes/19"))
        .json(&json!({ "score": 4 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    server
        .put(&format!("/players/{player_id}/holes/1"))
        .json(&json!({ "score": 25 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    server
        .put("/state/current-hole")
        .json(&json!({ "currentHole": 0 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn current_hole_round_trips() {
    let (server, _) = server_with_state();
    server
        .put("/state/current-hole")
        .json(&json!({ "currentHole": 12 }))
        .await
        .assert_status_ok();
    let snapshot = server.get("/state").await.json::<Value>();
    assert_eq!(snapshot["currentHole"], 12);
}

#[tokio::test]
async fn saved_state_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("competition.json");

    let (server, state) = server_with_state();
    let store = FileStateStore::open(&path).await.unwrap();
    state.set_state_store(Arc::new(store)).await;

    let group_id = create_group(&server, "A").await;
    let player_id = add_player(&server, &group_id, "Ada").await;
    server
        .put(&format!("/players/{player_id}/holes/3"))
        .json(&json!({ "score": 4, "par": 3 }))
        .await
        .assert_status_ok();
    assert!(storage_supervisor::persist_snapshot(&state).await.unwrap());

    let reopened = FileStateStore::open(&path).await.unwrap();
    let loaded = reopened.load().await.unwrap().unwrap();
    assert_eq!(loaded.groups[0].players[0].id, player_id);
    assert_eq!(loaded.scores[0].net_score, 1);
    assert_eq!(loaded.current_hole, 1);
}
