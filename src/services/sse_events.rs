use serde::Serialize;
use tracing::warn;

use crate::{
    dto::{
        common::StateSnapshot,
        ranking::RankingResponse,
        sse::{ServerEvent, SystemStatus},
    },
    state::{AppState, competition::CompetitionState},
};

const EVENT_STATE_CHANGED: &str = "state.changed";
const EVENT_RANKING_CHANGED: &str = "ranking.changed";
const EVENT_SYSTEM_STATUS: &str = "system.status";

/// Broadcast the new snapshot and the ranking derived from it.
pub fn broadcast_competition(state: &AppState, competition: &CompetitionState) {
    if state.public_sse().subscriber_count() == 0 {
        return;
    }
    for event in competition_events(competition) {
        state.public_sse().broadcast(event);
    }
}

/// Broadcast that the backend entered or left degraded mode.
pub fn broadcast_system_status(state: &AppState, degraded: bool) {
    send_public_event(state, EVENT_SYSTEM_STATUS, &SystemStatus { degraded });
}

/// `state.changed` and `ranking.changed` events describing `competition`.
///
/// Also used to prime freshly connected SSE clients.
pub fn competition_events(competition: &CompetitionState) -> Vec<ServerEvent> {
    let snapshot = StateSnapshot::from(competition);
    let ranking = RankingResponse::from_scores(&competition.scores);

    [
        encode(EVENT_STATE_CHANGED, &snapshot),
        encode(EVENT_RANKING_CHANGED, &ranking),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn send_public_event(state: &AppState, event: &str, payload: &impl Serialize) {
    if let Some(event) = encode(event, payload) {
        state.public_sse().broadcast(event);
    }
}

fn encode(event: &str, payload: &impl Serialize) -> Option<ServerEvent> {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => Some(event),
        Err(err) => {
            warn!(event, error = %err, "failed to serialize public SSE payload");
            None
        }
    }
}
