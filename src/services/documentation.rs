use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the golf competition backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::snapshot::get_state,
        crate::routes::snapshot::set_current_hole,
        crate::routes::groups::create_group,
        crate::routes::groups::add_player,
        crate::routes::groups::confirm_hole,
        crate::routes::groups::reset_hole,
        crate::routes::players::record_score,
        crate::routes::ranking::get_ranking,
        crate::routes::sse::public_stream,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::common::StateSnapshot,
            crate::dto::common::GroupSummary,
            crate::dto::common::PlayerSummary,
            crate::dto::common::PlayerScoreSummary,
            crate::dto::common::HoleScoreSummary,
            crate::dto::ledger::CreateGroupRequest,
            crate::dto::ledger::AddPlayerRequest,
            crate::dto::ledger::ScoreEntryRequest,
            crate::dto::ledger::ConfirmHoleRequest,
            crate::dto::ledger::CurrentHoleRequest,
            crate::dto::ledger::GroupHoleScores,
            crate::dto::ranking::RankingResponse,
            crate::dto::ranking::StandingEntry,
            crate::dto::ranking::RankingSummaryDto,
            crate::dto::sse::SystemStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "state", description = "Competition snapshot and hole cursor"),
        (name = "groups", description = "Groups, players and group-wide hole actions"),
        (name = "players", description = "Per-player score entry"),
        (name = "ranking", description = "Leaderboard"),
        (name = "sse", description = "Server-sent events streams"),
    )
)]
pub struct ApiDoc;
