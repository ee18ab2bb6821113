/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Group, player and score mutations on the shared competition.
pub mod ledger_service;
/// Leaderboard projection.
pub mod ranking_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Store connection supervision and debounced persistence.
pub mod storage_supervisor;
