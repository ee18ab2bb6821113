/// Snapshot shapes shared by REST responses and SSE payloads.
pub mod common;
pub mod health;
/// Request and response bodies of the ledger mutations.
pub mod ledger;
pub mod ranking;
pub mod sse;
pub mod validation;
