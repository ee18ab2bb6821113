use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::dao::models::{
    CompetitionEntity, GroupEntity, PlayerScoreEntity, default_current_hole,
};

/// The competition lives in a single document, like the single row of the hosted table.
pub const STATE_DOC_ID: &str = "app_state::1";

#[derive(Debug, Deserialize)]
pub struct ChangesResponse {
    #[serde(default)]
    pub results: Vec<ChangeRow>,
    pub last_seq: Value,
}

#[derive(Debug, Deserialize)]
pub struct ChangeRow {
    pub id: String,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub doc: Option<Value>,
}

/// Body CouchDB answers a successful document write with.
#[derive(Debug, Deserialize)]
pub struct PutResponse {
    pub rev: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchStateDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub state: StateBody,
}

/// Document body; the hole cursor is stored under its column name `current_hole`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateBody {
    #[serde(default)]
    pub groups: Vec<GroupEntity>,
    #[serde(default)]
    pub scores: Vec<PlayerScoreEntity>,
    #[serde(default = "default_current_hole", alias = "currentHole")]
    pub current_hole: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<(CompetitionEntity, Option<String>)> for CouchStateDocument {
    fn from((state, rev): (CompetitionEntity, Option<String>)) -> Self {
        Self {
            id: STATE_DOC_ID.to_string(),
            rev,
            state: StateBody {
                groups: state.groups,
                scores: state.scores,
                current_hole: state.current_hole,
                updated_at: OffsetDateTime::now_utc().format(&Rfc3339).ok(),
            },
        }
    }
}

impl From<CouchStateDocument> for CompetitionEntity {
    fn from(doc: CouchStateDocument) -> Self {
        Self {
            groups: doc.state.groups,
            scores: doc.state.scores,
            current_hole: doc.state.current_hole,
        }
    }
}

/// Render a `_changes` sequence for the next `since` parameter.
/// CouchDB 2+ uses opaque strings, 1.x plain integers.
pub fn sequence_param(seq: &Value) -> String {
    match seq {
        Value::String(value) => value.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn document_uses_column_names() {
        let doc = CouchStateDocument::from((
            CompetitionEntity {
                current_hole: 4,
                ..CompetitionEntity::default()
            },
            Some("1-abc".into()),
        ));

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["_id"], STATE_DOC_ID);
        assert_eq!(value["_rev"], "1-abc");
        assert_eq!(value["current_hole"], 4);
        assert!(value.get("currentHole").is_none());
        assert!(value["updated_at"].is_string());
    }

    #[test]
    fn stored_document_maps_back_to_entity() {
        let raw = json!({
            "_id": STATE_DOC_ID,
            "_rev": "3-def",
            "groups": [{"id": "group_1", "name": "A", "players": []}],
            "scores": [],
            "current_hole": 9,
            "updated_at": "2024-05-01T08:00:00Z"
        });

        let doc: CouchStateDocument = serde_json::from_value(raw).unwrap();
        assert_eq!(doc.rev.as_deref(), Some("3-def"));

        let entity = CompetitionEntity::from(doc);
        assert_eq!(entity.current_hole, 9);
        assert_eq!(entity.groups[0].name, "A");
    }

    #[test]
    fn sequences_render_as_plain_strings() {
        assert_eq!(sequence_param(&json!("12-g1AAAA")), "12-g1AAAA");
        assert_eq!(sequence_param(&json!(42)), "42");
    }
}
