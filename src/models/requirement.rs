use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Catalog requirement: a sub-task belonging to a badge. Read-only.
#[derive(Debug, Serialize, Deserialize, Clone, utoipa::ToSchema)]
pub struct Requirement {
    #[serde(
        rename = "_id",
        skip_serializing_if = "Option::is_none",
        serialize_with = "super::serialize_oid_hex",
        default
    )]
    #[schema(value_type = Option<String>)]
    pub _id: Option<ObjectId>,
    pub badge_id: i64,
    pub requirement_id: i64,
    pub requirement_string: String,
}
