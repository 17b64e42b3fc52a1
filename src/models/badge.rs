use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Catalog badge. Seeded out of band and read-only from the API's
/// perspective; `badge_id` is the numeric identity every route uses.
#[derive(Debug, Serialize, Deserialize, Clone, utoipa::ToSchema)]
pub struct Badge {
    #[serde(
        rename = "_id",
        skip_serializing_if = "Option::is_none",
        serialize_with = "super::serialize_oid_hex",
        default
    )]
    #[schema(value_type = Option<String>)]
    pub _id: Option<ObjectId>,
    pub badge_id: i64,
    pub badge_name: String,
    #[serde(rename = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Free-text category tags, e.g. "Activity Badges, At Camp, Outdoors".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<String>,
}
