pub mod badge;
pub mod requirement;
pub mod user;

pub use badge::*;
pub use requirement::*;
pub use user::*;

use mongodb::bson::oid::ObjectId;
use serde::Serializer;

// ObjectIds go out as plain hex, not the extended-JSON {"$oid": ...} form.
// Safe for writes too: the only whole-document insert carries `_id: None`,
// which `skip_serializing_if` drops before this runs.
pub(crate) fn serialize_oid_hex<S: Serializer>(
    id: &Option<ObjectId>,
    s: S,
) -> Result<S::Ok, S::Error> {
    match id {
        Some(oid) => s.serialize_str(&oid.to_hex()),
        None => s.serialize_none(),
    }
}
