use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Audit record for a delivered deal alert. One message goes out per user
/// per run, but one record is written per deal; records are created only
/// after the send succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRecord {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub user_id: ObjectId,
    pub product_id: ObjectId,

    pub message: String,
    pub sent_at: i64,
}
