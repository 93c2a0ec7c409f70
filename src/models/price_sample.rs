use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use super::Currency;

/// One point of a product's price history. Append-only: samples are never
/// mutated and only removed when the owning product is deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSample {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub product_id: ObjectId,
    pub price: f64,
    pub currency: Currency,
    pub checked_at: i64,
}
