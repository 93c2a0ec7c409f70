use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Currency of a scraped price. INR is the canonical unit all stored prices
/// are normalized to; USD values are converted before they reach the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "INR")]
    Inr,
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inr => "INR",
            Self::Usd => "USD",
            Self::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedProduct {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub user_id: ObjectId,
    pub url: String,

    #[serde(default = "default_product_name")]
    pub product_name: String,

    // target_price > 0; current_price, when present, > 0
    pub target_price: f64,
    pub current_price: Option<f64>,

    #[serde(default = "default_currency")]
    pub currency: Currency,

    pub last_checked: Option<i64>,

    #[serde(default = "default_active")]
    pub is_active: bool,

    pub created_at: i64,
}

pub fn default_product_name() -> String {
    "Unknown Product".to_string()
}

fn default_currency() -> Currency {
    Currency::Inr
}

fn default_active() -> bool {
    true
}
