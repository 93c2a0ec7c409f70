use async_trait::async_trait;
use futures_util::StreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::FindOptions;

use crate::error::TrackerError;
use crate::models::{AlertRecord, Currency, PriceSample, TrackedProduct, User};

/// Read/write contract the pipeline needs from its persistence backend.
/// Injected so backend choice is configuration, not a code fork, and so
/// batch tests run against an in-memory double.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Active products in a stable, deterministic order.
    async fn list_active_products(&self) -> Result<Vec<TrackedProduct>, TrackerError>;

    async fn get_product(&self, id: ObjectId) -> Result<Option<TrackedProduct>, TrackerError>;

    async fn update_snapshot(
        &self,
        id: ObjectId,
        price: f64,
        title: &str,
        currency: Currency,
        checked_at: i64,
    ) -> Result<(), TrackerError>;

    async fn append_price_sample(
        &self,
        product_id: ObjectId,
        price: f64,
        currency: Currency,
        checked_at: i64,
    ) -> Result<(), TrackerError>;

    /// Most recent samples first, capped at `limit`.
    async fn recent_price_samples(
        &self,
        product_id: ObjectId,
        limit: i64,
    ) -> Result<Vec<PriceSample>, TrackerError>;

    async fn create_alert_record(
        &self,
        user_id: ObjectId,
        product_id: ObjectId,
        message: &str,
        sent_at: i64,
    ) -> Result<(), TrackerError>;

    async fn owner_email(&self, user_id: ObjectId) -> Result<Option<String>, TrackerError>;
}

#[derive(Clone)]
pub struct MongoStore {
    db: mongodb::Database,
}

impl MongoStore {
    pub fn new(db: mongodb::Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductStore for MongoStore {
    async fn list_active_products(&self) -> Result<Vec<TrackedProduct>, TrackerError> {
        let products = self.db.collection::<TrackedProduct>("products");

        let find_opts = FindOptions::builder()
            .sort(doc! { "created_at": 1, "_id": 1 })
            .build();

        let mut cursor = products.find(doc! { "is_active": true }, find_opts).await?;

        let mut items: Vec<TrackedProduct> = Vec::new();
        while let Some(res) = cursor.next().await {
            items.push(res?);
        }

        Ok(items)
    }

    async fn get_product(&self, id: ObjectId) -> Result<Option<TrackedProduct>, TrackerError> {
        let products = self.db.collection::<TrackedProduct>("products");
        Ok(products.find_one(doc! { "_id": id }, None).await?)
    }

    async fn update_snapshot(
        &self,
        id: ObjectId,
        price: f64,
        title: &str,
        currency: Currency,
        checked_at: i64,
    ) -> Result<(), TrackerError> {
        let products = self.db.collection::<TrackedProduct>("products");

        products
            .update_one(
                doc! { "_id": id },
                doc! { "$set": {
                    "current_price": price,
                    "product_name": title,
                    "currency": currency.as_str(),
                    "last_checked": checked_at,
                } },
                None,
            )
            .await?;

        Ok(())
    }

    async fn append_price_sample(
        &self,
        product_id: ObjectId,
        price: f64,
        currency: Currency,
        checked_at: i64,
    ) -> Result<(), TrackerError> {
        let samples = self.db.collection::<PriceSample>("price_history");

        let sample = PriceSample {
            id: ObjectId::new(),
            product_id,
            price,
            currency,
            checked_at,
        };

        samples.insert_one(&sample, None).await?;

        Ok(())
    }

    async fn recent_price_samples(
        &self,
        product_id: ObjectId,
        limit: i64,
    ) -> Result<Vec<PriceSample>, TrackerError> {
        let samples = self.db.collection::<PriceSample>("price_history");

        let find_opts = FindOptions::builder()
            .sort(doc! { "checked_at": -1 })
            .limit(limit)
            .build();

        let mut cursor = samples.find(doc! { "product_id": product_id }, find_opts).await?;

        let mut items: Vec<PriceSample> = Vec::new();
        while let Some(res) = cursor.next().await {
            items.push(res?);
        }

        Ok(items)
    }

    async fn create_alert_record(
        &self,
        user_id: ObjectId,
        product_id: ObjectId,
        message: &str,
        sent_at: i64,
    ) -> Result<(), TrackerError> {
        let records = self.db.collection::<AlertRecord>("alert_records");

        let record = AlertRecord {
            id: ObjectId::new(),
            user_id,
            product_id,
            message: message.to_string(),
            sent_at,
        };

        records.insert_one(&record, None).await?;

        Ok(())
    }

    async fn owner_email(&self, user_id: ObjectId) -> Result<Option<String>, TrackerError> {
        let users = self.db.collection::<User>("users");

        let user = users.find_one(doc! { "_id": user_id }, None).await?;

        Ok(user.map(|u| u.email))
    }
}
