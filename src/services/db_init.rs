use mongodb::{
    Database, IndexModel,
    bson::doc,
};

pub async fn ensure_indexes(db: &Database) -> Result<(), String> {
    // products: batch scan (is_active + stable order)
    {
        let col = db.collection::<mongodb::bson::Document>("products");
        let model = IndexModel::builder()
            .keys(doc! { "is_active": 1, "created_at": 1 })
            .build();

        col.create_index(model, None)
            .await
            .map_err(|e| e.to_string())?;
    }

    // price_history: per-product recent-N reads
    {
        let col = db.collection::<mongodb::bson::Document>("price_history");
        let model = IndexModel::builder()
            .keys(doc! { "product_id": 1, "checked_at": -1 })
            .build();

        col.create_index(model, None)
            .await
            .map_err(|e| e.to_string())?;
    }

    // alert_records: per-user audit listing
    {
        let col = db.collection::<mongodb::bson::Document>("alert_records");
        let model = IndexModel::builder()
            .keys(doc! { "user_id": 1, "sent_at": -1 })
            .build();

        let _ = col.create_index(model, None).await;
    }

    Ok(())
}
