use std::sync::Arc;

use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use tokio::sync::Mutex;

use crate::error::TrackerError;
use crate::services::deals::{Deal, group_by_user};
use crate::services::extractor::{Extract, Extraction};
use crate::services::notifier::Notifier;
use crate::services::rate_gate::RateGate;
use crate::services::store::ProductStore;

/// Outcome of one batch run, for logs and tests.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub checked: usize,
    /// Products whose snapshot write actually stuck.
    pub updated: usize,
    pub failed: usize,
    pub deals_found: usize,
    pub users_notified: usize,
    pub alerts_recorded: usize,
}

/// One sequential pass over all active tracked products: rate-gated fetch,
/// snapshot update, history append, deal classification, then per-user alert
/// dispatch. A single product's failure never aborts the batch; only failing
/// to list the products at all is fatal.
pub struct PriceChecker {
    store: Arc<dyn ProductStore>,
    extractor: Arc<dyn Extract>,
    gate: RateGate,
    notifier: Notifier,
    // Serializes runs; a new fire may not start while one is active, and a
    // manual refresh may not race a batch update.
    run_lock: Mutex<()>,
}

impl PriceChecker {
    pub fn new(
        store: Arc<dyn ProductStore>,
        extractor: Arc<dyn Extract>,
        gate: RateGate,
        notifier: Notifier,
    ) -> Self {
        Self {
            store,
            extractor,
            gate,
            notifier,
            run_lock: Mutex::new(()),
        }
    }

    pub async fn run_batch_check(&self) -> Result<BatchReport, TrackerError> {
        let _guard = self.run_lock.lock().await;

        let products = self.store.list_active_products().await?;

        tracing::info!(count = products.len(), "starting price check");

        let mut report = BatchReport::default();
        let mut deals: Vec<Deal> = Vec::new();

        for product in &products {
            report.checked += 1;

            self.gate.wait().await;

            let extraction = match self.extractor.extract(&product.url).await {
                Ok(ex) => ex,
                Err(e) => {
                    tracing::warn!(
                        product = %product.id,
                        url = %product.url,
                        kind = e.kind(),
                        error = %e,
                        "product check failed, snapshot left unchanged"
                    );
                    report.failed += 1;
                    continue;
                }
            };

            let checked_at = Utc::now().timestamp();
            if self.persist_check(product.id, &extraction, checked_at).await {
                report.updated += 1;
            }

            tracing::info!(
                product = %product.id,
                title = %extraction.title,
                price = extraction.price,
                "checked"
            );

            if extraction.price < product.target_price {
                deals.push(Deal {
                    product_id: product.id,
                    user_id: product.user_id,
                    title: extraction.title.clone(),
                    url: product.url.clone(),
                    current_price: extraction.price,
                    target_price: product.target_price,
                });
            }
        }

        report.deals_found = deals.len();

        self.dispatch_alerts(deals, &mut report).await;

        tracing::info!(
            checked = report.checked,
            updated = report.updated,
            failed = report.failed,
            deals = report.deals_found,
            notified = report.users_notified,
            "price check completed"
        );

        Ok(report)
    }

    /// On-demand single-product check, bypassing the schedule but reusing
    /// the same extract, snapshot and history-append logic. Does not send
    /// alerts. Serialized against batch runs by the same lock.
    pub async fn refresh_product(&self, id: ObjectId) -> Result<Extraction, TrackerError> {
        let _guard = self.run_lock.lock().await;

        let product = self
            .store
            .get_product(id)
            .await?
            .ok_or_else(|| TrackerError::Persistence(format!("product {id} not found")))?;

        self.gate.wait().await;

        let extraction = self.extractor.extract(&product.url).await?;
        let checked_at = Utc::now().timestamp();

        self.store
            .update_snapshot(
                product.id,
                extraction.price,
                &extraction.title,
                extraction.currency,
                checked_at,
            )
            .await?;
        self.store
            .append_price_sample(product.id, extraction.price, extraction.currency, checked_at)
            .await?;

        Ok(extraction)
    }

    // Snapshot and history writes are independent; a rejected write is a
    // data-loss risk worth surfacing, but it never stops the batch. Returns
    // whether the snapshot write stuck, so the run report only counts
    // products whose stored state actually changed.
    async fn persist_check(
        &self,
        product_id: ObjectId,
        extraction: &Extraction,
        checked_at: i64,
    ) -> bool {
        let mut snapshot_ok = true;

        if let Err(e) = self
            .store
            .update_snapshot(
                product_id,
                extraction.price,
                &extraction.title,
                extraction.currency,
                checked_at,
            )
            .await
        {
            tracing::error!(product = %product_id, error = %e, "snapshot update failed");
            snapshot_ok = false;
        }

        if let Err(e) = self
            .store
            .append_price_sample(product_id, extraction.price, extraction.currency, checked_at)
            .await
        {
            tracing::error!(product = %product_id, error = %e, "history append failed");
        }

        snapshot_ok
    }

    async fn dispatch_alerts(&self, deals: Vec<Deal>, report: &mut BatchReport) {
        for (user_id, user_deals) in group_by_user(deals) {
            let email = match self.store.owner_email(user_id).await {
                Ok(Some(email)) => email,
                Ok(None) => {
                    tracing::warn!(user = %user_id, "no email on file, skipping alerts");
                    continue;
                }
                Err(e) => {
                    tracing::error!(user = %user_id, error = %e, "owner lookup failed");
                    continue;
                }
            };

            match self.notifier.notify_user(user_id, &email, &user_deals).await {
                Ok(recorded) => {
                    tracing::info!(
                        user = %user_id,
                        deals = user_deals.len(),
                        "alert sent"
                    );
                    report.users_notified += 1;
                    report.alerts_recorded += recorded;
                }
                Err(e) => {
                    // One user's delivery failure must not block the rest.
                    tracing::warn!(user = %user_id, error = %e, "alert delivery failed");
                }
            }
        }
    }
}
