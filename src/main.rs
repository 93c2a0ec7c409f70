use std::sync::Arc;
use std::time::Duration;

use mongodb::Client;

use pricewatch::config;
use pricewatch::scheduler::DailySchedule;
use pricewatch::services::checker::PriceChecker;
use pricewatch::services::db_init;
use pricewatch::services::extractor::PriceExtractor;
use pricewatch::services::mailer::SmtpMailer;
use pricewatch::services::notifier::Notifier;
use pricewatch::services::rate_gate::RateGate;
use pricewatch::services::store::MongoStore;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let settings = config::load();

    // Mongo connection
    let client = Client::with_uri_str(&settings.mongodb_uri)
        .await
        .expect("Failed to connect to MongoDB");
    let db = client.database(&settings.mongodb_db);

    if let Err(e) = db_init::ensure_indexes(&db).await {
        tracing::warn!(error = %e, "index creation failed");
    }

    let store = Arc::new(MongoStore::new(db));

    let extractor = Arc::new(
        PriceExtractor::new(
            Duration::from_secs(settings.http_timeout_secs),
            settings.usd_to_inr_rate,
        )
        .expect("Failed to build HTTP client"),
    );

    let gate = RateGate::new(Duration::from_millis(settings.scrape_delay_ms));

    let mailer = Arc::new(SmtpMailer::new(&settings).expect("Failed to build SMTP transport"));
    let notifier = Notifier::new(mailer, store.clone());

    let checker = Arc::new(PriceChecker::new(store, extractor, gate, notifier));

    if settings.run_at_startup {
        if let Err(e) = checker.run_batch_check().await {
            tracing::error!(error = %e, "startup price check failed");
        }
    }

    let mut schedule =
        DailySchedule::start(checker, &settings.schedule_cron, &settings.schedule_tz)
            .await
            .expect("Failed to start scheduler");

    tokio::signal::ctrl_c().await.expect("ctrl-c handler");

    tracing::info!("shutting down");
    let _ = schedule.stop().await;
}
