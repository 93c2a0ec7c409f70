use std::env;

#[derive(Debug, Clone)]
pub struct Settings {
    pub mongodb_uri: String,
    pub mongodb_db: String,

    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: String,
    pub smtp_password: String,

    /// Minimum spacing between outbound page fetches, in milliseconds.
    pub scrape_delay_ms: u64,
    /// Per-fetch timeout, in seconds.
    pub http_timeout_secs: u64,
    /// Fixed USD -> INR conversion rate applied to foreign-currency prices.
    pub usd_to_inr_rate: f64,

    /// 6-field cron expression (sec min hour dom mon dow) for the daily run.
    pub schedule_cron: String,
    /// IANA timezone the cron expression is evaluated in.
    pub schedule_tz: String,
    /// Run one batch check immediately at startup, before the first fire.
    pub run_at_startup: bool,
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let mongodb_uri = env::var("MONGODB_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());

    let mongodb_db = env::var("MONGODB_DB")
        .unwrap_or_else(|_| "pricewatch".to_string());

    let smtp_host = env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string());

    let smtp_port = env::var("SMTP_PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(587);

    let smtp_user = env::var("SMTP_USER").unwrap_or_default();
    let smtp_password = env::var("SMTP_PASSWORD").unwrap_or_default();

    let scrape_delay_ms = env::var("SCRAPE_DELAY_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(2000);

    let http_timeout_secs = env::var("HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(15);

    let usd_to_inr_rate = env::var("USD_TO_INR_RATE")
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(83.0);

    // 7:15 PM in the configured timezone, once a day.
    let schedule_cron =
        env::var("SCHEDULE_CRON").unwrap_or_else(|_| "0 15 19 * * *".to_string());

    let schedule_tz = env::var("SCHEDULE_TZ").unwrap_or_else(|_| "Asia/Kolkata".to_string());

    let run_at_startup = env::var("RUN_AT_STARTUP")
        .map(|s| s == "1" || s.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    Settings {
        mongodb_uri,
        mongodb_db,
        smtp_host,
        smtp_port,
        smtp_user,
        smtp_password,
        scrape_delay_ms,
        http_timeout_secs,
        usd_to_inr_rate,
        schedule_cron,
        schedule_tz,
        run_at_startup,
    }
}
